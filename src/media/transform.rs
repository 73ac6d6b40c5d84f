//! URL-level transform descriptors.
//!
//! The media service resolves transforms lazily from a `tr:` path segment
//! inserted between the endpoint id and the file path:
//! `https://host/<id>/tr:w-512,h-512,c-at_max/website-images/file.png`.

use url::Url;

/// Build a derived URL carrying the given transform parameters.
///
/// Unparseable input comes straight back — the caller treats the original
/// URL as the untransformed fallback.
pub fn transformed_url(original: &str, params: &[String]) -> String {
    if params.is_empty() {
        return original.to_string();
    }

    let Ok(url) = Url::parse(original) else {
        return original.to_string();
    };

    let parts: Vec<&str> = url.path().split('/').filter(|p| !p.is_empty()).collect();
    if parts.is_empty() {
        return original.to_string();
    }

    let endpoint_id = parts[0];
    let file_path = format!("/{}", parts[1..].join("/"));
    let descriptor = params.join(",");

    format!(
        "{}/{}/tr:{}{}",
        url.origin().ascii_serialization(),
        endpoint_id,
        descriptor,
        file_path
    )
}
