//! Image side-panel state: source, alt text, dimensions, and the transform
//! pipeline applied as URL-level derivations against the media service.
//!
//! A derived URL only becomes the node's source after it verifiably loads;
//! on failure the last known-good source is restored.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::AppError;
use crate::media::{transform, MediaClient};

use super::{EditDirective, NodeRef};

const DEFAULT_DIMENSION: u32 = 512;

/// Snapshot of an image node taken at selection time.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ImageAttrs {
    pub src: String,
    #[serde(default)]
    pub alt: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Pluggable URL transforms, applied in toggle order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ImageTransform {
    Resize,
    Dropshadow,
    Upscale,
    Bgremove,
}

impl ImageTransform {
    fn params(self, width: u32, height: u32) -> Vec<String> {
        match self {
            Self::Resize => vec![
                format!("w-{width}"),
                format!("h-{height}"),
                "c-at_max".to_string(),
            ],
            Self::Dropshadow => vec!["e-shadow".to_string()],
            Self::Upscale => vec!["e-upscale".to_string()],
            Self::Bgremove => vec!["e-removedotbg".to_string()],
        }
    }
}

#[derive(Debug, Default)]
pub struct ImagePanel {
    src: String,
    alt: String,
    width: u32,
    height: u32,
    /// Last known-good source — the revert target when a transform fails
    /// to load and the base every derived URL is built from.
    original_src: String,
    transforms: Vec<ImageTransform>,
}

impl ImagePanel {
    pub fn seed(&mut self, attrs: ImageAttrs) {
        self.alt = attrs.alt;
        self.width = attrs.width.unwrap_or(DEFAULT_DIMENSION);
        self.height = attrs.height.unwrap_or(DEFAULT_DIMENSION);
        self.original_src = attrs.src.clone();
        self.src = attrs.src;
        self.transforms.clear();
    }

    pub fn src(&self) -> &str {
        &self.src
    }

    pub fn alt(&self) -> &str {
        &self.alt
    }

    pub fn transforms(&self) -> &[ImageTransform] {
        &self.transforms
    }

    pub fn set_alt(&mut self, node: &NodeRef, alt: impl Into<String>) -> EditDirective {
        self.alt = alt.into();
        self.directive(node)
    }

    pub fn set_dimensions(&mut self, node: &NodeRef, width: u32, height: u32) -> EditDirective {
        self.width = width.clamp(1, 4000);
        self.height = height.clamp(1, 4000);
        self.directive(node)
    }

    /// Toggle a transform on or off; returns whether it is now active.
    pub fn toggle_transform(&mut self, transform: ImageTransform) -> bool {
        if let Some(pos) = self.transforms.iter().position(|t| *t == transform) {
            self.transforms.remove(pos);
            false
        } else {
            self.transforms.push(transform);
            true
        }
    }

    /// The derived URL for the currently active transform set.
    pub fn transformed_url(&self) -> String {
        let params: Vec<String> = self
            .transforms
            .iter()
            .flat_map(|t| t.params(self.width, self.height))
            .collect();
        transform::transformed_url(&self.original_src, &params)
    }

    /// Apply the active transform set: build the derived URL, verify it
    /// loads, and only then commit it as the node's source. On failure the
    /// last known-good source is restored and the error surfaces to the UI.
    pub async fn apply_transforms(
        &mut self,
        node: &NodeRef,
        media: &MediaClient,
    ) -> Result<EditDirective, AppError> {
        if self.transforms.is_empty() {
            self.src = self.original_src.clone();
            return Ok(self.directive(node));
        }

        let candidate = self.transformed_url();
        match media.verify_loads(&candidate).await {
            Ok(()) => {
                self.src = candidate;
                Ok(self.directive(node))
            }
            Err(e) => {
                self.src = self.original_src.clone();
                tracing::warn!(error = %e, "Transform failed to load, reverting to last good source");
                Err(e)
            }
        }
    }

    /// Adopt a freshly uploaded or generated URL as the new base source.
    /// Active transforms reset — they referred to the old image.
    pub fn adopt_source(&mut self, node: &NodeRef, url: impl Into<String>) -> EditDirective {
        let url = url.into();
        self.original_src = url.clone();
        self.src = url;
        self.transforms.clear();
        self.directive(node)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn directive(&self, node: &NodeRef) -> EditDirective {
        EditDirective::SetImage {
            node: node.clone(),
            src: self.src.clone(),
            alt: self.alt.clone(),
            width: Some(self.width),
            height: Some(self.height),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn node() -> NodeRef {
        NodeRef {
            path: vec![3],
            tag: "img".into(),
        }
    }

    fn media() -> MediaClient {
        MediaClient::new(
            "https://ik.imagekit.io/abc123".into(),
            "public".into(),
            "private".into(),
        )
    }

    fn seeded_panel(src: String) -> ImagePanel {
        let mut panel = ImagePanel::default();
        panel.seed(ImageAttrs {
            src,
            alt: "a cozy desk".into(),
            width: Some(640),
            height: Some(480),
        });
        panel
    }

    #[test]
    fn test_transform_url_composition() {
        let mut panel = seeded_panel("https://ik.imagekit.io/abc123/website-images/photo.png".into());
        panel.toggle_transform(ImageTransform::Resize);
        panel.toggle_transform(ImageTransform::Dropshadow);

        assert_eq!(
            panel.transformed_url(),
            "https://ik.imagekit.io/abc123/tr:w-640,h-480,c-at_max,e-shadow/website-images/photo.png"
        );
    }

    #[test]
    fn test_toggle_is_symmetric() {
        let mut panel = seeded_panel("https://ik.imagekit.io/abc123/p.png".into());
        assert!(panel.toggle_transform(ImageTransform::Upscale));
        assert!(!panel.toggle_transform(ImageTransform::Upscale));
        assert!(panel.transforms().is_empty());
    }

    #[tokio::test]
    async fn test_verified_transform_commits() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/abc123/tr:e-shadow/img/p.png"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "image/png")
                    .set_body_bytes(vec![0x89]),
            )
            .mount(&server)
            .await;

        let mut panel = seeded_panel(format!("{}/abc123/img/p.png", server.uri()));
        panel.toggle_transform(ImageTransform::Dropshadow);

        let directive = panel.apply_transforms(&node(), &media()).await.unwrap();

        let expected = format!("{}/abc123/tr:e-shadow/img/p.png", server.uri());
        assert_eq!(panel.src(), expected);
        match directive {
            EditDirective::SetImage { src, .. } => assert_eq!(src, expected),
            other => panic!("expected SetImage, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_failed_transform_reverts_to_last_good_source() {
        let server = MockServer::start().await;
        // No mock for the derived path — the load 404s.
        let original = format!("{}/abc123/img/p.png", server.uri());
        let mut panel = seeded_panel(original.clone());
        panel.toggle_transform(ImageTransform::Bgremove);

        let result = panel.apply_transforms(&node(), &media()).await;

        assert!(matches!(result, Err(AppError::Media(_))));
        assert_eq!(panel.src(), original);
    }

    #[tokio::test]
    async fn test_empty_transform_set_restores_original() {
        let mut panel = seeded_panel("https://ik.imagekit.io/abc123/p.png".into());
        panel.toggle_transform(ImageTransform::Upscale);
        panel.toggle_transform(ImageTransform::Upscale);

        let directive = panel.apply_transforms(&node(), &media()).await.unwrap();
        match directive {
            EditDirective::SetImage { src, .. } => {
                assert_eq!(src, "https://ik.imagekit.io/abc123/p.png")
            }
            other => panic!("expected SetImage, got {other:?}"),
        }
    }

    #[test]
    fn test_adopt_source_resets_transforms() {
        let mut panel = seeded_panel("https://ik.imagekit.io/abc123/old.png".into());
        panel.toggle_transform(ImageTransform::Dropshadow);

        panel.adopt_source(&node(), "https://ik.imagekit.io/abc123/new.png");

        assert!(panel.transforms().is_empty());
        assert_eq!(panel.src(), "https://ik.imagekit.io/abc123/new.png");
    }
}
