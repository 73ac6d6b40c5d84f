//! Client for the external media service (ImageKit-compatible).
//!
//! Uploads are multipart with signed credentials; transforms and AI
//! generation are encoded in the URL path and resolved lazily by the CDN —
//! no separate API call. A derived URL is only committed as a node source
//! after a successful load attempt (see `editor::image`).

pub mod transform;

use hmac::{Hmac, Mac};
use sha1::Sha1;

use crate::db::{repos::settings, settings_keys, DbPool};
use crate::error::AppError;

type HmacSha1 = Hmac<Sha1>;

const DEFAULT_UPLOAD_ENDPOINT: &str = "https://upload.imagekit.io/api/v1/files/upload";
const UPLOAD_FOLDER: &str = "/website-images";

/// How long a signed upload credential stays valid.
const UPLOAD_CREDENTIAL_TTL_SECS: i64 = 30 * 60;

pub struct MediaClient {
    http: reqwest::Client,
    url_endpoint: String,
    public_key: String,
    private_key: String,
    upload_endpoint: String,
}

impl MediaClient {
    pub fn new(url_endpoint: String, public_key: String, private_key: String) -> Self {
        let http = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(15))
            .build()
            .expect("failed to build reqwest client");

        Self {
            http,
            url_endpoint: url_endpoint.trim_end_matches('/').to_string(),
            public_key,
            private_key,
            upload_endpoint: DEFAULT_UPLOAD_ENDPOINT.to_string(),
        }
    }

    #[cfg(test)]
    pub fn with_upload_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.upload_endpoint = endpoint.into();
        self
    }

    /// Resolve configuration from settings, falling back to env
    /// (`MEDIA_URL_ENDPOINT`, `MEDIA_PUBLIC_KEY`, `MEDIA_PRIVATE_KEY`).
    pub fn from_settings(pool: &DbPool) -> Result<Self, AppError> {
        let url_endpoint = settings::get(pool, settings_keys::MEDIA_URL_ENDPOINT)?
            .or_else(|| std::env::var("MEDIA_URL_ENDPOINT").ok())
            .unwrap_or_default();
        let public_key = settings::get(pool, settings_keys::MEDIA_PUBLIC_KEY)?
            .or_else(|| std::env::var("MEDIA_PUBLIC_KEY").ok())
            .unwrap_or_default();
        let private_key = settings::get(pool, settings_keys::MEDIA_PRIVATE_KEY)?
            .or_else(|| std::env::var("MEDIA_PRIVATE_KEY").ok())
            .unwrap_or_default();

        if url_endpoint.is_empty() {
            tracing::warn!("No media URL endpoint configured — image uploads will fail until one is set");
        }

        Ok(Self::new(url_endpoint, public_key, private_key))
    }

    /// Signature over `token + expire`, hex-encoded — the credential the
    /// upload endpoint verifies against our private key.
    pub fn sign_upload(&self, token: &str, expire: i64) -> String {
        let mut mac = HmacSha1::new_from_slice(self.private_key.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(token.as_bytes());
        mac.update(expire.to_string().as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Upload raw image bytes; returns the stable URL the service assigned.
    pub async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, AppError> {
        let token = uuid::Uuid::new_v4().to_string();
        let expire = chrono::Utc::now().timestamp() + UPLOAD_CREDENTIAL_TTL_SECS;
        let signature = self.sign_upload(&token, expire);

        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string()),
            )
            .text("fileName", file_name.to_string())
            .text("folder", UPLOAD_FOLDER.to_string())
            .text("publicKey", self.public_key.clone())
            .text("signature", signature)
            .text("expire", expire.to_string())
            .text("token", token);

        let response = self
            .http
            .post(&self.upload_endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::Media(format!("upload failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::Media(format!(
                "upload returned {status}: {}",
                detail.chars().take(200).collect::<String>()
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AppError::Media(format!("invalid upload response: {e}")))?;

        body.get("url")
            .and_then(|u| u.as_str())
            .map(String::from)
            .ok_or_else(|| AppError::Media("upload response missing url".into()))
    }

    /// AI-generation URL: the prompt rides in the path and the service
    /// renders the image on first load.
    pub fn generation_url(&self, prompt: &str, file_name: &str) -> String {
        let cleaned = clean_prompt(prompt);
        format!(
            "{}/ik-genimg-prompt-{}/ai-generated/{}",
            self.url_endpoint,
            urlencoding::encode(&cleaned),
            file_name
        )
    }

    /// Attempt to load a derived URL. Success requires a 2xx status and an
    /// image content type — the service returns HTML error pages with 200
    /// on some transform failures.
    pub async fn verify_loads(&self, url: &str) -> Result<(), AppError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::Media(format!("image failed to load: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Media(format!("image returned {status}")));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if !content_type.starts_with("image/") {
            return Err(AppError::Media(format!(
                "expected an image, got {content_type}"
            )));
        }

        Ok(())
    }
}

/// Strip characters the generation URL scheme chokes on and collapse runs
/// of whitespace.
fn clean_prompt(prompt: &str) -> String {
    static NON_ALNUM: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
    let re = NON_ALNUM.get_or_init(|| regex::Regex::new(r"[^a-zA-Z0-9\s]").expect("static regex"));
    let stripped = re.replace_all(prompt.trim(), "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}
