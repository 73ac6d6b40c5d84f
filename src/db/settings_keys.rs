//! Canonical settings key constants for the `app_settings` table.
//!
//! Use these instead of raw string literals to prevent typo-based key mismatches.

/// Completion endpoint API key (OpenRouter `sk-or-...`).
pub const COMPLETION_API_KEY: &str = "completion_api_key";

/// Completion endpoint base URL override.
pub const COMPLETION_BASE_URL: &str = "completion_base_url";

/// Model identifier sent with every completion request.
pub const COMPLETION_MODEL: &str = "completion_model";

/// Media service URL endpoint (e.g. `https://ik.imagekit.io/<id>`).
pub const MEDIA_URL_ENDPOINT: &str = "media_url_endpoint";

/// Media service public API key (sent with uploads).
pub const MEDIA_PUBLIC_KEY: &str = "media_public_key";

/// Media service private API key (signs upload credentials).
pub const MEDIA_PRIVATE_KEY: &str = "media_private_key";

/// Minimum growth (in chars of extracted code) before a preview push.
pub const PREVIEW_GROWTH_THRESHOLD: &str = "preview_growth_threshold";
