mod openrouter;

pub use openrouter::OpenRouterProvider;

use async_trait::async_trait;

use crate::db::models::ChatMessage;
use crate::engine::sse::DeltaStream;
use crate::error::AppError;

/// Seam for the hosted completion endpoint. One implementation ships
/// (OpenRouter-compatible); the trait keeps the generation driver testable
/// against a scripted stream.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Open one streaming completion for the given ordered message list.
    ///
    /// A non-success HTTP status is a hard failure with no partial stream.
    async fn open_stream(&self, messages: &[ChatMessage]) -> Result<DeltaStream, AppError>;
}
