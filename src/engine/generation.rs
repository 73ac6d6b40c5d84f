//! Per-turn generation driver.
//!
//! One task per user turn: classify the input, open a completion stream,
//! route every delta through accumulator → extractor → throttler, push
//! committed updates into the preview surface, and on completion persist
//! the finished design exactly once.
//!
//! Abandonment: starting a new turn cancels the previous handle's token
//! before the new task spawns, so a stale task drops its in-flight deltas
//! and never writes to the store.

use std::sync::{Arc, Mutex};

use futures_util::StreamExt;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use ts_rs::TS;

use crate::db::models::ChatMessage;
use crate::db::repos::{chats, frames};
use crate::db::DbPool;
use crate::engine::classify::{self, RequestKind};
use crate::engine::extract;
use crate::engine::prompt;
use crate::engine::provider::ChatProvider;
use crate::engine::sse::StreamDelta;
use crate::engine::throttle::UpdateThrottler;
use crate::error::AppError;
use crate::preview::surface::{PreviewSurface, RenderPayload};

/// Tracks the one in-flight generation. Replacing the handle (after
/// cancelling its token) is how a new turn abandons the previous one.
pub struct GenerationHandle {
    pub generation_id: String,
    pub frame_id: String,
    pub cancel: CancellationToken,
}

pub type ActiveGeneration = Arc<Mutex<Option<GenerationHandle>>>;

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct GenerationStatusEvent {
    pub generation_id: String,
    pub frame_id: String,
    /// "streaming" | "completed" | "failed" | "abandoned"
    pub status: String,
    pub message: Option<String>,
    pub error: Option<String>,
}

/// Outbound event seam. The Tauri app handle implements this; tests use a
/// collecting sink.
pub trait EventSink: Send + Sync {
    fn emit_status(&self, event: GenerationStatusEvent);
    fn emit_preview(&self, payload: RenderPayload);
}

pub struct GenerationParams {
    pub pool: DbPool,
    pub provider: Arc<dyn ChatProvider>,
    pub surface: Arc<Mutex<PreviewSurface>>,
    pub sink: Arc<dyn EventSink>,
    pub active: ActiveGeneration,
    pub cancel: CancellationToken,
    pub generation_id: String,
    pub frame_id: String,
    pub project_id: String,
    pub user_input: String,
    pub growth_threshold: usize,
}

/// Install a new handle as the active generation, cancelling any previous
/// one first. Returns the token the new task must watch.
pub fn install_handle(
    active: &ActiveGeneration,
    generation_id: &str,
    frame_id: &str,
) -> CancellationToken {
    let cancel = CancellationToken::new();
    let mut guard = active.lock().unwrap();
    if let Some(previous) = guard.take() {
        tracing::info!(
            generation_id = %previous.generation_id,
            "Abandoning previous generation before starting a new one"
        );
        previous.cancel.cancel();
    }
    *guard = Some(GenerationHandle {
        generation_id: generation_id.to_string(),
        frame_id: frame_id.to_string(),
        cancel: cancel.clone(),
    });
    cancel
}

fn still_active(active: &ActiveGeneration, generation_id: &str) -> bool {
    active
        .lock()
        .unwrap()
        .as_ref()
        .map(|h| h.generation_id == generation_id)
        .unwrap_or(false)
}

fn release_handle(active: &ActiveGeneration, generation_id: &str) {
    let mut guard = active.lock().unwrap();
    if guard
        .as_ref()
        .map(|h| h.generation_id == generation_id)
        .unwrap_or(false)
    {
        *guard = None;
    }
}

pub async fn run_generation(params: GenerationParams) {
    let GenerationParams {
        pool,
        provider,
        surface,
        sink,
        active,
        cancel,
        generation_id,
        frame_id,
        project_id,
        user_input,
        growth_threshold,
    } = params;

    let status = |status: &str, message: Option<String>, error: Option<String>| {
        GenerationStatusEvent {
            generation_id: generation_id.clone(),
            frame_id: frame_id.clone(),
            status: status.into(),
            message,
            error,
        }
    };

    let kind = classify::classify(&user_input);
    tracing::info!(
        generation_id = %generation_id,
        frame_id = %frame_id,
        design = matches!(kind, RequestKind::Design),
        "Starting generation"
    );

    // Session step 1: append the user's message and persist the list.
    let mut messages = chats::get_messages(&pool, &frame_id).unwrap_or_default();
    messages.push(ChatMessage::user(user_input.clone()));
    if let Err(e) = chats::save_messages(&pool, &frame_id, &messages) {
        tracing::error!(error = %e, "Failed to save user message");
    }

    sink.emit_status(status("streaming", None, None));

    let outgoing = prompt::build_messages(&user_input, kind);
    let mut stream = match provider.open_stream(&outgoing).await {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Completion stream failed to open");
            messages.push(ChatMessage::assistant(
                "Sorry, there was an error generating the response.",
            ));
            let _ = chats::save_messages(&pool, &frame_id, &messages);
            sink.emit_status(status("failed", None, Some(e.to_string())));
            release_handle(&active, &generation_id);
            return;
        }
    };

    let mut raw = String::new();
    let mut throttler = UpdateThrottler::new(growth_threshold);
    let mut transport_error: Option<AppError> = None;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!(generation_id = %generation_id, "Generation abandoned mid-stream");
                sink.emit_status(status("abandoned", None, None));
                return;
            }
            next = stream.next() => match next {
                Some(Ok(StreamDelta::Content(text))) => {
                    raw.push_str(&text);
                    if kind == RequestKind::Design {
                        let extracted = extract::extract_html(&raw);
                        if throttler.offer(extracted.len()) {
                            let payload = surface.lock().unwrap().render(extracted);
                            if let Some(p) = payload {
                                sink.emit_preview(p);
                            }
                        }
                    }
                }
                Some(Ok(StreamDelta::Done)) | None => break,
                Some(Err(e)) => {
                    transport_error = Some(e);
                    break;
                }
            }
        }
    }

    // A turn that lost the active slot while draining must not touch the
    // store or the message list, even if its token races the check.
    if cancel.is_cancelled() || !still_active(&active, &generation_id) {
        tracing::info!(generation_id = %generation_id, "Generation abandoned, skipping finalization");
        sink.emit_status(status("abandoned", None, None));
        return;
    }

    if let Some(e) = transport_error {
        tracing::error!(error = %e, "Completion stream failed mid-flight");
        messages.push(ChatMessage::assistant(
            "Sorry, there was an error generating the response.",
        ));
        let _ = chats::save_messages(&pool, &frame_id, &messages);
        sink.emit_status(status("failed", None, Some(e.to_string())));
        release_handle(&active, &generation_id);
        return;
    }

    let produced_code = kind == RequestKind::Design && extract::has_fenced_block(&raw);

    if produced_code {
        let final_code = extract::extract_html(&raw).to_string();
        throttler.final_flush(final_code.len());

        // Unconditional final commit, then persist the complete artifact
        // exactly once.
        let payload = surface.lock().unwrap().render_final(&final_code);
        if let Some(p) = payload {
            sink.emit_preview(p);
        }

        match frames::update_design_code(&pool, &frame_id, &project_id, &final_code) {
            Ok(()) => {
                tracing::info!(len = final_code.len(), "Design code persisted");
            }
            Err(e) => {
                // In-memory state stays; the user can re-trigger the save.
                tracing::error!(error = %e, "Failed to persist design code");
                sink.emit_status(status(
                    "failed",
                    Some(prompt::DESIGN_READY_MESSAGE.into()),
                    Some(format!("Design completed but failed to save: {e}")),
                ));
            }
        }
        messages.push(ChatMessage::assistant(prompt::DESIGN_READY_MESSAGE));
    } else {
        // Extraction miss or conversational turn — the raw text is the reply.
        messages.push(ChatMessage::assistant(raw.clone()));
    }

    if let Err(e) = chats::save_messages(&pool, &frame_id, &messages) {
        tracing::error!(error = %e, "Failed to save assistant message");
    }

    release_handle(&active, &generation_id);
    sink.emit_status(status(
        "completed",
        messages.last().map(|m| m.content.clone()),
        None,
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_test_db;
    use crate::db::repos::projects;
    use crate::engine::sse::DeltaStream;
    use async_trait::async_trait;
    use futures_util::stream;
    use std::time::Duration;

    struct ScriptedProvider {
        deltas: Vec<StreamDelta>,
        hang_after: bool,
    }

    #[async_trait]
    impl ChatProvider for ScriptedProvider {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn open_stream(&self, _messages: &[ChatMessage]) -> Result<DeltaStream, AppError> {
            let items: Vec<Result<StreamDelta, AppError>> =
                self.deltas.iter().cloned().map(Ok).collect();
            if self.hang_after {
                Ok(Box::pin(stream::iter(items).chain(stream::pending())))
            } else {
                Ok(Box::pin(stream::iter(items)))
            }
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl ChatProvider for FailingProvider {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn open_stream(&self, _messages: &[ChatMessage]) -> Result<DeltaStream, AppError> {
            Err(AppError::Completion("completion endpoint returned 500".into()))
        }
    }

    #[derive(Default)]
    struct CollectingSink {
        statuses: Mutex<Vec<GenerationStatusEvent>>,
        previews: Mutex<Vec<RenderPayload>>,
    }

    impl EventSink for CollectingSink {
        fn emit_status(&self, event: GenerationStatusEvent) {
            self.statuses.lock().unwrap().push(event);
        }

        fn emit_preview(&self, payload: RenderPayload) {
            self.previews.lock().unwrap().push(payload);
        }
    }

    struct Fixture {
        pool: DbPool,
        surface: Arc<Mutex<PreviewSurface>>,
        sink: Arc<CollectingSink>,
        active: ActiveGeneration,
    }

    fn fixture() -> Fixture {
        let pool = init_test_db().unwrap();
        projects::bootstrap(&pool, "proj-1", "frame-1", "ada@example.com", "[]").unwrap();
        Fixture {
            pool,
            surface: Arc::new(Mutex::new(PreviewSurface::with_min_interval(
                Duration::ZERO,
            ))),
            sink: Arc::new(CollectingSink::default()),
            active: Arc::new(Mutex::new(None)),
        }
    }

    fn params_for(
        fx: &Fixture,
        provider: Arc<dyn ChatProvider>,
        generation_id: &str,
        user_input: &str,
    ) -> GenerationParams {
        let cancel = install_handle(&fx.active, generation_id, "frame-1");
        GenerationParams {
            pool: fx.pool.clone(),
            provider,
            surface: fx.surface.clone(),
            sink: fx.sink.clone(),
            active: fx.active.clone(),
            cancel,
            generation_id: generation_id.into(),
            frame_id: "frame-1".into(),
            project_id: "proj-1".into(),
            user_input: user_input.into(),
            growth_threshold: 500,
        }
    }

    /// Fenced HTML stream growing past the threshold in two visible steps.
    fn design_deltas() -> Vec<StreamDelta> {
        let mut deltas = vec![StreamDelta::Content("```html\n<main>".into())];
        for i in 0..30 {
            deltas.push(StreamDelta::Content(format!(
                "<section class=\"px-8 py-16\"><h2>Plan {i}</h2><p>A tier with room to grow.</p></section>"
            )));
        }
        deltas.push(StreamDelta::Content("</main>\n```".into()));
        deltas.push(StreamDelta::Done);
        deltas
    }

    #[tokio::test]
    async fn test_design_turn_end_to_end() {
        let fx = fixture();
        let provider = Arc::new(ScriptedProvider {
            deltas: design_deltas(),
            hang_after: false,
        });

        run_generation(params_for(&fx, provider, "gen-1", "create a pricing page")).await;

        // At least two intermediate commits plus one final commit.
        let previews = fx.sink.previews.lock().unwrap();
        assert!(previews.len() >= 3, "got {} previews", previews.len());
        let final_body = &previews.last().unwrap().body;
        assert!(final_body.starts_with("<main>"));
        assert!(final_body.ends_with("</main>"));

        // Renderer commits are monotonic in content length.
        for pair in previews.windows(2) {
            assert!(pair[1].body.len() >= pair[0].body.len());
            assert!(pair[1].revision > pair[0].revision);
        }
        drop(previews);

        // Exactly one PUT with the final HTML.
        let frame = frames::get_by_id(&fx.pool, "frame-1", "proj-1").unwrap();
        let code = frame.design_code.unwrap();
        assert!(code.starts_with("<main>"));
        assert!(!code.contains("```"));

        // Chat holds user message + acknowledgement, never the raw HTML.
        let messages = chats::get_messages(&fx.pool, "frame-1").unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].content, prompt::DESIGN_READY_MESSAGE);

        let statuses = fx.sink.statuses.lock().unwrap();
        assert_eq!(statuses.last().unwrap().status, "completed");
        assert!(fx.active.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_conversational_turn_keeps_raw_reply() {
        let fx = fixture();
        let provider = Arc::new(ScriptedProvider {
            deltas: vec![
                StreamDelta::Content("Hello! I can help".into()),
                StreamDelta::Content(" you design websites.".into()),
                StreamDelta::Done,
            ],
            hang_after: false,
        });

        run_generation(params_for(&fx, provider, "gen-1", "hey, who are you?")).await;

        assert!(fx.sink.previews.lock().unwrap().is_empty());
        let messages = chats::get_messages(&fx.pool, "frame-1").unwrap();
        assert_eq!(
            messages[1].content,
            "Hello! I can help you design websites."
        );
        // Nothing persisted to the frame.
        let frame = frames::get_by_id(&fx.pool, "frame-1", "proj-1").unwrap();
        assert!(frame.design_code.is_none());
    }

    #[tokio::test]
    async fn test_extraction_miss_surfaces_raw_text() {
        let fx = fixture();
        // Classified as a design request but the model never fenced any code.
        let provider = Arc::new(ScriptedProvider {
            deltas: vec![
                StreamDelta::Content("I need more details about the page first.".into()),
                StreamDelta::Done,
            ],
            hang_after: false,
        });

        run_generation(params_for(&fx, provider, "gen-1", "build something")).await;

        let messages = chats::get_messages(&fx.pool, "frame-1").unwrap();
        assert_eq!(
            messages[1].content,
            "I need more details about the page first."
        );
        let frame = frames::get_by_id(&fx.pool, "frame-1", "proj-1").unwrap();
        assert!(frame.design_code.is_none());
    }

    #[tokio::test]
    async fn test_transport_failure_aborts_without_persisting() {
        let fx = fixture();
        run_generation(params_for(
            &fx,
            Arc::new(FailingProvider),
            "gen-1",
            "create a landing page",
        ))
        .await;

        let statuses = fx.sink.statuses.lock().unwrap();
        assert_eq!(statuses.last().unwrap().status, "failed");
        drop(statuses);

        let frame = frames::get_by_id(&fx.pool, "frame-1", "proj-1").unwrap();
        assert!(frame.design_code.is_none());
        let messages = chats::get_messages(&fx.pool, "frame-1").unwrap();
        assert!(messages[1].content.contains("error"));
    }

    #[tokio::test]
    async fn test_abandon_on_restart_drops_stale_turn() {
        let fx = fixture();

        // Turn 1: stream hangs open after a few deltas.
        let mut turn1 = design_deltas();
        turn1.truncate(5); // no Done — stays open
        let provider1 = Arc::new(ScriptedProvider {
            deltas: turn1,
            hang_after: true,
        });
        let params1 = params_for(&fx, provider1, "gen-1", "create a pricing page");
        let task1 = tokio::spawn(run_generation(params1));

        tokio::time::sleep(Duration::from_millis(50)).await;

        // Turn 2 installs a new handle, cancelling turn 1.
        let provider2 = Arc::new(ScriptedProvider {
            deltas: design_deltas(),
            hang_after: false,
        });
        let params2 = params_for(&fx, provider2, "gen-2", "create a contact page");
        fx.surface.lock().unwrap().reset();
        run_generation(params2).await;
        task1.await.unwrap();

        // Turn 1 ended as abandoned and never finalized.
        let statuses = fx.sink.statuses.lock().unwrap();
        let gen1_last = statuses
            .iter()
            .filter(|s| s.generation_id == "gen-1")
            .next_back()
            .unwrap();
        assert_eq!(gen1_last.status, "abandoned");
        drop(statuses);

        // The persisted frame comes from turn 2 only.
        let frame = frames::get_by_id(&fx.pool, "frame-1", "proj-1").unwrap();
        assert!(frame.design_code.is_some());

        // Turn 1's acknowledgement never reached the chat.
        let messages = chats::get_messages(&fx.pool, "frame-1").unwrap();
        let acks = messages
            .iter()
            .filter(|m| m.content == prompt::DESIGN_READY_MESSAGE)
            .count();
        assert_eq!(acks, 1);
    }
}
