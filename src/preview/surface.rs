//! The preview surface: owner of the rendered document body.
//!
//! Two writers exist for the live document — bulk replacement here and
//! in-place node edits from the editor — and they must never interleave.
//! Entering edit mode pauses pushes (they coalesce into `pending`);
//! leaving edit mode flushes the editor's readback into `body` first.

use std::time::{Duration, Instant};

use serde::Serialize;
use ts_rs::TS;

/// Minimum time between emitted renders. Distinct from the throttler's
/// growth gate: this protects the surface itself from back-to-back layout
/// thrash even when several updates pass the growth gate at once.
pub const MIN_RENDER_INTERVAL: Duration = Duration::from_millis(100);

/// Payload emitted to the frontend for each committed render.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RenderPayload {
    /// Monotonically increasing; the frontend drops out-of-order payloads.
    pub revision: u64,
    pub body: String,
    /// Scroll to reveal newly appended bottom content.
    pub reveal: bool,
    /// Prefer smooth scrolling; the frontend falls back to a direct jump
    /// when smooth scroll fails.
    pub smooth: bool,
}

#[derive(Debug)]
pub struct PreviewSurface {
    body: String,
    revision: u64,
    last_render_at: Option<Instant>,
    pending: Option<String>,
    paused: bool,
    min_interval: Duration,
}

impl PreviewSurface {
    pub fn new() -> Self {
        Self::with_min_interval(MIN_RENDER_INTERVAL)
    }

    /// Surface with a custom debounce window. Tests use `Duration::ZERO`
    /// to make every offered render observable.
    pub fn with_min_interval(min_interval: Duration) -> Self {
        Self {
            body: String::new(),
            revision: 0,
            last_render_at: None,
            pending: None,
            paused: false,
            min_interval,
        }
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Discard all content for a brand-new generation. Old content is
    /// dropped wholesale, not diffed; callers clear any editor selection
    /// before this runs. Revisions keep increasing across resets so stale
    /// payloads from the previous generation can never win.
    pub fn reset(&mut self) {
        self.body.clear();
        self.pending = None;
        self.last_render_at = None;
    }

    /// Offer new content. Returns a payload when a render is emitted now;
    /// inside the debounce window (or while paused) the content is kept as
    /// `pending` and coalesced into a later commit.
    pub fn render(&mut self, html: &str) -> Option<RenderPayload> {
        self.render_at(html, Instant::now())
    }

    fn render_at(&mut self, html: &str, now: Instant) -> Option<RenderPayload> {
        if self.paused {
            self.pending = Some(html.to_string());
            return None;
        }
        if let Some(last) = self.last_render_at {
            if now.duration_since(last) < self.min_interval {
                self.pending = Some(html.to_string());
                return None;
            }
        }
        Some(self.commit(html.to_string(), now))
    }

    /// Unconditional commit for the stream's final flush — bypasses the
    /// debounce window but still respects the edit-mode pause.
    pub fn render_final(&mut self, html: &str) -> Option<RenderPayload> {
        if self.paused {
            self.pending = Some(html.to_string());
            return None;
        }
        Some(self.commit(html.to_string(), Instant::now()))
    }

    /// Pause bulk pushes while the editor owns the document.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume pushes; any coalesced pending content commits immediately.
    pub fn resume(&mut self) -> Option<RenderPayload> {
        self.paused = false;
        let pending = self.pending.take()?;
        Some(self.commit(pending, Instant::now()))
    }

    /// Editor readback: in-place edits become the canonical body without
    /// emitting a render (the surface already shows them).
    pub fn set_body(&mut self, html: impl Into<String>) {
        self.body = html.into();
        self.pending = None;
    }

    fn commit(&mut self, html: String, now: Instant) -> RenderPayload {
        self.body = html;
        self.revision += 1;
        self.last_render_at = Some(now);
        self.pending = None;
        RenderPayload {
            revision: self.revision,
            body: self.body.clone(),
            reveal: true,
            smooth: true,
        }
    }
}

impl Default for PreviewSurface {
    fn default() -> Self {
        Self::new()
    }
}
