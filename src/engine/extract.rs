//! Best-effort HTML extraction from a growing model-output buffer.
//!
//! The model is asked to return its design inside a ```html fence, but the
//! buffer is re-extracted on every stream delta, so most calls see an
//! unterminated fence. Extraction is pure and re-derives from the full
//! buffer each time — no stream history, idempotent by construction.

const FENCE_OPEN: &str = "```html";
const FENCE_CLOSE: &str = "```";

/// Extract the HTML payload from raw model output.
///
/// - Opening fence with a matching close: the trimmed interior.
/// - Opening fence, close not arrived yet: trimmed interior to end of buffer.
/// - No fence but the buffer already contains a `<`: the whole trimmed
///   buffer (some models skip fencing entirely).
/// - Anything else: empty — there is no code yet.
pub fn extract_html(raw: &str) -> &str {
    if let Some(open) = raw.find(FENCE_OPEN) {
        let interior = &raw[open + FENCE_OPEN.len()..];
        return match interior.find(FENCE_CLOSE) {
            Some(close) => interior[..close].trim(),
            None => interior.trim(),
        };
    }

    if raw.contains('<') {
        return raw.trim();
    }

    ""
}

/// True when the buffer holds a started fenced block (closed or not).
pub fn has_fenced_block(raw: &str) -> bool {
    raw.contains(FENCE_OPEN)
}
