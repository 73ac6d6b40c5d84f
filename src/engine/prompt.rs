//! Instruction templates sent to the completion endpoint.
//!
//! A design request gets the strict code-generation template; anything else
//! gets the conversational system prompt. Both are fixed text — the only
//! substitution is the user's input.

use crate::db::models::ChatMessage;
use crate::engine::classify::RequestKind;

const USER_INPUT_SLOT: &str = "{userInput}";

/// Strict code-generation template. The output contract (single ```html
/// fence, no preamble) is what the extractor depends on.
const DESIGN_TEMPLATE: &str = r#"userInput: {userInput}

**Analyze the user's request first:**
1. If a specific UI framework or library is requested (Flowbite, Bootstrap, Material), use it.
2. Otherwise create a minimalist, modern, professional design using pure Tailwind CSS.
3. If only a single component is asked for (e.g. "just give me a button"), generate ONLY that component with minimal surrounding HTML.
4. Match the design style to the user's industry or use case.

**Core Requirements:**
- Generate complete, production-ready HTML styled with Tailwind CSS utility classes.
- Do NOT include <html>, <head>, or <title> tags — start directly with the body content.
- Fully responsive with proper breakpoints: sm (640px), md (768px), lg (1024px), xl (1280px).
- Semantic HTML5 elements (<header>, <nav>, <main>, <section>, <article>, <footer>).
- Interactive elements must be accessible: ARIA labels, keyboard navigation, visible focus states.
- Include a working mobile hamburger menu whenever navigation is present.

**Image Handling:**
- Use the placeholder image https://placehold.co/800x600 for every <img>.
- Every <img> tag MUST carry a highly detailed, AI-image-generation-ready prompt as its alt attribute: subject + action + environment + lighting + color palette + mood + style + camera details.
- Never use generic alts like "image" or "photo".

**Available Libraries (already loaded — do not add CDN links):**
- Tailwind CSS, Flowbite, Font Awesome 6 (<i class="fa-solid fa-...">),
  Chart.js, Swiper.js, Tippy.js (data-tippy-content), AOS, GSAP.
- Use Chart.js only for data visualization requests, Swiper only for
  carousels/galleries, GSAP/AOS for subtle scroll animations.

**Dark Mode:**
- Support prefers-color-scheme plus a manual toggle; dark surfaces with
  light text, identical layout and spacing in both modes.

**DO NOT:**
- Add <html>, <head> or <title> tags, CDN links, Lorem Ipsum, inline styles,
  or any explanatory text before or after the code.

**OUTPUT FORMAT:**
- Return ONLY the HTML code wrapped in ```html code fences.
- No preamble, no explanations. Start with the first semantic element."#;

/// Conversational system prompt for non-design turns.
const CONVERSATION_SYSTEM_PROMPT: &str = "You are Pageforge, an assistant specialized in web design and development. \
You can help users create websites and answer questions about HTML, CSS, Tailwind, and web design. \
When users greet you or ask general questions, respond naturally and helpfully. \
Only generate HTML code when the user explicitly asks you to create, build, or design something.";

/// Build the outgoing message list for one user turn.
pub fn build_messages(user_input: &str, kind: RequestKind) -> Vec<ChatMessage> {
    match kind {
        RequestKind::Design => vec![ChatMessage::user(
            DESIGN_TEMPLATE.replace(USER_INPUT_SLOT, user_input),
        )],
        RequestKind::Conversation => vec![
            ChatMessage::system(CONVERSATION_SYSTEM_PROMPT),
            ChatMessage::user(user_input),
        ],
    }
}

/// Canned acknowledgement appended to the chat when a design was produced —
/// the raw HTML never goes into the message list.
pub const DESIGN_READY_MESSAGE: &str = "Your website is ready! Check the preview.";
