//! Keyword heuristic deciding whether a user message is a design request
//! (strict code-generation template) or conversational (chat template).
//!
//! This is a heuristic, not a guarantee — false positives and negatives are
//! acceptable, and the vocabulary is the tunable policy.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Design,
    Conversation,
}

const DESIGN_KEYWORDS: &[&str] = &[
    "create", "build", "make", "design", "generate", "code",
    "website", "webpage", "page", "landing", "homepage",
    "form", "dashboard", "navbar", "header", "footer",
    "section", "component", "button", "card", "modal",
    "table", "chart", "graph", "slider", "carousel",
    "login", "signup", "register", "contact", "about",
    "pricing", "portfolio", "blog", "gallery", "hero",
    "sidebar", "menu", "navigation", "layout", "template",
    "html", "css", "tailwind", "ui", "interface",
    "add", "update", "change", "modify", "edit", "fix",
    "remove", "delete", "style", "responsive", "mobile",
];

pub fn classify(input: &str) -> RequestKind {
    let lower = input.to_lowercase();
    if DESIGN_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        RequestKind::Design
    } else {
        RequestKind::Conversation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_design_requests() {
        assert_eq!(classify("create a pricing page"), RequestKind::Design);
        assert_eq!(classify("BUILD me a dashboard"), RequestKind::Design);
        assert_eq!(classify("can you fix the navbar?"), RequestKind::Design);
    }

    #[test]
    fn test_conversational_input() {
        assert_eq!(classify("hello there"), RequestKind::Conversation);
        assert_eq!(classify("what can you do?"), RequestKind::Conversation);
    }

    #[test]
    fn test_keyword_inside_word_still_matches() {
        // Substring matching is intentional and crude: "decode" contains
        // "code". Accepted as a false positive of the heuristic.
        assert_eq!(classify("please decode this"), RequestKind::Design);
    }
}
