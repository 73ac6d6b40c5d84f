//! Direct-manipulation editor over the rendered surface.
//!
//! The backend owns the state machine and the selected node's attribute
//! maps; the webview reports pointer/keyboard events and applies the
//! returned [`EditDirective`]s imperatively. This keeps every transition
//! assertable in tests without a live document.
//!
//! Phases: `Idle → Hovering(node) ⇄ Idle → Selected(node, is_image) → Idle`.

pub mod image;
pub mod style;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use image::{ImageAttrs, ImagePanel};
use style::StylePanel;

/// Dashed outline while hovering — visually distinct from selection.
pub const HOVER_OUTLINE: &str = "2px dashed #3b82f6";
/// Solid outline on the selected node.
pub const SELECT_OUTLINE: &str = "2px solid #ef4444";

/// Stable reference to a node in the rendered body: child-index path from
/// the body root plus the tag name for image detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NodeRef {
    pub path: Vec<u32>,
    pub tag: String,
}

impl NodeRef {
    pub fn is_image(&self) -> bool {
        self.tag.eq_ignore_ascii_case("img")
    }
}

/// Click payload from the surface: the node plus a snapshot of its current
/// inline styles, class list, and (for images) media attributes, used to
/// seed the side panels.
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ClickTarget {
    pub node: NodeRef,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub styles: HashMap<String, String>,
    #[serde(default)]
    pub image: Option<ImageAttrs>,
}

/// Imperative mutation applied by the webview to the live surface.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum EditDirective {
    SetOutline { node: NodeRef, outline: String },
    ClearOutline { node: NodeRef },
    SetEditable { node: NodeRef, editable: bool },
    FocusNode { node: NodeRef },
    SetStyle { node: NodeRef, property: String, value: String },
    SetClassName { node: NodeRef, class_name: String },
    SetImage {
        node: NodeRef,
        src: String,
        alt: String,
        width: Option<u32>,
        height: Option<u32>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub node: NodeRef,
    pub is_image: bool,
}

#[derive(Debug, Default)]
enum Phase {
    #[default]
    Idle,
    Hovering(NodeRef),
    Selected(Selection),
}

#[derive(Debug, Default)]
pub struct EditorState {
    enabled: bool,
    phase: Phase,
    pub style: StylePanel,
    pub image: ImagePanel,
}

impl EditorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn selection(&self) -> Option<&Selection> {
        match &self.phase {
            Phase::Selected(sel) => Some(sel),
            _ => None,
        }
    }

    /// The selected node, required by panel mutations.
    pub fn selected_node(&self) -> Option<NodeRef> {
        self.selection().map(|s| s.node.clone())
    }

    /// Enter edit mode. Always starts from a clean slate.
    pub fn enable(&mut self) -> Vec<EditDirective> {
        let directives = self.clear_all();
        self.enabled = true;
        directives
    }

    /// Leave edit mode: clears selection and hover. The caller flushes the
    /// surface readback *before* invoking this so in-place text edits are
    /// captured first.
    pub fn disable(&mut self) -> Vec<EditDirective> {
        let directives = self.clear_all();
        self.enabled = false;
        directives
    }

    /// Pointer entered a candidate node. Ignored while something is selected.
    pub fn pointer_over(&mut self, node: NodeRef) -> Vec<EditDirective> {
        if !self.enabled {
            return vec![];
        }
        if matches!(self.phase, Phase::Selected(_)) {
            return vec![];
        }

        let mut out = Vec::new();
        if let Phase::Hovering(prev) = std::mem::take(&mut self.phase) {
            if prev == node {
                self.phase = Phase::Hovering(prev);
                return vec![];
            }
            out.push(EditDirective::ClearOutline { node: prev });
        }

        out.push(EditDirective::SetOutline {
            node: node.clone(),
            outline: HOVER_OUTLINE.into(),
        });
        self.phase = Phase::Hovering(node);
        out
    }

    /// Pointer left the hovered node.
    pub fn pointer_out(&mut self, node: &NodeRef) -> Vec<EditDirective> {
        let hovering_this = matches!(&self.phase, Phase::Hovering(current) if current == node);
        if !hovering_this {
            return vec![];
        }
        self.phase = Phase::Idle;
        vec![EditDirective::ClearOutline { node: node.clone() }]
    }

    /// Click selects a node. The previous selection loses its outline and
    /// editable attribute; images are never made text-editable.
    pub fn click(&mut self, target: ClickTarget) -> Vec<EditDirective> {
        if !self.enabled {
            return vec![];
        }

        let mut out = Vec::new();

        match std::mem::take(&mut self.phase) {
            Phase::Hovering(prev) if prev != target.node => {
                out.push(EditDirective::ClearOutline { node: prev });
            }
            Phase::Selected(prev) if prev.node != target.node => {
                out.push(EditDirective::ClearOutline {
                    node: prev.node.clone(),
                });
                if !prev.is_image {
                    out.push(EditDirective::SetEditable {
                        node: prev.node,
                        editable: false,
                    });
                }
            }
            _ => {}
        }

        let is_image = target.node.is_image();
        out.push(EditDirective::SetOutline {
            node: target.node.clone(),
            outline: SELECT_OUTLINE.into(),
        });
        if !is_image {
            out.push(EditDirective::SetEditable {
                node: target.node.clone(),
                editable: true,
            });
            out.push(EditDirective::FocusNode {
                node: target.node.clone(),
            });
        }

        self.style.seed(target.styles, target.classes);
        if let Some(attrs) = target.image {
            self.image.seed(attrs);
        }

        self.phase = Phase::Selected(Selection {
            node: target.node,
            is_image,
        });
        out
    }

    /// Escape clears the selection and returns to Idle.
    pub fn escape(&mut self) -> Vec<EditDirective> {
        if matches!(self.phase, Phase::Selected(_)) {
            self.clear_all()
        } else {
            vec![]
        }
    }

    /// Drop hover and selection unconditionally — runs before any bulk
    /// content replacement so no dangling node reference survives.
    pub fn clear_all(&mut self) -> Vec<EditDirective> {
        let mut out = Vec::new();
        match std::mem::take(&mut self.phase) {
            Phase::Hovering(node) => {
                out.push(EditDirective::ClearOutline { node });
            }
            Phase::Selected(sel) => {
                out.push(EditDirective::ClearOutline {
                    node: sel.node.clone(),
                });
                if !sel.is_image {
                    out.push(EditDirective::SetEditable {
                        node: sel.node,
                        editable: false,
                    });
                }
            }
            Phase::Idle => {}
        }
        self.style.clear();
        self.image.clear();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(tag: &str, path: &[u32]) -> NodeRef {
        NodeRef {
            path: path.to_vec(),
            tag: tag.into(),
        }
    }

    fn click_on(tag: &str, path: &[u32]) -> ClickTarget {
        ClickTarget {
            node: node(tag, path),
            classes: vec![],
            styles: HashMap::new(),
            image: None,
        }
    }

    fn enabled_editor() -> EditorState {
        let mut editor = EditorState::new();
        editor.enable();
        editor
    }

    #[test]
    fn test_hover_outlines_dashed() {
        let mut editor = enabled_editor();
        let directives = editor.pointer_over(node("div", &[0]));
        assert_eq!(
            directives,
            vec![EditDirective::SetOutline {
                node: node("div", &[0]),
                outline: HOVER_OUTLINE.into()
            }]
        );
    }

    #[test]
    fn test_hover_ignored_while_selected() {
        let mut editor = enabled_editor();
        editor.click(click_on("div", &[0]));
        assert!(editor.pointer_over(node("p", &[1])).is_empty());
    }

    #[test]
    fn test_pointer_out_clears_hover() {
        let mut editor = enabled_editor();
        editor.pointer_over(node("div", &[0]));
        let directives = editor.pointer_out(&node("div", &[0]));
        assert_eq!(
            directives,
            vec![EditDirective::ClearOutline {
                node: node("div", &[0])
            }]
        );
        assert!(editor.selection().is_none());
    }

    #[test]
    fn test_selection_exclusivity() {
        let mut editor = enabled_editor();
        editor.click(click_on("div", &[0]));

        let directives = editor.click(click_on("p", &[1]));

        // A loses outline and editable attribute; B gains exactly the
        // selection styling.
        assert!(directives.contains(&EditDirective::ClearOutline {
            node: node("div", &[0])
        }));
        assert!(directives.contains(&EditDirective::SetEditable {
            node: node("div", &[0]),
            editable: false
        }));
        assert!(directives.contains(&EditDirective::SetOutline {
            node: node("p", &[1]),
            outline: SELECT_OUTLINE.into()
        }));
        assert_eq!(editor.selection().unwrap().node, node("p", &[1]));
    }

    #[test]
    fn test_images_are_never_text_editable() {
        let mut editor = enabled_editor();
        let directives = editor.click(click_on("img", &[2]));

        assert!(editor.selection().unwrap().is_image);
        assert!(!directives
            .iter()
            .any(|d| matches!(d, EditDirective::SetEditable { .. })));
        assert!(!directives
            .iter()
            .any(|d| matches!(d, EditDirective::FocusNode { .. })));
    }

    #[test]
    fn test_text_nodes_become_editable_and_focused() {
        let mut editor = enabled_editor();
        let directives = editor.click(click_on("h1", &[0, 1]));

        assert!(directives.contains(&EditDirective::SetEditable {
            node: node("h1", &[0, 1]),
            editable: true
        }));
        assert!(directives.contains(&EditDirective::FocusNode {
            node: node("h1", &[0, 1])
        }));
    }

    #[test]
    fn test_escape_returns_to_idle() {
        let mut editor = enabled_editor();
        editor.click(click_on("div", &[0]));

        let directives = editor.escape();

        assert!(editor.selection().is_none());
        assert!(directives.contains(&EditDirective::ClearOutline {
            node: node("div", &[0])
        }));
        // Escape with no selection is a no-op.
        assert!(editor.escape().is_empty());
    }

    #[test]
    fn test_disabled_editor_ignores_events() {
        let mut editor = EditorState::new();
        assert!(editor.pointer_over(node("div", &[0])).is_empty());
        assert!(editor.click(click_on("div", &[0])).is_empty());
    }

    #[test]
    fn test_disable_clears_selection() {
        let mut editor = enabled_editor();
        editor.click(click_on("div", &[0]));

        editor.disable();

        assert!(!editor.enabled());
        assert!(editor.selection().is_none());
    }

    #[test]
    fn test_click_seeds_style_panel() {
        let mut editor = enabled_editor();
        let mut styles = HashMap::new();
        styles.insert("color".to_string(), "#ff0000".to_string());

        editor.click(ClickTarget {
            node: node("div", &[0]),
            classes: vec!["p-4".into(), "rounded".into()],
            styles,
            image: None,
        });

        assert_eq!(editor.style.get("color"), Some("#ff0000"));
        assert_eq!(editor.style.classes(), &["p-4", "rounded"]);
    }
}
