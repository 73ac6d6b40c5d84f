//! Style side-panel state for the selected node.
//!
//! The panel's attribute map is the source of truth; the live surface only
//! ever receives it as imperative directives. External mutation paths do
//! not exist — the editor is the single writer of class-list state.

use std::collections::{BTreeMap, HashMap};

use crate::error::AppError;

use super::{EditDirective, NodeRef};

/// Inline properties the panel exposes.
pub const STYLE_PROPERTIES: &[&str] = &[
    "text-align",
    "font-size",
    "color",
    "background-color",
    "border-radius",
    "padding",
    "margin",
    "width",
    "height",
];

#[derive(Debug, Default)]
pub struct StylePanel {
    styles: BTreeMap<String, String>,
    classes: Vec<String>,
}

impl StylePanel {
    /// Load the snapshot taken at selection time.
    pub fn seed(&mut self, styles: HashMap<String, String>, classes: Vec<String>) {
        self.styles = styles.into_iter().collect();
        self.classes.clear();
        for class in classes {
            let trimmed = class.trim();
            if !trimmed.is_empty() && !self.classes.iter().any(|c| c == trimmed) {
                self.classes.push(trimmed.to_string());
            }
        }
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.styles.get(property).map(String::as_str)
    }

    pub fn styles(&self) -> &BTreeMap<String, String> {
        &self.styles
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Set an inline style property on the selected node.
    pub fn set_property(
        &mut self,
        node: &NodeRef,
        property: &str,
        value: &str,
    ) -> Result<EditDirective, AppError> {
        if !STYLE_PROPERTIES.contains(&property) {
            return Err(AppError::Validation(format!(
                "unsupported style property '{property}'"
            )));
        }
        self.styles.insert(property.to_string(), value.to_string());
        Ok(EditDirective::SetStyle {
            node: node.clone(),
            property: property.to_string(),
            value: value.to_string(),
        })
    }

    /// Append a class name. Duplicates are rejected.
    pub fn add_class(&mut self, node: &NodeRef, name: &str) -> Result<EditDirective, AppError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation("class name is empty".into()));
        }
        if self.classes.iter().any(|c| c == trimmed) {
            return Err(AppError::Validation(format!(
                "class '{trimmed}' is already applied"
            )));
        }
        self.classes.push(trimmed.to_string());
        Ok(self.class_directive(node))
    }

    /// Remove a class by name.
    pub fn remove_class(&mut self, node: &NodeRef, name: &str) -> Result<EditDirective, AppError> {
        let before = self.classes.len();
        self.classes.retain(|c| c != name);
        if self.classes.len() == before {
            return Err(AppError::Validation(format!(
                "class '{name}' is not applied"
            )));
        }
        Ok(self.class_directive(node))
    }

    pub fn clear(&mut self) {
        self.styles.clear();
        self.classes.clear();
    }

    fn class_directive(&self, node: &NodeRef) -> EditDirective {
        EditDirective::SetClassName {
            node: node.clone(),
            class_name: self.classes.join(" "),
        }
    }
}
