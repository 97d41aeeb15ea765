//! Navigation menu models

use serde::Serialize;

/// Icon asset shown next to a menu entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Icon {
    Folder,
    History,
    Settings,
    Branch,
}

/// Node of the navigation tree.
///
/// `children: Some(_)` marks an expandable folder even when the list is empty;
/// `None` marks a leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<MenuItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<Icon>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
}

impl MenuItem {
    pub fn leaf(id: &str, label: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            children: None,
            icon: None,
            class_name: None,
        }
    }

    pub fn folder(id: &str, label: &str, children: Vec<MenuItem>) -> Self {
        Self {
            children: Some(children),
            ..Self::leaf(id, label)
        }
    }

    pub fn with_icon(mut self, icon: Icon) -> Self {
        self.icon = Some(icon);
        self
    }

    pub fn is_folder(&self) -> bool {
        self.children.is_some()
    }
}

/// Render instruction for one visible node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderNode {
    pub id: String,
    pub label: String,
    pub icon: Option<Icon>,
    pub class_name: Option<String>,
    pub depth: usize,
    pub is_folder: bool,
    pub is_expanded: bool,
    /// Only top-level folders with children get an expand/collapse glyph
    pub show_toggle: bool,
    pub children: Vec<RenderNode>,
}
