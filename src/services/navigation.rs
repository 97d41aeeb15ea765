//! Navigation tree: static skeleton merged with the loaded branches

use std::collections::BTreeSet;

use crate::models::{Branch, Icon, MenuItem, RenderNode};

pub const WORKSPACE_ID: &str = "workspace";
pub const BRANCHES_ID: &str = "branches";
pub const CURRENT_BRANCH_CLASS: &str = "current-branch";

/// Fixed top-level folders before any branch data is merged in
pub fn skeleton() -> Vec<MenuItem> {
    vec![
        MenuItem::folder(
            WORKSPACE_ID,
            "Workspace",
            vec![
                MenuItem::leaf("history", "History").with_icon(Icon::History),
                MenuItem::leaf("settings", "Settings").with_icon(Icon::Settings),
            ],
        )
        .with_icon(Icon::Folder),
        MenuItem::folder(BRANCHES_ID, "Branches", Vec::new()).with_icon(Icon::Branch),
    ]
}

/// Menu entry for one branch
pub fn branch_item(branch: &Branch) -> MenuItem {
    let class_name = if branch.is_current {
        CURRENT_BRANCH_CLASS
    } else {
        ""
    };

    MenuItem {
        id: format!("branch-{}", branch.name),
        label: branch.name.clone(),
        children: None,
        icon: None,
        class_name: Some(class_name.to_string()),
    }
}

/// Skeleton with the Branches folder filled from `branches`, in order
pub fn build_menu(branches: Option<&[Branch]>) -> Vec<MenuItem> {
    let branch_items: Vec<MenuItem> = branches
        .unwrap_or_default()
        .iter()
        .map(branch_item)
        .collect();

    skeleton()
        .into_iter()
        .map(|item| {
            if item.id == BRANCHES_ID {
                MenuItem {
                    children: Some(branch_items.clone()),
                    ..item
                }
            } else {
                item
            }
        })
        .collect()
}

/// Ids of the folders currently expanded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandState {
    expanded: BTreeSet<String>,
}

impl Default for ExpandState {
    /// Both top-level folders open
    fn default() -> Self {
        Self::with_expanded([WORKSPACE_ID, BRANCHES_ID])
    }
}

impl ExpandState {
    pub fn with_expanded<'a>(ids: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            expanded: ids.into_iter().map(str::to_string).collect(),
        }
    }

    /// Flip `id`; returns whether it is now expanded
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.expanded.remove(id) {
            false
        } else {
            self.expanded.insert(id.to_string());
            true
        }
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.expanded.iter().map(String::as_str)
    }
}

/// Visible tree for `items` under `expand`
pub fn render_tree(items: &[MenuItem], expand: &ExpandState) -> Vec<RenderNode> {
    items.iter().map(|item| render_node(item, expand, 0)).collect()
}

fn render_node(item: &MenuItem, expand: &ExpandState, depth: usize) -> RenderNode {
    let is_expanded = item.is_folder() && expand.is_expanded(&item.id);
    let child_items = item.children.as_deref().unwrap_or_default();

    let children = if is_expanded {
        child_items
            .iter()
            .map(|child| render_node(child, expand, depth + 1))
            .collect()
    } else {
        Vec::new()
    };

    RenderNode {
        id: item.id.clone(),
        label: item.label.clone(),
        icon: item.icon,
        class_name: item.class_name.clone(),
        depth,
        is_folder: item.is_folder(),
        is_expanded,
        show_toggle: depth == 0 && !child_items.is_empty(),
        children,
    }
}
