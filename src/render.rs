use std::fmt::Display;

use termtree::Tree;
use tracing::instrument;

use crate::domain::{HierarchyStore, ItemEntity, ItemId};

/// What to print next to each item label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub show_ids: bool,
    pub show_status: bool,
}

pub trait TreeRender {
    fn to_tree_string(&self, options: &RenderOptions) -> Tree<String>;
}

impl TreeRender for HierarchyStore<ItemEntity> {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self, options: &RenderOptions) -> Tree<String> {
        render_with(self, options, |id| self.effective_status(id))
    }
}

/// Render any store with displayable items; `status` supplies the checkbox state.
pub fn render_with<T, F>(store: &HierarchyStore<T>, options: &RenderOptions, status: F) -> Tree<String>
where
    T: Display,
    F: Fn(ItemId) -> Option<bool>,
{
    fn build_tree<T: Display>(
        store: &HierarchyStore<T>,
        parent: Option<ItemId>,
        options: &RenderOptions,
        status: &dyn Fn(ItemId) -> Option<bool>,
        parent_tree: &mut Tree<String>,
    ) {
        for &id in store.children_ids(parent) {
            if let Some(item) = store.item(id) {
                let mut child_tree = Tree::new(label(id, item, options, status));
                build_tree(store, Some(id), options, status, &mut child_tree);
                parent_tree.push(child_tree);
            }
        }
    }

    let mut tree = Tree::new("root".to_string());
    build_tree(store, None, options, &status, &mut tree);
    tree
}

fn label<T: Display>(
    id: ItemId,
    item: &T,
    options: &RenderOptions,
    status: &dyn Fn(ItemId) -> Option<bool>,
) -> String {
    let mut label = String::new();
    if options.show_status {
        let mark = if status(id).unwrap_or(false) { "[x] " } else { "[ ] " };
        label.push_str(mark);
    }
    label.push_str(&item.to_string());
    if options.show_ids {
        label.push_str(&format!(" ({id})"));
    }
    label
}
