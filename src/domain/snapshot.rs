//! Point-in-time capture of a hierarchy's shape and the diff between two captures.

use std::collections::{HashMap, HashSet};

use tracing::{debug, instrument, trace};

use crate::domain::action::DiffAction;
use crate::domain::sequence::{difference, Change};
use crate::domain::ItemId;

/// Immutable copy of root order, stored ids and per-parent child order.
///
/// Payloads are not captured; the diff is purely structural.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    root: Vec<ItemId>,
    items: HashSet<ItemId>,
    hierarchy: HashMap<ItemId, Vec<ItemId>>,
}

impl Snapshot {
    pub(crate) fn new(
        root: Vec<ItemId>,
        items: HashSet<ItemId>,
        hierarchy: HashMap<ItemId, Vec<ItemId>>,
    ) -> Self {
        Self {
            root,
            items,
            hierarchy,
        }
    }

    pub fn root(&self) -> &[ItemId] {
        &self.root
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.items.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Children of `parent` (`None` = root level). Unknown ids have no children.
    pub fn children(&self, parent: Option<ItemId>) -> &[ItemId] {
        match parent {
            None => &self.root,
            Some(id) => self.hierarchy.get(&id).map(Vec::as_slice).unwrap_or(&[]),
        }
    }

    /// Actions transforming a rendering of `old` into a rendering of `self`.
    ///
    /// Sibling groups are visited top-down in pre-order following the new
    /// shape, so every surviving or freshly inserted item is visited once.
    /// Subtrees that no longer exist produce nothing beyond their parent's
    /// removal.
    #[instrument(level = "debug", skip_all, fields(old = old.len(), new = self.len()))]
    pub fn diff(&self, old: &Snapshot) -> Vec<DiffAction> {
        let mut actions = Vec::new();
        let mut stack: Vec<Option<ItemId>> = vec![None];

        while let Some(parent) = stack.pop() {
            let old_children = old.children(parent);
            let new_children = self.children(parent);
            if old_children.is_empty() && new_children.is_empty() {
                continue;
            }

            let changes = difference(old_children, new_children);
            if !changes.is_empty() {
                trace!(?parent, changes = changes.len(), "sibling group changed");
                actions.push(DiffAction::update(parent));
                actions.extend(changes.into_iter().map(|change| match change {
                    Change::Remove { .. } => DiffAction::remove(change.positions(), parent),
                    Change::Insert { .. } => DiffAction::insert(change.positions(), parent),
                }));
            }

            // Push children in reverse order for left-to-right traversal
            for &child in new_children.iter().rev() {
                stack.push(Some(child));
            }
        }

        debug!(actions = actions.len(), "snapshot diff computed");
        actions
    }
}

/// Actions transforming a rendering of `old` into one of `new`.
pub fn diff(old: &Snapshot, new: &Snapshot) -> Vec<DiffAction> {
    new.diff(old)
}
