use std::collections::BTreeSet;
use std::fmt;

use itertools::Itertools;

use crate::domain::ItemId;

/// Structural change of one sibling group, `parent == None` is the root level.
///
/// For a given parent an `UpdateItem` always precedes its removals and
/// insertions. Removal indices are valid against the children as they are
/// when the action is applied; insertion indices refer to the new order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffAction {
    UpdateItem {
        parent: Option<ItemId>,
    },
    RemoveItems {
        indices: BTreeSet<usize>,
        parent: Option<ItemId>,
    },
    InsertItems {
        indices: BTreeSet<usize>,
        parent: Option<ItemId>,
    },
}

impl DiffAction {
    pub fn update(parent: Option<ItemId>) -> Self {
        DiffAction::UpdateItem { parent }
    }

    pub fn remove(indices: impl IntoIterator<Item = usize>, parent: Option<ItemId>) -> Self {
        DiffAction::RemoveItems {
            indices: indices.into_iter().collect(),
            parent,
        }
    }

    pub fn insert(indices: impl IntoIterator<Item = usize>, parent: Option<ItemId>) -> Self {
        DiffAction::InsertItems {
            indices: indices.into_iter().collect(),
            parent,
        }
    }

    pub fn parent(&self) -> Option<ItemId> {
        match self {
            DiffAction::UpdateItem { parent }
            | DiffAction::RemoveItems { parent, .. }
            | DiffAction::InsertItems { parent, .. } => *parent,
        }
    }

    /// Affected indices, `None` for `UpdateItem`.
    pub fn indices(&self) -> Option<&BTreeSet<usize>> {
        match self {
            DiffAction::UpdateItem { .. } => None,
            DiffAction::RemoveItems { indices, .. } | DiffAction::InsertItems { indices, .. } => {
                Some(indices)
            }
        }
    }
}

impl fmt::Display for DiffAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parent = |p: &Option<ItemId>| match p {
            Some(id) => id.to_string(),
            None => "root".to_string(),
        };
        match self {
            DiffAction::UpdateItem { parent: p } => write!(f, "update {}", parent(p)),
            DiffAction::RemoveItems { indices, parent: p } => {
                write!(f, "remove [{}] in {}", indices.iter().join(", "), parent(p))
            }
            DiffAction::InsertItems { indices, parent: p } => {
                write!(f, "insert [{}] in {}", indices.iter().join(", "), parent(p))
            }
        }
    }
}
