use crate::domain::ItemId;

/// Where inserted or moved items end up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// Append to the root level
    ToRoot,
    /// Insert into the root level at `index`
    InRoot { index: usize },
    /// Append to the children of `id`
    OnItem { id: ItemId },
    /// Insert into the children of `id` at `index`
    InItem { id: ItemId, index: usize },
}

impl Destination {
    /// Target container, `None` for the root level.
    pub fn target(&self) -> Option<ItemId> {
        match self {
            Destination::ToRoot | Destination::InRoot { .. } => None,
            Destination::OnItem { id } | Destination::InItem { id, .. } => Some(*id),
        }
    }

    /// Insertion index, `None` means append.
    pub fn index(&self) -> Option<usize> {
        match self {
            Destination::ToRoot | Destination::OnItem { .. } => None,
            Destination::InRoot { index } | Destination::InItem { index, .. } => Some(*index),
        }
    }

    pub fn new(target: Option<ItemId>, index: Option<usize>) -> Self {
        match (target, index) {
            (None, None) => Destination::ToRoot,
            (None, Some(index)) => Destination::InRoot { index },
            (Some(id), None) => Destination::OnItem { id },
            (Some(id), Some(index)) => Destination::InItem { id, index },
        }
    }
}
