//! Item identity

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of an item in a hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(Uuid);

impl ItemId {
    /// Fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Deterministic identifier, mostly useful for fixtures.
    pub const fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for ItemId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // short form is enough to tell items apart in logs and trees
        let simple = self.0.simple().to_string();
        write!(f, "{}", &simple[simple.len() - 8..])
    }
}

/// Anything that can live in a [`HierarchyStore`](crate::domain::HierarchyStore).
///
/// The id must be generated before insertion and must not change while the
/// item is stored.
pub trait Identifiable {
    fn id(&self) -> ItemId;
}

impl Identifiable for ItemId {
    fn id(&self) -> ItemId {
        *self
    }
}
