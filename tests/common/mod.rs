//! Shared fixtures: the reference outline used across integration tests.
//!
//! ```text
//! 0
//! 1
//! ├── 10
//! ├── 11
//! └── 12
//!     ├── 120
//!     └── 121
//! 2
//! ```
#![allow(dead_code)]

use hierarchy::domain::{HierarchyStore, ItemContent, ItemEntity, ItemId};

pub const I0: ItemId = ItemId::from_u128(0x0);
pub const I1: ItemId = ItemId::from_u128(0x1);
pub const I2: ItemId = ItemId::from_u128(0x2);
pub const I10: ItemId = ItemId::from_u128(0x10);
pub const I11: ItemId = ItemId::from_u128(0x11);
pub const I12: ItemId = ItemId::from_u128(0x12);
pub const I120: ItemId = ItemId::from_u128(0x120);
pub const I121: ItemId = ItemId::from_u128(0x121);

pub fn entity(id: ItemId) -> ItemEntity {
    ItemEntity::with_id(id, ItemContent::new(format!("item {id}")))
}

pub fn entities(ids: &[ItemId]) -> Vec<ItemEntity> {
    ids.iter().copied().map(entity).collect()
}

/// Builds the reference outline shown in the module docs.
pub fn scenario_store() -> HierarchyStore<ItemEntity> {
    let mut store = HierarchyStore::new();
    store
        .insert_to_root(entities(&[I0, I1, I2]), None)
        .expect("root items");
    store
        .insert_to_parent(entities(&[I10, I11, I12]), I1, None)
        .expect("children of 1");
    store
        .insert_to_parent(entities(&[I120, I121]), I12, None)
        .expect("children of 12");
    store
}
