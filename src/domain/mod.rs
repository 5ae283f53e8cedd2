//! Domain layer: the hierarchy store and its diff engine
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod action;
pub mod content;
pub mod destination;
pub mod error;
pub mod id;
pub mod sequence;
pub mod snapshot;
pub mod store;
pub mod traversal;

pub use action::DiffAction;
pub use content::{ItemContent, ItemEntity, ItemOptions, Mutation};
pub use destination::Destination;
pub use error::{DomainError, DomainResult};
pub use id::{Identifiable, ItemId};
pub use snapshot::{diff, Snapshot};
pub use store::HierarchyStore;
pub use traversal::{Ancestors, PostOrderIter, PreOrderIter};
