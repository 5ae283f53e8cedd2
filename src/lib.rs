//! Ordered multi-level item store with LCS-based change diffing.
//!
//! Architecture:
//! - `domain`: hierarchy store, snapshots and the diff engine
//! - `application`: documents with subscribers, script replay
//! - `cli`: command-line interface
//! - `config`: layered settings
//! - `render`: terminal tree rendering

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod render;
pub mod util;

pub use domain::{DiffAction, Destination, DomainError, HierarchyStore, ItemId, Snapshot};
