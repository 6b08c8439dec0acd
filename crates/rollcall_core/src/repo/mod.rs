//! Persistence boundary for roster and attendance snapshots.
//!
//! # Responsibility
//! - Define the whole-document store contract and its implementations.
//! - Map domain aggregates to and from stored JSON documents.
//!
//! # Invariants
//! - Store APIs return semantic errors (`InvalidData`) in addition to DB
//!   transport errors.

pub mod blob_store;
pub mod snapshot_repo;
