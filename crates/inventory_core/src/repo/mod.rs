//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the item data access contract.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes validate `ItemValues` before persistence.
//! - Not-found is a row count of 0, not an error.

pub mod item_repo;
