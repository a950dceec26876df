//! Domain model for inventory items.
//!
//! # Responsibility
//! - Define the persisted record and the write field set shape.
//! - Keep value-level invariants (non-negative stock and price) in one place.
//!
//! # Invariants
//! - Every persisted item is identified by a storage-assigned `ItemId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod item;
