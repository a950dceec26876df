//! Flutter bridge for the inventory core.

pub mod api;
