//! Core use-case services.
//!
//! # Responsibility
//! - Wrap repository calls into the URI-addressed inventory contract.
//! - Hold edit-screen state so UI/FFI layers stay thin.

pub mod editor;
pub mod inventory_service;
