//! FreshMart Core - Shared types library.
//!
//! This crate provides common types and the client-owned business logic used
//! across FreshMart components:
//! - `storefront` - Public-facing grocery storefront and admin dashboard
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no HTTP
//! clients, no backend access. The shopping cart and catalog filtering live
//! here because they are the only state this application owns; everything
//! else is delegated to the remote backend.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, units, and records
//! - [`cart`] - The in-memory shopping cart store
//! - [`catalog`] - Pure catalog filtering and local list patching

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod types;

pub use cart::{Cart, CartLine};
pub use types::*;
