//! Core types for FreshMart.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod product;
pub mod unit;

pub use email::{Email, EmailError};
pub use id::*;
pub use product::{Category, Product};
pub use unit::Unit;
