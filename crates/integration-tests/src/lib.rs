//! Integration tests for FreshMart.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the storefront against a test backend project
//! cargo run -p freshmart-storefront
//!
//! # Run integration tests
//! cargo test -p freshmart-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `storefront_pages` - Public page and cart flow tests
//! - `admin_products` - Admin dashboard and product CRUD tests
//!
//! The tests live under `tests/`; this library only documents how to run
//! them.
