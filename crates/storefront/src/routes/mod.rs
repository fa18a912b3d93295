//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page (catalog with category filter)
//! GET  /health                 - Health check
//! GET  /health/ready           - Readiness check (pings the backend)
//!
//! # Cart (HTMX fragments)
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add to cart (returns count badge, triggers cart-updated)
//! POST /cart/update            - Update quantity (returns cart_items fragment)
//! POST /cart/remove            - Remove item (returns cart_items fragment)
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Auth
//! GET  /auth/login             - Login page
//! POST /auth/login             - Login action
//! GET  /auth/signup            - Signup page
//! POST /auth/signup            - Signup action
//! POST /auth/logout            - Logout action
//!
//! # Admin (requires auth)
//! GET  /admin                  - Admin dashboard (product list + form)
//! POST /admin/products         - Create product (multipart, returns product_row fragment)
//! POST /admin/products/{id}    - Update product (multipart, returns product_row fragment)
//! POST /admin/products/{id}/delete - Delete product (returns empty for hx-swap removal)
//! ```

pub mod admin;
pub mod auth;
pub mod cart;
pub mod home;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/signup", get(auth::signup_page).post(auth::signup))
        .route("/logout", post(auth::logout))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(admin::dashboard))
        .route("/products", post(admin::create_product))
        .route("/products/{id}", post(admin::update_product))
        .route("/products/{id}/delete", post(admin::delete_product))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Cart routes
        .nest("/cart", cart_routes())
        // Auth routes
        .nest("/auth", auth_routes())
        // Admin routes
        .nest("/admin", admin_routes())
}
