//! Integration tests for the public storefront pages and the cart flow.
//!
//! These tests require:
//! - The storefront running (cargo run -p freshmart-storefront)
//! - A reachable backend project with seeded categories and products
//!
//! Run with: cargo test -p freshmart-integration-tests -- --ignored

use reqwest::{Client, StatusCode};

/// Base URL for the storefront (configurable via environment).
fn base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Create a client with a cookie store so the session cart persists
/// across requests.
fn session_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

// ============================================================================
// Health Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn health_returns_ok() {
    let client = session_client();
    let base_url = base_url();

    let resp = client
        .get(format!("{base_url}/health"))
        .send()
        .await
        .expect("Failed to reach health endpoint");

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.expect("Failed to read body"), "ok");
}

#[tokio::test]
#[ignore = "Requires running storefront and backend"]
async fn readiness_checks_the_backend() {
    let client = session_client();
    let base_url = base_url();

    let resp = client
        .get(format!("{base_url}/health/ready"))
        .send()
        .await
        .expect("Failed to reach readiness endpoint");

    assert_eq!(resp.status(), StatusCode::OK);
}

// ============================================================================
// Catalog Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront and backend"]
async fn home_page_renders_the_catalog() {
    let client = session_client();
    let base_url = base_url();

    let resp = client
        .get(format!("{base_url}/"))
        .send()
        .await
        .expect("Failed to get home page");

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("Failed to read body");

    // Category chips including the "All" default
    assert!(body.contains("category-filter"));
    assert!(body.contains(">All</a>"));
    assert!(body.contains("product-grid"));
}

#[tokio::test]
#[ignore = "Requires running storefront and backend"]
async fn category_filter_narrows_the_grid() {
    let client = session_client();
    let base_url = base_url();

    // An unknown category ID yields an empty grid, not an error
    let resp = client
        .get(format!(
            "{base_url}/?category=00000000-0000-0000-0000-000000000000"
        ))
        .send()
        .await
        .expect("Failed to get filtered home page");

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("Failed to read body");
    assert!(body.contains("No products in this category yet"));
}

// ============================================================================
// Cart Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn cart_starts_empty() {
    let client = session_client();
    let base_url = base_url();

    let resp = client
        .get(format!("{base_url}/cart"))
        .send()
        .await
        .expect("Failed to get cart page");

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("Failed to read body");
    assert!(body.contains("Your cart is empty"));
}

#[tokio::test]
#[ignore = "Requires running storefront and backend with seeded products"]
async fn add_to_cart_updates_the_count_badge() {
    let client = session_client();
    let base_url = base_url();

    // Scrape a product ID off the home page
    let body = client
        .get(format!("{base_url}/"))
        .send()
        .await
        .expect("Failed to get home page")
        .text()
        .await
        .expect("Failed to read body");

    let product_id = body
        .split("\"product_id\": \"")
        .nth(1)
        .and_then(|rest| rest.split('"').next())
        .expect("Home page should list at least one in-stock product");

    // Add it twice: same line, quantity 2
    for _ in 0..2 {
        let resp = client
            .post(format!("{base_url}/cart/add"))
            .form(&[("product_id", product_id)])
            .send()
            .await
            .expect("Failed to add to cart");
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let count = client
        .get(format!("{base_url}/cart/count"))
        .send()
        .await
        .expect("Failed to get cart count")
        .text()
        .await
        .expect("Failed to read body");
    assert!(count.contains('2'));

    // One line, not two
    let cart = client
        .get(format!("{base_url}/cart"))
        .send()
        .await
        .expect("Failed to get cart page")
        .text()
        .await
        .expect("Failed to read body");
    assert_eq!(cart.matches("cart-line-remove").count(), 1);
}

#[tokio::test]
#[ignore = "Requires running storefront and backend with seeded products"]
async fn quantity_controls_and_checkout_render_on_the_cart_page() {
    let client = session_client();
    let base_url = base_url();

    let body = client
        .get(format!("{base_url}/"))
        .send()
        .await
        .expect("Failed to get home page")
        .text()
        .await
        .expect("Failed to read body");

    let product_id = body
        .split("\"product_id\": \"")
        .nth(1)
        .and_then(|rest| rest.split('"').next())
        .expect("Home page should list at least one in-stock product");

    client
        .post(format!("{base_url}/cart/add"))
        .form(&[("product_id", product_id)])
        .send()
        .await
        .expect("Failed to add to cart");

    let cart = client
        .get(format!("{base_url}/cart"))
        .send()
        .await
        .expect("Failed to get cart page")
        .text()
        .await
        .expect("Failed to read body");

    assert!(cart.contains("Decrease quantity"));
    assert!(cart.contains("Increase quantity"));
    assert!(cart.contains("Proceed to Checkout"));

    // The `-` control at quantity 1 submits 0, which leaves the line alone
    let line_id = cart
        .split("\"line_id\": \"")
        .nth(1)
        .and_then(|rest| rest.split('"').next())
        .expect("Cart should render the line's controls");

    let fragment = client
        .post(format!("{base_url}/cart/update"))
        .form(&[("line_id", line_id), ("quantity", "0")])
        .send()
        .await
        .expect("Failed to post quantity update")
        .text()
        .await
        .expect("Failed to read body");

    assert_eq!(fragment.matches("cart-line-remove").count(), 1);
    assert!(fragment.contains(r#"<span class="quantity-value">1</span>"#));
}

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn adding_an_unknown_product_is_a_404() {
    let client = session_client();
    let base_url = base_url();

    let resp = client
        .post(format!("{base_url}/cart/add"))
        .form(&[("product_id", "00000000-0000-0000-0000-000000000000")])
        .send()
        .await
        .expect("Failed to post add-to-cart");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Auth Page Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn signup_rejects_a_typo_domain_with_a_suggestion() {
    let client = session_client();
    let base_url = base_url();

    let resp = client
        .post(format!("{base_url}/auth/signup"))
        .form(&[
            ("email", "user@gamil.com"),
            ("password", "secret123"),
            ("password_confirm", "secret123"),
        ])
        .send()
        .await
        .expect("Failed to post signup");

    let body = resp.text().await.expect("Failed to read body");
    assert!(body.contains("user@gmail.com"));
}

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn admin_redirects_to_login_when_signed_out() {
    let client = Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client");
    let base_url = base_url();

    let resp = client
        .get(format!("{base_url}/admin"))
        .send()
        .await
        .expect("Failed to get admin page");

    assert!(resp.status().is_redirection());
    let location = resp
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert_eq!(location, "/auth/login");
}
