//! Integration tests for the admin dashboard and product CRUD.
//!
//! These tests require:
//! - The storefront running (cargo run -p freshmart-storefront)
//! - A backend project with a confirmed test account
//!   (`TEST_ADMIN_EMAIL` / `TEST_ADMIN_PASSWORD`) and a seeded category
//!
//! Run with: cargo test -p freshmart-integration-tests -- --ignored

use reqwest::{Client, StatusCode, multipart};

/// Base URL for the storefront (configurable via environment).
fn base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Log in with the test account and return a client holding the session
/// cookie.
async fn signed_in_client() -> Client {
    let client = Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client");

    let email = std::env::var("TEST_ADMIN_EMAIL").expect("TEST_ADMIN_EMAIL must be set");
    let password = std::env::var("TEST_ADMIN_PASSWORD").expect("TEST_ADMIN_PASSWORD must be set");

    let resp = client
        .post(format!("{}/auth/login", base_url()))
        .form(&[("email", email.as_str()), ("password", password.as_str())])
        .send()
        .await
        .expect("Failed to log in");
    assert!(resp.status().is_success() || resp.status().is_redirection());

    client
}

/// Scrape the first category ID out of the dashboard's form select.
fn first_category_id(dashboard: &str) -> String {
    dashboard
        .split("name=\"category_id\"")
        .nth(1)
        .and_then(|rest| rest.split("value=\"").nth(2))
        .and_then(|rest| rest.split('"').next())
        .expect("Dashboard form should offer at least one category")
        .to_string()
}

/// Scrape a product row ID (`product-<uuid>`) out of a fragment.
fn row_product_id(fragment: &str) -> String {
    fragment
        .split("id=\"product-")
        .nth(1)
        .and_then(|rest| rest.split('"').next())
        .expect("Fragment should contain a product row")
        .to_string()
}

// ============================================================================
// Dashboard Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront and a test account"]
async fn dashboard_lists_own_products() {
    let client = signed_in_client().await;
    let base_url = base_url();

    let resp = client
        .get(format!("{base_url}/admin"))
        .send()
        .await
        .expect("Failed to get dashboard");

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("Failed to read body");
    assert!(body.contains("My Products"));
    assert!(body.contains("product-rows"));
}

// ============================================================================
// CRUD Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront and a test account"]
async fn product_create_update_delete_roundtrip() {
    let client = signed_in_client().await;
    let base_url = base_url();

    let dashboard = client
        .get(format!("{base_url}/admin"))
        .send()
        .await
        .expect("Failed to get dashboard")
        .text()
        .await
        .expect("Failed to read body");
    let category_id = first_category_id(&dashboard);

    // Create
    let name = format!("IT Apples {}", uuid::Uuid::new_v4());
    let form = multipart::Form::new()
        .text("name", name.clone())
        .text("description", "Crisp test apples")
        .text("price", "2.50")
        .text("category_id", category_id.clone())
        .text("stock", "10")
        .text("unit", "kg");

    let resp = client
        .post(format!("{base_url}/admin/products"))
        .multipart(form)
        .send()
        .await
        .expect("Failed to create product");
    assert_eq!(resp.status(), StatusCode::OK);

    let row = resp.text().await.expect("Failed to read body");
    assert!(row.contains(&name));
    assert!(row.contains("$2.50"));
    let product_id = row_product_id(&row);

    // Update
    let form = multipart::Form::new()
        .text("name", format!("{name} (updated)"))
        .text("description", "Crisper test apples")
        .text("price", "3.00")
        .text("category_id", category_id)
        .text("stock", "8")
        .text("unit", "kg");

    let resp = client
        .post(format!("{base_url}/admin/products/{product_id}"))
        .multipart(form)
        .send()
        .await
        .expect("Failed to update product");
    assert_eq!(resp.status(), StatusCode::OK);

    let row = resp.text().await.expect("Failed to read body");
    assert!(row.contains("(updated)"));
    assert!(row.contains("$3.00"));

    // Delete
    let resp = client
        .post(format!("{base_url}/admin/products/{product_id}/delete"))
        .send()
        .await
        .expect("Failed to delete product");
    assert_eq!(resp.status(), StatusCode::OK);

    // Gone from the dashboard
    let dashboard = client
        .get(format!("{base_url}/admin"))
        .send()
        .await
        .expect("Failed to get dashboard")
        .text()
        .await
        .expect("Failed to read body");
    assert!(!dashboard.contains(&name));
}

#[tokio::test]
#[ignore = "Requires running storefront and a test account"]
async fn invalid_price_is_rejected() {
    let client = signed_in_client().await;
    let base_url = base_url();

    let form = multipart::Form::new()
        .text("name", "Bad Price Product")
        .text("price", "not-a-number")
        .text("category_id", uuid::Uuid::new_v4().to_string())
        .text("unit", "piece");

    let resp = client
        .post(format!("{base_url}/admin/products"))
        .multipart(form)
        .send()
        .await
        .expect("Failed to post product");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
