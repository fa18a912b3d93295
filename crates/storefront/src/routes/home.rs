//! Home page route handler.
//!
//! Renders the full catalog with the category filter chips. The catalog is
//! loaded fresh on every request; when the load fails the page shows an
//! error state with a retry affordance instead of a partial catalog.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use freshmart_core::{Category, CategoryId, Product, catalog};

use crate::filters;
use crate::middleware::OptionalAuth;
use crate::routes::cart::session_cart;
use crate::services::CatalogService;
use crate::state::AppState;

// =============================================================================
// View Types
// =============================================================================

/// Category display data for the filter chips.
#[derive(Clone)]
pub struct CategoryView {
    pub id: String,
    pub name: String,
    pub selected: bool,
}

/// Product display data for the catalog grid.
#[derive(Clone)]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub category_name: Option<String>,
    pub image_url: Option<String>,
    pub stock: u32,
    pub unit_label: String,
    pub in_stock: bool,
}

/// Format a decimal amount as a price string.
pub fn format_price(amount: Decimal) -> String {
    format!("${amount:.2}")
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: format_price(product.price),
            category_name: product.category_name.clone(),
            image_url: product.image_url.clone(),
            stock: product.stock,
            unit_label: product.unit.label().to_string(),
            in_stock: product.stock > 0,
        }
    }
}

fn category_view(category: &Category, selected: Option<CategoryId>) -> CategoryView {
    CategoryView {
        id: category.id.to_string(),
        name: category.name.clone(),
        selected: selected == Some(category.id),
    }
}

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters for the category filter.
#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    /// Selected category ID; absent means "all".
    pub category: Option<CategoryId>,
}

// =============================================================================
// Template
// =============================================================================

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    /// Category filter chips, in name order.
    pub categories: Vec<CategoryView>,
    /// Products after the category filter, in name order.
    pub products: Vec<ProductView>,
    /// Whether the "All" chip is active.
    pub all_selected: bool,
    /// Whether the catalog load failed (renders the retry state).
    pub load_failed: bool,
    /// Cart badge count for the nav.
    pub cart_count: u32,
    /// Whether a user is signed in (nav links).
    pub signed_in: bool,
}

/// Display the home page.
#[instrument(skip(state, session, auth))]
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(auth): OptionalAuth,
    Query(query): Query<CatalogQuery>,
) -> impl IntoResponse {
    let cart_count = session_cart(&session).await.total_count();
    let signed_in = auth.is_some();

    let service = CatalogService::new(state.supabase().clone());
    match service.load().await {
        Ok(loaded) => {
            let products = catalog::filter_by_category(&loaded.products, query.category);

            HomeTemplate {
                categories: loaded
                    .categories
                    .iter()
                    .map(|c| category_view(c, query.category))
                    .collect(),
                products: products.iter().map(ProductView::from).collect(),
                all_selected: query.category.is_none(),
                load_failed: false,
                cart_count,
                signed_in,
            }
        }
        Err(e) => {
            tracing::error!("Failed to load catalog: {e}");
            HomeTemplate {
                categories: Vec::new(),
                products: Vec::new(),
                all_selected: true,
                load_failed: true,
                cart_count,
                signed_in,
            }
        }
    }
}
