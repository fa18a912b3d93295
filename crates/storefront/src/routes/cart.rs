//! Cart route handlers.
//!
//! The cart lives in the visitor's cookie session and is updated through
//! HTMX fragments without full page reloads. Adding a product looks the
//! product up in a fresh catalog load so the stored line always carries
//! current product data.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use freshmart_core::{Cart, CartLine, CartLineId, ProductId};

use crate::error::AppError;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::session_keys;
use crate::routes::home::format_price;
use crate::services::CatalogService;
use crate::state::AppState;

// =============================================================================
// View Types
// =============================================================================

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartLineView {
    pub id: String,
    pub name: String,
    pub quantity: u32,
    /// Quantity the `-` control submits. At quantity 1 this is 0, which
    /// the cart ignores, so the control goes inert instead of removing.
    pub quantity_down: u32,
    /// Quantity the `+` control submits.
    pub quantity_up: u32,
    pub unit_label: String,
    pub price: String,
    pub line_price: String,
    pub image_url: Option<String>,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub total: String,
    pub count: u32,
}

impl From<&CartLine> for CartLineView {
    fn from(line: &CartLine) -> Self {
        Self {
            id: line.id.to_string(),
            name: line.product.name.clone(),
            quantity: line.quantity,
            quantity_down: line.quantity.saturating_sub(1),
            quantity_up: line.quantity.saturating_add(1),
            unit_label: line.product.unit.label().to_string(),
            price: format_price(line.product.price),
            line_price: format_price(line.line_price()),
            image_url: line.product.image_url.clone(),
        }
    }
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            lines: cart.lines().iter().map(CartLineView::from).collect(),
            total: format_price(cart.total_price()),
            count: cart.total_count(),
        }
    }
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Get the cart from the session, or an empty one.
pub async fn session_cart(session: &Session) -> Cart {
    session
        .get::<Cart>(session_keys::CART)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// Write the cart back to the session.
async fn save_cart(session: &Session, cart: &Cart) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CART, cart).await
}

// =============================================================================
// Form Types
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub line_id: CartLineId,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub line_id: CartLineId,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
    pub cart_count: u32,
    pub signed_in: bool,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the cart page.
#[instrument(skip(session, auth))]
pub async fn show(session: Session, OptionalAuth(auth): OptionalAuth) -> impl IntoResponse {
    let cart = session_cart(&session).await;
    let view = CartView::from(&cart);

    CartShowTemplate {
        cart_count: view.count,
        cart: view,
        signed_in: auth.is_some(),
    }
}

/// Add a product to the cart (HTMX).
///
/// Looks the product up in a fresh catalog load. An existing line for the
/// same product has its quantity bumped instead of a duplicate line being
/// added. Returns the count badge with an HTMX trigger so other cart
/// elements refresh.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<Response, AppError> {
    let service = CatalogService::new(state.supabase().clone());
    let catalog = service.load().await?;

    let product = catalog
        .products
        .iter()
        .find(|p| p.id == form.product_id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("product {}", form.product_id)))?;

    let mut cart = session_cart(&session).await;
    cart.add_item(product);

    if let Err(e) = save_cart(&session, &cart).await {
        tracing::error!("Failed to save cart to session: {e}");
    }

    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartCountTemplate {
            count: cart.total_count(),
        },
    )
        .into_response())
}

/// Update a cart line's quantity (HTMX).
///
/// Quantities below 1 are ignored; the remove control is the only way a
/// line leaves the cart.
#[instrument(skip(session))]
pub async fn update(session: Session, Form(form): Form<UpdateCartForm>) -> Response {
    let mut cart = session_cart(&session).await;
    cart.update_quantity(form.line_id, form.quantity);

    if let Err(e) = save_cart(&session, &cart).await {
        tracing::error!("Failed to save cart to session: {e}");
    }

    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::from(&cart),
        },
    )
        .into_response()
}

/// Remove a line from the cart (HTMX).
#[instrument(skip(session))]
pub async fn remove(session: Session, Form(form): Form<RemoveFromCartForm>) -> Response {
    let mut cart = session_cart(&session).await;
    cart.remove_item(form.line_id);

    if let Err(e) = save_cart(&session, &cart).await {
        tracing::error!("Failed to save cart to session: {e}");
    }

    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::from(&cart),
        },
    )
        .into_response()
}

/// Get the cart count badge (HTMX).
#[instrument(skip(session))]
pub async fn count(session: Session) -> impl IntoResponse {
    let cart = session_cart(&session).await;

    CartCountTemplate {
        count: cart.total_count(),
    }
}
