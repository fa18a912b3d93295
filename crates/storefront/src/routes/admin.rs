//! Admin dashboard route handlers.
//!
//! The dashboard lists the signed-in user's own products next to a
//! create/edit form. Mutations are HTMX requests: create appends a row
//! fragment, update replaces the edited row, delete removes it, all
//! without re-fetching the whole list.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use freshmart_core::{Category, CategoryId, Product, ProductId, Unit};

use crate::error::AppError;
use crate::filters;
use crate::middleware::{RequireAuth, set_current_user};
use crate::models::CurrentUser;
use crate::routes::cart::session_cart;
use crate::services::{AdminCatalogService, AdminError, AuthGateway, CatalogService};
use crate::services::admin::{ImageUpload, ProductDraft};
use crate::state::AppState;
use crate::supabase::types::{AuthSession, AuthUser};

// =============================================================================
// View Types
// =============================================================================

/// Product display data for the dashboard table.
#[derive(Clone)]
pub struct AdminProductView {
    pub id: String,
    pub name: String,
    pub price: String,
    pub category_name: Option<String>,
    pub stock: u32,
    pub unit_label: String,
    pub image_url: Option<String>,
}

impl From<&Product> for AdminProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            price: crate::routes::home::format_price(product.price),
            category_name: product.category_name.clone(),
            stock: product.stock,
            unit_label: product.unit.label().to_string(),
            image_url: product.image_url.clone(),
        }
    }
}

/// Category option for the form's select element.
#[derive(Clone)]
pub struct CategoryOption {
    pub id: String,
    pub name: String,
    pub selected: bool,
}

/// Unit option for the form's select element.
#[derive(Clone)]
pub struct UnitOption {
    pub code: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Pre-filled values for the product form.
#[derive(Clone, Default)]
pub struct ProductFormView {
    /// Set when editing an existing product.
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    pub price: String,
    pub image_url: String,
    pub stock: String,
    pub unit: Unit,
    pub category_id: Option<CategoryId>,
}

impl ProductFormView {
    fn for_edit(product: &Product) -> Self {
        Self {
            id: Some(product.id.to_string()),
            name: product.name.clone(),
            description: product.description.clone(),
            price: format!("{:.2}", product.price),
            image_url: product.image_url.clone().unwrap_or_default(),
            stock: product.stock.to_string(),
            unit: product.unit,
            category_id: Some(product.category_id),
        }
    }

    fn category_options(&self, categories: &[Category]) -> Vec<CategoryOption> {
        categories
            .iter()
            .map(|c| CategoryOption {
                id: c.id.to_string(),
                name: c.name.clone(),
                selected: self.category_id == Some(c.id),
            })
            .collect()
    }

    fn unit_options(&self) -> Vec<UnitOption> {
        Unit::ALL
            .iter()
            .map(|u| UnitOption {
                code: u.code(),
                label: u.label(),
                selected: *u == self.unit,
            })
            .collect()
    }
}

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters for the dashboard.
#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    /// Product ID to pre-fill the form with for editing.
    pub edit: Option<ProductId>,
}

// =============================================================================
// Templates
// =============================================================================

/// Admin dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub products: Vec<AdminProductView>,
    pub form: ProductFormView,
    pub category_options: Vec<CategoryOption>,
    pub unit_options: Vec<UnitOption>,
    pub is_admin: bool,
    pub load_error: Option<String>,
    pub cart_count: u32,
    pub signed_in: bool,
}

/// Product row fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/product_row.html")]
pub struct ProductRowTemplate {
    pub product: AdminProductView,
}

/// Admin message fragment template (for HTMX error display).
#[derive(Template, WebTemplate)]
#[template(path = "partials/admin_message.html")]
pub struct AdminMessageTemplate {
    pub message: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the admin dashboard.
///
/// Recomputes the admin flag from the profile record so a role change
/// takes effect on the next visit, and lists only the signed-in user's
/// own products.
#[instrument(skip(state, session, user))]
pub async fn dashboard(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(mut user): RequireAuth,
    Query(query): Query<DashboardQuery>,
) -> Result<impl IntoResponse, AppError> {
    let cart_count = session_cart(&session).await.total_count();

    // Recompute the admin flag for the stored session
    let gateway = AuthGateway::new(state.supabase().clone());
    let auth_state = gateway
        .refresh(AuthSession {
            access_token: user.access_token.clone(),
            user: AuthUser {
                id: user.id,
                email: Some(user.email.as_str().to_string()),
            },
        })
        .await;

    if auth_state.is_admin != user.is_admin {
        user.is_admin = auth_state.is_admin;
        set_current_user(&session, &user)
            .await
            .map_err(|e| AppError::Internal(format!("session write failed: {e}")))?;
    }

    let admin = AdminCatalogService::new(state.supabase().clone());
    let (products, load_error) = match admin.products(Some(&user)).await {
        Ok(products) => (products, None),
        Err(e) => {
            tracing::error!("Failed to load admin products: {e}");
            (Vec::new(), Some("Failed to load your products".to_string()))
        }
    };

    // Categories for the form select; an empty list still renders the form
    let catalog = CatalogService::new(state.supabase().clone());
    let categories = match catalog.load().await {
        Ok(loaded) => loaded.categories,
        Err(e) => {
            tracing::warn!("Failed to load categories for the form: {e}");
            Vec::new()
        }
    };

    let form = query
        .edit
        .and_then(|id| products.iter().find(|p| p.id == id))
        .map_or_else(ProductFormView::default, ProductFormView::for_edit);

    Ok(DashboardTemplate {
        products: products.iter().map(AdminProductView::from).collect(),
        category_options: form.category_options(&categories),
        unit_options: form.unit_options(),
        form,
        is_admin: user.is_admin,
        load_error,
        cart_count,
        signed_in: true,
    })
}

/// Create a product (HTMX, multipart).
///
/// Returns a row fragment for appending to the product table, with an
/// HTMX trigger so the form resets.
#[instrument(skip(state, user, multipart))]
pub async fn create_product(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    multipart: Multipart,
) -> Response {
    let (draft, image) = match parse_product_form(multipart).await {
        Ok(parsed) => parsed,
        Err(message) => return admin_error(StatusCode::BAD_REQUEST, &message),
    };

    let service = AdminCatalogService::new(state.supabase().clone());
    match service.create_product(Some(&user), draft, image).await {
        Ok(product) => (
            AppendHeaders([("HX-Trigger", "product-saved")]),
            ProductRowTemplate {
                product: AdminProductView::from(&product),
            },
        )
            .into_response(),
        Err(e) => admin_failure(&e),
    }
}

/// Update a product (HTMX, multipart).
///
/// Returns a row fragment that replaces the edited row.
#[instrument(skip(state, user, multipart))]
pub async fn update_product(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<ProductId>,
    multipart: Multipart,
) -> Response {
    let (mut draft, image) = match parse_product_form(multipart).await {
        Ok(parsed) => parsed,
        Err(message) => return admin_error(StatusCode::BAD_REQUEST, &message),
    };

    // An image selected during edit is uploaded and its URL written into
    // the record, same as on create
    if let Some(image) = image {
        match upload_edit_image(&state, &user, image).await {
            Ok(url) => draft.image_url = Some(url),
            Err(e) => return admin_failure(&e),
        }
    }

    let service = AdminCatalogService::new(state.supabase().clone());
    match service.update_product(Some(&user), id, draft).await {
        Ok(product) => (
            AppendHeaders([("HX-Trigger", "product-saved")]),
            ProductRowTemplate {
                product: AdminProductView::from(&product),
            },
        )
            .into_response(),
        Err(e) => admin_failure(&e),
    }
}

/// Delete a product (HTMX).
///
/// The dashboard asks for confirmation before submitting; the response is
/// empty so the row disappears via `hx-swap="outerHTML"`.
#[instrument(skip(state, user))]
pub async fn delete_product(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<ProductId>,
) -> Response {
    let service = AdminCatalogService::new(state.supabase().clone());
    match service.delete_product(Some(&user), id).await {
        Ok(()) => (
            AppendHeaders([("HX-Trigger", "product-deleted")]),
            String::new(),
        )
            .into_response(),
        Err(e) => admin_failure(&e),
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Map an admin service failure to an HTMX error fragment.
fn admin_failure(error: &AdminError) -> Response {
    match error {
        AdminError::NotSignedIn => {
            admin_error(StatusCode::UNAUTHORIZED, "Sign in to manage products")
        }
        AdminError::StorageBucketMissing(_) => {
            admin_error(StatusCode::BAD_REQUEST, &error.to_string())
        }
        AdminError::Backend(e) => {
            tracing::error!("Admin operation failed: {e}");
            admin_error(StatusCode::BAD_GATEWAY, "Saving the product failed, try again")
        }
    }
}

fn admin_error(status: StatusCode, message: &str) -> Response {
    (
        status,
        AppendHeaders([("HX-Retarget", "#admin-message"), ("HX-Reswap", "innerHTML")]),
        AdminMessageTemplate {
            message: message.to_string(),
        },
    )
        .into_response()
}

async fn upload_edit_image(
    state: &AppState,
    user: &CurrentUser,
    image: ImageUpload,
) -> Result<String, AdminError> {
    let key = crate::services::admin::storage_key(&image.file_name);
    state
        .supabase()
        .upload_object(&user.access_token, &key, image.bytes, &image.content_type)
        .await
        .map_err(AdminError::from)
}

/// Parse the product form from a multipart body.
///
/// Text fields arrive alongside an optional `image` file part; an empty
/// file part (no file selected) counts as no image.
async fn parse_product_form(
    mut multipart: Multipart,
) -> Result<(ProductDraft, Option<ImageUpload>), String> {
    let mut name = None;
    let mut description = String::new();
    let mut price = None;
    let mut category_id = None;
    let mut image_url = None;
    let mut stock = None;
    let mut unit = None;
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Invalid form data: {e}"))?
    {
        let Some(field_name) = field.name().map(ToString::to_string) else {
            continue;
        };

        if field_name == "image" {
            let file_name = field.file_name().map(ToString::to_string);
            let content_type = field
                .content_type()
                .map_or_else(|| "application/octet-stream".to_string(), ToString::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| format!("Failed to read image: {e}"))?;

            if let Some(file_name) = file_name.filter(|n| !n.is_empty()) {
                if !bytes.is_empty() {
                    image = Some(ImageUpload {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| format!("Invalid form data: {e}"))?;

        match field_name.as_str() {
            "name" => name = Some(value),
            "description" => description = value,
            "price" => {
                price = Some(
                    value
                        .trim()
                        .parse()
                        .map_err(|_| format!("Invalid price: {value}"))?,
                );
            }
            "category_id" => {
                category_id = Some(
                    value
                        .parse()
                        .map_err(|_| "Pick a category".to_string())?,
                );
            }
            "image_url" => image_url = Some(value).filter(|v| !v.trim().is_empty()),
            "stock" => {
                stock = Some(
                    value
                        .trim()
                        .parse()
                        .map_err(|_| format!("Invalid stock count: {value}"))?,
                );
            }
            "unit" => {
                unit = Some(
                    value
                        .parse()
                        .map_err(|_| format!("Unknown unit: {value}"))?,
                );
            }
            _ => {}
        }
    }

    let name = name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| "Product name is required".to_string())?;

    let draft = ProductDraft {
        name,
        description,
        price: price.ok_or_else(|| "Price is required".to_string())?,
        category_id: category_id.ok_or_else(|| "Pick a category".to_string())?,
        image_url,
        stock: stock.unwrap_or(0),
        unit: unit.unwrap_or_default(),
    };

    Ok((draft, image))
}
