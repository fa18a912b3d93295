//! Session-related types.
//!
//! Types stored in the visitor's cookie session: the signed-in user and the
//! shopping cart. Nothing here is persisted beyond the session's lifetime.

use serde::{Deserialize, Serialize};

use freshmart_core::{Email, UserId};

/// Session-stored user identity.
///
/// Captured at sign-in; the admin flag is recomputed whenever the auth
/// state changes (sign-in, or a refresh on the admin dashboard).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Backend user ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Bearer token for record and storage requests made on the user's
    /// behalf.
    pub access_token: String,
    /// Whether the user's profile carries the admin flag.
    pub is_admin: bool,
}

/// Session keys.
pub mod keys {
    /// Key for storing the current signed-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for storing the shopping cart.
    pub const CART: &str = "cart";
}
