//! Authentication route handlers.
//!
//! Login, signup, and logout against the auth gateway. Validation errors
//! re-render the form with a message instead of redirecting, so typed
//! values survive a failed attempt.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use freshmart_core::Email;

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::routes::cart::session_cart;
use crate::services::{AuthError, AuthGateway};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Signup form data.
#[derive(Debug, Deserialize)]
pub struct SignupForm {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub notice: Option<String>,
    pub email: String,
    pub cart_count: u32,
    pub signed_in: bool,
}

/// Signup page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub error: Option<String>,
    pub email: String,
    pub cart_count: u32,
    pub signed_in: bool,
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(session: Session) -> impl IntoResponse {
    LoginTemplate {
        error: None,
        notice: None,
        email: String::new(),
        cart_count: session_cart(&session).await.total_count(),
        signed_in: false,
    }
}

/// Handle login form submission.
///
/// On success the user lands on the admin dashboard with the session
/// holding their identity and admin flag.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let gateway = AuthGateway::new(state.supabase().clone());

    match gateway.sign_in(&form.email, &form.password).await {
        Ok(auth_state) => {
            let Some(auth_session) = auth_state.session else {
                // sign_in never returns Ok without a session
                return Redirect::to("/auth/login").into_response();
            };

            let email = auth_session
                .user
                .email
                .as_deref()
                .and_then(|e| Email::parse(e).ok());
            let Some(email) = email else {
                tracing::error!("Sign-in response carried no usable email");
                return login_error(&session, &form.email, "Sign-in failed, try again").await;
            };

            let user = CurrentUser {
                id: auth_session.user.id,
                email,
                access_token: auth_session.access_token,
                is_admin: auth_state.is_admin,
            };

            if let Err(e) = set_current_user(&session, &user).await {
                tracing::error!("Failed to set session: {e}");
                return login_error(&session, &form.email, "Sign-in failed, try again").await;
            }

            set_sentry_user(&user.id, Some(user.email.as_str()));

            Redirect::to("/admin").into_response()
        }
        Err(e) => {
            let message = match &e {
                AuthError::InvalidCredentials => "Invalid email or password".to_string(),
                AuthError::InvalidEmail(err) => err.to_string(),
                _ => {
                    tracing::warn!("Login failed: {e}");
                    "Sign-in failed, try again".to_string()
                }
            };
            login_error(&session, &form.email, &message).await
        }
    }
}

async fn login_error(session: &Session, email: &str, message: &str) -> Response {
    LoginTemplate {
        error: Some(message.to_string()),
        notice: None,
        email: email.to_string(),
        cart_count: session_cart(session).await.total_count(),
        signed_in: false,
    }
    .into_response()
}

// =============================================================================
// Signup Routes
// =============================================================================

/// Display the signup page.
pub async fn signup_page(session: Session) -> impl IntoResponse {
    SignupTemplate {
        error: None,
        email: String::new(),
        cart_count: session_cart(&session).await.total_count(),
        signed_in: false,
    }
}

/// Handle signup form submission.
///
/// Validation happens locally first; a typo'd email domain is rejected
/// with a suggested correction before any remote call. On success the
/// user lands on the login page with a confirmation notice.
#[instrument(skip(state, session, form))]
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignupForm>,
) -> Response {
    let gateway = AuthGateway::new(state.supabase().clone());

    match gateway
        .sign_up(&form.email, &form.password, &form.password_confirm)
        .await
    {
        Ok(()) => LoginTemplate {
            error: None,
            notice: Some(
                "Account created - check your email to confirm, then sign in".to_string(),
            ),
            email: form.email,
            cart_count: session_cart(&session).await.total_count(),
            signed_in: false,
        }
        .into_response(),
        Err(e) => {
            let message = match &e {
                AuthError::EmailTypo { suggestion } => {
                    format!("Did you mean {suggestion}? Check your email address")
                }
                AuthError::PasswordMismatch
                | AuthError::WeakPassword { .. }
                | AuthError::InvalidEmail(_) => e.to_string(),
                _ => {
                    tracing::warn!("Signup failed: {e}");
                    "Signup failed, try again".to_string()
                }
            };

            SignupTemplate {
                error: Some(message),
                email: form.email,
                cart_count: session_cart(&session).await.total_count(),
                signed_in: false,
            }
            .into_response()
        }
    }
}

// =============================================================================
// Logout Route
// =============================================================================

/// Handle logout.
///
/// Revokes the backend session (best effort), clears the cookie session,
/// and drops the Sentry user context.
#[instrument(skip(state, session))]
pub async fn logout(State(state): State<AppState>, session: Session) -> Response {
    if let Ok(Some(user)) = session
        .get::<CurrentUser>(crate::models::session_keys::CURRENT_USER)
        .await
    {
        let gateway = AuthGateway::new(state.supabase().clone());
        if let Err(e) = gateway.sign_out(&user.access_token).await {
            tracing::warn!("Failed to revoke backend session: {e}");
        }
    }

    if let Err(e) = clear_current_user(&session).await {
        tracing::error!("Failed to clear session: {e}");
    }

    clear_sentry_user();

    Redirect::to("/").into_response()
}
