//! Auth gateway.
//!
//! Wraps the backend's sign-in, sign-up, and sign-out endpoints and derives
//! the "is admin" flag from the caller's profile record. Holds the current
//! auth state and notifies registered listeners whenever it changes, so
//! observers follow an explicit subscribe/unsubscribe contract instead of
//! framework lifecycle hooks.
//!
//! Sign-up validates locally before any remote call: password confirmation,
//! minimum length, email syntax, and common email-domain typos (the latter
//! rejected with a suggested correction).

mod error;

pub use error::AuthError;

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::instrument;

use freshmart_core::{Email, UserId};

use crate::supabase::types::AuthSession;
use crate::supabase::{SupabaseClient, SupabaseError};

/// Minimum password length (matches the sign-up form).
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Store operations the auth gateway needs.
pub trait AuthStore {
    fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<AuthSession, SupabaseError>> + Send;

    fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<(), SupabaseError>> + Send;

    fn sign_out(&self, access_token: &str)
    -> impl Future<Output = Result<(), SupabaseError>> + Send;

    /// Look up the `is_admin` flag on the caller's profile record.
    fn is_admin(
        &self,
        access_token: &str,
        user_id: UserId,
    ) -> impl Future<Output = Result<bool, SupabaseError>> + Send;
}

impl AuthStore for SupabaseClient {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, SupabaseError> {
        Self::sign_in(self, email, password).await
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<(), SupabaseError> {
        Self::sign_up(self, email, password).await
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), SupabaseError> {
        Self::sign_out(self, access_token).await
    }

    async fn is_admin(&self, access_token: &str, user_id: UserId) -> Result<bool, SupabaseError> {
        Ok(self
            .fetch_profile(access_token, user_id)
            .await?
            .is_some_and(|profile| profile.is_admin))
    }
}

/// The current authentication state, recomputed on every change.
#[derive(Debug, Clone, Default)]
pub struct AuthState {
    /// The active session, if signed in.
    pub session: Option<AuthSession>,
    /// Whether the signed-in user's profile carries the admin flag.
    pub is_admin: bool,
}

impl AuthState {
    /// Whether a session is active.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }
}

/// Auth state change events delivered to listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    /// A session was established.
    SignedIn,
    /// The session ended.
    SignedOut,
    /// The state was recomputed for an existing session.
    Refreshed,
}

/// Handle for removing a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn Fn(AuthEvent, &AuthState) + Send + Sync>;

/// The auth gateway service.
pub struct AuthGateway<S> {
    store: S,
    state: Mutex<AuthState>,
    listeners: Mutex<HashMap<u64, Listener>>,
    next_listener: AtomicU64,
}

impl<S: AuthStore> AuthGateway<S> {
    /// Create a new gateway over `store` with a signed-out state.
    pub fn new(store: S) -> Self {
        Self {
            store,
            state: Mutex::new(AuthState::default()),
            listeners: Mutex::new(HashMap::new()),
            next_listener: AtomicU64::new(0),
        }
    }

    /// Sign in with email and password.
    ///
    /// On success the state holds the new session and the freshly computed
    /// admin flag; listeners are notified with [`AuthEvent::SignedIn`]. A
    /// failed profile lookup degrades the admin flag to `false` rather than
    /// failing the sign-in.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidEmail`] before any remote call for
    /// malformed input, [`AuthError::InvalidCredentials`] when the backend
    /// rejects the credentials.
    #[instrument(skip(self, email, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthState, AuthError> {
        let email = Email::parse(email)?;

        let session = self
            .store
            .sign_in(email.as_str(), password)
            .await
            .map_err(|err| {
                if err.is_auth_failure() {
                    AuthError::InvalidCredentials
                } else {
                    AuthError::Backend(err)
                }
            })?;

        let is_admin = self
            .store
            .is_admin(&session.access_token, session.user.id)
            .await
            .unwrap_or(false);

        let state = AuthState {
            session: Some(session),
            is_admin,
        };
        self.replace_state(AuthEvent::SignedIn, state.clone());
        Ok(state)
    }

    /// Register a new account.
    ///
    /// Validation order: password confirmation, password length, email
    /// syntax, domain typo check. All of it happens before the remote call.
    ///
    /// # Errors
    ///
    /// Returns the distinct validation failure, or [`AuthError::Backend`]
    /// when the backend rejects the registration.
    #[instrument(skip(self, email, password, password_confirm))]
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        password_confirm: &str,
    ) -> Result<(), AuthError> {
        if password != password_confirm {
            return Err(AuthError::PasswordMismatch);
        }

        if password.len() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::WeakPassword {
                min: MIN_PASSWORD_LENGTH,
            });
        }

        let email = Email::parse(email)?;

        if let Some(suggestion) = email.suggest_correction() {
            return Err(AuthError::EmailTypo { suggestion });
        }

        self.store
            .sign_up(email.as_str(), password)
            .await
            .map_err(AuthError::Backend)
    }

    /// Revoke the session behind `access_token` and clear the state.
    ///
    /// Listeners are notified with [`AuthEvent::SignedOut`] even when the
    /// remote revocation fails - the local session is gone either way.
    #[instrument(skip(self, access_token))]
    pub async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let result = self
            .store
            .sign_out(access_token)
            .await
            .map_err(AuthError::Backend);

        self.replace_state(AuthEvent::SignedOut, AuthState::default());
        result
    }

    /// Recompute the admin flag for an existing session.
    ///
    /// Used when a request arrives with a stored session and the caller
    /// needs current role information. Notifies listeners with
    /// [`AuthEvent::Refreshed`].
    pub async fn refresh(&self, session: AuthSession) -> AuthState {
        let is_admin = self
            .store
            .is_admin(&session.access_token, session.user.id)
            .await
            .unwrap_or(false);

        let state = AuthState {
            session: Some(session),
            is_admin,
        };
        self.replace_state(AuthEvent::Refreshed, state.clone());
        state
    }

    /// Snapshot of the current auth state.
    #[must_use]
    pub fn current_state(&self) -> AuthState {
        self.state.lock().map(|state| state.clone()).unwrap_or_default()
    }

    /// Register a listener called with `(event, new_state)` on every change.
    pub fn subscribe(
        &self,
        listener: impl Fn(AuthEvent, &AuthState) + Send + Sync + 'static,
    ) -> ListenerId {
        let id = self.next_listener.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.insert(id, Box::new(listener));
        }
        ListenerId(id)
    }

    /// Remove a previously registered listener.
    pub fn unsubscribe(&self, id: ListenerId) {
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.remove(&id.0);
        }
    }

    fn replace_state(&self, event: AuthEvent, state: AuthState) {
        if let Ok(mut current) = self.state.lock() {
            *current = state.clone();
        }
        if let Ok(listeners) = self.listeners.lock() {
            for listener in listeners.values() {
                listener(event, &state);
            }
        }
    }
}
