//! Authentication error types.

use thiserror::Error;

use freshmart_core::EmailError;

use crate::supabase::SupabaseError;

/// Errors that can occur during authentication operations.
///
/// Each variant is a distinct failure reason the UI renders to the user.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format (caught client-side, before any remote call).
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// The email domain looks like a common typo.
    #[error("did you mean {suggestion}? Please correct the email and try again")]
    EmailTypo {
        /// The corrected address to suggest.
        suggestion: String,
    },

    /// The two password fields do not match.
    #[error("passwords don't match")]
    PasswordMismatch,

    /// Password too short.
    #[error("password must be at least {min} characters")]
    WeakPassword {
        /// Minimum required length.
        min: usize,
    },

    /// Wrong email or password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// No authenticated session.
    #[error("not signed in")]
    NotSignedIn,

    /// Backend failure.
    #[error("backend error: {0}")]
    Backend(SupabaseError),
}
