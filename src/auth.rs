//! Login, registration and logout flows.
//!
//! These are the only callers of [`SessionStore::set_session`]; logout and the
//! API client's 401 path are the only callers of `clear_session`.

use thiserror::Error;

use crate::api::ApiClient;
use crate::errors::{ApiError, SessionError};
use crate::session::{Session, SessionStore};
use crate::validate::{self, Credentials, Registration, ValidationError};

pub const LOGIN_FAILED: &str = "Login failed";
pub const LOGIN_UNREACHABLE: &str = "Login failed. Check credentials and backend.";
pub const REGISTER_FAILED: &str = "Registration failed";

/// Why a login or registration form did not go through. `Display` is the
/// inline banner text.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Invalid(#[from] ValidationError),

    #[error("{message}")]
    Rejected {
        message: String,
        #[source]
        source: ApiError,
    },

    #[error("Failed to store session: {0}")]
    Session(#[from] SessionError),
}

/// Log in and store the resulting session. The caller navigates to the
/// dashboard on success.
pub async fn login(api: &ApiClient, credentials: &Credentials) -> Result<Session, AuthError> {
    let request = validate::validate_login(credentials)?;
    let response = api.login(&request).await.map_err(|source| {
        let message = if source.is_network() {
            LOGIN_UNREACHABLE.to_string()
        } else {
            source.inline_message(LOGIN_FAILED)
        };
        AuthError::Rejected { message, source }
    })?;

    if response.user.is_none() {
        tracing::warn!("login response carried no profile, storing token only");
    }
    api.session()
        .set_session(&response.token, response.user.clone())?;
    Ok(Session {
        token: response.token,
        user: response.user,
    })
}

/// Register a new account. The caller navigates to the login view on success.
pub async fn register(api: &ApiClient, form: &Registration) -> Result<String, AuthError> {
    let request = validate::validate_registration(form)?;
    api.register(&request)
        .await
        .map_err(|source| AuthError::Rejected {
            message: source.inline_message(REGISTER_FAILED),
            source,
        })
}

pub fn logout(session: &SessionStore) -> Result<(), SessionError> {
    session.clear_session()
}
