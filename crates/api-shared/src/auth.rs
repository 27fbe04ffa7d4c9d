//! Authentication and the per-request user session.
//!
//! UPS does not authenticate end users itself. An upstream gateway does, then forwards the
//! request with two headers:
//!
//! - `x-api-key`: the key shared between gateway and service
//! - `x-user-uuid`: the authenticated user's identifier
//!
//! A request is logged in only when both are present and the key matches.

use ups_types::UserUuid;

/// Header carrying the shared API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Header carrying the authenticated user's identifier.
pub const USER_UUID_HEADER: &str = "x-user-uuid";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("authentication required")]
    Unauthenticated,
    #[error("invalid API key")]
    InvalidApiKey,
    #[error("logged-in session has no user uuid")]
    MissingUserUuid,
}

/// Validates the provided API key against the expected key.
pub fn validate_api_key(provided_key: &str, expected_key: &str) -> Result<(), AuthError> {
    if provided_key == expected_key {
        Ok(())
    } else {
        Err(AuthError::InvalidApiKey)
    }
}

/// The caller's session, as seen by a request handler.
pub trait UserSession {
    fn is_logged_in(&self) -> bool;

    fn current_user_uuid(&self) -> Option<&UserUuid>;

    /// Fails with [`AuthError::Unauthenticated`] unless the session is logged in.
    fn check_logged_in(&self) -> Result<(), AuthError> {
        if self.is_logged_in() {
            Ok(())
        } else {
            Err(AuthError::Unauthenticated)
        }
    }

    /// The logged-in user's identifier.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Unauthenticated`] if the session is anonymous.
    /// - [`AuthError::MissingUserUuid`] if the session claims to be logged in but carries no
    ///   identifier.
    fn logged_in_user(&self) -> Result<&UserUuid, AuthError> {
        self.check_logged_in()?;
        self.current_user_uuid().ok_or(AuthError::MissingUserUuid)
    }
}

/// Session built from the gateway headers of one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestSession {
    user_uuid: Option<UserUuid>,
}

impl RequestSession {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn logged_in(user_uuid: UserUuid) -> Self {
        Self {
            user_uuid: Some(user_uuid),
        }
    }

    /// Builds the session from raw header values.
    ///
    /// Any failure (missing or wrong key, missing or blank user) yields an anonymous session;
    /// the handler decides whether that is acceptable.
    pub fn authenticate(
        expected_api_key: &str,
        provided_api_key: Option<&str>,
        user_header: Option<&str>,
    ) -> Self {
        let Some(provided_api_key) = provided_api_key else {
            return Self::anonymous();
        };
        if let Err(e) = validate_api_key(provided_api_key, expected_api_key) {
            tracing::warn!("rejecting request session: {}", e);
            return Self::anonymous();
        }

        match user_header.map(UserUuid::parse) {
            Some(Ok(user_uuid)) => Self::logged_in(user_uuid),
            Some(Err(_)) | None => Self::anonymous(),
        }
    }
}

impl UserSession for RequestSession {
    fn is_logged_in(&self) -> bool {
        self.user_uuid.is_some()
    }

    fn current_user_uuid(&self) -> Option<&UserUuid> {
        self.user_uuid.as_ref()
    }
}
