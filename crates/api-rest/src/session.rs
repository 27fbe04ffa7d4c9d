use crate::AppState;
use api_shared::auth::{API_KEY_HEADER, USER_UUID_HEADER};
use api_shared::RequestSession;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use std::convert::Infallible;

/// Extractor yielding the caller's [`RequestSession`].
///
/// Never rejects: a request without valid gateway headers gets an anonymous session, and the
/// handler's `logged_in_user()` call turns that into a 401.
pub struct CurrentSession(pub RequestSession);

#[async_trait]
impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(CurrentSession(RequestSession::authenticate(
            &state.api_key,
            header_value(&parts.headers, API_KEY_HEADER),
            header_value(&parts.headers, USER_UUID_HEADER),
        )))
    }
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
