//! Request and response bodies shared by the API surfaces.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Query parameters of `POST /api/users/dismiss_notice`.
///
/// `notice` stays a raw string here so a missing or unknown value reaches the handler and is
/// reported as a validation error after the session check.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DismissNoticeReq {
    /// Notice key to dismiss
    #[param(example = "educationPrinciples")]
    pub notice: Option<String>,
}

/// Dismissal state of every recognised notice for the current user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DismissedNoticesRes {
    pub dismissed_notices: BTreeMap<String, bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
}
