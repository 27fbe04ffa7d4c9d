//! # API Shared
//!
//! Shared utilities and definitions for UPS APIs.
//!
//! Contains:
//! - Request/response types (`dto` module)
//! - Shared services like `HealthService`
//! - Authentication and the per-request user session
//!
//! Used by `api-rest` for common functionality.

pub mod auth;
pub mod dto;
pub mod health;

pub use auth::{AuthError, RequestSession, UserSession};
pub use health::HealthService;
