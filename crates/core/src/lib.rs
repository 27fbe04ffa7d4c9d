//! # UPS Core
//!
//! Core business logic for the UPS user property service.
//!
//! This crate contains pure data operations:
//! - A generic per-user key/value property store with transactional sessions
//! - File-backed (sharded YAML) and in-memory store implementations
//! - Notice dismissal on top of the property store
//!
//! **No API concerns**: Authentication, HTTP servers, or service interfaces belong in
//! `api-shared` or `api-rest`.

pub mod config;
pub mod constants;
pub mod error;
pub mod notices;
pub mod properties;

pub use config::CoreConfig;
pub use constants::{DEFAULT_PROPERTY_DATA_DIR, USER_DISMISS_PREFIX};
pub use error::{PropertyError, PropertyResult};
pub use notices::{DismissOutcome, NoticeService};
pub use properties::{
    CommitSummary, FilePropertyStore, InMemoryPropertyStore, PropertyDto, PropertyQuery,
    PropertySession, PropertyStore,
};
pub use ups_types::{NonEmptyText, NoticeKey, NoticeKeyError, TextError, UserUuid};
