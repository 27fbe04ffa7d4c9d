//! Generic per-user key/value property store.
//!
//! The store is reached through a transactional session:
//!
//! ```text
//! let mut session = store.open_session()?;
//! let rows = session.select_by_query(&query)?;
//! session.save_property(property)?;
//! session.commit()?;            // or drop the session to roll back
//! ```
//!
//! ## Uniqueness
//!
//! A `(user_uuid, key)` pair maps to at most one row. Stores enforce this at commit time
//! with insert-if-absent semantics: a staged row whose pair already exists is skipped and
//! reported in [`CommitSummary::skipped`]. Two sessions that both observed a pair as absent
//! therefore still produce a single row.
//!
//! ## Implementations
//!
//! - [`FilePropertyStore`]: one YAML file per user, sharded on disk.
//! - [`InMemoryPropertyStore`]: process-local, for tests and development.

mod file;
mod memory;

pub use file::FilePropertyStore;
pub use memory::InMemoryPropertyStore;

use crate::{PropertyError, PropertyResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ups_types::UserUuid;
use uuid::Uuid;

/// One stored property row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDto {
    pub uuid: Uuid,
    pub key: String,
    pub user_uuid: UserUuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl PropertyDto {
    /// Creates a value-less property for `user_uuid`, stamped with the current time.
    pub fn new(key: impl Into<String>, user_uuid: UserUuid) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            key: key.into(),
            user_uuid,
            value: None,
            created_at: Utc::now(),
        }
    }

    /// True if `other` occupies the same `(user_uuid, key)` slot.
    pub fn same_slot(&self, other: &PropertyDto) -> bool {
        self.key == other.key && self.user_uuid == other.user_uuid
    }

    fn validate(&self) -> PropertyResult<()> {
        if self.key.trim().is_empty() {
            return Err(PropertyError::InvalidInput(
                "property key cannot be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Filter for [`PropertySession::select_by_query`].
///
/// Unset fields match everything, so an empty query selects every row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyQuery {
    key: Option<String>,
    user_uuid: Option<UserUuid>,
}

impl PropertyQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn user_uuid(mut self, user_uuid: UserUuid) -> Self {
        self.user_uuid = Some(user_uuid);
        self
    }

    pub fn user(&self) -> Option<&UserUuid> {
        self.user_uuid.as_ref()
    }

    pub fn matches(&self, property: &PropertyDto) -> bool {
        let key_matches = match &self.key {
            Some(key) => *key == property.key,
            None => true,
        };
        let user_matches = match &self.user_uuid {
            Some(user_uuid) => *user_uuid == property.user_uuid,
            None => true,
        };
        key_matches && user_matches
    }
}

/// Outcome of [`PropertySession::commit`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitSummary {
    pub inserted: usize,
    pub skipped: usize,
}

/// A property store that hands out transactional sessions.
pub trait PropertyStore: Send + Sync {
    fn open_session(&self) -> PropertyResult<Box<dyn PropertySession + '_>>;
}

/// A unit of work against a [`PropertyStore`].
///
/// Writes are staged until [`commit`](PropertySession::commit). Dropping the session without
/// committing discards them.
pub trait PropertySession {
    /// Committed rows matching `query`, followed by this session's staged rows that match.
    fn select_by_query(&mut self, query: &PropertyQuery) -> PropertyResult<Vec<PropertyDto>>;

    /// Stages `property` for insertion.
    fn save_property(&mut self, property: PropertyDto) -> PropertyResult<()>;

    /// Applies staged rows with insert-if-absent semantics on `(user_uuid, key)`.
    fn commit(self: Box<Self>) -> PropertyResult<CommitSummary>;
}

/// Validates `property` and appends it to `staged`.
pub(crate) fn stage(staged: &mut Vec<PropertyDto>, property: PropertyDto) -> PropertyResult<()> {
    property.validate()?;
    staged.push(property);
    Ok(())
}

/// Merges `staged` into `rows`, skipping any row whose slot is already taken.
pub(crate) fn apply_staged(
    rows: &mut Vec<PropertyDto>,
    staged: Vec<PropertyDto>,
) -> CommitSummary {
    let mut summary = CommitSummary::default();
    for property in staged {
        if rows.iter().any(|existing| existing.same_slot(&property)) {
            tracing::debug!(
                key = %property.key,
                user = %property.user_uuid,
                "property already present, skipping insert"
            );
            summary.skipped += 1;
            continue;
        }
        rows.push(property);
        summary.inserted += 1;
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> UserUuid {
        UserUuid::parse(id).unwrap()
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let property = PropertyDto::new("a.b", user("u-1"));
        assert!(PropertyQuery::new().matches(&property));
    }

    #[test]
    fn test_query_requires_every_set_field() {
        let property = PropertyDto::new("a.b", user("u-1"));

        assert!(PropertyQuery::new().key("a.b").matches(&property));
        assert!(PropertyQuery::new()
            .key("a.b")
            .user_uuid(user("u-1"))
            .matches(&property));
        assert!(!PropertyQuery::new()
            .key("a.b")
            .user_uuid(user("u-2"))
            .matches(&property));
        assert!(!PropertyQuery::new().key("a.c").matches(&property));
    }

    #[test]
    fn test_apply_staged_skips_taken_slots() {
        let mut rows = vec![PropertyDto::new("k", user("u-1"))];
        let staged = vec![
            PropertyDto::new("k", user("u-1")),
            PropertyDto::new("k", user("u-2")),
            PropertyDto::new("k", user("u-2")),
        ];

        let summary = apply_staged(&mut rows, staged);

        assert_eq!(
            summary,
            CommitSummary {
                inserted: 1,
                skipped: 2
            }
        );
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_stage_rejects_blank_key() {
        let mut staged = Vec::new();
        let result = stage(&mut staged, PropertyDto::new("  ", user("u-1")));
        assert!(matches!(result, Err(PropertyError::InvalidInput(_))));
        assert!(staged.is_empty());
    }
}
