//! Per-user notice dismissal.
//!
//! A dismissal is a value-less property whose key is the configured dismiss prefix followed by
//! the notice's wire value, owned by the dismissing user. Dismissals are permanent: this
//! module only ever inserts them.
//!
//! ## Pure Data Operations
//!
//! This module contains **only** data operations. Authentication and HTTP concerns belong
//! in `api-shared` and `api-rest`; callers pass an already-authenticated [`UserUuid`].

use crate::config::CoreConfig;
use crate::error::PropertyResult;
use crate::properties::{PropertyDto, PropertyQuery, PropertyStore};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use ups_types::{NoticeKey, UserUuid};

/// Result of [`NoticeService::dismiss`].
///
/// Both variants are successes; callers answer them identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissOutcome {
    /// A new dismissal record was committed.
    Dismissed,
    /// A record already existed; nothing was written.
    AlreadyDismissed,
}

/// Service for recording and reading notice dismissals.
#[derive(Clone)]
pub struct NoticeService {
    cfg: Arc<CoreConfig>,
    store: Arc<dyn PropertyStore>,
}

impl NoticeService {
    pub fn new(cfg: Arc<CoreConfig>, store: Arc<dyn PropertyStore>) -> Self {
        Self { cfg, store }
    }

    /// Marks `notice` as dismissed for `user_uuid`.
    ///
    /// Looks up the `(key, user)` pair inside a fresh session. If a record exists the session
    /// is dropped without writing. Otherwise a new record is saved and committed.
    ///
    /// # Errors
    ///
    /// Returns a [`PropertyError`](crate::PropertyError) if the store cannot be read or the
    /// commit fails. Nothing is retried.
    pub fn dismiss(
        &self,
        user_uuid: &UserUuid,
        notice: NoticeKey,
    ) -> PropertyResult<DismissOutcome> {
        let key = self.cfg.dismissal_key(notice);
        let mut session = self.store.open_session()?;

        let query = PropertyQuery::new()
            .key(key.clone())
            .user_uuid(user_uuid.clone());
        if !session.select_by_query(&query)?.is_empty() {
            tracing::debug!(%notice, user = %user_uuid, "notice already dismissed");
            return Ok(DismissOutcome::AlreadyDismissed);
        }

        session.save_property(PropertyDto::new(key, user_uuid.clone()))?;
        let summary = session.commit()?;

        // A concurrent request may have committed the same pair between our lookup and
        // our commit; the store skipped our row in that case.
        if summary.inserted == 0 {
            tracing::debug!(%notice, user = %user_uuid, "notice dismissed concurrently");
            return Ok(DismissOutcome::AlreadyDismissed);
        }

        tracing::info!(%notice, user = %user_uuid, "notice dismissed");
        Ok(DismissOutcome::Dismissed)
    }

    pub fn is_dismissed(&self, user_uuid: &UserUuid, notice: NoticeKey) -> PropertyResult<bool> {
        let mut session = self.store.open_session()?;
        let query = PropertyQuery::new()
            .key(self.cfg.dismissal_key(notice))
            .user_uuid(user_uuid.clone());
        Ok(!session.select_by_query(&query)?.is_empty())
    }

    /// Dismissal state of every recognised notice for `user_uuid`.
    ///
    /// The map always holds one entry per [`NoticeKey::ALL`] member.
    pub fn dismissed_notices(
        &self,
        user_uuid: &UserUuid,
    ) -> PropertyResult<BTreeMap<NoticeKey, bool>> {
        let mut session = self.store.open_session()?;
        let keys: HashSet<String> = session
            .select_by_query(&PropertyQuery::new().user_uuid(user_uuid.clone()))?
            .into_iter()
            .map(|property| property.key)
            .collect();

        Ok(NoticeKey::ALL
            .into_iter()
            .map(|notice| (notice, keys.contains(&self.cfg.dismissal_key(notice))))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::dismiss_prefix_from_env_value;
    use crate::properties::{FilePropertyStore, InMemoryPropertyStore};
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;
    use ups_types::NonEmptyText;

    fn test_cfg(property_data_dir: &Path) -> Arc<CoreConfig> {
        Arc::new(
            CoreConfig::new(
                property_data_dir.to_path_buf(),
                dismiss_prefix_from_env_value(None),
            )
            .expect("CoreConfig::new should succeed"),
        )
    }

    fn memory_service() -> (NoticeService, Arc<InMemoryPropertyStore>) {
        let store = Arc::new(InMemoryPropertyStore::new());
        let service = NoticeService::new(test_cfg(&PathBuf::from("unused")), store.clone());
        (service, store)
    }

    fn user(id: &str) -> UserUuid {
        UserUuid::parse(id).unwrap()
    }

    #[test]
    fn test_dismiss_records_property_with_prefixed_key() {
        let (service, store) = memory_service();

        let outcome = service
            .dismiss(&user("u-42"), NoticeKey::SonarlintAd)
            .expect("dismiss should succeed");

        assert_eq!(outcome, DismissOutcome::Dismissed);
        let rows = store.rows().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key, "user.dismissedNotices.sonarlintAd");
        assert_eq!(rows[0].user_uuid.as_str(), "u-42");
        assert_eq!(rows[0].value, None);
    }

    #[test]
    fn test_dismiss_twice_keeps_one_record() {
        let (service, store) = memory_service();

        for notice in NoticeKey::ALL {
            let first = service.dismiss(&user("u-1"), notice).unwrap();
            let second = service.dismiss(&user("u-1"), notice).unwrap();
            assert_eq!(first, DismissOutcome::Dismissed);
            assert_eq!(second, DismissOutcome::AlreadyDismissed);
        }

        assert_eq!(store.rows().unwrap().len(), NoticeKey::ALL.len());
    }

    #[test]
    fn test_dismiss_does_not_affect_other_users() {
        let (service, _store) = memory_service();

        service
            .dismiss(&user("u-1"), NoticeKey::EducationPrinciples)
            .unwrap();

        assert!(service
            .is_dismissed(&user("u-1"), NoticeKey::EducationPrinciples)
            .unwrap());
        assert!(!service
            .is_dismissed(&user("u-2"), NoticeKey::EducationPrinciples)
            .unwrap());
    }

    #[test]
    fn test_dismissed_notices_lists_every_key() {
        let (service, _store) = memory_service();
        service
            .dismiss(&user("u-1"), NoticeKey::IssueCleanCodeGuide)
            .unwrap();

        let state = service.dismissed_notices(&user("u-1")).unwrap();

        assert_eq!(state.len(), NoticeKey::ALL.len());
        assert!(state[&NoticeKey::IssueCleanCodeGuide]);
        assert!(!state[&NoticeKey::SonarlintAd]);
    }

    #[test]
    fn test_dismissed_notices_ignores_unrelated_properties() {
        let (service, store) = memory_service();
        let mut session = store.open_session().unwrap();
        session
            .save_property(PropertyDto::new("user.dismissedNotices.retired", user("u-1")))
            .unwrap();
        session
            .save_property(PropertyDto::new("sonarlintAd", user("u-1")))
            .unwrap();
        session.commit().unwrap();

        let state = service.dismissed_notices(&user("u-1")).unwrap();

        assert!(state.values().all(|dismissed| !dismissed));
    }

    #[test]
    fn test_custom_prefix_is_used() {
        let store = Arc::new(InMemoryPropertyStore::new());
        let cfg = Arc::new(
            CoreConfig::new(
                PathBuf::from("unused"),
                NonEmptyText::new("ui.hidden.").unwrap(),
            )
            .unwrap(),
        );
        let service = NoticeService::new(cfg, store.clone());

        service.dismiss(&user("u-1"), NoticeKey::SonarlintAd).unwrap();

        assert_eq!(store.rows().unwrap()[0].key, "ui.hidden.sonarlintAd");
    }

    #[test]
    fn test_dismiss_persists_through_file_store() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let cfg = test_cfg(temp_dir.path());

        {
            let store = Arc::new(FilePropertyStore::new(&cfg).unwrap());
            let service = NoticeService::new(cfg.clone(), store);
            assert_eq!(
                service.dismiss(&user("u-42"), NoticeKey::SonarlintAd).unwrap(),
                DismissOutcome::Dismissed
            );
        }

        let store = Arc::new(FilePropertyStore::new(&cfg).unwrap());
        let service = NoticeService::new(cfg, store);
        assert_eq!(
            service.dismiss(&user("u-42"), NoticeKey::SonarlintAd).unwrap(),
            DismissOutcome::AlreadyDismissed
        );
        assert!(service
            .dismissed_notices(&user("u-42"))
            .unwrap()[&NoticeKey::SonarlintAd]);
    }

    #[test]
    fn test_services_sharing_a_data_dir_keep_every_dismissal() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let cfg = test_cfg(temp_dir.path());
        let server_store = Arc::new(FilePropertyStore::new(&cfg).unwrap());
        let cli_store = Arc::new(FilePropertyStore::new(&cfg).unwrap());
        let server = NoticeService::new(cfg.clone(), server_store);
        let cli = NoticeService::new(cfg, cli_store);

        for round in 0..50 {
            let owner = user(&format!("u-{round}"));
            std::thread::scope(|scope| {
                let a = scope.spawn(|| server.dismiss(&owner, NoticeKey::SonarlintAd));
                let b = scope.spawn(|| cli.dismiss(&owner, NoticeKey::EducationPrinciples));
                assert_eq!(a.join().unwrap().unwrap(), DismissOutcome::Dismissed);
                assert_eq!(b.join().unwrap().unwrap(), DismissOutcome::Dismissed);
            });

            let state = server.dismissed_notices(&owner).unwrap();
            assert!(state[&NoticeKey::SonarlintAd], "round {round}");
            assert!(state[&NoticeKey::EducationPrinciples], "round {round}");
        }
    }

    #[test]
    fn test_concurrent_dismissals_leave_one_record() {
        let (service, store) = memory_service();

        std::thread::scope(|scope| {
            for _ in 0..8 {
                let service = service.clone();
                scope.spawn(move || {
                    service
                        .dismiss(&user("u-1"), NoticeKey::SonarlintAd)
                        .expect("dismiss should succeed");
                });
            }
        });

        assert_eq!(store.rows().unwrap().len(), 1);
    }
}
