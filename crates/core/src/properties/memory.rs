use super::{
    apply_staged, stage, CommitSummary, PropertyDto, PropertyQuery, PropertySession, PropertyStore,
};
use crate::{PropertyError, PropertyResult};
use std::sync::{Mutex, MutexGuard};

/// Process-local property store.
///
/// Rows live in a single `Mutex<Vec<_>>`; commits hold the lock for the whole merge, which
/// gives the same insert-if-absent guarantee as the file store.
#[derive(Debug, Default)]
pub struct InMemoryPropertyStore {
    rows: Mutex<Vec<PropertyDto>>,
}

impl InMemoryPropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every committed row.
    pub fn rows(&self) -> PropertyResult<Vec<PropertyDto>> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> PropertyResult<MutexGuard<'_, Vec<PropertyDto>>> {
        self.rows.lock().map_err(|_| PropertyError::LockPoisoned)
    }
}

impl PropertyStore for InMemoryPropertyStore {
    fn open_session(&self) -> PropertyResult<Box<dyn PropertySession + '_>> {
        Ok(Box::new(InMemorySession {
            store: self,
            staged: Vec::new(),
        }))
    }
}

struct InMemorySession<'a> {
    store: &'a InMemoryPropertyStore,
    staged: Vec<PropertyDto>,
}

impl PropertySession for InMemorySession<'_> {
    fn select_by_query(&mut self, query: &PropertyQuery) -> PropertyResult<Vec<PropertyDto>> {
        let rows = self.store.lock()?;
        Ok(rows
            .iter()
            .chain(self.staged.iter())
            .filter(|property| query.matches(property))
            .cloned()
            .collect())
    }

    fn save_property(&mut self, property: PropertyDto) -> PropertyResult<()> {
        stage(&mut self.staged, property)
    }

    fn commit(mut self: Box<Self>) -> PropertyResult<CommitSummary> {
        let staged = std::mem::take(&mut self.staged);
        let mut rows = self.store.lock()?;
        Ok(apply_staged(&mut rows, staged))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ups_types::UserUuid;

    fn user(id: &str) -> UserUuid {
        UserUuid::parse(id).unwrap()
    }

    #[test]
    fn test_commit_persists_staged_rows() {
        let store = InMemoryPropertyStore::new();

        let mut session = store.open_session().unwrap();
        session
            .save_property(PropertyDto::new("k", user("u-1")))
            .unwrap();
        let summary = session.commit().unwrap();

        assert_eq!(summary.inserted, 1);
        assert_eq!(store.rows().unwrap().len(), 1);
    }

    #[test]
    fn test_drop_without_commit_discards_staged_rows() {
        let store = InMemoryPropertyStore::new();

        {
            let mut session = store.open_session().unwrap();
            session
                .save_property(PropertyDto::new("k", user("u-1")))
                .unwrap();
        }

        assert!(store.rows().unwrap().is_empty());
    }

    #[test]
    fn test_session_sees_its_own_staged_rows() {
        let store = InMemoryPropertyStore::new();
        let mut session = store.open_session().unwrap();
        session
            .save_property(PropertyDto::new("k", user("u-1")))
            .unwrap();

        let query = PropertyQuery::new().key("k").user_uuid(user("u-1"));
        assert_eq!(session.select_by_query(&query).unwrap().len(), 1);
    }

    #[test]
    fn test_racing_sessions_produce_one_row() {
        let store = InMemoryPropertyStore::new();
        let query = PropertyQuery::new().key("k").user_uuid(user("u-1"));

        let mut first = store.open_session().unwrap();
        let mut second = store.open_session().unwrap();
        assert!(first.select_by_query(&query).unwrap().is_empty());
        assert!(second.select_by_query(&query).unwrap().is_empty());

        first.save_property(PropertyDto::new("k", user("u-1"))).unwrap();
        second.save_property(PropertyDto::new("k", user("u-1"))).unwrap();

        let a = first.commit().unwrap();
        let b = second.commit().unwrap();

        assert_eq!(a.inserted + b.inserted, 1);
        assert_eq!(a.skipped + b.skipped, 1);
        assert_eq!(store.rows().unwrap().len(), 1);
    }
}
