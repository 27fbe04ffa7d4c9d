//! File-backed property store.
//!
//! ## Storage Layout
//!
//! Each user owns one YAML file, placed in a sharded directory derived from the SHA-256 of
//! the user identifier:
//!
//! ```text
//! properties/
//!   <h[0..2]>/
//!     <h[2..4]>/
//!       <h>/
//!         properties.yaml
//! ```
//!
//! Hashing keeps arbitrary user identifiers out of path names and spreads users evenly
//! across shards.
//!
//! ## Commits
//!
//! Commits are serialised by an exclusive advisory lock on `properties/.commit.lock`, so
//! every store opened on the same directory (in this process or another one, such as the
//! `ups` CLI next to the server) sees the others' rows before merging its own. A user's file
//! is rewritten by writing a uniquely named temporary sibling and renaming it over the
//! original, so readers never observe a partial file. A commit touching several users
//! replaces each file atomically but not the set as a whole.

use super::{
    apply_staged, stage, CommitSummary, PropertyDto, PropertyQuery, PropertySession, PropertyStore,
};
use crate::config::CoreConfig;
use crate::constants::{COMMIT_LOCK_FILENAME, PROPERTIES_FILENAME, TEMP_FILE_SUFFIX};
use crate::{PropertyError, PropertyResult};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use ups_types::UserUuid;

/// On-disk form of one user's properties.
#[derive(Debug, Serialize, Deserialize)]
struct PropertiesFile {
    user_uuid: UserUuid,
    #[serde(default)]
    properties: Vec<PropertyDto>,
}

/// Property store persisting one YAML file per user.
#[derive(Debug)]
pub struct FilePropertyStore {
    properties_dir: PathBuf,
}

impl FilePropertyStore {
    /// Opens the store under `cfg.properties_dir()`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::StorageDirCreation`] if the directory cannot be created.
    pub fn new(cfg: &CoreConfig) -> PropertyResult<Self> {
        Self::open(cfg.properties_dir())
    }

    /// Opens the store rooted at `properties_dir`, creating the directory if needed.
    pub fn open(properties_dir: PathBuf) -> PropertyResult<Self> {
        fs::create_dir_all(&properties_dir).map_err(PropertyError::StorageDirCreation)?;
        tracing::debug!(dir = %properties_dir.display(), "opened file property store");
        Ok(Self { properties_dir })
    }

    pub fn properties_dir(&self) -> &Path {
        &self.properties_dir
    }

    /// Sharded directory holding `user_uuid`'s property file.
    pub fn user_dir(&self, user_uuid: &UserUuid) -> PathBuf {
        let digest = hex::encode(Sha256::digest(user_uuid.as_str().as_bytes()));
        let s1 = &digest[0..2];
        let s2 = &digest[2..4];
        self.properties_dir.join(s1).join(s2).join(&digest)
    }

    fn user_file(&self, user_uuid: &UserUuid) -> PathBuf {
        self.user_dir(user_uuid).join(PROPERTIES_FILENAME)
    }

    /// Reads `user_uuid`'s rows. A missing file means the user has no properties yet.
    fn read_user(&self, user_uuid: &UserUuid) -> PropertyResult<Vec<PropertyDto>> {
        let path = self.user_file(user_uuid);
        let file = match read_properties_file(&path)? {
            Some(file) => file,
            None => return Ok(Vec::new()),
        };

        if &file.user_uuid != user_uuid {
            return Err(PropertyError::OwnerMismatch {
                path,
                expected: user_uuid.to_string(),
                found: file.user_uuid.to_string(),
            });
        }
        Ok(file.properties)
    }

    fn write_user(
        &self,
        user_uuid: &UserUuid,
        properties: Vec<PropertyDto>,
    ) -> PropertyResult<()> {
        let dir = self.user_dir(user_uuid);
        fs::create_dir_all(&dir).map_err(PropertyError::StorageDirCreation)?;

        let file = PropertiesFile {
            user_uuid: user_uuid.clone(),
            properties,
        };
        let yaml = serde_yaml::to_string(&file).map_err(PropertyError::YamlSerialization)?;

        let mut tmp = tempfile::Builder::new()
            .prefix(PROPERTIES_FILENAME)
            .suffix(TEMP_FILE_SUFFIX)
            .tempfile_in(&dir)
            .map_err(PropertyError::FileWrite)?;
        tmp.write_all(yaml.as_bytes()).map_err(PropertyError::FileWrite)?;
        tmp.as_file().sync_all().map_err(PropertyError::FileWrite)?;
        tmp.persist(dir.join(PROPERTIES_FILENAME))
            .map_err(|e| PropertyError::FileRename(e.error))?;
        Ok(())
    }

    /// Opens the lock file guarding commits. Locking happens on the returned handle.
    fn commit_lock(&self) -> PropertyResult<fd_lock::RwLock<fs::File>> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.properties_dir.join(COMMIT_LOCK_FILENAME))
            .map_err(PropertyError::CommitLock)?;
        Ok(fd_lock::RwLock::new(file))
    }

    /// Reads every user's rows by walking the shard tree.
    fn read_all(&self) -> PropertyResult<Vec<PropertyDto>> {
        let mut properties = Vec::new();

        for s1 in list_dirs(&self.properties_dir)? {
            for s2 in list_dirs(&s1)? {
                for user_dir in list_dirs(&s2)? {
                    let path = user_dir.join(PROPERTIES_FILENAME);
                    if let Some(file) = read_properties_file(&path)? {
                        properties.extend(file.properties);
                    }
                }
            }
        }

        Ok(properties)
    }
}

impl PropertyStore for FilePropertyStore {
    fn open_session(&self) -> PropertyResult<Box<dyn PropertySession + '_>> {
        Ok(Box::new(FileSession {
            store: self,
            staged: Vec::new(),
        }))
    }
}

struct FileSession<'a> {
    store: &'a FilePropertyStore,
    staged: Vec<PropertyDto>,
}

impl PropertySession for FileSession<'_> {
    fn select_by_query(&mut self, query: &PropertyQuery) -> PropertyResult<Vec<PropertyDto>> {
        let committed = match query.user() {
            Some(user_uuid) => self.store.read_user(user_uuid)?,
            None => self.store.read_all()?,
        };

        Ok(committed
            .into_iter()
            .chain(self.staged.iter().cloned())
            .filter(|property| query.matches(property))
            .collect())
    }

    fn save_property(&mut self, property: PropertyDto) -> PropertyResult<()> {
        stage(&mut self.staged, property)
    }

    fn commit(mut self: Box<Self>) -> PropertyResult<CommitSummary> {
        let staged = std::mem::take(&mut self.staged);
        if staged.is_empty() {
            return Ok(CommitSummary::default());
        }

        let mut by_user: BTreeMap<UserUuid, Vec<PropertyDto>> = BTreeMap::new();
        for property in staged {
            by_user
                .entry(property.user_uuid.clone())
                .or_default()
                .push(property);
        }

        let mut lock = self.store.commit_lock()?;
        let _guard = lock.write().map_err(PropertyError::CommitLock)?;

        let mut summary = CommitSummary::default();
        for (user_uuid, staged) in by_user {
            let mut rows = self.store.read_user(&user_uuid)?;
            let applied = apply_staged(&mut rows, staged);
            if applied.inserted > 0 {
                self.store.write_user(&user_uuid, rows)?;
            }
            summary.inserted += applied.inserted;
            summary.skipped += applied.skipped;
        }

        tracing::debug!(
            inserted = summary.inserted,
            skipped = summary.skipped,
            "committed property session"
        );
        Ok(summary)
    }
}

fn read_properties_file(path: &Path) -> PropertyResult<Option<PropertiesFile>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(PropertyError::FileRead(e)),
    };
    serde_yaml::from_str(&contents)
        .map(Some)
        .map_err(PropertyError::YamlDeserialization)
}

fn list_dirs(path: &Path) -> PropertyResult<Vec<PathBuf>> {
    let entries = match fs::read_dir(path) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(PropertyError::FileRead(e)),
    };

    let mut dirs = Vec::new();
    for entry in entries {
        let entry_path = entry.map_err(PropertyError::FileRead)?.path();
        if entry_path.is_dir() {
            dirs.push(entry_path);
        }
    }
    dirs.sort();
    Ok(dirs)
}
