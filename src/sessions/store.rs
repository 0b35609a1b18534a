use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{info, warn};

use super::filter::MS_PER_DAY;
use super::Session;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to write session data: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to encode session data: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Failed to persist session data: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// The persistence collaborator: one named collection, saved as a unit.
///
/// Reads fail soft (corrupt or unreadable data is an empty collection);
/// writes fail loud so the caller can tell the user.
pub trait SessionStore {
    fn load(&self) -> Vec<Session>;
    fn save(&self, sessions: &[Session]) -> Result<(), StoreError>;
    fn delete_one(&self, id: i64) -> Result<(), StoreError>;
    fn clear_all(&self) -> Result<(), StoreError>;
    /// Drop sessions created more than `days` ago. Returns how many went.
    fn prune_older_than(&self, days: i64, now: DateTime<Utc>) -> Result<usize, StoreError>;
}

/// Stores the whole collection as one JSON document on disk.
pub struct JsonSessionStore {
    path: PathBuf,
}

impl JsonSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for JsonSessionStore {
    fn load(&self) -> Vec<Session> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!("Failed to read session data, starting empty: {e}");
                return Vec::new();
            }
        };
        match serde_json::from_str(&data) {
            Ok(sessions) => sessions,
            Err(e) => {
                warn!("Session data is corrupt, starting empty: {e}");
                Vec::new()
            }
        }
    }

    fn save(&self, sessions: &[Session]) -> Result<(), StoreError> {
        let json = serde_json::to_string(sessions)?;
        // Write-then-rename keeps a torn write from eating the collection.
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut staged = NamedTempFile::new_in(dir)?;
        staged.write_all(json.as_bytes())?;
        staged.persist(&self.path)?;
        Ok(())
    }

    fn delete_one(&self, id: i64) -> Result<(), StoreError> {
        let kept: Vec<Session> = self
            .load()
            .into_iter()
            .filter(|session| session.id != id)
            .collect();
        self.save(&kept)
    }

    fn clear_all(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn prune_older_than(&self, days: i64, now: DateTime<Utc>) -> Result<usize, StoreError> {
        let sessions = self.load();
        let cutoff = now.timestamp_millis() - days * MS_PER_DAY;
        let kept: Vec<Session> = sessions
            .iter()
            .filter(|session| session.id >= cutoff)
            .cloned()
            .collect();
        let removed = sessions.len() - kept.len();
        if removed > 0 {
            self.save(&kept)?;
            info!("Pruned {removed} old session(s)");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sessions::Reading;
    use chrono::Duration;
    use tempfile::tempdir;

    fn session_at(date: DateTime<Utc>) -> Session {
        Session::new(
            vec![Reading::new(132, 85, Some(70)).unwrap()],
            Some("after coffee".to_owned()),
            date,
        )
        .unwrap()
    }

    fn store_in(dir: &tempfile::TempDir) -> JsonSessionStore {
        JsonSessionStore::new(dir.path().join("sessions.json"))
    }

    #[test_log::test]
    fn save_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        let sessions = vec![session_at(Utc::now())];

        store.save(&sessions).unwrap();
        assert_eq!(store.load(), sessions);
    }

    #[test_log::test]
    fn missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        assert!(store_in(&dir).load().is_empty());
    }

    #[test_log::test]
    fn corrupt_file_loads_empty() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "{not json").unwrap();
        assert!(store.load().is_empty());
    }

    #[test_log::test]
    fn delete_one_removes_only_that_session() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        let now = Utc::now();
        let keep = session_at(now);
        let gone = session_at(now - Duration::hours(2));
        store.save(&[keep.clone(), gone.clone()]).unwrap();

        store.delete_one(gone.id).unwrap();
        assert_eq!(store.load(), vec![keep]);
    }

    #[test_log::test]
    fn clear_all_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        store.save(&[session_at(Utc::now())]).unwrap();

        store.clear_all().unwrap();
        assert!(store.load().is_empty());
        // Second clear with nothing on disk is still fine.
        store.clear_all().unwrap();
    }

    #[test_log::test]
    fn prune_drops_only_sessions_past_the_cutoff() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        let now = Utc::now();
        let fresh = session_at(now - Duration::days(5));
        let stale = session_at(now - Duration::days(31));
        store.save(&[fresh.clone(), stale]).unwrap();

        let removed = store.prune_older_than(30, now).unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.load(), vec![fresh]);
    }

    #[test_log::test]
    fn prune_with_nothing_to_do_leaves_the_file_alone() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        let sessions = vec![session_at(Utc::now())];
        store.save(&sessions).unwrap();

        let removed = store.prune_older_than(30, Utc::now()).unwrap();
        assert_eq!(removed, 0);
        assert_eq!(store.load(), sessions);
    }
}
