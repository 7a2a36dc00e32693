//! Locally persisted favorites.
//!
//! The set is read once when the store is opened and the whole file is
//! rewritten after every change. The on-disk form is a JSON array of ids.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FavoritesError {
    #[error("favorites file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("favorites file {path} is not a JSON list of ids: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug)]
pub struct FavoritesStore {
    path: PathBuf,
    ids: BTreeSet<String>,
}

impl FavoritesStore {
    /// Open the favorites file, treating a missing file as an empty set.
    ///
    /// # Errors
    ///
    /// Returns [`FavoritesError`] if the file exists but cannot be read or parsed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, FavoritesError> {
        let path = path.as_ref().to_path_buf();
        let ids = match std::fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeSet::new(),
            Ok(raw) => {
                let list: Vec<String> =
                    serde_json::from_str(&raw).map_err(|source| FavoritesError::Json {
                        path: path.clone(),
                        source,
                    })?;
                list.into_iter().collect()
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeSet::new(),
            Err(source) => return Err(FavoritesError::Io { path, source }),
        };
        tracing::debug!(path = %path.display(), count = ids.len(), "loaded favorites");
        Ok(Self { path, ids })
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Favorited ids in sorted order.
    pub fn list(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Add an id. Returns `true` if it was not already a favorite.
    ///
    /// # Errors
    ///
    /// Returns [`FavoritesError::Io`] if the file cannot be written.
    pub fn add(&mut self, id: &str) -> Result<bool, FavoritesError> {
        if self.ids.contains(id) {
            return Ok(false);
        }
        let mut next = self.ids.clone();
        next.insert(id.to_string());
        self.commit(next)?;
        Ok(true)
    }

    /// Remove an id. Returns `true` if it was a favorite.
    ///
    /// # Errors
    ///
    /// Returns [`FavoritesError::Io`] if the file cannot be written.
    pub fn remove(&mut self, id: &str) -> Result<bool, FavoritesError> {
        if !self.ids.contains(id) {
            return Ok(false);
        }
        let mut next = self.ids.clone();
        next.remove(id);
        self.commit(next)?;
        Ok(true)
    }

    /// Flip an id's membership. Returns the new state (`true` = favorite).
    ///
    /// # Errors
    ///
    /// Returns [`FavoritesError::Io`] if the file cannot be written.
    pub fn toggle(&mut self, id: &str) -> Result<bool, FavoritesError> {
        if self.contains(id) {
            self.remove(id)?;
            Ok(false)
        } else {
            self.add(id)?;
            Ok(true)
        }
    }

    /// Writes `next` to disk and only then replaces the in-memory set.
    fn commit(&mut self, next: BTreeSet<String>) -> Result<(), FavoritesError> {
        let body = serde_json::to_string(&next).map_err(|source| FavoritesError::Json {
            path: self.path.clone(),
            source,
        })?;
        std::fs::write(&self.path, body).map_err(|source| FavoritesError::Io {
            path: self.path.clone(),
            source,
        })?;
        self.ids = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_opens_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FavoritesStore::open(dir.path().join("favorites.json")).expect("open");
        assert!(store.is_empty());
    }

    #[test]
    fn changes_are_persisted_immediately() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("favorites.json");

        let mut store = FavoritesStore::open(&path).expect("open");
        assert!(store.add("shop-b").expect("add"));
        assert!(store.add("shop-a").expect("add"));
        assert!(!store.add("shop-a").expect("re-add"), "duplicate add is a no-op");

        let raw = std::fs::read_to_string(&path).expect("read back");
        assert_eq!(raw, r#"["shop-a","shop-b"]"#);

        let reopened = FavoritesStore::open(&path).expect("reopen");
        assert_eq!(reopened.list().collect::<Vec<_>>(), vec!["shop-a", "shop-b"]);
    }

    #[test]
    fn toggle_flips_membership() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = FavoritesStore::open(dir.path().join("f.json")).expect("open");

        assert!(store.toggle("shop-1").expect("toggle on"));
        assert!(store.contains("shop-1"));
        assert!(!store.toggle("shop-1").expect("toggle off"));
        assert!(!store.contains("shop-1"));
        assert!(!store.remove("shop-1").expect("remove missing"));
    }

    #[test]
    fn failed_write_leaves_set_unchanged() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sub = dir.path().join("state");
        std::fs::create_dir(&sub).expect("mkdir");
        let mut store = FavoritesStore::open(sub.join("favorites.json")).expect("open");
        assert!(store.add("shop-1").expect("add"));

        std::fs::remove_dir_all(&sub).expect("remove dir");

        assert!(matches!(store.add("shop-2"), Err(FavoritesError::Io { .. })));
        assert!(!store.contains("shop-2"));
        assert!(matches!(store.remove("shop-1"), Err(FavoritesError::Io { .. })));
        assert!(store.contains("shop-1"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("favorites.json");
        std::fs::write(&path, "{not a list}").expect("write");
        assert!(matches!(
            FavoritesStore::open(&path),
            Err(FavoritesError::Json { .. })
        ));
    }
}
