//! Durable key/value slots — one file per slot in a data directory.
//!
//! Two slots exist: the credential (a plain-text token) and the serialized
//! history (owned by [`HistoryStore`](crate::HistoryStore)). Writes go to a
//! temporary sibling first and are renamed into place.

use ait_core::error::StoreError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Slot holding the API credential.
pub const CREDENTIAL_SLOT: &str = "ait_token";

/// Slot holding the serialized history.
pub const HISTORY_SLOT: &str = "ait_history";

/// A directory of named slots.
#[derive(Debug, Clone)]
pub struct SlotDir {
    root: PathBuf,
}

impl SlotDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, slot: &str) -> PathBuf {
        self.root.join(slot)
    }

    /// Read a slot. An absent slot is `Ok(None)`.
    pub fn read(&self, slot: &str) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(self.path(slot)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::PersistenceUnavailable(format!(
                "Failed to read slot '{slot}': {e}"
            ))),
        }
    }

    /// Replace a slot's contents.
    pub fn write(&self, slot: &str, content: &str) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.root).map_err(|e| {
            StoreError::PersistenceUnavailable(format!("Failed to create data directory: {e}"))
        })?;

        let path = self.path(slot);
        let tmp = self.root.join(format!(".{slot}.tmp"));
        std::fs::write(&tmp, content).map_err(|e| {
            StoreError::PersistenceUnavailable(format!("Failed to write slot '{slot}': {e}"))
        })?;
        restrict_permissions(&tmp);
        std::fs::rename(&tmp, &path).map_err(|e| {
            StoreError::PersistenceUnavailable(format!("Failed to commit slot '{slot}': {e}"))
        })?;

        debug!(slot, bytes = content.len(), "Slot written");
        Ok(())
    }

    /// Delete a slot. Removing an absent slot is a no-op.
    pub fn remove(&self, slot: &str) -> Result<(), StoreError> {
        match std::fs::remove_file(self.path(slot)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::PersistenceUnavailable(format!(
                "Failed to remove slot '{slot}': {e}"
            ))),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    let _ = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600));
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) {}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn absent_slot_reads_none() {
        let dir = tempdir().unwrap();
        let slots = SlotDir::new(dir.path());
        assert_eq!(slots.read(CREDENTIAL_SLOT).unwrap(), None);
    }

    #[test]
    fn write_read_remove() {
        let dir = tempdir().unwrap();
        let slots = SlotDir::new(dir.path().join("nested"));

        slots.write(CREDENTIAL_SLOT, "sk-test").unwrap();
        assert_eq!(slots.read(CREDENTIAL_SLOT).unwrap().as_deref(), Some("sk-test"));

        slots.write(CREDENTIAL_SLOT, "sk-other").unwrap();
        assert_eq!(slots.read(CREDENTIAL_SLOT).unwrap().as_deref(), Some("sk-other"));

        slots.remove(CREDENTIAL_SLOT).unwrap();
        slots.remove(CREDENTIAL_SLOT).unwrap();
        assert_eq!(slots.read(CREDENTIAL_SLOT).unwrap(), None);
    }

    #[test]
    fn slots_are_independent() {
        let dir = tempdir().unwrap();
        let slots = SlotDir::new(dir.path());
        slots.write(CREDENTIAL_SLOT, "token").unwrap();
        assert_eq!(slots.read(HISTORY_SLOT).unwrap(), None);
    }

    #[test]
    fn unwritable_root_is_persistence_unavailable() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("not-a-dir");
        std::fs::write(&file, "x").unwrap();

        let slots = SlotDir::new(&file);
        let err = slots.write(HISTORY_SLOT, "data").unwrap_err();
        assert!(matches!(err, StoreError::PersistenceUnavailable(_)));
    }
}
