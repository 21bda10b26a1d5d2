//! Session settings — the API credential and the destructive history
//! actions.
//!
//! The credential is read at the start of every workflow operation, so a
//! change applies to the next operation while calls already in flight keep
//! the credential they started with.

use ait_core::error::StoreError;
use ait_memory::slots::{CREDENTIAL_SLOT, SlotDir};
use std::sync::RwLock;
use tracing::{debug, info, warn};

/// Destructive actions on the experience store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryAction {
    /// Forget every experience
    Clear,
    /// Replace the history with the seed dataset
    Reset,
}

/// Holds the credential, optionally persisted to the credential slot.
#[derive(Debug)]
pub struct SessionSettings {
    credential: RwLock<Option<String>>,
    slots: Option<SlotDir>,
}

impl SessionSettings {
    /// In-memory settings, nothing persisted.
    pub fn new(credential: Option<String>) -> Self {
        Self {
            credential: RwLock::new(credential.and_then(normalize)),
            slots: None,
        }
    }

    /// Settings backed by the credential slot.
    ///
    /// A saved credential wins over `fallback` (the configured or environment
    /// API key).
    pub fn with_slots(slots: SlotDir, fallback: Option<String>) -> Result<Self, StoreError> {
        let saved = slots.read(CREDENTIAL_SLOT)?.and_then(normalize);
        let source = if saved.is_some() { "slot" } else { "config" };
        let credential = saved.or_else(|| fallback.and_then(normalize));
        debug!(source, present = credential.is_some(), "Credential loaded");

        Ok(Self {
            credential: RwLock::new(credential),
            slots: Some(slots),
        })
    }

    pub fn credential(&self) -> Option<String> {
        self.credential
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn has_credential(&self) -> bool {
        self.credential
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// Replace the credential. Empty or whitespace-only input removes it.
    ///
    /// The new credential is in effect before the slot is touched; a slot
    /// error only means it will not survive a restart.
    pub fn set_credential(&self, value: &str) -> Result<(), StoreError> {
        let credential = normalize(value.to_string());
        let present = credential.is_some();

        if let Some(slots) = &self.slots {
            let saved = match &credential {
                Some(token) => slots.write(CREDENTIAL_SLOT, token),
                None => slots.remove(CREDENTIAL_SLOT),
            };
            *self.credential.write().unwrap_or_else(|e| e.into_inner()) = credential;
            if let Err(e) = saved {
                warn!(present, error = %e, "Credential updated but not saved");
                return Err(e);
            }
        } else {
            *self.credential.write().unwrap_or_else(|e| e.into_inner()) = credential;
        }

        info!(present, "Credential updated");
        Ok(())
    }

    pub fn clear_credential(&self) -> Result<(), StoreError> {
        self.set_credential("")
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::new(None)
    }
}

fn normalize(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
