//! Credential Cache
//!
//! Single-slot cache for the most recently issued credential.

use std::sync::Mutex;

use crate::types::Credential;

/// Holds at most one credential that has not been rejected yet.
///
/// A credential leaves the cache when it expires or when a caller reports
/// that the target rejected it. Once invalidated it is never handed out again.
pub struct CredentialCache {
    slot: Mutex<Option<Credential>>,
}

impl CredentialCache {
    /// Create empty cache.
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Cached credential, if present and unexpired.
    pub fn get(&self) -> Option<Credential> {
        let mut slot = self.slot.lock().unwrap();
        match slot.as_ref() {
            Some(credential) if credential.is_expired() => {
                *slot = None;
                None
            }
            other => other.cloned(),
        }
    }

    /// Replace the cached credential.
    pub fn store(&self, credential: Credential) {
        *self.slot.lock().unwrap() = Some(credential);
    }

    /// Drop `credential` if it is still the cached one.
    ///
    /// Returns `true` if the slot was cleared. A newer credential stored by
    /// another run is left in place.
    pub fn invalidate(&self, credential: &Credential) -> bool {
        let mut slot = self.slot.lock().unwrap();
        match slot.as_ref() {
            Some(cached) if cached.same_token(credential) => {
                *slot = None;
                true
            }
            _ => false,
        }
    }

    /// Empty the cache.
    pub fn clear(&self) {
        *self.slot.lock().unwrap() = None;
    }

    pub fn is_empty(&self) -> bool {
        self.slot.lock().unwrap().is_none()
    }
}

impl Default for CredentialCache {
    fn default() -> Self {
        Self::new()
    }
}
