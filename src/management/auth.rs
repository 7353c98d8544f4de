use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, PoisonError, RwLock},
};

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::types::Credentials;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    NotFound(String),
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialError::NotFound(user_id) => {
                write!(f, "no credentials registered for user {}", user_id)
            }
        }
    }
}

impl std::error::Error for CredentialError {}

struct Entry {
    credentials: Credentials,
    refresh_gate: Arc<Mutex<()>>,
}

/// Holds the OAuth credentials of every user that was constructed with a
/// credentials block, keyed by user id.
///
/// Create one store when the application starts and share it (behind an
/// `Arc`) with every [`Client`](crate::spotify::Client). Entries are never
/// evicted.
///
/// Reads hand out clones of the stored record. Each entry carries its own
/// async refresh gate so that token refreshes for one user are serialized
/// while other users proceed independently.
#[derive(Default)]
pub struct CredentialStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers or replaces the credentials of `user_id`.
    ///
    /// Replacing keeps the existing refresh gate, so a refresh already in
    /// progress still serializes against later ones.
    pub fn set(&self, user_id: &str, credentials: Credentials) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        match entries.get_mut(user_id) {
            Some(entry) => entry.credentials = credentials,
            None => {
                entries.insert(
                    user_id.to_string(),
                    Entry {
                        credentials,
                        refresh_gate: Arc::new(Mutex::new(())),
                    },
                );
            }
        }
    }

    pub fn get(&self, user_id: &str) -> Result<Credentials, CredentialError> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(user_id)
            .map(|entry| entry.credentials.clone())
            .ok_or_else(|| CredentialError::NotFound(user_id.to_string()))
    }

    pub fn update_access_token(
        &self,
        user_id: &str,
        access_token: String,
    ) -> Result<(), CredentialError> {
        self.modify(user_id, |credentials| credentials.access_token = access_token)
    }

    /// Stores a freshly issued access token together with its expiry in one write.
    ///
    /// `expires_at` replaces the previous expiry; `None` means the expiry of
    /// the new token is unknown. The refresh token is left as is.
    pub fn record_refresh(
        &self,
        user_id: &str,
        access_token: String,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<(), CredentialError> {
        self.modify(user_id, |credentials| {
            credentials.access_token = access_token;
            credentials.expires_at = expires_at;
        })
    }

    /// Lock that must be held while exchanging the refresh token of `user_id`.
    pub fn refresh_gate(&self, user_id: &str) -> Result<Arc<Mutex<()>>, CredentialError> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(user_id)
            .map(|entry| Arc::clone(&entry.refresh_gate))
            .ok_or_else(|| CredentialError::NotFound(user_id.to_string()))
    }

    pub fn contains(&self, user_id: &str) -> bool {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.contains_key(user_id)
    }

    pub fn len(&self) -> usize {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn modify(
        &self,
        user_id: &str,
        f: impl FnOnce(&mut Credentials),
    ) -> Result<(), CredentialError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let entry = entries
            .get_mut(user_id)
            .ok_or_else(|| CredentialError::NotFound(user_id.to_string()))?;
        f(&mut entry.credentials);
        Ok(())
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("CredentialStore")
            .field("users", &entries.keys().collect::<Vec<_>>())
            .finish()
    }
}
