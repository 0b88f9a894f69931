use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use super::data::Session;
use super::storage::{KeyValueStore, SqliteStore};
use crate::error::StorageError;

pub const TOKEN_KEY: &str = "ifoto_token";
pub const USER_KEY: &str = "ifoto_user";

/// Holds the authenticated user and mirrors it into durable storage.
///
/// The in-memory session is authoritative. Every `set`/`clear` publishes
/// once on the watch channel, even when persisting fails. Token and user
/// are written and removed together.
pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
    current: watch::Sender<Option<Session>>,
}

impl SessionStore {
    /// Restore whatever session the storage holds
    pub fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let restored = match storage.get(USER_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<Session>(&json) {
                Ok(session) => {
                    info!("Restored session for {}", session.username);
                    Some(session)
                }
                Err(e) => {
                    warn!("Ignoring corrupt stored session: {e}");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("Could not read stored session: {e}");
                None
            }
        };

        let (current, _) = watch::channel(restored);
        Self { storage, current }
    }

    pub fn in_memory() -> Result<Self, StorageError> {
        Ok(Self::load(Arc::new(SqliteStore::in_memory()?)))
    }

    pub fn get(&self) -> Option<Session> {
        self.current.borrow().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.current.borrow().as_ref().map(|session| session.token.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Publish `session`, then persist it. An `Err` means it is active but
    /// will not survive a restart.
    pub fn set(&self, session: Session) -> Result<(), StorageError> {
        let persisted = serde_json::to_string(&session)
            .map_err(StorageError::from)
            .and_then(|user| {
                self.storage
                    .set_many(&[(TOKEN_KEY, session.token.as_str()), (USER_KEY, user.as_str())])
            });
        self.current.send_replace(Some(session));
        persisted
    }

    /// Drop the session, then remove it from storage
    pub fn clear(&self) -> Result<(), StorageError> {
        self.current.send_replace(None);
        self.storage.remove_many(&[TOKEN_KEY, USER_KEY])
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.current.subscribe()
    }
}
