use std::sync::Arc;

use tracing::{error, info};

use super::transport::Api;
use crate::error::{ApiError, StorageError};
use crate::state::data::{Credentials, Session};
use crate::state::session::SessionStore;

/// Login/logout on top of the shared session store
#[derive(Clone)]
pub struct AuthService {
    api: Api,
    session: Arc<SessionStore>,
}

impl AuthService {
    pub fn new(api: Api, session: Arc<SessionStore>) -> Self {
        Self { api, session }
    }

    /// Authenticate and persist the returned session.
    ///
    /// When storage fails the session stays active and is published, but
    /// it will not survive a restart.
    pub async fn login(&self, credentials: &Credentials) -> Result<Session, ApiError> {
        let session: Session = self.api.post("/auth/login", credentials).await?;
        if let Err(e) = self.session.set(session.clone()) {
            error!("Could not persist session: {e}");
        }
        info!("🔐 Logged in as {}", session.username);
        Ok(session)
    }

    pub fn logout(&self) -> Result<(), StorageError> {
        self.session.clear()?;
        info!("Logged out");
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn token(&self) -> Option<String> {
        self.session.token()
    }

    pub fn current_user(&self) -> Option<Session> {
        self.session.get()
    }
}
