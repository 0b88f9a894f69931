/// Remote API module
///
/// This module handles:
/// - The transport port and its reqwest adapter (transport.rs)
/// - Wire payloads and normalization (dto.rs)
/// - One typed service per backend area
pub mod auth;
pub mod dto;
pub mod events;
pub mod galleries;
pub mod health;
pub mod photos;
pub mod transport;

use std::sync::Arc;

use crate::state::session::SessionStore;
use auth::AuthService;
use events::EventService;
use galleries::GalleryService;
use health::HealthService;
use photos::PhotoService;
use transport::{Api, Transport};

/// Every service, bound to one transport
#[derive(Clone)]
pub struct Services {
    pub events: EventService,
    pub galleries: GalleryService,
    pub photos: PhotoService,
    pub auth: AuthService,
    pub health: HealthService,
}

impl Services {
    pub fn new(transport: Arc<dyn Transport>, session: Arc<SessionStore>) -> Self {
        let api = Api::new(transport);
        Self {
            events: EventService::new(api.clone()),
            galleries: GalleryService::new(api.clone()),
            photos: PhotoService::new(api.clone()),
            auth: AuthService::new(api.clone(), session),
            health: HealthService::new(api),
        }
    }
}
