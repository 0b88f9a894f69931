/// State management module
///
/// This module handles all application state, including:
/// - Shared data structures (data.rs)
/// - Durable key-value storage and the session store (storage.rs, session.rs)
/// - Stale-response tickets (lifetime.rs)
/// - Pagination and lightbox navigation
/// - Per-screen state machines: list/detail views, face search, upload queue
pub mod browse;
pub mod data;
pub mod face_search;
pub mod lifetime;
pub mod lightbox;
pub mod pagination;
pub mod selection;
pub mod session;
pub mod storage;
pub mod upload;
