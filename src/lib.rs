//! iFoto desktop client: browse event photos and find yourself in them by face.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod images;
pub mod messages;
pub mod state;
pub mod ui;

#[cfg(test)]
mod test_support;
