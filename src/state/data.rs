/// Shared data structures for the application state
///
/// These structs are the canonical domain model. Wire payloads are
/// normalized into them in `api::dto` before anything else sees them.
use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Lifecycle stage of an event as reported by the backend
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Upcoming,
    Ongoing,
    Completed,
}

/// An event as shown in the paginated list
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub cover_image_url: String,
    pub date: Option<NaiveDate>,
    pub location: Option<String>,
    pub photo_count: u32,
    pub category: Option<String>,
    pub status: Option<EventStatus>,
}

/// A gallery as shown in the paginated list
#[derive(Debug, Clone, PartialEq)]
pub struct Gallery {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub cover_image_url: String,
    pub date: Option<NaiveDate>,
    pub location: Option<String>,
    pub photo_count: u32,
    pub category: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventDetail {
    pub event: Event,
    pub photos: Vec<Photo>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GalleryDetail {
    pub gallery: Gallery,
    pub photos: Vec<Photo>,
}

/// A single photo inside an event or gallery
#[derive(Debug, Clone, PartialEq)]
pub struct Photo {
    pub id: i64,
    pub url: String,
    pub thumbnail_url: Option<String>,
    /// Display name, e.g. "DSC_0001.jpg"
    pub file_name: String,
    /// Race bib printed on the subject, events only
    pub bib_number: Option<String>,
    pub captured_at: Option<NaiveDateTime>,
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl Photo {
    /// Case-insensitive match on file name and serialized metadata.
    /// `needle` must already be lowercase.
    pub fn matches(&self, needle: &str) -> bool {
        if self.file_name.to_lowercase().contains(needle) {
            return true;
        }
        if self.metadata.is_empty() {
            return false;
        }
        serde_json::to_string(&self.metadata)
            .map(|json| json.to_lowercase().contains(needle))
            .unwrap_or(false)
    }
}

/// Photo metadata returned by an upload or the per-event photo listing
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedPhoto {
    pub id: i64,
    pub file_name: String,
    pub storage_path: String,
    pub file_size: Option<u64>,
    pub face_count: u32,
    pub uploaded_at: Option<NaiveDateTime>,
}

/// Face bounding box in source-image pixels
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceLocation {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// One candidate photo returned by a face search
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoMatch {
    pub photo_id: i64,
    pub photo_url: String,
    pub thumbnail_url: Option<String>,
    /// Backend confidence in 0..=1
    pub similarity: f32,
    pub face_location: Option<FaceLocation>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FaceSearchResult {
    pub matches: Vec<PhotoMatch>,
    pub total_matches: u32,
}

/// One page of a paginated list response
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_pages: u32,
    pub total_items: u64,
    pub current_page: u32,
    pub page_size: Option<u32>,
}

/// The authenticated user, persisted until logout
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    #[serde(rename = "type", default)]
    pub token_type: String,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessType {
    Public,
    Private,
    PasswordProtected,
}

/// Body of an event create/update request
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub event_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub slug: String,
    pub access_type: AccessType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,
}

/// Event as returned by the create/update endpoints
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub event_date: Option<NaiveDate>,
    pub published: bool,
    pub photo_count: u32,
}

/// Backend or face-service health check result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceStatus {
    Checking,
    Healthy,
    Unhealthy(String),
}
