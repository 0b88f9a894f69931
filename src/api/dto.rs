//! Wire payloads and their normalization into the domain model.
//!
//! The backend still emits legacy aliases on photos (`title` for
//! `fileName`, `takenAt` for `capturedAt`). They are accepted here and
//! collapsed to a single canonical field by `into_domain`; nothing past this
//! module sees them.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;

use crate::state::data::{
    Event, EventDetail, EventRecord, EventStatus, FaceLocation, FaceSearchResult, Gallery,
    GalleryDetail, Page, Photo, PhotoMatch, UploadedPhoto,
};

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase", bound(deserialize = "T: Deserialize<'de>"))]
pub struct PageDto<T> {
    #[serde(default)]
    pub items: Vec<T>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_items: u64,
    #[serde(default = "first_page")]
    pub current_page: u32,
    pub page_size: Option<u32>,
}

fn first_page() -> u32 {
    1
}

impl<T> PageDto<T> {
    pub fn into_domain<U>(self, convert: impl Fn(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(convert).collect(),
            total_pages: self.total_pages,
            total_items: self.total_items,
            current_page: self.current_page.max(1),
            page_size: self.page_size,
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct EventDto {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub cover_image_url: String,
    pub event_date: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub photo_count: u32,
    pub category: Option<String>,
    pub status: Option<EventStatus>,
}

impl EventDto {
    pub fn into_domain(self) -> Event {
        Event {
            id: self.id,
            title: self.title,
            description: self.description,
            cover_image_url: self.cover_image_url,
            date: self.event_date.as_deref().and_then(parse_date),
            location: self.location,
            photo_count: self.photo_count,
            category: self.category,
            status: self.status,
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct EventDetailDto {
    #[serde(flatten)]
    pub event: EventDto,
    #[serde(default)]
    pub photos: Vec<PhotoDto>,
}

impl EventDetailDto {
    pub fn into_domain(self) -> EventDetail {
        EventDetail {
            event: self.event.into_domain(),
            photos: self.photos.into_iter().map(PhotoDto::into_domain).collect(),
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GalleryDto {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub cover_image_url: String,
    pub event_date: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub photo_count: u32,
    pub category: Option<String>,
    pub created_at: Option<String>,
}

impl GalleryDto {
    pub fn into_domain(self) -> Gallery {
        Gallery {
            id: self.id,
            title: self.title,
            description: self.description,
            cover_image_url: self.cover_image_url,
            date: self.event_date.as_deref().and_then(parse_date),
            location: self.location,
            photo_count: self.photo_count,
            category: self.category,
            created_at: self.created_at.as_deref().and_then(parse_timestamp),
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct GalleryDetailDto {
    #[serde(flatten)]
    pub gallery: GalleryDto,
    #[serde(default)]
    pub photos: Vec<PhotoDto>,
}

impl GalleryDetailDto {
    pub fn into_domain(self) -> GalleryDetail {
        GalleryDetail {
            gallery: self.gallery.into_domain(),
            photos: self.photos.into_iter().map(PhotoDto::into_domain).collect(),
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PhotoDto {
    pub id: i64,
    #[serde(default)]
    pub url: String,
    pub thumbnail_url: Option<String>,
    pub file_name: Option<String>,
    /// legacy alias of `file_name`
    pub title: Option<String>,
    pub bib_number: Option<String>,
    pub captured_at: Option<String>,
    /// legacy alias of `captured_at`
    pub taken_at: Option<String>,
    #[serde(default)]
    pub metadata: Option<BTreeMap<String, serde_json::Value>>,
}

impl PhotoDto {
    pub fn into_domain(self) -> Photo {
        let file_name = self
            .file_name
            .filter(|name| !name.is_empty())
            .or(self.title.filter(|title| !title.is_empty()))
            .unwrap_or_else(|| file_name_from_url(&self.url));
        let captured_at = self
            .captured_at
            .or(self.taken_at)
            .as_deref()
            .and_then(parse_timestamp);

        Photo {
            id: self.id,
            url: self.url,
            thumbnail_url: self.thumbnail_url,
            file_name,
            bib_number: self.bib_number,
            captured_at,
            metadata: self.metadata.unwrap_or_default(),
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UploadedPhotoDto {
    pub id: i64,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub storage_path: String,
    pub file_size: Option<u64>,
    #[serde(default)]
    pub face_count: u32,
    pub uploaded_at: Option<String>,
}

impl UploadedPhotoDto {
    pub fn into_domain(self) -> UploadedPhoto {
        UploadedPhoto {
            id: self.id,
            file_name: self.file_name,
            storage_path: self.storage_path,
            file_size: self.file_size,
            face_count: self.face_count,
            uploaded_at: self.uploaded_at.as_deref().and_then(parse_timestamp),
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PhotoMatchDto {
    pub photo_id: i64,
    #[serde(default)]
    pub photo_url: String,
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub similarity: f32,
    pub face_location: Option<FaceLocation>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FaceSearchDto {
    #[serde(default)]
    pub matches: Vec<PhotoMatchDto>,
    pub total_matches: Option<u32>,
}

impl FaceSearchDto {
    pub fn into_domain(self) -> FaceSearchResult {
        let matches: Vec<PhotoMatch> = self
            .matches
            .into_iter()
            .map(|m| PhotoMatch {
                photo_id: m.photo_id,
                photo_url: m.photo_url,
                thumbnail_url: m.thumbnail_url,
                similarity: m.similarity.clamp(0.0, 1.0),
                face_location: m.face_location,
            })
            .collect();
        let total_matches = self.total_matches.unwrap_or(matches.len() as u32);
        FaceSearchResult {
            matches,
            total_matches,
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct EventRecordDto {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    pub event_date: Option<String>,
    pub published: Option<bool>,
    pub photo_count: Option<u32>,
}

impl EventRecordDto {
    pub fn into_domain(self) -> EventRecord {
        EventRecord {
            id: self.id,
            name: self.name,
            slug: self.slug,
            event_date: self.event_date.as_deref().and_then(parse_date),
            published: self.published.unwrap_or(false),
            photo_count: self.photo_count.unwrap_or(0),
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct HealthDto {
    #[serde(default)]
    pub status: String,
    pub connected: Option<bool>,
    pub error: Option<String>,
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_timestamp(raw).map(|ts| ts.date()))
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.naive_utc())
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok())
        .or_else(|| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").ok())
}

fn file_name_from_url(url: &str) -> String {
    url.split(['?', '#'])
        .next()
        .unwrap_or_default()
        .rsplit('/')
        .find(|segment| !segment.is_empty())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn photo(value: serde_json::Value) -> Photo {
        serde_json::from_value::<PhotoDto>(value).unwrap().into_domain()
    }

    #[test]
    fn test_canonical_fields_win_over_aliases() {
        let p = photo(json!({
            "id": 1,
            "url": "https://cdn.ifoto.ir/e/1/a.jpg",
            "fileName": "a.jpg",
            "title": "legacy title",
            "capturedAt": "2024-05-01T08:30:00",
            "takenAt": "2020-01-01T00:00:00"
        }));
        assert_eq!(p.file_name, "a.jpg");
        assert_eq!(
            p.captured_at,
            NaiveDateTime::parse_from_str("2024-05-01T08:30:00", "%Y-%m-%dT%H:%M:%S").ok()
        );
    }

    #[test]
    fn test_aliases_fill_missing_fields() {
        let p = photo(json!({
            "id": 2,
            "url": "https://cdn.ifoto.ir/e/1/b.jpg",
            "title": "Start line",
            "takenAt": "2024-05-01T08:30:00Z"
        }));
        assert_eq!(p.file_name, "Start line");
        assert!(p.captured_at.is_some());
    }

    #[test]
    fn test_file_name_falls_back_to_url() {
        let p = photo(json!({
            "id": 3,
            "url": "https://cdn.ifoto.ir/e/1/IMG_0042.jpg?sig=abc",
            "capturedAt": "yesterday"
        }));
        assert_eq!(p.file_name, "IMG_0042.jpg");
        assert_eq!(p.captured_at, None);
        assert!(p.metadata.is_empty());
    }

    #[test]
    fn test_event_detail_flattens_event_fields() {
        let dto: EventDetailDto = serde_json::from_value(json!({
            "id": 42,
            "title": "Tehran Marathon",
            "coverImageUrl": "https://cdn.ifoto.ir/cover.jpg",
            "eventDate": "2024-05-01",
            "photoCount": 2,
            "status": "completed",
            "photos": [
                {"id": 1, "url": "u1", "fileName": "1.jpg", "bibNumber": "1203"},
                {"id": 2, "url": "u2", "fileName": "2.jpg"}
            ]
        }))
        .unwrap();

        let detail = dto.into_domain();
        assert_eq!(detail.event.id, 42);
        assert_eq!(detail.event.status, Some(EventStatus::Completed));
        assert_eq!(detail.event.date, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(detail.photos.len(), 2);
        assert_eq!(detail.photos[0].bib_number.as_deref(), Some("1203"));
    }

    #[test]
    fn test_face_search_total_defaults_to_match_count() {
        let dto: FaceSearchDto = serde_json::from_value(json!({
            "matches": [
                {"photoId": 1, "photoUrl": "u", "similarity": 0.91,
                 "faceLocation": {"x": 10, "y": 20, "width": 30, "height": 40}}
            ]
        }))
        .unwrap();

        let result = dto.into_domain();
        assert_eq!(result.total_matches, 1);
        assert_eq!(
            result.matches[0].face_location,
            Some(FaceLocation { x: 10, y: 20, width: 30, height: 40 })
        );
    }

    #[test]
    fn test_event_page_deserializes() {
        let dto: PageDto<EventDto> = serde_json::from_value(json!({
            "items": [
                {"id": 1, "title": "Tehran Marathon", "photoCount": 120},
                {"id": 2, "title": "Shiraz 10K"}
            ],
            "totalPages": 3,
            "totalItems": 26,
            "currentPage": 2,
            "pageSize": 12
        }))
        .unwrap();

        let page = dto.into_domain(EventDto::into_domain);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].photo_count, 120);
        assert_eq!((page.total_pages, page.total_items, page.current_page), (3, 26, 2));
    }

    #[test]
    fn test_gallery_page_without_items_is_empty() {
        let dto: PageDto<GalleryDto> = serde_json::from_value(json!({"totalPages": 0})).unwrap();

        let page = dto.into_domain(GalleryDto::into_domain);
        assert!(page.items.is_empty());
        assert_eq!(page.current_page, 1);
    }
}
