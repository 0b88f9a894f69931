use super::dto::{EventDetailDto, EventDto, EventRecordDto, PageDto, UploadedPhotoDto};
use super::transport::Api;
use crate::error::ApiError;
use crate::state::data::{Event, EventDetail, EventDraft, EventRecord, Page, UploadedPhoto};

/// Events endpoints
#[derive(Clone)]
pub struct EventService {
    api: Api,
}

impl EventService {
    pub fn new(api: Api) -> Self {
        Self { api }
    }

    pub async fn list(&self, page: u32, page_size: u32) -> Result<Page<Event>, ApiError> {
        let dto: PageDto<EventDto> = self
            .api
            .get(
                "/events",
                &[("page", page.to_string()), ("pageSize", page_size.to_string())],
            )
            .await?;
        Ok(dto.into_domain(EventDto::into_domain))
    }

    pub async fn get(&self, id: i64) -> Result<EventDetail, ApiError> {
        let dto: EventDetailDto = self.api.get(&format!("/events/{id}"), &[]).await?;
        Ok(dto.into_domain())
    }

    pub async fn search(&self, query: &str, page: u32) -> Result<Page<Event>, ApiError> {
        let dto: PageDto<EventDto> = self
            .api
            .get(
                "/events/search",
                &[("query", query.to_string()), ("page", page.to_string())],
            )
            .await?;
        Ok(dto.into_domain(EventDto::into_domain))
    }

    /// Photos uploaded to an event, newest first as the backend orders them
    pub async fn photos(&self, event_id: i64) -> Result<Vec<UploadedPhoto>, ApiError> {
        let dtos: Vec<UploadedPhotoDto> =
            self.api.get(&format!("/photos/events/{event_id}"), &[]).await?;
        Ok(dtos.into_iter().map(UploadedPhotoDto::into_domain).collect())
    }

    pub async fn create(&self, draft: &EventDraft) -> Result<EventRecord, ApiError> {
        let dto: EventRecordDto = self.api.post("/events", draft).await?;
        Ok(dto.into_domain())
    }

    pub async fn update(&self, id: i64, draft: &EventDraft) -> Result<EventRecord, ApiError> {
        let dto: EventRecordDto = self.api.put(&format!("/events/{id}"), draft).await?;
        Ok(dto.into_domain())
    }
}
