use std::collections::BTreeMap;

use super::dto::{FaceSearchDto, UploadedPhotoDto};
use super::transport::{Api, FilePart};
use crate::error::ApiError;
use crate::state::data::{FaceSearchResult, UploadedPhoto};

/// Optional knobs for a face search; the backend applies its own defaults
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SearchOptions {
    pub limit: Option<u32>,
    pub threshold: Option<f32>,
}

/// Photo upload and face search endpoints
#[derive(Clone)]
pub struct PhotoService {
    api: Api,
}

impl PhotoService {
    pub fn new(api: Api) -> Self {
        Self { api }
    }

    pub async fn upload(&self, event_id: i64, file: FilePart) -> Result<UploadedPhoto, ApiError> {
        let mut fields = BTreeMap::new();
        fields.insert("eventId".to_string(), event_id.to_string());

        let dto: UploadedPhotoDto = self.api.upload("/photos/upload", file, fields).await?;
        Ok(dto.into_domain())
    }

    pub async fn search_by_face(
        &self,
        event_id: i64,
        file: FilePart,
        options: SearchOptions,
    ) -> Result<FaceSearchResult, ApiError> {
        let mut fields = BTreeMap::new();
        fields.insert("eventId".to_string(), event_id.to_string());
        if let Some(limit) = options.limit {
            fields.insert("limit".to_string(), limit.to_string());
        }
        if let Some(threshold) = options.threshold {
            fields.insert("threshold".to_string(), threshold.to_string());
        }

        let dto: FaceSearchDto = self
            .api
            .upload("/photos/search-by-face", file, fields)
            .await?;
        Ok(dto.into_domain())
    }
}
