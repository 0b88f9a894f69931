use super::dto::{GalleryDetailDto, GalleryDto, PageDto};
use super::transport::Api;
use crate::error::ApiError;
use crate::state::data::{Gallery, GalleryDetail, Page};

/// Galleries endpoints
#[derive(Clone)]
pub struct GalleryService {
    api: Api,
}

impl GalleryService {
    pub fn new(api: Api) -> Self {
        Self { api }
    }

    pub async fn list(&self, page: u32, page_size: u32) -> Result<Page<Gallery>, ApiError> {
        let dto: PageDto<GalleryDto> = self
            .api
            .get(
                "/galleries",
                &[("page", page.to_string()), ("pageSize", page_size.to_string())],
            )
            .await?;
        Ok(dto.into_domain(GalleryDto::into_domain))
    }

    pub async fn get(&self, id: i64) -> Result<GalleryDetail, ApiError> {
        let dto: GalleryDetailDto = self.api.get(&format!("/galleries/{id}"), &[]).await?;
        Ok(dto.into_domain())
    }

    pub async fn search(&self, query: &str, page: u32) -> Result<Page<Gallery>, ApiError> {
        let dto: PageDto<GalleryDto> = self
            .api
            .get(
                "/galleries/search",
                &[("query", query.to_string()), ("page", page.to_string())],
            )
            .await?;
        Ok(dto.into_domain(GalleryDto::into_domain))
    }
}
