use tracing::warn;

use super::dto::HealthDto;
use super::transport::Api;
use crate::state::data::ServiceStatus;

/// Connectivity checks for the backend and the face service behind it
#[derive(Clone)]
pub struct HealthService {
    api: Api,
}

impl HealthService {
    pub fn new(api: Api) -> Self {
        Self { api }
    }

    pub async fn backend(&self) -> ServiceStatus {
        self.check("/health").await
    }

    pub async fn face_service(&self) -> ServiceStatus {
        self.check("/health/face-service").await
    }

    async fn check(&self, path: &str) -> ServiceStatus {
        match self.api.get::<HealthDto>(path, &[]).await {
            Ok(dto) if dto.status == "UP" && dto.connected != Some(false) => ServiceStatus::Healthy,
            Ok(dto) => ServiceStatus::Unhealthy(
                dto.error
                    .unwrap_or_else(|| format!("status {}", dto.status)),
            ),
            Err(e) => {
                warn!("Health check {path} failed: {e}");
                ServiceStatus::Unhealthy(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::test_support::FakeTransport;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_check_outcomes() {
        let fake = Arc::new(FakeTransport::new());
        let health = HealthService::new(Api::new(fake.clone()));
        fake.push_ok(json!({"status": "UP", "service": "ifoto-backend", "timestamp": 1}));
        fake.push_ok(json!({"status": "DOWN", "error": "Connection refused", "connected": false}));
        fake.push_err(ApiError::Network("unreachable".to_string()));

        assert_eq!(health.backend().await, ServiceStatus::Healthy);
        assert_eq!(
            health.face_service().await,
            ServiceStatus::Unhealthy("Connection refused".to_string())
        );
        assert!(matches!(health.backend().await, ServiceStatus::Unhealthy(_)));

        let requests = fake.requests();
        assert_eq!(requests[0].path, "/health");
        assert_eq!(requests[1].path, "/health/face-service");
    }
}
