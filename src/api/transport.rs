//! Transport port and its reqwest adapter.
//!
//! The adapter owns transport details only: URL joining, bearer token
//! propagation, multipart assembly and JSON decoding. There is no retry,
//! backoff or timeout policy; failures propagate as-is.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::ApiError;
use crate::state::session::SessionStore;

/// File content attached to a multipart upload
#[derive(Debug, Clone, PartialEq)]
pub struct FilePart {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Arc<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Multipart {
        file: FilePart,
        fields: BTreeMap<String, String>,
    },
}

/// A request relative to the configured base address
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }
}

/// Executes one request and yields the parsed JSON body
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> Result<Value, ApiError>;
}

/// Typed convenience layer over a shared transport
#[derive(Clone)]
pub struct Api {
    transport: Arc<dyn Transport>,
}

impl Api {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub async fn send<R: DeserializeOwned>(&self, request: ApiRequest) -> Result<R, ApiError> {
        let value = self.transport.execute(request).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn get<R: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<R, ApiError> {
        let mut request = ApiRequest::new(Method::GET, path);
        for (key, value) in query {
            request = request.query(key, value);
        }
        self.send(request).await
    }

    pub async fn post<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, ApiError> {
        let request =
            ApiRequest::new(Method::POST, path).body(RequestBody::Json(serde_json::to_value(body)?));
        self.send(request).await
    }

    pub async fn put<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, ApiError> {
        let request =
            ApiRequest::new(Method::PUT, path).body(RequestBody::Json(serde_json::to_value(body)?));
        self.send(request).await
    }

    pub async fn delete<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        self.send(ApiRequest::new(Method::DELETE, path)).await
    }

    /// Multipart POST with the file under `file` plus flat string fields
    pub async fn upload<R: DeserializeOwned>(
        &self,
        path: &str,
        file: FilePart,
        fields: BTreeMap<String, String>,
    ) -> Result<R, ApiError> {
        let request =
            ApiRequest::new(Method::POST, path).body(RequestBody::Multipart { file, fields });
        self.send(request).await
    }
}

/// Reqwest-backed transport against one base address
pub struct HttpTransport {
    client: Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl HttpTransport {
    pub fn new(base_url: &str, session: Arc<SessionStore>) -> Result<Self, ApiError> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Fetch an absolute resource URL, e.g. a photo for the viewer
    pub async fn download(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let url = self.url(&request.path);
        debug!(method = %request.method, %url, "sending request");

        let mut builder = self.client.request(request.method, url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = self.session.token() {
            builder = builder.bearer_auth(token);
        }

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart { file, fields } => {
                let part = Part::bytes(file.bytes.as_ref().clone())
                    .file_name(file.file_name)
                    .mime_str(&file.mime_type)?;
                let form = fields
                    .into_iter()
                    .fold(Form::new().part("file", part), |form, (key, value)| {
                        form.text(key, value)
                    });
                builder.multipart(form)
            }
        };

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            debug!(status = status.as_u16(), "request failed");
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::Session;
    use crate::test_support::{serve_once, FakeTransport};
    use serde_json::json;

    #[tokio::test]
    async fn test_api_helpers_shape_requests() {
        let fake = Arc::new(FakeTransport::new());
        fake.push_ok(json!({"ok": true}));
        fake.push_ok(json!({"ok": true}));
        fake.push_ok(Value::Null);
        let api = Api::new(fake.clone());

        let _: Value = api
            .get("/events", &[("page", "2".to_string())])
            .await
            .unwrap();
        let _: Value = api.put("/events/7", &json!({"name": "x"})).await.unwrap();
        let _: Option<Value> = api.delete("/events/7").await.unwrap();

        let requests = fake.requests();
        assert_eq!(requests[0].method, Method::GET);
        assert_eq!(requests[0].query, vec![("page".to_string(), "2".to_string())]);
        assert_eq!(requests[1].method, Method::PUT);
        assert_eq!(requests[1].body, RequestBody::Json(json!({"name": "x"})));
        assert_eq!(requests[2].method, Method::DELETE);
        assert_eq!(requests[2].path, "/events/7");
    }

    #[tokio::test]
    async fn test_decode_failure_is_reported() {
        let fake = Arc::new(FakeTransport::new());
        fake.push_ok(json!({"unexpected": 1}));
        let api = Api::new(fake);

        let result: Result<Session, ApiError> = api.get("/whatever", &[]).await;
        assert!(matches!(result, Err(ApiError::Decode(_))));
    }

    #[tokio::test]
    async fn test_http_transport_sends_token_and_query() {
        let (base_url, request) = serve_once(200, r#"{"items":[]}"#).await;
        let session = Arc::new(SessionStore::in_memory().unwrap());
        session
            .set(Session {
                token: "abc123".to_string(),
                token_type: "Bearer".to_string(),
                username: "sara".to_string(),
                email: String::new(),
                role: String::new(),
            })
            .unwrap();

        let transport = HttpTransport::new(&base_url, session).unwrap();
        let value = transport
            .execute(ApiRequest::new(Method::GET, "/events").query("page", 1))
            .await
            .unwrap();

        assert_eq!(value, json!({"items": []}));
        let raw = request.await.unwrap().to_lowercase();
        assert!(raw.starts_with("get /events?page=1 http/1.1"));
        assert!(raw.contains("authorization: bearer abc123"));
    }

    #[tokio::test]
    async fn test_http_transport_propagates_status_body() {
        let (base_url, request) = serve_once(400, r#"{"error":"No face detected"}"#).await;
        let session = Arc::new(SessionStore::in_memory().unwrap());
        let transport = HttpTransport::new(&base_url, session).unwrap();

        let file = FilePart {
            file_name: "me.jpg".to_string(),
            mime_type: "image/jpeg".to_string(),
            bytes: Arc::new(vec![0xFF, 0xD8, 0xFF, 0xD9]),
        };
        let mut fields = BTreeMap::new();
        fields.insert("eventId".to_string(), "42".to_string());
        let err = transport
            .execute(
                ApiRequest::new(Method::POST, "photos/search-by-face")
                    .body(RequestBody::Multipart { file, fields }),
            )
            .await
            .unwrap_err();

        assert_eq!(err.body(), r#"{"error":"No face detected"}"#);
        assert!(err.is_no_face_detected());

        let raw = request.await.unwrap();
        assert!(raw.starts_with("POST /photos/search-by-face HTTP/1.1"));
        assert!(!raw.to_lowercase().contains("authorization:"));
        assert!(raw.contains("name=\"eventId\""));
        assert!(raw.contains("filename=\"me.jpg\""));
    }

    #[tokio::test]
    async fn test_empty_body_is_null() {
        let (base_url, _request) = serve_once(204, "").await;
        let session = Arc::new(SessionStore::in_memory().unwrap());
        let transport = HttpTransport::new(&base_url, session).unwrap();

        let value = transport
            .execute(ApiRequest::new(Method::DELETE, "/events/3"))
            .await
            .unwrap();
        assert_eq!(value, Value::Null);
    }
}
