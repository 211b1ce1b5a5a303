//! Eagle API client for importing images by URL.
//!
//! One request per item, no retries. Every failure is reported as `false`
//! to the caller and logged with the reason.

mod request;
mod response;

pub use request::{merge_tags, AddFromUrlRequest};
pub use response::{interpret, snippet, ImportOutcome};

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::CatalogConfig;
use crate::harvest::Importer;

/// Path of the add-from-URL endpoint, relative to the API base.
pub const ADD_FROM_URL_PATH: &str = "/api/item/addFromURL";

const USER_AGENT: &str = concat!("pinharvest/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to create HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Client for the Eagle add-from-URL API.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: Client,
    endpoint: String,
    token: Option<String>,
    folder_id: Option<String>,
    tags: Vec<String>,
}

impl CatalogClient {
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}{}",
                config.base_url.trim_end_matches('/'),
                ADD_FROM_URL_PATH
            ),
            token: config.token.clone(),
            folder_id: config.folder_id.clone(),
            tags: config.tags.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Build the request body for one image.
    pub fn build_request(
        &self,
        image_url: &str,
        display_name: &str,
        source_website: &str,
        extra_tags: &[String],
    ) -> AddFromUrlRequest {
        AddFromUrlRequest::new(
            image_url,
            display_name,
            source_website,
            merge_tags(extra_tags, &self.tags),
            self.folder_id.as_deref(),
            self.token.as_deref(),
        )
    }

    /// Send one request and classify the result. Never returns an error.
    pub async fn add_from_url(&self, request: &AddFromUrlRequest) -> ImportOutcome {
        let response = match self.client.post(&self.endpoint).json(request).send().await {
            Ok(r) => r,
            Err(e) if e.is_timeout() => {
                return ImportOutcome::Transport(format!("timed out: {}", e))
            }
            Err(e) => return ImportOutcome::Transport(e.to_string()),
        };

        let status = response.status().as_u16();
        match response.text().await {
            Ok(body) => interpret(status, &body),
            Err(e) if status != 200 => ImportOutcome::HttpStatus {
                status,
                body: format!("<unreadable body: {}>", e),
            },
            Err(e) => ImportOutcome::Transport(e.to_string()),
        }
    }

    /// Import one image. `true` only when Eagle confirms success.
    pub async fn import_item(
        &self,
        image_url: &str,
        display_name: &str,
        source_website: &str,
        extra_tags: &[String],
    ) -> bool {
        let request = self.build_request(image_url, display_name, source_website, extra_tags);
        let outcome = self.add_from_url(&request).await;
        if outcome.is_imported() {
            debug!("Eagle accepted {}", display_name);
            true
        } else {
            warn!("[Eagle] {} ({})", outcome, display_name);
            false
        }
    }
}

#[async_trait]
impl Importer for CatalogClient {
    async fn import_item(
        &self,
        image_url: &str,
        display_name: &str,
        source_website: &str,
        extra_tags: &[String],
    ) -> bool {
        CatalogClient::import_item(self, image_url, display_name, source_website, extra_tags)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    #[derive(Clone)]
    struct FakeEagle {
        received: Arc<Mutex<Vec<Value>>>,
        status: StatusCode,
        body: &'static str,
        delay: Duration,
    }

    async fn add_from_url(
        State(eagle): State<FakeEagle>,
        Json(body): Json<Value>,
    ) -> (StatusCode, String) {
        eagle.received.lock().unwrap().push(body);
        tokio::time::sleep(eagle.delay).await;
        (eagle.status, eagle.body.to_string())
    }

    async fn spawn_eagle(
        status: StatusCode,
        body: &'static str,
        delay: Duration,
    ) -> (String, Arc<Mutex<Vec<Value>>>) {
        let received = Arc::new(Mutex::new(Vec::new()));
        let state = FakeEagle {
            received: received.clone(),
            status,
            body,
            delay,
        };
        let app = Router::new()
            .route(ADD_FROM_URL_PATH, post(add_from_url))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}", addr), received)
    }

    fn client(base_url: &str, timeout: Duration) -> CatalogClient {
        CatalogClient::new(&CatalogConfig {
            base_url: base_url.to_string(),
            token: Some("abc".to_string()),
            folder_id: None,
            tags: vec!["pinterest".to_string()],
            timeout,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_import_success_sends_expected_body() {
        let (base, received) =
            spawn_eagle(StatusCode::OK, r#"{"status":"success"}"#, Duration::ZERO).await;
        let eagle = client(&base, Duration::from_secs(5));

        let ok = eagle
            .import_item(
                "https://i.pinimg.com/236x/a.jpg",
                "pinterest_cats_1",
                "https://www.pinterest.com/pin/1/",
                &["cats".to_string()],
            )
            .await;
        assert!(ok);

        let bodies = received.lock().unwrap().clone();
        assert_eq!(
            bodies,
            vec![json!({
                "url": "https://i.pinimg.com/236x/a.jpg",
                "name": "pinterest_cats_1",
                "website": "https://www.pinterest.com/pin/1/",
                "tags": ["cats", "pinterest"],
                "token": "abc",
            })]
        );
    }

    #[tokio::test]
    async fn test_business_error_reports_failure() {
        let (base, _) = spawn_eagle(
            StatusCode::OK,
            r#"{"status":"error","msg":"x"}"#,
            Duration::ZERO,
        )
        .await;
        let eagle = client(&base, Duration::from_secs(5));

        assert!(!eagle.import_item("u", "n", "w", &[]).await);
    }

    #[tokio::test]
    async fn test_http_503_reports_failure() {
        let (base, _) = spawn_eagle(
            StatusCode::SERVICE_UNAVAILABLE,
            r#"{"status":"success"}"#,
            Duration::ZERO,
        )
        .await;
        let eagle = client(&base, Duration::from_secs(5));

        let request = eagle.build_request("u", "n", "w", &[]);
        let outcome = eagle.add_from_url(&request).await;
        assert!(matches!(outcome, ImportOutcome::HttpStatus { status: 503, .. }));
        assert!(!eagle.import_item("u", "n", "w", &[]).await);
    }

    #[tokio::test]
    async fn test_timeout_reports_failure() {
        let (base, _) = spawn_eagle(
            StatusCode::OK,
            r#"{"status":"success"}"#,
            Duration::from_secs(2),
        )
        .await;
        let eagle = client(&base, Duration::from_millis(200));

        let request = eagle.build_request("u", "n", "w", &[]);
        let outcome = eagle.add_from_url(&request).await;
        assert!(matches!(outcome, ImportOutcome::Transport(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_reports_failure() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let eagle = client(&format!("http://{}", addr), Duration::from_secs(2));
        assert!(!eagle.import_item("u", "n", "w", &[]).await);
    }

    #[test]
    fn test_endpoint_joins_base() {
        let eagle = client("http://127.0.0.1:41595/", Duration::from_secs(1));
        assert_eq!(eagle.endpoint(), "http://127.0.0.1:41595/api/item/addFromURL");
    }
}
