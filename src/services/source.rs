// src/services/source.rs

//! Remote joke sources.
//!
//! Both upstreams are plain HTTP GETs. The JSON API answers with a single
//! joke record; the curated source is a markdown document. The declared
//! `Content-Type` decides which of the two shapes a response is read as.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};

use crate::error::Result;
use crate::models::{ApiJoke, FetchConfig};
use crate::utils::http;

/// A response body, classified by its declared content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceResponse {
    /// Single joke record from the JSON API
    Structured(ApiJoke),
    /// Free-form document, one joke per `- ` line
    Document(String),
}

impl SourceResponse {
    /// Classify a raw body by its `Content-Type`.
    ///
    /// A JSON content type with a malformed body is an error; every other
    /// content type (or none at all) yields a document.
    pub fn from_body(content_type: &str, body: &[u8]) -> Result<Self> {
        if http::is_json_content_type(content_type) {
            Ok(Self::Structured(serde_json::from_slice(body)?))
        } else {
            Ok(Self::Document(String::from_utf8_lossy(body).into_owned()))
        }
    }
}

/// Something jokes can be fetched from.
#[async_trait]
pub trait JokeSource: Send + Sync {
    /// Issue one request to `endpoint`.
    ///
    /// `expect_json` adds `Accept: application/json` for the structured API.
    async fn fetch(&self, endpoint: &str, expect_json: bool) -> Result<SourceResponse>;
}

/// HTTP-backed joke source.
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    /// Create a source with the configured user agent and timeout.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        Ok(Self {
            client: http::create_async_client(config)?,
        })
    }
}

#[async_trait]
impl JokeSource for HttpSource {
    async fn fetch(&self, endpoint: &str, expect_json: bool) -> Result<SourceResponse> {
        let mut request = self.client.get(endpoint);
        if expect_json {
            request = request.header(ACCEPT, "application/json");
        }

        let response = request.send().await?;

        // Status is informational only; the body is classified regardless.
        let status = response.status();
        if !status.is_success() {
            log::debug!("{} responded with {}", endpoint, status);
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response.bytes().await?;

        log::debug!(
            "Fetched {} bytes ({}) from {}",
            body.len(),
            if content_type.is_empty() {
                "no content type"
            } else {
                content_type.as_str()
            },
            endpoint
        );

        SourceResponse::from_body(&content_type, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use httpmock::Method::GET;
    use httpmock::MockServer;
    use std::net::TcpListener;

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn source() -> HttpSource {
        HttpSource::new(&FetchConfig::default()).unwrap()
    }

    #[test]
    fn test_from_body_json() {
        let body = br#"{"id": "1", "joke": "First", "status": 200}"#;
        let response = SourceResponse::from_body("application/json", body).unwrap();
        assert_eq!(
            response,
            SourceResponse::Structured(ApiJoke {
                id: "1".to_string(),
                joke: "First".to_string(),
                status: 200,
            })
        );
    }

    #[test]
    fn test_from_body_invalid_json() {
        let body = br#"{"id": "R7UfaahVfFd", "joke": "This is an invalid JSON"#;
        let result = SourceResponse::from_body("application/json", body);
        assert!(matches!(result, Err(AppError::Json(_))));
    }

    #[test]
    fn test_from_body_document() {
        let response = SourceResponse::from_body("text/plain; charset=utf-8", b"- A").unwrap();
        assert_eq!(response, SourceResponse::Document("- A".to_string()));
    }

    #[tokio::test]
    async fn test_fetch_structured_sends_headers() {
        if !can_bind_localhost() {
            eprintln!("Skipping httpmock tests: cannot bind to localhost");
            return;
        }

        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/")
                    .header("accept", "application/json")
                    .header("user-agent", "https://github.com/lhaig/godad");
                then.status(200)
                    .header("content-type", "application/json")
                    .body(r#"{"id": "1", "joke": "This is the first joke", "status": 200}"#);
            })
            .await;

        let response = source().fetch(&server.url("/"), true).await.unwrap();

        mock.assert_async().await;
        match response {
            SourceResponse::Structured(joke) => assert_eq!(joke.joke, "This is the first joke"),
            other => panic!("expected structured response, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_document() {
        if !can_bind_localhost() {
            eprintln!("Skipping httpmock tests: cannot bind to localhost");
            return;
        }

        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/de.md");
                then.status(200)
                    .header("content-type", "text/plain; charset=utf-8")
                    .body("# Witze\n- Eins\n- Zwei\n");
            })
            .await;

        let response = source().fetch(&server.url("/de.md"), false).await.unwrap();
        assert_eq!(
            response,
            SourceResponse::Document("# Witze\n- Eins\n- Zwei\n".to_string())
        );
    }

    #[tokio::test]
    async fn test_fetch_error_status_is_not_a_transport_failure() {
        if !can_bind_localhost() {
            eprintln!("Skipping httpmock tests: cannot bind to localhost");
            return;
        }

        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/");
                then.status(500);
            })
            .await;

        let response = source().fetch(&server.url("/"), true).await.unwrap();
        assert_eq!(response, SourceResponse::Document(String::new()));
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0");
        let Ok(listener) = listener else {
            eprintln!("Skipping: cannot bind to localhost");
            return;
        };
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = source().fetch(&format!("http://{addr}/"), true).await;
        assert!(matches!(result, Err(AppError::Http(_))));
    }
}
