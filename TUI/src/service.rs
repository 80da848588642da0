// Conversion service client over HTTP/JSON

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::model::Audience;

/// Shown when the service gives no reason of its own
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred during conversion.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvertRequest {
    pub text: String,
    pub target: Audience,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConvertResponse {
    pub converted: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: String,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    #[error("service returned {status}: {}", .reason.as_deref().unwrap_or("no reason given"))]
    Service {
        status: u16,
        reason: Option<String>,
    },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ServiceError {
    /// Message suitable for the alert shown to the user
    pub fn user_message(&self) -> &str {
        match self {
            ServiceError::Service {
                reason: Some(reason),
                ..
            } if !reason.trim().is_empty() => reason,
            _ => GENERIC_ERROR_MESSAGE,
        }
    }
}

#[async_trait]
pub trait ConversionService: Send + Sync {
    /// Send one conversion request and wait for its single response
    async fn convert(&self, request: &ConvertRequest) -> Result<ConvertResponse, ServiceError>;

    async fn health(&self) -> Result<HealthStatus, ServiceError>;
}

pub struct HttpConversionService {
    client: Client,
    base_url: String,
}

impl HttpConversionService {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn classify_send_error(e: reqwest::Error) -> ServiceError {
    if e.is_timeout() {
        ServiceError::Transport(format!("Request timeout: {}", e))
    } else if e.is_connect() {
        ServiceError::Transport(format!("Connection failed: {}", e))
    } else {
        ServiceError::Transport(format!("Request failed: {}", e))
    }
}

fn decode_convert_response(status: StatusCode, body: &str) -> Result<ConvertResponse, ServiceError> {
    if !status.is_success() {
        let reason = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.error);
        return Err(ServiceError::Service {
            status: status.as_u16(),
            reason,
        });
    }

    serde_json::from_str(body)
        .map_err(|e| ServiceError::Malformed(format!("Failed to parse response: {}", e)))
}

#[async_trait]
impl ConversionService for HttpConversionService {
    async fn convert(&self, request: &ConvertRequest) -> Result<ConvertResponse, ServiceError> {
        let url = self.endpoint("/api/convert");
        tracing::debug!(
            %url,
            audience = request.target.as_str(),
            chars = request.text.chars().count(),
            "sending conversion request"
        );

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ServiceError::Transport(format!("Failed to read response: {}", e)))?;

        decode_convert_response(status, &body)
    }

    async fn health(&self) -> Result<HealthStatus, ServiceError> {
        let response = self
            .client
            .get(self.endpoint("/health"))
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Service {
                status: status.as_u16(),
                reason: None,
            });
        }

        response
            .json::<HealthStatus>()
            .await
            .map_err(|e| ServiceError::Malformed(format!("Failed to parse health status: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::StatusCode as AxumStatus,
        routing::{get, post},
        Json, Router,
    };
    use std::sync::{Arc, Mutex};
    use tokio::net::TcpListener;

    async fn spawn_server(app: Router) -> String {
        std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{addr}")
    }

    fn service(url: &str) -> HttpConversionService {
        HttpConversionService::new(url, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_convert_request_serialize() {
        let request = ConvertRequest {
            text: "hi".to_string(),
            target: Audience::Colleague,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({"text": "hi", "target": "colleague"}));
    }

    #[test]
    fn test_convert_response_ignores_echoed_fields() {
        let json = r#"{
            "original": "check pls",
            "converted": "Could you please review this?",
            "target": "boss"
        }"#;

        let response: ConvertResponse = serde_json::from_str(json).unwrap();

        assert_eq!(
            response,
            ConvertResponse {
                converted: "Could you please review this?".to_string()
            }
        );
    }

    #[test]
    fn test_decode_missing_converted_is_malformed() {
        let err = decode_convert_response(StatusCode::OK, r#"{"original": "x"}"#).unwrap_err();
        assert!(matches!(err, ServiceError::Malformed(_)));
        assert_eq!(err.user_message(), GENERIC_ERROR_MESSAGE);
    }

    #[test]
    fn test_decode_error_body_carries_reason() {
        let err = decode_convert_response(
            StatusCode::BAD_REQUEST,
            r#"{"error": "No text provided"}"#,
        )
        .unwrap_err();

        match &err {
            ServiceError::Service { status, reason } => {
                assert_eq!(*status, 400);
                assert_eq!(reason.as_deref(), Some("No text provided"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.user_message(), "No text provided");
    }

    #[test]
    fn test_decode_error_without_json_body_uses_generic_message() {
        let err = decode_convert_response(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, ServiceError::Service { status: 502, reason: None }));
        assert_eq!(err.user_message(), GENERIC_ERROR_MESSAGE);
    }

    #[test]
    fn test_transport_error_uses_generic_message() {
        let err = ServiceError::Transport("Connection failed".to_string());
        assert_eq!(err.user_message(), GENERIC_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn test_convert_posts_text_and_target() {
        let seen: Arc<Mutex<Option<serde_json::Value>>> = Arc::new(Mutex::new(None));
        let seen_in_handler = Arc::clone(&seen);
        let app = Router::new().route(
            "/api/convert",
            post(move |Json(body): Json<serde_json::Value>| {
                let seen = Arc::clone(&seen_in_handler);
                async move {
                    *seen.lock().unwrap() = Some(body);
                    Json(serde_json::json!({"converted": "Dear team,\nPlease review."}))
                }
            }),
        );
        let url = spawn_server(app).await;

        let response = service(&url)
            .convert(&ConvertRequest {
                text: "look at this".to_string(),
                target: Audience::Client,
            })
            .await
            .unwrap();

        assert_eq!(response.converted, "Dear team,\nPlease review.");
        let body = seen.lock().unwrap().clone().unwrap();
        assert_eq!(body, serde_json::json!({"text": "look at this", "target": "client"}));
    }

    #[tokio::test]
    async fn test_convert_failure_status() {
        let app = Router::new().route(
            "/api/convert",
            post(|| async {
                (
                    AxumStatus::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({"error": "Failed to process text conversion"})),
                )
            }),
        );
        let url = spawn_server(app).await;

        let err = service(&url)
            .convert(&ConvertRequest {
                text: "x".to_string(),
                target: Audience::Boss,
            })
            .await
            .unwrap_err();

        assert_eq!(err.user_message(), "Failed to process text conversion");
    }

    #[tokio::test]
    async fn test_convert_unreachable_is_transport_error() {
        // Bind then drop to get a port nothing listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        std::env::set_var("NO_PROXY", "127.0.0.1,localhost");

        let err = service(&format!("http://{addr}"))
            .convert(&ConvertRequest {
                text: "x".to_string(),
                target: Audience::Boss,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Transport(_)));
        assert_eq!(err.user_message(), GENERIC_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn test_health_probe() {
        let app = Router::new().route(
            "/health",
            get(|| async {
                Json(serde_json::json!({"status": "healthy", "service": "BizTone Converter API"}))
            }),
        );
        let url = spawn_server(app).await;

        let health = service(&format!("{url}/")).health().await.unwrap();

        assert!(health.is_healthy());
    }
}
