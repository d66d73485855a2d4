//! HTTP response types and utilities
//!
//! Standardized JSON envelopes for the non-image endpoints, so errors and
//! health data share one shape.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::services::avatar::AvatarServiceStats;

/// Standard API response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the operation was successful
    pub success: bool,
    /// Response data (present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error message (present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Response timestamp
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn error(message: String) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now(),
        }
    }
}

/// Payload of the health endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub cached_avatars: usize,
    pub workers: usize,
    pub queue_capacity: usize,
    pub queued: usize,
    pub avatars_enabled: bool,
}

impl HealthStatus {
    pub fn healthy(stats: AvatarServiceStats) -> Self {
        Self {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            cached_avatars: stats.cached_entries,
            workers: stats.workers,
            queue_capacity: stats.queue_capacity,
            queued: stats.queued,
            avatars_enabled: stats.enabled,
        }
    }
}

/// Map an application error to a status code and JSON body
pub fn handle_error(error: AppError) -> Response {
    let status = match &error {
        AppError::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        AppError::Http(_) => StatusCode::BAD_GATEWAY,
    };

    tracing::error!("Request failed: {}", error);
    (status, Json(ApiResponse::<()>::error(error.to_string()))).into_response()
}

pub fn ok<T: Serialize>(data: T) -> impl IntoResponse {
    (StatusCode::OK, Json(ApiResponse::success(data)))
}

pub fn not_found(message: &str) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::error(message.to_string())),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_envelope_shape() {
        let body = serde_json::to_value(ApiResponse::<()>::error("Avatar not found".to_string()))
            .unwrap();

        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Avatar not found");
        assert!(body.get("data").is_none());
        assert!(body.get("timestamp").is_some());
    }

    #[test]
    fn test_handle_error_status() {
        let response = handle_error(AppError::configuration("bad"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
