use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{error, warn};

use crate::{
    config::ConfigError,
    database::StoreError,
    utils::{FieldError, summarize},
};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed: {}", summarize(.0))]
    Validation(Vec<FieldError>),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Invalid thought id: {0}")]
    InvalidId(String),

    #[error("Thought not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AppError {
    /// Machine readable detail placed in the envelope's `response` member.
    fn detail(&self) -> Value {
        match self {
            AppError::Validation(errors) => json!({ "kind": "validation", "errors": errors }),
            AppError::MalformedPayload(reason) => {
                json!({ "kind": "malformed_payload", "detail": reason })
            }
            AppError::InvalidId(id) => json!({ "kind": "invalid_id", "id": id }),
            AppError::NotFound => json!({ "kind": "not_found" }),
            AppError::Store(e) => json!({ "kind": "store", "detail": e.to_string() }),
        }
    }
}

/// Route a failure happened on; picks the human readable envelope message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Create,
    Like,
    Delete,
}

impl Operation {
    pub fn failure_message(self) -> &'static str {
        match self {
            Operation::List => "Bad request, couldn't fetch thoughts",
            Operation::Create => "Did not create thought successfully.",
            Operation::Like => "Could not save like to message.",
            Operation::Delete => "Could not delete thought.",
        }
    }

    pub fn not_found_message(self) -> &'static str {
        match self {
            Operation::Like => "Thought not found. Like unsuccessful.",
            Operation::Delete => "Thought not found. Deletion unsuccessful.",
            // only like and delete look thoughts up by id
            Operation::List | Operation::Create => "Thought not found.",
        }
    }
}

#[derive(Debug)]
pub struct Failure {
    pub operation: Operation,
    pub error: AppError,
}

pub trait Context<T> {
    fn during(self, operation: Operation) -> Result<T, Failure>;
}

impl<T, E> Context<T> for Result<T, E>
where
    E: Into<AppError>,
{
    fn during(self, operation: Operation) -> Result<T, Failure> {
        self.map_err(|e| Failure {
            operation,
            error: e.into(),
        })
    }
}

#[derive(Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<T>,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(response: T, message: &'static str) -> Self {
        Self {
            success: true,
            response: Some(response),
            message,
            error: None,
        }
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        let Failure { operation, error } = self;

        if let AppError::NotFound = error {
            let body: Envelope<Value> = Envelope {
                success: false,
                response: None,
                message: operation.not_found_message(),
                error: None,
            };

            return (StatusCode::NOT_FOUND, Json(body)).into_response();
        }

        match &error {
            AppError::Store(e) => error!("{operation:?} failed: {e}"),
            e => warn!("{operation:?} rejected: {e}"),
        }

        let body = Envelope {
            success: false,
            response: Some(error.detail()),
            message: operation.failure_message(),
            error: Some(error.to_string()),
        };

        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

#[derive(Error, Debug)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_not_found_is_404_without_response() {
        let response = Err::<(), _>(AppError::NotFound)
            .during(Operation::Delete)
            .unwrap_err()
            .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Thought not found. Deletion unsuccessful.");
        assert!(body.get("response").is_none());
    }

    #[test]
    fn test_not_found_messages() {
        assert_eq!(
            Operation::Like.not_found_message(),
            "Thought not found. Like unsuccessful."
        );
        assert_eq!(Operation::List.not_found_message(), "Thought not found.");
        assert_eq!(Operation::Create.not_found_message(), "Thought not found.");
    }

    #[tokio::test]
    async fn test_validation_is_400_with_field_errors() {
        let errors = vec![FieldError {
            field: "message",
            message: "message is required".into(),
        }];

        let response = Err::<(), _>(AppError::Validation(errors))
            .during(Operation::Create)
            .unwrap_err()
            .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Did not create thought successfully.");
        assert_eq!(body["response"]["kind"], "validation");
        assert_eq!(body["response"]["errors"][0]["field"], "message");
        assert_eq!(body["error"], "Validation failed: message is required");
    }

    #[test]
    fn test_envelope_ok_skips_error() {
        let json = serde_json::to_value(Envelope::ok(vec![1, 2], "fine")).unwrap();

        assert_eq!(json, json!({ "success": true, "response": [1, 2], "message": "fine" }));
    }
}
