//! HTTP error envelope

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use iam_core::IamError;
use serde_json::json;

/// Every failure leaves the service as `400 {"message": ...}`
#[derive(Debug)]
pub struct ApiError(pub IamError);

impl From<IamError> for ApiError {
    fn from(error: IamError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.0.log();

        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": self.0.public_message() })),
        )
            .into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_domain_errors_are_flat_400() {
        for error in [
            IamError::InvalidToken,
            IamError::NotFound { resource: "user" },
            IamError::NotDeletable,
        ] {
            let expected = error.to_string();
            let response = ApiError(error).into_response();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(body_of(response).await["message"], expected);
        }
    }

    #[tokio::test]
    async fn test_internal_detail_is_hidden() {
        let source = std::io::Error::new(std::io::ErrorKind::Other, "no such table: users");
        let response = ApiError(IamError::persistence("Failed to load user", source)).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_of(response).await;
        assert_eq!(body["message"], "The request could not be completed");
    }
}
