use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

use crate::domain::order::OrderError;

/// Everything a handler can fail with.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Order(#[from] OrderError),

    #[error("{0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Order(OrderError::NotFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::Order(OrderError::AlreadyDone { .. }) => StatusCode::CONFLICT,
            ApiError::Order(OrderError::Validation(_)) | ApiError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Order(OrderError::Storage(_) | OrderError::Cancelled) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        // Server-side failures are already logged by the service.
        let body = if status.is_server_error() {
            "internal server error".to_string()
        } else {
            self.to_string()
        };

        HttpResponse::build(status)
            .content_type("text/plain; charset=utf-8")
            .body(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{ItemRef, OrderId};

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::from(OrderError::item_not_found(ItemRef(3))), StatusCode::NOT_FOUND),
            (ApiError::from(OrderError::order_not_found(&OrderId::new("x"))), StatusCode::NOT_FOUND),
            (
                ApiError::from(OrderError::AlreadyDone { order_id: OrderId::new("x") }),
                StatusCode::CONFLICT,
            ),
            (ApiError::from(OrderError::Validation("bad".into())), StatusCode::BAD_REQUEST),
            (ApiError::BadRequest("bad".into()), StatusCode::BAD_REQUEST),
            (ApiError::Unauthorized, StatusCode::UNAUTHORIZED),
            (ApiError::from(OrderError::Storage("pool timed out".into())), StatusCode::INTERNAL_SERVER_ERROR),
            (ApiError::from(OrderError::Cancelled), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected) in cases {
            assert_eq!(error.status_code(), expected, "{error:?}");
        }
    }

    #[actix_web::test]
    async fn test_storage_detail_is_not_exposed() {
        let response = ApiError::from(OrderError::Storage("password authentication failed".into()))
            .error_response();
        let body = actix_web::body::to_bytes(response.into_body()).await.unwrap();

        assert_eq!(body, "internal server error");
    }
}
