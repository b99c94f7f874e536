use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use std::fmt;
use summarist_common::SummaristError;
use tracing::{error, warn};

use crate::types::ErrorResponse;

/// HTTP face of [`SummaristError`]
#[derive(Debug)]
pub struct ApiError(pub SummaristError);

pub type ApiResult<T> = Result<T, ApiError>;

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<SummaristError> for ApiError {
    fn from(err: SummaristError) -> Self {
        Self(err)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if self.0.is_client_error() {
            warn!("Request rejected ({}): {}", status.as_u16(), self.0);
        } else {
            error!("Request failed ({}): {}", status.as_u16(), self.0);
        }

        HttpResponse::build(status).json(ErrorResponse {
            detail: self.0.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn test_error_body_and_status() {
        let cases = [
            (SummaristError::validation("max_length too big"), 422),
            (SummaristError::user_input("bad file"), 400),
            (SummaristError::payload_too_large("too big"), 413),
            (SummaristError::provider("overloaded"), 502),
            (SummaristError::config("missing key"), 500),
        ];

        for (err, status) in cases {
            let message = err.to_string();
            assert_eq!(err.is_client_error(), status < 500, "{}", message);
            let response = ApiError::from(err).error_response();
            assert_eq!(response.status().as_u16(), status);

            let body = to_bytes(response.into_body()).await.unwrap();
            let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(json["detail"], message);
        }
    }
}
