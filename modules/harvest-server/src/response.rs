use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use harvest_archive::HarvestError;
use harvest_common::ErrorKind;
use serde::Serialize;

/// Envelope wrapped around every API payload.
#[derive(Debug, Serialize)]
pub struct BaseResponse<T> {
    pub status: &'static str,
    pub error_code: Option<ErrorKind>,
    pub data: Option<T>,
}

impl<T: Serialize> BaseResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "success",
            error_code: None,
            data: Some(data),
        }
    }
}

impl BaseResponse<()> {
    pub fn failed(kind: ErrorKind) -> Self {
        Self {
            status: "failed",
            error_code: Some(kind),
            data: None,
        }
    }
}

/// Boundary rejections get their own HTTP status. Workflow failures travel
/// inside a 200 envelope so clients read one shape.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
        ErrorKind::SourceUnavailable
        | ErrorKind::BlockedOrCaptcha
        | ErrorKind::Timeout
        | ErrorKind::InternalError => StatusCode::OK,
    }
}

pub fn failure(kind: ErrorKind) -> Response {
    (status_for(kind), Json(BaseResponse::failed(kind))).into_response()
}

/// Handler outcome: a payload or a harvest error, both rendered as the envelope.
pub struct ApiResponse<T>(pub Result<T, HarvestError>);

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        match self.0 {
            Ok(data) => Json(BaseResponse::success(data)).into_response(),
            Err(e) => {
                let kind = e.kind();
                match kind {
                    ErrorKind::InternalError => tracing::error!(error = %e, "request failed"),
                    _ => tracing::warn!(error = %e, error_code = %kind, "request failed"),
                }
                failure(kind)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harvest_common::{FetchError, ValidationError};

    #[test]
    fn failed_envelope_has_null_data() {
        let value = serde_json::to_value(BaseResponse::failed(ErrorKind::Timeout)).unwrap();
        assert_eq!(value["status"], "failed");
        assert_eq!(value["error_code"], "timeout");
        assert!(value["data"].is_null());
    }

    #[test]
    fn success_envelope_has_null_error_code() {
        let value = serde_json::to_value(BaseResponse::success(vec![1, 2])).unwrap();
        assert_eq!(value["status"], "success");
        assert!(value["error_code"].is_null());
        assert_eq!(value["data"][1], 2);
    }

    #[test]
    fn boundary_kinds_get_their_own_status() {
        assert_eq!(status_for(ErrorKind::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(ErrorKind::BadRequest), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::BlockedOrCaptcha), StatusCode::OK);
    }

    #[test]
    fn harvest_errors_render_with_their_kind() {
        let resp = ApiResponse::<()>(Err(HarvestError::from(ValidationError::NoQueries)))
            .into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = ApiResponse::<()>(Err(HarvestError::from(FetchError::Timeout {
            url: "https://example.com/".into(),
        })))
        .into_response();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
