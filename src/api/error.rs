//! API error taxonomy and the JSON envelope every response uses.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Outcome label carried in every envelope
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Failed,
    Error,
}

/// Response envelope: `{status, message, data?, meta?}`
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: Status,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Meta {
    pub total: usize,
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: Status::Success,
            message: message.into(),
            data: None,
            meta: None,
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            status: Status::Success,
            message: message.into(),
            data: Some(data),
            meta: None,
        }
    }

    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = Some(meta);
        self
    }
}

/// Handler result: a status code plus an enveloped payload
pub type ApiResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

/// Closed set of failures a handler can report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    Validation(String),
    Conflict(String),
    Unauthorized(String),
    NotFound(String),
    Parse(String),
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Parse(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client mistakes are `failed`; server and parser faults are `error`
    pub fn envelope_status(&self) -> Status {
        match self {
            ApiError::Parse(_) | ApiError::Internal(_) => Status::Error,
            _ => Status::Failed,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::Validation(msg)
            | ApiError::Conflict(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::NotFound(msg)
            | ApiError::Parse(msg)
            | ApiError::Internal(msg) => msg,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.status_code().as_u16(), self.message())
    }
}

impl std::error::Error for ApiError {}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        tracing::error!("Internal error: {:#}", err);
        ApiError::Internal(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonSyntaxError(e) => ApiError::Parse(e.body_text()),
            JsonRejection::JsonDataError(e) => ApiError::Validation(e.body_text()),
            JsonRejection::MissingJsonContentType(e) => ApiError::Validation(e.body_text()),
            other => ApiError::Parse(other.body_text()),
        }
    }
}

/// Unwrap a JSON body extraction.
///
/// A request without a JSON content type reads as an empty body, so the
/// handler reports its own missing-fields error for it.
pub fn json_body<T: Default>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(T::default()),
        Err(rejection) => Err(rejection.into()),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ApiResponse::<()> {
            status: self.envelope_status(),
            message: self.message().to_string(),
            data: None,
            meta: None,
        });

        (self.status_code(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::Validation("v".into()), 422, Status::Failed),
            (ApiError::Conflict("c".into()), 409, Status::Failed),
            (ApiError::Unauthorized("u".into()), 401, Status::Failed),
            (ApiError::NotFound("n".into()), 404, Status::Failed),
            (ApiError::Parse("p".into()), 400, Status::Error),
            (ApiError::Internal("i".into()), 500, Status::Error),
        ];

        for (err, code, status) in cases {
            assert_eq!(err.status_code().as_u16(), code);
            assert_eq!(err.envelope_status(), status);
        }
    }

    #[test]
    fn test_error_conversion_keeps_message() {
        let err = anyhow::anyhow!("disk on fire");
        let api_err: ApiError = err.into();

        assert_eq!(api_err, ApiError::Internal("disk on fire".to_string()));
    }

    #[tokio::test]
    async fn test_json_body_treats_missing_content_type_as_empty() {
        use axum::body::Body;
        use axum::extract::{FromRequest, Request};

        #[derive(Debug, Default, Deserialize, PartialEq)]
        struct Credentials {
            email: Option<String>,
        }

        let form = Request::builder()
            .method("POST")
            .body(Body::from("email=a@x.com"))
            .unwrap();
        let extracted = Json::<Credentials>::from_request(form, &()).await;
        assert_eq!(json_body(extracted).unwrap(), Credentials::default());

        let wrong_shape = Request::builder()
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"email": 5}"#))
            .unwrap();
        let extracted = Json::<Credentials>::from_request(wrong_shape, &()).await;
        assert!(matches!(json_body(extracted), Err(ApiError::Validation(_))));
    }

    #[test]
    fn test_envelope_omits_empty_fields() {
        let json = serde_json::to_value(ApiResponse::message("ok")).unwrap();
        assert_eq!(json, serde_json::json!({"status": "success", "message": "ok"}));

        let json =
            serde_json::to_value(ApiResponse::success("list", vec![1, 2]).with_meta(Meta { total: 2 }))
                .unwrap();
        assert_eq!(json["meta"]["total"], 2);
        assert_eq!(json["data"], serde_json::json!([1, 2]));
    }
}
