//! JSON body extractor whose rejections match the service's error body

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::json;

pub struct FormJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for FormJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = FormJsonRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(FormJson(value)),
            Err(rejection) => {
                tracing::debug!("Rejected form body: {}", rejection.body_text());
                Err(FormJsonRejection::from(rejection))
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum FormJsonRejection {
    MissingContentType,
    Syntax,
    Shape(String),
    Body,
}

impl From<JsonRejection> for FormJsonRejection {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::MissingJsonContentType(_) => FormJsonRejection::MissingContentType,
            JsonRejection::JsonSyntaxError(_) => FormJsonRejection::Syntax,
            JsonRejection::JsonDataError(e) => FormJsonRejection::Shape(e.body_text()),
            _ => FormJsonRejection::Body,
        }
    }
}

impl IntoResponse for FormJsonRejection {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            FormJsonRejection::MissingContentType => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "Expected request with `Content-Type: application/json`",
            ),
            FormJsonRejection::Syntax => (StatusCode::BAD_REQUEST, "Invalid JSON format"),
            FormJsonRejection::Shape(_) => (StatusCode::BAD_REQUEST, "Form fields must be text"),
            FormJsonRejection::Body => (StatusCode::BAD_REQUEST, "Failed to read request body"),
        };

        let body = Json(json!({
            "error": message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

impl std::fmt::Display for FormJsonRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormJsonRejection::MissingContentType => write!(f, "missing JSON content type"),
            FormJsonRejection::Syntax => write!(f, "invalid JSON syntax"),
            FormJsonRejection::Shape(msg) => write!(f, "unexpected JSON shape: {}", msg),
            FormJsonRejection::Body => write!(f, "unreadable body"),
        }
    }
}

impl std::error::Error for FormJsonRejection {}
