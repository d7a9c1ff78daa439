use axum::{
    async_trait,
    body::Bytes,
    extract::{rejection::BytesRejection, FromRequest, Request},
    http::{header, StatusCode},
    Form,
};
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::error::ApiError;

/// Request body as loose JSON, ready for field validation.
///
/// Accepts `application/json` as well as urlencoded forms. An empty body
/// reads as `{}` so that missing fields are reported per field.
#[derive(Debug, Clone)]
pub struct JsonBody(pub Value);

fn is_form(request: &Request) -> bool {
    request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map_or(false, |ct| ct.starts_with("application/x-www-form-urlencoded"))
}

fn bytes_rejection(rejection: BytesRejection) -> ApiError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large("Request body too large")
    } else {
        ApiError::bad_request(rejection.body_text())
    }
}

#[async_trait]
impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_form(&request) {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(request, state)
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            let object: Map<String, Value> = fields.into_iter().map(|(k, v)| (k, Value::String(v))).collect();
            return Ok(JsonBody(Value::Object(object)));
        }

        let bytes = Bytes::from_request(request, state).await.map_err(bytes_rejection)?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(JsonBody(Value::Object(Map::new())));
        }

        let value = serde_json::from_slice(&bytes)
            .map_err(|e| ApiError::invalid_json(format!("JSON parse error - {}", e)))?;
        Ok(JsonBody(value))
    }
}
