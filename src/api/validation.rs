use actix_web::{HttpResponse, error::JsonPayloadError, web::JsonConfig};
use serde::Serialize;
use tracing::warn;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub fields: serde_json::Value,
}

/// JsonConfig for invocation events with a consistent error body
///
/// An event that cannot be decoded never reaches the job handler.
pub fn json_config() -> JsonConfig {
    JsonConfig::default().error_handler(|err, _req| {
        let message = match &err {
            JsonPayloadError::Deserialize(de_err) if de_err.is_eof() => {
                "Request body is empty. Expected an invocation event".to_string()
            }
            JsonPayloadError::Deserialize(de_err) => format!("Invalid invocation event: {}", de_err),
            JsonPayloadError::ContentType => "Expected Content-Type: application/json".to_string(),
            other => other.to_string(),
        };
        warn!("Rejected invocation payload: {}", message);

        let error_response = ErrorResponse {
            error: "Invalid invocation event".to_string(),
            fields: serde_json::json!({ "message": message }),
        };
        actix_web::error::InternalError::from_response(
            err,
            HttpResponse::BadRequest().json(error_response),
        )
        .into()
    })
}
