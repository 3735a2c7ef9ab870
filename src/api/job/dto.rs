use serde::{Deserialize, Serialize};

/// Outbound response descriptor returned to the invoking platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResponse {
    pub status_code: u16,
    pub body: String,
}

impl JobResponse {
    /// Response whose body is the JSON encoding of `value`
    pub fn json<T: Serialize>(status_code: u16, value: &T) -> Result<Self, serde_json::Error> {
        Ok(Self {
            status_code,
            body: serde_json::to_string(value)?,
        })
    }

    /// Response with a plain-text body
    pub fn text(status_code: u16, body: &str) -> Self {
        Self {
            status_code,
            body: body.to_string(),
        }
    }
}

/// Body of a confirmation response
#[derive(Serialize)]
pub struct MessageBody<'a> {
    pub message: &'a str,
}

/// Body of an error response
#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}
