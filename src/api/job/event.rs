//! Inbound HTTP API (payload v2) event
//!
//! Only the fields the job handler reads are modelled. The event is split into
//! a [`JobRequest`] and an explicit [`Caller`] so the handler never reaches into
//! authorizer claims itself.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use super::models::{Caller, JobRequest};

const GROUPS_CLAIM: &str = "cognito:groups";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGatewayEvent {
    pub request_context: RequestContext,
    #[serde(default)]
    pub path_parameters: Option<HashMap<String, String>>,
    #[serde(default)]
    pub body: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RequestContext {
    pub http: HttpDescription,
    #[serde(default)]
    pub authorizer: Option<Authorizer>,
}

#[derive(Debug, Deserialize)]
pub struct HttpDescription {
    pub method: String,
}

#[derive(Debug, Deserialize)]
pub struct Authorizer {
    #[serde(default)]
    pub jwt: Option<JwtAuthorizer>,
}

#[derive(Debug, Deserialize)]
pub struct JwtAuthorizer {
    #[serde(default)]
    pub claims: HashMap<String, Value>,
}

impl ApiGatewayEvent {
    pub fn into_parts(self) -> (JobRequest, Caller) {
        let caller = Caller::new(
            self.request_context
                .authorizer
                .and_then(|authorizer| authorizer.jwt)
                .and_then(|jwt| jwt.claims.get(GROUPS_CLAIM).map(groups_from_claim))
                .unwrap_or_default(),
        );

        let request = JobRequest {
            method: self.request_context.http.method,
            job_id: self.path_parameters.and_then(|mut params| params.remove("id")),
            body: self.body,
        };

        (request, caller)
    }
}

/// Read the groups claim, which arrives either as a JSON array or flattened
/// into a string such as `[Recruiters Admins]`
fn groups_from_claim(claim: &Value) -> Vec<String> {
    match claim {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Value::String(raw) => raw
            .trim_start_matches('[')
            .trim_end_matches(']')
            .split(|c: char| c == ',' || c.is_whitespace())
            .map(|group| group.trim_matches('"'))
            .filter(|group| !group.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}
