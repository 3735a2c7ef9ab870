use std::sync::Arc;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::db::{Connector, JobStore};

use super::dto::{ErrorBody, JobResponse, MessageBody};
use super::models::{Caller, JobChanges, JobRequest, NewJob};

const RECRUITERS_ONLY: &str = "Recruiters only";
const METHOD_NOT_SUPPORTED: &str = "Method not supported";
const JOB_DELETED: &str = "Job Deleted";

/// Failures that surface as a 500 response
///
/// The `Display` text is what the caller sees in the error envelope.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    MalformedBody(serde_json::Error),

    #[error("{0}")]
    InvalidPayload(serde_json::Error),

    #[error("missing path parameter: id")]
    MissingJobId,

    #[error("{0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Encoding(serde_json::Error),
}

/// Methods the handler understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Method {
    Create,
    List,
    Delete,
    Update,
}

impl Method {
    fn parse(method: &str) -> Option<Self> {
        match method {
            "POST" => Some(Method::Create),
            "GET" => Some(Method::List),
            "DELETE" => Some(Method::Delete),
            "PUT" => Some(Method::Update),
            _ => None,
        }
    }

    fn requires_recruiter(self) -> bool {
        !matches!(self, Method::List)
    }
}

/// A fully decoded operation, ready to run against a store
#[derive(Debug)]
enum JobOperation {
    Create(NewJob),
    List,
    Delete(String),
    Update(String, JobChanges),
}

/// Handles one job request per call
///
/// Every call that reaches the database opens its own connection through the
/// connector and closes it before returning.
#[derive(Clone)]
pub struct JobService {
    connector: Arc<dyn Connector>,
}

impl JobService {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self { connector }
    }

    /// Produce exactly one response for one request
    ///
    /// # Returns
    /// - 201 with the created row for `POST`
    /// - 200 with open jobs for `GET`
    /// - 200 with a confirmation for `DELETE`, whether or not the job existed
    /// - 200 with the updated row for `PUT`, 404 if the job does not exist
    /// - 403 when a mutating method is called by a non-recruiter
    /// - 400 for any other method
    /// - 500 with `{"error": ...}` for every other failure
    pub async fn handle(&self, request: JobRequest, caller: &Caller) -> JobResponse {
        info!("Service: Handling {} request", request.method);

        match self.dispatch(request, caller).await {
            Ok(response) => {
                info!("Service: Responded with status {}", response.status_code);
                response
            }
            Err(err) => {
                error!("Service: Request failed: {:?}", err);
                error_response(500, err.to_string())
            }
        }
    }

    async fn dispatch(
        &self,
        request: JobRequest,
        caller: &Caller,
    ) -> Result<JobResponse, ServiceError> {
        let Some(method) = Method::parse(&request.method) else {
            warn!("Service: Unsupported method {}", request.method);
            return Ok(JobResponse::text(400, METHOD_NOT_SUPPORTED));
        };

        let body = parse_body(request.body.as_deref())?;

        if method.requires_recruiter() && !caller.is_recruiter() {
            warn!(
                "Service: Denied {:?} for caller with groups {:?}",
                method, caller.groups
            );
            return Ok(JobResponse::text(403, RECRUITERS_ONLY));
        }

        let operation = match method {
            Method::Create => JobOperation::Create(
                serde_json::from_value(body).map_err(ServiceError::InvalidPayload)?,
            ),
            Method::List => JobOperation::List,
            Method::Delete => JobOperation::Delete(parse_job_id(request.job_id)?),
            Method::Update => JobOperation::Update(
                parse_job_id(request.job_id)?,
                serde_json::from_value(body).map_err(ServiceError::InvalidPayload)?,
            ),
        };

        let mut store = self.connector.connect().await?;
        let outcome = execute(store.as_mut(), operation).await;
        if let Err(err) = store.close().await {
            warn!("Service: Failed to close database connection: {:?}", err);
        }
        outcome
    }
}

/// Absent or empty body is treated as `{}`
fn parse_body(body: Option<&str>) -> Result<Value, ServiceError> {
    match body {
        Some(raw) if !raw.is_empty() => {
            serde_json::from_str(raw).map_err(ServiceError::MalformedBody)
        }
        _ => Ok(Value::Object(Map::new())),
    }
}

/// The id stays text; storage casts it and rejects anything non-numeric
fn parse_job_id(job_id: Option<String>) -> Result<String, ServiceError> {
    job_id.ok_or(ServiceError::MissingJobId)
}

async fn execute(
    store: &mut dyn JobStore,
    operation: JobOperation,
) -> Result<JobResponse, ServiceError> {
    match operation {
        JobOperation::Create(job) => {
            let row = store.create(&job).await?;
            info!("Service: Job created with job_id={}", row.job_id);
            JobResponse::json(201, &row).map_err(ServiceError::Encoding)
        }
        JobOperation::List => {
            let rows = store.list_open().await?;
            info!("Service: Listed {} open jobs", rows.len());
            JobResponse::json(200, &rows).map_err(ServiceError::Encoding)
        }
        JobOperation::Delete(job_id) => {
            let removed = store.delete(&job_id).await?;
            info!("Service: Delete job_id={} removed {} rows", job_id, removed);
            JobResponse::json(200, &MessageBody { message: JOB_DELETED })
                .map_err(ServiceError::Encoding)
        }
        JobOperation::Update(job_id, changes) => match store.update(&job_id, &changes).await? {
            Some(row) => {
                info!("Service: Job {} updated", job_id);
                JobResponse::json(200, &row).map_err(ServiceError::Encoding)
            }
            None => {
                warn!("Service: Job not found: {}", job_id);
                Ok(error_response(404, format!("Job {} not found", job_id)))
            }
        },
    }
}

fn error_response(status_code: u16, error: String) -> JobResponse {
    let body = ErrorBody { error };
    let encoded = serde_json::to_string(&body).unwrap_or_else(|_| String::from("{}"));
    JobResponse {
        status_code,
        body: encoded,
    }
}
