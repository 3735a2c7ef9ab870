use serde::Serialize;
use sqlx::FromRow;

/// Database representation of a job with all fields
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct JobRow {
    pub job_id: i32,
    pub company_id: i32,
    pub recruiter_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
}
