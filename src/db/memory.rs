//! In-memory job store used by the unit tests
//!
//! Mirrors the SQL statements in `job_repository`, including the integer casts
//! and NOT NULL columns, and counts connections so tests can check that every
//! invocation releases what it opened.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::api::job::{JobChanges, NewJob, OPEN_STATUS};
use crate::db::models::JobRow;
use crate::db::{Connector, JobStore};

#[derive(Default)]
pub struct MemoryState {
    pub rows: Vec<JobRow>,
    next_id: i32,
    pub opened: usize,
    pub closed: usize,
    pub statements: usize,
    pub refuse_connections: bool,
    pub fail_statements: bool,
}

impl MemoryState {
    pub fn open_connections(&self) -> usize {
        self.opened - self.closed
    }
}

#[derive(Clone, Default)]
pub struct MemoryConnector {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryConnector {
    pub fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap()
    }

    pub fn seed(&self, company_id: i32, title: &str, status: &str) -> JobRow {
        let mut state = self.state();
        state.next_id += 1;
        let row = JobRow {
            job_id: state.next_id,
            company_id,
            recruiter_id: 7,
            title: title.to_string(),
            description: Some(format!("{title} description")),
            status: status.to_string(),
        };
        state.rows.push(row.clone());
        row
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self) -> Result<Box<dyn JobStore>, sqlx::Error> {
        let mut state = self.state();
        if state.refuse_connections {
            return Err(sqlx::Error::Protocol("connection refused".to_string()));
        }
        state.opened += 1;
        Ok(Box::new(MemoryStore {
            state: self.state.clone(),
            closed: false,
        }))
    }
}

/// Same acceptance as Postgres' `text::integer` cast
fn cast_integer(value: &str) -> Result<i32, sqlx::Error> {
    value.trim().parse().map_err(|_| {
        sqlx::Error::Protocol(format!("invalid input syntax for type integer: \"{value}\""))
    })
}

fn not_null<T>(column: &str, value: Option<T>) -> Result<T, sqlx::Error> {
    value.ok_or_else(|| {
        sqlx::Error::Protocol(format!(
            "null value in column \"{column}\" of relation \"jobs\" violates not-null constraint"
        ))
    })
}

struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    closed: bool,
}

impl MemoryStore {
    fn begin(&self) -> Result<MutexGuard<'_, MemoryState>, sqlx::Error> {
        if self.closed {
            return Err(sqlx::Error::Protocol("connection already closed".to_string()));
        }
        let mut state = self.state.lock().unwrap();
        state.statements += 1;
        if state.fail_statements {
            return Err(sqlx::Error::Protocol("statement failed".to_string()));
        }
        Ok(state)
    }
}

#[async_trait]
impl JobStore for MemoryStore {
    async fn create(&mut self, job: &NewJob) -> Result<JobRow, sqlx::Error> {
        let mut state = self.begin()?;
        let company_id = job.company_id.as_deref().map(cast_integer).transpose()?;
        let recruiter_id = job.recruiter_id.as_deref().map(cast_integer).transpose()?;
        let row = JobRow {
            job_id: state.next_id + 1,
            company_id: not_null("company_id", company_id)?,
            recruiter_id: not_null("recruiter_id", recruiter_id)?,
            title: not_null("title", job.title.clone())?,
            description: job.description.clone(),
            status: OPEN_STATUS.to_string(),
        };
        state.next_id = row.job_id;
        state.rows.push(row.clone());
        Ok(row)
    }

    async fn list_open(&mut self) -> Result<Vec<JobRow>, sqlx::Error> {
        let state = self.begin()?;
        Ok(state
            .rows
            .iter()
            .filter(|row| row.status == OPEN_STATUS)
            .cloned()
            .collect())
    }

    async fn delete(&mut self, job_id: &str) -> Result<u64, sqlx::Error> {
        let mut state = self.begin()?;
        let job_id = cast_integer(job_id)?;
        let before = state.rows.len();
        state.rows.retain(|row| row.job_id != job_id);
        Ok((before - state.rows.len()) as u64)
    }

    async fn update(
        &mut self,
        job_id: &str,
        changes: &JobChanges,
    ) -> Result<Option<JobRow>, sqlx::Error> {
        let mut state = self.begin()?;
        let job_id = cast_integer(job_id)?;
        let Some(row) = state.rows.iter_mut().find(|row| row.job_id == job_id) else {
            return Ok(None);
        };
        if let Some(title) = &changes.title {
            row.title = title.clone();
        }
        if let Some(description) = &changes.description {
            row.description = Some(description.clone());
        }
        if let Some(status) = &changes.status {
            row.status = status.clone();
        }
        Ok(Some(row.clone()))
    }

    async fn close(&mut self) -> Result<(), sqlx::Error> {
        if !self.closed {
            self.closed = true;
            self.state.lock().unwrap().closed += 1;
        }
        Ok(())
    }
}
