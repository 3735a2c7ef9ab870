use async_trait::async_trait;
use sqlx::{Connection, PgConnection};
use tracing::debug;

use crate::api::job::{JobChanges, NewJob, OPEN_STATUS};
use crate::config::DbConfig;
use crate::db::{connection, models::JobRow};

const JOB_COLUMNS: &str = "job_id, company_id, recruiter_id, title, description, status";

/// Opens one `JobStore` per invocation
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn JobStore>, sqlx::Error>;
}

/// Job operations over a single open connection
///
/// Every method runs exactly one statement. `close` must be called once the
/// invocation is done with the store; operations after `close` fail.
#[async_trait]
pub trait JobStore: Send {
    /// Insert a job with status `open` and return the stored row
    async fn create(&mut self, job: &NewJob) -> Result<JobRow, sqlx::Error>;

    /// All jobs whose status is `open`
    async fn list_open(&mut self) -> Result<Vec<JobRow>, sqlx::Error>;

    /// Delete by id, returning the number of rows removed
    ///
    /// Ids arrive as path text and are cast by the store.
    async fn delete(&mut self, job_id: &str) -> Result<u64, sqlx::Error>;

    /// Replace each supplied field, keeping the stored value for absent ones
    ///
    /// Returns `None` when no job has the given id.
    async fn update(
        &mut self,
        job_id: &str,
        changes: &JobChanges,
    ) -> Result<Option<JobRow>, sqlx::Error>;

    async fn close(&mut self) -> Result<(), sqlx::Error>;
}

/// Connector opening a fresh PostgreSQL connection for each invocation
pub struct PgConnector {
    config: DbConfig,
}

impl PgConnector {
    pub fn new(config: DbConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Connector for PgConnector {
    async fn connect(&self) -> Result<Box<dyn JobStore>, sqlx::Error> {
        debug!("Opening database connection to {}", self.config.host);
        let conn = connection::get_connection(&self.config).await?;
        Ok(Box::new(PgJobStore { conn: Some(conn) }))
    }
}

/// PostgreSQL-backed job store
pub struct PgJobStore {
    conn: Option<PgConnection>,
}

impl PgJobStore {
    fn conn(&mut self) -> Result<&mut PgConnection, sqlx::Error> {
        self.conn
            .as_mut()
            .ok_or_else(|| sqlx::Error::Protocol("connection already closed".to_string()))
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn create(&mut self, job: &NewJob) -> Result<JobRow, sqlx::Error> {
        debug!(
            "Creating job: company_id={:?}, recruiter_id={:?}, title={:?}",
            job.company_id, job.recruiter_id, job.title
        );

        let query = format!(
            "INSERT INTO jobs (company_id, recruiter_id, title, description, status) \
             VALUES ($1::integer, $2::integer, $3, $4, $5) \
             RETURNING {JOB_COLUMNS}"
        );

        let row = sqlx::query_as::<_, JobRow>(&query)
            .bind(&job.company_id)
            .bind(&job.recruiter_id)
            .bind(&job.title)
            .bind(&job.description)
            .bind(OPEN_STATUS)
            .fetch_one(self.conn()?)
            .await?;

        debug!("Job created with job_id={}", row.job_id);
        Ok(row)
    }

    async fn list_open(&mut self) -> Result<Vec<JobRow>, sqlx::Error> {
        let query = format!("SELECT {JOB_COLUMNS} FROM jobs WHERE status = $1 ORDER BY job_id");

        let rows = sqlx::query_as::<_, JobRow>(&query)
            .bind(OPEN_STATUS)
            .fetch_all(self.conn()?)
            .await?;

        debug!("Fetched {} open jobs", rows.len());
        Ok(rows)
    }

    async fn delete(&mut self, job_id: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM jobs WHERE job_id = $1::integer")
            .bind(job_id)
            .execute(self.conn()?)
            .await?;

        debug!("Delete job_id={} removed {} rows", job_id, result.rows_affected());
        Ok(result.rows_affected())
    }

    async fn update(
        &mut self,
        job_id: &str,
        changes: &JobChanges,
    ) -> Result<Option<JobRow>, sqlx::Error> {
        let query = format!(
            "UPDATE jobs SET \
                title = COALESCE($1, title), \
                description = COALESCE($2, description), \
                status = COALESCE($3, status) \
             WHERE job_id = $4::integer \
             RETURNING {JOB_COLUMNS}"
        );

        let row = sqlx::query_as::<_, JobRow>(&query)
            .bind(&changes.title)
            .bind(&changes.description)
            .bind(&changes.status)
            .bind(job_id)
            .fetch_optional(self.conn()?)
            .await?;

        debug!("Update job_id={} matched={}", job_id, row.is_some());
        Ok(row)
    }

    async fn close(&mut self) -> Result<(), sqlx::Error> {
        match self.conn.take() {
            Some(conn) => conn.close().await,
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::PgPool;

    async fn store(pool: &PgPool) -> sqlx::Result<PgJobStore> {
        let conn = pool.acquire().await?.detach();
        Ok(PgJobStore { conn: Some(conn) })
    }

    fn new_job(company_id: &str, title: Option<&str>) -> NewJob {
        NewJob {
            company_id: Some(company_id.to_string()),
            recruiter_id: Some("2".to_string()),
            title: title.map(str::to_string),
            description: Some("Build things".to_string()),
        }
    }

    #[sqlx::test(migrations = false, fixtures("jobs"))]
    #[ignore = "requires DATABASE_URL"]
    async fn create_casts_text_fields_and_forces_open(pool: PgPool) -> sqlx::Result<()> {
        let mut store = store(&pool).await?;

        let row = store.create(&new_job("1", Some("Engineer"))).await?;
        store.close().await?;

        assert!(row.job_id > 3);
        assert_eq!(row.company_id, 1);
        assert_eq!(row.recruiter_id, 2);
        assert_eq!(row.title, "Engineer");
        assert_eq!(row.description.as_deref(), Some("Build things"));
        assert_eq!(row.status, "open");
        Ok(())
    }

    #[sqlx::test(migrations = false, fixtures("jobs"))]
    #[ignore = "requires DATABASE_URL"]
    async fn create_without_title_violates_not_null(pool: PgPool) -> sqlx::Result<()> {
        let mut store = store(&pool).await?;

        let err = store.create(&new_job("1", None)).await.unwrap_err();
        store.close().await?;

        assert!(err.to_string().contains("title"), "{err}");
        Ok(())
    }

    #[sqlx::test(migrations = false, fixtures("jobs"))]
    #[ignore = "requires DATABASE_URL"]
    async fn list_returns_open_rows_in_id_order(pool: PgPool) -> sqlx::Result<()> {
        let mut store = store(&pool).await?;

        let rows = store.list_open().await?;
        store.close().await?;

        let titles: Vec<&str> = rows.iter().map(|row| row.title.as_str()).collect();
        assert_eq!(titles, vec!["Engineer", "Analyst"]);
        assert!(rows.iter().all(|row| row.status == "open"));
        Ok(())
    }

    #[sqlx::test(migrations = false, fixtures("jobs"))]
    #[ignore = "requires DATABASE_URL"]
    async fn update_coalesces_absent_fields(pool: PgPool) -> sqlx::Result<()> {
        let mut store = store(&pool).await?;
        let changes = JobChanges {
            status: Some("closed".to_string()),
            ..JobChanges::default()
        };

        let row = store.update("1", &changes).await?.expect("job 1 exists");
        store.close().await?;

        assert_eq!(row.title, "Engineer");
        assert_eq!(row.description.as_deref(), Some("Build things"));
        assert_eq!(row.status, "closed");
        Ok(())
    }

    #[sqlx::test(migrations = false, fixtures("jobs"))]
    #[ignore = "requires DATABASE_URL"]
    async fn update_of_missing_job_returns_none(pool: PgPool) -> sqlx::Result<()> {
        let mut store = store(&pool).await?;

        let row = store.update("999", &JobChanges::default()).await?;
        store.close().await?;

        assert_eq!(row, None);
        Ok(())
    }

    #[sqlx::test(migrations = false, fixtures("jobs"))]
    #[ignore = "requires DATABASE_URL"]
    async fn delete_of_missing_job_removes_nothing(pool: PgPool) -> sqlx::Result<()> {
        let mut store = store(&pool).await?;

        assert_eq!(store.delete("999").await?, 0);
        assert_eq!(store.delete("1").await?, 1);
        store.close().await?;
        Ok(())
    }

    #[sqlx::test(migrations = false, fixtures("jobs"))]
    #[ignore = "requires DATABASE_URL"]
    async fn non_integer_id_is_rejected_by_cast(pool: PgPool) -> sqlx::Result<()> {
        let mut store = store(&pool).await?;

        let err = store.delete("abc").await.unwrap_err();
        store.close().await?;

        assert!(err.to_string().contains("integer"), "{err}");
        Ok(())
    }
}
