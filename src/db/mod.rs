pub mod connection;
pub mod job_repository;
pub mod models;

#[cfg(test)]
pub mod memory;

pub use job_repository::{Connector, JobStore, PgConnector};
