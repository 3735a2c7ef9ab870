pub mod dto;
pub mod event;
pub mod handlers;
pub mod models;
pub mod service;

// Re-export commonly used types
pub use models::{JobChanges, NewJob, OPEN_STATUS};
pub use service::JobService;
