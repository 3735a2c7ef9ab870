use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer, filter::LevelFilter};

mod api;
use crate::api::{
    job::{event::ApiGatewayEvent, handlers::{job_config, INVOCATION_PATH}, JobService},
    validation,
};
mod cli;
mod config;
mod db;
mod shutdown;
use crate::cli::{Cli, Command};
use crate::db::PgConnector;
use crate::shutdown::ShutdownCoordinator;

/// Console output plus daily rotating info and error files in `log_dir`
fn init_logging(log_dir: &str) {
    std::fs::create_dir_all(log_dir)
        .expect("Failed to create logs directory");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());

    // logs/info.log.2026-10-19, logs/error.log.2026-10-19
    let info_file = tracing_appender::rolling::daily(log_dir, "info.log");
    let error_file = tracing_appender::rolling::daily(log_dir, "error.log");

    let info_layer = tracing_subscriber::fmt::layer()
        .with_writer(info_file)
        .with_ansi(false)
        .with_filter(LevelFilter::INFO);

    let error_layer = tracing_subscriber::fmt::layer()
        .with_writer(error_file)
        .with_ansi(false)
        .with_filter(LevelFilter::ERROR);

    // Stderr keeps stdout clean for `invoke` output
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(info_layer)
        .with(error_layer)
        .init();
}

/// Handle one event from a file and print the response descriptor
async fn invoke_once(service: &JobService, event_path: &std::path::Path) -> std::io::Result<()> {
    let raw = std::fs::read_to_string(event_path)?;
    let event: ApiGatewayEvent = serde_json::from_str(&raw)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

    let (request, caller) = event.into_parts();
    let response = service.handle(request, &caller).await;

    let rendered = serde_json::to_string_pretty(&response)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    println!("{}", rendered);
    Ok(())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let cli = Cli::parse();

    // Configuration is read once and injected; invocations never touch the environment
    let config = config::Config::from_env()
        .expect("Failed to load configuration");

    init_logging(&config.log_dir);

    info!("Configuration loaded successfully:");
    info!("  - Database: {}@{}/{}", config.db.user, config.db.host, config.db.name);
    info!("  - Connection: one per invocation, TLS required");

    let service = JobService::new(Arc::new(PgConnector::new(config.db.clone())));

    if let Some(Command::Invoke { event }) = &cli.command {
        return invoke_once(&service, event).await;
    }

    info!("Starting ats-job-service");

    let server_service = web::Data::new(service);
    let server = HttpServer::new(move || {
        App::new()
            .app_data(server_service.clone())
            .app_data(validation::json_config())
            .configure(job_config)
    });

    info!(
        "Serving invocations on http://{}:{}{}",
        config.server_host, config.server_port, INVOCATION_PATH
    );

    let server = server
        .bind((config.server_host.as_str(), config.server_port))?
        .run();

    let server_handle = server.handle();
    let server_task = tokio::spawn(server);

    ShutdownCoordinator::new(server_handle, server_task)
        .wait_for_shutdown()
        .await
}
