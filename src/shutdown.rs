use actix_web::dev::ServerHandle;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Stops the invocation server on CTRL+C or SIGTERM
///
/// No connections outlive an invocation, so stopping the server and waiting
/// for in-flight invocations is the whole shutdown.
pub struct ShutdownCoordinator {
    server_handle: ServerHandle,
    server_task: JoinHandle<Result<(), std::io::Error>>,
}

impl ShutdownCoordinator {
    pub fn new(
        server_handle: ServerHandle,
        server_task: JoinHandle<Result<(), std::io::Error>>,
    ) -> Self {
        Self {
            server_handle,
            server_task,
        }
    }

    /// Wait for a shutdown signal, then stop the server gracefully
    pub async fn wait_for_shutdown(self) -> Result<(), std::io::Error> {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
        #[cfg(unix)]
        let terminate = sigterm.recv();

        #[cfg(not(unix))]
        let terminate = std::future::pending::<Option<()>>();

        tokio::select! {
            result = ctrl_c => {
                result?;
                info!("Received CTRL+C signal, initiating graceful shutdown...");
            }
            _ = terminate => {
                info!("Received SIGTERM signal, initiating graceful shutdown...");
            }
        }

        self.shutdown().await
    }

    async fn shutdown(self) -> Result<(), std::io::Error> {
        info!("Stopping invocation server (finishing in-flight invocations)...");
        self.server_handle.stop(true).await;

        match self.server_task.await {
            Ok(Ok(())) => info!("Invocation server shut down successfully"),
            Ok(Err(e)) => {
                error!("Invocation server encountered error during shutdown: {:?}", e);
                return Err(e);
            }
            Err(e) => error!("Invocation server task panicked: {:?}", e),
        }

        info!("Graceful shutdown completed");
        Ok(())
    }
}
