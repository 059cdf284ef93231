//! Shutdown signal for the HTTP server
//!
//! Once SIGINT or SIGTERM arrives the server stops accepting connections.
//! Submissions already in flight finish, so no upload is left without its
//! record.

use std::fmt;

use tokio::signal;
use tracing::{error, info};

/// Signal that asked the process to stop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopSignal {
    Interrupt,
    Terminate,
}

impl fmt::Display for StopSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopSignal::Interrupt => write!(f, "SIGINT"),
            StopSignal::Terminate => write!(f, "SIGTERM"),
        }
    }
}

/// Resolve once the process is asked to stop. Pass to
/// `axum::serve(..).with_graceful_shutdown`.
pub async fn shutdown_signal() {
    let signal = wait_for_stop_signal().await;
    info!(%signal, "Shutdown requested; refusing new connections and draining in-flight submissions");
}

async fn wait_for_stop_signal() -> StopSignal {
    let interrupt = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Cannot listen for SIGINT");
            std::future::pending::<()>().await;
        }
        StopSignal::Interrupt
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
        StopSignal::Terminate
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<StopSignal>();

    tokio::select! {
        signal = interrupt => signal,
        signal = terminate => signal,
    }
}
