//! OS signal handling.
//!
//! # Responsibilities
//! - Wait for SIGINT (Ctrl+C) or SIGTERM
//! - Translate the signal into a `Shutdown` trigger
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - On non-unix targets only Ctrl+C is observed

use crate::lifecycle::shutdown::Shutdown;

/// Signal that requested termination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationSignal {
    Interrupt,
    Terminate,
}

impl std::fmt::Display for TerminationSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TerminationSignal::Interrupt => write!(f, "SIGINT"),
            TerminationSignal::Terminate => write!(f, "SIGTERM"),
        }
    }
}

/// Block until the host asks the process to terminate.
#[cfg(unix)]
pub async fn wait_for_termination() -> std::io::Result<TerminationSignal> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        res = tokio::signal::ctrl_c() => res.map(|()| TerminationSignal::Interrupt),
        _ = terminate.recv() => Ok(TerminationSignal::Terminate),
    }
}

/// Block until the host asks the process to terminate.
#[cfg(not(unix))]
pub async fn wait_for_termination() -> std::io::Result<TerminationSignal> {
    tokio::signal::ctrl_c().await?;
    Ok(TerminationSignal::Interrupt)
}

/// Trigger `shutdown` on the first termination signal.
///
/// If the handlers cannot be installed the error is logged and shutdown is
/// never triggered by a signal.
pub async fn trigger_on_termination(shutdown: Shutdown) {
    match wait_for_termination().await {
        Ok(signal) => {
            tracing::info!(%signal, "Termination signal received");
            shutdown.trigger();
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to install signal handlers");
            std::future::pending::<()>().await;
        }
    }
}
