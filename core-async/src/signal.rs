//! Process interrupt signals.
//!
//! [`shutdown_signal`] resolves on the first Ctrl-C, or on SIGTERM where the
//! platform has it. Sync runs select on it to stop cooperatively.

/// The kind of interrupt that was received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    CtrlC,
    Terminate,
}

impl std::fmt::Display for Interrupt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Interrupt::CtrlC => write!(f, "SIGINT"),
            Interrupt::Terminate => write!(f, "SIGTERM"),
        }
    }
}

/// Resolves when the process is asked to stop.
///
/// If a signal handler cannot be installed the corresponding branch never
/// resolves, so the remaining branch still works.
pub async fn shutdown_signal() -> Interrupt {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => Interrupt::CtrlC,
            Err(_) => std::future::pending().await,
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                Interrupt::Terminate
            }
            Err(_) => std::future::pending().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Interrupt>();

    tokio::select! {
        interrupt = ctrl_c => interrupt,
        interrupt = terminate => interrupt,
    }
}
