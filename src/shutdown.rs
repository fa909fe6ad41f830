use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;

/// Token cancelled on SIGTERM or SIGINT.
///
/// The API server drains on cancellation and in-flight status reconciliations
/// are abandoned without touching the cache.
pub fn install_shutdown_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();

    tokio::spawn(async move {
        let name = wait_for_signal().await;
        tracing::info!(signal = name, "Shutting down sidecar");
        trigger.cancel();
    });

    token
}

/// Resolve on the first termination signal, returning its name.
async fn wait_for_signal() -> &'static str {
    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = %e, "SIGTERM handler unavailable, waiting for Ctrl-C only");
            let _ = tokio::signal::ctrl_c().await;
            return "SIGINT";
        }
    };

    tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = tokio::signal::ctrl_c() => "SIGINT",
    }
}
