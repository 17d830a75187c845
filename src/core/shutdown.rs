//! # OS shutdown-signal handling.
//!
//! Provides [`wait_for_shutdown_signal`], an async helper that completes when
//! the process receives a termination request. The dispatch loop selects on it
//! while waiting for protocol events, so an operator can interrupt a run and
//! still get workers cancelled and unwound within the grace period.

/// Waits for a termination signal (`SIGINT`/`SIGTERM` on Unix, plus the
/// Ctrl-C handler as a fallback).
///
/// Each call registers independent listeners. Returns `Err` only if signal
/// registration fails.
#[cfg(unix)]
pub(crate) async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigint.recv() => {}
        _ = sigterm.recv() => {}
    }
    Ok(())
}

/// Waits for Ctrl-C on non-Unix platforms.
#[cfg(not(unix))]
pub(crate) async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
