//! Tokio plumbing for running a pulse from synchronous code
//!
//! [block_on] drives a future on a current thread runtime, which is all the event loop needs as
//! probes spend their time waiting on the network. [cancel_on_signal] turns process signals
//! into a [CancellationToken] so the loop stops the same way it does on a user quit.

use futures::Future;
use log::info;
use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;

use crate::error::PulseError;

/// Run `future` to completion on a fresh current thread runtime
pub fn block_on<F, T>(future: F) -> Result<T, PulseError>
where
    F: Future<Output = Result<T, PulseError>>,
{
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    rt.block_on(future)
}

/// Cancel `cancel` on SIGTERM, SIGHUP or SIGINT. Returns early if the token is cancelled
/// elsewhere first.
pub async fn cancel_on_signal(cancel: CancellationToken) -> Result<(), PulseError> {
    let mut sig_terminate = signal(SignalKind::terminate())?;
    let mut sig_hup = signal(SignalKind::hangup())?;
    let mut sig_int = signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = cancel.cancelled() => return Ok(()),
        _ = sig_terminate.recv() => info!("Received TERM signal"),
        _ = sig_hup.recv() => info!("Received HUP signal"),
        _ = sig_int.recv() => info!("Received INT signal"),
    };

    cancel.cancel();
    Ok(())
}
