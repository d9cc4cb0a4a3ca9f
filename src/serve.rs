use crate::{
    binding::{ServiceStub, TransportError},
    types::DecodeError,
};
use futures::future::BoxFuture;
use thiserror::Error;
use tracing::{debug, warn};

/// One accepted transport connection feeding calls to a single stub.
pub trait StubConn: Send {
    /// Receives the next incoming call, routes it through `stub`, and writes
    /// the reply back. Suspends until a call arrives or the connection
    /// closes.
    fn serve_next<'a>(
        &'a mut self,
        stub: &'a dyn ServiceStub,
    ) -> BoxFuture<'a, Result<(), ServeError>>;
}

/// Terminal cause of a dispatch loop.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("transport: {0}")]
    Transport(#[from] TransportError),

    #[error("decode: {0}")]
    Decode(#[from] DecodeError),
}

impl ServeError {
    /// True for the expected peer-went-away shutdown.
    pub fn is_closed(&self) -> bool {
        matches!(self, ServeError::Transport(err) if err.is_closed())
    }
}

/// Dispatch loop for one connection: serves calls until the first error.
///
/// Any error from the receive/handle step ends the loop; there is no retry.
/// The error kind only picks the log line: a closed transport is an expected
/// shutdown, anything else is reported as a fault. Each loop runs as its own
/// task, independent of every other connection's loop.
pub async fn serve<C, S>(mut conn: C, stub: S) -> ServeError
where
    C: StubConn,
    S: ServiceStub + 'static,
{
    loop {
        if let Err(err) = conn.serve_next(&stub).await {
            if err.is_closed() {
                debug!("connection closed");
            } else {
                warn!("serving connection: {err}");
            }
            return err;
        }
    }
}
