pub mod client;
pub mod server;

use crate::{
    binding::{CallError, DispatchError, TransportError},
    descriptor::InterfaceDesc,
    serve::ServeError,
    types::{DecodeError, Value},
};
use serde::{Deserialize, Serialize};

/// One frame from client to server.
#[derive(Serialize, Deserialize, Debug)]
pub(crate) enum Request {
    /// Invoke `method` on the stub serving `name`, with positional args.
    Call {
        name: String,
        method: String,
        args: Vec<Value>,
    },
    /// Ask the stub for its interface descriptors.
    Describe,
    /// Browse the stub's namespace, if it offers the capability.
    Glob { pattern: String },
}

/// One frame from server to client.
#[derive(Serialize, Deserialize, Debug)]
pub(crate) enum Response {
    Call(Result<Vec<Value>, DispatchError>),
    Describe(Vec<InterfaceDesc>),
    Glob(Result<Vec<String>, DispatchError>),
}

/// A codec-stream failure split into its transport and decode halves: I/O
/// problems are connection-level, anything else means the peer sent a frame
/// of unexpected shape.
pub(crate) enum WireFault {
    Transport(TransportError),
    Decode(DecodeError),
}

pub(crate) fn classify(err: bincode::Error) -> WireFault {
    match *err {
        bincode::ErrorKind::Io(io) => WireFault::Transport(TransportError::Io(io)),
        other => WireFault::Decode(DecodeError::Wire(other.to_string())),
    }
}

impl From<WireFault> for CallError {
    fn from(fault: WireFault) -> Self {
        match fault {
            WireFault::Transport(err) => CallError::Transport(err),
            WireFault::Decode(err) => CallError::Decode(err),
        }
    }
}

impl From<WireFault> for ServeError {
    fn from(fault: WireFault) -> Self {
        match fault {
            WireFault::Transport(err) => ServeError::Transport(err),
            WireFault::Decode(err) => ServeError::Decode(err),
        }
    }
}
