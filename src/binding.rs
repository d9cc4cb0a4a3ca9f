use crate::{
    context::Context,
    descriptor::InterfaceDesc,
    glob::GlobState,
    types::{DecodeError, Value},
};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::{io, sync::Arc};
use thiserror::Error;

/// Client-side transport seam: one generic, name-addressed call primitive.
///
/// Typed client proxies encode their arguments in declared order and hand
/// them to [`call`](Caller::call); a single invocation maps to exactly one
/// transport round trip, with no retries and no caching.
pub trait Caller: Send + Sync {
    fn call<'a>(
        &'a self,
        ctx: &'a Context,
        name: &'a str,
        method: &'a str,
        args: Vec<Value>,
    ) -> BoxFuture<'a, Result<Vec<Value>, CallError>>;
}

/// Call metadata handed to stub dispatch alongside the context.
#[derive(Debug, Clone)]
pub struct ServerCall {
    target: String,
    method: String,
}

impl ServerCall {
    pub fn new(target: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            method: method.into(),
        }
    }

    /// Transport-level name the call was addressed to.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Method name, matched case-sensitively against the descriptor.
    pub fn method(&self) -> &str {
        &self.method
    }
}

/// Server-side face of a generated binding, as the dispatch loop sees it.
///
/// A stub wraps exactly one implementation instance for its whole lifetime
/// and shares nothing with other stubs.
pub trait ServiceStub: Send + Sync {
    /// Structural self-description. Always the interface's static
    /// descriptor, with stable ordering across calls.
    fn describe(&self) -> Vec<InterfaceDesc>;

    /// The namespace-browsing capability resolved at construction, if any.
    fn globber(&self) -> Option<&GlobState>;

    /// Decodes `args` positionally, invokes the wrapped implementation, and
    /// encodes its result. No validation beyond the argument frame, no
    /// retries.
    fn dispatch<'a>(
        &'a self,
        ctx: &'a Context,
        call: &'a ServerCall,
        args: Vec<Value>,
    ) -> BoxFuture<'a, Result<Vec<Value>, DispatchError>>;
}

impl<S: ServiceStub + ?Sized> ServiceStub for Arc<S> {
    fn describe(&self) -> Vec<InterfaceDesc> {
        (**self).describe()
    }

    fn globber(&self) -> Option<&GlobState> {
        (**self).globber()
    }

    fn dispatch<'a>(
        &'a self,
        ctx: &'a Context,
        call: &'a ServerCall,
        args: Vec<Value>,
    ) -> BoxFuture<'a, Result<Vec<Value>, DispatchError>> {
        (**self).dispatch(ctx, call, args)
    }
}

/// Connection-level failure, including the expected "closed" case.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection closed")]
    Closed,

    #[error("context cancelled")]
    Cancelled,

    #[error("deadline exceeded")]
    DeadlineExceeded,

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl TransportError {
    /// Expected shutdown, as opposed to a genuine fault. Affects what gets
    /// logged, never how the dispatch loop terminates.
    pub fn is_closed(&self) -> bool {
        match self {
            TransportError::Closed => true,
            TransportError::Io(err) => matches!(
                err.kind(),
                io::ErrorKind::UnexpectedEof
                    | io::ErrorKind::BrokenPipe
                    | io::ErrorKind::ConnectionReset
            ),
            _ => false,
        }
    }
}

/// The single failure kind surfaced by typed proxy invocations.
///
/// The proxy performs no error translation: transport and decode failures
/// arrive verbatim, and a dispatch failure reported by the peer is passed
/// through unchanged in [`Remote`](CallError::Remote).
#[derive(Debug, Error)]
pub enum CallError {
    #[error("transport: {0}")]
    Transport(#[from] TransportError),

    #[error("decode: {0}")]
    Decode(#[from] DecodeError),

    #[error("remote: {0}")]
    Remote(DispatchError),
}

/// Failure raised by a service implementation, carried back over the wire
/// verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{0}")]
pub struct ServiceError(pub String);

impl ServiceError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

impl From<&str> for ServiceError {
    fn from(msg: &str) -> Self {
        Self(msg.to_owned())
    }
}

impl From<CallError> for ServiceError {
    fn from(err: CallError) -> Self {
        Self(err.to_string())
    }
}

/// Errors produced while routing one incoming call through a stub.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum DispatchError {
    #[error("interface has no method named {0:?}")]
    UnknownMethod(String),

    #[error("arguments of {method}: {source}")]
    InvalidArgument {
        method: String,
        #[source]
        source: DecodeError,
    },

    #[error("no browse capability")]
    NotBrowsable,

    #[error("service: {0}")]
    Service(#[from] ServiceError),
}

impl DispatchError {
    pub fn invalid_argument(method: impl Into<String>, source: DecodeError) -> Self {
        DispatchError::InvalidArgument {
            method: method.into(),
            source,
        }
    }
}
