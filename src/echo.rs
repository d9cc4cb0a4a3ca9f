//! Bindings for the `Echo` interface.
//!
//! Hand-maintained in the shape a binding generator would emit: a typed
//! client proxy, a server trait plus stub, and the interface's static
//! descriptor. The positional argument order used by both halves is exactly
//! the order [`echo_desc`] declares.

use crate::{
    binding::{CallError, Caller, DispatchError, ServerCall, ServiceError, ServiceStub},
    context::Context,
    descriptor::InterfaceDesc,
    glob::{GlobState, Globber},
    interface_desc,
    types::{Decode, DecodeError, Encode, Value},
};
use futures::future::BoxFuture;
use std::sync::{Arc, OnceLock};

/// The interface's static descriptor. Identical on every call; ordering is
/// stable for callers that diff or version it.
pub fn echo_desc() -> &'static InterfaceDesc {
    static DESC: OnceLock<InterfaceDesc> = OnceLock::new();
    DESC.get_or_init(|| {
        interface_desc! {
            interface Echo ("stubcall/echo") {
                method Echo(msg: "string") -> (value: "string");
            }
        }
    })
}

/// Typed client proxy for `Echo`.
///
/// Stateless apart from the target name and the transport handle, so it can
/// be shared across tasks; one invocation is exactly one transport round
/// trip.
#[derive(Clone)]
pub struct EchoClient {
    caller: Arc<dyn Caller>,
    name: String,
}

impl EchoClient {
    pub fn new(caller: Arc<dyn Caller>, name: impl Into<String>) -> Self {
        Self {
            caller,
            name: name.into(),
        }
    }

    /// Target name calls are addressed to.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn echo(&self, ctx: &Context, msg: String) -> Result<String, CallError> {
        let args = vec![msg.encode()];
        let out = self.caller.call(ctx, &self.name, "Echo", args).await?;
        let [value] =
            <[Value; 1]>::try_from(out).map_err(|out| DecodeError::arity(1, out.len()))?;
        Ok(String::decode(value)?)
    }
}

/// What a server author implements for `Echo`.
pub trait EchoMethods: Globber + Send + Sync {
    fn echo<'a>(
        &'a self,
        ctx: &'a Context,
        call: &'a ServerCall,
        msg: String,
    ) -> BoxFuture<'a, Result<String, ServiceError>>;
}

/// Server stub wrapping one `EchoMethods` implementation for its whole
/// lifetime.
pub struct EchoServerStub<T> {
    inner: T,
    gs: Option<GlobState>,
}

/// Wraps `inner` for serving.
///
/// The browse capability is resolved here, once: the stub itself is probed
/// before the implementation it wraps (see [`GlobState::resolve`]).
pub fn echo_server<T: EchoMethods>(inner: T) -> EchoServerStub<T> {
    let mut stub = EchoServerStub { inner, gs: None };
    stub.gs = GlobState::resolve(&stub, &stub.inner);
    stub
}

// Echo declares no browse method of its own, so the stub offers nothing and
// resolution falls through to the wrapped implementation.
impl<T> Globber for EchoServerStub<T> {}

impl<T: EchoMethods> EchoMethods for EchoServerStub<T> {
    fn echo<'a>(
        &'a self,
        ctx: &'a Context,
        call: &'a ServerCall,
        msg: String,
    ) -> BoxFuture<'a, Result<String, ServiceError>> {
        self.inner.echo(ctx, call, msg)
    }
}

impl<T: EchoMethods> ServiceStub for EchoServerStub<T> {
    fn describe(&self) -> Vec<InterfaceDesc> {
        vec![echo_desc().clone()]
    }

    fn globber(&self) -> Option<&GlobState> {
        self.gs.as_ref()
    }

    fn dispatch<'a>(
        &'a self,
        ctx: &'a Context,
        call: &'a ServerCall,
        args: Vec<Value>,
    ) -> BoxFuture<'a, Result<Vec<Value>, DispatchError>> {
        Box::pin(async move {
            match call.method() {
                "Echo" => {
                    let [msg] = <[Value; 1]>::try_from(args).map_err(|args| {
                        DispatchError::invalid_argument("Echo", DecodeError::arity(1, args.len()))
                    })?;
                    let msg = String::decode(msg)
                        .map_err(|err| DispatchError::invalid_argument("Echo", err))?;
                    let value = self.inner.echo(ctx, call, msg).await?;
                    Ok(vec![value.encode()])
                }
                other => Err(DispatchError::UnknownMethod(other.to_owned())),
            }
        })
    }
}
