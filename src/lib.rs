//! Typed interface bindings over a generic, name-addressed RPC transport.
//!
//! An interface is declared once as a static [`InterfaceDesc`] table plus a
//! hand-written binding pair (see [`echo`] for the canonical one): a typed
//! client proxy that marshals each call onto [`Caller`], and a server stub
//! that dispatches incoming generic calls to a user implementation while
//! answering introspection ([`ServiceStub::describe`]) and optional
//! namespace browsing ([`glob`]). [`serve::serve`] runs one dispatch loop per
//! accepted connection; [`net`] provides the TCP transport; [`app`] wires
//! the host lifecycle, including the one-shot credential bootstrap in
//! [`security`].

pub mod app;
pub mod binding;
pub mod context;
pub mod descriptor;
pub mod echo;
pub mod glob;
mod macros;
pub mod net;
pub mod security;
pub mod serve;
pub mod types;

pub use binding::{
    CallError, Caller, DispatchError, ServerCall, ServiceError, ServiceStub, TransportError,
};
pub use context::Context;
pub use descriptor::{ArgDesc, InterfaceDesc, MethodDesc};
pub use glob::{ChildrenGlobber, GlobState, Globber};
pub use security::{decode_blessings, Blessings, BootstrapError, Principal};
pub use serve::{serve, ServeError, StubConn};
pub use types::{Decode, DecodeError, Encode, Value};
