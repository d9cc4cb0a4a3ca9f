//! Application glue: host lifecycle hooks and the echo relay service.
//!
//! The relay serves `Echo` locally by forwarding each message to a remote
//! echo server through the typed client proxy. Before any call is issued it
//! bootstraps trust from a peer-supplied credential blob and resolves the
//! relay target, both via the host's lookup service.

use crate::{
    binding::{ServerCall, ServiceError, ServiceStub},
    context::Context,
    echo::{echo_server, EchoClient, EchoMethods},
    glob::Globber,
    net::client::TcpCaller,
    net::server::StubFactory,
    security::{decode_blessings, BootstrapError, Principal},
};
use futures::future::{ready, BoxFuture};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// A failed query against the local lookup service.
#[derive(Debug, Clone, Error)]
#[error("lookup: {0}")]
pub struct LookupError(pub String);

impl LookupError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// The local lookup service the host connects at startup.
///
/// Each query is a single round trip with no retry; failure of either is
/// fatal to initialization.
pub trait LookupService: Send + Sync {
    /// Address of the remote echo server.
    fn target_address(&self) -> BoxFuture<'_, Result<String, LookupError>>;

    /// Encoded credential blob to be decoded and trusted at startup.
    fn credential_blob(&self) -> BoxFuture<'_, Result<Vec<u8>, LookupError>>;
}

/// Fixed-answer lookup service, for hosts that learn both values up front.
pub struct StaticLookup {
    target: String,
    blob: Vec<u8>,
}

impl StaticLookup {
    pub fn new(target: impl Into<String>, blob: Vec<u8>) -> Self {
        Self {
            target: target.into(),
            blob,
        }
    }
}

impl LookupService for StaticLookup {
    fn target_address(&self) -> BoxFuture<'_, Result<String, LookupError>> {
        Box::pin(ready(Ok(self.target.clone())))
    }

    fn credential_blob(&self) -> BoxFuture<'_, Result<Vec<u8>, LookupError>> {
        Box::pin(ready(Ok(self.blob.clone())))
    }
}

/// What the host hands each delegate at startup.
pub struct HostContext {
    lookup: Arc<dyn LookupService>,
}

impl HostContext {
    pub fn new(lookup: Arc<dyn LookupService>) -> Self {
        Self { lookup }
    }

    pub fn lookup(&self) -> &dyn LookupService {
        &*self.lookup
    }
}

/// Startup failure surfaced to the host, which decides whether to abort.
#[derive(Debug, Error)]
pub enum InitError {
    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),
}

/// Lifecycle hooks a host application drives: initialize once, then
/// accept/create per connection, quit at shutdown.
pub trait Delegate: Send {
    /// Credential bootstrap plus session-state resolution. Runs before any
    /// call is issued; an error aborts startup.
    fn on_initialize<'a>(
        &'a mut self,
        host: &'a HostContext,
    ) -> BoxFuture<'a, Result<(), InitError>>;

    /// Observes an accepted connection before its stub exists.
    fn on_accept_connection(&self, _peer: &str) {}

    /// Builds the stub that will serve one connection; the host starts its
    /// dispatch loop as an independent task. `None` refuses the connection
    /// (only possible before a successful initialize).
    fn on_create_connection(&self) -> Option<Arc<dyn ServiceStub>>;

    /// Shutdown notification. Nothing to flush here.
    fn on_quit(&mut self) {}
}

/// Serves `Echo` by relaying each message to the remote echo server and
/// handing back exactly what it returned.
struct RelayEcho {
    ctx: Context,
    client: EchoClient,
}

impl Globber for RelayEcho {}

impl EchoMethods for RelayEcho {
    fn echo<'a>(
        &'a self,
        _ctx: &'a Context,
        _call: &'a ServerCall,
        msg: String,
    ) -> BoxFuture<'a, Result<String, ServiceError>> {
        Box::pin(async move {
            debug!("relaying echo to {}", self.client.name());
            let value = self.client.echo(&self.ctx, msg.clone()).await?;
            if value != msg {
                return Err(ServiceError::new(format!(
                    "echo target returned {value:?} for {msg:?}"
                )));
            }
            Ok(value)
        })
    }
}

/// The echo relay application.
///
/// Holds the process principal and, once initialized, the typed client proxy
/// addressing the remote echo server.
pub struct EchoRelayApp {
    ctx: Context,
    principal: Arc<Principal>,
    client: Option<EchoClient>,
}

impl EchoRelayApp {
    pub fn new() -> Self {
        let principal = Arc::new(Principal::new());
        Self {
            ctx: Context::background().with_principal(principal.clone()),
            principal,
            client: None,
        }
    }

    pub fn principal(&self) -> &Arc<Principal> {
        &self.principal
    }

    /// Resolved relay target, once initialized.
    pub fn target(&self) -> Option<&str> {
        self.client.as_ref().map(EchoClient::name)
    }
}

impl Default for EchoRelayApp {
    fn default() -> Self {
        Self::new()
    }
}

impl Delegate for EchoRelayApp {
    fn on_initialize<'a>(
        &'a mut self,
        host: &'a HostContext,
    ) -> BoxFuture<'a, Result<(), InitError>> {
        Box::pin(async move {
            debug!("initializing");
            let blob = host.lookup().credential_blob().await?;
            let blessings = decode_blessings(&blob)?;
            info!("trusting blessings rooted at {}", blessings.root());
            self.principal.add_to_roots(blessings);

            let target = host.lookup().target_address().await?;
            let addr: SocketAddr = target
                .parse()
                .map_err(|_| LookupError::new(format!("bad target address {target:?}")))?;
            debug!("resolved echo target {target}");
            self.client = Some(EchoClient::new(Arc::new(TcpCaller::new(addr)), target));
            Ok(())
        })
    }

    fn on_accept_connection(&self, peer: &str) {
        debug!("accepted connection from {peer}");
    }

    fn on_create_connection(&self) -> Option<Arc<dyn ServiceStub>> {
        let client = self.client.clone()?;
        Some(Arc::new(echo_server(RelayEcho {
            ctx: self.ctx.clone(),
            client,
        })))
    }

    fn on_quit(&mut self) {
        debug!("quit");
    }
}

/// Bridges an initialized delegate into the accept loop's stub factory,
/// driving the accept and create hooks for every connection.
pub fn delegate_factory<D>(delegate: Arc<D>) -> impl StubFactory
where
    D: Delegate + Sync + 'static,
{
    move |peer: SocketAddr| {
        delegate.on_accept_connection(&peer.to_string());
        delegate.on_create_connection()
    }
}
