use super::{classify, Request, Response};
use crate::{
    binding::{DispatchError, ServerCall, ServiceStub, TransportError},
    context::Context,
    serve::{serve, ServeError, StubConn},
};
use async_bincode::{tokio::AsyncBincodeStream, AsyncDestination};
use futures::{future::BoxFuture, SinkExt, StreamExt};
use std::{
    collections::HashMap,
    io,
    net::{Ipv4Addr, SocketAddr},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
};
use tokio::{
    io::BufStream,
    net::{TcpListener, TcpStream},
    task,
};
use tracing::{debug, warn};

/// Builds one stub per accepted connection. Returning `None` refuses the
/// connection.
pub trait StubFactory: Send + Sync + 'static {
    fn create_stub(&self, peer: SocketAddr) -> Option<Arc<dyn ServiceStub>>;
}

impl<F> StubFactory for F
where
    F: Fn(SocketAddr) -> Option<Arc<dyn ServiceStub>> + Send + Sync + 'static,
{
    fn create_stub(&self, peer: SocketAddr) -> Option<Arc<dyn ServiceStub>> {
        self(peer)
    }
}

/// Registry of stubs with a live dispatch loop.
///
/// Owned by the accept loop and dropped with it, so entries can never
/// outlive the server that accepted their connections.
#[derive(Default)]
pub struct StubRegistry {
    stubs: Mutex<HashMap<u64, Arc<dyn ServiceStub>>>,
    next_id: AtomicU64,
}

impl StubRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, stub: Arc<dyn ServiceStub>) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut stubs = match self.stubs.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        stubs.insert(id, stub);
        id
    }

    pub fn deregister(&self, id: u64) {
        let mut stubs = match self.stubs.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        stubs.remove(&id);
    }

    pub fn len(&self) -> usize {
        let stubs = match self.stubs.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        stubs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Accept loop: one stub and one dispatch loop per accepted connection.
///
/// Loops run as independent tasks; one terminating, for any reason, leaves
/// every other loop untouched.
pub struct Server<F> {
    factory: F,
}

impl<F: StubFactory> Server<F> {
    pub fn new(factory: F) -> Self {
        Self { factory }
    }

    pub async fn serve_tcp(self, port: u16) -> io::Result<()> {
        let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).await?;
        self.serve_on(listener).await
    }

    pub async fn serve_on(self, listener: TcpListener) -> io::Result<()> {
        let registry = Arc::new(StubRegistry::new());
        loop {
            let (sock, peer) = listener.accept().await?;
            let Some(stub) = self.factory.create_stub(peer) else {
                warn!("refusing connection from {peer}");
                continue;
            };
            debug!("accepted connection from {peer}");
            let id = registry.register(stub.clone());
            let registry = registry.clone();
            task::spawn(async move {
                serve(TcpStubConn::new(sock), stub).await;
                registry.deregister(id);
            });
        }
    }
}

type ServerWire = AsyncBincodeStream<BufStream<TcpStream>, Request, Response, AsyncDestination>;

/// Server half of one accepted connection.
pub struct TcpStubConn {
    stream: ServerWire,
}

impl TcpStubConn {
    pub fn new(sock: TcpStream) -> Self {
        Self {
            stream: AsyncBincodeStream::from(BufStream::new(sock)).for_async(),
        }
    }

    async fn handle(&mut self, stub: &dyn ServiceStub, req: Request) -> Result<(), ServeError> {
        let ctx = Context::background();
        let resp = match req {
            Request::Call { name, method, args } => {
                let call = ServerCall::new(name, method);
                Response::Call(stub.dispatch(&ctx, &call, args).await)
            }
            Request::Describe => Response::Describe(stub.describe()),
            Request::Glob { pattern } => Response::Glob(match stub.globber() {
                Some(gs) => gs.glob(&ctx, &pattern).map_err(DispatchError::Service),
                None => Err(DispatchError::NotBrowsable),
            }),
        };
        self.stream.send(resp).await.map_err(|err| classify(err).into())
    }
}

impl StubConn for TcpStubConn {
    fn serve_next<'a>(
        &'a mut self,
        stub: &'a dyn ServiceStub,
    ) -> BoxFuture<'a, Result<(), ServeError>> {
        Box::pin(async move {
            let req = match self.stream.next().await {
                None => return Err(TransportError::Closed.into()),
                Some(Err(err)) => return Err(classify(err).into()),
                Some(Ok(req)) => req,
            };
            self.handle(stub, req).await
        })
    }
}
