use futures::future::{ready, BoxFuture};
use std::{net::SocketAddr, sync::Arc};
use stubcall::{
    app::{delegate_factory, Delegate, EchoRelayApp, HostContext, StaticLookup},
    echo::{echo_server, EchoClient, EchoMethods},
    net::client::TcpCaller,
    net::server::{Server, StubFactory},
    Blessings, Context, Globber, ServerCall, ServiceError, ServiceStub,
};
use tokio::{net::TcpListener, task};

struct Echoer;

impl Globber for Echoer {}

impl EchoMethods for Echoer {
    fn echo<'a>(
        &'a self,
        _ctx: &'a Context,
        _call: &'a ServerCall,
        msg: String,
    ) -> BoxFuture<'a, Result<String, ServiceError>> {
        Box::pin(ready(Ok(msg)))
    }
}

async fn spawn_server<F: StubFactory>(factory: F) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    task::spawn(Server::new(factory).serve_on(listener));
    addr
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt::init();

    // The remote echo server the relay will forward to.
    let echo_addr = spawn_server(|_peer: SocketAddr| {
        Some(Arc::new(echo_server(Echoer)) as Arc<dyn ServiceStub>)
    })
    .await;

    // What the host's lookup service hands the delegate at startup.
    let blessings = Blessings::new("demo/root", vec!["demo/root/echo".to_owned()]);
    let blob = bincode::serialize(&blessings).unwrap();
    let host = HostContext::new(Arc::new(StaticLookup::new(echo_addr.to_string(), blob)));

    let mut app = EchoRelayApp::new();
    app.on_initialize(&host).await.unwrap();
    let app = Arc::new(app);

    let relay_addr = spawn_server(delegate_factory(app.clone())).await;

    let client = EchoClient::new(Arc::new(TcpCaller::new(relay_addr)), relay_addr.to_string());
    let ctx = Context::background();
    let reply = client
        .echo(&ctx, "hello through the relay".to_owned())
        .await
        .unwrap();
    println!("{reply}");
}
