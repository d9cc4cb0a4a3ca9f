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

fn credential_blob() -> Vec<u8> {
    let blessings = Blessings::new("test/root", vec!["test/root/echo".to_owned()]);
    bincode::serialize(&blessings).unwrap()
}

#[tokio::test]
async fn relay_round_trips_through_remote_echo_server() {
    let echo_addr = spawn_server(|_peer: SocketAddr| {
        Some(Arc::new(echo_server(Echoer)) as Arc<dyn ServiceStub>)
    })
    .await;

    let host = HostContext::new(Arc::new(StaticLookup::new(
        echo_addr.to_string(),
        credential_blob(),
    )));
    let mut app = EchoRelayApp::new();
    app.on_initialize(&host).await.unwrap();
    let app = Arc::new(app);

    let relay_addr = spawn_server(delegate_factory(app.clone())).await;

    let client = EchoClient::new(Arc::new(TcpCaller::new(relay_addr)), "echo/relay");
    let ctx = Context::background();
    for msg in ["first", "second", "third"] {
        let reply = client.echo(&ctx, msg.to_owned()).await.unwrap();
        assert_eq!(reply, msg);
    }
}

#[tokio::test]
async fn uninitialized_delegate_refuses_connections() {
    let app = Arc::new(EchoRelayApp::new());
    let relay_addr = spawn_server(delegate_factory(app)).await;

    let client = EchoClient::new(Arc::new(TcpCaller::new(relay_addr)), "echo/relay");
    let ctx = Context::background();
    assert!(client.echo(&ctx, "anyone there?".to_owned()).await.is_err());
}
