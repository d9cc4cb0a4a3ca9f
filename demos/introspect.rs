use futures::future::{ready, BoxFuture};
use std::{net::SocketAddr, sync::Arc};
use stubcall::{
    echo::{echo_server, EchoMethods},
    net::client::TcpCaller,
    net::server::Server,
    ChildrenGlobber, Context, GlobState, Globber, ServerCall, ServiceError, ServiceStub,
};
use tokio::{net::TcpListener, task};

struct Listing(Vec<String>);

impl ChildrenGlobber for Listing {
    fn glob_children(&self, _ctx: &Context) -> Result<Vec<String>, ServiceError> {
        Ok(self.0.clone())
    }
}

struct Echoer;

impl Globber for Echoer {
    fn glob_state(&self) -> Option<GlobState> {
        let children = vec!["echo".to_owned(), "stats".to_owned()];
        Some(GlobState::new(Arc::new(Listing(children))))
    }
}

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

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt::init();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    task::spawn(Server::new(|_peer: SocketAddr| {
        Some(Arc::new(echo_server(Echoer)) as Arc<dyn ServiceStub>)
    }).serve_on(listener));

    let caller = TcpCaller::new(addr);
    let ctx = Context::background();

    for desc in caller.describe(&ctx).await.unwrap() {
        println!("{} ({})", desc.name, desc.pkg_path);
        for method in &desc.methods {
            let ins: Vec<_> = method.in_args.iter().map(|a| a.name.as_str()).collect();
            let outs: Vec<_> = method.out_args.iter().map(|a| a.name.as_str()).collect();
            println!("  {}({}) -> ({})", method.name, ins.join(", "), outs.join(", "));
        }
    }

    let children = caller.glob(&ctx, "*").await.unwrap();
    println!("children: {}", children.join(", "));
}
