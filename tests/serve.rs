use futures::future::{ready, BoxFuture};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use stubcall::{
    echo::{echo_server, EchoMethods},
    serve, Context, DecodeError, Globber, ServeError, ServerCall, ServiceError, ServiceStub,
    StubConn, TransportError,
};

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

/// Serves `ok_rounds` calls, then fails with the scripted error. Panics if
/// the loop ever polls past its terminal error.
struct ScriptedConn {
    ok_rounds: usize,
    served: Arc<AtomicUsize>,
    fail_with: Option<ServeError>,
}

impl ScriptedConn {
    fn new(ok_rounds: usize, fail_with: ServeError) -> (Self, Arc<AtomicUsize>) {
        let served = Arc::new(AtomicUsize::new(0));
        let conn = Self {
            ok_rounds,
            served: served.clone(),
            fail_with: Some(fail_with),
        };
        (conn, served)
    }
}

impl StubConn for ScriptedConn {
    fn serve_next<'a>(
        &'a mut self,
        _stub: &'a dyn ServiceStub,
    ) -> BoxFuture<'a, Result<(), ServeError>> {
        Box::pin(async move {
            if self.ok_rounds > 0 {
                self.ok_rounds -= 1;
                self.served.fetch_add(1, Ordering::Relaxed);
                return Ok(());
            }
            Err(self
                .fail_with
                .take()
                .expect("dispatch loop polled past its terminal error"))
        })
    }
}

#[tokio::test]
async fn loop_terminates_on_closed_transport() {
    let (conn, served) = ScriptedConn::new(3, ServeError::Transport(TransportError::Closed));
    let end = serve(conn, echo_server(Echoer)).await;
    assert!(end.is_closed());
    assert_eq!(served.load(Ordering::Relaxed), 3);
}

#[tokio::test]
async fn loop_terminates_on_unexpected_error() {
    let fault = ServeError::Decode(DecodeError::Wire("garbage frame".to_owned()));
    let (conn, served) = ScriptedConn::new(0, fault);
    let end = serve(conn, echo_server(Echoer)).await;
    assert!(!end.is_closed());
    assert!(matches!(end, ServeError::Decode(_)));
    assert_eq!(served.load(Ordering::Relaxed), 0);
}

#[tokio::test]
async fn loops_terminate_independently() {
    let (failing, failed_count) =
        ScriptedConn::new(0, ServeError::Transport(TransportError::Closed));
    let (healthy, healthy_count) =
        ScriptedConn::new(5, ServeError::Transport(TransportError::Closed));

    let first = tokio::spawn(serve(failing, echo_server(Echoer)));
    let second = tokio::spawn(serve(healthy, echo_server(Echoer)));

    let (first_end, second_end) = (first.await.unwrap(), second.await.unwrap());
    assert!(first_end.is_closed());
    assert!(second_end.is_closed());
    assert_eq!(failed_count.load(Ordering::Relaxed), 0);
    assert_eq!(healthy_count.load(Ordering::Relaxed), 5);
}
