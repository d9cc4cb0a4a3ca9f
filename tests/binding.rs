use futures::future::{ready, BoxFuture};
use serde_json::json;
use std::sync::Arc;
use stubcall::{
    echo::{echo_desc, echo_server, EchoMethods},
    glob::pattern_matches,
    ChildrenGlobber, Context, Decode, DispatchError, GlobState, Globber, ServerCall, ServiceError,
    ServiceStub, Value,
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

struct Listing(Vec<String>);

impl ChildrenGlobber for Listing {
    fn glob_children(&self, _ctx: &Context) -> Result<Vec<String>, ServiceError> {
        Ok(self.0.clone())
    }
}

/// Offers the browse capability with a fixed child list.
struct Offers(Vec<String>);

impl Globber for Offers {
    fn glob_state(&self) -> Option<GlobState> {
        Some(GlobState::new(Arc::new(Listing(self.0.clone()))))
    }
}

struct NoCapability;

impl Globber for NoCapability {}

fn names(children: &[&str]) -> Vec<String> {
    children.iter().map(|c| (*c).to_owned()).collect()
}

#[test]
fn descriptor_is_stable_across_calls_and_stubs() {
    assert_eq!(echo_desc(), echo_desc());

    let first = echo_server(Echoer);
    let second = echo_server(Echoer);
    assert_eq!(first.describe(), second.describe());
    assert_eq!(first.describe(), first.describe());
    assert_eq!(first.describe(), vec![echo_desc().clone()]);
}

#[test]
fn descriptor_serializes_to_interop_shape() {
    let value = serde_json::to_value(echo_desc()).unwrap();
    assert_eq!(
        value,
        json!({
            "Name": "Echo",
            "PkgPath": "stubcall/echo",
            "Methods": [{
                "Name": "Echo",
                "InArgs": [{"Name": "msg", "Type": "string"}],
                "OutArgs": [{"Name": "value", "Type": "string"}],
            }],
        })
    );
}

#[tokio::test]
async fn dispatch_round_trips_positional_args() {
    let stub = echo_server(Echoer);
    let ctx = Context::background();
    let call = ServerCall::new("echo/service", "Echo");
    let out = stub
        .dispatch(&ctx, &call, vec![Value::from("hi")])
        .await
        .unwrap();
    assert_eq!(out, vec![Value::Str("hi".to_owned())]);
}

#[tokio::test]
async fn dispatch_is_case_sensitive_on_method_names() {
    let stub = echo_server(Echoer);
    let ctx = Context::background();
    let call = ServerCall::new("echo/service", "echo");
    let err = stub
        .dispatch(&ctx, &call, vec![Value::from("hi")])
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::UnknownMethod(name) if name == "echo"));
}

#[tokio::test]
async fn dispatch_rejects_malformed_argument_frames() {
    let stub = echo_server(Echoer);
    let ctx = Context::background();
    let call = ServerCall::new("echo/service", "Echo");

    let err = stub.dispatch(&ctx, &call, vec![]).await.unwrap_err();
    assert!(matches!(err, DispatchError::InvalidArgument { .. }));

    let err = stub
        .dispatch(&ctx, &call, vec![Value::Int(3)])
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::InvalidArgument { .. }));
}

#[tokio::test]
async fn stub_forwards_typed_calls_unchanged() {
    let stub = echo_server(Echoer);
    let ctx = Context::background();
    let call = ServerCall::new("echo/service", "Echo");
    let reply = stub.echo(&ctx, &call, "direct".to_owned()).await.unwrap();
    assert_eq!(reply, "direct");
}

#[test]
fn capability_resolution_prefers_the_stub() {
    let ctx = Context::background();

    let stub_side = Offers(names(&["from-stub"]));
    let impl_side = Offers(names(&["from-impl"]));
    let gs = GlobState::resolve(&stub_side, &impl_side).unwrap();
    assert_eq!(gs.glob(&ctx, "*").unwrap(), names(&["from-stub"]));

    let gs = GlobState::resolve(&NoCapability, &impl_side).unwrap();
    assert_eq!(gs.glob(&ctx, "*").unwrap(), names(&["from-impl"]));

    assert!(GlobState::resolve(&NoCapability, &NoCapability).is_none());
}

#[test]
fn echo_stub_takes_the_implementations_capability() {
    struct BrowsableEcho;

    impl Globber for BrowsableEcho {
        fn glob_state(&self) -> Option<GlobState> {
            Some(GlobState::new(Arc::new(Listing(names(&["child"])))))
        }
    }

    impl EchoMethods for BrowsableEcho {
        fn echo<'a>(
            &'a self,
            _ctx: &'a Context,
            _call: &'a ServerCall,
            msg: String,
        ) -> BoxFuture<'a, Result<String, ServiceError>> {
            Box::pin(ready(Ok(msg)))
        }
    }

    let stub = echo_server(BrowsableEcho);
    let gs = stub.globber().unwrap();
    let ctx = Context::background();
    assert_eq!(gs.glob(&ctx, "*").unwrap(), names(&["child"]));

    let plain = echo_server(Echoer);
    assert!(plain.globber().is_none());
}

#[test]
fn glob_patterns() {
    assert!(pattern_matches("echo", "echo"));
    assert!(!pattern_matches("echo", "echoes"));
    assert!(pattern_matches("*", "anything"));
    assert!(pattern_matches("be*", "beacon"));
    assert!(!pattern_matches("be*", "alpha"));
    assert!(pattern_matches("a*c", "abc"));
    assert!(pattern_matches("a*c", "ac"));
    assert!(!pattern_matches("a*c", "ab"));
    assert!(pattern_matches("*-end", "front-end"));
    assert!(pattern_matches("sm*rg*s", "smörgås"));
}

#[test]
fn values_decode_shape_errors() {
    let err = String::decode(Value::Int(3)).unwrap_err();
    assert_eq!(err.to_string(), "expected string, got int");

    assert_eq!(String::decode(Value::from("ok")).unwrap(), "ok");
    assert_eq!(i64::decode(Value::Int(3)).unwrap(), 3);
    assert_eq!(<()>::decode(Value::Nil).unwrap(), ());
}

#[test]
fn context_cancellation_is_shared_across_clones() {
    let ctx = Context::background();
    let clone = ctx.clone();
    assert!(!clone.is_cancelled());
    ctx.cancel();
    assert!(clone.is_cancelled());
}

#[test]
fn context_deadline_counts_down() {
    let ctx = Context::background().with_timeout(std::time::Duration::from_secs(60));
    let remaining = ctx.remaining().unwrap();
    assert!(remaining <= std::time::Duration::from_secs(60));
    assert!(remaining > std::time::Duration::from_secs(30));
    assert!(Context::background().remaining().is_none());
}
