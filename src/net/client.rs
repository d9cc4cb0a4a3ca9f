use super::{classify, Request, Response};
use crate::{
    binding::{CallError, Caller, TransportError},
    context::Context,
    descriptor::InterfaceDesc,
    types::{DecodeError, Value},
};
use async_bincode::{tokio::AsyncBincodeStream, AsyncDestination};
use futures::{future::BoxFuture, SinkExt, StreamExt};
use std::{future::Future, net::SocketAddr};
use tokio::{io::BufStream, net::TcpStream};

type WireStream = AsyncBincodeStream<BufStream<TcpStream>, Response, Request, AsyncDestination>;

/// Name-addressed transport client over TCP.
///
/// Holds no connection state: every call opens one stream, performs exactly
/// one round trip, and drops it. Safe to share across tasks.
#[derive(Debug, Clone, Copy)]
pub struct TcpCaller {
    addr: SocketAddr,
}

impl TcpCaller {
    pub fn new(addr: SocketAddr) -> Self {
        Self { addr }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    async fn connect(&self, ctx: &Context) -> Result<WireStream, TransportError> {
        let sock = io_deadline(ctx, TcpStream::connect(self.addr)).await??;
        Ok(AsyncBincodeStream::from(BufStream::new(sock)).for_async())
    }

    async fn round_trip(&self, ctx: &Context, req: Request) -> Result<Response, CallError> {
        if ctx.is_cancelled() {
            return Err(TransportError::Cancelled.into());
        }
        let mut stream = self.connect(ctx).await?;
        io_deadline(ctx, stream.send(req))
            .await?
            .map_err(classify)?;
        let resp = io_deadline(ctx, stream.next())
            .await?
            .ok_or(TransportError::Closed)?
            .map_err(classify)?;
        Ok(resp)
    }

    /// Fetches the served stub's interface descriptors.
    pub async fn describe(&self, ctx: &Context) -> Result<Vec<InterfaceDesc>, CallError> {
        match self.round_trip(ctx, Request::Describe).await? {
            Response::Describe(descs) => Ok(descs),
            other => Err(unexpected_frame(&other)),
        }
    }

    /// Browses the served stub's namespace.
    pub async fn glob(&self, ctx: &Context, pattern: &str) -> Result<Vec<String>, CallError> {
        let req = Request::Glob {
            pattern: pattern.to_owned(),
        };
        match self.round_trip(ctx, req).await? {
            Response::Glob(Ok(children)) => Ok(children),
            Response::Glob(Err(err)) => Err(CallError::Remote(err)),
            other => Err(unexpected_frame(&other)),
        }
    }
}

impl Caller for TcpCaller {
    fn call<'a>(
        &'a self,
        ctx: &'a Context,
        name: &'a str,
        method: &'a str,
        args: Vec<Value>,
    ) -> BoxFuture<'a, Result<Vec<Value>, CallError>> {
        Box::pin(async move {
            let req = Request::Call {
                name: name.to_owned(),
                method: method.to_owned(),
                args,
            };
            match self.round_trip(ctx, req).await? {
                Response::Call(Ok(out)) => Ok(out),
                Response::Call(Err(err)) => Err(CallError::Remote(err)),
                other => Err(unexpected_frame(&other)),
            }
        })
    }
}

fn unexpected_frame(resp: &Response) -> CallError {
    CallError::Decode(DecodeError::Wire(format!(
        "unexpected response frame: {resp:?}"
    )))
}

/// Runs `fut` under the context deadline, if one is set.
async fn io_deadline<F>(ctx: &Context, fut: F) -> Result<F::Output, TransportError>
where
    F: Future,
{
    match ctx.remaining() {
        Some(remaining) => tokio::time::timeout(remaining, fut)
            .await
            .map_err(|_| TransportError::DeadlineExceeded),
        None => Ok(fut.await),
    }
}
