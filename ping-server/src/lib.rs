use bytes::Bytes;
use http_body_util::Full;
use http_load_util::drain::DrainBodyFuture;
use http_load_util::{byte_body, empty_body};
use hyper::body::{Body, Incoming};
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use log::{debug, error, warn};
use std::convert::Infallible;
use std::fmt::Display;
use std::str::FromStr;
use tokio::net::TcpListener;

const PING: &[u8] = b"ping";
const PONG: &[u8] = b"pong";

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ServerMode {
    SingleThread,
    MultiThread,
}

impl FromStr for ServerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(Self::SingleThread),
            "multi" => Ok(Self::MultiThread),
            other => Err(format!("unknown mode {other:?}, expected single or multi")),
        }
    }
}

impl ServerMode {
    pub fn build_runtime(self) -> std::io::Result<tokio::runtime::Runtime> {
        match self {
            Self::SingleThread => tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build(),
            Self::MultiThread => tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build(),
        }
    }
}

/// Answers any request with 200, and `pong` when the body is exactly `ping`.
pub async fn handle<B>(incoming: Request<B>) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: Display,
{
    let method = incoming.method().clone();
    let path = incoming.uri().path().to_owned();
    let body = match DrainBodyFuture::new_trusted_length(incoming.into_body(), 64).await {
        Ok(body) => body,
        Err(e) => {
            warn!("{method} {path}: {e}");
            return Ok(status_only(StatusCode::BAD_REQUEST));
        }
    };
    debug!("{method} {path}: {} byte body", body.len());
    if body == PING {
        Ok(Response::new(byte_body(PONG)))
    } else {
        Ok(Response::new(empty_body()))
    }
}

fn status_only(status: StatusCode) -> Response<Full<Bytes>> {
    let mut resp = Response::new(empty_body());
    *resp.status_mut() = status;
    resp
}

/// Accepts connections forever.
///
/// `MultiThread` spawns a task per connection. `SingleThread` serves one
/// connection at a time with keep-alive off, so each response closes its
/// connection and the next client waits in the accept backlog.
pub async fn serve(listener: TcpListener, mode: ServerMode) {
    loop {
        let (tcp, peer) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                error!("Failed to accept: {e}");
                continue;
            }
        };
        debug!("Got connection from: {peer}");
        let tcp = TokioIo::new(tcp);
        match mode {
            ServerMode::SingleThread => {
                let conn = hyper::server::conn::http1::Builder::new()
                    .keep_alive(false)
                    .serve_connection(tcp, service_fn(handle::<Incoming>));
                if let Err(e) = conn.await {
                    error!("connection from {peer}: {e}");
                }
            }
            ServerMode::MultiThread => {
                tokio::task::spawn(async move {
                    if let Err(e) = hyper::server::conn::http1::Builder::new()
                        .serve_connection(tcp, service_fn(handle::<Incoming>))
                        .await
                    {
                        error!("connection from {peer}: {e}");
                    }
                });
            }
        }
    }
}
