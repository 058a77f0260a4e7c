use crate::config::{RunConfig, METHOD};
use anyhow::{Context, Result};
use bytes::Bytes;
use http_body_util::Full;
use http_load_util::byte_body;
use http_load_util::drain::DrainBodyFuture;
use hyper::header::CONTENT_LENGTH;
use hyper::{Request, StatusCode};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use std::time::Duration;

/// How a single request ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    /// 2xx or 3xx.
    Success(StatusCode),
    /// A response arrived but its status counts as a failure.
    Status(StatusCode),
    /// Connect, send, body read or timeout failure.
    Transport(String),
}

impl RequestOutcome {
    #[must_use]
    pub fn from_status(status: StatusCode) -> Self {
        if status.is_success() || status.is_redirection() {
            Self::Success(status)
        } else {
            Self::Status(status)
        }
    }

    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Connection-pooling HTTP/1.1 client shared by all virtual users.
#[derive(Clone)]
pub struct HttpClient {
    client: Client<HttpConnector, Full<Bytes>>,
    timeout: Duration,
}

impl HttpClient {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(timeout));
        connector.set_nodelay(true);
        let client = Client::builder(TokioExecutor::new()).build(connector);
        Self { client, timeout }
    }

    /// Sends one POST built from `config` and classifies the result.
    ///
    /// The timeout spans connect, send and reading the whole response body.
    pub async fn post(&self, config: &RunConfig) -> RequestOutcome {
        let mut request = Request::new(byte_body(config.payload.clone()));
        *request.method_mut() = METHOD;
        *request.uri_mut() = config.url.clone();
        *request.headers_mut() = config.headers.clone();
        match tokio::time::timeout(self.timeout, self.send_recv(request)).await {
            Ok(Ok((status, _body))) => RequestOutcome::from_status(status),
            Ok(Err(e)) => RequestOutcome::Transport(format!("{e:#}")),
            Err(_elapsed) => {
                RequestOutcome::Transport(format!("request timed out after {:?}", self.timeout))
            }
        }
    }

    pub async fn send_recv(&self, request: Request<Full<Bytes>>) -> Result<(StatusCode, Vec<u8>)> {
        let resp = self
            .client
            .request(request)
            .await
            .context("Failed to send request")?;
        let status = resp.status();
        let content_length: usize = resp
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|hv| hv.to_str().ok())
            .and_then(|hv| hv.parse().ok())
            .unwrap_or(1024);
        let bytes: Vec<u8> =
            DrainBodyFuture::new_trusted_length(resp.into_body(), content_length.min(64 * 1024))
                .await
                .context("Failed to read response body")?;
        Ok((status, bytes))
    }
}
