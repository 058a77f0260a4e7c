use crate::error::LoadError;
use bytes::Bytes;
use clap::{ArgAction, Parser};
use hyper::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use hyper::{HeaderMap, Method, Uri};
use std::time::Duration;

/// Every request of a run uses this method.
pub const METHOD: Method = Method::POST;

pub const DEFAULT_URL: &str = "http://127.0.0.1:8686/foo";
pub const DEFAULT_CONTENT_TYPE: &str = "plain/text";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
/// Users beyond this many share runtime threads.
pub const MAX_WORKER_THREADS: usize = 256;

/// Hammer one URL with POST requests from a fixed set of virtual users
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Number of concurrent virtual users
    #[arg(short, long, default_value_t = 10)]
    pub users: usize,
    /// How long to keep sending, e.g. "30s" or "2m"
    #[arg(short, long, default_value = "30s", value_parser = humantime::parse_duration)]
    pub duration: Duration,
    #[arg(long, default_value = DEFAULT_URL)]
    pub url: String,
    /// Request body sent with every POST
    #[arg(short, long, default_value = "ping")]
    pub payload: String,
    /// Extra request header as "Name: value", may be repeated
    #[arg(short = 'H', long = "header", value_name = "NAME: VALUE")]
    pub headers: Vec<String>,
    /// Upper bound on a single request, connect included
    #[arg(long, default_value = "5s", value_parser = humantime::parse_duration)]
    pub timeout: Duration,
    /// Print the final report as JSON
    #[arg(long)]
    pub json: bool,
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
    #[arg(short, long, action = ArgAction::Count)]
    pub quiet: u8,
}

impl Cli {
    pub fn into_run_config(self) -> Result<RunConfig, LoadError> {
        let mut config = RunConfig::new(&self.url, self.payload, self.users, self.duration)?;
        for raw in &self.headers {
            let (name, value) = parse_header(raw)?;
            config.headers.insert(name, value);
        }
        config.request_timeout = self.timeout;
        config.validate()?;
        Ok(config)
    }
}

/// Everything a run needs, fixed before the first request goes out.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub url: Uri,
    pub payload: Bytes,
    pub headers: HeaderMap,
    pub users: usize,
    pub duration: Duration,
    pub request_timeout: Duration,
}

impl RunConfig {
    /// Parses the target and fills in the default `Content-Type` and request timeout.
    ///
    /// Counts and durations are checked later by [`RunConfig::validate`].
    pub fn new(
        url: &str,
        payload: impl Into<Bytes>,
        users: usize,
        duration: Duration,
    ) -> Result<Self, LoadError> {
        let url: Uri = url
            .parse()
            .map_err(|e| LoadError::invalid(format!("target url {url:?}: {e}")))?;
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
        Ok(Self {
            url,
            payload: payload.into(),
            headers,
            users,
            duration,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// One runtime thread per virtual user, capped at [`MAX_WORKER_THREADS`].
    #[must_use]
    pub fn worker_threads(&self) -> usize {
        self.users.clamp(1, MAX_WORKER_THREADS)
    }

    pub fn validate(&self) -> Result<(), LoadError> {
        if self.users == 0 {
            return Err(LoadError::invalid("virtual user count must be positive"));
        }
        if self.duration.is_zero() {
            return Err(LoadError::invalid("duration must be positive"));
        }
        if self.request_timeout.is_zero() {
            return Err(LoadError::invalid("request timeout must be positive"));
        }
        match self.url.scheme_str() {
            Some("http") => {}
            Some("https") => {
                return Err(LoadError::invalid(format!(
                    "target url {}: TLS is not supported",
                    self.url
                )))
            }
            _ => {
                return Err(LoadError::invalid(format!(
                    "target url {}: expected an absolute http:// url",
                    self.url
                )))
            }
        }
        if self.url.host().map_or(true, str::is_empty) {
            return Err(LoadError::invalid(format!(
                "target url {}: missing host",
                self.url
            )));
        }
        Ok(())
    }
}

/// Splits `"Name: value"` on the first colon, trimming both sides.
pub fn parse_header(raw: &str) -> Result<(HeaderName, HeaderValue), LoadError> {
    let Some((name, value)) = raw.split_once(':') else {
        return Err(LoadError::invalid(format!(
            "header {raw:?}: expected \"Name: value\""
        )));
    };
    let name = HeaderName::from_bytes(name.trim().as_bytes())
        .map_err(|e| LoadError::invalid(format!("header {raw:?}: {e}")))?;
    let value = HeaderValue::from_str(value.trim())
        .map_err(|e| LoadError::invalid(format!("header {raw:?}: {e}")))?;
    Ok((name, value))
}
