use loadgen::RunConfig;
use std::net::SocketAddr;
use std::time::Duration;

/// Not every test file uses every helper.
#[allow(dead_code)]
pub async fn start_ping_server() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(ping_server::serve(listener, ping_server::ServerMode::MultiThread));
    addr
}

/// An address nothing listens on: bind an ephemeral port, then release it.
#[allow(dead_code)]
pub fn refused_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/foo")
}

#[allow(dead_code)]
pub fn config(url: &str, users: usize, duration_ms: u64) -> RunConfig {
    RunConfig::new(url, "ping", users, Duration::from_millis(duration_ms)).unwrap()
}
