use bytes::Bytes;
use http_body_util::Full;
use http_load_util::drain::DrainBodyFuture;
use hyper::{Method, Request, StatusCode};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use ping_server::ServerMode;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;

async fn start_server_in(mode: ServerMode) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(ping_server::serve(listener, mode));
    addr
}

async fn start_server() -> SocketAddr {
    start_server_in(ServerMode::MultiThread).await
}

async fn send(addr: SocketAddr, method: Method, body: &'static str) -> (StatusCode, Vec<u8>) {
    let client: Client<HttpConnector, Full<Bytes>> =
        Client::builder(TokioExecutor::new()).build(HttpConnector::new());
    let req = Request::builder()
        .method(method)
        .uri(format!("http://{addr}/foo"))
        .header("Content-Type", "plain/text")
        .body(Full::new(Bytes::from_static(body.as_bytes())))
        .unwrap();
    let resp = client.request(req).await.unwrap();
    let status = resp.status();
    let body = DrainBodyFuture::new_trusted_length(resp.into_body(), 16)
        .await
        .unwrap();
    (status, body)
}

#[tokio::test]
async fn post_ping_over_tcp() {
    let addr = start_server().await;
    assert_eq!(
        send(addr, Method::POST, "ping").await,
        (StatusCode::OK, b"pong".to_vec())
    );
}

#[tokio::test]
async fn any_method_and_body_is_ok() {
    let addr = start_server().await;
    assert_eq!(
        send(addr, Method::GET, "").await,
        (StatusCode::OK, Vec::new())
    );
    assert_eq!(
        send(addr, Method::PUT, "hello").await,
        (StatusCode::OK, Vec::new())
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn serves_concurrent_connections() {
    let addr = start_server().await;
    let tasks: Vec<_> = (0..16)
        .map(|_| tokio::spawn(send(addr, Method::POST, "ping")))
        .collect();
    for t in tasks {
        assert_eq!(t.await.unwrap(), (StatusCode::OK, b"pong".to_vec()));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn single_mode_serves_requests_in_turn() {
    let addr = start_server_in(ServerMode::SingleThread).await;
    for _ in 0..3 {
        assert_eq!(
            send(addr, Method::POST, "ping").await,
            (StatusCode::OK, b"pong".to_vec())
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn single_mode_waits_for_the_open_connection() {
    let addr = start_server_in(ServerMode::SingleThread).await;
    let idle = TcpStream::connect(addr).await.unwrap();
    // Let the server pick up the idle connection first.
    tokio::time::sleep(Duration::from_millis(100)).await;

    let blocked = timeout(Duration::from_millis(300), send(addr, Method::POST, "ping")).await;
    assert!(blocked.is_err(), "served while another connection was open");

    drop(idle);
    let served = timeout(Duration::from_secs(5), send(addr, Method::POST, "ping"))
        .await
        .expect("not served after the idle connection closed");
    assert_eq!(served, (StatusCode::OK, b"pong".to_vec()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn multi_mode_serves_beside_an_open_connection() {
    let addr = start_server_in(ServerMode::MultiThread).await;
    let _idle = TcpStream::connect(addr).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let served = timeout(Duration::from_secs(5), send(addr, Method::POST, "ping"))
        .await
        .expect("blocked by an idle connection");
    assert_eq!(served, (StatusCode::OK, b"pong".to_vec()));
}
