use anyhow::Context;
use clap::{ArgAction, Parser};
use http_load_util::logging::init_logger;
use log::info;
use mimalloc::MiMalloc;
use ping_server::{serve, ServerMode};
use std::net::IpAddr;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Load test target that answers ping with pong
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(long, default_value = "127.0.0.1")]
    host: IpAddr,
    #[arg(long, default_value_t = 8686)]
    port: u16,
    /// "single" for a current-thread runtime, "multi" for a thread pool
    #[arg(long, default_value = "multi")]
    mode: ServerMode,
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logger(args.verbose, 0);
    let rt = args.mode.build_runtime().context("Failed to build runtime")?;
    let _guard = rt.enter();
    rt.block_on(async {
        let listener = tokio::net::TcpListener::bind((args.host, args.port))
            .await
            .with_context(|| format!("Failed to bind {}:{}", args.host, args.port))?;
        info!("Starting server on {} ({:?})", listener.local_addr()?, args.mode);
        serve(listener, args.mode).await;
        Ok::<(), anyhow::Error>(())
    })
}
