use anyhow::Context;
use clap::Parser;
use http_load_util::logging::init_logger;
use loadgen::{Cli, Coordinator};
use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose, cli.quiet);
    let json = cli.json;
    let config = cli.into_run_config()?;

    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.worker_threads())
        .enable_all()
        .build()
        .context("Failed to build runtime")?;
    let _guard = rt.enter();
    let coordinator = Coordinator::new(config);
    let report = rt.block_on(coordinator.run())?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        );
    } else {
        println!("{report}");
    }
    Ok(())
}
