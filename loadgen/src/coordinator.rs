use crate::client::HttpClient;
use crate::config::RunConfig;
use crate::error::LoadError;
use crate::pool::spawn_pool;
use crate::report::RunReport;
use http_load_util::{RunCounters, StopSignal};
use log::{error, info, warn};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Draining,
    Done,
}

/// Raises the stop signal and publishes `Done` when a run ends, including when
/// the `run` future is dropped before the duration elapsed.
struct RunGuard<'a> {
    stop: StopSignal,
    state_tx: &'a watch::Sender<RunState>,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if self.stop.raise() {
            warn!("run cancelled before its duration elapsed");
        }
        self.state_tx.send_if_modified(|state| {
            if *state == RunState::Done {
                false
            } else {
                *state = RunState::Done;
                true
            }
        });
    }
}

/// Drives one load test from start to final report.
pub struct Coordinator {
    config: Arc<RunConfig>,
    state_tx: watch::Sender<RunState>,
}

impl Coordinator {
    #[must_use]
    pub fn new(config: RunConfig) -> Self {
        let (state_tx, _) = watch::channel(RunState::Idle);
        Self {
            config: Arc::new(config),
            state_tx,
        }
    }

    #[must_use]
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> RunState {
        *self.state_tx.borrow()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<RunState> {
        self.state_tx.subscribe()
    }

    /// Runs the configured users for the configured duration, then drains them.
    ///
    /// Invalid configuration is reported before anything is spawned and leaves the
    /// coordinator idle. A coordinator runs at most once. Dropping the future
    /// mid-run aborts the virtual users and moves the state to `Done`.
    pub async fn run(&self) -> Result<RunReport, LoadError> {
        if self.state() != RunState::Idle {
            return Err(LoadError::AlreadyRun);
        }
        self.config.validate()?;
        let started = self.state_tx.send_if_modified(|state| {
            if *state == RunState::Idle {
                *state = RunState::Running;
                true
            } else {
                false
            }
        });
        if !started {
            return Err(LoadError::AlreadyRun);
        }

        let config = &self.config;
        let counters = RunCounters::new();
        let stop = StopSignal::new();
        let guard = RunGuard {
            stop: stop.clone(),
            state_tx: &self.state_tx,
        };
        let client = HttpClient::new(config.request_timeout);

        info!(
            "starting {} virtual users against {} for {:?}",
            config.users, config.url, config.duration
        );
        let start = Instant::now();
        let mut units = spawn_pool(config, &client, &counters, &stop);

        tokio::time::sleep(config.duration).await;
        stop.raise();
        self.state_tx.send_replace(RunState::Draining);
        info!("duration elapsed, draining {} virtual users", units.len());

        let drain_start = Instant::now();
        while let Some(res) = units.join_next().await {
            if let Err(e) = res {
                error!("virtual user exited abnormally: {e}");
            }
        }
        let drain = drain_start.elapsed();
        let elapsed = start.elapsed();

        let snapshot = counters.snapshot();
        drop(guard);
        info!(
            "run finished: {} attempted, {} succeeded, {} failed",
            snapshot.attempted, snapshot.succeeded, snapshot.failed
        );
        Ok(RunReport::new(
            config.users,
            config.duration,
            elapsed,
            drain,
            snapshot,
        ))
    }
}
