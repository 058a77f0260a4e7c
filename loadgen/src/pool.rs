use crate::client::{HttpClient, RequestOutcome};
use crate::config::RunConfig;
use http_load_util::{RunCounters, StopSignal};
use log::{debug, trace};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;

/// Spawns `config.users` virtual users onto the current runtime.
///
/// Dropping the returned set aborts every unit still running.
pub fn spawn_pool(
    config: &Arc<RunConfig>,
    client: &HttpClient,
    counters: &RunCounters,
    stop: &StopSignal,
) -> JoinSet<()> {
    let mut units = JoinSet::new();
    for index in 1..=config.users {
        units.spawn(run_virtual_user(
            index,
            config.clone(),
            client.clone(),
            counters.clone(),
            stop.clone(),
        ));
    }
    units
}

/// Issues requests back to back until `stop` is raised.
///
/// Failures are counted and the loop carries on. The flag is checked before each
/// request, so at most one request is still in flight once it is raised.
pub async fn run_virtual_user(
    index: usize,
    config: Arc<RunConfig>,
    client: HttpClient,
    counters: RunCounters,
    stop: StopSignal,
) {
    debug!("virtual user {index} started");
    let mut sent = 0u64;
    while !stop.is_raised() {
        let (rtt, outcome) = run_timed(client.post(&config)).await;
        counters.record(outcome.is_success(), rtt);
        sent += 1;
        match outcome {
            RequestOutcome::Success(status) => trace!("virtual user {index}: {status} in {rtt:?}"),
            RequestOutcome::Status(status) => debug!("virtual user {index}: failed with {status}"),
            RequestOutcome::Transport(e) => {
                debug!("virtual user {index}: {e}");
                // A refused connect can fail without ever returning Pending.
                tokio::task::yield_now().await;
            }
        }
    }
    debug!("virtual user {index} stopped after {sent} requests");
}

#[inline]
async fn run_timed<T, F: Future<Output = T>>(fut: F) -> (Duration, T) {
    let start = Instant::now();
    let res = fut.await;
    (start.elapsed(), res)
}
