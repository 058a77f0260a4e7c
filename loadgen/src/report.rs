use http_load_util::CountersSnapshot;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Final numbers of one run, printed once after every virtual user has exited.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub users: usize,
    pub duration_secs: f64,
    pub elapsed_secs: f64,
    pub drain_secs: f64,
    pub counters: CountersSnapshot,
    pub requests_per_second: f64,
}

impl RunReport {
    #[must_use]
    pub fn new(
        users: usize,
        duration: Duration,
        elapsed: Duration,
        drain: Duration,
        counters: CountersSnapshot,
    ) -> Self {
        let elapsed_secs = elapsed.as_secs_f64();
        let requests_per_second = if elapsed_secs > 0.0 {
            counters.attempted as f64 / elapsed_secs
        } else {
            0.0
        };
        Self {
            users,
            duration_secs: duration.as_secs_f64(),
            elapsed_secs,
            drain_secs: drain.as_secs_f64(),
            counters,
            requests_per_second,
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.counters;
        write!(
            f,
            "\
Results:
    virtual users              = {}
    duration s                 = {:.3}
    elapsed s (drain s)        = {:.3} ({:.3})
    requests attempted         = {}
    requests succeeded         = {}
    requests failed            = {}
    throughput req/s           = {:.2}
    rtt us [min, mean, max]    = [{}, {:.2}, {}]",
            self.users,
            self.duration_secs,
            self.elapsed_secs,
            self.drain_secs,
            c.attempted,
            c.succeeded,
            c.failed,
            self.requests_per_second,
            c.min_rtt_micros,
            c.mean_rtt_micros(),
            c.max_rtt_micros,
        )
    }
}
