//! In-process interval loop for the daemon mode.

use std::future::Future;
use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info};

use crate::pipeline::RunOutcome;

/// Tally of the invocations a schedule loop performed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScheduleSummary {
    pub runs: usize,
    pub delivered: usize,
    pub aborted: usize,
}

impl ScheduleSummary {
    fn record(&mut self, outcome: &RunOutcome) {
        self.runs += 1;
        if outcome.is_delivered() {
            self.delivered += 1;
        } else {
            self.aborted += 1;
        }
    }
}

/// Invoke `job` every `period` until `shutdown` resolves.
///
/// The first run starts immediately. Runs never overlap: the next tick is
/// only awaited after the current run settles, and ticks missed while a run
/// was in flight are skipped rather than fired in a burst. A shutdown signal
/// received mid-run takes effect once that run settles.
pub async fn run_every<F, Fut, S>(period: Duration, shutdown: S, mut job: F) -> ScheduleSummary
where
    F: FnMut() -> Fut,
    Fut: Future<Output = RunOutcome>,
    S: Future<Output = ()>,
{
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    let mut summary = ScheduleSummary::default();
    info!(period_secs = period.as_secs(), "schedule loop started");

    loop {
        tokio::select! {
            () = &mut shutdown => break,
            _ = ticker.tick() => {
                debug!(run = summary.runs + 1, "schedule tick");
                let outcome = job().await;
                summary.record(&outcome);
            }
        }
    }

    info!(
        runs = summary.runs,
        delivered = summary.delivered,
        aborted = summary.aborted,
        "schedule loop stopped"
    );
    summary
}
