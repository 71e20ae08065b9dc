//! Adaptive fetch cycle: lag admission, page fetch, filter, cursor update

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

use crate::config::Config;

use super::cursor::{Cursor, PageVerdict};
use super::errors::FetchTaskError;
use super::filter;
use super::lag::LagProbe;
use super::models::Player;
use super::source::PageSource;
use super::telemetry::HarvestMetrics;

/// What a single cycle did; the loop picks the follow-up delay from this
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Lag at or above the high-water mark; nothing was fetched
    Throttled { lag: i64 },
    /// Fetch or page parse failed; cursor untouched, identical retry next
    FetchFailed,
    /// Page processed; the verdict drives the window adaptation follow-up
    Cycled {
        verdict: PageVerdict,
        enqueued: usize,
    },
}

/// Run one fetch cycle against `today`'s calendar date.
///
/// Cycle order matters and mirrors the upstream contract: admission check,
/// fetch, parse/filter, enqueue, floor advance, daily reset, window
/// adaptation. The floor advances on the RAW page maximum so records the
/// filter dropped are not refetched forever.
pub async fn run_cycle<S: PageSource, L: LagProbe>(
    source: &S,
    lag_probe: &L,
    tx: &UnboundedSender<Player>,
    cursor: &mut Cursor,
    config: &Config,
    metrics: &HarvestMetrics,
    today: NaiveDate,
) -> Result<CycleOutcome, FetchTaskError> {
    let lag = lag_probe.total_lag().await?;
    if lag >= config.lag_high_water {
        metrics.lag_throttle_events.fetch_add(1, Ordering::Relaxed);
        return Ok(CycleOutcome::Throttled { lag });
    }

    let items = match source.fetch_page(cursor.floor(), config.batch_size).await {
        Ok(items) => items,
        Err(e) => {
            // diagnostics already logged at the source; count and retry
            metrics.fetch_errors.fetch_add(1, Ordering::Relaxed);
            warn!(error = %e, floor = cursor.floor(), "fetch failed, will retry");
            return Ok(CycleOutcome::FetchFailed);
        }
    };
    metrics.pages_fetched.fetch_add(1, Ordering::Relaxed);

    let page = match filter::parse_page(items, today, cursor.delta_days()) {
        Ok(page) => page,
        Err(e) => {
            // page-fatal by contract; retried like a fetch failure instead
            // of killing the task
            metrics.pages_rejected.fetch_add(1, Ordering::Relaxed);
            warn!(error = %e, floor = cursor.floor(), "page rejected, will retry");
            return Ok(CycleOutcome::FetchFailed);
        }
    };

    metrics
        .records_seen
        .fetch_add(page.raw_len as u64, Ordering::Relaxed);
    metrics.records_filtered.fetch_add(
        (page.raw_len - page.players.len()) as u64,
        Ordering::Relaxed,
    );

    let enqueued = page.players.len();
    for player in page.players {
        tx.send(player).map_err(|_| FetchTaskError::ChannelClosed)?;
    }
    metrics
        .records_enqueued
        .fetch_add(enqueued as u64, Ordering::Relaxed);

    cursor.advance(page.max_raw_id);

    if cursor.roll_day(today) {
        metrics.daily_resets.fetch_add(1, Ordering::Relaxed);
        info!(day = %today, "new day, resetting floor to 0");
    }

    let verdict = cursor.adapt_window(page.raw_len, config.batch_size);
    if let PageVerdict::Shrunk(days) = verdict {
        metrics.window_shrinks.fetch_add(1, Ordering::Relaxed);
        info!(delta_days = days, "undersized page, shrinking lookback window");
    }

    info!(
        received = page.raw_len,
        enqueued,
        floor = cursor.floor(),
        "cycle complete"
    );

    Ok(CycleOutcome::Cycled { verdict, enqueued })
}

/// Fetch loop task: cycles forever, sleeping between cycles according to
/// the outcome. Terminates only if the receive channel closes (pipeline
/// teardown) or the lag query fails.
pub async fn fetch_loop<S: PageSource, L: LagProbe>(
    source: S,
    lag_probe: L,
    tx: UnboundedSender<Player>,
    config: Config,
    metrics: Arc<HarvestMetrics>,
) -> Result<(), FetchTaskError> {
    let mut cursor = Cursor::with_window(Utc::now().date_naive(), config.initial_delta_days);

    loop {
        let today = Utc::now().date_naive();
        let outcome =
            run_cycle(&source, &lag_probe, &tx, &mut cursor, &config, &metrics, today).await?;

        match outcome {
            CycleOutcome::Throttled { lag } => {
                info!(lag, high_water = config.lag_high_water, "lag too high, backing off");
                tokio::time::sleep(Duration::from_secs(config.lag_sleep_secs)).await;
            }
            CycleOutcome::FetchFailed => {
                info!(sleep_secs = config.error_sleep_secs, "sleeping before retry");
                tokio::time::sleep(Duration::from_secs(config.error_sleep_secs)).await;
            }
            CycleOutcome::Cycled {
                verdict: PageVerdict::Exhausted,
                ..
            } => {
                info!(
                    sleep_secs = config.exhausted_sleep_secs,
                    "source exhausted at minimum window, sleeping"
                );
                tokio::time::sleep(Duration::from_secs(config.exhausted_sleep_secs)).await;
            }
            CycleOutcome::Cycled { .. } => {}
        }
    }
}
