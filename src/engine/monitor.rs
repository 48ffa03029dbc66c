//! The periodic match monitor.
//!
//! Owns the evaluation cycle: fetch a snapshot of match records, run the
//! timing evaluator against the hydrated ledger, hand due alerts to the
//! channel dispatcher, and persist ledger changes. One cycle runs to
//! completion at a time; the schedule is a fixed interval with a start
//! offset inside the flex window.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::{sync::Mutex, task::JoinSet, time::MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::{
    channels::ChannelDispatcher,
    config::AppConfig,
    engine::evaluator::{AlertLedger, evaluate},
    models::Alert,
    persistence::{error::PersistenceError, traits::KeyValueStore},
    providers::traits::{MatchSource, MatchSourceError},
};

/// Key prefix under which per-match alert state is persisted.
const ALERT_STATE_PREFIX: &str = "alert_state:";

/// Errors that can occur while running a monitor cycle.
#[derive(Debug, Error)]
pub enum MatchMonitorError {
    /// The match record fetch failed; the cycle is retried at the next tick.
    #[error("Match source error: {0}")]
    Source(#[from] MatchSourceError),

    /// The alert-state store failed.
    #[error("State store error: {0}")]
    Store(#[from] PersistenceError),
}

/// Periodically evaluates the match schedule and dispatches due alerts.
pub struct MatchMonitor<T: KeyValueStore> {
    config: Arc<AppConfig>,
    source: Arc<dyn MatchSource>,
    dispatcher: Arc<ChannelDispatcher>,
    store: Arc<T>,
    ledger: Mutex<AlertLedger>,
    registered: AtomicBool,
}

impl<T: KeyValueStore + 'static> MatchMonitor<T> {
    /// Creates a new monitor. Call [`MatchMonitor::hydrate`] before the
    /// first cycle so deduplication state survives restarts.
    pub fn new(
        config: Arc<AppConfig>,
        source: Arc<dyn MatchSource>,
        dispatcher: Arc<ChannelDispatcher>,
        store: Arc<T>,
    ) -> Self {
        Self {
            config,
            source,
            dispatcher,
            store,
            ledger: Mutex::new(AlertLedger::new()),
            registered: AtomicBool::new(false),
        }
    }

    /// Loads the persisted alert ledger from the store. Returns the number
    /// of matches with recorded state.
    pub async fn hydrate(&self) -> Result<usize, MatchMonitorError> {
        let entries = self
            .store
            .get_all_json_states_by_prefix::<crate::models::MatchAlertState>(ALERT_STATE_PREFIX)
            .await?;
        let entries: Vec<_> = entries
            .into_iter()
            .map(|(key, state)| (key.trim_start_matches(ALERT_STATE_PREFIX).to_string(), state))
            .collect();

        let mut ledger = self.ledger.lock().await;
        *ledger = AlertLedger::from_entries(entries);
        tracing::info!(count = ledger.len(), "Hydrated alert ledger from store.");
        Ok(ledger.len())
    }

    /// Runs one evaluation cycle against the current wall clock.
    pub async fn run_cycle(&self) -> Result<Vec<Alert>, MatchMonitorError> {
        self.run_cycle_at(Utc::now()).await
    }

    /// Runs one evaluation cycle as if the current time were `now`.
    pub async fn run_cycle_at(&self, now: DateTime<Utc>) -> Result<Vec<Alert>, MatchMonitorError> {
        let records = self.source.fetch_all().await?;
        tracing::debug!(count = records.len(), "Evaluating match snapshot.");

        let mut ledger = self.ledger.lock().await;
        let evaluation = evaluate(now, &records, &mut ledger, &self.config.team_name);

        for alert in &evaluation.alerts {
            // Fire-and-forget: the dispatcher logs per-channel failures.
            self.dispatcher.dispatch(alert).await;
        }

        // Persist ledger changes. A write failure is logged but does not
        // fail the cycle: the alert already went out, and the worst case is
        // a duplicate after a restart.
        for (match_id, state) in ledger.drain_dirty() {
            let key = format!("{ALERT_STATE_PREFIX}{match_id}");
            if let Err(e) = self.store.set_json_state(&key, &state).await {
                tracing::error!(match_id = %match_id, error = %e, "Failed to persist alert state.");
            }
        }
        for match_id in &evaluation.cleared {
            let key = format!("{ALERT_STATE_PREFIX}{match_id}");
            if let Err(e) = self.store.delete_json_state(&key).await {
                tracing::error!(match_id = %match_id, error = %e, "Failed to clear alert state.");
            }
        }

        if !evaluation.alerts.is_empty() {
            tracing::info!(count = evaluation.alerts.len(), "Dispatched due alerts.");
        }
        Ok(evaluation.alerts)
    }

    /// Registers the periodic cycle on the given task set.
    ///
    /// Registration keeps an existing schedule: calling this a second time
    /// is a no-op and returns false. The first tick is delayed by an offset
    /// inside the flex window so cycles do not align to process start.
    pub fn register(
        self: &Arc<Self>,
        join_set: &mut JoinSet<()>,
        cancellation_token: CancellationToken,
    ) -> bool {
        if self.registered.swap(true, Ordering::SeqCst) {
            tracing::debug!("Monitor cycle already registered; keeping existing schedule.");
            return false;
        }

        let monitor = Arc::clone(self);
        join_set.spawn(async move {
            let offset = flex_offset(monitor.config.poll_flex_secs);
            let period = monitor.config.poll_interval_secs;
            tracing::info!(?period, ?offset, "Match monitor cycle scheduled.");

            let start = tokio::time::Instant::now() + offset;
            let mut interval = tokio::time::interval_at(start, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = cancellation_token.cancelled() => {
                        tracing::info!("Match monitor received shutdown signal.");
                        break;
                    }
                    _ = interval.tick() => {
                        match monitor.run_cycle().await {
                            Ok(alerts) => {
                                tracing::debug!(count = alerts.len(), "Monitor cycle completed.");
                            }
                            Err(e) => {
                                tracing::warn!(error = %e, "Monitor cycle failed; retrying at next tick.");
                            }
                        }
                    }
                }
            }
        });

        true
    }
}

/// Picks a start offset inside the flex window, derived from the wall clock
/// so different processes spread out.
fn flex_offset(flex: Duration) -> Duration {
    let flex_ms = flex.as_millis() as u64;
    if flex_ms == 0 {
        return Duration::ZERO;
    }
    let nanos =
        SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().subsec_nanos() as u64;
    Duration::from_millis(nanos % flex_ms)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use mockall::predicate::eq;

    use super::*;
    use crate::{
        http_client::HttpClientPool,
        models::{AlertKind, MatchAlertState, MatchStatus},
        persistence::traits::MockKeyValueStore,
        providers::traits::MockMatchSource,
        test_helpers::MatchRecordBuilder,
    };

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, hour, minute, 0).unwrap()
    }

    async fn empty_dispatcher() -> Arc<ChannelDispatcher> {
        Arc::new(ChannelDispatcher::new(&[], Arc::new(HttpClientPool::new())).await.unwrap())
    }

    fn monitor(
        source: MockMatchSource,
        store: MockKeyValueStore,
        dispatcher: Arc<ChannelDispatcher>,
    ) -> Arc<MatchMonitor<MockKeyValueStore>> {
        let config = Arc::new(AppConfig::builder().build());
        Arc::new(MatchMonitor::new(config, Arc::new(source), dispatcher, Arc::new(store)))
    }

    #[tokio::test]
    async fn cycle_persists_newly_fired_window() {
        let record = MatchRecordBuilder::new("m-1").scheduled_at(at(12, 45)).build();

        let mut source = MockMatchSource::new();
        source.expect_fetch_all().times(1).returning(move || Ok(vec![record.clone()]));

        let mut store = MockKeyValueStore::new();
        store
            .expect_set_json_state::<MatchAlertState>()
            .withf(|key, state| key == "alert_state:m-1" && state.windows.contains(&60))
            .times(1)
            .returning(|_, _| Ok(()));

        let monitor = monitor(source, store, empty_dispatcher().await);
        let alerts = monitor.run_cycle_at(at(12, 0)).await.unwrap();

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::Upcoming { window_minutes: 60 });
    }

    #[tokio::test]
    async fn cycle_deletes_state_of_finished_match() {
        let finished = MatchRecordBuilder::new("m-1")
            .scheduled_at(at(11, 0))
            .status(MatchStatus::Finished)
            .build();

        let mut source = MockMatchSource::new();
        source.expect_fetch_all().times(1).returning(move || Ok(vec![finished.clone()]));

        let mut store = MockKeyValueStore::new();
        store
            .expect_get_all_json_states_by_prefix::<MatchAlertState>()
            .with(eq("alert_state:"))
            .times(1)
            .returning(|_| {
                let mut state = MatchAlertState::default();
                state.windows.insert(60);
                Ok(vec![("alert_state:m-1".to_string(), state)])
            });
        store
            .expect_delete_json_state()
            .with(eq("alert_state:m-1"))
            .times(1)
            .returning(|_| Ok(()));

        let monitor = monitor(source, store, empty_dispatcher().await);
        monitor.hydrate().await.unwrap();

        let alerts = monitor.run_cycle_at(at(12, 0)).await.unwrap();
        assert!(alerts.is_empty());
    }

    #[tokio::test]
    async fn hydrated_state_suppresses_duplicate_alerts() {
        let record = MatchRecordBuilder::new("m-1").scheduled_at(at(12, 45)).build();

        let mut source = MockMatchSource::new();
        source.expect_fetch_all().times(1).returning(move || Ok(vec![record.clone()]));

        let mut store = MockKeyValueStore::new();
        store
            .expect_get_all_json_states_by_prefix::<MatchAlertState>()
            .with(eq("alert_state:"))
            .times(1)
            .returning(|_| {
                let mut state = MatchAlertState::default();
                state.windows.insert(60);
                Ok(vec![("alert_state:m-1".to_string(), state)])
            });

        let monitor = monitor(source, store, empty_dispatcher().await);
        assert_eq!(monitor.hydrate().await.unwrap(), 1);

        // The 60-minute window already fired before the restart.
        let alerts = monitor.run_cycle_at(at(12, 0)).await.unwrap();
        assert!(alerts.is_empty());
    }

    #[tokio::test]
    async fn fetch_failure_is_a_retryable_cycle_failure() {
        let mut source = MockMatchSource::new();
        source.expect_fetch_all().times(1).returning(|| {
            Err(MatchSourceError::UrlParse(url::ParseError::EmptyHost))
        });

        let store = MockKeyValueStore::new();
        let monitor = monitor(source, store, empty_dispatcher().await);

        let result = monitor.run_cycle_at(at(12, 0)).await;
        assert!(matches!(result, Err(MatchMonitorError::Source(_))));
    }

    #[tokio::test]
    async fn store_write_failure_does_not_fail_the_cycle() {
        let record = MatchRecordBuilder::new("m-1").scheduled_at(at(12, 45)).build();

        let mut source = MockMatchSource::new();
        source.expect_fetch_all().times(1).returning(move || Ok(vec![record.clone()]));

        let mut store = MockKeyValueStore::new();
        store
            .expect_set_json_state::<MatchAlertState>()
            .times(1)
            .returning(|_, _| Err(PersistenceError::OperationFailed("disk full".to_string())));

        let monitor = monitor(source, store, empty_dispatcher().await);
        let alerts = monitor.run_cycle_at(at(12, 0)).await.unwrap();
        assert_eq!(alerts.len(), 1);
    }

    #[tokio::test]
    async fn second_registration_is_a_no_op() {
        // The scheduled task may get a tick in before cancellation, so the
        // source tolerates any number of fetches.
        let mut source = MockMatchSource::new();
        source.expect_fetch_all().returning(|| Ok(vec![]));
        let store = MockKeyValueStore::new();
        let monitor = monitor(source, store, empty_dispatcher().await);

        let mut join_set = JoinSet::new();
        let token = CancellationToken::new();

        assert!(monitor.register(&mut join_set, token.clone()));
        assert!(!monitor.register(&mut join_set, token.clone()));

        token.cancel();
        join_set.shutdown().await;
    }

    #[test]
    fn flex_offset_is_bounded_by_the_window() {
        let flex = Duration::from_secs(300);
        for _ in 0..10 {
            assert!(flex_offset(flex) < flex);
        }
        assert_eq!(flex_offset(Duration::ZERO), Duration::ZERO);
    }
}
