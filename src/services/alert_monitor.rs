//! Background price-alert monitor.
//!
//! One instance owns the whole polling cycle: on each tick it batches every
//! stored alert id into a single price query, compares the returned prices
//! against the stored targets, notifies for each trigger and consumes the
//! triggered entries so an alert fires at most once. Constructed once by
//! the host application and shared through `AppState`.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use super::alert_store::AlertStore;
use super::coingecko::PriceSource;
use super::notify::NotificationSink;

#[derive(Clone)]
pub struct AlertMonitor {
    store: AlertStore,
    prices: Arc<dyn PriceSource>,
    sink: Arc<dyn NotificationSink>,
    period: Duration,
    task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl AlertMonitor {
    pub fn new(
        store: AlertStore,
        prices: Arc<dyn PriceSource>,
        sink: Arc<dyn NotificationSink>,
        period: Duration,
    ) -> Self {
        Self {
            store,
            prices,
            sink,
            period,
            task: Arc::new(Mutex::new(None)),
        }
    }

    /// Arm the recurring check. Idempotent: while a task is already running
    /// this is a no-op, so two call sites sharing one monitor still get
    /// exactly one timer. The first tick runs immediately rather than after
    /// the first period.
    pub fn start(&self) {
        let mut slot = self.task.lock().unwrap();
        if slot.as_ref().is_some_and(|h| !h.is_finished()) {
            return;
        }

        let monitor = self.clone();
        *slot = Some(tokio::spawn(async move {
            let mut interval = time::interval(monitor.period);
            // A slow poll delays the next tick instead of stacking ticks,
            // so at most one poll is ever in flight.
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                monitor.run_tick().await;
            }
        }));
    }

    /// Cancel the pending timer and abort any poll in flight.
    pub fn stop(&self) {
        if let Some(handle) = self.task.lock().unwrap().take() {
            handle.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .unwrap()
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// One poll cycle. Never panics and never propagates a failure: a price
    /// query error abandons the tick and the next one retries independently.
    pub async fn run_tick(&self) {
        let ids = self.store.ids();
        if ids.is_empty() {
            // No alerts, no network call.
            return;
        }

        let snapshot = match self.prices.simple_prices(&ids).await {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!("alert check skipped, price query failed: {e}");
                return;
            }
        };

        // Targets are re-read here rather than captured before the query:
        // the query is a suspension point and the store may have changed
        // underneath us.
        let mut triggered: Vec<(String, f64, f64)> = Vec::new();
        for id in ids {
            let Some(price) = snapshot.get(&id).copied() else {
                continue;
            };
            let Some(target) = self.store.target(&id) else {
                continue;
            };
            if price.is_finite() && target.is_finite() && price >= target {
                triggered.push((id, price, target));
            }
        }

        if triggered.is_empty() {
            return;
        }

        for (id, price, target) in &triggered {
            let body = format!("{id} reached ${price:.2} (target ${target:.2})");
            if let Err(e) = self.sink.notify("Crypto Price Alert", &body).await {
                // Delivery is best-effort; the alert is consumed regardless.
                tracing::debug!("notification for {id} not delivered: {e}");
            }
            tracing::info!("alert triggered for {id} at ${price:.2}");
        }

        let consumed: Vec<String> = triggered.into_iter().map(|(id, _, _)| id).collect();
        self.store.remove_all(&consumed);
    }
}
