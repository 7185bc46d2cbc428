//! ReconciliationView processor.
//!
//! The ReconciliationView is responsible for:
//! - Fetching donors and requests concurrently as soon as it is activated
//! - Re-fetching both on a fixed interval until deactivated
//! - Re-fetching one list out of band when a bus event announces a change,
//!   without disturbing the timer's phase
//! - Publishing a freshly reconciled [`BankSnapshot`] after every cycle
//!
//! Fetches run as tasks of their own; the polling loop only starts them and
//! folds in their results, so a slow backend never delays a tick or
//! shutdown. A failed fetch keeps the previous list (empty on first load);
//! polling carries on regardless of how long the backend stays away.

use crate::events::{EventBus, Subscription, Topic};
use crate::gateway::{Gateway, GatewayError};
use crate::matching::BankSnapshot;
use kanau::processor::Processor;
use organbank_sdk::objects::{Donor, OrganRequest};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Polling period of the bank view.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Pending out-of-band refreshes. Further triggers while this many are queued
/// are dropped; the queued ones already cover them.
const TRIGGER_BUFFER: usize = 8;

/// Which lists a refresh cycle re-fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    Donors,
    Requests,
    All,
}

/// Builder for an auto-refreshing donor/request view.
pub struct ReconciliationView {
    gateway: Arc<dyn Gateway>,
    poll_interval: Duration,
}

impl ReconciliationView {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self {
            gateway,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Start polling and listening on `bus`.
    ///
    /// The first cycle starts immediately. The view runs until the returned
    /// handle is deactivated or dropped. Must be called from within a Tokio
    /// runtime.
    pub fn activate(self, bus: &EventBus) -> ViewHandle {
        let (snapshot_tx, snapshot_rx) = watch::channel(BankSnapshot::default());
        let (trigger_tx, trigger_rx) = mpsc::channel(TRIGGER_BUFFER);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let subscriptions = vec![
            forward_trigger(bus, Topic::DonorRegistered, RefreshTrigger::Donors, &trigger_tx),
            forward_trigger(
                bus,
                Topic::HospitalRequestSent,
                RefreshTrigger::Requests,
                &trigger_tx,
            ),
            forward_trigger(
                bus,
                Topic::ForceRefreshRequests,
                RefreshTrigger::Requests,
                &trigger_tx,
            ),
        ];

        let poller = Poller {
            fetcher: Fetcher {
                gateway: self.gateway,
            },
            snapshot: snapshot_tx,
        };
        let task = tokio::spawn(poller.run(shutdown_rx, trigger_rx, self.poll_interval));

        ViewHandle {
            snapshot: snapshot_rx,
            trigger_tx,
            shutdown_tx,
            task: Some(task),
            subscriptions,
        }
    }
}

fn forward_trigger(
    bus: &EventBus,
    topic: Topic,
    trigger: RefreshTrigger,
    trigger_tx: &mpsc::Sender<RefreshTrigger>,
) -> Subscription {
    let trigger_tx = trigger_tx.clone();
    bus.subscribe(topic, move |_| match trigger_tx.try_send(trigger) {
        Ok(()) => debug!(%topic, ?trigger, "Queued out-of-band refresh"),
        Err(TrySendError::Full(_)) => debug!(%topic, "Refresh queue full, skipping"),
        Err(TrySendError::Closed(_)) => debug!(%topic, "View stopped, ignoring event"),
    })
}

// ---------------------------------------------------------------------------
// ViewHandle
// ---------------------------------------------------------------------------

/// Handle to an active view.
///
/// Dropping the handle stops polling and deregisters the bus handlers;
/// [`deactivate`](ViewHandle::deactivate) does the same but waits for the
/// polling task to finish.
pub struct ViewHandle {
    snapshot: watch::Receiver<BankSnapshot>,
    trigger_tx: mpsc::Sender<RefreshTrigger>,
    shutdown_tx: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
    subscriptions: Vec<Subscription>,
}

impl ViewHandle {
    /// Latest reconciled state.
    pub fn snapshot(&self) -> BankSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Receiver notified after every refresh cycle.
    pub fn subscribe(&self) -> watch::Receiver<BankSnapshot> {
        self.snapshot.clone()
    }

    /// Request an immediate refresh (the manual refresh buttons).
    ///
    /// Returns `false` if the request could not be queued.
    pub fn refresh_now(&self, trigger: RefreshTrigger) -> bool {
        self.trigger_tx.try_send(trigger).is_ok()
    }

    /// Stop polling, deregister bus handlers and wait for the polling task.
    ///
    /// Fetches still in flight are not awaited and their results are dropped.
    pub async fn deactivate(mut self) {
        self.subscriptions.clear();
        let _ = self.shutdown_tx.send(true);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "Reconciliation task ended abnormally");
            }
        }
        info!("Reconciliation view deactivated");
    }
}

impl Drop for ViewHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

// ---------------------------------------------------------------------------
// Fetcher
// ---------------------------------------------------------------------------

/// Lists fetched by one refresh. `None` means the list was not asked for.
struct FetchOutcome {
    trigger: RefreshTrigger,
    donors: Option<Result<Vec<Donor>, GatewayError>>,
    requests: Option<Result<Vec<OrganRequest>, GatewayError>>,
}

#[derive(Clone)]
struct Fetcher {
    gateway: Arc<dyn Gateway>,
}

impl Processor<RefreshTrigger> for Fetcher {
    type Output = FetchOutcome;
    type Error = Infallible;

    async fn process(&self, trigger: RefreshTrigger) -> Result<FetchOutcome, Infallible> {
        let (donors, requests) = match trigger {
            RefreshTrigger::Donors => (Some(self.gateway.donors().await), None),
            RefreshTrigger::Requests => (None, Some(self.gateway.requests().await)),
            RefreshTrigger::All => {
                let (donors, requests) =
                    tokio::join!(self.gateway.donors(), self.gateway.requests());
                (Some(donors), Some(requests))
            }
        };
        Ok(FetchOutcome {
            trigger,
            donors,
            requests,
        })
    }
}

// ---------------------------------------------------------------------------
// Poller
// ---------------------------------------------------------------------------

struct Poller {
    fetcher: Fetcher,
    snapshot: watch::Sender<BankSnapshot>,
}

impl Poller {
    async fn run(
        self,
        mut shutdown_rx: watch::Receiver<bool>,
        mut trigger_rx: mpsc::Receiver<RefreshTrigger>,
        poll_interval: Duration,
    ) {
        let mut ticker = tokio::time::interval(poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut in_flight: JoinSet<FetchOutcome> = JoinSet::new();
        info!(?poll_interval, "Reconciliation view started");

        loop {
            tokio::select! {
                biased;

                // Shutdown has highest priority. A dropped sender counts too.
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        debug!("Reconciliation view received shutdown signal");
                        break;
                    }
                }

                // A fetch finished.
                Some(joined) = in_flight.join_next() => match joined {
                    Ok(outcome) => {
                        // The view may have been torn down while the fetch was in flight.
                        if *shutdown_rx.borrow() {
                            debug!(
                                trigger = ?outcome.trigger,
                                "Discarding refresh result after shutdown"
                            );
                            continue;
                        }
                        self.apply(outcome);
                    }
                    Err(e) => warn!(error = %e, "Refresh task failed"),
                },

                // Out-of-band refresh from the bus or a manual request.
                Some(trigger) = trigger_rx.recv() => {
                    self.spawn_fetch(&mut in_flight, trigger);
                }

                // Regular poll, first one immediately.
                _ = ticker.tick() => {
                    self.spawn_fetch(&mut in_flight, RefreshTrigger::All);
                }
            }
        }

        // Pending fetches finish on their own; nothing reads their results.
        let pending = in_flight.len();
        in_flight.detach_all();
        info!(pending, "Reconciliation view stopped");
    }

    fn spawn_fetch(
        &self,
        in_flight: &mut JoinSet<FetchOutcome>,
        trigger: RefreshTrigger,
    ) {
        let fetcher = self.fetcher.clone();
        debug!(?trigger, in_flight = in_flight.len(), "Starting refresh");
        in_flight.spawn(async move {
            let Ok(outcome) = fetcher.process(trigger).await;
            outcome
        });
    }

    /// Fold fetch results into a new snapshot. A failed list keeps its
    /// previous value.
    fn apply(&self, outcome: FetchOutcome) {
        let current = self.snapshot.borrow().clone();

        let donors = match outcome.donors {
            Some(Ok(donors)) => donors,
            Some(Err(e)) => {
                warn!(error = %e, "Donor fetch failed, keeping previous list");
                current.donors
            }
            None => current.donors,
        };
        let requests = match outcome.requests {
            Some(Ok(requests)) => requests,
            Some(Err(e)) => {
                warn!(error = %e, "Request fetch failed, keeping previous list");
                current.requests.into_iter().map(|r| r.request).collect()
            }
            None => current.requests.into_iter().map(|r| r.request).collect(),
        };

        let mut next = BankSnapshot::reconcile(donors, requests);
        next.refreshed_at = Some(time::OffsetDateTime::now_utc());
        debug!(
            trigger = ?outcome.trigger,
            donors = next.stats.total_donors,
            requests = next.stats.total_requests,
            fulfilled = next.stats.fulfilled,
            "Reconciled bank snapshot"
        );
        self.snapshot.send_replace(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::BusEvent;
    use crate::gateway::testing::{InMemoryGateway, donor, request};

    const TICK: Duration = Duration::from_millis(10);

    fn activate(gateway: &Arc<InMemoryGateway>, bus: &EventBus) -> ViewHandle {
        ReconciliationView::new(Arc::clone(gateway) as Arc<dyn Gateway>).activate(bus)
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_fetch_and_stable_polling() {
        let gateway = Arc::new(InMemoryGateway::healthy());
        gateway.set_donors(Some(vec![donor("a", &["Heart"]), donor("b", &["Liver"])]));
        gateway.set_requests(Some(vec![
            request("Heart", Some("PENDING")),
            request("Lungs", Some("PENDING")),
            request("Blood", None),
        ]));
        let bus = EventBus::new();
        let view = activate(&gateway, &bus);

        tokio::time::sleep(TICK).await;
        let first = view.snapshot();
        assert_eq!(first.stats.total_donors, 2);
        assert_eq!(first.stats.total_requests, 3);
        assert!(first.refreshed_at.is_some());
        assert_eq!(gateway.donor_calls(), 1);
        assert_eq!(gateway.request_calls(), 1);

        tokio::time::sleep(DEFAULT_POLL_INTERVAL).await;
        let second = view.snapshot();
        assert_eq!(gateway.donor_calls(), 2);
        assert_eq!(second.donors, first.donors);
        assert_eq!(second.requests, first.requests);
        assert_eq!(second.stats, first.stats);

        view.deactivate().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_donor_registered_event_fulfils_request() {
        let gateway = Arc::new(InMemoryGateway::healthy());
        gateway.set_requests(Some(vec![request("Kidney", Some("PENDING"))]));
        let bus = EventBus::new();
        let view = activate(&gateway, &bus);

        tokio::time::sleep(TICK).await;
        let before = view.snapshot();
        assert_eq!(before.requests[0].match_score, 0);
        assert_eq!(before.requests[0].display_status, "PENDING");
        assert_eq!((before.stats.fulfilled, before.stats.pending), (0, 1));

        gateway.set_donors(Some(vec![donor("new", &["Kidney"])]));
        bus.publish(BusEvent::DonorRegistered {
            donor: None,
            organs: vec!["Kidney".into()],
        });
        tokio::time::sleep(TICK).await;

        let after = view.snapshot();
        assert_eq!(after.requests[0].display_status, "FULFILLED");
        assert_eq!(after.requests[0].request.status.as_deref(), Some("PENDING"));
        assert_eq!((after.stats.fulfilled, after.stats.pending), (1, 0));
        // Only donors were re-fetched out of band.
        assert_eq!(gateway.donor_calls(), 2);
        assert_eq!(gateway.request_calls(), 1);

        view.deactivate().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_do_not_reset_timer_phase() {
        let gateway = Arc::new(InMemoryGateway::healthy());
        let bus = EventBus::new();
        let view = activate(&gateway, &bus);

        tokio::time::sleep(Duration::from_secs(2)).await;
        bus.publish(BusEvent::ForceRefreshRequests);
        tokio::time::sleep(TICK).await;
        assert_eq!(gateway.request_calls(), 2);

        // The regular tick still lands at t = 5s, not 2s + 5s.
        tokio::time::sleep(Duration::from_millis(2_900)).await;
        assert_eq!(gateway.request_calls(), 2);
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(gateway.request_calls(), 3);

        view.deactivate().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_fetch_does_not_shift_ticks() {
        let gateway = Arc::new(InMemoryGateway::healthy());
        gateway.set_request_delay(Duration::from_secs(2));
        let bus = EventBus::new();
        let view = activate(&gateway, &bus);

        // The out-of-band fetch runs from t = 4s to 6s, across the t = 5s tick.
        tokio::time::sleep(Duration::from_secs(4)).await;
        bus.publish(BusEvent::ForceRefreshRequests);
        tokio::time::sleep(Duration::from_millis(6_500)).await;

        // Ticks at t = 0, 5 and 10s; donors are only fetched by ticks.
        assert_eq!(gateway.donor_calls(), 3);
        assert_eq!(gateway.request_calls(), 4);

        view.deactivate().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_deactivate_discards_in_flight_result() {
        let gateway = Arc::new(InMemoryGateway::healthy());
        let bus = EventBus::new();
        let view = activate(&gateway, &bus);
        tokio::time::sleep(TICK).await;
        let snapshots = view.subscribe();

        gateway.set_request_delay(Duration::from_secs(2));
        gateway.set_requests(Some(vec![request("Heart", Some("PENDING"))]));
        assert!(view.refresh_now(RefreshTrigger::Requests));
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(gateway.request_calls(), 2);

        // Returns without waiting for the pending fetch.
        let started = tokio::time::Instant::now();
        view.deactivate().await;
        assert!(started.elapsed() < TICK);

        tokio::time::sleep(DEFAULT_POLL_INTERVAL).await;
        assert_eq!(snapshots.borrow().stats.total_requests, 0);
        assert_eq!(gateway.request_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_fetch_keeps_previous_list() {
        let gateway = Arc::new(InMemoryGateway::healthy());
        gateway.set_donors(None);
        gateway.set_requests(Some(vec![request("Heart", None)]));
        let bus = EventBus::new();
        let view = activate(&gateway, &bus);

        tokio::time::sleep(TICK).await;
        let first = view.snapshot();
        assert!(first.donors.is_empty());
        assert_eq!(first.stats.total_requests, 1);

        gateway.set_donors(Some(vec![donor("a", &["Heart"])]));
        gateway.set_requests(None);
        tokio::time::sleep(DEFAULT_POLL_INTERVAL).await;

        let second = view.snapshot();
        assert_eq!(second.stats.total_donors, 1);
        assert_eq!(second.stats.total_requests, 1);
        assert_eq!(second.stats.fulfilled, 1);

        // Polling keeps going while the backend is down.
        gateway.set_donors(None);
        tokio::time::sleep(DEFAULT_POLL_INTERVAL * 3).await;
        assert_eq!(gateway.donor_calls(), 5);
        assert_eq!(view.snapshot().stats.total_donors, 1);

        view.deactivate().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_refresh() {
        let gateway = Arc::new(InMemoryGateway::healthy());
        let bus = EventBus::new();
        let view = activate(&gateway, &bus);
        tokio::time::sleep(TICK).await;

        gateway.set_requests(Some(vec![request("Liver", None)]));
        assert!(view.refresh_now(RefreshTrigger::Requests));
        tokio::time::sleep(TICK).await;

        assert_eq!(view.snapshot().stats.total_requests, 1);
        view.deactivate().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_deactivate_stops_polling_and_unsubscribes() {
        let gateway = Arc::new(InMemoryGateway::healthy());
        let bus = EventBus::new();
        let view = activate(&gateway, &bus);
        tokio::time::sleep(TICK).await;
        assert_eq!(bus.subscriber_count(Topic::DonorRegistered), 1);

        view.deactivate().await;
        assert_eq!(bus.subscriber_count(Topic::DonorRegistered), 0);
        assert_eq!(bus.subscriber_count(Topic::ForceRefreshRequests), 0);

        let calls = gateway.donor_calls();
        bus.publish(BusEvent::DonorRegistered {
            donor: None,
            organs: vec![],
        });
        tokio::time::sleep(DEFAULT_POLL_INTERVAL * 2).await;
        assert_eq!(gateway.donor_calls(), calls);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_handle_stops_polling() {
        let gateway = Arc::new(InMemoryGateway::healthy());
        let bus = EventBus::new();
        let view = activate(&gateway, &bus);
        tokio::time::sleep(TICK).await;

        drop(view);
        let calls = gateway.request_calls();
        tokio::time::sleep(DEFAULT_POLL_INTERVAL * 2).await;
        assert_eq!(gateway.request_calls(), calls);
        assert_eq!(bus.subscriber_count(Topic::HospitalRequestSent), 0);
    }
}
