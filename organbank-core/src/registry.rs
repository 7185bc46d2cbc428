//! Shared organ registry.
//!
//! Holds the last known [`OrganStatus`] of every allow-listed organ plus a
//! transient "just donated" highlight. The registry is created by the
//! application root and handed to whoever needs it; there is no global
//! instance. Every mutation is published on a `watch` channel so views can
//! re-render.

use crate::events::{BusEvent, EventBus, Subscription, Topic};
use crate::gateway::{Gateway, GatewayError};
use organbank_sdk::objects::{OrganAvailability, OrganStatus, OrganType, names_match};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::AbortHandle;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info, warn};

/// How long a highlight stays up unless replaced.
pub const DEFAULT_HIGHLIGHT_TTL: Duration = Duration::from_secs(5);

/// Point-in-time view of the registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrySnapshot {
    /// Known organs in allow-list order.
    pub organs: BTreeMap<OrganType, OrganStatus>,
    /// Organ currently emphasised as "just donated".
    pub highlighted: Option<String>,
}

impl RegistrySnapshot {
    pub fn status(&self, organ: OrganType) -> Option<OrganStatus> {
        self.organs.get(&organ).copied()
    }

    pub fn is_highlighted(&self, name: &str) -> bool {
        self.highlighted
            .as_deref()
            .is_some_and(|current| names_match(current, name))
    }
}

struct HighlightTimer {
    generation: u64,
    clear_task: Option<AbortHandle>,
}

/// Handle to the shared organ registry. Clones share state.
#[derive(Clone)]
pub struct OrganRegistry {
    gateway: Arc<dyn Gateway>,
    state: Arc<watch::Sender<RegistrySnapshot>>,
    highlight_timer: Arc<Mutex<HighlightTimer>>,
    highlight_ttl: Duration,
}

impl OrganRegistry {
    /// Create an empty registry. Call [`initialize`](Self::initialize) once
    /// at startup to populate it.
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        let (state, _) = watch::channel(RegistrySnapshot::default());
        Self {
            gateway,
            state: Arc::new(state),
            highlight_timer: Arc::new(Mutex::new(HighlightTimer {
                generation: 0,
                clear_task: None,
            })),
            highlight_ttl: DEFAULT_HIGHLIGHT_TTL,
        }
    }

    /// Override how long a highlight stays up.
    pub fn with_highlight_ttl(mut self, ttl: Duration) -> Self {
        self.highlight_ttl = ttl;
        self
    }

    /// Populate the registry from the gateway.
    ///
    /// If the availability resource cannot be read, every allow-listed organ
    /// is recorded as [`OrganStatus::Unavailable`].
    pub async fn initialize(&self) {
        let organs = match self.fetch().await {
            Ok(organs) => {
                info!(organs = organs.len(), "Organ registry initialized from gateway");
                organs
            }
            Err(e) => {
                warn!(error = %e, "Availability fetch failed, registry falls back to allow-list");
                OrganType::ALL
                    .into_iter()
                    .map(|organ| (organ, OrganStatus::Unavailable))
                    .collect()
            }
        };
        self.state.send_modify(|s| s.organs = organs);
    }

    /// Re-fetch availability and replace the mapping wholesale.
    ///
    /// On failure the previous mapping is kept and the error is only logged.
    pub async fn refresh(&self) {
        match self.fetch().await {
            Ok(organs) => {
                debug!(organs = organs.len(), "Organ registry refreshed");
                self.state.send_modify(|s| s.organs = organs);
            }
            Err(e) => {
                warn!(error = %e, "Organ registry refresh failed, keeping previous state");
            }
        }
    }

    /// Set the status of one organ.
    ///
    /// Names outside the allow-list are ignored. Returns whether an entry was
    /// changed.
    pub fn update_status(&self, name: &str, status: OrganStatus) -> bool {
        if OrganType::from_canonical(name).is_none() {
            debug!(name, "Ignoring status update for organ outside the allow-list");
            return false;
        }
        self.state.send_if_modified(|s| {
            let mut changed = false;
            for (organ, current) in s.organs.iter_mut() {
                if names_match(organ.as_str(), name) && *current != status {
                    *current = status;
                    changed = true;
                }
            }
            changed
        })
    }

    /// Emphasise `name` for the configured TTL.
    ///
    /// A newer highlight replaces the current one and restarts the TTL; the
    /// clear scheduled by the older call is cancelled and can never clear the
    /// newer highlight. Must be called from within a Tokio runtime.
    pub fn highlight(&self, name: &str) {
        let mut timer = self
            .highlight_timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        timer.generation += 1;
        if let Some(previous) = timer.clear_task.take() {
            previous.abort();
        }

        let name = name.to_string();
        debug!(organ = %name, "Highlighting organ");
        self.state.send_modify(|s| s.highlighted = Some(name));

        let generation = timer.generation;
        let ttl = self.highlight_ttl;
        let state = Arc::clone(&self.state);
        let timers = Arc::clone(&self.highlight_timer);
        let task = tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            let timer = timers.lock().unwrap_or_else(PoisonError::into_inner);
            if timer.generation == generation {
                state.send_modify(|s| s.highlighted = None);
                debug!("Highlight expired");
            }
        });
        timer.clear_task = Some(task.abort_handle());
    }

    /// Current state.
    pub fn snapshot(&self) -> RegistrySnapshot {
        self.state.borrow().clone()
    }

    /// Receiver that observes every registry change.
    pub fn subscribe(&self) -> watch::Receiver<RegistrySnapshot> {
        self.state.subscribe()
    }

    /// Registry changes as a stream, starting with the current state.
    pub fn updates(&self) -> WatchStream<RegistrySnapshot> {
        WatchStream::new(self.state.subscribe())
    }

    /// React to donor registrations: refresh availability and highlight the
    /// first allow-listed organ the donor pledged.
    ///
    /// The returned subscription must be kept alive for as long as the
    /// registry should listen.
    pub fn attach(&self, bus: &EventBus) -> Subscription {
        let registry = self.clone();
        bus.subscribe(Topic::DonorRegistered, move |event| {
            let BusEvent::DonorRegistered { organs, .. } = event else {
                return;
            };
            if let Some(organ) = organs
                .iter()
                .find_map(|name| OrganType::from_canonical(name))
            {
                registry.highlight(organ.as_str());
            }
            let registry = registry.clone();
            tokio::spawn(async move { registry.refresh().await });
        })
    }

    async fn fetch(&self) -> Result<BTreeMap<OrganType, OrganStatus>, GatewayError> {
        let entries = self.gateway.availability().await?;
        Ok(filter_to_allow_list(&entries))
    }
}

/// Keep allow-listed entries only, ordered by the allow-list. A name
/// reported twice keeps its last status.
fn filter_to_allow_list(entries: &[OrganAvailability]) -> BTreeMap<OrganType, OrganStatus> {
    entries
        .iter()
        .filter_map(|entry| {
            OrganType::from_canonical(&entry.organ_name)
                .map(|organ| (organ, entry.resolved_status()))
        })
        .collect()
}
