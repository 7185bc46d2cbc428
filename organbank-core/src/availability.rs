//! Availability board: per-organ stock as reported by the backend.

use crate::events::{BusEvent, EventBus};
use crate::gateway::Gateway;
use crate::registry::RegistrySnapshot;
use itertools::Itertools;
use organbank_sdk::objects::{OrganAvailability, OrganStatus};
use time::OffsetDateTime;
use tracing::{info, warn};

/// Below this many units an organ is flagged as low on stock.
pub const LOW_STOCK_THRESHOLD: u32 = 5;

/// One card on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardEntry {
    pub name: String,
    pub status: OrganStatus,
    pub units: u32,
}

impl BoardEntry {
    pub fn is_low_stock(&self) -> bool {
        self.units < LOW_STOCK_THRESHOLD
    }

    /// Fill level of the stock bar, 10% per unit, capped at 100.
    pub fn fill_percent(&self) -> u32 {
        self.units.saturating_mul(10).min(100)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvailabilityBoard {
    entries: Vec<BoardEntry>,
    loaded_at: Option<OffsetDateTime>,
}

impl AvailabilityBoard {
    /// Build from backend entries. Repeated names keep their first
    /// occurrence.
    pub fn from_entries(entries: Vec<OrganAvailability>) -> Self {
        let entries = entries
            .into_iter()
            .unique_by(|entry| entry.organ_name.clone())
            .map(|entry| BoardEntry {
                status: entry.resolved_status(),
                units: entry.units(),
                name: entry.organ_name,
            })
            .collect();
        Self {
            entries,
            loaded_at: None,
        }
    }

    /// Board derived from the registry when the backend cannot be reached.
    /// Unit counts are unknown and shown as zero.
    pub fn from_registry(snapshot: &RegistrySnapshot) -> Self {
        let entries = snapshot
            .organs
            .iter()
            .map(|(organ, status)| BoardEntry {
                name: organ.as_str().to_string(),
                status: *status,
                units: 0,
            })
            .collect();
        Self {
            entries,
            loaded_at: None,
        }
    }

    /// Fetch the board, falling back to the registry view on failure.
    pub async fn load(gateway: &dyn Gateway, fallback: &RegistrySnapshot) -> Self {
        let board = match gateway.availability().await {
            Ok(entries) => {
                info!(entries = entries.len(), "Availability loaded");
                Self::from_entries(entries)
            }
            Err(e) => {
                warn!(error = %e, "Availability unavailable, showing registry state");
                Self::from_registry(fallback)
            }
        };
        Self {
            loaded_at: Some(OffsetDateTime::now_utc()),
            ..board
        }
    }

    pub fn entries(&self) -> &[BoardEntry] {
        &self.entries
    }

    pub fn loaded_at(&self) -> Option<OffsetDateTime> {
        self.loaded_at
    }

    /// Entries whose name contains `term`, ignoring case. An empty term
    /// matches everything.
    pub fn search(&self, term: &str) -> Vec<&BoardEntry> {
        let term = term.to_lowercase();
        self.entries
            .iter()
            .filter(|entry| entry.name.to_lowercase().contains(&term))
            .collect()
    }

    /// Announce a submitted search with `AvailabilitySubmitted`.
    ///
    /// Only a non-empty term with at least one hit can be submitted; returns
    /// whether the event was published.
    pub fn submit(&self, bus: &EventBus, term: &str) -> bool {
        if term.is_empty() || self.search(term).is_empty() {
            return false;
        }
        let reached = bus.publish(BusEvent::AvailabilitySubmitted {
            search_term: term.to_string(),
            submitted_at: OffsetDateTime::now_utc(),
        });
        info!(term, subscribers = reached, "Availability submitted");
        true
    }
}
