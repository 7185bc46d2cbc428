//! Donor/request reconciliation.
//!
//! Everything here is recomputed from the current donor and request lists;
//! nothing is cached between refresh cycles.

use organbank_sdk::objects::{Donor, OrganRequest};
use time::OffsetDateTime;

/// Match score of a request some donor can satisfy.
pub const FULL_MATCH: u8 = 100;
/// Match score of a request no donor can satisfy.
pub const NO_MATCH: u8 = 0;

/// Display status of a request with a full match.
pub const STATUS_FULFILLED: &str = "FULFILLED";
/// Display status when the server did not report one.
pub const STATUS_PENDING: &str = "PENDING";

/// [`FULL_MATCH`] if any donor pledged the requested organ (case-insensitive
/// name comparison), else [`NO_MATCH`].
///
/// Binary: blood type, urgency and quantity are not considered.
pub fn compute_match(request: &OrganRequest, donors: &[Donor]) -> u8 {
    if donors.iter().any(|donor| donor.offers(&request.organ_type)) {
        FULL_MATCH
    } else {
        NO_MATCH
    }
}

/// Status to show for `request` given its match score.
///
/// A full match overrides whatever the server reported; otherwise the server
/// status is shown verbatim.
pub fn derive_status(request: &OrganRequest, match_score: u8) -> &str {
    if match_score >= FULL_MATCH {
        STATUS_FULFILLED
    } else {
        request.status.as_deref().unwrap_or(STATUS_PENDING)
    }
}

/// A request row with its computed match state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciledRequest {
    pub request: OrganRequest,
    pub match_score: u8,
    pub display_status: String,
}

impl ReconciledRequest {
    pub fn is_fulfilled(&self) -> bool {
        self.match_score >= FULL_MATCH
    }
}

/// Aggregate statistics of one reconciliation cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BankStats {
    pub total_requests: usize,
    pub fulfilled: usize,
    pub pending: usize,
    pub total_donors: usize,
    /// Sum of pledged organs over all donors.
    pub total_organs: usize,
}

impl BankStats {
    /// Share of fulfilled requests, rounded to a whole percent.
    /// Zero when there are no requests.
    pub fn fulfillment_rate(&self) -> u8 {
        if self.total_requests == 0 {
            return 0;
        }
        let rate = (self.fulfilled as f64 / self.total_requests as f64 * 100.0).round();
        rate.clamp(0.0, 100.0) as u8
    }
}

/// The merged donor/request view with computed match state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BankSnapshot {
    pub donors: Vec<Donor>,
    pub requests: Vec<ReconciledRequest>,
    pub stats: BankStats,
    /// When the last refresh (successful or not) finished. `None` before the
    /// first one.
    pub refreshed_at: Option<OffsetDateTime>,
}

impl BankSnapshot {
    /// Build a snapshot from scratch.
    pub fn reconcile(donors: Vec<Donor>, requests: Vec<OrganRequest>) -> Self {
        let requests: Vec<ReconciledRequest> = requests
            .into_iter()
            .map(|request| {
                let match_score = compute_match(&request, &donors);
                let display_status = derive_status(&request, match_score).to_string();
                ReconciledRequest {
                    request,
                    match_score,
                    display_status,
                }
            })
            .collect();

        let fulfilled = requests.iter().filter(|r| r.is_fulfilled()).count();
        let stats = BankStats {
            total_requests: requests.len(),
            fulfilled,
            pending: requests.len() - fulfilled,
            total_donors: donors.len(),
            total_organs: donors.iter().map(Donor::organ_count).sum(),
        };

        Self {
            donors,
            requests,
            stats,
            refreshed_at: None,
        }
    }

    /// The first `limit` requests, for the activity feed.
    pub fn recent_activity(&self, limit: usize) -> impl Iterator<Item = &ReconciledRequest> {
        self.requests.iter().take(limit)
    }
}
