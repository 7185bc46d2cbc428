//! Bus topics and their typed payloads.

use organbank_sdk::objects::{Donor, OrganRequest};
use time::OffsetDateTime;

/// The closed set of bus topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    DonorRegistered,
    HospitalRequestSent,
    ForceRefreshRequests,
    AvailabilitySubmitted,
}

impl Topic {
    pub const ALL: [Topic; 4] = [
        Topic::DonorRegistered,
        Topic::HospitalRequestSent,
        Topic::ForceRefreshRequests,
        Topic::AvailabilitySubmitted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::DonorRegistered => "donor-registered",
            Topic::HospitalRequestSent => "hospital-request-sent",
            Topic::ForceRefreshRequests => "force-refresh-requests",
            Topic::AvailabilitySubmitted => "availability-submitted",
        }
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event together with its payload. The topic is implied by the variant.
#[derive(Debug, Clone)]
pub enum BusEvent {
    /// A donor registration was accepted by the backend.
    DonorRegistered {
        /// The stored donor when the backend echoed it back.
        donor: Option<Donor>,
        /// Organ names as submitted.
        organs: Vec<String>,
    },
    /// A hospital request was accepted by the backend.
    HospitalRequestSent {
        request: Option<OrganRequest>,
        sent_at: OffsetDateTime,
    },
    /// Ask request views to refetch immediately.
    ForceRefreshRequests,
    /// The availability board was submitted with a search term.
    AvailabilitySubmitted {
        search_term: String,
        submitted_at: OffsetDateTime,
    },
}

impl BusEvent {
    pub fn topic(&self) -> Topic {
        match self {
            BusEvent::DonorRegistered { .. } => Topic::DonorRegistered,
            BusEvent::HospitalRequestSent { .. } => Topic::HospitalRequestSent,
            BusEvent::ForceRefreshRequests => Topic::ForceRefreshRequests,
            BusEvent::AvailabilitySubmitted { .. } => Topic::AvailabilitySubmitted,
        }
    }
}
