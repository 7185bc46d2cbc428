//! Form state and submission.
//!
//! The form types only collect and validate input. The `submit_*`
//! functions send the result to the gateway and, on success, announce it on
//! the bus so open views refresh. A failed submission publishes nothing and
//! is returned to the caller to show.

mod donor;
mod hospital;

pub use donor::{DonorDraft, DonorWizard, MINIMUM_DONOR_AGE, PHONE_DIGITS, WizardStep};
pub use hospital::HospitalRequestForm;

use crate::events::{BusEvent, EventBus};
use crate::gateway::{Gateway, GatewayError};
use organbank_sdk::objects::{Donor, DonorRegistration, NewOrganRequest, OrganRequest};
use thiserror::Error;
use tracing::{info, warn};

/// Organ names offered when the backend cannot list its own.
pub const FALLBACK_VALID_ORGANS: [&str; 11] = [
    "Heart",
    "Liver",
    "Kidney",
    "Lung",
    "Pancreas",
    "Intestine",
    "Cornea",
    "Skin",
    "Bone",
    "Heart Valve",
    "Blood Vessel",
];

/// Validation failures, worded for the person filling in the form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("age must be a whole number, got {0:?}")]
    InvalidAge(String),

    #[error("age must be 18 or above to register as a donor")]
    Underage,

    #[error("phone number must be exactly 10 digits")]
    InvalidPhone,

    #[error("select at least one organ to donate")]
    NoOrgans,

    #[error("unknown blood type {0:?}")]
    InvalidBloodType(String),
}

/// Organ names the donor form offers: the backend's list, or
/// [`FALLBACK_VALID_ORGANS`] if it cannot be fetched.
pub async fn valid_organs(gateway: &dyn Gateway) -> Vec<String> {
    match gateway.valid_organs().await {
        Ok(organs) if !organs.is_empty() => organs,
        Ok(_) => fallback_organs(),
        Err(e) => {
            warn!(error = %e, "Valid organ list unavailable, using fallback");
            fallback_organs()
        }
    }
}

fn fallback_organs() -> Vec<String> {
    FALLBACK_VALID_ORGANS.iter().map(|s| s.to_string()).collect()
}

/// Register a donor and announce it with `DonorRegistered`.
pub async fn submit_donor(
    gateway: &dyn Gateway,
    bus: &EventBus,
    registration: DonorRegistration,
) -> Result<Option<Donor>, GatewayError> {
    let donor = gateway.register_donor(&registration).await?;
    info!(
        name = %registration.name,
        organs = registration.organs.len(),
        "Donor registered"
    );
    bus.publish(BusEvent::DonorRegistered {
        donor: donor.clone(),
        organs: registration.organs,
    });
    Ok(donor)
}

/// Send a hospital request and announce it with `HospitalRequestSent`
/// followed by `ForceRefreshRequests`.
pub async fn submit_hospital_request(
    gateway: &dyn Gateway,
    bus: &EventBus,
    request: NewOrganRequest,
) -> Result<Option<OrganRequest>, GatewayError> {
    let stored = gateway.submit_request(&request).await?;
    info!(
        hospital = %request.hospital_name,
        organ = %request.organ_type,
        urgency = %request.urgency,
        "Hospital request sent"
    );
    bus.publish(BusEvent::HospitalRequestSent {
        request: stored.clone(),
        sent_at: time::OffsetDateTime::now_utc(),
    });
    bus.publish(BusEvent::ForceRefreshRequests);
    Ok(stored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Topic;
    use crate::gateway::testing::InMemoryGateway;
    use organbank_sdk::objects::{Gender, Urgency};
    use std::sync::{Arc, Mutex};

    fn topic_log(bus: &EventBus) -> (Arc<Mutex<Vec<Topic>>>, Vec<crate::events::Subscription>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let subs = Topic::ALL
            .into_iter()
            .map(|topic| {
                let log = Arc::clone(&log);
                bus.subscribe(topic, move |event| log.lock().unwrap().push(event.topic()))
            })
            .collect();
        (log, subs)
    }

    fn registration() -> DonorRegistration {
        DonorRegistration {
            name: "Meera".into(),
            age: 29,
            gender: Gender::Female,
            phone_number: "9123456780".into(),
            address: "4 Hill View".into(),
            organs: vec!["Kidney".into()],
        }
    }

    #[tokio::test]
    async fn test_submit_donor_publishes() {
        let gateway = InMemoryGateway::healthy();
        let bus = EventBus::new();
        let (log, _subs) = topic_log(&bus);

        let donor = submit_donor(&gateway, &bus, registration()).await.unwrap();

        assert_eq!(donor.unwrap().name, "Meera");
        assert_eq!(*log.lock().unwrap(), vec![Topic::DonorRegistered]);
        assert_eq!(gateway.donors().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_submission_publishes_nothing() {
        let gateway = InMemoryGateway::healthy();
        *gateway.reject_writes.lock().unwrap() = true;
        let bus = EventBus::new();
        let (log, _subs) = topic_log(&bus);

        assert!(submit_donor(&gateway, &bus, registration()).await.is_err());
        let request = HospitalRequestForm {
            hospital_name: "General".into(),
            organ_type: "Heart".into(),
            patient_name: "P".into(),
            ..Default::default()
        }
        .build()
        .unwrap();
        assert!(submit_hospital_request(&gateway, &bus, request).await.is_err());

        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submit_hospital_request_publishes_both_topics() {
        let gateway = InMemoryGateway::healthy();
        let bus = EventBus::new();
        let (log, _subs) = topic_log(&bus);
        let request = HospitalRequestForm {
            hospital_name: "General".into(),
            organ_type: "Liver".into(),
            patient_name: "P".into(),
            urgency: Urgency::High,
            ..Default::default()
        }
        .build()
        .unwrap();

        let stored = submit_hospital_request(&gateway, &bus, request)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(stored.status.as_deref(), Some("PENDING"));
        assert_eq!(
            *log.lock().unwrap(),
            vec![Topic::HospitalRequestSent, Topic::ForceRefreshRequests]
        );
    }

    #[tokio::test]
    async fn test_valid_organs_fallback() {
        let gateway = InMemoryGateway::healthy();
        *gateway.valid_organs.lock().unwrap() = Some(vec!["Heart".into(), "Cornea".into()]);
        assert_eq!(valid_organs(&gateway).await, vec!["Heart", "Cornea"]);

        *gateway.valid_organs.lock().unwrap() = None;
        let organs = valid_organs(&gateway).await;
        assert_eq!(organs.len(), FALLBACK_VALID_ORGANS.len());
        assert_eq!(organs[0], "Heart");
    }
}
