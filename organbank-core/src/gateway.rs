//! Remote Data Gateway seam.
//!
//! Every component that talks to the backend holds an `Arc<dyn Gateway>`.
//! Production code passes a [`GatewayClient`]; tests pass an in-memory
//! double.

use async_trait::async_trait;
use organbank_sdk::client::{ClientError, GatewayClient};
use organbank_sdk::objects::{
    Donor, DonorRegistration, NewOrganRequest, OrganAvailability, OrganRequest,
};
use thiserror::Error;

/// Errors returned by a [`Gateway`].
///
/// Consumers treat every variant alike (log, keep previous state, carry on);
/// the distinction only matters for diagnostics.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The HTTP client failed: transport, non-2xx status or bad payload.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The gateway is not able to serve the call.
    #[error("gateway unavailable: {0}")]
    Unavailable(String),
}

/// Outbound calls to the donor, request and availability resources.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn availability(&self) -> Result<Vec<OrganAvailability>, GatewayError>;

    async fn donors(&self) -> Result<Vec<Donor>, GatewayError>;

    async fn requests(&self) -> Result<Vec<OrganRequest>, GatewayError>;

    /// Organ names accepted on a donor registration.
    async fn valid_organs(&self) -> Result<Vec<String>, GatewayError>;

    async fn register_donor(
        &self,
        registration: &DonorRegistration,
    ) -> Result<Option<Donor>, GatewayError>;

    async fn submit_request(
        &self,
        request: &NewOrganRequest,
    ) -> Result<Option<OrganRequest>, GatewayError>;
}

#[async_trait]
impl Gateway for GatewayClient {
    #[tracing::instrument(skip_all, err, name = "GET /api/availability")]
    async fn availability(&self) -> Result<Vec<OrganAvailability>, GatewayError> {
        Ok(GatewayClient::availability(self).await?)
    }

    #[tracing::instrument(skip_all, err, name = "GET /api/donors")]
    async fn donors(&self) -> Result<Vec<Donor>, GatewayError> {
        Ok(GatewayClient::donors(self).await?)
    }

    #[tracing::instrument(skip_all, err, name = "GET /api/requests")]
    async fn requests(&self) -> Result<Vec<OrganRequest>, GatewayError> {
        Ok(GatewayClient::requests(self).await?)
    }

    #[tracing::instrument(skip_all, err, name = "GET /api/donors/valid-organs")]
    async fn valid_organs(&self) -> Result<Vec<String>, GatewayError> {
        Ok(GatewayClient::valid_organs(self).await?)
    }

    #[tracing::instrument(skip_all, err, name = "POST /api/donors/register")]
    async fn register_donor(
        &self,
        registration: &DonorRegistration,
    ) -> Result<Option<Donor>, GatewayError> {
        Ok(GatewayClient::register_donor(self, registration).await?)
    }

    #[tracing::instrument(skip_all, err, name = "POST /api/requests")]
    async fn submit_request(
        &self,
        request: &NewOrganRequest,
    ) -> Result<Option<OrganRequest>, GatewayError> {
        Ok(GatewayClient::submit_request(self, request).await?)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory gateway for unit tests.

    use super::*;
    use organbank_sdk::objects::DonatedOrgan;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// A backend held in memory. A resource set to `None` fails every call.
    #[derive(Default)]
    pub struct InMemoryGateway {
        pub availability: Mutex<Option<Vec<OrganAvailability>>>,
        pub donors: Mutex<Option<Vec<Donor>>>,
        pub requests: Mutex<Option<Vec<OrganRequest>>>,
        pub valid_organs: Mutex<Option<Vec<String>>>,
        pub reject_writes: Mutex<bool>,
        /// Latency of every `requests()` call.
        pub request_delay: Mutex<Duration>,
        pub availability_calls: AtomicUsize,
        pub donor_calls: AtomicUsize,
        pub request_calls: AtomicUsize,
    }

    impl InMemoryGateway {
        /// Empty but healthy backend.
        pub fn healthy() -> Self {
            Self {
                availability: Mutex::new(Some(Vec::new())),
                donors: Mutex::new(Some(Vec::new())),
                requests: Mutex::new(Some(Vec::new())),
                valid_organs: Mutex::new(Some(Vec::new())),
                ..Default::default()
            }
        }

        pub fn set_availability(&self, value: Option<Vec<OrganAvailability>>) {
            *self.availability.lock().unwrap() = value;
        }

        pub fn set_donors(&self, value: Option<Vec<Donor>>) {
            *self.donors.lock().unwrap() = value;
        }

        pub fn set_requests(&self, value: Option<Vec<OrganRequest>>) {
            *self.requests.lock().unwrap() = value;
        }

        pub fn set_request_delay(&self, delay: Duration) {
            *self.request_delay.lock().unwrap() = delay;
        }

        pub fn donor_calls(&self) -> usize {
            self.donor_calls.load(Ordering::SeqCst)
        }

        pub fn request_calls(&self) -> usize {
            self.request_calls.load(Ordering::SeqCst)
        }

        fn read<T: Clone>(slot: &Mutex<Option<T>>, what: &str) -> Result<T, GatewayError> {
            slot.lock()
                .unwrap()
                .clone()
                .ok_or_else(|| GatewayError::Unavailable(format!("{what} offline")))
        }
    }

    #[async_trait]
    impl Gateway for InMemoryGateway {
        async fn availability(&self) -> Result<Vec<OrganAvailability>, GatewayError> {
            self.availability_calls.fetch_add(1, Ordering::SeqCst);
            Self::read(&self.availability, "availability")
        }

        async fn donors(&self) -> Result<Vec<Donor>, GatewayError> {
            self.donor_calls.fetch_add(1, Ordering::SeqCst);
            Self::read(&self.donors, "donors")
        }

        async fn requests(&self) -> Result<Vec<OrganRequest>, GatewayError> {
            self.request_calls.fetch_add(1, Ordering::SeqCst);
            let delay = *self.request_delay.lock().unwrap();
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            Self::read(&self.requests, "requests")
        }

        async fn valid_organs(&self) -> Result<Vec<String>, GatewayError> {
            Self::read(&self.valid_organs, "valid organs")
        }

        async fn register_donor(
            &self,
            registration: &DonorRegistration,
        ) -> Result<Option<Donor>, GatewayError> {
            if *self.reject_writes.lock().unwrap() {
                return Err(GatewayError::Unavailable("writes rejected".into()));
            }
            let mut donors = self.donors.lock().unwrap();
            let list = donors.get_or_insert_with(Vec::new);
            let donor = Donor {
                id: Some(list.len() as i64 + 1),
                name: registration.name.clone(),
                age: Some(registration.age),
                gender: Some(registration.gender),
                phone_number: Some(registration.phone_number.clone()),
                address: Some(registration.address.clone()),
                organs: registration
                    .organs
                    .iter()
                    .map(|name| DonatedOrgan::Named {
                        organ_name: name.clone(),
                    })
                    .collect(),
            };
            list.push(donor.clone());
            Ok(Some(donor))
        }

        async fn submit_request(
            &self,
            request: &NewOrganRequest,
        ) -> Result<Option<OrganRequest>, GatewayError> {
            if *self.reject_writes.lock().unwrap() {
                return Err(GatewayError::Unavailable("writes rejected".into()));
            }
            let mut requests = self.requests.lock().unwrap();
            let list = requests.get_or_insert_with(Vec::new);
            let stored = OrganRequest {
                id: Some(list.len() as i64 + 1),
                hospital_name: request.hospital_name.clone(),
                patient_name: request.patient_name.clone(),
                patient_age: request.patient_age,
                organ_type: request.organ_type.clone(),
                blood_type: request.blood_type,
                urgency: Some(request.urgency),
                contact_number: Some(request.contact_number.clone()),
                status: Some(request.status.clone()),
            };
            list.push(stored.clone());
            Ok(Some(stored))
        }
    }

    /// A donor pledging the given organs.
    pub fn donor(name: &str, organs: &[&str]) -> Donor {
        Donor {
            id: None,
            name: name.to_string(),
            age: Some(30),
            gender: None,
            phone_number: None,
            address: None,
            organs: organs
                .iter()
                .map(|o| DonatedOrgan::Bare(o.to_string()))
                .collect(),
        }
    }

    /// A request for `organ` carrying the given server status.
    pub fn request(organ: &str, status: Option<&str>) -> OrganRequest {
        OrganRequest {
            id: None,
            hospital_name: "City General".to_string(),
            patient_name: "Patient".to_string(),
            patient_age: Some(40),
            organ_type: organ.to_string(),
            blood_type: None,
            urgency: None,
            contact_number: None,
            status: status.map(str::to_string),
        }
    }

    pub fn availability(name: &str, status: &str) -> OrganAvailability {
        OrganAvailability {
            organ_name: name.to_string(),
            status: Some(status.to_string()),
            available_units: None,
        }
    }
}
