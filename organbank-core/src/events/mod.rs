//! In-process event notification bus.
//!
//! Screens announce "data changed" on the bus instead of holding references
//! to each other. The bus is owned by the application root and handed to
//! every component that publishes or observes.
//!
//! # Event Flow
//!
//! 1. Donor wizard submits → `DonorRegistered` → registry refresh, bank view
//!    donor refetch
//! 2. Hospital form submits → `HospitalRequestSent`, `ForceRefreshRequests`
//!    → bank view request refetch
//! 3. Availability board submit → `AvailabilitySubmitted`
//!
//! Events are ephemeral: nothing is stored, and an event published while no
//! one is subscribed is lost. Consumers re-query the gateway instead of
//! trusting payloads.

pub mod bus;
pub mod types;

pub use bus::{EventBus, Subscription};
pub use types::{BusEvent, Topic};
