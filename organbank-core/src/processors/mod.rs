//! Long-running view processors.
//!
//! - `ReconciliationView`: polls donors and requests, listens for
//!   `DonorRegistered` / `HospitalRequestSent` / `ForceRefreshRequests`, and
//!   publishes a reconciled [`BankSnapshot`](crate::matching::BankSnapshot)
//!   after every cycle.

pub mod reconciliation;

pub use reconciliation::{
    DEFAULT_POLL_INTERVAL, ReconciliationView, RefreshTrigger, ViewHandle,
};
