//! Wire types and HTTP client for the organ bank coordination backend.
//!
//! The [`objects`] module is always available. The typed HTTP client lives in
//! [`client`] behind the `client` cargo feature.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

#[cfg(feature = "client")]
pub mod client;
pub mod objects;
