//! Request and response bodies exchanged with the REST backend.
//!
//! Field names follow the backend's camelCase JSON. Response types are
//! deliberately lenient: missing or `null` fields fall back to defaults and
//! unrecognised enum values decode as `None`, so one odd record never rejects
//! a whole listing.

pub mod donor;
pub mod organs;
pub mod request;

pub use donor::{DonatedOrgan, Donor, DonorRegistration, Gender};
pub use organs::{OrganAvailability, OrganStatus, OrganType, ParseOrganStatusError};
pub use request::{
    BloodType, NewOrganRequest, OrganRequest, Page, RequestFilter, RequestQuery, SortDirection,
    Urgency,
};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

/// Case-insensitive name comparison.
///
/// Lowercases both sides char by char (full Unicode mapping) without
/// allocating.
pub fn names_match(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

/// Decode `null` the same as an absent field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decode an optional value, mapping anything that does not parse as `T`
/// to `None` instead of failing the surrounding object.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}
