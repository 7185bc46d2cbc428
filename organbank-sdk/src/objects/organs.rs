//! Organ types, availability status and the `/api/availability` payload.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::null_as_default;

/// The organ types the coordination system recognises.
///
/// Variant order is the canonical allow-list order; `Ord` follows it, so
/// ordered collections keyed by `OrganType` list organs the way every screen
/// shows them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OrganType {
    Heart,
    Liver,
    Kidney,
    Lungs,
    #[serde(rename = "Bone Marrow")]
    BoneMarrow,
    Blood,
}

impl OrganType {
    /// The allow-list, in canonical order.
    pub const ALL: [OrganType; 6] = [
        OrganType::Heart,
        OrganType::Liver,
        OrganType::Kidney,
        OrganType::Lungs,
        OrganType::BoneMarrow,
        OrganType::Blood,
    ];

    /// Canonical name as used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrganType::Heart => "Heart",
            OrganType::Liver => "Liver",
            OrganType::Kidney => "Kidney",
            OrganType::Lungs => "Lungs",
            OrganType::BoneMarrow => "Bone Marrow",
            OrganType::Blood => "Blood",
        }
    }

    /// Look up an organ by its exact canonical name.
    ///
    /// Matching is case-sensitive: `"kidney"` is not on the allow-list.
    pub fn from_canonical(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|organ| organ.as_str() == name)
    }
}

impl std::fmt::Display for OrganType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Last known availability of an organ type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OrganStatus {
    Available,
    Unavailable,
}

impl std::fmt::Display for OrganStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrganStatus::Available => write!(f, "Available"),
            OrganStatus::Unavailable => write!(f, "Unavailable"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown organ status: {0:?}")]
pub struct ParseOrganStatusError(pub String);

impl FromStr for OrganStatus {
    type Err = ParseOrganStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("available") {
            Ok(OrganStatus::Available)
        } else if trimmed.eq_ignore_ascii_case("unavailable") {
            Ok(OrganStatus::Unavailable)
        } else {
            Err(ParseOrganStatusError(s.to_string()))
        }
    }
}

impl<'de> Deserialize<'de> for OrganStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One entry of `GET /api/availability`.
///
/// The backend reports the organ by name and either a status string, a unit
/// count, or both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganAvailability {
    #[serde(default, deserialize_with = "null_as_default", alias = "name")]
    pub organ_name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub available_units: Option<u32>,
}

impl OrganAvailability {
    /// Status of this entry.
    ///
    /// An explicit, recognised status wins. Otherwise the organ counts as
    /// available when at least one unit is in stock.
    pub fn resolved_status(&self) -> OrganStatus {
        if let Some(status) = self.status.as_deref().and_then(|s| s.parse().ok()) {
            return status;
        }
        match self.available_units {
            Some(units) if units > 0 => OrganStatus::Available,
            _ => OrganStatus::Unavailable,
        }
    }

    /// Units in stock, zero when the backend did not report a count.
    pub fn units(&self) -> u32 {
        self.available_units.unwrap_or(0)
    }
}
