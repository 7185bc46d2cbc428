//! Donor records and the donor registration body.

use serde::{Deserialize, Serialize};

use super::{lenient, names_match, null_as_default};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Gender::Male => write!(f, "Male"),
            Gender::Female => write!(f, "Female"),
            Gender::Other => write!(f, "Other"),
        }
    }
}

/// An organ listed on a donor record.
///
/// The backend returns either `{"organName": "..."}` objects or bare
/// strings, depending on the endpoint version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DonatedOrgan {
    Named {
        #[serde(rename = "organName")]
        organ_name: String,
    },
    Bare(String),
}

impl DonatedOrgan {
    pub fn name(&self) -> &str {
        match self {
            DonatedOrgan::Named { organ_name } => organ_name,
            DonatedOrgan::Bare(name) => name,
        }
    }
}

/// A registered donor as returned by `GET /api/donors`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Donor {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub organs: Vec<DonatedOrgan>,
}

impl Donor {
    /// Number of organs this donor pledged.
    pub fn organ_count(&self) -> usize {
        self.organs.len()
    }

    /// Whether any pledged organ matches `organ_name`, ignoring case.
    pub fn offers(&self, organ_name: &str) -> bool {
        self.organs
            .iter()
            .any(|organ| names_match(organ.name(), organ_name))
    }

    /// Organ names joined for display.
    pub fn organ_names(&self) -> Vec<&str> {
        self.organs.iter().map(DonatedOrgan::name).collect()
    }
}

/// Body of `POST /api/donors/register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonorRegistration {
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub phone_number: String,
    pub address: String,
    pub organs: Vec<String>,
}
