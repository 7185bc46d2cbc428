//! Hospital organ requests and request browsing queries.

use serde::{Deserialize, Serialize};

use super::{lenient, null_as_default};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BloodType {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
}

impl BloodType {
    pub const ALL: [BloodType; 8] = [
        BloodType::APositive,
        BloodType::ANegative,
        BloodType::BPositive,
        BloodType::BNegative,
        BloodType::AbPositive,
        BloodType::AbNegative,
        BloodType::OPositive,
        BloodType::ONegative,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BloodType::APositive => "A+",
            BloodType::ANegative => "A-",
            BloodType::BPositive => "B+",
            BloodType::BNegative => "B-",
            BloodType::AbPositive => "AB+",
            BloodType::AbNegative => "AB-",
            BloodType::OPositive => "O+",
            BloodType::ONegative => "O-",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|blood| blood.as_str().eq_ignore_ascii_case(label))
    }
}

impl std::fmt::Display for BloodType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Urgency {
    Low,
    #[default]
    Medium,
    High,
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Urgency::Low => write!(f, "LOW"),
            Urgency::Medium => write!(f, "MEDIUM"),
            Urgency::High => write!(f, "HIGH"),
        }
    }
}

/// A hospital request as returned by `GET /api/requests`.
///
/// `status` is the server's value and is shown verbatim unless a donor can
/// satisfy the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganRequest {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub hospital_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub patient_name: String,
    #[serde(default)]
    pub patient_age: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub organ_type: String,
    #[serde(default, deserialize_with = "lenient")]
    pub blood_type: Option<BloodType>,
    #[serde(default, deserialize_with = "lenient")]
    pub urgency: Option<Urgency>,
    #[serde(default)]
    pub contact_number: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl OrganRequest {
    /// Urgency with the backend's default applied.
    pub fn urgency(&self) -> Urgency {
        self.urgency.unwrap_or_default()
    }
}

/// Body of `POST /api/requests`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrganRequest {
    pub hospital_name: String,
    pub organ_type: String,
    pub urgency: Urgency,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_type: Option<BloodType>,
    pub patient_name: String,
    pub patient_age: Option<u32>,
    pub contact_number: String,
    pub status: String,
}

// ---------------------------------------------------------------------------
// Request browsing
// ---------------------------------------------------------------------------

pub const DEFAULT_PAGE_SIZE: u32 = 10;
const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Narrowing applied when browsing requests. Each variant maps to its own
/// backend endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestFilter {
    Hospital(String),
    Organ(String),
    Status(String),
}

/// Paginated request listing parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestQuery {
    pub page: u32,
    pub size: u32,
    pub sort_by: String,
    pub sort_dir: SortDirection,
    pub filter: Option<RequestFilter>,
}

impl Default for RequestQuery {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            sort_by: "id".to_string(),
            sort_dir: SortDirection::Desc,
            filter: None,
        }
    }
}

impl RequestQuery {
    /// Endpoint path and query parameters for this listing.
    ///
    /// A filter with an empty value is ignored and the plain paginated
    /// listing is used.
    pub fn endpoint(&self) -> (&'static str, Vec<(&'static str, String)>) {
        let mut params = vec![
            ("page", self.page.to_string()),
            ("size", self.size.clamp(1, MAX_PAGE_SIZE).to_string()),
            ("sortBy", self.sort_by.clone()),
            ("sortDir", self.sort_dir.as_str().to_string()),
        ];
        let path = match &self.filter {
            Some(RequestFilter::Hospital(name)) if !name.trim().is_empty() => {
                params.push(("hospitalName", name.trim().to_string()));
                "/api/requests/search"
            }
            Some(RequestFilter::Organ(organ)) if !organ.trim().is_empty() => {
                params.push(("organType", organ.trim().to_string()));
                "/api/requests/filter/organ"
            }
            Some(RequestFilter::Status(status)) if !status.trim().is_empty() => {
                params.push(("status", status.trim().to_string()));
                "/api/requests/filter/status"
            }
            _ => "/api/requests/paginated",
        };
        (path, params)
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    #[serde(default)]
    pub content: Vec<T>,
    #[serde(default)]
    pub total_pages: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_payload_defaults() {
        let json = r#"{
            "id": 1,
            "hospitalName": "City General",
            "patientName": "J. Doe",
            "patientAge": 51,
            "organType": "Kidney",
            "bloodType": "AB-",
            "contactNumber": "5550001111",
            "status": "PENDING"
        }"#;
        let request: OrganRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.blood_type, Some(BloodType::AbNegative));
        assert_eq!(request.urgency(), Urgency::Medium);
        assert_eq!(request.status.as_deref(), Some("PENDING"));
    }

    #[test]
    fn test_request_payload_unknown_enums() {
        let json = r#"{"organType": "Heart", "bloodType": "", "urgency": "critical"}"#;
        let request: OrganRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.blood_type, None);
        assert_eq!(request.urgency, None);
        assert_eq!(request.hospital_name, "");
        assert_eq!(request.status, None);
    }

    #[test]
    fn test_blood_type_labels() {
        for blood in BloodType::ALL {
            assert_eq!(BloodType::from_label(blood.as_str()), Some(blood));
        }
        assert_eq!(BloodType::from_label("ab+"), Some(BloodType::AbPositive));
        assert_eq!(BloodType::from_label("C+"), None);
    }

    #[test]
    fn test_new_request_body() {
        let body = NewOrganRequest {
            hospital_name: "St. Mary".into(),
            organ_type: "Liver".into(),
            urgency: Urgency::High,
            blood_type: None,
            patient_name: "A. Patient".into(),
            patient_age: Some(30),
            contact_number: String::new(),
            status: "PENDING".into(),
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["urgency"], "HIGH");
        assert_eq!(value["hospitalName"], "St. Mary");
        assert!(value.get("bloodType").is_none());
    }

    #[test]
    fn test_query_endpoints() {
        let query = RequestQuery::default();
        let (path, params) = query.endpoint();
        assert_eq!(path, "/api/requests/paginated");
        assert!(params.contains(&("sortDir", "desc".to_string())));
        assert!(params.contains(&("size", "10".to_string())));

        let query = RequestQuery {
            filter: Some(RequestFilter::Organ(" Heart ".into())),
            ..Default::default()
        };
        let (path, params) = query.endpoint();
        assert_eq!(path, "/api/requests/filter/organ");
        assert!(params.contains(&("organType", "Heart".to_string())));

        let query = RequestQuery {
            filter: Some(RequestFilter::Hospital("   ".into())),
            ..Default::default()
        };
        assert_eq!(query.endpoint().0, "/api/requests/paginated");
    }

    #[test]
    fn test_page_payload() {
        let json = r#"{"content": [{"organType": "Blood"}], "totalPages": 3}"#;
        let page: Page<OrganRequest> = serde_json::from_str(json).unwrap();
        assert_eq!(page.content.len(), 1);
        assert_eq!(page.total_pages, 3);
    }
}
