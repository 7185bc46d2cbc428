//! Hospital organ request form.

use super::FormError;
use organbank_sdk::objects::{BloodType, NewOrganRequest, Urgency};

/// Status a freshly sent request starts with.
const INITIAL_STATUS: &str = "PENDING";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HospitalRequestForm {
    pub hospital_name: String,
    pub organ_type: String,
    pub urgency: Urgency,
    pub patient_name: String,
    pub patient_age: Option<u32>,
    pub blood_type: Option<BloodType>,
    pub contact_number: String,
}

impl HospitalRequestForm {
    /// Set the blood type from its label (`"AB-"`); blank clears it.
    pub fn set_blood_type(&mut self, label: &str) -> Result<(), FormError> {
        if label.trim().is_empty() {
            self.blood_type = None;
            return Ok(());
        }
        let blood_type = BloodType::from_label(label)
            .ok_or_else(|| FormError::InvalidBloodType(label.to_string()))?;
        self.blood_type = Some(blood_type);
        Ok(())
    }

    /// Check required fields and build the request body.
    pub fn build(&self) -> Result<NewOrganRequest, FormError> {
        let hospital_name = self.hospital_name.trim();
        let organ_type = self.organ_type.trim();
        let patient_name = self.patient_name.trim();
        if hospital_name.is_empty() {
            return Err(FormError::Missing("hospital name"));
        }
        if organ_type.is_empty() {
            return Err(FormError::Missing("organ type"));
        }
        if patient_name.is_empty() {
            return Err(FormError::Missing("patient name"));
        }

        Ok(NewOrganRequest {
            hospital_name: hospital_name.to_string(),
            organ_type: organ_type.to_string(),
            urgency: self.urgency,
            blood_type: self.blood_type,
            patient_name: patient_name.to_string(),
            patient_age: self.patient_age,
            contact_number: self.contact_number.trim().to_string(),
            status: INITIAL_STATUS.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_fields() {
        let mut form = HospitalRequestForm::default();
        assert_eq!(form.build(), Err(FormError::Missing("hospital name")));
        form.hospital_name = "  Apollo ".into();
        assert_eq!(form.build(), Err(FormError::Missing("organ type")));
        form.organ_type = "Heart".into();
        assert_eq!(form.build(), Err(FormError::Missing("patient name")));
        form.patient_name = "R. Sen".into();

        let request = form.build().unwrap();
        assert_eq!(request.hospital_name, "Apollo");
        assert_eq!(request.urgency, Urgency::Medium);
        assert_eq!(request.status, "PENDING");
        assert_eq!(request.contact_number, "");
    }

    #[test]
    fn test_blood_type_input() {
        let mut form = HospitalRequestForm::default();
        form.set_blood_type("o-").unwrap();
        assert_eq!(form.blood_type, Some(BloodType::ONegative));
        assert!(matches!(
            form.set_blood_type("Z+"),
            Err(FormError::InvalidBloodType(_))
        ));
        form.set_blood_type("").unwrap();
        assert_eq!(form.blood_type, None);
    }
}
