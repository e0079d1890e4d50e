//! Form controller: raw form fields to and from record payloads.

use serde::{Deserialize, Serialize};

use crate::models::{
    normalize_optional, Hospital, HospitalCategory, HospitalStatus, NewHospital,
    Teleconsultation, ValidationError,
};

/// Raw field values exactly as posted by the panel form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HospitalForm {
    pub id: String,
    pub name: String,
    pub status: String,
    pub country: String,
    pub city: String,
    pub category: String,
    pub speciality: String,
    pub website: String,
    pub email: String,
    pub telephone: String,
    pub teleconsultation: String,
}

/// What a submit will do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitTarget {
    Create,
    Update(String),
}

impl HospitalForm {
    /// The cleared form: no id (next submit creates), default category,
    /// teleconsultation `NO`.
    pub fn blank() -> Self {
        Self {
            category: HospitalCategory::default().as_str().to_string(),
            teleconsultation: Teleconsultation::default().as_str().to_string(),
            ..Self::default()
        }
    }

    /// Populate every field from a stored record (edit action).
    pub fn from_record(record: &Hospital) -> Self {
        let opt = |v: &Option<String>| v.clone().unwrap_or_default();
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            status: record.status.as_str().to_string(),
            country: record.country.clone(),
            city: record.city.clone(),
            category: record.category.as_str().to_string(),
            speciality: opt(&record.speciality),
            website: opt(&record.website),
            email: opt(&record.email),
            telephone: opt(&record.telephone),
            teleconsultation: record.teleconsultation.as_str().to_string(),
        }
    }

    pub fn target(&self) -> SubmitTarget {
        match self.id.trim() {
            "" => SubmitTarget::Create,
            id => SubmitTarget::Update(id.to_string()),
        }
    }

    /// Read the fields into a validated payload. Blank optionals become
    /// `None`.
    pub fn to_payload(&self) -> Result<NewHospital, ValidationError> {
        let mut missing = Vec::new();
        for (field, value) in [
            ("name", &self.name),
            ("status", &self.status),
            ("country", &self.country),
            ("city", &self.city),
            ("category", &self.category),
        ] {
            if value.trim().is_empty() {
                missing.push(field);
            }
        }
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing));
        }

        let status: HospitalStatus = self
            .status
            .trim()
            .parse()
            .map_err(|_| ValidationError::InvalidChoice {
                field: "status",
                value: self.status.clone(),
            })?;
        let category: HospitalCategory = self
            .category
            .trim()
            .parse()
            .map_err(|_| ValidationError::InvalidChoice {
                field: "category",
                value: self.category.clone(),
            })?;

        Ok(NewHospital {
            name: self.name.trim().to_string(),
            status,
            country: self.country.trim().to_string(),
            city: self.city.trim().to_string(),
            category,
            speciality: normalize_optional(&self.speciality),
            website: normalize_optional(&self.website),
            email: normalize_optional(&self.email),
            telephone: normalize_optional(&self.telephone),
            teleconsultation: Teleconsultation::from_form(&self.teleconsultation),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> HospitalForm {
        HospitalForm {
            name: " City Hospital ".into(),
            status: "ACTIVE".into(),
            country: "FR".into(),
            city: "Paris".into(),
            category: "HOSPITAL".into(),
            teleconsultation: "YES".into(),
            ..HospitalForm::default()
        }
    }

    #[test]
    fn blank_form_defaults() {
        let form = HospitalForm::blank();
        assert_eq!(form.id, "");
        assert_eq!(form.category, "HOSPITAL");
        assert_eq!(form.teleconsultation, "NO");
        assert_eq!(form.target(), SubmitTarget::Create);
    }

    #[test]
    fn empty_name_is_a_validation_error() {
        let form = HospitalForm {
            name: String::new(),
            ..filled()
        };
        assert_eq!(
            form.to_payload(),
            Err(ValidationError::MissingFields(vec!["name"]))
        );
    }

    #[test]
    fn payload_trims_and_nulls_blank_optionals() {
        let form = HospitalForm {
            website: "   ".into(),
            email: " desk@city.example ".into(),
            ..filled()
        };
        let payload = form.to_payload().unwrap();
        assert_eq!(payload.name, "City Hospital");
        assert_eq!(payload.website, None);
        assert_eq!(payload.email.as_deref(), Some("desk@city.example"));
        assert_eq!(payload.speciality, None);
        assert_eq!(payload.teleconsultation, Teleconsultation::Yes);
    }

    #[test]
    fn unknown_status_is_rejected() {
        let form = HospitalForm {
            status: "OPEN".into(),
            ..filled()
        };
        assert!(matches!(
            form.to_payload(),
            Err(ValidationError::InvalidChoice { field: "status", .. })
        ));
    }

    #[test]
    fn blank_category_is_a_validation_error() {
        let form = HospitalForm {
            category: "  ".into(),
            city: String::new(),
            ..filled()
        };
        assert_eq!(
            form.to_payload(),
            Err(ValidationError::MissingFields(vec!["city", "category"]))
        );
    }

    #[test]
    fn edit_round_trip_populates_every_field() {
        let payload = filled().to_payload().unwrap();
        let record = payload.clone().into_record("abc".into(), chrono::Utc::now());
        let form = HospitalForm::from_record(&record);

        assert_eq!(form.target(), SubmitTarget::Update("abc".into()));
        assert_eq!(form.name, "City Hospital");
        assert_eq!(form.website, "");
        assert_eq!(form.teleconsultation, "YES");
        assert_eq!(form.to_payload().unwrap(), payload);
    }

    #[test]
    fn whitespace_id_means_create() {
        let form = HospitalForm {
            id: "  ".into(),
            ..filled()
        };
        assert_eq!(form.target(), SubmitTarget::Create);
    }
}
