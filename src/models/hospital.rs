use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::enums::{HospitalCategory, HospitalStatus, Teleconsultation};

/// A persisted hospital record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hospital {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    pub status: HospitalStatus,
    pub country: String,
    pub city: String,
    #[serde(default)]
    pub category: HospitalCategory,
    #[serde(default)]
    pub speciality: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub telephone: Option<String>,
    #[serde(default)]
    pub teleconsultation: Teleconsultation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Validated payload for a create call. Never carries an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewHospital {
    pub name: String,
    pub status: HospitalStatus,
    pub country: String,
    pub city: String,
    pub category: HospitalCategory,
    #[serde(default)]
    pub speciality: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub telephone: Option<String>,
    #[serde(default)]
    pub teleconsultation: Teleconsultation,
}

/// Partial update. `None` leaves a field untouched; for optional record
/// fields `Some(None)` clears the value (serialized as `null`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HospitalPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<HospitalStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<HospitalCategory>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub speciality: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub website: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub email: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub telephone: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teleconsultation: Option<Teleconsultation>,
}

/// Missing or malformed required input. Raised before any store call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please fill in the required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("Invalid value for {field}: {value}")]
    InvalidChoice { field: &'static str, value: String },
}

// ═══════════════════════════════════════════════════════════
// Normalization & validation
// ═══════════════════════════════════════════════════════════

/// Trim an optional text field; blank becomes absent.
pub fn normalize_optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn normalize_opt(value: Option<String>) -> Option<String> {
    value.as_deref().and_then(normalize_optional)
}

impl NewHospital {
    /// Check required text fields (non-empty after trim).
    pub fn validate(&self) -> Result<(), ValidationError> {
        let missing: Vec<&'static str> = [
            ("name", &self.name),
            ("country", &self.country),
            ("city", &self.city),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::MissingFields(missing))
        }
    }

    /// Trim every text field and collapse blank optionals to `None`.
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            country: self.country.trim().to_string(),
            city: self.city.trim().to_string(),
            speciality: normalize_opt(self.speciality),
            website: normalize_opt(self.website),
            email: normalize_opt(self.email),
            telephone: normalize_opt(self.telephone),
            ..self
        }
    }

    /// Materialize the payload as a stored record.
    pub fn into_record(self, id: String, created_at: DateTime<Utc>) -> Hospital {
        Hospital {
            id,
            name: self.name,
            status: self.status,
            country: self.country,
            city: self.city,
            category: self.category,
            speciality: self.speciality,
            website: self.website,
            email: self.email,
            telephone: self.telephone,
            teleconsultation: self.teleconsultation,
            created_at: Some(created_at),
        }
    }
}

impl From<NewHospital> for HospitalPatch {
    /// Full replacement: every field set, blank optionals cleared.
    fn from(payload: NewHospital) -> Self {
        Self {
            name: Some(payload.name),
            status: Some(payload.status),
            country: Some(payload.country),
            city: Some(payload.city),
            category: Some(payload.category),
            speciality: Some(payload.speciality),
            website: Some(payload.website),
            email: Some(payload.email),
            telephone: Some(payload.telephone),
            teleconsultation: Some(payload.teleconsultation),
        }
    }
}

impl HospitalPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Reject patches that would blank a required field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let missing: Vec<&'static str> = [
            ("name", &self.name),
            ("country", &self.country),
            ("city", &self.city),
        ]
        .into_iter()
        .filter(|(_, value)| value.as_deref().is_some_and(|v| v.trim().is_empty()))
        .map(|(field, _)| field)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::MissingFields(missing))
        }
    }

    /// Trim text fields and collapse blank optionals to a clear.
    pub fn normalized(self) -> Self {
        let trim = |v: Option<String>| v.map(|s| s.trim().to_string());
        let clear_blank = |v: Option<Option<String>>| v.map(normalize_opt);
        Self {
            name: trim(self.name),
            country: trim(self.country),
            city: trim(self.city),
            speciality: clear_blank(self.speciality),
            website: clear_blank(self.website),
            email: clear_blank(self.email),
            telephone: clear_blank(self.telephone),
            ..self
        }
    }
}

impl Hospital {
    /// Merge a patch over this record in place; untouched fields stay as-is.
    pub fn apply(&mut self, patch: &HospitalPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(country) = &patch.country {
            self.country = country.clone();
        }
        if let Some(city) = &patch.city {
            self.city = city.clone();
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(speciality) = &patch.speciality {
            self.speciality = speciality.clone();
        }
        if let Some(website) = &patch.website {
            self.website = website.clone();
        }
        if let Some(email) = &patch.email {
            self.email = email.clone();
        }
        if let Some(telephone) = &patch.telephone {
            self.telephone = telephone.clone();
        }
        if let Some(tele) = patch.teleconsultation {
            self.teleconsultation = tele;
        }
    }

    /// Whether this record carries the same user-entered values as `payload`.
    #[cfg(test)]
    pub fn matches(&self, payload: &NewHospital) -> bool {
        self.name == payload.name
            && self.status == payload.status
            && self.country == payload.country
            && self.city == payload.city
            && self.category == payload.category
            && self.speciality == payload.speciality
            && self.website == payload.website
            && self.email == payload.email
            && self.telephone == payload.telephone
            && self.teleconsultation == payload.teleconsultation
    }
}

// ═══════════════════════════════════════════════════════════
// Serde helpers
// ═══════════════════════════════════════════════════════════

/// Backends may hand out numeric primary keys; keep them as strings.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}

/// A field that is present (even as `null`) deserializes to `Some(..)`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
