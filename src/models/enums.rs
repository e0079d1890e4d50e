use serde::{Deserialize, Serialize};

use super::ModelError;

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// The wire literal doubles as the serde name.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }

            /// Every variant, in declaration order (select options).
            pub fn all() -> &'static [Self] {
                &[$(Self::$variant),+]
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ModelError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(HospitalStatus {
    Active => "ACTIVE",
    Inactive => "INACTIVE",
    UnderConstruction => "UNDER_CONSTRUCTION",
    Closed => "CLOSED",
});

str_enum!(HospitalCategory {
    Hospital => "HOSPITAL",
    Clinic => "CLINIC",
    HealthCenter => "HEALTH_CENTER",
    Laboratory => "LABORATORY",
    Pharmacy => "PHARMACY",
    Other => "OTHER",
});

str_enum!(Teleconsultation {
    Yes => "YES",
    No => "NO",
});

impl Default for HospitalCategory {
    fn default() -> Self {
        Self::Hospital
    }
}

impl Default for Teleconsultation {
    fn default() -> Self {
        Self::No
    }
}

impl Teleconsultation {
    /// Anything other than the literal `YES` reads as `NO`.
    pub fn from_form(value: &str) -> Self {
        if value.trim() == "YES" {
            Self::Yes
        } else {
            Self::No
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn status_round_trips_through_str() {
        for status in HospitalStatus::all() {
            assert_eq!(HospitalStatus::from_str(status.as_str()).unwrap(), *status);
        }
    }

    #[test]
    fn unknown_literal_is_rejected() {
        let err = HospitalCategory::from_str("hospital").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid value for HospitalCategory: hospital"
        );
    }

    #[test]
    fn serde_uses_wire_literals() {
        let json = serde_json::to_string(&HospitalStatus::UnderConstruction).unwrap();
        assert_eq!(json, "\"UNDER_CONSTRUCTION\"");
        let tele: Teleconsultation = serde_json::from_str("\"YES\"").unwrap();
        assert_eq!(tele, Teleconsultation::Yes);
    }

    #[test]
    fn defaults() {
        assert_eq!(HospitalCategory::default(), HospitalCategory::Hospital);
        assert_eq!(Teleconsultation::default(), Teleconsultation::No);
    }

    #[test]
    fn teleconsultation_from_form_is_strict() {
        assert_eq!(Teleconsultation::from_form("YES"), Teleconsultation::Yes);
        assert_eq!(Teleconsultation::from_form("yes"), Teleconsultation::No);
        assert_eq!(Teleconsultation::from_form(""), Teleconsultation::No);
    }
}
