pub mod enums;
pub mod hospital;

pub use enums::{HospitalCategory, HospitalStatus, Teleconsultation};
pub use hospital::{normalize_optional, Hospital, HospitalPatch, NewHospital, ValidationError};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Invalid value for {field}: {value}")]
    InvalidEnum { field: String, value: String },
}
