use patient_clinicals_data::ApiError;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Upper bound accepted by the age field
pub const MAX_AGE: i32 = 150;

/// Domain model for a patient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    /// Server-assigned identifier
    pub id: i64,

    /// Given name
    pub first_name: String,

    /// Family name
    pub last_name: String,

    /// Age in years
    pub age: i32,
}

impl Patient {
    /// "First Last", as used in confirmations and notifications
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Raw contents of the add-patient form.
///
/// Every field is kept as typed so a failed submit can be retried unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct PatientForm {
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,

    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,

    #[validate(custom = "validate_age")]
    pub age: String,
}

/// Validated request for a new patient
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPatient {
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
}

fn validate_age(age: &str) -> Result<(), ValidationError> {
    let mut error = ValidationError::new("age");
    match age.trim().parse::<i32>() {
        Ok(value) if (0..=MAX_AGE).contains(&value) => Ok(()),
        Ok(_) => {
            error.message = Some(format!("Age must be between 0 and {}", MAX_AGE).into());
            Err(error)
        }
        Err(_) if age.trim().is_empty() => {
            error.message = Some("Age is required".into());
            Err(error)
        }
        Err(_) => {
            error.message = Some("Age must be a whole number".into());
            Err(error)
        }
    }
}

impl PatientForm {
    /// Check the required/min/max rules and produce the request.
    ///
    /// Failures are `Validation` errors and never reach the network.
    pub fn to_new_patient(&self) -> Result<NewPatient, ApiError> {
        self.validate()
            .map_err(|errors| ApiError::validation(super::validation_message(&errors)))?;

        let age = self
            .age
            .trim()
            .parse::<i32>()
            .map_err(|_| ApiError::validation("Age must be a whole number"))?;

        Ok(NewPatient {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            age,
        })
    }

    /// Reset every field to an empty string
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// True when nothing has been typed
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use patient_clinicals_data::ApiErrorKind;

    fn form(first: &str, last: &str, age: &str) -> PatientForm {
        PatientForm {
            first_name: first.to_string(),
            last_name: last.to_string(),
            age: age.to_string(),
        }
    }

    #[test]
    fn test_valid_form() {
        let patient = form("Ana", "Lopez", "30").to_new_patient().unwrap();
        assert_eq!(patient.age, 30);
        assert_eq!(patient.first_name, "Ana");
    }

    #[test]
    fn test_age_bounds() {
        assert!(form("Ana", "Lopez", "0").to_new_patient().is_ok());
        assert!(form("Ana", "Lopez", "150").to_new_patient().is_ok());

        let err = form("Ana", "Lopez", "151").to_new_patient().unwrap_err();
        assert!(err.message.contains("between 0 and 150"));

        let err = form("Ana", "Lopez", "-1").to_new_patient().unwrap_err();
        assert!(err.message.contains("between 0 and 150"));

        let err = form("Ana", "Lopez", "thirty").to_new_patient().unwrap_err();
        assert!(err.message.contains("whole number"));
    }

    #[test]
    fn test_required_fields() {
        let err = form("", "", "").to_new_patient().unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Validation);
        assert_eq!(err.message, "Age is required; First name is required; Last name is required");
        assert_eq!(err.server_message(), None);
    }

    #[test]
    fn test_clear() {
        let mut f = form("Ana", "Lopez", "30");
        assert!(!f.is_empty());
        f.clear();
        assert!(f.is_empty());
    }
}
