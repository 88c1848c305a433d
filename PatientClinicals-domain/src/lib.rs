// PatientClinicals Domain
// This crate contains the screens, routing and notifications of the PatientClinicals client

// Domain entities and conversions from the wire models
pub mod entities;

// Toast notifications and confirmation prompts
pub mod notifications;

// Route table and navigation
pub mod routing;

// One view model per screen
pub mod views;

// Re-export the API client from patient_clinicals_data for convenience
pub use patient_clinicals_data::{ApiError, ApiErrorKind, HttpPatientApi, PatientApiTrait};

// Testing utilities - only available with mock feature
#[cfg(feature = "mock")]
pub mod testing;
