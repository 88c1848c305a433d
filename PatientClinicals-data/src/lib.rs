// PatientClinicals Data
// This crate handles the wire models and the calls to the patient services backend

// Client implementations for the patient services API
pub mod client;

// Wire models exchanged with the backend
pub mod models;

// Re-export commonly used types
pub use client::{ApiError, ApiErrorKind, ApiOperation, HttpPatientApi, PatientApiTrait, DEFAULT_BASE_URL};

#[cfg(any(test, feature = "mock"))]
pub use client::in_memory::InMemoryPatientApi;
