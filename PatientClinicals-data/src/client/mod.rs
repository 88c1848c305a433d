// Client module structure
pub mod errors;
mod http;

#[cfg(any(test, feature = "mock"))]
pub mod in_memory;

use std::fmt;

use async_trait::async_trait;

use crate::models::clinical::{ClinicalRecord, UpsertClinicalRequest};
use crate::models::patient::{CreatePatientRequest, Patient};

// Re-export commonly used types
pub use errors::{ApiError, ApiErrorKind};
pub use http::{HttpPatientApi, DEFAULT_BASE_URL};

/// Operations offered by the patient services backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiOperation {
    ListPatients,
    CreatePatient,
    DeletePatient,
    GetPatient,
    ListClinicals,
    UpsertClinical,
}

impl fmt::Display for ApiOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ApiOperation::ListPatients => "list_patients",
            ApiOperation::CreatePatient => "create_patient",
            ApiOperation::DeletePatient => "delete_patient",
            ApiOperation::GetPatient => "get_patient",
            ApiOperation::ListClinicals => "list_clinicals_for_patient",
            ApiOperation::UpsertClinical => "upsert_clinical",
        };
        f.write_str(name)
    }
}

/// Client trait for the patient services API.
///
/// Every method is a single request/response: no retries, caching or batching.
#[async_trait]
pub trait PatientApiTrait: Send + Sync {
    /// `GET /patients`
    async fn list_patients(&self) -> Result<Vec<Patient>, ApiError>;

    /// `POST /patients`; the server assigns the id
    async fn create_patient(&self, request: CreatePatientRequest) -> Result<Patient, ApiError>;

    /// `DELETE /patients/{id}`
    async fn delete_patient(&self, id: i64) -> Result<(), ApiError>;

    /// `GET /patients/{id}`
    async fn get_patient(&self, id: i64) -> Result<Patient, ApiError>;

    /// `GET /clinicals/patient/{patientId}`
    async fn list_clinicals_for_patient(&self, patient_id: i64) -> Result<Vec<ClinicalRecord>, ApiError>;

    /// `PUT /clinicals/{patientId}`
    async fn upsert_clinical(
        &self,
        patient_id: i64,
        request: UpsertClinicalRequest,
    ) -> Result<ClinicalRecord, ApiError>;
}
