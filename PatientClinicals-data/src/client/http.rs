use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use super::errors::ApiError;
use super::PatientApiTrait;
use crate::models::clinical::{ClinicalRecord, UpsertClinicalRequest};
use crate::models::patient::{CreatePatientRequest, Patient};

/// Base URL used when none is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/patientservices";

/// reqwest-backed client for the patient services API
#[derive(Debug, Clone)]
pub struct HttpPatientApi {
    client: Client,
    base_url: String,
}

impl HttpPatientApi {
    /// Create a client for `base_url` with a per-request timeout
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        debug!("Patient services client configured for {}", base_url);
        Ok(Self { client, base_url })
    }

    /// Base URL every path is appended to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and return the raw body of a successful response
    async fn execute(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            Ok(body)
        } else {
            let error = ApiError::from_response(status.as_u16(), &body);
            warn!("Patient services returned {}: {}", status, error.message);
            Err(error)
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let body = self.execute(request).await?;
        serde_json::from_str(&body).map_err(|e| ApiError::decode(e.to_string()))
    }
}

#[async_trait]
impl PatientApiTrait for HttpPatientApi {
    #[instrument(skip(self))]
    async fn list_patients(&self) -> Result<Vec<Patient>, ApiError> {
        let patients: Vec<Patient> = self.fetch(self.client.get(self.url("/patients"))).await?;
        debug!("Received {} patients", patients.len());
        Ok(patients)
    }

    #[instrument(skip(self, request), fields(first_name = %request.first_name, last_name = %request.last_name))]
    async fn create_patient(&self, request: CreatePatientRequest) -> Result<Patient, ApiError> {
        // .json() sets Content-Type: application/json
        let patient: Patient = self
            .fetch(self.client.post(self.url("/patients")).json(&request))
            .await?;
        debug!("Created patient with ID: {}", patient.id);
        Ok(patient)
    }

    #[instrument(skip(self))]
    async fn delete_patient(&self, id: i64) -> Result<(), ApiError> {
        self.execute(self.client.delete(self.url(&format!("/patients/{}", id))))
            .await?;
        debug!("Deleted patient with ID: {}", id);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_patient(&self, id: i64) -> Result<Patient, ApiError> {
        self.fetch(self.client.get(self.url(&format!("/patients/{}", id))))
            .await
    }

    #[instrument(skip(self))]
    async fn list_clinicals_for_patient(&self, patient_id: i64) -> Result<Vec<ClinicalRecord>, ApiError> {
        let records: Vec<ClinicalRecord> = self
            .fetch(self.client.get(self.url(&format!("/clinicals/patient/{}", patient_id))))
            .await?;
        debug!("Received {} clinical records", records.len());
        Ok(records)
    }

    #[instrument(skip(self, request), fields(component = %request.component_name))]
    async fn upsert_clinical(
        &self,
        patient_id: i64,
        request: UpsertClinicalRequest,
    ) -> Result<ClinicalRecord, ApiError> {
        self.fetch(
            self.client
                .put(self.url(&format!("/clinicals/{}", patient_id)))
                .json(&request),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let api = HttpPatientApi::new("http://localhost:8080/patientservices/", Duration::from_secs(1)).unwrap();
        assert_eq!(api.base_url(), DEFAULT_BASE_URL);
        assert_eq!(api.url("/patients"), "http://localhost:8080/patientservices/patients");
    }
}
