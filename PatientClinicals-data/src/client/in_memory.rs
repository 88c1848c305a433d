use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tracing::debug;

use super::errors::ApiError;
use super::{ApiOperation, PatientApiTrait};
use crate::models::clinical::{ClinicalRecord, UpsertClinicalRequest};
use crate::models::patient::{CreatePatientRequest, Patient};

#[derive(Debug, Default)]
struct BackendState {
    patients: BTreeMap<i64, Patient>,
    clinicals: Vec<ClinicalRecord>,
    next_patient_id: i64,
    next_clinical_id: i64,
    failures: HashMap<ApiOperation, ApiError>,
    calls: HashMap<ApiOperation, usize>,
}

/// In-memory stand-in for the patient services backend.
///
/// Ids are assigned sequentially from 1, clinical writes always append, and
/// any operation can be told to fail. Clones share the same storage.
#[derive(Debug, Clone)]
pub struct InMemoryPatientApi {
    state: Arc<Mutex<BackendState>>,
}

impl Default for InMemoryPatientApi {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryPatientApi {
    /// Create an empty backend
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(BackendState {
                next_patient_id: 1,
                next_clinical_id: 1,
                ..BackendState::default()
            })),
        }
    }

    /// Add a patient, assigning the next id
    pub fn with_patient(self, first_name: &str, last_name: &str, age: i32) -> Self {
        {
            let mut state = self.lock();
            let id = state.next_patient_id;
            state.next_patient_id += 1;
            state.patients.insert(
                id,
                Patient {
                    id,
                    first_name: first_name.to_string(),
                    last_name: last_name.to_string(),
                    age,
                },
            );
        }
        self
    }

    /// Add a clinical record as-is
    pub fn with_clinical(self, record: ClinicalRecord) -> Self {
        self.lock().clinicals.push(record);
        self
    }

    /// Make `operation` fail with a transport error
    pub fn with_failure(self, operation: ApiOperation) -> Self {
        self.fail(operation, ApiError::network("connection refused"));
        self
    }

    /// Make `operation` fail with `error` until [`recover`](Self::recover) is called
    pub fn fail(&self, operation: ApiOperation, error: ApiError) {
        self.lock().failures.insert(operation, error);
    }

    /// Stop failing `operation`
    pub fn recover(&self, operation: ApiOperation) {
        self.lock().failures.remove(&operation);
    }

    /// Number of times `operation` has been requested
    pub fn calls(&self, operation: ApiOperation) -> usize {
        self.lock()
            .calls
            .get(&operation)
            .copied()
            .unwrap_or(0)
    }

    /// Snapshot of the stored clinical records
    pub fn clinicals(&self) -> Vec<ClinicalRecord> {
        self.lock().clinicals.clone()
    }

    fn lock(&self) -> MutexGuard<'_, BackendState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record the call and lock the state, or return the injected failure
    fn begin(&self, operation: ApiOperation) -> Result<MutexGuard<'_, BackendState>, ApiError> {
        let mut state = self.lock();

        *state.calls.entry(operation).or_insert(0) += 1;
        debug!("In-memory backend handling {}", operation);

        if let Some(error) = state.failures.get(&operation).cloned() {
            return Err(error);
        }
        Ok(state)
    }
}

#[async_trait]
impl PatientApiTrait for InMemoryPatientApi {
    async fn list_patients(&self) -> Result<Vec<Patient>, ApiError> {
        let state = self.begin(ApiOperation::ListPatients)?;
        Ok(state.patients.values().cloned().collect())
    }

    async fn create_patient(&self, request: CreatePatientRequest) -> Result<Patient, ApiError> {
        let mut state = self.begin(ApiOperation::CreatePatient)?;
        let id = state.next_patient_id;
        state.next_patient_id += 1;

        let patient = Patient {
            id,
            first_name: request.first_name,
            last_name: request.last_name,
            age: request.age,
        };
        state.patients.insert(id, patient.clone());
        Ok(patient)
    }

    async fn delete_patient(&self, id: i64) -> Result<(), ApiError> {
        let mut state = self.begin(ApiOperation::DeletePatient)?;
        match state.patients.remove(&id) {
            Some(_) => Ok(()),
            None => Err(ApiError::not_found("Patient not found")),
        }
    }

    async fn get_patient(&self, id: i64) -> Result<Patient, ApiError> {
        let state = self.begin(ApiOperation::GetPatient)?;
        state
            .patients
            .get(&id)
            .cloned()
            .ok_or_else(|| ApiError::from_response(404, ""))
    }

    async fn list_clinicals_for_patient(&self, patient_id: i64) -> Result<Vec<ClinicalRecord>, ApiError> {
        let state = self.begin(ApiOperation::ListClinicals)?;
        Ok(state
            .clinicals
            .iter()
            .filter(|record| record.patient_id == Some(patient_id))
            .cloned()
            .collect())
    }

    async fn upsert_clinical(
        &self,
        patient_id: i64,
        request: UpsertClinicalRequest,
    ) -> Result<ClinicalRecord, ApiError> {
        let mut state = self.begin(ApiOperation::UpsertClinical)?;
        if !state.patients.contains_key(&patient_id) {
            return Err(ApiError::server(400, "Patient not found"));
        }

        let id = state.next_clinical_id;
        state.next_clinical_id += 1;

        let record = ClinicalRecord {
            id: Some(id),
            patient_id: Some(request.patient_id),
            component_name: Some(request.component_name),
            component_value: Some(request.component_value),
            measured_date_time: Some(request.measured_date_time),
        };
        state.clinicals.push(record.clone());
        Ok(record)
    }
}
