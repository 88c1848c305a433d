use chrono::SecondsFormat;

use crate::entities::clinical::{parse_measured_date_time, ClinicalRecord, ComponentKind, NewClinical};
use crate::entities::patient::{NewPatient, Patient};
use patient_clinicals_data::models;

/// Conversion functions between domain entities and wire models
/// These functions follow the pattern convert_to_[target_layer]_[model_name]

/// Convert from wire model to domain entity for a patient
pub fn convert_to_domain_patient(data_patient: models::patient::Patient) -> Patient {
    Patient {
        id: data_patient.id,
        first_name: data_patient.first_name,
        last_name: data_patient.last_name,
        age: data_patient.age,
    }
}

/// Convert from wire model to domain entity for a clinical record
pub fn convert_to_domain_clinical(data_record: models::clinical::ClinicalRecord) -> ClinicalRecord {
    ClinicalRecord {
        id: data_record.id,
        patient_id: data_record.patient_id,
        component: ComponentKind::parse(data_record.component_name.as_deref()),
        value: data_record.component_value,
        measured_at: data_record
            .measured_date_time
            .as_deref()
            .and_then(parse_measured_date_time),
    }
}

/// Convert from domain entity to wire model for a create request
pub fn convert_to_data_create_request(domain_patient: &NewPatient) -> models::patient::CreatePatientRequest {
    models::patient::CreatePatientRequest {
        first_name: domain_patient.first_name.clone(),
        last_name: domain_patient.last_name.clone(),
        age: domain_patient.age,
    }
}

/// Convert from domain entity to wire model for a clinical upsert.
///
/// The timestamp is sent as UTC with millisecond precision and a `Z` suffix.
pub fn convert_to_data_upsert_request(domain_clinical: &NewClinical) -> models::clinical::UpsertClinicalRequest {
    models::clinical::UpsertClinicalRequest {
        patient_id: domain_clinical.patient_id,
        component_name: domain_clinical.component.as_str().to_string(),
        component_value: domain_clinical.value.clone(),
        measured_date_time: domain_clinical
            .measured_at
            .to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}
