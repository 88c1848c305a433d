// User-facing text shown by the views

pub const PATIENTS_LOADING: &str = "Loading patients...";
pub const PATIENTS_EMPTY: &str = "No patients registered";
pub const PATIENTS_LOAD_FAILED: &str =
    "Error loading patient data. Check that the server is running.";
pub const PATIENT_DELETE_FAILED: &str = "Error deleting the patient. Please try again.";

pub const PATIENT_ADDED: &str = "Patient added successfully!";
pub const PATIENT_ADD_FAILED: &str = "Error adding the patient. Please try again.";

pub const PATIENT_DETAILS_LOADING: &str = "Loading patient details...";
pub const PATIENT_DETAILS_FAILED: &str = "Error loading the patient details";
pub const CLINICAL_ADDED: &str = "Clinical data added successfully!";
pub const CLINICAL_ADD_FAILED: &str = "Error adding the clinical data. Please try again.";
pub const CLINICALS_EMPTY: &str = "No clinical data recorded for this patient.";
pub const VALUE_PLACEHOLDER: &str = "Enter the value";
pub const NOT_AVAILABLE_DATE: &str = "Not available";

/// Inline error for a failed patient list fetch
pub fn patients_load_error(detail: &str) -> String {
    format!("Error loading patient data: {}", detail)
}

/// Confirmation question before deleting a patient
pub fn confirm_delete(name: &str) -> String {
    format!("Are you sure you want to delete patient {}?", name)
}

/// Success notification after deleting a patient
pub fn patient_deleted(name: &str) -> String {
    format!("Patient {} deleted successfully!", name)
}

/// History table heading with the record count
pub fn history_heading(count: usize) -> String {
    let plural = if count == 1 { "" } else { "s" };
    format!("Clinical History ({} record{})", count, plural)
}
