use std::str::FromStr;

use tracing::{debug, error, info, instrument, warn};

use super::{messages, SubmitOutcome, ViewContext, REDIRECT_DELAY};
use crate::entities::conversions::{convert_to_data_create_request, convert_to_domain_patient};
use crate::entities::patient::PatientForm;
use crate::routing::Route;

/// Editable fields of the add-patient form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatientField {
    FirstName,
    LastName,
    Age,
}

impl FromStr for PatientField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "firstName" | "first_name" | "first" => Ok(PatientField::FirstName),
            "lastName" | "last_name" | "last" => Ok(PatientField::LastName),
            "age" => Ok(PatientField::Age),
            other => Err(format!("Unknown patient field: {}", other)),
        }
    }
}

/// Form for registering a new patient
pub struct AddPatientView {
    ctx: ViewContext,
    form: PatientForm,
    submitting: bool,
}

impl AddPatientView {
    pub fn new(ctx: ViewContext) -> Self {
        Self {
            ctx,
            form: PatientForm::default(),
            submitting: false,
        }
    }

    pub fn form(&self) -> &PatientForm {
        &self.form
    }

    /// Whether a submit is waiting on the backend
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Update one field. Ignored while submitting, as the inputs are disabled.
    pub fn set_field(&mut self, field: PatientField, value: impl Into<String>) {
        if self.submitting {
            return;
        }
        let value = value.into();
        match field {
            PatientField::FirstName => self.form.first_name = value,
            PatientField::LastName => self.form.last_name = value,
            PatientField::Age => self.form.age = value,
        }
    }

    /// Empty every field
    pub fn clear(&mut self) {
        if !self.submitting {
            self.form.clear();
        }
    }

    /// Create the patient.
    ///
    /// On success the form is cleared and the list is shown after
    /// [`REDIRECT_DELAY`]; on failure the form is kept for a retry.
    #[instrument(skip(self))]
    pub async fn submit(&mut self) -> SubmitOutcome {
        if self.submitting {
            debug!("Submit ignored: already submitting");
            return SubmitOutcome::Ignored;
        }

        let new_patient = match self.form.to_new_patient() {
            Ok(patient) => patient,
            Err(e) => {
                warn!("Patient form rejected: {}", e);
                return SubmitOutcome::Invalid(e.message);
            }
        };

        self.submitting = true;
        let result = self
            .ctx
            .api
            .create_patient(convert_to_data_create_request(&new_patient))
            .await;
        self.submitting = false;

        if !self.ctx.navigator.is_live() {
            debug!("Add patient view unmounted before the request completed");
            return SubmitOutcome::Ignored;
        }

        match result {
            Ok(created) => {
                let patient = convert_to_domain_patient(created);
                info!("Created patient {} with ID: {}", patient.full_name(), patient.id);
                self.ctx.notifications.success(messages::PATIENT_ADDED);
                self.form.clear();
                self.ctx.navigator.navigate_after(Route::PatientList, REDIRECT_DELAY);
                SubmitOutcome::Saved
            }
            Err(e) => {
                error!("Error adding patient: {}", e);
                self.ctx.notifications.error(messages::PATIENT_ADD_FAILED);
                SubmitOutcome::Failed(messages::PATIENT_ADD_FAILED.to_string())
            }
        }
    }

    /// Back to the patient list
    pub fn open_home(&self) {
        self.ctx.navigator.navigate(Route::PatientList);
    }
}
