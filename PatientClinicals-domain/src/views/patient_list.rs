use tracing::{debug, error, info, instrument};

use super::{messages, ConfirmDialog, ViewContext};
use crate::entities::conversions::convert_to_domain_patient;
use crate::entities::patient::Patient;
use crate::routing::Route;

/// Lifecycle of the patient list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatientListState {
    /// Fetch in flight
    Loading,
    /// Fetched; may be empty
    Loaded(Vec<Patient>),
    /// Fetch failed; holds the inline error text
    Failed(String),
}

/// What happened to a delete request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The user declined; nothing was sent
    Cancelled,
    /// Deleted and the list reloaded
    Deleted,
    /// The backend refused; holds the message shown
    Failed(String),
    /// The request went out but the view was unmounted before it completed
    Ignored,
}

/// Home screen: every patient with links to add one or record clinical data
pub struct PatientListView {
    ctx: ViewContext,
    state: PatientListState,
}

impl PatientListView {
    /// Mount the view in the loading state. Call [`load`](Self::load) next.
    pub fn new(ctx: ViewContext) -> Self {
        Self {
            ctx,
            state: PatientListState::Loading,
        }
    }

    pub fn state(&self) -> &PatientListState {
        &self.state
    }

    /// Fetch the full patient list.
    ///
    /// A failure is reported twice: inline in the view state and as an error
    /// notification.
    #[instrument(skip(self))]
    pub async fn load(&mut self) {
        self.state = PatientListState::Loading;
        let result = self.ctx.api.list_patients().await;

        if !self.ctx.navigator.is_live() {
            debug!("Patient list unmounted before the fetch completed");
            return;
        }

        match result {
            Ok(patients) => {
                info!("Loaded {} patients", patients.len());
                self.state = PatientListState::Loaded(
                    patients.into_iter().map(convert_to_domain_patient).collect(),
                );
            }
            Err(e) => {
                error!("Error fetching patient data: {}", e);
                self.ctx.notifications.error(messages::PATIENTS_LOAD_FAILED);
                self.state = PatientListState::Failed(messages::patients_load_error(&e.message));
            }
        }
    }

    /// Display name for a patient id, from the loaded list when possible
    fn patient_name(&self, id: i64) -> String {
        match &self.state {
            PatientListState::Loaded(patients) => patients
                .iter()
                .find(|p| p.id == id)
                .map(Patient::full_name)
                .unwrap_or_else(|| format!("#{}", id)),
            _ => format!("#{}", id),
        }
    }

    /// Delete a patient after asking the user.
    ///
    /// On success the whole list is fetched again rather than edited in place.
    #[instrument(skip(self, dialog))]
    pub async fn delete_patient(&mut self, id: i64, dialog: &dyn ConfirmDialog) -> DeleteOutcome {
        let name = self.patient_name(id);
        if !dialog.confirm(&messages::confirm_delete(&name)).await {
            debug!("Deletion of patient {} cancelled", id);
            return DeleteOutcome::Cancelled;
        }

        let result = self.ctx.api.delete_patient(id).await;
        if !self.ctx.navigator.is_live() {
            debug!("Patient list unmounted before deletion of {} completed", id);
            return DeleteOutcome::Ignored;
        }

        match result {
            Ok(()) => {
                info!("Deleted patient {}", id);
                self.ctx.notifications.success(messages::patient_deleted(&name));
                self.load().await;
                DeleteOutcome::Deleted
            }
            Err(e) => {
                error!("Error deleting patient {}: {}", id, e);
                let message = e.user_message(messages::PATIENT_DELETE_FAILED);
                self.ctx.notifications.error(message.clone());
                DeleteOutcome::Failed(message)
            }
        }
    }

    /// Go to the add-patient form
    pub fn open_add_patient(&self) {
        self.ctx.navigator.navigate(Route::AddPatient);
    }

    /// Go to the clinical entry form for a patient
    pub fn open_add_clinical(&self, patient_id: i64) {
        self.ctx.navigator.navigate(Route::AddClinical { patient_id });
    }
}
