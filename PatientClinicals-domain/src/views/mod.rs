// Views
// One module per screen; each owns its fetched data and form state

pub mod add_clinical;
pub mod add_patient;
pub mod messages;
pub mod patient_list;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use patient_clinicals_data::PatientApiTrait;

use crate::notifications::NotificationService;
use crate::routing::Navigator;

pub use add_clinical::{AddClinicalState, AddClinicalView, ClinicalForm, HistoryRow};
pub use add_patient::{AddPatientView, PatientField};
pub use patient_list::{DeleteOutcome, PatientListState, PatientListView};

/// Delay between a successful save and the return to the patient list
pub const REDIRECT_DELAY: Duration = Duration::from_secs(2);

/// Shared API client handle
pub type PatientApi = Arc<dyn PatientApiTrait>;

/// Blocking yes/no question put to the user before destructive actions
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConfirmDialog: Send + Sync {
    /// Ask `message`; true when the user accepts
    async fn confirm(&self, message: &str) -> bool;
}

/// Collaborators handed to a view when it is mounted
#[derive(Clone)]
pub struct ViewContext {
    pub api: PatientApi,
    pub notifications: NotificationService,
    pub navigator: Navigator,
}

impl ViewContext {
    pub fn new(api: PatientApi, notifications: NotificationService, navigator: Navigator) -> Self {
        Self {
            api,
            notifications,
            navigator,
        }
    }
}

/// Result of submitting a form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Saved; the form was cleared and a redirect scheduled
    Saved,

    /// Rejected locally, nothing was sent
    Invalid(String),

    /// The backend call failed; the form is untouched
    Failed(String),

    /// Nothing to do: a submit is in flight, the view is not ready, or it was unmounted
    Ignored,
}
