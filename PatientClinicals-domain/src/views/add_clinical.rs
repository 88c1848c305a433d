use chrono::{DateTime, Utc};
use patient_clinicals_data::ApiError;
use tracing::{debug, error, info, instrument, warn};

use super::{messages, SubmitOutcome, ViewContext, REDIRECT_DELAY};
use crate::entities::clinical::{ClinicalRecord, ComponentName, NewClinical, NOT_AVAILABLE};
use crate::entities::conversions::{
    convert_to_data_upsert_request, convert_to_domain_clinical, convert_to_domain_patient,
};
use crate::entities::patient::Patient;
use crate::routing::Route;

/// Display format of the measurement time column
const MEASURED_FORMAT: &str = "%d/%m/%Y, %H:%M:%S";

/// Lifecycle of the clinical entry screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddClinicalState {
    /// Patient (and then history) being fetched
    Loading,
    /// Patient found; history may be empty
    Ready {
        patient: Patient,
        clinicals: Vec<ClinicalRecord>,
    },
    /// Patient could not be loaded; blocks the whole view
    Failed(String),
}

/// Contents of the clinical entry form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClinicalForm {
    pub component: Option<ComponentName>,
    pub value: String,
}

impl ClinicalForm {
    /// Hint for the value field, depending on the chosen component
    pub fn placeholder(&self) -> &'static str {
        self.component
            .map(|component| component.placeholder())
            .unwrap_or(messages::VALUE_PLACEHOLDER)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Both fields are required. Failures are `Validation` errors.
    pub fn to_new_clinical(&self, patient_id: i64, measured_at: DateTime<Utc>) -> Result<NewClinical, ApiError> {
        let component = self
            .component
            .ok_or_else(|| ApiError::validation("Component is required"))?;
        if self.value.trim().is_empty() {
            return Err(ApiError::validation("Value is required"));
        }

        Ok(NewClinical {
            patient_id,
            component,
            value: self.value.clone(),
            measured_at,
        })
    }
}

/// One rendered row of the history table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRow {
    pub id: String,
    pub component: String,
    pub value: String,
    pub measured: String,
}

/// Sort records newest first. Records without a readable time go last.
pub fn sort_newest_first(records: &[ClinicalRecord]) -> Vec<&ClinicalRecord> {
    let mut sorted: Vec<&ClinicalRecord> = records.iter().collect();
    sorted.sort_by(|a, b| b.measured_at.cmp(&a.measured_at));
    sorted
}

/// Rows of the history table, re-sorted on every call
pub fn history_rows(records: &[ClinicalRecord]) -> Vec<HistoryRow> {
    sort_newest_first(records)
        .into_iter()
        .map(|record| HistoryRow {
            id: record
                .id
                .map(|id| id.to_string())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            component: record.component.label(),
            value: record.display_value(),
            measured: record
                .measured_at
                .map(|at| at.format(MEASURED_FORMAT).to_string())
                .unwrap_or_else(|| messages::NOT_AVAILABLE_DATE.to_string()),
        })
        .collect()
}

/// Clinical data entry and history for one patient
pub struct AddClinicalView {
    ctx: ViewContext,
    patient_id: i64,
    state: AddClinicalState,
    form: ClinicalForm,
    submitting: bool,
}

impl AddClinicalView {
    /// Mount for the patient in the route. Call [`load`](Self::load) next.
    pub fn new(ctx: ViewContext, patient_id: i64) -> Self {
        Self {
            ctx,
            patient_id,
            state: AddClinicalState::Loading,
            form: ClinicalForm::default(),
            submitting: false,
        }
    }

    pub fn patient_id(&self) -> i64 {
        self.patient_id
    }

    pub fn state(&self) -> &AddClinicalState {
        &self.state
    }

    pub fn form(&self) -> &ClinicalForm {
        &self.form
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// History table rows, newest first
    pub fn history(&self) -> Vec<HistoryRow> {
        match &self.state {
            AddClinicalState::Ready { clinicals, .. } => history_rows(clinicals),
            _ => Vec::new(),
        }
    }

    /// Fetch the patient, then the patient's clinical history.
    ///
    /// A missing patient blocks the view and no history request is made. A
    /// failed history request just means an empty history.
    #[instrument(skip(self), fields(patient_id = self.patient_id))]
    pub async fn load(&mut self) {
        self.state = AddClinicalState::Loading;

        let patient = match self.ctx.api.get_patient(self.patient_id).await {
            Ok(patient) => convert_to_domain_patient(patient),
            Err(e) => {
                if !self.ctx.navigator.is_live() {
                    return;
                }
                error!("Error fetching patient details: {}", e);
                self.ctx.notifications.error(messages::PATIENT_DETAILS_FAILED);
                self.state = AddClinicalState::Failed(messages::PATIENT_DETAILS_FAILED.to_string());
                return;
            }
        };

        if !self.ctx.navigator.is_live() {
            debug!("Clinical view unmounted before the patient arrived");
            return;
        }

        let clinicals = self.fetch_clinicals().await.unwrap_or_default();
        if !self.ctx.navigator.is_live() {
            return;
        }

        info!("Loaded patient {} with {} clinical records", patient.id, clinicals.len());
        self.state = AddClinicalState::Ready { patient, clinicals };
    }

    /// Fetch the history; `None` when the request failed
    async fn fetch_clinicals(&self) -> Option<Vec<ClinicalRecord>> {
        match self.ctx.api.list_clinicals_for_patient(self.patient_id).await {
            Ok(records) => Some(records.into_iter().map(convert_to_domain_clinical).collect()),
            Err(e) => {
                debug!("No clinical data found or error fetching clinicals: {}", e);
                None
            }
        }
    }

    /// Choose the component. Ignored while submitting.
    pub fn select_component(&mut self, component: Option<ComponentName>) {
        if !self.submitting {
            self.form.component = component;
        }
    }

    /// Set the measured value. Ignored while submitting.
    pub fn set_value(&mut self, value: impl Into<String>) {
        if !self.submitting {
            self.form.value = value.into();
        }
    }

    pub fn clear(&mut self) {
        if !self.submitting {
            self.form.clear();
        }
    }

    /// Record a measurement taken now.
    ///
    /// On success the form is cleared, the history re-fetched, and the list
    /// shown after [`REDIRECT_DELAY`].
    #[instrument(skip(self), fields(patient_id = self.patient_id))]
    pub async fn submit(&mut self) -> SubmitOutcome {
        if self.submitting || !matches!(self.state, AddClinicalState::Ready { .. }) {
            return SubmitOutcome::Ignored;
        }

        let new_clinical = match self.form.to_new_clinical(self.patient_id, Utc::now()) {
            Ok(new_clinical) => new_clinical,
            Err(e) => {
                warn!("Clinical form rejected: {}", e);
                return SubmitOutcome::Invalid(e.message);
            }
        };

        self.submitting = true;
        let result = self
            .ctx
            .api
            .upsert_clinical(self.patient_id, convert_to_data_upsert_request(&new_clinical))
            .await;
        self.submitting = false;

        if !self.ctx.navigator.is_live() {
            return SubmitOutcome::Ignored;
        }

        match result {
            Ok(saved) => {
                info!("Saved clinical record {:?}", saved.id);
                self.ctx.notifications.success(messages::CLINICAL_ADDED);
                self.form.clear();

                // Keep the previous history if the refresh fails
                if let Some(records) = self.fetch_clinicals().await {
                    if let AddClinicalState::Ready { clinicals, .. } = &mut self.state {
                        *clinicals = records;
                    }
                } else {
                    warn!("Could not refresh clinical history");
                }

                self.ctx.navigator.navigate_after(Route::PatientList, REDIRECT_DELAY);
                SubmitOutcome::Saved
            }
            Err(e) => {
                error!("Error saving clinical data: {}", e);
                let message = e.user_message(messages::CLINICAL_ADD_FAILED);
                self.ctx.notifications.error(message.clone());
                SubmitOutcome::Failed(message)
            }
        }
    }

    /// Back to the patient list
    pub fn open_home(&self) {
        self.ctx.navigator.navigate(Route::PatientList);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::clinical::ComponentKind;
    use crate::notifications::{NotificationKind, NotificationService};
    use crate::routing::{NavigationReceiver, Router};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use mockall::mock;
    use patient_clinicals_data::models;
    use patient_clinicals_data::{ApiError, ApiOperation, InMemoryPatientApi, PatientApiTrait};
    use std::sync::Arc;
    use tokio::time::Instant;

    mock! {
        pub Api {}

        #[async_trait]
        impl PatientApiTrait for Api {
            async fn list_patients(&self) -> Result<Vec<models::patient::Patient>, ApiError>;
            async fn create_patient(
                &self,
                request: models::patient::CreatePatientRequest,
            ) -> Result<models::patient::Patient, ApiError>;
            async fn delete_patient(&self, id: i64) -> Result<(), ApiError>;
            async fn get_patient(&self, id: i64) -> Result<models::patient::Patient, ApiError>;
            async fn list_clinicals_for_patient(
                &self,
                patient_id: i64,
            ) -> Result<Vec<models::clinical::ClinicalRecord>, ApiError>;
            async fn upsert_clinical(
                &self,
                patient_id: i64,
                request: models::clinical::UpsertClinicalRequest,
            ) -> Result<models::clinical::ClinicalRecord, ApiError>;
        }
    }

    fn mount_with(
        api: Arc<dyn PatientApiTrait>,
        patient_id: i64,
    ) -> (AddClinicalView, NotificationService, Router, NavigationReceiver) {
        let (router, rx) = Router::new();
        let token = router.mount(Some(Route::AddClinical { patient_id }));
        let notifications = NotificationService::new();
        let ctx = ViewContext::new(api, notifications.clone(), router.navigator(token));
        (AddClinicalView::new(ctx, patient_id), notifications, router, rx)
    }

    fn record(id: Option<i64>, name: &str, value: &str, at: Option<&str>) -> models::clinical::ClinicalRecord {
        models::clinical::ClinicalRecord {
            id,
            patient_id: Some(1),
            component_name: Some(name.to_string()),
            component_value: Some(value.to_string()),
            measured_date_time: at.map(str::to_string),
        }
    }

    #[test]
    fn test_history_sorted_newest_first() {
        let records: Vec<ClinicalRecord> = vec![
            record(Some(1), "bp", "120/80", Some("2024-05-01T08:00:00")),
            record(Some(2), "temperature", "36.5", Some("2024-05-03T08:00:00")),
            record(None, "glucose", "95", None),
            record(Some(3), "heart_rate", "72", Some("2024-05-02T08:00:00Z")),
        ]
        .into_iter()
        .map(convert_to_domain_clinical)
        .collect();

        let rows = history_rows(&records);
        let ids: Vec<&str> = rows.iter().map(|row| row.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3", "1", "N/A"]);

        assert_eq!(rows[0].component, "Temperature");
        assert_eq!(rows[0].value, "36.5 °C");
        assert_eq!(rows[0].measured, "03/05/2024, 08:00:00");
        assert_eq!(rows[1].component, "Heart Rate");
        assert_eq!(rows[1].value, "72 bpm");
        assert_eq!(rows[3].value, "95 mg/dL");
        assert_eq!(rows[3].measured, messages::NOT_AVAILABLE_DATE);

        // Input order is untouched
        assert_eq!(records[0].id, Some(1));
    }

    #[test]
    fn test_placeholder_follows_component() {
        let mut form = ClinicalForm::default();
        assert_eq!(form.placeholder(), messages::VALUE_PLACEHOLDER);
        form.component = Some(ComponentName::Bp);
        assert_eq!(form.placeholder(), "e.g. 120/80");
        form.component = Some(ComponentName::Glucose);
        assert_eq!(form.placeholder(), "e.g. 95");
    }

    #[test]
    fn test_form_requires_both_fields() {
        let now = Utc::now();
        let mut form = ClinicalForm::default();

        let err = form.to_new_clinical(1, now).unwrap_err();
        assert_eq!(err.kind, patient_clinicals_data::ApiErrorKind::Validation);
        assert_eq!(err.message, "Component is required");

        form.component = Some(ComponentName::Weight);
        form.value = "  ".to_string();
        assert_eq!(form.to_new_clinical(1, now).unwrap_err().message, "Value is required");

        form.value = "70.5".to_string();
        let new_clinical = form.to_new_clinical(1, now).unwrap();
        assert_eq!(new_clinical.component, ComponentName::Weight);
        assert_eq!(new_clinical.measured_at, now);
    }

    #[tokio::test]
    async fn test_missing_patient_blocks_without_history_request() {
        let mut api = MockApi::new();
        api.expect_get_patient()
            .withf(|id| *id == 42)
            .times(1)
            .returning(|_| Err(ApiError::from_response(404, "")));
        api.expect_list_clinicals_for_patient().times(0);

        let (mut view, notifications, _router, _rx) = mount_with(Arc::new(api), 42);
        view.load().await;

        assert_eq!(
            view.state(),
            &AddClinicalState::Failed(messages::PATIENT_DETAILS_FAILED.to_string())
        );
        assert_eq!(notifications.active(Instant::now())[0].kind, NotificationKind::Error);
        assert!(view.history().is_empty());
    }

    #[tokio::test]
    async fn test_history_failure_is_silent() {
        let api = InMemoryPatientApi::new()
            .with_patient("Ana", "Lopez", 30)
            .with_failure(ApiOperation::ListClinicals);
        let (mut view, notifications, _router, _rx) = mount_with(Arc::new(api), 1);

        view.load().await;

        match view.state() {
            AddClinicalState::Ready { patient, clinicals } => {
                assert_eq!(patient.full_name(), "Ana Lopez");
                assert!(clinicals.is_empty());
            }
            other => panic!("unexpected state {:?}", other),
        }
        assert!(notifications.active(Instant::now()).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_appends_and_refreshes() {
        let api = InMemoryPatientApi::new()
            .with_patient("Ana", "Lopez", 30)
            .with_clinical(record(Some(100), "weight", "70.5", Some("2020-01-01T00:00:00")));
        let (mut view, notifications, _router, mut rx) = mount_with(Arc::new(api.clone()), 1);
        view.load().await;
        assert_eq!(view.history().len(), 1);

        view.select_component(Some(ComponentName::Temperature));
        view.set_value("36.5");
        let before = Utc::now();
        assert_eq!(view.submit().await, SubmitOutcome::Saved);

        assert_eq!(view.form(), &ClinicalForm::default());
        assert_eq!(notifications.active(Instant::now())[0].message, messages::CLINICAL_ADDED);
        assert_eq!(api.calls(ApiOperation::ListClinicals), 2);

        let rows = view.history();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].value, "36.5 °C");
        assert_eq!(rows[1].value, "70.5 kg");

        let stored = api.clinicals();
        let sent = stored.last().unwrap();
        assert_eq!(sent.patient_id, Some(1));
        assert_eq!(sent.component_name.as_deref(), Some("temperature"));
        let sent_at = sent.measured_date_time.as_deref().unwrap();
        assert!(sent_at.ends_with('Z'));
        let parsed = crate::entities::clinical::parse_measured_date_time(sent_at).unwrap();
        assert!(parsed >= before - chrono::Duration::seconds(1));

        let command = rx.recv().await.unwrap();
        assert_eq!(command.route, Some(Route::PatientList));
    }

    #[tokio::test]
    async fn test_submit_failure_uses_server_message() {
        let api = InMemoryPatientApi::new().with_patient("Ana", "Lopez", 30);
        api.fail(ApiOperation::UpsertClinical, ApiError::server(400, "Invalid component value"));
        let (mut view, notifications, _router, mut rx) = mount_with(Arc::new(api.clone()), 1);
        view.load().await;

        view.select_component(Some(ComponentName::Bp));
        view.set_value("120/80");
        let outcome = view.submit().await;

        assert_eq!(outcome, SubmitOutcome::Failed("Invalid component value".to_string()));
        assert_eq!(view.form().value, "120/80");
        assert_eq!(notifications.active(Instant::now())[0].message, "Invalid component value");
        assert!(rx.try_recv().is_err());

        api.fail(ApiOperation::UpsertClinical, ApiError::network("timeout"));
        let outcome = view.submit().await;
        assert_eq!(outcome, SubmitOutcome::Failed(messages::CLINICAL_ADD_FAILED.to_string()));
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_previous_history() {
        let api = InMemoryPatientApi::new()
            .with_patient("Ana", "Lopez", 30)
            .with_clinical(record(Some(100), "weight", "70.5", Some("2020-01-01T00:00:00")));
        let (mut view, _, _router, _rx) = mount_with(Arc::new(api.clone()), 1);
        view.load().await;

        api.fail(ApiOperation::ListClinicals, ApiError::network("timeout"));
        view.select_component(Some(ComponentName::Height));
        view.set_value("175");
        assert_eq!(view.submit().await, SubmitOutcome::Saved);

        let rows = view.history();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "100");
    }

    #[tokio::test]
    async fn test_submit_requires_both_fields() {
        let api = InMemoryPatientApi::new().with_patient("Ana", "Lopez", 30);
        let (mut view, _, _router, _rx) = mount_with(Arc::new(api.clone()), 1);
        view.load().await;

        assert_eq!(view.submit().await, SubmitOutcome::Invalid("Component is required".to_string()));
        view.select_component(Some(ComponentName::Weight));
        assert_eq!(view.submit().await, SubmitOutcome::Invalid("Value is required".to_string()));
        assert_eq!(api.calls(ApiOperation::UpsertClinical), 0);
    }

    #[tokio::test]
    async fn test_submit_before_load_is_ignored() {
        let api = InMemoryPatientApi::new().with_patient("Ana", "Lopez", 30);
        let (mut view, _, _router, _rx) = mount_with(Arc::new(api.clone()), 1);
        view.select_component(Some(ComponentName::Bp));
        view.set_value("120/80");

        assert_eq!(view.submit().await, SubmitOutcome::Ignored);
        assert_eq!(api.calls(ApiOperation::UpsertClinical), 0);
    }

    #[tokio::test]
    async fn test_legacy_rows_render() {
        let api = InMemoryPatientApi::new()
            .with_patient("Ana", "Lopez", 30)
            .with_clinical(record(Some(1), "blood_pressure", "118/76", Some("2024-01-01T09:30")));
        let (mut view, _, _router, _rx) = mount_with(Arc::new(api), 1);
        view.load().await;

        match view.state() {
            AddClinicalState::Ready { clinicals, .. } => {
                assert!(matches!(clinicals[0].component, ComponentKind::Legacy { .. }));
                assert_eq!(
                    clinicals[0].measured_at,
                    Some(Utc.with_ymd_and_hms(2024, 1, 1, 9, 30, 0).unwrap())
                );
            }
            other => panic!("unexpected state {:?}", other),
        }
        let rows = view.history();
        assert_eq!(rows[0].component, "Blood Pressure");
        assert_eq!(rows[0].value, "118/76");
        assert_eq!(rows[0].measured, "01/01/2024, 09:30:00");
    }
}
