//! Application shell state: the mounted view, the router and the notification queue

use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info, instrument};

use patient_clinicals_domain::entities::clinical::ComponentName;
use patient_clinicals_domain::notifications::NotificationService;
use patient_clinicals_domain::routing::{NavigationCommand, NavigationReceiver, Route, Router};
use patient_clinicals_domain::views::{
    AddClinicalView, AddPatientView, ConfirmDialog, PatientApi, PatientField, PatientListView,
    SubmitOutcome, ViewContext,
};

use crate::command::Command;
use crate::render;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AppError {
    #[error("'{0}' is not available on this screen")]
    NotAvailable(&'static str),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("{0}")]
    Invalid(String),

    #[error("No notification #{0}")]
    NoSuchNotification(u64),
}

/// What the shell should do after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    ShowHelp,
    Quit,
}

/// The screen currently mounted
pub enum ActiveView {
    PatientList(PatientListView),
    AddPatient(AddPatientView),
    AddClinical(AddClinicalView),
    /// Path that matched no route
    NotFound(String),
}

/// Front end state driven by the shell
pub struct App {
    api: PatientApi,
    notifications: NotificationService,
    router: Router,
    navigation: NavigationReceiver,
    view: ActiveView,
    path: String,
}

impl App {
    /// Create the app with nothing mounted. Call [`open`](Self::open) next.
    pub fn new(api: PatientApi) -> Self {
        let (router, navigation) = Router::new();
        Self {
            api,
            notifications: NotificationService::new(),
            router,
            navigation,
            view: ActiveView::NotFound(String::new()),
            path: String::new(),
        }
    }

    pub fn notifications(&self) -> &NotificationService {
        &self.notifications
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn view(&self) -> &ActiveView {
        &self.view
    }

    /// Path of the mounted screen, as it was requested
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Mount the screen for `path` and run its initial fetches
    #[instrument(skip(self))]
    pub async fn open(&mut self, path: &str) {
        let route = Route::parse(path);
        let token = self.router.mount(route);
        let ctx = ViewContext::new(
            self.api.clone(),
            self.notifications.clone(),
            self.router.navigator(token),
        );
        self.path = route.map(|r| r.path()).unwrap_or_else(|| path.to_string());

        info!("Opening {}", self.path);
        self.view = match route {
            Some(Route::PatientList) => {
                let mut view = PatientListView::new(ctx);
                view.load().await;
                ActiveView::PatientList(view)
            }
            Some(Route::AddPatient) => ActiveView::AddPatient(AddPatientView::new(ctx)),
            Some(Route::AddClinical { patient_id }) => {
                let mut view = AddClinicalView::new(ctx, patient_id);
                view.load().await;
                ActiveView::AddClinical(view)
            }
            None => ActiveView::NotFound(path.to_string()),
        };
    }

    /// Wait for the next navigation request
    pub async fn next_navigation(&mut self) -> Option<NavigationCommand> {
        self.navigation.recv().await
    }

    /// Perform a navigation request. Requests from unmounted views are dropped.
    pub async fn apply(&mut self, command: NavigationCommand) -> bool {
        if let Some(token) = command.issued_by {
            if !self.router.is_live(token) {
                debug!("Dropping stale navigation to {}", command.path);
                return false;
            }
        }
        self.open(&command.path).await;
        true
    }

    /// Perform every navigation request already queued
    pub async fn drain_navigation(&mut self) {
        while let Ok(command) = self.navigation.try_recv() {
            self.apply(command).await;
        }
    }

    fn request(&self, route: Route) {
        self.router.request(&route.path());
    }

    /// Run one shell command against the mounted screen
    pub async fn handle(&mut self, command: Command, dialog: &dyn ConfirmDialog) -> Result<Flow, AppError> {
        match command {
            Command::Empty => {}
            Command::Help => return Ok(Flow::ShowHelp),
            Command::Quit => return Ok(Flow::Quit),
            Command::Go(path) => self.router.request(&path),
            Command::Home => match &self.view {
                ActiveView::AddPatient(view) => view.open_home(),
                ActiveView::AddClinical(view) => view.open_home(),
                _ => self.request(Route::PatientList),
            },
            Command::Add => match &self.view {
                ActiveView::PatientList(view) => view.open_add_patient(),
                _ => self.request(Route::AddPatient),
            },
            Command::Clinical(patient_id) => match &self.view {
                ActiveView::PatientList(view) => view.open_add_clinical(patient_id),
                _ => self.request(Route::AddClinical { patient_id }),
            },
            Command::Reload => match &mut self.view {
                ActiveView::PatientList(view) => view.load().await,
                ActiveView::AddClinical(view) => view.load().await,
                _ => return Err(AppError::NotAvailable("reload")),
            },
            Command::Delete(id) => match &mut self.view {
                ActiveView::PatientList(view) => {
                    view.delete_patient(id, dialog).await;
                }
                _ => return Err(AppError::NotAvailable("delete")),
            },
            Command::Set { field, value } => self.set_field(&field, value)?,
            Command::Clear => match &mut self.view {
                ActiveView::AddPatient(view) => view.clear(),
                ActiveView::AddClinical(view) => view.clear(),
                _ => return Err(AppError::NotAvailable("clear")),
            },
            Command::Submit => {
                let outcome = match &mut self.view {
                    ActiveView::AddPatient(view) => view.submit().await,
                    ActiveView::AddClinical(view) => view.submit().await,
                    _ => return Err(AppError::NotAvailable("submit")),
                };
                if let SubmitOutcome::Invalid(message) = outcome {
                    return Err(AppError::Invalid(message));
                }
            }
            Command::Dismiss(Some(id)) => {
                if !self.notifications.dismiss(id) {
                    return Err(AppError::NoSuchNotification(id));
                }
            }
            Command::Dismiss(None) => self.notifications.dismiss_all(),
            Command::Answer { id, accepted } => {
                if !self.notifications.resolve_confirmation(id, accepted) {
                    return Err(AppError::NoSuchNotification(id));
                }
            }
        }

        self.drain_navigation().await;
        Ok(Flow::Continue)
    }

    fn set_field(&mut self, field: &str, value: String) -> Result<(), AppError> {
        match &mut self.view {
            ActiveView::AddPatient(view) => {
                let field = field
                    .parse::<PatientField>()
                    .map_err(|_| AppError::UnknownField(field.to_string()))?;
                view.set_field(field, value);
            }
            ActiveView::AddClinical(view) => match field {
                "component" | "componentName" => {
                    let component = if value.is_empty() {
                        None
                    } else {
                        Some(
                            value
                                .parse::<ComponentName>()
                                .map_err(|e| AppError::Invalid(e.to_string()))?,
                        )
                    };
                    view.select_component(component);
                }
                "value" | "componentValue" => view.set_value(value),
                other => return Err(AppError::UnknownField(other.to_string())),
            },
            _ => return Err(AppError::NotAvailable("set")),
        }
        Ok(())
    }

    /// Notifications followed by the mounted screen
    pub fn render(&self, now: Instant) -> String {
        let toasts = self.notifications.active(now);
        let prompts = self.notifications.confirmations();
        let screen = match &self.view {
            ActiveView::PatientList(view) => render::patient_list(view),
            ActiveView::AddPatient(view) => render::add_patient(view),
            ActiveView::AddClinical(view) => render::add_clinical(view),
            ActiveView::NotFound(path) => render::not_found(path),
        };

        let banner = render::notifications(&toasts, &prompts, now);
        if banner.is_empty() {
            screen
        } else {
            format!("{}\n\n{}", banner, screen)
        }
    }
}
