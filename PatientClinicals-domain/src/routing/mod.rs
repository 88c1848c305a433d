//! Application routing
//! Maps paths to views and owns the navigation state every view goes through

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::debug;

/// The three screens of the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// `/`
    PatientList,
    /// `/add-patient`
    AddPatient,
    /// `/add-clinical/:patientId`
    AddClinical { patient_id: i64 },
}

impl Route {
    /// Resolve a path. Unknown paths, and a non-integer `patientId`, match nothing.
    pub fn parse(path: &str) -> Option<Route> {
        let path = path.trim();
        let trimmed = path.trim_end_matches('/');

        match trimmed {
            "" => Some(Route::PatientList),
            "/add-patient" => Some(Route::AddPatient),
            _ => trimmed
                .strip_prefix("/add-clinical/")
                .and_then(|id| id.parse::<i64>().ok())
                .map(|patient_id| Route::AddClinical { patient_id }),
        }
    }

    /// Path for this route
    pub fn path(&self) -> String {
        match self {
            Route::PatientList => "/".to_string(),
            Route::AddPatient => "/add-patient".to_string(),
            Route::AddClinical { patient_id } => format!("/add-clinical/{}", patient_id),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Identifies one mounting of a view. Stale once anything else is mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MountToken {
    generation: u64,
}

/// Request to show a route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationCommand {
    /// Where to go; `None` for a path that matched no route
    pub route: Option<Route>,

    /// Path as requested
    pub path: String,

    /// View that asked, if any. Requests from a stale view are ignored.
    pub issued_by: Option<MountToken>,
}

/// Receiving end the front end drains to perform navigation
pub type NavigationReceiver = mpsc::UnboundedReceiver<NavigationCommand>;

#[derive(Debug, Default)]
struct RouterState {
    current: Option<Route>,
    generation: u64,
    timers: Vec<AbortHandle>,
}

/// Explicit navigation store.
///
/// Holds the current route and mount generation, hands out navigators to
/// views, and forwards their requests over a channel.
#[derive(Debug, Clone)]
pub struct Router {
    state: Arc<Mutex<RouterState>>,
    commands: mpsc::UnboundedSender<NavigationCommand>,
}

impl Router {
    /// Create a router and the receiver navigation requests arrive on
    pub fn new() -> (Self, NavigationReceiver) {
        let (commands, receiver) = mpsc::unbounded_channel();
        let router = Self {
            state: Arc::new(Mutex::new(RouterState::default())),
            commands,
        };
        (router, receiver)
    }

    fn lock(&self) -> MutexGuard<'_, RouterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record that `route` is now shown, invalidating the previous view.
    ///
    /// Delayed navigations scheduled by earlier views are aborted.
    pub fn mount(&self, route: Option<Route>) -> MountToken {
        let mut state = self.lock();
        state.generation += 1;
        state.current = route;
        for timer in state.timers.drain(..) {
            timer.abort();
        }

        debug!(generation = state.generation, "Mounted {:?}", route);
        MountToken {
            generation: state.generation,
        }
    }

    /// Route currently shown
    pub fn current(&self) -> Option<Route> {
        self.lock().current
    }

    /// Whether the view holding `token` is still mounted
    pub fn is_live(&self, token: MountToken) -> bool {
        self.lock().generation == token.generation
    }

    /// Delayed navigations still waiting to fire
    pub fn pending_timers(&self) -> usize {
        let mut state = self.lock();
        state.timers.retain(|timer| !timer.is_finished());
        state.timers.len()
    }

    /// Ask the front end to show `path`, regardless of which view is mounted
    pub fn request(&self, path: &str) {
        self.send(NavigationCommand {
            route: Route::parse(path),
            path: path.to_string(),
            issued_by: None,
        });
    }

    /// Navigation handle for the view mounted with `token`
    pub fn navigator(&self, token: MountToken) -> Navigator {
        Navigator {
            router: self.clone(),
            token,
        }
    }

    fn send(&self, command: NavigationCommand) {
        if self.commands.send(command).is_err() {
            debug!("Navigation receiver closed; dropping request");
        }
    }
}

/// A view's handle on the router
#[derive(Debug, Clone)]
pub struct Navigator {
    router: Router,
    token: MountToken,
}

impl Navigator {
    /// Whether the owning view is still mounted
    pub fn is_live(&self) -> bool {
        self.router.is_live(self.token)
    }

    /// Token of the owning view
    pub fn token(&self) -> MountToken {
        self.token
    }

    /// Navigate now. No-op once the view is unmounted.
    pub fn navigate(&self, route: Route) {
        if !self.is_live() {
            debug!("Ignoring navigation to {} from an unmounted view", route);
            return;
        }
        self.router.send(NavigationCommand {
            route: Some(route),
            path: route.path(),
            issued_by: Some(self.token),
        });
    }

    /// Navigate after `delay`.
    ///
    /// The timer is cancelled when the view is unmounted and re-checks
    /// liveness before firing.
    pub fn navigate_after(&self, route: Route, delay: Duration) {
        if !self.is_live() {
            return;
        }

        let navigator = self.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            navigator.navigate(route);
        });

        let mut state = self.router.lock();
        if state.generation == self.token.generation {
            state.timers.push(task.abort_handle());
        } else {
            task.abort();
        }
        debug!("Scheduled navigation to {} in {:?}", route, delay);
    }
}
