//! Transient user notifications
//! Toast-style messages with per-kind auto-dismiss, plus interactive confirmations

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Info,
    Warning,
}

impl NotificationKind {
    /// Auto-dismiss timeout used when the caller does not set one
    pub fn default_auto_close(&self) -> Duration {
        match self {
            NotificationKind::Success => Duration::from_secs(3),
            NotificationKind::Error => Duration::from_secs(5),
            NotificationKind::Info | NotificationKind::Warning => Duration::from_secs(4),
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
            NotificationKind::Info => "info",
            NotificationKind::Warning => "warning",
        };
        f.write_str(label)
    }
}

/// Screen corner or edge a notification is anchored to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    #[default]
    TopRight,
    TopCenter,
    TopLeft,
    BottomRight,
    BottomCenter,
    BottomLeft,
}

/// How long a notification stays up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutoClose {
    /// Use the per-kind default
    #[default]
    KindDefault,
    /// Dismiss after the given duration
    After(Duration),
    /// Stay until dismissed
    Never,
}

/// Caller-tunable presentation options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationOptions {
    pub position: Position,
    pub auto_close: AutoClose,
    pub hide_progress_bar: bool,
    pub close_on_click: bool,
    pub pause_on_hover: bool,
    pub draggable: bool,
}

impl Default for NotificationOptions {
    fn default() -> Self {
        Self {
            position: Position::TopRight,
            auto_close: AutoClose::KindDefault,
            hide_progress_bar: false,
            close_on_click: true,
            pause_on_hover: true,
            draggable: true,
        }
    }
}

/// A queued notification
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: u64,
    pub kind: NotificationKind,
    pub message: String,
    pub position: Position,
    /// `None` when the notification never auto-dismisses
    pub auto_close: Option<Duration>,
    pub hide_progress_bar: bool,
    pub close_on_click: bool,
    pub pause_on_hover: bool,
    pub draggable: bool,
    created_at: Instant,
    paused_at: Option<Instant>,
    paused_for: Duration,
}

impl Notification {
    /// Time the notification has counted toward its timeout
    fn elapsed(&self, now: Instant) -> Duration {
        let paused = match self.paused_at {
            Some(since) => self.paused_for + now.saturating_duration_since(since),
            None => self.paused_for,
        };
        now.saturating_duration_since(self.created_at)
            .saturating_sub(paused)
    }

    /// Time left before auto-dismiss
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.auto_close
            .map(|timeout| timeout.saturating_sub(self.elapsed(now)))
    }

    /// Whether the timeout has run out
    pub fn is_expired(&self, now: Instant) -> bool {
        self.remaining(now).map_or(false, |left| left.is_zero())
    }

    /// Fraction of the timeout still left, for the progress bar
    pub fn progress(&self, now: Instant) -> Option<f32> {
        if self.hide_progress_bar {
            return None;
        }
        let timeout = self.auto_close?;
        let left = self.remaining(now)?;
        Some(left.as_secs_f32() / timeout.as_secs_f32().max(f32::EPSILON))
    }

    /// Whether expiry is currently paused by hovering
    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }
}

/// A pending confirmation as shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationPrompt {
    pub id: u64,
    pub message: String,
}

type Callback = Box<dyn FnOnce() + Send>;

struct PendingConfirmation {
    id: u64,
    message: String,
    on_confirm: Callback,
    on_cancel: Callback,
}

#[derive(Default)]
struct Queue {
    next_id: u64,
    toasts: Vec<Notification>,
    confirmations: Vec<PendingConfirmation>,
}

impl Queue {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn prune(&mut self, now: Instant) {
        self.toasts.retain(|toast| !toast.is_expired(now));
    }
}

/// Shared notification queue.
///
/// Cloning hands out another handle to the same queue. Notifying is fire and
/// forget: nothing is returned to the caller.
#[derive(Clone, Default)]
pub struct NotificationService {
    queue: Arc<Mutex<Queue>>,
}

impl fmt::Debug for NotificationService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let queue = self.lock();
        f.debug_struct("NotificationService")
            .field("toasts", &queue.toasts.len())
            .field("confirmations", &queue.confirmations.len())
            .finish()
    }
}

impl NotificationService {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Queue> {
        // A panic while holding the lock cannot leave the queue inconsistent
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Enqueue a notification
    pub fn notify(&self, kind: NotificationKind, message: impl Into<String>, options: Option<NotificationOptions>) {
        let message = message.into();
        let options = options.unwrap_or_default();

        match kind {
            NotificationKind::Error => error!(notification = %kind, "{}", message),
            NotificationKind::Warning => warn!(notification = %kind, "{}", message),
            _ => info!(notification = %kind, "{}", message),
        }

        let auto_close = match options.auto_close {
            AutoClose::KindDefault => Some(kind.default_auto_close()),
            AutoClose::After(duration) => Some(duration),
            AutoClose::Never => None,
        };

        let mut queue = self.lock();
        let id = queue.allocate_id();
        queue.toasts.push(Notification {
            id,
            kind,
            message,
            position: options.position,
            auto_close,
            hide_progress_bar: options.hide_progress_bar,
            close_on_click: options.close_on_click,
            pause_on_hover: options.pause_on_hover,
            draggable: options.draggable,
            created_at: Instant::now(),
            paused_at: None,
            paused_for: Duration::ZERO,
        });
    }

    /// Success notification with default options
    pub fn success(&self, message: impl Into<String>) {
        self.notify(NotificationKind::Success, message, None);
    }

    /// Error notification with default options
    pub fn error(&self, message: impl Into<String>) {
        self.notify(NotificationKind::Error, message, None);
    }

    /// Info notification with default options
    pub fn info(&self, message: impl Into<String>) {
        self.notify(NotificationKind::Info, message, None);
    }

    /// Warning notification with default options
    pub fn warning(&self, message: impl Into<String>) {
        self.notify(NotificationKind::Warning, message, None);
    }

    /// Enqueue an interactive yes/no prompt.
    ///
    /// It never auto-dismisses; exactly one callback runs when it is resolved.
    pub fn confirm<C, X>(&self, message: impl Into<String>, on_confirm: C, on_cancel: X) -> u64
    where
        C: FnOnce() + Send + 'static,
        X: FnOnce() + Send + 'static,
    {
        let mut queue = self.lock();
        let id = queue.allocate_id();
        queue.confirmations.push(PendingConfirmation {
            id,
            message: message.into(),
            on_confirm: Box::new(on_confirm),
            on_cancel: Box::new(on_cancel),
        });
        id
    }

    /// Answer a pending confirmation. Returns false if `id` is not pending.
    pub fn resolve_confirmation(&self, id: u64, accepted: bool) -> bool {
        let pending = {
            let mut queue = self.lock();
            match queue.confirmations.iter().position(|c| c.id == id) {
                Some(index) => queue.confirmations.remove(index),
                None => return false,
            }
        };

        debug!("Confirmation {} resolved: {}", id, accepted);
        // Run outside the lock so callbacks may notify
        if accepted {
            (pending.on_confirm)();
        } else {
            (pending.on_cancel)();
        }
        true
    }

    /// Live notifications, oldest first
    pub fn active(&self, now: Instant) -> Vec<Notification> {
        let mut queue = self.lock();
        queue.prune(now);
        queue.toasts.clone()
    }

    /// Pending confirmations, oldest first
    pub fn confirmations(&self) -> Vec<ConfirmationPrompt> {
        self.lock()
            .confirmations
            .iter()
            .map(|c| ConfirmationPrompt {
                id: c.id,
                message: c.message.clone(),
            })
            .collect()
    }

    /// Remove a notification. Returns false if it was not queued.
    pub fn dismiss(&self, id: u64) -> bool {
        let mut queue = self.lock();
        let before = queue.toasts.len();
        queue.toasts.retain(|toast| toast.id != id);
        queue.toasts.len() != before
    }

    /// Drop every notification and pending confirmation without running callbacks
    pub fn dismiss_all(&self) {
        let mut queue = self.lock();
        queue.toasts.clear();
        queue.confirmations.clear();
    }

    /// Click on a notification: dismisses it when close-on-click is set
    pub fn click(&self, id: u64) -> bool {
        let closes = self
            .lock()
            .toasts
            .iter()
            .any(|toast| toast.id == id && toast.close_on_click);
        closes && self.dismiss(id)
    }

    /// Pointer enters or leaves a notification
    pub fn hover(&self, id: u64, hovering: bool, now: Instant) {
        let mut queue = self.lock();
        if let Some(toast) = queue.toasts.iter_mut().find(|t| t.id == id && t.pause_on_hover) {
            match (hovering, toast.paused_at) {
                (true, None) => toast.paused_at = Some(now),
                (false, Some(since)) => {
                    toast.paused_for += now.saturating_duration_since(since);
                    toast.paused_at = None;
                }
                _ => {}
            }
        }
    }
}
