// User-facing feedback: the page's message box and floating toasts.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::config::NotificationConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

impl NoticeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeKind::Success => "success",
            NoticeKind::Error => "error",
            NoticeKind::Info => "info",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub display: Duration,
    pub exit: Duration,
}

impl From<&NotificationConfig> for Timings {
    fn from(config: &NotificationConfig) -> Self {
        Self {
            display: config.display(),
            exit: config.exit(),
        }
    }
}

impl Default for Timings {
    fn default() -> Self {
        Self::from(&NotificationConfig::default())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// -- Message box --

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub kind: NoticeKind,
}

impl Message {
    /// CSS classes of the message element.
    pub fn class(&self) -> String {
        format!("message {}", self.kind.as_str())
    }
}

#[derive(Debug, Default)]
struct MessageState {
    current: Option<Message>,
    generation: u64,
}

/// The persistent `#message` element of a form page.
///
/// Success messages hide themselves after the display delay; errors stay
/// until replaced.
#[derive(Clone, Default)]
pub struct MessageBox {
    state: Arc<Mutex<MessageState>>,
    timings: Timings,
}

impl MessageBox {
    pub fn new(timings: Timings) -> Self {
        Self {
            state: Arc::default(),
            timings,
        }
    }

    /// Must be called from within a tokio runtime.
    pub fn show(&self, text: impl Into<String>, kind: NoticeKind) {
        let text = text.into();
        tracing::info!("Message ({}): {}", kind.as_str(), text);

        let generation = {
            let mut state = lock(&self.state);
            state.generation += 1;
            state.current = Some(Message { text, kind });
            state.generation
        };

        if kind == NoticeKind::Success {
            let state = self.state.clone();
            let delay = self.timings.display;
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                let mut state = lock(&state);
                // A newer message owns the box now.
                if state.generation == generation {
                    state.current = None;
                }
            });
        }
    }

    /// The visible message, if any.
    pub fn current(&self) -> Option<Message> {
        lock(&self.state).current.clone()
    }
}

// -- Toasts --

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub kind: NoticeKind,
    /// Playing its exit animation.
    pub leaving: bool,
}

impl Toast {
    pub fn class(&self) -> String {
        format!("notification {}", self.kind.as_str())
    }
}

#[derive(Debug, Default)]
struct ToastState {
    next_id: u64,
    items: Vec<Toast>,
}

/// Floating notifications. They stack without queuing and each one removes
/// itself after `display + exit`.
#[derive(Clone, Default)]
pub struct Toasts {
    state: Arc<Mutex<ToastState>>,
    timings: Timings,
}

impl Toasts {
    pub fn new(timings: Timings) -> Self {
        Self {
            state: Arc::default(),
            timings,
        }
    }

    /// Must be called from within a tokio runtime.
    pub fn push(&self, message: impl Into<String>, kind: NoticeKind) -> u64 {
        let message = message.into();
        tracing::info!("Notification ({}): {}", kind.as_str(), message);

        let id = {
            let mut state = lock(&self.state);
            state.next_id += 1;
            let id = state.next_id;
            state.items.push(Toast {
                id,
                message,
                kind,
                leaving: false,
            });
            id
        };

        let state = self.state.clone();
        let Timings { display, exit } = self.timings;
        tokio::spawn(async move {
            tokio::time::sleep(display).await;
            if let Some(toast) = lock(&state).items.iter_mut().find(|t| t.id == id) {
                toast.leaving = true;
            }
            tokio::time::sleep(exit).await;
            lock(&state).items.retain(|t| t.id != id);
        });

        id
    }

    pub fn snapshot(&self) -> Vec<Toast> {
        lock(&self.state).items.clone()
    }

    pub fn last(&self) -> Option<Toast> {
        lock(&self.state).items.last().cloned()
    }
}
