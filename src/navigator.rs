use std::sync::{Mutex, PoisonError};

/// Consumer-provided navigation side effect.
///
/// Invoked when the session cannot be recovered and the user has to be sent
/// to the login entry point. A UI binds this to its router; a CLI might print
/// a hint and exit.
pub trait Navigator: Send + Sync + 'static {
    /// Navigate to `path` (e.g. `/login`).
    fn navigate(&self, path: &str);
}

/// Logs the navigation request and does nothing else.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNavigator;

impl Navigator for TracingNavigator {
    fn navigate(&self, path: &str) {
        tracing::info!(to = %path, "Navigation requested");
    }
}

/// Remembers every navigation request, in order.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visits: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn visits(&self) -> Vec<String> {
        self.visits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn last(&self) -> Option<String> {
        self.visits().pop()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        tracing::info!(to = %path, "Navigation requested");
        self.visits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_owned());
    }
}
