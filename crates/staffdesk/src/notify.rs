//! Transient success and failure messages.
//!
//! The surface holds at most one notification. Showing a new one replaces
//! the previous message; it disappears after the configured auto-hide delay
//! or when dismissed.

use std::time::{Duration, Instant};

/// Default time a notification stays visible.
pub const DEFAULT_AUTO_HIDE: Duration = Duration::from_millis(6000);

/// How a notification should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// An action completed.
    Success,
    /// Something needs attention but nothing failed.
    Warning,
    /// An action failed.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl Severity {
    /// Check whether the message reports a problem rather than a success.
    #[must_use]
    pub fn is_problem(self) -> bool {
        matches!(self, Self::Warning | Self::Error)
    }
}

/// A single message on the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Presentation level.
    pub severity: Severity,
    /// Message text.
    pub message: String,
    /// When the message was shown.
    pub shown_at: Instant,
}

/// Holder of the currently shown notification.
#[derive(Debug, Clone)]
pub struct NotificationSurface {
    current: Option<Notification>,
    auto_hide: Duration,
}

impl Default for NotificationSurface {
    fn default() -> Self {
        Self::new(DEFAULT_AUTO_HIDE)
    }
}

impl NotificationSurface {
    /// Create an empty surface with the given auto-hide delay.
    #[must_use]
    pub fn new(auto_hide: Duration) -> Self {
        Self {
            current: None,
            auto_hide,
        }
    }

    /// Show a message, replacing any previous one.
    pub fn show(&mut self, severity: Severity, message: impl Into<String>) {
        self.current = Some(Notification {
            severity,
            message: message.into(),
            shown_at: Instant::now(),
        });
    }

    /// Show a success message.
    pub fn success(&mut self, message: impl Into<String>) {
        self.show(Severity::Success, message);
    }

    /// Show a failure message.
    pub fn error(&mut self, message: impl Into<String>) {
        self.show(Severity::Error, message);
    }

    /// Show a warning.
    pub fn warning(&mut self, message: impl Into<String>) {
        self.show(Severity::Warning, message);
    }

    /// Remove the current message.
    pub fn dismiss(&mut self) {
        self.current = None;
    }

    /// The auto-hide delay.
    #[must_use]
    pub fn auto_hide(&self) -> Duration {
        self.auto_hide
    }

    /// The message visible right now, if any.
    #[must_use]
    pub fn current(&self) -> Option<&Notification> {
        self.visible_at(Instant::now())
    }

    /// The message visible at `now`, if any.
    #[must_use]
    pub fn visible_at(&self, now: Instant) -> Option<&Notification> {
        self.current
            .as_ref()
            .filter(|n| now.saturating_duration_since(n.shown_at) < self.auto_hide)
    }

    /// The most recent message regardless of auto-hide.
    #[must_use]
    pub fn latest(&self) -> Option<&Notification> {
        self.current.as_ref()
    }
}
