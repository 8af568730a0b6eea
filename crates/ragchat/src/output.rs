//! Colored terminal output utilities.

use console::{Style, Term};

/// Kind of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NotificationKind {
    Success,
    Error,
    Info,
    Warning,
}

impl NotificationKind {
    /// Background colour used by the web client for this kind.
    pub(crate) fn color_hex(self) -> &'static str {
        match self {
            Self::Success => "#2ed573",
            Self::Error => "#ff4757",
            Self::Info => "#10a37f",
            Self::Warning => "#ffa502",
        }
    }

    /// Terminal style for this kind.
    fn style(self) -> Style {
        match self {
            Self::Success => Style::new().green(),
            Self::Error => Style::new().red(),
            Self::Info => Style::new().cyan(),
            Self::Warning => Style::new().yellow(),
        }
    }
}

/// Terminal output formatter.
///
/// Notifications go to stderr, command results to stdout.
pub(crate) struct Output {
    term: Term,
    stdout: Term,
}

impl Output {
    /// Create a new output formatter.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            stdout: Term::stdout(),
        }
    }

    /// Print a notification styled by its kind.
    pub(crate) fn notify(&self, kind: NotificationKind, msg: &str) {
        let _ = self.term.write_line(&kind.style().apply_to(msg).to_string());
    }

    /// Print an info message.
    pub(crate) fn info(&self, msg: &str) {
        self.notify(NotificationKind::Info, msg);
    }

    /// Print a success message (green).
    pub(crate) fn success(&self, msg: &str) {
        self.notify(NotificationKind::Success, msg);
    }

    /// Print a warning message (yellow).
    pub(crate) fn warning(&self, msg: &str) {
        self.notify(NotificationKind::Warning, msg);
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        self.notify(NotificationKind::Error, msg);
    }

    /// Print a command result to stdout, unstyled.
    pub(crate) fn result(&self, text: &str) {
        let _ = self.stdout.write_line(text);
    }
}
