//! User-facing progress and warning notices.
//!
//! The engine never waits on a notifier; notices are fire-and-forget.

use std::fmt;
use tracing::{error, info, warn};

/// A notice emitted while a bank is loaded, saved or converted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// An existing bank is being read.
    Loading,
    /// No bank was found; a new one is being created.
    Creating,
    /// The bank is being written.
    Saving,
    /// A legacy bank file is being converted.
    Converting,
    /// A backup snapshot is being written.
    BackingUp,
    /// The bank is being resized.
    Resizing,
    /// The bank file was unreadable and has been replaced by an empty bank.
    Corrupt,
    /// The legacy file could not be read; conversion was skipped.
    ConvertFailed {
        /// Underlying error.
        reason: String,
    },
    /// The bank file could not be written.
    SaveFailed {
        /// Underlying error.
        reason: String,
    },
    /// The box name sidecar could not be written.
    NamesSaveFailed {
        /// Underlying error.
        reason: String,
    },
}

impl Notice {
    /// Whether the notice reports a problem rather than progress.
    #[must_use]
    pub fn is_problem(&self) -> bool {
        matches!(
            self,
            Self::Corrupt
                | Self::ConvertFailed { .. }
                | Self::SaveFailed { .. }
                | Self::NamesSaveFailed { .. }
        )
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading => f.write_str("Loading bank..."),
            Self::Creating => f.write_str("Creating bank..."),
            Self::Saving => f.write_str("Saving bank..."),
            Self::Converting => f.write_str("Converting legacy bank..."),
            Self::BackingUp => f.write_str("Backing up bank..."),
            Self::Resizing => f.write_str("Resizing bank..."),
            Self::Corrupt => f.write_str("Bank is corrupt; a new one was created"),
            Self::ConvertFailed { reason } => write!(f, "Could not convert legacy bank: {reason}"),
            Self::SaveFailed { reason } => write!(f, "Could not save bank: {reason}"),
            Self::NamesSaveFailed { reason } => write!(f, "Could not save box names: {reason}"),
        }
    }
}

/// Receives notices from the engine.
pub trait Notifier: Send + Sync {
    /// Handles a notice.
    fn notify(&self, notice: Notice);
}

/// Discards every notice.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _notice: Notice) {}
}

/// Forwards notices to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match &notice {
            Notice::Corrupt | Notice::ConvertFailed { .. } => warn!("{notice}"),
            Notice::SaveFailed { .. } | Notice::NamesSaveFailed { .. } => error!("{notice}"),
            _ => info!("{notice}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn problems_are_flagged() {
        assert!(Notice::Corrupt.is_problem());
        assert!(Notice::SaveFailed {
            reason: "disk full".into()
        }
        .is_problem());
        assert!(!Notice::Saving.is_problem());
    }

    #[test]
    fn display_includes_reason() {
        let notice = Notice::NamesSaveFailed {
            reason: "read-only".into(),
        };
        assert_eq!(notice.to_string(), "Could not save box names: read-only");
    }

    #[test]
    fn notifiers_accept_everything() {
        NullNotifier.notify(Notice::Loading);
        TracingNotifier.notify(Notice::Corrupt);
    }
}
