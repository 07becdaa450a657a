//! User-facing notifications raised by punch and sync operations.

use crate::ui::messages::emit;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Info,
    Success,
    Warning,
    Error,
}

/// Each client operation reports at most one notice per outcome kind.
pub trait Notifier: Send + Sync {
    fn notify(&self, level: Notice, message: &str);
}

/// Prints notices with the CLI message styles.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, level: Notice, message: &str) {
        emit(level, message);
    }
}
