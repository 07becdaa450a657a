//! Styled one-line messages for the terminal.

use crate::ui::notifier::Notice;
use std::fmt;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

/// Color and icon for each notice level.
fn style(level: Notice) -> (&'static str, &'static str) {
    match level {
        Notice::Info => ("\x1b[34m", "ℹ️"),
        Notice::Success => ("\x1b[32m", "✅"),
        Notice::Warning => ("\x1b[33m", "⚠️"),
        Notice::Error => ("\x1b[31m", "❌"),
    }
}

/// Errors go to stderr, everything else to stdout.
pub fn emit<T: fmt::Display>(level: Notice, msg: T) {
    let (color, icon) = style(level);
    let line = format!("{}{}{} {}{}", color, BOLD, icon, RESET, msg);
    if level == Notice::Error {
        eprintln!("{}", line);
    } else {
        println!("{}", line);
    }
}

pub fn info<T: fmt::Display>(msg: T) {
    emit(Notice::Info, msg);
}

pub fn success<T: fmt::Display>(msg: T) {
    emit(Notice::Success, msg);
}

pub fn warning<T: fmt::Display>(msg: T) {
    emit(Notice::Warning, msg);
}
