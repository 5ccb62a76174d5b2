//! Styled terminal output.
//!
//! Messages get an icon and, on a terminal, a color. Setting `NO_COLOR`
//! disables colors.

use console_common::{Alert, AlertLevel};
use std::io::IsTerminal;

fn colors_disabled() -> bool {
    std::env::var("NO_COLOR")
        .map(|v| !v.is_empty() && v != "0" && v.to_lowercase() != "false")
        .unwrap_or(false)
}

fn use_colors() -> bool {
    !colors_disabled() && std::io::stderr().is_terminal()
}

mod palette {
    pub const SUCCESS: &str = "\x1b[38;2;0;245;212m";
    pub const ERROR: &str = "\x1b[38;2;255;107;107m";
    pub const WARNING: &str = "\x1b[38;2;255;200;87m";
    pub const INFO: &str = "\x1b[38;2;72;202;228m";
    pub const DIM: &str = "\x1b[38;2;130;154;177m";
    pub const RESET: &str = "\x1b[0m";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Success,
    Error,
    Warning,
    Info,
    /// Neutral, dimmed text.
    Dim,
}

impl MessageType {
    fn icon(&self) -> &'static str {
        match self {
            MessageType::Success => "[OK]",
            MessageType::Error => "[ERROR]",
            MessageType::Warning => "[WARN]",
            MessageType::Info => "[INFO]",
            MessageType::Dim => "-",
        }
    }

    fn color(&self) -> &'static str {
        match self {
            MessageType::Success => palette::SUCCESS,
            MessageType::Error => palette::ERROR,
            MessageType::Warning => palette::WARNING,
            MessageType::Info => palette::INFO,
            MessageType::Dim => palette::DIM,
        }
    }
}

impl From<AlertLevel> for MessageType {
    fn from(level: AlertLevel) -> Self {
        match level {
            AlertLevel::Success => MessageType::Success,
            AlertLevel::Info => MessageType::Info,
            AlertLevel::Warning => MessageType::Warning,
            AlertLevel::Error => MessageType::Error,
        }
    }
}

fn format_styled(msg_type: MessageType, message: &str) -> String {
    if use_colors() {
        format!(
            "{}{} {}{}",
            msg_type.color(),
            msg_type.icon(),
            message,
            palette::RESET
        )
    } else {
        format!("{} {}", msg_type.icon(), message)
    }
}

/// Print a success message to stderr.
pub fn print_success(message: &str) {
    eprintln!("{}", format_styled(MessageType::Success, message));
}

/// Print an error message to stderr.
pub fn print_error(message: &str) {
    eprintln!("{}", format_styled(MessageType::Error, message));
}

/// Print a warning message to stderr.
pub fn print_warning(message: &str) {
    eprintln!("{}", format_styled(MessageType::Warning, message));
}

/// Print an info message to stderr.
pub fn print_info(message: &str) {
    eprintln!("{}", format_styled(MessageType::Info, message));
}

pub fn print_dim(message: &str) {
    eprintln!("{}", format_styled(MessageType::Dim, message));
}

pub fn format_success(message: &str) -> String {
    format_styled(MessageType::Success, message)
}

pub fn format_warning(message: &str) -> String {
    format_styled(MessageType::Warning, message)
}

pub fn format_error(message: &str) -> String {
    format_styled(MessageType::Error, message)
}

/// An alert as one line: icon, headline and description.
pub fn format_alert(alert: &Alert) -> String {
    format_styled(
        MessageType::from(alert.level),
        &format!("{}: {}", alert.message, alert.description),
    )
}

/// Colored label without an icon, for inline use.
pub fn styled_label(msg_type: MessageType, label: &str) -> String {
    if use_colors() {
        format!("{}{}{}", msg_type.color(), label, palette::RESET)
    } else {
        label.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_message_type_icons() {
        assert_eq!(MessageType::Success.icon(), "[OK]");
        assert_eq!(MessageType::Error.icon(), "[ERROR]");
        assert_eq!(MessageType::Warning.icon(), "[WARN]");
        assert_eq!(MessageType::Info.icon(), "[INFO]");
        assert_eq!(MessageType::Dim.icon(), "-");
    }

    #[test]
    #[serial]
    fn test_format_alert_no_color() {
        // SAFETY: serial test, the variable is restored right after.
        unsafe { std::env::set_var("NO_COLOR", "1") };
        let line = format_alert(&Alert::warning(
            "Not allowed",
            "Second factors need a first factor in an earlier step.",
        ));
        unsafe { std::env::remove_var("NO_COLOR") };

        assert_eq!(
            line,
            "[WARN] Not allowed: Second factors need a first factor in an earlier step."
        );
    }

    #[test]
    #[serial]
    fn test_colors_disabled() {
        // SAFETY: serial test, the variable is restored right after.
        unsafe { std::env::set_var("NO_COLOR", "true") };
        assert!(colors_disabled());
        unsafe { std::env::set_var("NO_COLOR", "0") };
        assert!(!colors_disabled());
        unsafe { std::env::set_var("NO_COLOR", "") };
        assert!(!colors_disabled());
        unsafe { std::env::remove_var("NO_COLOR") };
    }
}
