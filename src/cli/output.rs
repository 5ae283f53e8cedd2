//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use std::fmt::Display;

use colored::Colorize;

use crate::domain::DiffAction;

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: impl Display) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print warning (yellow "Warning:" prefix) to stderr
pub fn warning(msg: impl Display) {
    eprintln!("{}: {}", "Warning".yellow(), msg);
}

/// Print success status (green checkmark)
pub fn success(msg: impl Display) {
    println!("{} {}", "✓".green(), msg);
}

/// Print completed action (green label)
pub fn action(label: &str, msg: impl Display) {
    println!("{}: {}", label.green(), msg);
}

/// Print section header (cyan bold)
pub fn header(msg: impl Display) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Print indented detail (no color)
pub fn detail(msg: impl Display) {
    println!("  {}", msg);
}

/// Print plain output (no color)
pub fn info(msg: impl Display) {
    println!("{}", msg);
}

/// Print one diff action, colored by kind
pub fn action_line(action: &DiffAction) {
    let marker = match action {
        DiffAction::UpdateItem { .. } => "~".yellow(),
        DiffAction::RemoveItems { .. } => "-".red(),
        DiffAction::InsertItems { .. } => "+".green(),
    };
    println!("  {} {}", marker, action);
}
