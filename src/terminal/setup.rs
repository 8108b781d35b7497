//! Terminal setup and teardown functions.
//!
//! Low-level helpers for entering and leaving TUI mode. `TerminalManager`
//! uses them, and the panic hook calls [`emergency_restore`] directly.

use crossterm::{
    cursor::Show,
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{disable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{self, Write};

/// Enter TUI mode.
///
/// This sets up the terminal for TUI operation:
/// - Enters alternate screen (preserves original terminal content)
/// - Enables bracketed paste, so a pasted JSON payload arrives as one event
///
/// # Arguments
///
/// * `writer` - The output writer (typically stdout)
///
/// # Errors
///
/// Returns an error if any terminal commands fail.
pub fn enter_tui_mode<W: Write>(writer: &mut W) -> io::Result<()> {
    execute!(writer, EnterAlternateScreen, EnableBracketedPaste)
}

/// Leave TUI mode and restore terminal to normal state.
///
/// Raw mode is disabled first, then bracketed paste, then the alternate
/// screen is left and the cursor shown again. Errors are ignored and the
/// function may be called more than once.
///
/// # Arguments
///
/// * `writer` - The output writer (typically stdout)
pub fn leave_tui_mode<W: Write>(writer: &mut W) {
    let _ = disable_raw_mode();
    let _ = execute!(writer, DisableBracketedPaste, LeaveAlternateScreen);
    let _ = writer.flush();
    let _ = execute!(writer, Show);
}

/// Restore the terminal to a usable state after a panic or error.
///
/// Same steps as [`leave_tui_mode`], written to stdout.
pub fn emergency_restore() {
    leave_tui_mode(&mut io::stdout());
}
