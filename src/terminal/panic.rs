//! Panic hook for terminal restoration.
//!
//! Without this hook a panic inside the event loop leaves the terminal in raw
//! mode on the alternate screen, and the panic message is lost.

use super::setup::emergency_restore;
use std::panic;

/// Set up a panic hook that restores the terminal before printing panic info.
///
/// The previously installed hook (color-eyre's, in `main`) still runs after
/// the terminal is restored, so the report prints on the normal screen.
///
/// Call this before entering raw mode.
pub fn setup_panic_hook() {
    let original_hook = panic::take_hook();

    panic::set_hook(Box::new(move |panic_info| {
        emergency_restore();
        original_hook(panic_info);
    }));
}
