//! Ctrl+C handling.
//!
//! The console loop blocks in `read_line`, which the standard library
//! restarts after a signal. The first Ctrl+C therefore only raises a flag
//! that the loop checks between commands; a second one exits immediately.

use std::sync::atomic::{AtomicBool, Ordering};

/// Exit status used when a second Ctrl+C forces the process down.
pub const FORCED_EXIT_CODE: i32 = 130;

/// Global flag for handling Ctrl+C across the application
static CTRLC_RECEIVED: AtomicBool = AtomicBool::new(false);

/// The flag raised by the Ctrl+C handler.
pub fn interrupt_flag() -> &'static AtomicBool {
    &CTRLC_RECEIVED
}

/// Set up the Ctrl+C handler.
///
/// This should be called once at program startup.
pub fn setup_ctrlc_handler() -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || {
        if CTRLC_RECEIVED.swap(true, Ordering::SeqCst) {
            eprintln!("\nForced exit");
            std::process::exit(FORCED_EXIT_CODE);
        }
        eprintln!("\nReceived Ctrl+C, press Enter to finish (Ctrl+C again to force quit)");
    })
}
