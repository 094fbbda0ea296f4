mod command;
pub mod controller;
pub mod diagnostics;
pub mod state;

pub use controller::{
    ScanController, ScannerOptions, ScannerParts, REACQUIRE_DELAY, SETTLE_DELAY, STARTUP_DELAY,
};
pub use diagnostics::{diagnostic_message, stream_lost_message, Locale};
pub use state::{ScanSession, ScanStatus};
