//! The boundary towards the host application.
//!
//! The host only ever receives confirmed payloads and diagnostic strings by
//! value. What it does with them (inventory lookups, sell/move/edit flows,
//! showing a retry button) is outside this crate.

#[cfg(feature = "chime")]
pub mod chime;

use crate::scanner::ScanSession;

const ENABLE_LOGS: bool = true;

use crate::log_info;

pub trait HostEvents: Send + Sync + 'static {
    /// Fired exactly once per confirmed scan.
    fn on_scan(&self, payload: String);

    /// Fired when the session enters the error state.
    fn on_error(&self, message: String);

    fn on_state_changed(&self, _session: &ScanSession) {}
}

/// Audible or haptic cue after a confirmed scan.
pub trait Acknowledger: Send + Sync + 'static {
    fn acknowledge(&self);
}

/// Acknowledges by logging only, for hosts without audio output.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAcknowledger;

impl Acknowledger for LogAcknowledger {
    fn acknowledge(&self) {
        log_info!("scan acknowledged");
    }
}

#[cfg(feature = "chime")]
pub use chime::ChimeAcknowledger;
