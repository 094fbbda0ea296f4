//! Barcode and QR scan sessions: camera negotiation, frame decoding,
//! read confirmation and the lifecycle that ties them together.

pub mod camera;
pub mod confirm;
pub mod decoder;
pub mod host;
pub mod scanner;
pub mod settings;
pub mod utils;

#[cfg(feature = "desktop")]
mod desktop;
#[cfg(test)]
mod testing;

pub use camera::{CameraAcquisitionError, CameraBackend, ErrorReason, VideoStream};
pub use confirm::{ConfirmationFilter, REQUIRED_READS};
pub use decoder::{DecodeEngine, QrEngine};
pub use host::{Acknowledger, HostEvents, LogAcknowledger};
pub use scanner::{ScanController, ScanSession, ScanStatus, ScannerOptions, ScannerParts};
pub use settings::{ScannerSettings, SettingsStore};

#[cfg(feature = "desktop")]
pub use desktop::run;
