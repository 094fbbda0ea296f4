//! Device negotiation: finding a camera, opening exactly one stream for the
//! session, and enabling what the track supports.

pub mod backend;
pub mod error;
pub mod frame;
pub mod negotiator;
#[cfg(feature = "native-camera")]
pub mod nokhwa_backend;
pub mod types;

pub use backend::{CameraBackend, StreamHandle, VideoStream};
pub use error::{CameraAcquisitionError, DeviceEnumerationError, ErrorReason};
pub use frame::Frame;
pub use negotiator::{is_rear_label, select_camera, DeviceNegotiator};
#[cfg(feature = "native-camera")]
pub use nokhwa_backend::NokhwaBackend;
pub use types::{
    CameraCapability, CameraDevice, CameraSelection, FacingMode, StreamProfile, StreamRequest,
};
