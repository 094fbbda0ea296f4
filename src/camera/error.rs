use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a camera stream could not be acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorReason {
    PermissionDenied,
    NotFound,
    DeviceBusy,
    Overconstrained,
    InsecureContext,
    Unknown,
}

impl ErrorReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorReason::PermissionDenied => "PermissionDenied",
            ErrorReason::NotFound => "NotFound",
            ErrorReason::DeviceBusy => "DeviceBusy",
            ErrorReason::Overconstrained => "Overconstrained",
            ErrorReason::InsecureContext => "InsecureContext",
            ErrorReason::Unknown => "Unknown",
        }
    }

    /// Map a platform error name and message onto a reason.
    ///
    /// The name is checked first (`NotAllowedError`, `NotReadableError`, ...),
    /// then the free-text message. Anything unrecognized is `Unknown`.
    pub fn classify(name: &str, message: &str) -> Self {
        let name = name.trim();
        match name {
            "NotAllowedError" | "PermissionDeniedError" => return ErrorReason::PermissionDenied,
            "NotFoundError" | "DevicesNotFoundError" => return ErrorReason::NotFound,
            "NotReadableError" | "TrackStartError" | "AbortError" => {
                return ErrorReason::DeviceBusy
            }
            "OverconstrainedError" | "ConstraintNotSatisfiedError" => {
                return ErrorReason::Overconstrained
            }
            "SecurityError" => return ErrorReason::InsecureContext,
            _ => {}
        }

        let text = format!("{name} {message}").to_lowercase();
        let has = |needles: &[&str]| needles.iter().any(|needle| text.contains(needle));

        if has(&["insecure", "https", "secure context"]) {
            ErrorReason::InsecureContext
        } else if has(&["permission", "not allowed", "denied", "unauthorized"]) {
            ErrorReason::PermissionDenied
        } else if has(&["overconstrained", "constraint"]) {
            ErrorReason::Overconstrained
        } else if has(&["busy", "in use", "not readable", "could not start"]) {
            ErrorReason::DeviceBusy
        } else if has(&["not found", "no camera", "no device", "requested device"]) {
            ErrorReason::NotFound
        } else {
            ErrorReason::Unknown
        }
    }
}

impl fmt::Display for ErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal failure of one acquisition attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("camera acquisition failed ({reason}): {detail}")]
pub struct CameraAcquisitionError {
    pub reason: ErrorReason,
    pub detail: String,
}

impl CameraAcquisitionError {
    pub fn new(reason: ErrorReason, detail: impl Into<String>) -> Self {
        Self {
            reason,
            detail: detail.into(),
        }
    }

    pub fn from_platform(name: &str, message: &str) -> Self {
        Self::new(ErrorReason::classify(name, message), format!("{name}: {message}"))
    }

    pub fn is_overconstrained(&self) -> bool {
        self.reason == ErrorReason::Overconstrained
    }
}

/// The platform refused to list devices. Never fatal on its own.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("camera enumeration failed: {0}")]
pub struct DeviceEnumerationError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_platform_error_names() {
        assert_eq!(
            ErrorReason::classify("NotAllowedError", "Permission denied"),
            ErrorReason::PermissionDenied
        );
        assert_eq!(
            ErrorReason::classify("NotReadableError", "Could not start video source"),
            ErrorReason::DeviceBusy
        );
        assert_eq!(
            ErrorReason::classify("DevicesNotFoundError", ""),
            ErrorReason::NotFound
        );
        assert_eq!(
            ErrorReason::classify("ConstraintNotSatisfiedError", ""),
            ErrorReason::Overconstrained
        );
        assert_eq!(
            ErrorReason::classify("SecurityError", ""),
            ErrorReason::InsecureContext
        );
    }

    #[test]
    fn classifies_free_text_messages() {
        assert_eq!(
            ErrorReason::classify("", "Camera access is only supported in secure context like https"),
            ErrorReason::InsecureContext
        );
        assert_eq!(
            ErrorReason::classify("Error", "device is busy"),
            ErrorReason::DeviceBusy
        );
        assert_eq!(
            ErrorReason::classify("Error", "Permission dismissed by user"),
            ErrorReason::PermissionDenied
        );
    }

    #[test]
    fn unknown_failures_fall_back() {
        let err = CameraAcquisitionError::from_platform("WeirdError", "something odd");
        assert_eq!(err.reason, ErrorReason::Unknown);
        assert!(err.to_string().contains("Unknown"));
    }
}
