use serde::{Deserialize, Serialize};

use crate::camera::ErrorReason;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Locale {
    En,
    Vi,
}

impl Default for Locale {
    fn default() -> Self {
        Locale::En
    }
}

/// User-facing text for a failed acquisition: what went wrong and what to do.
pub fn diagnostic_message(reason: ErrorReason, locale: Locale) -> &'static str {
    match (locale, reason) {
        (Locale::En, ErrorReason::PermissionDenied) => {
            "Camera permission was denied. Allow camera access for this app in the browser or system settings, then tap Retry."
        }
        (Locale::En, ErrorReason::NotFound) => {
            "No camera was found on this device. Connect a camera and tap Retry."
        }
        (Locale::En, ErrorReason::DeviceBusy) => {
            "The camera is being used by another application. Close other apps that use the camera, then tap Retry."
        }
        (Locale::En, ErrorReason::Overconstrained) => {
            "The camera does not support the requested settings. Tap Retry to try again."
        }
        (Locale::En, ErrorReason::InsecureContext) => {
            "Camera access requires a secure connection (HTTPS). Open the app over HTTPS and tap Retry."
        }
        (Locale::En, ErrorReason::Unknown) => {
            "The camera could not be started. Tap Retry to try again."
        }
        (Locale::Vi, ErrorReason::PermissionDenied) => {
            "Quyền truy cập camera đã bị từ chối. Hãy cho phép ứng dụng dùng camera trong cài đặt trình duyệt hoặc hệ thống, sau đó nhấn Thử lại."
        }
        (Locale::Vi, ErrorReason::NotFound) => {
            "Không tìm thấy camera trên thiết bị này. Hãy kết nối camera rồi nhấn Thử lại."
        }
        (Locale::Vi, ErrorReason::DeviceBusy) => {
            "Camera đang được một ứng dụng khác sử dụng. Hãy đóng các ứng dụng đang dùng camera, sau đó nhấn Thử lại."
        }
        (Locale::Vi, ErrorReason::Overconstrained) => {
            "Camera không hỗ trợ cấu hình được yêu cầu. Nhấn Thử lại để thử lần nữa."
        }
        (Locale::Vi, ErrorReason::InsecureContext) => {
            "Truy cập camera cần kết nối bảo mật (HTTPS). Hãy mở ứng dụng qua HTTPS rồi nhấn Thử lại."
        }
        (Locale::Vi, ErrorReason::Unknown) => {
            "Không thể khởi động camera. Nhấn Thử lại để thử lần nữa."
        }
    }
}

/// Shown when a running camera stops delivering frames, e.g. it was unplugged.
pub fn stream_lost_message(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "The camera stopped sending video. Check that it is still connected, then tap Retry.",
        Locale::Vi => "Camera đã ngừng gửi hình ảnh. Hãy kiểm tra kết nối camera rồi nhấn Thử lại.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraAcquisitionError;

    const REASONS: [ErrorReason; 6] = [
        ErrorReason::PermissionDenied,
        ErrorReason::NotFound,
        ErrorReason::DeviceBusy,
        ErrorReason::Overconstrained,
        ErrorReason::InsecureContext,
        ErrorReason::Unknown,
    ];

    #[test]
    fn permission_failure_gets_permission_message() {
        let err = CameraAcquisitionError::from_platform("NotAllowedError", "Permission denied");
        let message = diagnostic_message(err.reason, Locale::En);
        assert!(message.contains("permission"));
    }

    #[test]
    fn busy_failure_gets_busy_message() {
        let err = CameraAcquisitionError::from_platform("NotReadableError", "Device in use");
        assert_eq!(err.reason, ErrorReason::DeviceBusy);
        let message = diagnostic_message(err.reason, Locale::En);
        assert!(message.contains("another application"));
    }

    #[test]
    fn unknown_failure_gets_generic_message() {
        let err = CameraAcquisitionError::from_platform("", "segfault in driver");
        assert_eq!(
            diagnostic_message(err.reason, Locale::Vi),
            "Không thể khởi động camera. Nhấn Thử lại để thử lần nữa."
        );
    }

    #[test]
    fn every_reason_has_distinct_text() {
        for locale in [Locale::En, Locale::Vi] {
            let mut messages: Vec<_> = REASONS
                .iter()
                .map(|reason| diagnostic_message(*reason, locale))
                .chain([stream_lost_message(locale)])
                .collect();
            messages.sort();
            messages.dedup();
            assert_eq!(messages.len(), REASONS.len() + 1);
        }
    }

    #[test]
    fn every_message_points_to_retry() {
        for reason in REASONS {
            assert!(diagnostic_message(reason, Locale::En).contains("Retry"));
            assert!(diagnostic_message(reason, Locale::Vi).contains("Thử lại"));
        }
        assert!(stream_lost_message(Locale::Vi).contains("Thử lại"));
    }
}
