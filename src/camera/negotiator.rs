use std::sync::Arc;

use tokio::sync::Mutex;

use super::{
    CameraAcquisitionError, CameraBackend, CameraCapability, CameraDevice, CameraSelection,
    DeviceEnumerationError, FacingMode, StreamHandle, StreamProfile, StreamRequest,
};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

/// Lowercase fragments that mark a rear-facing camera in device labels,
/// including the localized variants browsers and drivers commonly report.
const REAR_LABEL_HINTS: &[&str] = &[
    "back",
    "rear",
    "environment",
    "trasera",
    "trasero",
    "traseira",
    "arrière",
    "arriere",
    "rück",
    "posteriore",
    "achter",
    "tylny",
    "задн",
    "背面",
    "後置",
    "后置",
    "후면",
    "camera sau",
];

pub fn is_rear_label(label: &str) -> bool {
    let lower = label.to_lowercase();
    REAR_LABEL_HINTS.iter().any(|hint| lower.contains(hint))
}

/// Label match, then the only device, then a generic environment request.
pub fn select_camera(devices: &[CameraDevice]) -> CameraSelection {
    if let Some(rear) = devices.iter().find(|device| is_rear_label(&device.label)) {
        return CameraSelection::Device(rear.id.clone());
    }

    match devices {
        [only] => CameraSelection::Device(only.id.clone()),
        _ => CameraSelection::Facing(FacingMode::Environment),
    }
}

/// Owns the single live camera stream of a scan session.
#[derive(Clone)]
pub struct DeviceNegotiator {
    backend: Arc<dyn CameraBackend>,
    current: Arc<Mutex<Option<StreamHandle>>>,
    /// Serializes acquisitions; `current` is never held across an open.
    acquire_lock: Arc<Mutex<()>>,
}

impl DeviceNegotiator {
    pub fn new(backend: Arc<dyn CameraBackend>) -> Self {
        Self {
            backend,
            current: Arc::new(Mutex::new(None)),
            acquire_lock: Arc::new(Mutex::new(())),
        }
    }

    pub async fn list_cameras(&self) -> Result<Vec<CameraDevice>, DeviceEnumerationError> {
        self.backend.enumerate_devices().await
    }

    /// Enumerate and pick a camera. Enumeration failure is not fatal and
    /// degrades to the environment-facing request.
    pub async fn plan_request(&self, profile: StreamProfile) -> StreamRequest {
        let selection = match self.list_cameras().await {
            Ok(devices) => {
                log_debug!("found {} camera(s)", devices.len());
                select_camera(&devices)
            }
            Err(err) => {
                log_warn!("{err}; falling back to environment-facing request");
                CameraSelection::Facing(FacingMode::Environment)
            }
        };
        StreamRequest::new(selection, profile)
    }

    /// Open a stream for `request`, tearing down any stream held before.
    pub async fn acquire_stream(
        &self,
        request: &StreamRequest,
    ) -> Result<StreamHandle, CameraAcquisitionError> {
        let _serial = self.acquire_lock.lock().await;
        self.release().await;

        let stream = self.backend.open_stream(request).await?;
        log_info!(
            "camera stream {} opened ({:?}, {:?})",
            stream.id(),
            request.selection,
            request.profile
        );

        let mut current = self.current.lock().await;
        if let Some(previous) = current.replace(Arc::clone(&stream)) {
            log_warn!("replacing stream {} opened concurrently", previous.id());
            previous.stop();
        }
        Ok(stream)
    }

    /// Best-effort continuous autofocus. Never fails.
    pub async fn negotiate_capabilities(&self, stream: &StreamHandle) -> CameraCapability {
        let mut capability = stream.capabilities();
        if capability.continuous_focus_supported {
            match stream.enable_continuous_focus().await {
                Ok(()) => capability.continuous_focus_enabled = true,
                Err(err) => log_debug!("continuous autofocus not applied: {err:#}"),
            }
        }
        capability
    }

    /// Stop and forget the held stream, if any.
    pub async fn release(&self) {
        if let Some(stream) = self.current.lock().await.take() {
            log_info!("releasing camera stream {}", stream.id());
            stream.stop();
        }
    }

    /// Stop `stream` and forget it if it is still the held one.
    pub async fn release_stream(&self, stream: &StreamHandle) {
        stream.stop();
        let mut current = self.current.lock().await;
        if current
            .as_ref()
            .is_some_and(|held| Arc::ptr_eq(held, stream))
        {
            current.take();
        }
    }

    pub async fn has_stream(&self) -> bool {
        self.current.lock().await.is_some()
    }
}
