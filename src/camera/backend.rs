use std::sync::Arc;

use async_trait::async_trait;

use super::{
    CameraAcquisitionError, CameraCapability, CameraDevice, DeviceEnumerationError, Frame,
    StreamRequest,
};

/// Shared handle to an open camera stream.
///
/// The negotiator owns the stream's lifetime; the decode loop only holds a
/// clone for reading frames.
pub type StreamHandle = Arc<dyn VideoStream>;

/// Platform access to cameras.
#[async_trait]
pub trait CameraBackend: Send + Sync + 'static {
    async fn enumerate_devices(&self) -> Result<Vec<CameraDevice>, DeviceEnumerationError>;

    async fn open_stream(
        &self,
        request: &StreamRequest,
    ) -> Result<StreamHandle, CameraAcquisitionError>;
}

/// A live capture stream.
#[async_trait]
pub trait VideoStream: Send + Sync {
    /// Opaque identifier, stable for the lifetime of the stream.
    fn id(&self) -> &str;

    /// Wait for the next frame. `None` once the stream has ended.
    async fn next_frame(&self) -> Option<Frame>;

    /// What the active track advertises. `continuous_focus_enabled` is
    /// always false here; the negotiator fills it in.
    fn capabilities(&self) -> CameraCapability;

    async fn enable_continuous_focus(&self) -> anyhow::Result<()>;

    /// Release the device. Must be idempotent.
    fn stop(&self);

    fn is_live(&self) -> bool;
}
