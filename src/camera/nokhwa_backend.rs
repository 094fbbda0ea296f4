//! Native cameras through nokhwa.
//!
//! Each stream owns a capture thread that holds the `Camera`, converts frames
//! to luma and publishes the latest one on a watch channel. Only the newest
//! frame is kept; the decoder samples at its own rate.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    ApiBackend, CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType,
    Resolution,
};
use nokhwa::{Camera, NokhwaError};
use tokio::sync::{oneshot, watch, Mutex};

use super::{
    CameraAcquisitionError, CameraBackend, CameraCapability, CameraDevice, CameraSelection,
    DeviceEnumerationError, ErrorReason, Frame, StreamHandle, StreamRequest, VideoStream,
};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

const PREFERRED_FRAME_RATE: u32 = 30;
const FRAME_ERROR_BACKOFF: Duration = Duration::from_millis(100);

#[derive(Debug, Default, Clone, Copy)]
pub struct NokhwaBackend;

impl NokhwaBackend {
    pub fn new() -> Self {
        Self
    }
}

fn acquisition_error(err: &NokhwaError) -> CameraAcquisitionError {
    CameraAcquisitionError::from_platform("nokhwa", &err.to_string())
}

/// Device ids are the stringified nokhwa index.
fn camera_index(selection: &CameraSelection) -> CameraIndex {
    match selection {
        CameraSelection::Device(id) => match id.parse::<u32>() {
            Ok(index) => CameraIndex::Index(index),
            Err(_) => CameraIndex::String(id.clone()),
        },
        // Desktop drivers expose no facing; the first device stands in.
        CameraSelection::Facing(_) => CameraIndex::Index(0),
    }
}

fn requested_format(request: &StreamRequest) -> RequestedFormat<'static> {
    let format_type = match request.ideal_resolution() {
        Some((width, height)) => RequestedFormatType::Closest(CameraFormat::new(
            Resolution::new(width, height),
            FrameFormat::MJPEG,
            PREFERRED_FRAME_RATE,
        )),
        None => RequestedFormatType::None,
    };
    RequestedFormat::new::<RgbFormat>(format_type)
}

#[async_trait]
impl CameraBackend for NokhwaBackend {
    async fn enumerate_devices(&self) -> Result<Vec<CameraDevice>, DeviceEnumerationError> {
        let infos = tokio::task::spawn_blocking(|| nokhwa::query(ApiBackend::Auto))
            .await
            .map_err(|err| DeviceEnumerationError(err.to_string()))?
            .map_err(|err| DeviceEnumerationError(err.to_string()))?;

        Ok(infos
            .into_iter()
            .map(|info| CameraDevice::new(info.index().to_string(), info.human_name()))
            .collect())
    }

    async fn open_stream(
        &self,
        request: &StreamRequest,
    ) -> Result<StreamHandle, CameraAcquisitionError> {
        let index = camera_index(&request.selection);
        let requested = requested_format(request);
        let (ready_tx, ready_rx) = oneshot::channel();
        let (frame_tx, frame_rx) = watch::channel(None);
        let live = Arc::new(AtomicBool::new(true));

        let thread_live = Arc::clone(&live);
        thread::Builder::new()
            .name("camera-capture".into())
            .spawn(move || capture_loop(index, requested, thread_live, ready_tx, frame_tx))
            .map_err(|err| CameraAcquisitionError::new(ErrorReason::Unknown, err.to_string()))?;

        let id = ready_rx.await.map_err(|_| {
            CameraAcquisitionError::new(
                ErrorReason::Unknown,
                "capture thread exited before the camera opened",
            )
        })??;

        Ok(Arc::new(NokhwaStream {
            id,
            live,
            frames: Mutex::new(frame_rx),
        }))
    }
}

fn capture_loop(
    index: CameraIndex,
    requested: RequestedFormat<'static>,
    live: Arc<AtomicBool>,
    ready_tx: oneshot::Sender<Result<String, CameraAcquisitionError>>,
    frame_tx: watch::Sender<Option<Frame>>,
) {
    let opened = Camera::new(index, requested).and_then(|mut camera| {
        camera.open_stream()?;
        Ok(camera)
    });
    let mut camera = match opened {
        Ok(camera) => camera,
        Err(err) => {
            live.store(false, Ordering::SeqCst);
            let _ = ready_tx.send(Err(acquisition_error(&err)));
            return;
        }
    };

    let id = format!("{}#{}", camera.info().index(), camera.info().human_name());
    log_info!("capture started on {id} at {:?}", camera.resolution());
    if ready_tx.send(Ok(id)).is_err() {
        live.store(false, Ordering::SeqCst);
    }

    while live.load(Ordering::SeqCst) && !frame_tx.is_closed() {
        let buffer = match camera.frame() {
            Ok(buffer) => buffer,
            Err(err) => {
                log_warn!("frame capture failed: {err}");
                thread::sleep(FRAME_ERROR_BACKOFF);
                continue;
            }
        };
        match buffer.decode_image::<RgbFormat>() {
            Ok(image) => {
                let (width, height) = (image.width(), image.height());
                if let Some(frame) = Frame::from_rgb(width, height, &image.into_raw()) {
                    frame_tx.send_replace(Some(frame));
                }
            }
            Err(err) => log_debug!("frame conversion failed: {err}"),
        }
    }

    live.store(false, Ordering::SeqCst);
    if let Err(err) = camera.stop_stream() {
        log_debug!("stopping capture: {err}");
    }
    log_info!("capture thread exiting");
}

struct NokhwaStream {
    id: String,
    live: Arc<AtomicBool>,
    frames: Mutex<watch::Receiver<Option<Frame>>>,
}

#[async_trait]
impl VideoStream for NokhwaStream {
    fn id(&self) -> &str {
        &self.id
    }

    async fn next_frame(&self) -> Option<Frame> {
        let mut frames = self.frames.lock().await;
        loop {
            if !self.is_live() {
                return None;
            }
            frames.changed().await.ok()?;
            if let Some(frame) = frames.borrow_and_update().clone() {
                return Some(frame);
            }
        }
    }

    fn capabilities(&self) -> CameraCapability {
        CameraCapability::default()
    }

    async fn enable_continuous_focus(&self) -> anyhow::Result<()> {
        Err(anyhow!("focus control is not exposed for native cameras"))
    }

    fn stop(&self) {
        self.live.store(false, Ordering::SeqCst);
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{FacingMode, StreamProfile};

    #[test]
    fn numeric_device_ids_map_to_indices() {
        assert_eq!(
            camera_index(&CameraSelection::Device("2".into())),
            CameraIndex::Index(2)
        );
        assert_eq!(
            camera_index(&CameraSelection::Device("/dev/video1".into())),
            CameraIndex::String("/dev/video1".into())
        );
        assert_eq!(
            camera_index(&CameraSelection::Facing(FacingMode::Environment)),
            CameraIndex::Index(0)
        );
    }

    #[test]
    fn relaxed_requests_carry_no_format_constraint() {
        let relaxed = StreamRequest::new(
            CameraSelection::Facing(FacingMode::Environment),
            StreamProfile::Relaxed,
        );
        assert_eq!(relaxed.ideal_resolution(), None);
        let preferred = StreamRequest::new(
            CameraSelection::Facing(FacingMode::Environment),
            StreamProfile::Preferred,
        );
        assert_eq!(preferred.ideal_resolution(), Some((1280, 720)));
    }
}
