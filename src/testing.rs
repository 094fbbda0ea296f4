//! Scripted stand-ins for the camera platform, decode engine and host.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;

use crate::camera::{
    CameraAcquisitionError, CameraBackend, CameraCapability, CameraDevice,
    DeviceEnumerationError, ErrorReason, FacingMode, Frame, StreamHandle, StreamRequest,
    VideoStream,
};
use crate::decoder::{DecodeEngine, DecodeRequest, RawDecode};
use crate::host::{Acknowledger, HostEvents};
use crate::scanner::{ScanSession, ScanStatus};

pub struct FakeStream {
    id: String,
    live: AtomicBool,
    focus_supported: bool,
    focus_succeeds: bool,
}

impl FakeStream {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            live: AtomicBool::new(true),
            focus_supported: false,
            focus_succeeds: false,
        }
    }
}

#[async_trait]
impl VideoStream for FakeStream {
    fn id(&self) -> &str {
        &self.id
    }

    async fn next_frame(&self) -> Option<Frame> {
        self.is_live().then(|| Frame::blank(64, 48))
    }

    fn capabilities(&self) -> CameraCapability {
        CameraCapability {
            facing: Some(FacingMode::Environment),
            continuous_focus_supported: self.focus_supported,
            continuous_focus_enabled: false,
        }
    }

    async fn enable_continuous_focus(&self) -> anyhow::Result<()> {
        if self.focus_succeeds {
            Ok(())
        } else {
            Err(anyhow!("focusMode not settable"))
        }
    }

    fn stop(&self) {
        self.live.store(false, Ordering::SeqCst);
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }
}

/// Camera platform whose open results are scripted: queued failures are
/// returned first, every later open succeeds.
pub struct FakeBackend {
    devices: Vec<CameraDevice>,
    enumeration_error: Option<String>,
    focus: (bool, bool),
    open_delay: Duration,
    failures: Mutex<VecDeque<ErrorReason>>,
    requests: Mutex<Vec<StreamRequest>>,
    streams: Mutex<Vec<Arc<FakeStream>>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            devices: vec![
                CameraDevice::new("front", "Front Camera"),
                CameraDevice::new("rear", "Back Camera"),
            ],
            enumeration_error: None,
            focus: (false, false),
            open_delay: Duration::ZERO,
            failures: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            streams: Mutex::new(Vec::new()),
        }
    }

    pub fn with_enumeration_error(mut self, message: &str) -> Self {
        self.enumeration_error = Some(message.to_string());
        self
    }

    pub fn with_focus(mut self, supported: bool, succeeds: bool) -> Self {
        self.focus = (supported, succeeds);
        self
    }

    pub fn with_open_delay(mut self, delay: Duration) -> Self {
        self.open_delay = delay;
        self
    }

    pub fn push_open_failure(&self, reason: ErrorReason) {
        self.failures.lock().unwrap().push_back(reason);
    }

    pub fn opened(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<StreamRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Stop every open stream as if the camera had been unplugged.
    pub fn end_streams(&self) {
        for stream in self.streams.lock().unwrap().iter() {
            stream.stop();
        }
    }

    pub fn live_streams(&self) -> usize {
        self.streams
            .lock()
            .unwrap()
            .iter()
            .filter(|stream| stream.is_live())
            .count()
    }
}

#[async_trait]
impl CameraBackend for FakeBackend {
    async fn enumerate_devices(&self) -> Result<Vec<CameraDevice>, DeviceEnumerationError> {
        match &self.enumeration_error {
            Some(message) => Err(DeviceEnumerationError(message.clone())),
            None => Ok(self.devices.clone()),
        }
    }

    async fn open_stream(
        &self,
        request: &StreamRequest,
    ) -> Result<StreamHandle, CameraAcquisitionError> {
        let index = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len()
        };

        if !self.open_delay.is_zero() {
            tokio::time::sleep(self.open_delay).await;
        }

        if let Some(reason) = self.failures.lock().unwrap().pop_front() {
            return Err(CameraAcquisitionError::new(reason, "scripted failure"));
        }

        let stream = Arc::new(FakeStream {
            id: format!("stream-{index}"),
            live: AtomicBool::new(true),
            focus_supported: self.focus.0,
            focus_succeeds: self.focus.1,
        });
        self.streams.lock().unwrap().push(Arc::clone(&stream));
        Ok(stream)
    }
}

/// Engine returning scripted results in order, then misses forever.
pub struct ScriptedEngine {
    script: Mutex<VecDeque<Option<String>>>,
    calls: AtomicUsize,
    last_request: Mutex<Option<DecodeRequest>>,
}

impl ScriptedEngine {
    pub fn new<'a>(reads: impl IntoIterator<Item = Option<&'a str>>) -> Self {
        Self {
            script: Mutex::new(
                reads
                    .into_iter()
                    .map(|read| read.map(str::to_string))
                    .collect(),
            ),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Never decodes anything.
    pub fn silent() -> Self {
        Self::new(std::iter::empty::<Option<&str>>())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<DecodeRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

impl DecodeEngine for ScriptedEngine {
    fn decode(&self, _frame: &Frame, request: &DecodeRequest) -> Option<RawDecode> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .flatten()
            .map(|text| RawDecode::new(text, None))
    }
}

#[derive(Default)]
pub struct RecordingHost {
    scans: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
    statuses: Mutex<Vec<ScanStatus>>,
}

impl RecordingHost {
    pub fn scans(&self) -> Vec<String> {
        self.scans.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }

    pub fn statuses(&self) -> Vec<ScanStatus> {
        self.statuses.lock().unwrap().clone()
    }
}

impl HostEvents for RecordingHost {
    fn on_scan(&self, payload: String) {
        self.scans.lock().unwrap().push(payload);
    }

    fn on_error(&self, message: String) {
        self.errors.lock().unwrap().push(message);
    }

    fn on_state_changed(&self, session: &ScanSession) {
        self.statuses.lock().unwrap().push(session.status);
    }
}

#[derive(Default)]
pub struct CountingAcknowledger {
    count: AtomicUsize,
}

impl CountingAcknowledger {
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl Acknowledger for CountingAcknowledger {
    fn acknowledge(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}
