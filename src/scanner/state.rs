use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::camera::CameraCapability;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ScanStatus {
    Loading,
    Scanning,
    Error,
}

impl Default for ScanStatus {
    fn default() -> Self {
        ScanStatus::Loading
    }
}

/// One attempt at using the camera, as seen by the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSession {
    pub status: ScanStatus,
    /// Opaque id bound to the host's rendering surface.
    pub session_handle: String,
    pub last_confirmed_payload: Option<String>,
    pub last_error: Option<String>,
    /// Decoding is halted for the settle period after a confirmed scan.
    pub paused: bool,
    pub capability: Option<CameraCapability>,
    pub started_at: Option<DateTime<Utc>>,
    pub confirmed_scans: u64,
    /// Bumped on every teardown; asynchronous completions carrying an older
    /// value are discarded.
    pub generation: u64,
}

impl Default for ScanSession {
    fn default() -> Self {
        Self {
            status: ScanStatus::Loading,
            session_handle: String::new(),
            last_confirmed_payload: None,
            last_error: None,
            paused: false,
            capability: None,
            started_at: None,
            confirmed_scans: 0,
            generation: 0,
        }
    }
}

impl ScanSession {
    pub fn new(generation: u64) -> Self {
        Self {
            session_handle: Uuid::new_v4().to_string(),
            generation,
            ..Self::default()
        }
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    /// Drop everything tied to the live stream and move to a new generation.
    pub fn invalidate(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.paused = false;
        self.capability = None;
        self.started_at = None;
    }

    pub fn begin_loading(&mut self) {
        self.status = ScanStatus::Loading;
        self.last_error = None;
    }

    pub fn begin_scanning(&mut self, capability: CameraCapability, now: DateTime<Utc>) {
        self.status = ScanStatus::Scanning;
        self.capability = Some(capability);
        self.started_at = Some(now);
        self.paused = false;
        self.last_error = None;
    }

    pub fn fail(&mut self, message: String) {
        self.status = ScanStatus::Error;
        self.last_error = Some(message);
        self.paused = false;
    }

    pub fn record_scan(&mut self, payload: &str) {
        self.last_confirmed_payload = Some(payload.to_string());
        self.confirmed_scans += 1;
    }
}
