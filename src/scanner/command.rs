use tokio::sync::oneshot;

use crate::camera::{CameraAcquisitionError, CameraCapability, StreamHandle, StreamProfile};
use crate::decoder::{CandidateRead, Viewport};

use super::{ScanSession, ScannerOptions};

/// Which try of an acquisition this is. Only the primary attempt may be
/// followed by an automatic fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Attempt {
    Primary,
    Fallback,
}

impl Attempt {
    pub(crate) fn profile(self) -> StreamProfile {
        match self {
            Attempt::Primary => StreamProfile::Preferred,
            Attempt::Fallback => StreamProfile::Relaxed,
        }
    }
}

pub(crate) struct AcquiredStream {
    pub(crate) stream: StreamHandle,
    pub(crate) capability: CameraCapability,
}

/// Everything the lifecycle actor reacts to, host triggers and internal
/// completions alike, processed one at a time in arrival order.
pub(crate) enum ScannerCommand {
    Mount {
        viewport: Viewport,
    },
    Unmount,
    SetVisibility {
        visible: bool,
    },
    Retry,
    Configure {
        options: ScannerOptions,
    },
    Snapshot {
        reply: oneshot::Sender<ScanSession>,
    },
    Shutdown {
        reply: Option<oneshot::Sender<()>>,
    },
    AcquisitionFinished {
        generation: u64,
        attempt: Attempt,
        outcome: Result<AcquiredStream, CameraAcquisitionError>,
    },
    Candidate {
        generation: u64,
        read: CandidateRead,
    },
    SettleElapsed {
        generation: u64,
    },
    /// The decode loop lost its stream without being stopped.
    DecoderEnded {
        generation: u64,
    },
}
