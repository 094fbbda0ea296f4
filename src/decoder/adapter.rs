use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::camera::{CameraAcquisitionError, ErrorReason, StreamHandle};

use super::worker::{decode_loop, LoopExit};
use super::{CandidateRead, DecodeEngine, DecodeRequest, DecoderConfig};

const ENABLE_LOGS: bool = true;

use crate::log_info;

/// Continuous decoding over one camera stream.
///
/// Owns the decode task but not the stream: stopping the decoder leaves the
/// camera open, releasing it is the negotiator's job.
pub struct FrameDecoder {
    handle: Option<JoinHandle<()>>,
    cancel_token: CancellationToken,
    pause_tx: watch::Sender<bool>,
}

impl FrameDecoder {
    /// Spawn the decode loop. Must be called from within a tokio runtime.
    ///
    /// `on_end` runs once if the stream stops delivering frames on its own;
    /// it never runs after `stop()`.
    pub fn start<F, E>(
        stream: StreamHandle,
        config: DecoderConfig,
        engine: Arc<dyn DecodeEngine>,
        on_decode: F,
        on_end: E,
    ) -> Result<Self, CameraAcquisitionError>
    where
        F: FnMut(CandidateRead) + Send + 'static,
        E: FnOnce() + Send + 'static,
    {
        if !stream.is_live() {
            return Err(CameraAcquisitionError::new(
                ErrorReason::Unknown,
                format!("stream {} ended before decoding started", stream.id()),
            ));
        }

        let request = DecodeRequest {
            roi: config.roi,
            symbologies: config.symbologies.clone(),
        };

        let cancel_token = CancellationToken::new();
        let (pause_tx, pause_rx) = watch::channel(false);

        log_info!(
            "starting decoder on stream {} at {} fps (roi {:?})",
            stream.id(),
            config.fps,
            config.roi
        );

        let frame_interval = config.frame_interval();
        let loop_token = cancel_token.clone();
        let handle = tokio::spawn(async move {
            let exit = decode_loop(
                stream,
                engine,
                request,
                frame_interval,
                pause_rx,
                loop_token.clone(),
                on_decode,
            )
            .await;
            if exit == LoopExit::StreamEnded && !loop_token.is_cancelled() {
                on_end();
            }
        });

        Ok(Self {
            handle: Some(handle),
            cancel_token,
            pause_tx,
        })
    }

    /// Halt decode invocations, keeping the stream open.
    pub fn pause(&self) {
        self.pause_tx.send_replace(true);
    }

    pub fn resume(&self) {
        self.pause_tx.send_replace(false);
    }

    pub fn is_paused(&self) -> bool {
        *self.pause_tx.borrow()
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Stop decoding and wait for the loop to exit. Safe to call repeatedly.
    pub async fn stop(&mut self) -> Result<()> {
        self.cancel_token.cancel();

        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("decode loop task failed to join")
                .map(|_| ())
        } else {
            Ok(())
        }
    }
}

impl Drop for FrameDecoder {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}
