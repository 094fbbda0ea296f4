use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::{Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::camera::StreamHandle;
use crate::utils::debug_mode;

use super::{CandidateRead, DecodeEngine, DecodeRequest};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

/// Why a decode loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum LoopExit {
    Cancelled,
    /// The camera stopped delivering frames while decoding was wanted.
    StreamEnded,
}

/// Pull frames at a fixed rate and hand every decoded payload to `on_decode`.
///
/// Frames are assumed to arrive in order; no reordering happens here. While
/// `paused` holds `true` no frame is read and the engine is not invoked.
pub(super) async fn decode_loop<F>(
    stream: StreamHandle,
    engine: Arc<dyn DecodeEngine>,
    request: DecodeRequest,
    frame_interval: Duration,
    mut paused: watch::Receiver<bool>,
    cancel_token: CancellationToken,
    mut on_decode: F,
) -> LoopExit
where
    F: FnMut(CandidateRead) + Send + 'static,
{
    let mut ticker = tokio::time::interval(frame_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let request = Arc::new(request);
    let verbose = debug_mode();
    let mut frames: u64 = 0;
    let mut decodes: u64 = 0;

    let exit = loop {
        if *paused.borrow_and_update() {
            tokio::select! {
                changed = paused.changed() => {
                    if changed.is_err() {
                        break LoopExit::Cancelled;
                    }
                    continue;
                }
                _ = cancel_token.cancelled() => break LoopExit::Cancelled,
            }
        }

        tokio::select! {
            _ = ticker.tick() => {}
            _ = cancel_token.cancelled() => break LoopExit::Cancelled,
        }
        if *paused.borrow() {
            continue;
        }

        let frame = tokio::select! {
            frame = stream.next_frame() => frame,
            _ = cancel_token.cancelled() => break LoopExit::Cancelled,
        };
        let Some(frame) = frame else {
            if cancel_token.is_cancelled() {
                break LoopExit::Cancelled;
            }
            log_warn!("stream {} ended, decode loop exiting", stream.id());
            break LoopExit::StreamEnded;
        };
        frames += 1;

        let result = tokio::task::spawn_blocking({
            let engine = Arc::clone(&engine);
            let request = Arc::clone(&request);
            move || engine.decode(&frame, &request)
        })
        .await
        .unwrap_or_else(|err| {
            log_warn!("decode worker join failed: {err}");
            None
        });

        // A pause or stop issued while the engine was busy wins over its result.
        if cancel_token.is_cancelled() {
            break LoopExit::Cancelled;
        }
        if *paused.borrow() {
            continue;
        }

        match result.and_then(CandidateRead::from_raw) {
            Some(read) => {
                decodes += 1;
                log_debug!("decoded {:?} ({:?})", read.payload, read.symbology);
                on_decode(read);
            }
            None => on_miss(),
        }

        if verbose && frames % 50 == 0 {
            log_info!(
                "stream {}: {} frames sampled, {} decodes",
                stream.id(),
                frames,
                decodes
            );
        }
    };

    log_info!(
        "decode loop for stream {} stopped after {} frames, {} decodes ({:?})",
        stream.id(),
        frames,
        decodes,
        exit
    );
    exit
}

/// Per-frame misses are expected and ignored.
fn on_miss() {}
