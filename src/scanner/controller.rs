use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use crate::camera::{CameraAcquisitionError, CameraBackend, DeviceNegotiator, StreamHandle};
use crate::confirm::ConfirmationFilter;
use crate::decoder::{
    CandidateRead, DecodeEngine, DecoderConfig, FrameDecoder, Symbology, Viewport, DEFAULT_FPS,
    DEFAULT_SYMBOLOGIES,
};
use crate::host::{Acknowledger, HostEvents};

use super::command::{AcquiredStream, Attempt, ScannerCommand};
use super::diagnostics::{diagnostic_message, stream_lost_message, Locale};
use super::{ScanSession, ScanStatus};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info, log_warn};

/// Wait before the first acquisition so the host surface exists.
pub const STARTUP_DELAY: Duration = Duration::from_millis(200);
/// Wait after a teardown before opening the camera again.
pub const REACQUIRE_DELAY: Duration = Duration::from_millis(300);
/// Decoding pause after each confirmed scan.
pub const SETTLE_DELAY: Duration = Duration::from_millis(1500);

/// Host-provided knobs. Thresholds and delays are fixed constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScannerOptions {
    pub symbologies: Vec<Symbology>,
    pub fps: u32,
    pub locale: Locale,
}

impl Default for ScannerOptions {
    fn default() -> Self {
        Self {
            symbologies: DEFAULT_SYMBOLOGIES.to_vec(),
            fps: DEFAULT_FPS,
            locale: Locale::default(),
        }
    }
}

/// Collaborators the lifecycle actor drives.
pub struct ScannerParts {
    pub backend: Arc<dyn CameraBackend>,
    pub engine: Arc<dyn DecodeEngine>,
    pub host: Arc<dyn HostEvents>,
    pub acknowledger: Arc<dyn Acknowledger>,
}

/// Cloneable handle to the scan session lifecycle.
///
/// Every call is queued to a single actor task, so mount, visibility,
/// retry and internal timer events never race each other.
#[derive(Clone)]
pub struct ScanController {
    tx: mpsc::UnboundedSender<ScannerCommand>,
    _guard: Arc<ShutdownOnDrop>,
}

struct ShutdownOnDrop {
    tx: mpsc::UnboundedSender<ScannerCommand>,
}

impl Drop for ShutdownOnDrop {
    fn drop(&mut self) {
        let _ = self.tx.send(ScannerCommand::Shutdown { reply: None });
    }
}

impl ScanController {
    /// Spawn the lifecycle actor. Must be called from within a tokio runtime.
    pub fn spawn(parts: ScannerParts, options: ScannerOptions) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let actor = ScannerActor::new(parts, options, tx.clone());
        tokio::spawn(actor.run(rx));

        Self {
            _guard: Arc::new(ShutdownOnDrop { tx: tx.clone() }),
            tx,
        }
    }

    /// Host surface appeared; the camera is acquired after a short delay.
    pub fn mount(&self, viewport: Viewport) -> Result<()> {
        self.send(ScannerCommand::Mount { viewport })
    }

    /// Host surface went away; releases the camera. Idempotent.
    pub fn unmount(&self) -> Result<()> {
        self.send(ScannerCommand::Unmount)
    }

    pub fn set_visibility(&self, visible: bool) -> Result<()> {
        self.send(ScannerCommand::SetVisibility { visible })
    }

    /// User-triggered retry out of the error state.
    pub fn retry(&self) -> Result<()> {
        self.send(ScannerCommand::Retry)
    }

    /// Replace the options; they take effect on the next acquisition.
    pub fn configure(&self, options: ScannerOptions) -> Result<()> {
        self.send(ScannerCommand::Configure { options })
    }

    pub async fn snapshot(&self) -> Result<ScanSession> {
        let (reply, rx) = oneshot::channel();
        self.send(ScannerCommand::Snapshot { reply })?;
        rx.await.map_err(|_| anyhow!("scanner stopped before answering"))
    }

    /// Tear everything down and stop the actor.
    pub async fn shutdown(&self) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(ScannerCommand::Shutdown { reply: Some(reply) })?;
        rx.await.map_err(|_| anyhow!("scanner stopped before answering"))
    }

    fn send(&self, command: ScannerCommand) -> Result<()> {
        self.tx
            .send(command)
            .map_err(|_| anyhow!("scanner controller is no longer running"))
    }
}

struct Acquisition {
    generation: u64,
    cancel_token: CancellationToken,
}

struct LiveStream {
    stream: StreamHandle,
    decoder: FrameDecoder,
}

struct ScannerActor {
    negotiator: DeviceNegotiator,
    engine: Arc<dyn DecodeEngine>,
    host: Arc<dyn HostEvents>,
    acknowledger: Arc<dyn Acknowledger>,
    options: ScannerOptions,
    tx: mpsc::UnboundedSender<ScannerCommand>,
    lifetime: CancellationToken,

    session: ScanSession,
    filter: ConfirmationFilter,
    mounted: bool,
    visible: bool,
    viewport: Viewport,
    acquisition: Option<Acquisition>,
    live: Option<LiveStream>,
    settle: Option<CancellationToken>,
}

impl ScannerActor {
    fn new(
        parts: ScannerParts,
        options: ScannerOptions,
        tx: mpsc::UnboundedSender<ScannerCommand>,
    ) -> Self {
        Self {
            negotiator: DeviceNegotiator::new(parts.backend),
            engine: parts.engine,
            host: parts.host,
            acknowledger: parts.acknowledger,
            options,
            tx,
            lifetime: CancellationToken::new(),
            session: ScanSession::default(),
            filter: ConfirmationFilter::new(),
            mounted: false,
            visible: true,
            viewport: Viewport::default(),
            acquisition: None,
            live: None,
            settle: None,
        }
    }

    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<ScannerCommand>) {
        while let Some(command) = rx.recv().await {
            match command {
                ScannerCommand::Mount { viewport } => self.mount(viewport),
                ScannerCommand::Unmount => self.unmount().await,
                ScannerCommand::SetVisibility { visible } => self.set_visibility(visible).await,
                ScannerCommand::Retry => self.retry().await,
                ScannerCommand::Configure { options } => {
                    log_debug!("scanner options updated: {:?}", options);
                    self.options = options;
                }
                ScannerCommand::Snapshot { reply } => {
                    let _ = reply.send(self.session.clone());
                }
                ScannerCommand::Shutdown { reply } => {
                    self.unmount().await;
                    if let Some(reply) = reply {
                        let _ = reply.send(());
                    }
                    break;
                }
                ScannerCommand::AcquisitionFinished {
                    generation,
                    attempt,
                    outcome,
                } => self.acquisition_finished(generation, attempt, outcome).await,
                ScannerCommand::Candidate { generation, read } => self.candidate(generation, read),
                ScannerCommand::SettleElapsed { generation } => self.settle_elapsed(generation),
                ScannerCommand::DecoderEnded { generation } => self.decoder_ended(generation).await,
            }
        }

        self.lifetime.cancel();
        log_info!("scanner controller stopped");
    }

    fn mount(&mut self, viewport: Viewport) {
        if self.mounted {
            log_debug!("mount ignored, already mounted");
            return;
        }

        self.mounted = true;
        self.viewport = viewport;
        self.session = ScanSession::new(self.session.generation.wrapping_add(1));
        log_info!(
            "scanner mounted (session {}, viewport {}x{})",
            self.session.session_handle,
            viewport.width,
            viewport.height
        );
        self.emit_state();

        if self.visible {
            self.spawn_acquisition(Attempt::Primary, STARTUP_DELAY);
        }
    }

    async fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.teardown().await;
        self.mounted = false;
        self.session.begin_loading();
        log_info!("scanner unmounted (session {})", self.session.session_handle);
        self.emit_state();
    }

    async fn set_visibility(&mut self, visible: bool) {
        if self.visible == visible {
            return;
        }
        self.visible = visible;
        if !self.mounted {
            return;
        }

        if !visible {
            if self.session.status == ScanStatus::Error {
                return;
            }
            log_info!("page hidden, releasing camera");
            self.teardown().await;
            self.session.begin_loading();
            self.emit_state();
        } else if self.session.status == ScanStatus::Loading {
            log_info!("page visible, reacquiring camera");
            self.spawn_acquisition(Attempt::Primary, REACQUIRE_DELAY);
        }
    }

    async fn retry(&mut self) {
        if !self.mounted || self.session.status != ScanStatus::Error {
            log_debug!("retry ignored in {:?}", self.session.status);
            return;
        }

        self.teardown().await;
        self.session.begin_loading();
        self.emit_state();

        if self.visible {
            self.spawn_acquisition(Attempt::Primary, REACQUIRE_DELAY);
        }
    }

    /// Start one acquisition attempt unless another is already in flight.
    fn spawn_acquisition(&mut self, attempt: Attempt, delay: Duration) {
        if self.acquisition.is_some() {
            log_debug!("acquisition already in flight");
            return;
        }

        let generation = self.session.generation;
        let cancel_token = self.lifetime.child_token();
        self.acquisition = Some(Acquisition {
            generation,
            cancel_token: cancel_token.clone(),
        });

        let aspect_ratio = self.decoder_config(attempt).aspect_ratio;
        let negotiator = self.negotiator.clone();
        let tx = self.tx.clone();

        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = cancel_token.cancelled() => return,
            }

            let request = negotiator
                .plan_request(attempt.profile())
                .await
                .with_aspect_ratio(aspect_ratio);
            let outcome = match negotiator.acquire_stream(&request).await {
                Ok(stream) => {
                    if cancel_token.is_cancelled() {
                        negotiator.release_stream(&stream).await;
                        return;
                    }
                    let capability = negotiator.negotiate_capabilities(&stream).await;
                    Ok(AcquiredStream { stream, capability })
                }
                Err(err) => Err(err),
            };

            let _ = tx.send(ScannerCommand::AcquisitionFinished {
                generation,
                attempt,
                outcome,
            });
        });
    }

    async fn acquisition_finished(
        &mut self,
        generation: u64,
        attempt: Attempt,
        outcome: Result<AcquiredStream, CameraAcquisitionError>,
    ) {
        if !self.mounted || !self.session.is_current(generation) {
            if let Ok(acquired) = outcome {
                log_debug!("discarding stale stream {}", acquired.stream.id());
                self.negotiator.release_stream(&acquired.stream).await;
            }
            return;
        }

        if self
            .acquisition
            .as_ref()
            .is_some_and(|acquisition| acquisition.generation == generation)
        {
            self.acquisition = None;
        }

        match outcome {
            Ok(acquired) => self.start_decoding(acquired, attempt).await,
            Err(err) => self.acquisition_failed(err, attempt).await,
        }
    }

    fn decoder_config(&self, attempt: Attempt) -> DecoderConfig {
        let preferred =
            DecoderConfig::for_viewport(self.viewport, &self.options.symbologies, self.options.fps);
        match attempt {
            Attempt::Primary => preferred,
            Attempt::Fallback => preferred.relaxed(),
        }
    }

    async fn start_decoding(&mut self, acquired: AcquiredStream, attempt: Attempt) {
        let config = self.decoder_config(attempt);
        let generation = self.session.generation;
        let read_tx = self.tx.clone();
        let end_tx = self.tx.clone();
        let started = FrameDecoder::start(
            Arc::clone(&acquired.stream),
            config,
            Arc::clone(&self.engine),
            move |read| {
                let _ = read_tx.send(ScannerCommand::Candidate { generation, read });
            },
            move || {
                let _ = end_tx.send(ScannerCommand::DecoderEnded { generation });
            },
        );

        match started {
            Ok(decoder) => {
                self.filter.reset();
                self.session.begin_scanning(acquired.capability, Utc::now());
                log_info!(
                    "scanning on stream {} ({:?} attempt, {:?})",
                    acquired.stream.id(),
                    attempt,
                    acquired.capability
                );
                self.live = Some(LiveStream {
                    stream: acquired.stream,
                    decoder,
                });
                self.emit_state();
            }
            Err(err) => {
                self.negotiator.release_stream(&acquired.stream).await;
                self.acquisition_failed(err, attempt).await;
            }
        }
    }

    async fn acquisition_failed(&mut self, err: CameraAcquisitionError, attempt: Attempt) {
        if err.is_overconstrained() && attempt == Attempt::Primary {
            log_warn!("{err}; retrying once with relaxed constraints");
            self.spawn_acquisition(Attempt::Fallback, REACQUIRE_DELAY);
            return;
        }

        self.negotiator.release().await;
        let message = diagnostic_message(err.reason, self.options.locale).to_string();
        log_error!("{err} ({:?} attempt)", attempt);
        self.session.fail(message.clone());
        self.host.on_error(message);
        self.emit_state();
    }

    fn candidate(&mut self, generation: u64, read: CandidateRead) {
        if !self.session.is_current(generation)
            || self.session.status != ScanStatus::Scanning
            || self.session.paused
        {
            return;
        }

        if let Some(payload) = self.filter.observe(&read.payload) {
            self.confirm(payload);
        }
    }

    fn confirm(&mut self, payload: String) {
        log_info!("confirmed scan {:?}", payload);
        self.session.record_scan(&payload);
        self.host.on_scan(payload);
        self.acknowledger.acknowledge();

        if let Some(live) = &self.live {
            live.decoder.pause();
        }
        self.session.paused = true;

        let generation = self.session.generation;
        let cancel_token = self.lifetime.child_token();
        if let Some(previous) = self.settle.replace(cancel_token.clone()) {
            previous.cancel();
        }
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(SETTLE_DELAY) => {
                    let _ = tx.send(ScannerCommand::SettleElapsed { generation });
                }
                _ = cancel_token.cancelled() => {}
            }
        });

        self.emit_state();
    }

    fn settle_elapsed(&mut self, generation: u64) {
        if !self.session.is_current(generation) || self.session.status != ScanStatus::Scanning {
            return;
        }

        self.settle = None;
        if let Some(live) = &self.live {
            live.decoder.resume();
        }
        self.session.paused = false;
        log_debug!("settle period over, decoding resumed");
        self.emit_state();
    }

    async fn decoder_ended(&mut self, generation: u64) {
        if !self.mounted
            || !self.session.is_current(generation)
            || self.session.status != ScanStatus::Scanning
        {
            return;
        }

        log_error!("camera stream ended while scanning");
        self.teardown().await;
        let message = stream_lost_message(self.options.locale).to_string();
        self.session.fail(message.clone());
        self.host.on_error(message);
        self.emit_state();
    }

    /// Cancel in-flight work, stop decoding and release the camera.
    /// Safe to call in any state, any number of times.
    async fn teardown(&mut self) {
        if let Some(acquisition) = self.acquisition.take() {
            acquisition.cancel_token.cancel();
        }
        if let Some(settle) = self.settle.take() {
            settle.cancel();
        }
        if let Some(mut live) = self.live.take() {
            if let Err(err) = live.decoder.stop().await {
                log_warn!("decoder did not stop cleanly: {err:#}");
            }
            self.negotiator.release_stream(&live.stream).await;
        }
        self.negotiator.release().await;
        self.filter.reset();
        self.session.invalidate();
    }

    fn emit_state(&self) {
        self.host.on_state_changed(&self.session);
    }
}
