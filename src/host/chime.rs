use rodio::{OutputStream, Sink, Source};
use std::f32::consts::PI;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    mpsc::{self, Sender},
    Mutex,
};
use std::thread;
use std::time::Duration;

use super::Acknowledger;

const ENABLE_LOGS: bool = true;

use crate::log_warn;

const BEEP_FREQ_HZ: f32 = 1760.0;
const BEEP_DURATION: Duration = Duration::from_millis(120);
const SAMPLE_RATE: u32 = 44100;
const CHIME_VOLUME: f32 = 0.8;

/// Short mono sine beep with a linear fade-out to avoid a click at the end.
pub struct Beep {
    freq: f32,
    num_sample: usize,
    total_samples: usize,
}

impl Beep {
    pub fn new(freq: f32, duration: Duration) -> Self {
        Self {
            freq,
            num_sample: 0,
            total_samples: (duration.as_secs_f32() * SAMPLE_RATE as f32) as usize,
        }
    }
}

impl Iterator for Beep {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.num_sample >= self.total_samples {
            return None;
        }
        let t = self.num_sample as f32 / SAMPLE_RATE as f32;
        let envelope = 1.0 - self.num_sample as f32 / self.total_samples as f32;
        self.num_sample += 1;
        Some((2.0 * PI * self.freq * t).sin() * envelope * 0.3)
    }
}

impl Source for Beep {
    fn current_frame_len(&self) -> Option<usize> {
        Some(self.total_samples.saturating_sub(self.num_sample))
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(Duration::from_secs_f32(
            self.total_samples as f32 / SAMPLE_RATE as f32,
        ))
    }
}

enum ChimeCommand {
    Play,
}

/// Plays a beep per confirmed scan on a dedicated audio thread.
///
/// The rodio output stream is not `Send`, so it lives on its own thread and
/// is driven through a channel.
pub struct ChimeAcknowledger {
    tx: Mutex<Option<Sender<ChimeCommand>>>,
    enabled: AtomicBool,
}

impl ChimeAcknowledger {
    pub fn new(enabled: bool) -> Self {
        Self {
            tx: Mutex::new(None),
            enabled: AtomicBool::new(enabled),
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    fn ensure_thread(&self) -> Result<Sender<ChimeCommand>, String> {
        let mut guard = self.tx.lock().map_err(|e| e.to_string())?;
        if let Some(tx) = guard.as_ref() {
            return Ok(tx.clone());
        }

        let (tx, rx) = mpsc::channel::<ChimeCommand>();

        thread::Builder::new()
            .name("scan-chime".to_string())
            .spawn(move || {
                let mut _stream: Option<OutputStream> = None;
                let mut sink: Option<Sink> = None;

                while let Ok(cmd) = rx.recv() {
                    match cmd {
                        ChimeCommand::Play => {
                            if sink.is_none() {
                                match OutputStream::try_default() {
                                    Ok((stream, handle)) => match Sink::try_new(&handle) {
                                        Ok(new_sink) => {
                                            new_sink.set_volume(CHIME_VOLUME);
                                            _stream = Some(stream);
                                            sink = Some(new_sink);
                                        }
                                        Err(e) => log_warn!("failed to create audio sink: {e}"),
                                    },
                                    Err(e) => {
                                        log_warn!("failed to create audio output stream: {e}")
                                    }
                                }
                            }
                            if let Some(ref s) = sink {
                                s.append(Beep::new(BEEP_FREQ_HZ, BEEP_DURATION));
                            }
                        }
                    }
                }
            })
            .map_err(|e| e.to_string())?;

        *guard = Some(tx.clone());
        Ok(tx)
    }
}

impl Acknowledger for ChimeAcknowledger {
    fn acknowledge(&self) {
        if !self.enabled.load(Ordering::SeqCst) {
            return;
        }
        if let Err(err) = self
            .ensure_thread()
            .and_then(|tx| tx.send(ChimeCommand::Play).map_err(|e| e.to_string()))
        {
            log_warn!("scan chime unavailable: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn beep_is_finite_and_fades_out() {
        let beep = Beep::new(BEEP_FREQ_HZ, BEEP_DURATION);
        let samples: Vec<f32> = beep.collect();
        assert_eq!(samples.len(), (0.12 * SAMPLE_RATE as f32) as usize);
        assert!(samples.iter().all(|s| s.abs() <= 0.3));
        assert!(samples.last().unwrap().abs() < 0.01);
    }
}
