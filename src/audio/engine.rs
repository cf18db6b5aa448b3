use rodio::{OutputStream, OutputStreamHandle, Sink};
use std::sync::{
    mpsc::{self, Sender},
    Arc, Mutex,
};
use std::thread;

use log::warn;

use super::chime::Chime;
use super::ToneGenerator;
use crate::timer::ToneKind;

// Set to true to log every dropped cue
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_warn};

/// Plays cues on a dedicated thread that owns the non-Send audio objects.
pub struct RodioToneGenerator {
    tx: Arc<Mutex<Option<Sender<ToneKind>>>>,
}

impl RodioToneGenerator {
    pub fn new() -> Self {
        Self {
            tx: Arc::new(Mutex::new(None)),
        }
    }

    fn ensure_thread(&self) -> Result<Sender<ToneKind>, String> {
        let mut guard = self.tx.lock().map_err(|e| e.to_string())?;
        if let Some(tx) = guard.as_ref() {
            return Ok(tx.clone());
        }

        let (tx, rx) = mpsc::channel::<ToneKind>();

        thread::Builder::new()
            .name("tone-engine".to_string())
            .spawn(move || {
                let mut output: Option<(OutputStream, OutputStreamHandle)> = None;
                let mut sink: Option<Sink> = None;

                while let Ok(kind) = rx.recv() {
                    if sink.is_none() {
                        match open_sink() {
                            Ok((stream, handle, new_sink)) => {
                                output = Some((stream, handle));
                                sink = Some(new_sink);
                            }
                            Err(err) => {
                                log_warn!("Dropping {} cue: {}", kind.as_str(), err);
                                continue;
                            }
                        }
                    }
                    if let Some(ref s) = sink {
                        s.append(Chime::new(kind));
                    }
                }

                drop(sink);
                drop(output);
            })
            .map_err(|e| e.to_string())?;

        *guard = Some(tx.clone());
        Ok(tx)
    }
}

fn open_sink() -> Result<(OutputStream, OutputStreamHandle, Sink), String> {
    let (stream, handle) = OutputStream::try_default()
        .map_err(|e| format!("Failed to create audio output stream: {}", e))?;
    let sink =
        Sink::try_new(&handle).map_err(|e| format!("Failed to create audio sink: {}", e))?;
    Ok((stream, handle, sink))
}

impl Default for RodioToneGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ToneGenerator for RodioToneGenerator {
    fn emit(&self, kind: ToneKind) {
        let tx = match self.ensure_thread() {
            Ok(tx) => tx,
            Err(err) => {
                warn!("Tone engine unavailable: {}", err);
                return;
            }
        };
        if tx.send(kind).is_err() {
            log_error!("Tone engine thread exited; dropping {} cue", kind.as_str());
            // Respawn on the next cue
            if let Ok(mut guard) = self.tx.lock() {
                *guard = None;
            }
        }
    }
}

#[cfg(all(test, feature = "audio"))]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[test]
    fn emit_never_blocks_or_panics_without_a_device() {
        let tones = RodioToneGenerator::new();
        let started = Instant::now();
        for kind in [
            ToneKind::SingleWarning,
            ToneKind::DoubleWarning,
            ToneKind::PhaseBoundary,
            ToneKind::Completion,
        ] {
            tones.emit(kind);
        }
        assert!(started.elapsed() < Duration::from_secs(1));

        // The engine thread is still accepting cues after any device failure.
        tones.emit(ToneKind::Completion);
        assert!(tones.tx.lock().unwrap().is_some());
    }
}
