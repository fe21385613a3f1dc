//! Capture, feature extraction, and classification as one unit.
//!
//! `VoiceSession` owns the sample buffer, the capture device, and the loaded
//! model. It can run inline on the render thread (one blocking listen per
//! frame) or on a listener thread that publishes into a single-slot channel
//! where the latest command wins.

use crate::audio::{self, AudioBuffer, CaptureDevice, CaptureError};
use crate::classifier::Classifier;
use crate::command::CommandLabel;
use crate::config::CaptureMode;
use crate::features::FeatureExtractor;
use crate::log_debug;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Wall-clock cost of one listen, per stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenTimings {
    pub capture_ms: u64,
    pub extract_ms: u64,
    pub classify_ms: u64,
}

/// Result of one capture + classify cycle.
#[derive(Debug, Clone)]
pub struct Heard {
    pub label: CommandLabel,
    /// Set when the device failed and the previous samples were reused.
    pub capture_error: Option<CaptureError>,
    pub level_db: f32,
    /// Copy of the samples that were classified, for dumping to disk.
    pub snapshot: AudioBuffer,
    pub timings: ListenTimings,
}

pub struct VoiceSession {
    buffer: AudioBuffer,
    scratch: Vec<i16>,
    device: Box<dyn CaptureDevice>,
    extractor: FeatureExtractor,
    classifier: Classifier,
    capture_duration: Duration,
    log_timings: bool,
}

impl VoiceSession {
    pub fn new(
        device: Box<dyn CaptureDevice>,
        classifier: Classifier,
        capture_duration: Duration,
    ) -> Self {
        let buffer = AudioBuffer::for_duration(capture_duration);
        let scratch = vec![0; buffer.len()];
        Self {
            buffer,
            scratch,
            device,
            extractor: FeatureExtractor::new(),
            classifier,
            capture_duration,
            log_timings: false,
        }
    }

    pub fn with_timing_logs(mut self, enabled: bool) -> Self {
        self.log_timings = enabled;
        self
    }

    pub fn buffer(&self) -> &AudioBuffer {
        &self.buffer
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Record into the shared buffer. On failure the buffer keeps its previous
    /// contents and the error is returned, never raised further.
    pub fn capture(&mut self) -> Result<(), CaptureError> {
        self.device.fill(&mut self.scratch, self.capture_duration)?;
        self.buffer.overwrite(&self.scratch);
        Ok(())
    }

    /// One full capture → features → label cycle. Every failure degrades to a
    /// stale buffer or an `Unknown` label.
    pub fn listen(&mut self) -> Heard {
        let capture_start = Instant::now();
        let capture_error = match self.capture() {
            Ok(()) => None,
            Err(err) => {
                log_debug(&format!("capture failed ({}): {err}", err.label()));
                tracing::warn!(kind = err.label(), error = %err, "capture failed; reusing previous samples");
                Some(err)
            }
        };
        let capture_ms = elapsed_ms(capture_start);

        let extract_start = Instant::now();
        let features = self.extractor.extract(self.buffer.samples());
        let extract_ms = elapsed_ms(extract_start);

        let classify_start = Instant::now();
        let label = self.classifier.classify(&features);
        let classify_ms = elapsed_ms(classify_start);

        let timings = ListenTimings {
            capture_ms,
            extract_ms,
            classify_ms,
        };
        if self.log_timings {
            log_debug(&format!(
                "timing|phase=listen|capture_ms={capture_ms}|extract_ms={extract_ms}|classify_ms={classify_ms}|label={}",
                label.label()
            ));
        }
        tracing::debug!(
            label = label.label(),
            capture_ms,
            extract_ms,
            classify_ms,
            "listen complete"
        );

        Heard {
            label,
            capture_error,
            level_db: audio::rms_db(self.buffer.samples()),
            snapshot: self.buffer.clone(),
            timings,
        }
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

/// Push `value` into a single-slot channel, displacing an unread older value.
/// Returns false once the consumer is gone.
fn publish_latest<T>(sender: &Sender<T>, displaced: &Receiver<T>, value: T) -> bool {
    match sender.try_send(value) {
        Ok(()) => true,
        Err(TrySendError::Full(value)) => {
            let _ = displaced.try_recv();
            // If the consumer raced us and emptied the slot, this still lands.
            !matches!(sender.try_send(value), Err(TrySendError::Disconnected(_)))
        }
        Err(TrySendError::Disconnected(_)) => false,
    }
}

/// Handle the render loop uses to poll the listener thread.
pub struct ListenerHandle {
    receiver: Receiver<Heard>,
    stop_flag: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl ListenerHandle {
    /// Most recent result, if one arrived since the last poll.
    pub fn try_latest(&self) -> Option<Heard> {
        self.receiver.try_iter().last()
    }

    /// Block up to `timeout` for the next result.
    pub fn wait(&self, timeout: Duration) -> Option<Heard> {
        match self.receiver.recv_timeout(timeout) {
            Ok(heard) => Some(heard),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Ask the worker to stop after its current capture.
    pub fn request_stop(&self) {
        self.stop_flag.store(true, Ordering::Relaxed);
    }

    /// Stop and wait for the worker, which may take up to one capture.
    pub fn shutdown(mut self) {
        self.request_stop();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log_debug("listener thread panicked");
            }
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.request_stop();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Move the session onto a worker thread that listens continuously.
pub fn spawn_listener(mut session: VoiceSession) -> ListenerHandle {
    let (sender, receiver) = bounded::<Heard>(1);
    let displaced = receiver.clone();
    let stop_flag = Arc::new(AtomicBool::new(false));
    let worker_stop = stop_flag.clone();

    let handle = thread::spawn(move || {
        log_debug("listener thread started");
        while !worker_stop.load(Ordering::Relaxed) {
            let heard = session.listen();
            if !publish_latest(&sender, &displaced, heard) {
                break;
            }
        }
        log_debug("listener thread stopped");
    });

    ListenerHandle {
        receiver,
        stop_flag,
        handle: Some(handle),
    }
}

/// Where the render loop gets its commands from.
pub enum CommandSource {
    /// Blocking listen on the caller's thread, once per poll.
    Inline(Box<VoiceSession>),
    /// Background listener; polling never blocks.
    Threaded(ListenerHandle),
}

impl CommandSource {
    pub fn start(session: VoiceSession, mode: CaptureMode) -> Self {
        match mode {
            CaptureMode::Inline => CommandSource::Inline(Box::new(session)),
            CaptureMode::Threaded => CommandSource::Threaded(spawn_listener(session)),
        }
    }

    pub fn poll(&mut self) -> Option<Heard> {
        match self {
            CommandSource::Inline(session) => Some(session.listen()),
            CommandSource::Threaded(listener) => listener.try_latest(),
        }
    }

    pub fn shutdown(self) {
        if let CommandSource::Threaded(listener) = self {
            listener.shutdown();
        }
    }
}
