use std::fs;
use std::path::PathBuf;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{error, info};
use uuid::Uuid;

use crate::error::SessionError;

use super::backend::{AudioBackend, AudioBackendConfig, AudioBackendFactory, AudioFrame};

/// Capture unit configuration
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    pub backend: AudioBackendConfig,
    /// Directory the finalized WAV artifact is written to
    pub recordings_dir: PathBuf,
}

/// The finalized audio artifact of one recording run
#[derive(Debug, Clone)]
pub struct AudioArtifact {
    /// Retrievable reference to the encoded audio
    pub path: PathBuf,
    pub duration_secs: f64,
    pub sample_count: usize,
    pub sample_rate: u32,
    pub channels: u16,
}

/// Owns one microphone backend and its incremental frame buffer.
///
/// Frames are buffered in arrival order and fanned out to the recognition
/// session through a broadcast subscription. Each `open` starts from an
/// empty buffer; `finalize` stops capture and produces exactly one WAV
/// artifact from the buffered frames.
pub struct CaptureUnit {
    run_id: String,
    backend: Box<dyn AudioBackend>,
    fanout: broadcast::Sender<AudioFrame>,
    collector: JoinHandle<FrameBuffer>,
    config: CaptureConfig,
}

#[derive(Default)]
struct FrameBuffer {
    samples: Vec<i16>,
    sample_rate: u32,
    channels: u16,
}

impl FrameBuffer {
    fn push(&mut self, frame: &AudioFrame) {
        if self.sample_rate == 0 {
            self.sample_rate = frame.sample_rate;
            self.channels = frame.channels;
        }
        self.samples.extend_from_slice(&frame.samples);
    }
}

impl CaptureUnit {
    /// Acquire the microphone and begin buffering frames.
    pub async fn open(
        factory: &dyn AudioBackendFactory,
        config: CaptureConfig,
    ) -> Result<Self, SessionError> {
        let run_id = format!("meeting-{}", Uuid::new_v4());

        let mut backend = factory
            .create(&config.backend)
            .map_err(|e| SessionError::Capture(e.to_string()))?;

        let frames = backend
            .start()
            .await
            .map_err(|e| SessionError::Capture(e.to_string()))?;

        info!("Capture unit opened: {} ({})", run_id, backend.name());

        let (fanout, _) = broadcast::channel(256);
        let collector = tokio::spawn(collect_frames(frames, fanout.clone()));

        Ok(Self {
            run_id,
            backend,
            fanout,
            collector,
            config,
        })
    }

    /// Subscribe to the live frame stream (used by the recognition session)
    pub fn subscribe(&self) -> broadcast::Receiver<AudioFrame> {
        self.fanout.subscribe()
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Stop capturing and produce the single audio artifact for this run.
    pub async fn finalize(self) -> Result<AudioArtifact, SessionError> {
        let CaptureUnit {
            run_id,
            mut backend,
            fanout,
            collector,
            config,
        } = self;
        drop(fanout);

        if let Err(e) = backend.stop().await {
            error!("Failed to stop audio backend: {}", e);
        }

        let buffer = collector
            .await
            .map_err(|e| SessionError::Capture(format!("frame collector panicked: {}", e)))?;

        let sample_rate = if buffer.sample_rate == 0 {
            config.backend.target_sample_rate
        } else {
            buffer.sample_rate
        };
        let channels = if buffer.channels == 0 {
            config.backend.target_channels
        } else {
            buffer.channels
        };

        let path = write_wav(
            &config.recordings_dir,
            &run_id,
            &buffer.samples,
            sample_rate,
            channels,
        )?;

        let duration_secs =
            buffer.samples.len() as f64 / (sample_rate as f64 * channels.max(1) as f64);

        info!(
            "Recording finalized: {} ({:.1}s, {} samples)",
            path.display(),
            duration_secs,
            buffer.samples.len()
        );

        Ok(AudioArtifact {
            path,
            duration_secs,
            sample_count: buffer.samples.len(),
            sample_rate,
            channels,
        })
    }
}

fn write_wav(
    dir: &std::path::Path,
    run_id: &str,
    samples: &[i16],
    sample_rate: u32,
    channels: u16,
) -> Result<PathBuf, SessionError> {
    fs::create_dir_all(dir)
        .map_err(|e| SessionError::Capture(format!("failed to create recordings dir: {}", e)))?;

    let path = dir.join(format!("{}.wav", run_id));

    let spec = hound::WavSpec {
        channels: channels.max(1),
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(&path, spec)
        .map_err(|e| SessionError::Capture(format!("failed to create WAV file: {}", e)))?;

    for &sample in samples {
        writer
            .write_sample(sample)
            .map_err(|e| SessionError::Capture(format!("failed to write sample: {}", e)))?;
    }

    writer
        .finalize()
        .map_err(|e| SessionError::Capture(format!("failed to finalize WAV file: {}", e)))?;

    Ok(path)
}

async fn collect_frames(
    mut frames: mpsc::Receiver<AudioFrame>,
    fanout: broadcast::Sender<AudioFrame>,
) -> FrameBuffer {
    let mut buffer = FrameBuffer::default();

    while let Some(frame) = frames.recv().await {
        // No live subscriber (e.g. recognition unconfigured) is fine
        let _ = fanout.send(frame.clone());
        buffer.push(&frame);
    }

    buffer
}
