use std::thread;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, Stream, StreamConfig};
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

use super::backend::{AudioBackend, AudioBackendConfig, AudioBackendFactory, AudioFrame};

/// Microphone capture via cpal's default input device.
///
/// cpal streams are not `Send`, so the stream lives on a dedicated capture
/// thread; frames cross into tokio through a bounded channel.
pub struct MicrophoneBackend {
    #[allow(dead_code)]
    config: AudioBackendConfig,
    capturing: bool,
    stop_tx: Option<std::sync::mpsc::Sender<()>>,
    thread: Option<thread::JoinHandle<()>>,
}

impl MicrophoneBackend {
    pub fn new(config: AudioBackendConfig) -> Self {
        Self {
            config,
            capturing: false,
            stop_tx: None,
            thread: None,
        }
    }
}

#[async_trait::async_trait]
impl AudioBackend for MicrophoneBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>> {
        let (frame_tx, frame_rx) = mpsc::channel(64);
        let (ready_tx, ready_rx) = oneshot::channel();
        let (stop_tx, stop_rx) = std::sync::mpsc::channel();

        let thread = thread::spawn(move || run_capture(frame_tx, ready_tx, stop_rx));

        self.stop_tx = Some(stop_tx);
        self.thread = Some(thread);

        match ready_rx.await {
            Ok(Ok(())) => {
                self.capturing = true;
                info!("Microphone capture started");
                Ok(frame_rx)
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(anyhow!("microphone capture thread exited before starting")),
        }
    }

    async fn stop(&mut self) -> Result<()> {
        if !self.capturing {
            return Ok(());
        }
        self.capturing = false;

        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }

        // The capture thread only blocks on the stop channel; joining it off
        // the async runtime keeps teardown from stalling the event loop.
        if let Some(handle) = self.thread.take() {
            let _ = tokio::task::spawn_blocking(move || handle.join()).await;
        }

        info!("Microphone capture stopped");
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing
    }

    fn name(&self) -> &str {
        "microphone"
    }
}

fn run_capture(
    frame_tx: mpsc::Sender<AudioFrame>,
    ready_tx: oneshot::Sender<Result<()>>,
    stop_rx: std::sync::mpsc::Receiver<()>,
) {
    let host = cpal::default_host();

    let Some(device) = host.default_input_device() else {
        let _ = ready_tx.send(Err(anyhow!("no microphone input device available")));
        return;
    };

    let supported = match device
        .default_input_config()
        .context("failed to query microphone configuration")
    {
        Ok(c) => c,
        Err(e) => {
            let _ = ready_tx.send(Err(e));
            return;
        }
    };

    let sample_format = supported.sample_format();
    let stream_config: StreamConfig = supported.config();
    let started = Instant::now();

    let stream = match sample_format {
        SampleFormat::F32 => build_stream::<f32>(&device, &stream_config, frame_tx, started),
        SampleFormat::I16 => build_stream::<i16>(&device, &stream_config, frame_tx, started),
        SampleFormat::U16 => build_stream::<u16>(&device, &stream_config, frame_tx, started),
        other => Err(anyhow!("unsupported microphone sample format: {:?}", other)),
    };

    let stream = match stream {
        Ok(s) => s,
        Err(e) => {
            let _ = ready_tx.send(Err(e));
            return;
        }
    };

    if let Err(e) = stream.play() {
        let _ = ready_tx.send(Err(e.into()));
        return;
    }

    let _ = ready_tx.send(Ok(()));

    // Block until stop is requested (or the backend is dropped)
    let _ = stop_rx.recv();
    drop(stream);
}

fn build_stream<T>(
    device: &Device,
    config: &StreamConfig,
    frame_tx: mpsc::Sender<AudioFrame>,
    started: Instant,
) -> Result<Stream>
where
    T: cpal::SizedSample,
    f32: cpal::FromSample<T>,
{
    let sample_rate = config.sample_rate.0;
    let channels = config.channels;

    // Stream errors are common with USB audio and non-fatal
    let err_fn = |err| warn!("microphone stream error: {}", err);

    let stream = device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            let samples: Vec<i16> = data
                .iter()
                .map(|&s| {
                    let f: f32 = cpal::Sample::from_sample(s);
                    (f.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
                })
                .collect();

            let frame = AudioFrame {
                samples,
                sample_rate,
                channels,
                timestamp_ms: started.elapsed().as_millis() as u64,
            };

            // Never block the audio thread; drop the frame if the
            // consumer is behind
            let _ = frame_tx.try_send(frame);
        },
        err_fn,
        None,
    )?;

    Ok(stream)
}

/// Default factory: one fresh microphone backend per recording run
pub struct MicrophoneFactory;

impl AudioBackendFactory for MicrophoneFactory {
    fn create(&self, config: &AudioBackendConfig) -> Result<Box<dyn AudioBackend>> {
        Ok(Box::new(MicrophoneBackend::new(config.clone())))
    }
}
