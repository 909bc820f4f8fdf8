use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::capture::{
    AudioArtifact, AudioBackendConfig, AudioBackendFactory, CaptureConfig, CaptureUnit,
};
use crate::config::{AudioConfig, RecognitionConfig};
use crate::error::SessionError;
use crate::recognition::{RecognitionEvent, RecognitionSession, RecognizerConnector};
use crate::transcript::TranscriptStore;
use crate::translation::TranslationPipeline;

use super::replay::ReplayEngine;
use super::state::{SessionState, StateMachine, Transition};

/// The live resource bundle of one recording attempt. At most one exists
/// at any instant, exclusively owned by the orchestrator.
struct RecordingRun {
    capture: CaptureUnit,
    recognizer: Option<Box<dyn RecognitionSession>>,
    router: Option<JoinHandle<()>>,
}

/// Reacts to session state transitions: creates and tears down the capture
/// unit and recognition session, and wires finalization events through the
/// translation pipeline into the transcript store.
pub struct Orchestrator {
    machine: Arc<StateMachine>,
    store: Arc<TranscriptStore>,
    replay: Arc<ReplayEngine>,
    pipeline: Arc<TranslationPipeline>,
    audio_factory: Arc<dyn AudioBackendFactory>,
    connector: Arc<dyn RecognizerConnector>,
    language: watch::Receiver<String>,
    locale: String,
    capture_config: CaptureConfig,
    artifact_tx: mpsc::UnboundedSender<AudioArtifact>,
    run: Option<RecordingRun>,
}

impl Orchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        machine: Arc<StateMachine>,
        store: Arc<TranscriptStore>,
        replay: Arc<ReplayEngine>,
        pipeline: Arc<TranslationPipeline>,
        audio_factory: Arc<dyn AudioBackendFactory>,
        connector: Arc<dyn RecognizerConnector>,
        language: watch::Receiver<String>,
        audio: &AudioConfig,
        recognition: &RecognitionConfig,
        artifact_tx: mpsc::UnboundedSender<AudioArtifact>,
    ) -> Self {
        let capture_config = CaptureConfig {
            backend: AudioBackendConfig {
                target_sample_rate: audio.sample_rate,
                target_channels: audio.channels,
                ..AudioBackendConfig::default()
            },
            recordings_dir: PathBuf::from(&audio.recordings_path),
        };

        Self {
            machine,
            store,
            replay,
            pipeline,
            audio_factory,
            connector,
            language,
            locale: recognition.locale.clone(),
            capture_config,
            artifact_tx,
            run: None,
        }
    }

    /// Consume state transitions until the machine closes, then release
    /// whatever is still held. Cleanup tolerates partial or absent
    /// resources on every path.
    pub async fn run(mut self, mut transitions: mpsc::UnboundedReceiver<Transition>) {
        while let Some(transition) = transitions.recv().await {
            match transition.to {
                SessionState::Recording => self.enter_recording(transition.from).await,
                SessionState::Paused => self.enter_paused().await,
                SessionState::Stopped => self.enter_stopped().await,
                SessionState::Idle => {}
            }
        }

        // Process shutdown
        self.teardown_run().await;
        info!("Orchestrator stopped");
    }

    async fn enter_recording(&mut self, from: SessionState) {
        // Resuming from Paused keeps the microphone and its buffer; every
        // other entry tears the previous run down and starts fresh.
        let resumed = from == SessionState::Paused && self.run.is_some();

        if !resumed {
            self.teardown_run().await;

            match CaptureUnit::open(self.audio_factory.as_ref(), self.capture_config.clone()).await
            {
                Ok(capture) => {
                    self.run = Some(RecordingRun {
                        capture,
                        recognizer: None,
                        router: None,
                    });
                }
                Err(e) => {
                    error!("Failed to open audio capture: {}", e);
                    let revert_to = if from == SessionState::Paused {
                        SessionState::Paused
                    } else {
                        SessionState::Idle
                    };
                    self.machine.revert(revert_to);
                    return;
                }
            }
        }

        if !self.pipeline.is_configured() {
            warn!("Translation backend not configured; utterances will keep their original text");
        }

        let Some(run) = self.run.as_mut() else {
            return;
        };

        // A brand-new recognition session per entry into Recording
        if let Some(mut recognizer) = run.recognizer.take() {
            recognizer.close().await;
        }
        if let Some(router) = run.router.take() {
            drain_router(router).await;
        }

        let (events_tx, events_rx) = mpsc::channel(64);

        match self
            .connector
            .connect(&self.locale, run.capture.subscribe(), events_tx)
            .await
        {
            Ok(handle) => {
                run.recognizer = Some(handle);
                run.router = Some(spawn_router(
                    events_rx,
                    Arc::clone(&self.store),
                    Arc::clone(&self.pipeline),
                    self.language.clone(),
                ));
            }
            Err(SessionError::Configuration(msg)) => {
                // Recording proceeds transcript-less
                warn!("Recognition disabled: {}", msg);
            }
            Err(e) => {
                warn!("Failed to open recognition session: {}", e);
            }
        }
    }

    /// Close only the recognition session; the microphone keeps running so
    /// resuming needs no new permission grant.
    async fn enter_paused(&mut self) {
        let Some(run) = self.run.as_mut() else {
            return;
        };

        if let Some(mut recognizer) = run.recognizer.take() {
            recognizer.close().await;
        }
        if let Some(router) = run.router.take() {
            // An in-flight translation is allowed to complete; the store
            // gate drops its append.
            drain_router(router).await;
        }
    }

    async fn enter_stopped(&mut self) {
        self.teardown_run().await;
        self.replay.capture(&self.store);
    }

    /// Idempotent teardown of the current run, if any.
    async fn teardown_run(&mut self) {
        let Some(mut run) = self.run.take() else {
            return;
        };

        if let Some(mut recognizer) = run.recognizer.take() {
            recognizer.close().await;
        }
        if let Some(router) = run.router.take() {
            drain_router(router).await;
        }

        match run.capture.finalize().await {
            Ok(artifact) => {
                let _ = self.artifact_tx.send(artifact);
            }
            Err(e) => error!("Failed to finalize recording: {}", e),
        }
    }
}

/// Bound on waiting for the router to drain its last event at close.
const ROUTER_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Wait for the router to finish its in-flight utterance. Bounded, so a
/// hung translation backend cannot stall transition processing; on timeout
/// the router is aborted and no stale utterance can append into a later
/// run.
async fn drain_router(mut router: JoinHandle<()>) {
    if tokio::time::timeout(ROUTER_DRAIN_TIMEOUT, &mut router)
        .await
        .is_err()
    {
        warn!("Transcript router did not drain in time; aborting it");
        router.abort();
    }
}

/// Single consumer of recognition events: translations are awaited per
/// utterance, so store insertion order always equals emission order
/// regardless of translation completion timing.
fn spawn_router(
    mut events: mpsc::Receiver<RecognitionEvent>,
    store: Arc<TranscriptStore>,
    pipeline: Arc<TranslationPipeline>,
    language: watch::Receiver<String>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                RecognitionEvent::Partial { text } => {
                    debug!("partial: {}", text);
                }
                RecognitionEvent::Final { text, speaker_id } => {
                    let text = text.trim();
                    if text.is_empty() {
                        continue;
                    }

                    // Target language is read at finalization time, not
                    // pinned to the utterance's start.
                    let target = language.borrow().clone();
                    let translated = pipeline.translate(text, &target).await;

                    match store.append(text, speaker_id, translated) {
                        Some(entry) => {
                            info!("[{}] {}", entry.speaker_label, entry.display_text());
                        }
                        None => {
                            warn!("Dropped utterance finalized outside an active recording");
                        }
                    }
                }
                RecognitionEvent::Error { message } => {
                    // No automatic retry; the session goes inert until the
                    // user stops and restarts.
                    warn!("Recognition error: {}", message);
                }
                RecognitionEvent::Closed => {
                    debug!("recognition event stream closed");
                    break;
                }
            }
        }
    })
}
