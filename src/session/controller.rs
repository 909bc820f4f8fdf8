use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::info;

use crate::capture::{AudioArtifact, AudioBackendFactory};
use crate::config::Config;
use crate::language::language_code;
use crate::recognition::RecognizerConnector;
use crate::transcript::{TranscriptEntry, TranscriptStore};
use crate::translation::TranslationPipeline;

use super::orchestrator::Orchestrator;
use super::replay::ReplayEngine;
use super::state::{SessionState, StateMachine};

/// User-facing command surface over the session core.
///
/// Owns the lifecycle of the state machine, the orchestrator task, the
/// transcript store and the replay engine. Backends are injected so tests
/// can substitute scripted ones.
pub struct MeetingController {
    machine: Arc<StateMachine>,
    store: Arc<TranscriptStore>,
    replay: Arc<ReplayEngine>,
    language: watch::Sender<String>,
    orchestrator: Option<JoinHandle<()>>,
}

impl MeetingController {
    /// Build the session core and spawn its orchestrator. The returned
    /// receiver yields one audio artifact per completed recording run.
    pub fn new(
        config: &Config,
        audio_factory: Arc<dyn AudioBackendFactory>,
        connector: Arc<dyn RecognizerConnector>,
        pipeline: TranslationPipeline,
    ) -> (Self, mpsc::UnboundedReceiver<AudioArtifact>) {
        let (machine, transitions) =
            StateMachine::new(Duration::from_millis(config.session.settle_delay_ms));
        let store = Arc::new(TranscriptStore::new(machine.subscribe()));
        let replay = Arc::new(ReplayEngine::new(Duration::from_millis(
            config.session.replay_interval_ms,
        )));
        let (language, language_rx) =
            watch::channel(language_code(&config.session.default_language).to_string());
        let (artifact_tx, artifact_rx) = mpsc::unbounded_channel();

        let orchestrator = Orchestrator::new(
            Arc::clone(&machine),
            Arc::clone(&store),
            Arc::clone(&replay),
            Arc::new(pipeline),
            audio_factory,
            connector,
            language_rx,
            &config.audio,
            &config.recognition,
            artifact_tx,
        );

        let controller = Self {
            machine,
            store,
            replay,
            language,
            orchestrator: Some(tokio::spawn(orchestrator.run(transitions))),
        };

        (controller, artifact_rx)
    }

    pub fn start(&self) -> bool {
        self.machine.start()
    }

    pub fn pause(&self) -> bool {
        self.machine.pause()
    }

    pub fn stop(&self) -> bool {
        self.machine.stop()
    }

    /// Trigger a replay of the last stopped session. Runs in the
    /// background; a no-op when nothing was captured or a replay is
    /// already playing.
    pub fn replay(&self) {
        let replay = Arc::clone(&self.replay);
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            replay.play(&store).await;
        });
    }

    /// Select the target language by catalog name or code. Takes effect
    /// for utterances finalized from now on.
    pub fn set_language(&self, name: &str) {
        let code = language_code(name);
        info!("Target language set to {}", code);
        let _ = self.language.send(code.to_string());
    }

    pub fn language(&self) -> String {
        self.language.borrow().clone()
    }

    pub fn state(&self) -> SessionState {
        self.machine.state()
    }

    pub fn transcripts(&self) -> Vec<TranscriptEntry> {
        self.store.snapshot()
    }

    /// The replay buffer captured at the last Stop
    pub fn replay_buffer(&self) -> Vec<TranscriptEntry> {
        self.replay.captured()
    }

    pub fn store(&self) -> Arc<TranscriptStore> {
        Arc::clone(&self.store)
    }

    /// Stop any active run and wait for the orchestrator to release all
    /// resources.
    pub async fn shutdown(mut self) {
        self.machine.stop();
        self.machine.close();

        if let Some(orchestrator) = self.orchestrator.take() {
            let _ = orchestrator.await;
        }
    }
}
