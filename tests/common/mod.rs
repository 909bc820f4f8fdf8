// Shared scripted backends for the session integration tests.
//
// These stand in for the microphone, the streaming recognizer and the
// translation backend, counting opens/closes so tests can assert that
// repeated start/pause/stop cycles leak no handles.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};

use polyglot_meetings::{
    AudioArtifact, AudioBackend, AudioBackendConfig, AudioBackendFactory, AudioFrame, Config,
    MeetingController, RecognitionEvent, RecognitionSession, RecognizerConnector, SessionError,
    TranslationPipeline, Translator,
};
use tempfile::TempDir;

/// Audio backend fed from a fixed list of frames
pub struct ScriptedAudioBackend {
    preload: Vec<AudioFrame>,
    tx: Option<mpsc::Sender<AudioFrame>>,
    started: Arc<AtomicUsize>,
    stopped: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl AudioBackend for ScriptedAudioBackend {
    async fn start(&mut self) -> anyhow::Result<mpsc::Receiver<AudioFrame>> {
        self.started.fetch_add(1, Ordering::SeqCst);

        let (tx, rx) = mpsc::channel(self.preload.len().max(1) + 1);
        for frame in &self.preload {
            tx.try_send(frame.clone()).ok();
        }
        self.tx = Some(tx);

        Ok(rx)
    }

    async fn stop(&mut self) -> anyhow::Result<()> {
        if self.tx.take().is_some() {
            self.stopped.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.tx.is_some()
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

#[derive(Clone, Default)]
pub struct AudioCounters {
    pub created: Arc<AtomicUsize>,
    pub started: Arc<AtomicUsize>,
    pub stopped: Arc<AtomicUsize>,
}

impl AudioCounters {
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn stopped(&self) -> usize {
        self.stopped.load(Ordering::SeqCst)
    }
}

pub struct CountingAudioFactory {
    pub counters: AudioCounters,
    pub fail: bool,
    pub preload: Vec<AudioFrame>,
}

impl AudioBackendFactory for CountingAudioFactory {
    fn create(&self, _config: &AudioBackendConfig) -> anyhow::Result<Box<dyn AudioBackend>> {
        if self.fail {
            anyhow::bail!("microphone access denied");
        }

        self.counters.created.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(ScriptedAudioBackend {
            preload: self.preload.clone(),
            tx: None,
            started: Arc::clone(&self.counters.started),
            stopped: Arc::clone(&self.counters.stopped),
        }))
    }
}

/// Recognition connector whose sessions are driven by the test
pub struct MockConnector {
    pub connects: AtomicUsize,
    pub closes: Arc<AtomicUsize>,
    sessions: Mutex<Vec<mpsc::Sender<RecognitionEvent>>>,
    pub configuration_error: bool,
}

impl MockConnector {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            connects: AtomicUsize::new(0),
            closes: Arc::new(AtomicUsize::new(0)),
            sessions: Mutex::new(Vec::new()),
            configuration_error: false,
        })
    }

    pub fn unconfigured() -> Arc<Self> {
        Arc::new(Self {
            connects: AtomicUsize::new(0),
            closes: Arc::new(AtomicUsize::new(0)),
            sessions: Mutex::new(Vec::new()),
            configuration_error: true,
        })
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    /// Emit an event on the most recently opened session
    pub async fn emit(&self, event: RecognitionEvent) {
        let tx = self
            .sessions
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no recognition session opened");
        tx.send(event).await.expect("event router is gone");
    }

    pub async fn emit_final(&self, text: &str, speaker_id: u32) {
        self.emit(RecognitionEvent::Final {
            text: text.to_string(),
            speaker_id,
        })
        .await;
    }
}

#[async_trait::async_trait]
impl RecognizerConnector for MockConnector {
    async fn connect(
        &self,
        _locale: &str,
        _frames: broadcast::Receiver<AudioFrame>,
        events: mpsc::Sender<RecognitionEvent>,
    ) -> Result<Box<dyn RecognitionSession>, SessionError> {
        if self.configuration_error {
            return Err(SessionError::Configuration(
                "speech key or region missing".to_string(),
            ));
        }

        self.connects.fetch_add(1, Ordering::SeqCst);
        self.sessions.lock().unwrap().push(events.clone());

        Ok(Box::new(MockSession {
            events: Some(events),
            closes: Arc::clone(&self.closes),
        }))
    }
}

pub struct MockSession {
    events: Option<mpsc::Sender<RecognitionEvent>>,
    closes: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl RecognitionSession for MockSession {
    async fn close(&mut self) {
        let Some(events) = self.events.take() else {
            return;
        };
        self.closes.fetch_add(1, Ordering::SeqCst);
        let _ = events.send(RecognitionEvent::Closed).await;
    }
}

/// Translator with per-text latency and optional failure
pub struct MockTranslator {
    pub calls: AtomicUsize,
    pub fail: bool,
    latencies: Mutex<HashMap<String, Duration>>,
}

impl MockTranslator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail: false,
            latencies: Mutex::new(HashMap::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail: true,
            latencies: Mutex::new(HashMap::new()),
        })
    }

    pub fn set_latency(&self, text: &str, latency: Duration) {
        self.latencies
            .lock()
            .unwrap()
            .insert(text.to_string(), latency);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Translator for MockTranslator {
    async fn translate(&self, text: &str, target: &str) -> Result<String, SessionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let latency = self.latencies.lock().unwrap().get(text).copied();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        if self.fail {
            return Err(SessionError::Translation("backend unavailable".to_string()));
        }

        Ok(format!("{}::{}", text, target))
    }
}

pub struct Harness {
    pub controller: MeetingController,
    pub artifacts: mpsc::UnboundedReceiver<AudioArtifact>,
    pub connector: Arc<MockConnector>,
    pub audio: AudioCounters,
    _recordings: TempDir,
}

pub fn harness(connector: Arc<MockConnector>, translator: Option<Arc<MockTranslator>>) -> Harness {
    harness_with(connector, translator, false)
}

pub fn harness_with(
    connector: Arc<MockConnector>,
    translator: Option<Arc<MockTranslator>>,
    audio_fails: bool,
) -> Harness {
    let recordings = TempDir::new().expect("tempdir");

    let mut config = Config::default();
    config.audio.recordings_path = recordings.path().to_string_lossy().to_string();

    let counters = AudioCounters::default();
    let factory = Arc::new(CountingAudioFactory {
        counters: counters.clone(),
        fail: audio_fails,
        preload: Vec::new(),
    });

    let pipeline = match translator {
        Some(translator) => TranslationPipeline::new(translator),
        None => TranslationPipeline::disabled(),
    };

    let session_connector: Arc<dyn RecognizerConnector> = connector.clone();
    let (controller, artifacts) =
        MeetingController::new(&config, factory, session_connector, pipeline);

    Harness {
        controller,
        artifacts,
        connector,
        audio: counters,
        _recordings: recordings,
    }
}

/// Let the orchestrator process queued transitions without advancing time
pub async fn drain() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}

/// Wait (in virtual time, under a paused clock) until `cond` holds
pub async fn eventually(mut cond: impl FnMut() -> bool) {
    for _ in 0..2000 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition was not reached in time");
}
