use base64::Engine;
use futures::stream::StreamExt;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use crate::capture::AudioFrame;
use crate::config::RecognitionConfig;
use crate::error::SessionError;

use super::backend::{RecognitionEvent, RecognitionSession, RecognizerConnector};
use super::messages::{AudioFrameMessage, TranscriptMessage};

/// NATS-backed streaming recognizer.
///
/// Publishes the run's PCM frames to `{subject_prefix}.{session_id}` and
/// consumes diarized transcript events from the transcript subject,
/// filtered by session id.
pub struct NatsRecognizer {
    config: RecognitionConfig,
}

impl NatsRecognizer {
    pub fn new(config: RecognitionConfig) -> Self {
        Self { config }
    }
}

#[async_trait::async_trait]
impl RecognizerConnector for NatsRecognizer {
    async fn connect(
        &self,
        locale: &str,
        frames: broadcast::Receiver<AudioFrame>,
        events: mpsc::Sender<RecognitionEvent>,
    ) -> Result<Box<dyn RecognitionSession>, SessionError> {
        let Some(url) = self.config.url.clone() else {
            return Err(SessionError::Configuration(
                "recognition backend URL is not configured".to_string(),
            ));
        };

        let client = async_nats::connect(&url)
            .await
            .map_err(|e| SessionError::Recognition(format!("failed to connect to {}: {}", url, e)))?;

        let session_id = format!("run-{}", Uuid::new_v4());
        let subject = format!("{}.{}", self.config.subject_prefix, session_id);

        let subscriber = client
            .subscribe(self.config.transcript_subject.clone())
            .await
            .map_err(|e| SessionError::Recognition(format!("failed to subscribe: {}", e)))?;

        info!(
            "Recognition session opened: {} (locale={}, subject={})",
            session_id, locale, subject
        );

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let publisher = tokio::spawn(publish_frames(
            client,
            subject,
            session_id.clone(),
            locale.to_string(),
            frames,
            shutdown_rx,
        ));
        let consumer = tokio::spawn(consume_transcripts(
            subscriber,
            session_id,
            events.clone(),
        ));

        Ok(Box::new(NatsSession {
            events: Some(events),
            shutdown: Some(shutdown_tx),
            publisher: Some(publisher),
            consumer: Some(consumer),
        }))
    }
}

struct NatsSession {
    events: Option<mpsc::Sender<RecognitionEvent>>,
    shutdown: Option<oneshot::Sender<()>>,
    publisher: Option<JoinHandle<()>>,
    consumer: Option<JoinHandle<()>>,
}

#[async_trait::async_trait]
impl RecognitionSession for NatsSession {
    async fn close(&mut self) {
        let Some(events) = self.events.take() else {
            return;
        };

        // The publisher exits its loop on the shutdown signal and then
        // publishes the final-frame marker, so it must be signaled and
        // awaited, never aborted. Only the consumer is cut off hard.
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(publisher) = self.publisher.take() {
            let _ = publisher.await;
        }
        if let Some(consumer) = self.consumer.take() {
            consumer.abort();
        }

        let _ = events.send(RecognitionEvent::Closed).await;
        info!("Recognition session closed");
    }
}

/// Outbound leg of the NATS client, kept behind a trait so the frame
/// publisher's drain protocol is testable without a broker.
#[async_trait::async_trait]
trait FramePublisher: Send + Sync {
    async fn publish(&self, subject: String, payload: Vec<u8>);
}

#[async_trait::async_trait]
impl FramePublisher for async_nats::Client {
    async fn publish(&self, subject: String, payload: Vec<u8>) {
        if let Err(e) = async_nats::Client::publish(self, subject, payload.into()).await {
            warn!("Failed to publish audio frame: {}", e);
        }
    }
}

async fn publish_frames(
    client: impl FramePublisher,
    subject: String,
    session_id: String,
    locale: String,
    mut frames: broadcast::Receiver<AudioFrame>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let mut sequence: u32 = 0;

    loop {
        let frame = tokio::select! {
            _ = &mut shutdown => break,
            frame = frames.recv() => frame,
        };

        match frame {
            Ok(frame) => {
                let pcm_bytes: Vec<u8> =
                    frame.samples.iter().flat_map(|s| s.to_le_bytes()).collect();

                let message = AudioFrameMessage {
                    session_id: session_id.clone(),
                    sequence,
                    locale: locale.clone(),
                    pcm: base64::engine::general_purpose::STANDARD.encode(&pcm_bytes),
                    sample_rate: frame.sample_rate,
                    channels: frame.channels,
                    timestamp: chrono::Utc::now().to_rfc3339(),
                    final_frame: false,
                };

                match serde_json::to_vec(&message) {
                    Ok(payload) => client.publish(subject.clone(), payload).await,
                    Err(e) => warn!("Failed to encode audio frame: {}", e),
                }

                sequence += 1;
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!("Recognizer fell {} frames behind the capture stream", n);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }

    // Final marker lets the backend flush its last hypothesis
    let message = AudioFrameMessage {
        session_id,
        sequence,
        locale,
        pcm: String::new(),
        sample_rate: 0,
        channels: 0,
        timestamp: chrono::Utc::now().to_rfc3339(),
        final_frame: true,
    };

    if let Ok(payload) = serde_json::to_vec(&message) {
        client.publish(subject, payload).await;
    }
}

async fn consume_transcripts(
    mut subscriber: async_nats::Subscriber,
    session_id: String,
    events: mpsc::Sender<RecognitionEvent>,
) {
    while let Some(msg) = subscriber.next().await {
        let transcript = match serde_json::from_slice::<TranscriptMessage>(&msg.payload) {
            Ok(t) => t,
            Err(e) => {
                warn!("Failed to parse transcript message: {}", e);
                continue;
            }
        };

        if transcript.session_id != session_id {
            continue;
        }

        let event = if let Some(message) = transcript.error {
            RecognitionEvent::Error { message }
        } else if transcript.partial {
            RecognitionEvent::Partial {
                text: transcript.text,
            }
        } else {
            RecognitionEvent::Final {
                text: transcript.text,
                speaker_id: transcript.speaker_id,
            }
        };

        if events.send(event).await.is_err() {
            break;
        }
    }

    let _ = events.send(RecognitionEvent::Closed).await;
}
