use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Recording,
    Paused,
    Stopped,
}

/// One state transition, as delivered to the orchestrator
#[derive(Debug, Clone, Copy)]
pub struct Transition {
    pub from: SessionState,
    pub to: SessionState,
}

/// The session state machine.
///
/// Holds no resource handles; all side effects are delegated to the
/// orchestrator through the transition channel. Commands issued from a
/// disallowed state are no-ops, even when presentation-layer guards are
/// bypassed.
pub struct StateMachine {
    state: watch::Sender<SessionState>,
    settle_delay: Duration,
    // Handle to ourselves for the spawned settle-delay task
    weak: Weak<StateMachine>,
    inner: Mutex<Inner>,
}

struct Inner {
    transitions: Option<mpsc::UnboundedSender<Transition>>,
    settle_task: Option<JoinHandle<()>>,
}

impl StateMachine {
    /// Create the machine and the transition stream the orchestrator
    /// consumes. `settle_delay` is the pause after Stop before the session
    /// auto-resets to Idle.
    pub fn new(settle_delay: Duration) -> (Arc<Self>, mpsc::UnboundedReceiver<Transition>) {
        let (transitions, rx) = mpsc::unbounded_channel();
        let (state, _) = watch::channel(SessionState::Idle);

        let machine = Arc::new_cyclic(|weak| Self {
            state,
            settle_delay,
            weak: weak.clone(),
            inner: Mutex::new(Inner {
                transitions: Some(transitions),
                settle_task: None,
            }),
        });

        (machine, rx)
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Observe the current state (used by the transcript store's write gate)
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Begin (or resume) recording. Allowed from any non-Recording state.
    pub fn start(&self) -> bool {
        let mut inner = self.inner.lock().unwrap();

        if self.state() == SessionState::Recording {
            debug!("start ignored: already recording");
            return false;
        }

        // A fast restart must not let a stale settle timer reset the session
        if let Some(task) = inner.settle_task.take() {
            task.abort();
        }

        self.apply(&inner, SessionState::Recording);
        true
    }

    /// Pause recording. Allowed only while recording.
    pub fn pause(&self) -> bool {
        let inner = self.inner.lock().unwrap();

        if self.state() != SessionState::Recording {
            debug!("pause ignored in state {:?}", self.state());
            return false;
        }

        self.apply(&inner, SessionState::Paused);
        true
    }

    /// Stop the session. Allowed from Recording or Paused. After the settle
    /// delay the session auto-resets to Idle.
    pub fn stop(&self) -> bool {
        let mut inner = self.inner.lock().unwrap();

        if !matches!(self.state(), SessionState::Recording | SessionState::Paused) {
            debug!("stop ignored in state {:?}", self.state());
            return false;
        }

        self.apply(&inner, SessionState::Stopped);

        if let Some(machine) = self.weak.upgrade() {
            inner.settle_task = Some(tokio::spawn(async move {
                tokio::time::sleep(machine.settle_delay).await;
                machine.settle_to_idle();
            }));
        }

        true
    }

    fn settle_to_idle(&self) {
        let inner = self.inner.lock().unwrap();
        if self.state() == SessionState::Stopped {
            self.apply(&inner, SessionState::Idle);
        }
    }

    /// Force the state back after a failed transition side effect
    /// (e.g. microphone denied while entering Recording).
    pub(crate) fn revert(&self, to: SessionState) {
        let inner = self.inner.lock().unwrap();
        self.apply(&inner, to);
    }

    /// Stop notifying the orchestrator; used at process shutdown so its
    /// run loop can drain and exit.
    pub(crate) fn close(&self) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(task) = inner.settle_task.take() {
            task.abort();
        }
        inner.transitions = None;
    }

    fn apply(&self, inner: &Inner, to: SessionState) {
        let from = self.state();
        self.state.send_replace(to);
        info!("session state: {:?} -> {:?}", from, to);

        if let Some(transitions) = &inner.transitions {
            let _ = transitions.send(Transition { from, to });
        }
    }
}
