//! Session orchestration
//!
//! This module ties the three asynchronous subsystems together:
//! - `StateMachine`: the {Idle, Recording, Paused, Stopped} command gate;
//!   owns no resources, only transition rules and notifications
//! - `Orchestrator`: reacts to transitions by opening/tearing down the
//!   capture unit and recognition session, and routes finalization events
//!   through translation into the transcript store
//! - `ReplayEngine`: snapshots the store at Stop and re-emits it on demand
//! - `MeetingController`: the user-facing command surface

mod controller;
mod orchestrator;
mod replay;
mod state;

pub use controller::MeetingController;
pub use orchestrator::Orchestrator;
pub use replay::ReplayEngine;
pub use state::{SessionState, StateMachine, Transition};
