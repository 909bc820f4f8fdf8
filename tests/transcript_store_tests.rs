// Unit tests for the transcript store
//
// Appends are gated on the Recording state; entries never reorder or
// mutate after insertion; replay writes bypass the gate deliberately.

use polyglot_meetings::{speaker_label, SessionState, TranscriptStore};
use tokio::sync::watch;

fn store_in(state: SessionState) -> (watch::Sender<SessionState>, TranscriptStore) {
    let (tx, rx) = watch::channel(state);
    (tx, TranscriptStore::new(rx))
}

#[test]
fn test_append_while_recording() {
    let (_state, store) = store_in(SessionState::Recording);

    let entry = store
        .append("hello everyone", 0, Some("sabko namaste".to_string()))
        .expect("append accepted");

    assert_eq!(entry.source_text, "hello everyone");
    assert_eq!(entry.translated_text.as_deref(), Some("sabko namaste"));
    assert_eq!(entry.speaker_id, 0);
    assert_eq!(entry.speaker_label, "Speaker 1");
    assert_eq!(store.len(), 1);
}

#[test]
fn test_append_rejected_outside_recording() {
    for state in [
        SessionState::Idle,
        SessionState::Paused,
        SessionState::Stopped,
    ] {
        let (_state, store) = store_in(state);
        assert!(store.append("dropped", 0, None).is_none());
        assert!(store.is_empty());
    }
}

#[test]
fn test_append_rejected_after_pause() {
    let (state, store) = store_in(SessionState::Recording);

    assert!(store.append("first", 0, None).is_some());

    state.send(SessionState::Paused).unwrap();
    assert!(store.append("second", 0, None).is_none());

    // Only the pre-pause entry remains
    let snapshot = store.snapshot();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].source_text, "first");
}

#[test]
fn test_entries_keep_insertion_order() {
    let (_state, store) = store_in(SessionState::Recording);

    store.append("a", 0, None);
    store.append("b", 1, None);
    store.append("c", 0, None);

    let texts: Vec<_> = store
        .snapshot()
        .iter()
        .map(|e| e.source_text.clone())
        .collect();
    assert_eq!(texts, ["a", "b", "c"]);
}

#[test]
fn test_snapshot_is_point_in_time() {
    let (_state, store) = store_in(SessionState::Recording);

    store.append("a", 0, None);
    let snapshot = store.snapshot();

    store.append("b", 0, None);
    assert_eq!(snapshot.len(), 1);
    assert_eq!(store.len(), 2);
}

#[test]
fn test_replay_append_bypasses_gate_and_mints_fresh_identity() {
    let (state, store) = store_in(SessionState::Recording);

    let original = store
        .append("hello", 2, Some("namaste".to_string()))
        .expect("append accepted");

    // Replay happens outside of recording
    state.send(SessionState::Idle).unwrap();
    store.clear();

    let replayed = store.replay_append(&original);

    assert_ne!(replayed.id, original.id);
    assert_eq!(replayed.source_text, original.source_text);
    assert_eq!(replayed.translated_text, original.translated_text);
    assert_eq!(replayed.speaker_id, original.speaker_id);
    assert_eq!(store.len(), 1);
}

#[test]
fn test_speaker_labels_are_one_based() {
    assert_eq!(speaker_label(0), "Speaker 1");
    assert_eq!(speaker_label(3), "Speaker 4");
}
