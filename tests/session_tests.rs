// Host-side tests for the audio session state machine, driven through a fake backend.

use spectral_corridor::core::*;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Default)]
struct FakeBackend {
    attached: Option<&'static str>,
    fail_attach: bool,
    fail_start: bool,
    level: u8,
    starts: u32,
    pauses: u32,
    ends: u32,
    releases: u32,
}

impl AudioBackend for FakeBackend {
    type Track = &'static str;

    fn attach(&mut self, track: &'static str, fft_size: u32) -> Result<usize, AudioError> {
        if self.fail_attach {
            return Err(AudioError::Graph("no analyser".into()));
        }
        self.attached = Some(track);
        Ok(fft_size as usize / 2)
    }

    fn read_frequencies(&mut self, out: &mut [u8]) {
        out.fill(self.level);
    }

    fn start(&mut self) -> Result<(), AudioError> {
        if self.fail_start {
            return Err(AudioError::Graph("start".into()));
        }
        self.starts += 1;
        Ok(())
    }

    fn pause(&mut self) {
        self.pauses += 1;
    }

    fn ended(&mut self) {
        self.ends += 1;
    }

    fn release(&mut self) {
        self.attached = None;
        self.releases += 1;
    }
}

fn ready_session() -> AudioSession<FakeBackend> {
    let mut s = AudioSession::new(FakeBackend::default(), 2048);
    let t = s.begin_load("track.mp3");
    assert!(s.complete_load(t, Ok("track")));
    s
}

#[test]
fn fresh_session_is_idle() {
    let mut s = AudioSession::new(FakeBackend::default(), 2048);
    assert_eq!(s.state(), SessionState::Uninitialized);
    assert!(!s.is_playing());
    assert!(!s.has_analyser());
    assert!(s.frequency_snapshot().is_none());
    assert_eq!(s.status().label(), "No track");
}

#[test]
fn load_reports_loading_then_ready() {
    let mut s = AudioSession::new(FakeBackend::default(), 2048);
    let t = s.begin_load("a.mp3");
    assert!(s.status().is_loading);
    assert_eq!(s.source_path(), Some("a.mp3"));
    assert!(s.complete_load(t, Ok("a")));
    let st = s.status();
    assert_eq!(st.state, SessionState::Ready);
    assert!(!st.is_loading);
    assert!(st.has_analyser);
    assert_eq!(st.label(), "Paused");
    assert_eq!(s.frequency_snapshot().map(|b| b.len()), Some(1024));
}

#[test]
fn play_requires_resume_then_starts() {
    let mut s = ready_session();
    let ticket = s.request_play().expect("ticket");
    assert!(!s.is_playing());
    // A second request while the first is pending is ignored
    assert!(s.request_play().is_none());
    s.finish_play(ticket, Ok(()));
    assert!(s.is_playing());
    assert_eq!(s.backend().starts, 1);
    assert_eq!(s.status().label(), "Playing");
    assert!(s.request_play().is_none());
}

#[test]
fn play_before_ready_is_ignored() {
    let mut s = AudioSession::new(FakeBackend::default(), 2048);
    assert!(s.request_play().is_none());
    s.begin_load("a.mp3");
    assert!(s.request_play().is_none());
    assert_eq!(s.toggle(), Toggle::Ignored);
    assert_eq!(s.backend().starts, 0);
}

#[test]
fn rejected_resume_leaves_session_paused() {
    let mut s = ready_session();
    let t = s.request_play().unwrap();
    s.finish_play(t, Err(AudioError::Rejected("NotAllowedError".into())));
    assert!(!s.is_playing());
    assert_eq!(s.backend().starts, 0);
    // The next attempt is allowed
    let t = s.request_play().unwrap();
    s.finish_play(t, Ok(()));
    assert!(s.is_playing());
}

#[test]
fn failed_start_leaves_session_paused() {
    let backend = FakeBackend {
        fail_start: true,
        ..FakeBackend::default()
    };
    let mut s = AudioSession::new(backend, 2048);
    let t = s.begin_load("a.mp3");
    s.complete_load(t, Ok("a"));
    let t = s.request_play().unwrap();
    s.finish_play(t, Ok(()));
    assert!(!s.is_playing());
    assert!(s.request_play().is_some());
}

#[test]
fn toggle_alternates() {
    let mut s = ready_session();
    let Toggle::ResumeRequested(t) = s.toggle() else {
        panic!("expected resume request");
    };
    s.finish_play(t, Ok(()));
    assert!(s.is_playing());
    assert_eq!(s.toggle(), Toggle::Paused);
    assert!(!s.is_playing());
    assert_eq!(s.backend().pauses, 1);
    // pause while paused does nothing
    s.pause();
    assert_eq!(s.backend().pauses, 1);
}

#[test]
fn load_failure_degrades_to_unavailable() {
    let mut s = AudioSession::new(FakeBackend::default(), 2048);
    let t = s.begin_load("missing.mp3");
    assert!(s.complete_load(t, Err(AudioError::Fetch("404".into()))));
    assert_eq!(s.state(), SessionState::Unavailable);
    assert!(!s.has_analyser());
    assert!(s.frequency_snapshot().is_none());
    assert!(s.request_play().is_none());
    assert_eq!(s.status().label(), "Audio unavailable");
}

#[test]
fn attach_failure_degrades_to_unavailable() {
    let backend = FakeBackend {
        fail_attach: true,
        ..FakeBackend::default()
    };
    let mut s = AudioSession::new(backend, 2048);
    let t = s.begin_load("a.mp3");
    s.complete_load(t, Ok("a"));
    assert_eq!(s.state(), SessionState::Unavailable);
}

#[test]
fn stale_load_is_dropped_after_teardown() {
    let mut s = AudioSession::new(FakeBackend::default(), 2048);
    let t = s.begin_load("a.mp3");
    s.teardown();
    assert!(!s.complete_load(t, Ok("a")));
    assert_eq!(s.state(), SessionState::Uninitialized);
    assert!(s.backend().attached.is_none());
}

#[test]
fn reload_supersedes_pending_load() {
    let mut s = AudioSession::new(FakeBackend::default(), 2048);
    let first = s.begin_load("a.mp3");
    let second = s.begin_load("b.mp3");
    assert!(!s.complete_load(first, Ok("a")));
    assert!(s.complete_load(second, Ok("b")));
    assert_eq!(s.backend().attached, Some("b"));
    assert_eq!(s.source_path(), Some("b.mp3"));
}

#[test]
fn stale_resume_does_not_start() {
    let mut s = ready_session();
    let t = s.request_play().unwrap();
    s.teardown();
    s.finish_play(t, Ok(()));
    assert!(!s.is_playing());
    assert_eq!(s.backend().starts, 0);
}

#[test]
fn teardown_is_idempotent() {
    let mut s = ready_session();
    let t = s.request_play().unwrap();
    s.finish_play(t, Ok(()));
    s.teardown();
    s.teardown();
    assert_eq!(s.backend().releases, 1);
    assert_eq!(s.state(), SessionState::Uninitialized);
    assert!(!s.is_playing());
    assert!(!s.has_analyser());
    assert!(s.source_path().is_none());
}

#[test]
fn snapshot_reflects_backend_levels() {
    let backend = FakeBackend {
        level: 200,
        ..FakeBackend::default()
    };
    let mut s = AudioSession::new(backend, 64);
    let t = s.begin_load("a.mp3");
    s.complete_load(t, Ok("a"));
    let shared = Rc::new(RefCell::new(s));
    let mut out = Vec::new();
    assert!(shared.snapshot_into(&mut out));
    assert_eq!(out, vec![200; 32]);
    assert!(!FrequencySource::is_playing(&shared));
}

#[test]
fn shared_source_yields_nothing_while_borrowed() {
    let shared = Rc::new(RefCell::new(ready_session()));
    let guard = shared.borrow_mut();
    let mut out = vec![7];
    assert!(!shared.snapshot_into(&mut out));
    assert_eq!(out, vec![7]);
    drop(guard);
    assert!(shared.snapshot_into(&mut out));
}

#[test]
fn natural_end_stops_playback_and_rewinds() {
    let mut s = ready_session();
    let t = s.request_play().unwrap();
    s.finish_play(t, Ok(()));
    s.track_ended();
    assert!(!s.is_playing());
    assert_eq!(s.backend().ends, 1);
    // The next toggle plays again rather than pausing a finished track
    assert!(matches!(s.toggle(), Toggle::ResumeRequested(_)));
    assert_eq!(s.backend().pauses, 0);
}

#[test]
fn end_while_paused_is_ignored() {
    let mut s = ready_session();
    s.track_ended();
    assert_eq!(s.backend().ends, 0);
    assert!(!s.is_playing());
}

#[test]
fn playhead_stops_at_end_without_loop() {
    // 180 s track, paused after 200 s of wall time
    assert_eq!(advance_playhead(0.0, 200.0, 180.0, false), 180.0);
    assert_eq!(start_offset(180.0, 180.0, false), 0.0);
    assert_eq!(advance_playhead(30.0, 15.0, 180.0, false), 45.0);
    assert_eq!(start_offset(45.0, 180.0, false), 45.0);
}

#[test]
fn playhead_wraps_when_looping() {
    assert_eq!(advance_playhead(0.0, 200.0, 180.0, true), 20.0);
    assert_eq!(start_offset(200.0, 180.0, true), 20.0);
}

#[test]
fn playhead_handles_empty_track_and_clock_skew() {
    assert_eq!(advance_playhead(5.0, 1.0, 0.0, false), 0.0);
    assert_eq!(start_offset(5.0, 0.0, true), 0.0);
    assert_eq!(advance_playhead(10.0, -3.0, 180.0, false), 10.0);
    assert_eq!(start_offset(-1.0, 180.0, false), 0.0);
}

#[test]
fn missing_output_context_reports_unavailable() {
    let st = SessionStatus::unavailable();
    assert_eq!(st.state, SessionState::Unavailable);
    assert!(!st.is_playing && !st.is_loading && !st.has_analyser);
    assert_eq!(st.label(), "Audio unavailable");
}

#[test]
fn status_watch_reports_only_changes() {
    let mut s = ready_session();
    let mut watch = StatusWatch::new();
    assert!(watch.changed(s.status()));
    assert!(!watch.changed(s.status()));
    assert!(!watch.changed(s.status()));
    let t = s.request_play().unwrap();
    s.finish_play(t, Ok(()));
    assert!(watch.changed(s.status()));
    assert!(!watch.changed(s.status()));
}
