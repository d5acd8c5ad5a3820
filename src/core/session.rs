//! Playback state for a single track and its frequency analyser.
//!
//! Loading and resuming the output context are asynchronous in the browser, so
//! each is split into a request that hands out a ticket and a completion that
//! consumes it. Tickets carry the epoch they were issued in; `teardown` and a
//! fresh `begin_load` advance the epoch so late completions are dropped.

use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AudioError {
    #[error("fetch failed: {0}")]
    Fetch(String),
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("audio context: {0}")]
    Context(String),
    #[error("resume rejected: {0}")]
    Rejected(String),
    #[error("audio graph: {0}")]
    Graph(String),
}

/// Output side of the session: owns the nodes, knows nothing about state.
pub trait AudioBackend {
    /// Decoded audio ready to be attached.
    type Track;

    /// Attach a decoded track and build an analyser of `fft_size`; returns the bin count.
    fn attach(&mut self, track: Self::Track, fft_size: u32) -> Result<usize, AudioError>;
    fn read_frequencies(&mut self, out: &mut [u8]);
    fn start(&mut self) -> Result<(), AudioError>;
    fn pause(&mut self);
    /// Playback ran off the end of a non-looping track; forget the source and rewind.
    fn ended(&mut self);
    /// Stop and disconnect everything, dropping track and analyser.
    fn release(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Loading,
    Ready,
    /// Load or attach failed; playback and snapshots are no-ops.
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStatus {
    pub state: SessionState,
    pub is_playing: bool,
    pub is_loading: bool,
    pub has_analyser: bool,
}

impl SessionStatus {
    /// Status shown when no output context could be created at all.
    pub fn unavailable() -> Self {
        Self {
            state: SessionState::Unavailable,
            is_playing: false,
            is_loading: false,
            has_analyser: false,
        }
    }

    /// Short human-readable state for the page.
    pub fn label(&self) -> &'static str {
        match self.state {
            SessionState::Uninitialized => "No track",
            SessionState::Loading => "Loading…",
            SessionState::Unavailable => "Audio unavailable",
            SessionState::Ready if self.is_playing => "Playing",
            SessionState::Ready => "Paused",
        }
    }
}

/// Remembers the last status shown so the page is only touched on change.
#[derive(Debug, Default)]
pub struct StatusWatch {
    last: Option<SessionStatus>,
}

impl StatusWatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when `status` differs from the previous call.
    pub fn changed(&mut self, status: SessionStatus) -> bool {
        if self.last == Some(status) {
            return false;
        }
        self.last = Some(status);
        true
    }
}

/// Playhead after `elapsed` more seconds of playback.
///
/// Looping tracks wrap; others stop at `duration`.
pub fn advance_playhead(progress: f64, elapsed: f64, duration: f64, looping: bool) -> f64 {
    let p = (progress + elapsed.max(0.0)).max(0.0);
    if duration <= 0.0 {
        return 0.0;
    }
    if looping {
        p % duration
    } else {
        p.min(duration)
    }
}

/// Offset to start a fresh source at; a finished track starts over.
pub fn start_offset(progress: f64, duration: f64, looping: bool) -> f64 {
    if duration <= 0.0 || progress < 0.0 {
        return 0.0;
    }
    if looping {
        progress % duration
    } else if progress >= duration {
        0.0
    } else {
        progress
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    epoch: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayTicket {
    epoch: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Paused,
    /// Caller must resume the output context and report back via `finish_play`.
    ResumeRequested(PlayTicket),
    Ignored,
}

pub struct AudioSession<B: AudioBackend> {
    backend: B,
    state: SessionState,
    playing: bool,
    resume_pending: bool,
    fft_size: u32,
    bins: Vec<u8>,
    epoch: u32,
    source_path: Option<String>,
}

impl<B: AudioBackend> AudioSession<B> {
    pub fn new(backend: B, fft_size: u32) -> Self {
        Self {
            backend,
            state: SessionState::Uninitialized,
            playing: false,
            resume_pending: false,
            fft_size,
            bins: Vec::new(),
            epoch: 0,
            source_path: None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn has_analyser(&self) -> bool {
        !self.bins.is_empty()
    }

    pub fn source_path(&self) -> Option<&str> {
        self.source_path.as_deref()
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            state: self.state,
            is_playing: self.playing,
            is_loading: self.state == SessionState::Loading,
            has_analyser: self.has_analyser(),
        }
    }

    /// Start loading `path`. Re-initializing tears down whatever was there.
    pub fn begin_load(&mut self, path: &str) -> LoadTicket {
        if self.state != SessionState::Uninitialized {
            self.teardown();
        }
        self.state = SessionState::Loading;
        self.source_path = Some(path.to_string());
        log::info!("[audio] loading {}", path);
        LoadTicket { epoch: self.epoch }
    }

    /// Returns false when the ticket is stale and the result was dropped.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<B::Track, AudioError>,
    ) -> bool {
        if ticket.epoch != self.epoch || self.state != SessionState::Loading {
            log::debug!("[audio] dropping stale load completion");
            return false;
        }
        match result.and_then(|track| self.backend.attach(track, self.fft_size)) {
            Ok(bin_count) => {
                self.bins = vec![0; bin_count];
                self.state = SessionState::Ready;
                log::info!("[audio] ready, {} frequency bins", bin_count);
            }
            Err(e) => {
                self.bins.clear();
                self.state = SessionState::Unavailable;
                log::error!("[audio] load failed: {}; continuing without audio", e);
            }
        }
        true
    }

    pub fn request_play(&mut self) -> Option<PlayTicket> {
        if self.state != SessionState::Ready {
            log::info!("[audio] play ignored while {:?}", self.state);
            return None;
        }
        if self.playing || self.resume_pending {
            return None;
        }
        self.resume_pending = true;
        Some(PlayTicket { epoch: self.epoch })
    }

    /// Completes a `request_play` once the output context resume settled.
    pub fn finish_play(&mut self, ticket: PlayTicket, resumed: Result<(), AudioError>) {
        if ticket.epoch != self.epoch {
            log::debug!("[audio] dropping stale resume completion");
            return;
        }
        self.resume_pending = false;
        if self.state != SessionState::Ready || self.playing {
            return;
        }
        match resumed.and_then(|_| self.backend.start()) {
            Ok(()) => {
                self.playing = true;
                log::info!("[audio] playing");
            }
            Err(e) => log::error!("[audio] failed to start playback: {}", e),
        }
    }

    pub fn pause(&mut self) {
        if !self.playing {
            return;
        }
        self.backend.pause();
        self.playing = false;
        log::info!("[audio] paused");
    }

    /// The track finished on its own. The next play starts from the beginning.
    pub fn track_ended(&mut self) {
        if !self.playing {
            return;
        }
        self.backend.ended();
        self.playing = false;
        log::info!("[audio] track ended");
    }

    pub fn toggle(&mut self) -> Toggle {
        if self.playing {
            self.pause();
            return Toggle::Paused;
        }
        match self.request_play() {
            Some(t) => Toggle::ResumeRequested(t),
            None => Toggle::Ignored,
        }
    }

    /// Latest spectrum, or `None` until an analyser exists.
    pub fn frequency_snapshot(&mut self) -> Option<&[u8]> {
        if self.state != SessionState::Ready || self.bins.is_empty() {
            return None;
        }
        self.backend.read_frequencies(&mut self.bins);
        Some(&self.bins)
    }

    pub fn teardown(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
        if self.state == SessionState::Uninitialized {
            return;
        }
        self.backend.release();
        self.playing = false;
        self.resume_pending = false;
        self.bins = Vec::new();
        self.source_path = None;
        self.state = SessionState::Uninitialized;
        log::info!("[audio] torn down");
    }
}

/// Per-frame spectrum feed for the scene driver.
pub trait FrequencySource {
    /// Copy the latest spectrum into `out`; false when none is available.
    fn snapshot_into(&self, out: &mut Vec<u8>) -> bool;

    fn is_playing(&self) -> bool;
}

impl<B: AudioBackend> FrequencySource for Rc<RefCell<AudioSession<B>>> {
    fn snapshot_into(&self, out: &mut Vec<u8>) -> bool {
        let Ok(mut session) = self.try_borrow_mut() else {
            return false;
        };
        match session.frequency_snapshot() {
            Some(bins) => {
                out.clear();
                out.extend_from_slice(bins);
                true
            }
            None => false,
        }
    }

    fn is_playing(&self) -> bool {
        self.try_borrow().map(|s| s.is_playing()).unwrap_or(false)
    }
}
