use crate::core::{
    advance_playhead, start_offset, AudioBackend, AudioError, AudioSession, PlayTicket, Toggle,
};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys as web;

pub type WebAudioSession = AudioSession<WebAudioBackend>;

fn js_err(e: wasm_bindgen::JsValue) -> String {
    format!("{:?}", e)
}

fn create_gain(audio_ctx: &web::AudioContext, value: f32) -> Result<web::GainNode, AudioError> {
    let g = web::GainNode::new(audio_ctx).map_err(|e| AudioError::Graph(js_err(e)))?;
    g.gain().set_value(value);
    Ok(g)
}

/// Track source → output gain → destination, with the analyser tapping the gain.
///
/// Buffer sources are one-shot, so pausing stops the node and remembers the
/// playhead; `start` builds a fresh source at that offset.
pub struct WebAudioBackend {
    audio_ctx: web::AudioContext,
    output: web::GainNode,
    loop_track: bool,
    buffer: Option<web::AudioBuffer>,
    analyser: Option<web::AnalyserNode>,
    source: Option<web::AudioBufferSourceNode>,
    on_ended: Option<Closure<dyn FnMut()>>,
    started_at: f64,
    progress: f64,
}

impl WebAudioBackend {
    pub fn new(audio_ctx: web::AudioContext, volume: f32, loop_track: bool) -> Result<Self, AudioError> {
        let output = create_gain(&audio_ctx, volume)?;
        output
            .connect_with_audio_node(&audio_ctx.destination())
            .map_err(|e| AudioError::Graph(js_err(e)))?;
        Ok(Self {
            audio_ctx,
            output,
            loop_track,
            buffer: None,
            analyser: None,
            source: None,
            on_ended: None,
            started_at: 0.0,
            progress: 0.0,
        })
    }

    pub fn audio_ctx(&self) -> &web::AudioContext {
        &self.audio_ctx
    }

    /// Called when a source plays to its end. Stopped sources never fire it.
    pub fn set_ended_hook(&mut self, hook: Closure<dyn FnMut()>) {
        self.on_ended = Some(hook);
    }

    fn duration(&self) -> f64 {
        self.buffer.as_ref().map(|b| b.duration()).unwrap_or(0.0)
    }

    fn stop_source(&mut self) {
        if let Some(src) = self.source.take() {
            src.set_onended(None);
            #[allow(deprecated)]
            let _ = src.stop();
            _ = src.disconnect();
        }
    }
}

impl AudioBackend for WebAudioBackend {
    type Track = web::AudioBuffer;

    fn attach(&mut self, track: web::AudioBuffer, fft_size: u32) -> Result<usize, AudioError> {
        let analyser =
            web::AnalyserNode::new(&self.audio_ctx).map_err(|e| AudioError::Graph(js_err(e)))?;
        analyser.set_fft_size(fft_size);
        self.output
            .connect_with_audio_node(&analyser)
            .map_err(|e| AudioError::Graph(js_err(e)))?;
        let bins = analyser.frequency_bin_count() as usize;
        log::info!(
            "[audio] track {:.1}s @ {}Hz, fft={}",
            track.duration(),
            track.sample_rate(),
            fft_size
        );
        self.buffer = Some(track);
        self.analyser = Some(analyser);
        self.progress = 0.0;
        Ok(bins)
    }

    fn read_frequencies(&mut self, out: &mut [u8]) {
        if let Some(a) = &self.analyser {
            a.get_byte_frequency_data(out);
        }
    }

    fn start(&mut self) -> Result<(), AudioError> {
        let buffer = self
            .buffer
            .clone()
            .ok_or_else(|| AudioError::Graph("no track attached".into()))?;
        self.stop_source();
        let src = self
            .audio_ctx
            .create_buffer_source()
            .map_err(|e| AudioError::Graph(js_err(e)))?;
        src.set_buffer(Some(&buffer));
        src.set_loop(self.loop_track);
        src.connect_with_audio_node(&self.output)
            .map_err(|e| AudioError::Graph(js_err(e)))?;
        if let Some(hook) = &self.on_ended {
            src.set_onended(Some(hook.as_ref().unchecked_ref()));
        }
        let offset = start_offset(self.progress, buffer.duration(), self.loop_track);
        #[allow(deprecated)]
        let started = src.start_with_when_and_grain_offset(0.0, offset);
        started.map_err(|e| AudioError::Graph(js_err(e)))?;
        self.started_at = self.audio_ctx.current_time();
        self.progress = offset;
        self.source = Some(src);
        Ok(())
    }

    fn pause(&mut self) {
        if self.source.is_some() {
            let elapsed = self.audio_ctx.current_time() - self.started_at;
            self.progress = advance_playhead(self.progress, elapsed, self.duration(), self.loop_track);
            self.stop_source();
        }
    }

    fn ended(&mut self) {
        self.stop_source();
        self.progress = 0.0;
    }

    fn release(&mut self) {
        self.stop_source();
        if let Some(a) = self.analyser.take() {
            _ = self.output.disconnect_with_audio_node(&a);
        }
        self.buffer = None;
        self.progress = 0.0;
    }
}

/// Fetch and decode `url` into an `AudioBuffer`.
pub async fn load_track(
    audio_ctx: &web::AudioContext,
    url: &str,
) -> Result<web::AudioBuffer, AudioError> {
    let window = web::window().ok_or_else(|| AudioError::Fetch("no window".into()))?;
    let resp_value = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|e| AudioError::Fetch(js_err(e)))?;
    let resp: web::Response = resp_value
        .dyn_into()
        .map_err(|e| AudioError::Fetch(js_err(e)))?;
    if !resp.ok() {
        return Err(AudioError::Fetch(format!("{} returned HTTP {}", url, resp.status())));
    }
    let bytes = JsFuture::from(resp.array_buffer().map_err(|e| AudioError::Fetch(js_err(e)))?)
        .await
        .map_err(|e| AudioError::Fetch(js_err(e)))?;
    let bytes: js_sys::ArrayBuffer = bytes
        .dyn_into()
        .map_err(|e| AudioError::Decode(js_err(e)))?;
    let decoded = JsFuture::from(
        audio_ctx
            .decode_audio_data(&bytes)
            .map_err(|e| AudioError::Decode(js_err(e)))?,
    )
    .await
    .map_err(|e| AudioError::Decode(js_err(e)))?;
    decoded
        .dyn_into::<web::AudioBuffer>()
        .map_err(|e| AudioError::Decode(js_err(e)))
}

/// Resume a context suspended by the autoplay policy.
pub async fn resume(audio_ctx: &web::AudioContext) -> Result<(), AudioError> {
    let promise = audio_ctx
        .resume()
        .map_err(|e| AudioError::Context(js_err(e)))?;
    JsFuture::from(promise)
        .await
        .map(|_| ())
        .map_err(|e| AudioError::Rejected(js_err(e)))
}

/// Load `url` into `session`, dropping the result if the session moved on meanwhile.
pub async fn initialize(session: Rc<RefCell<WebAudioSession>>, url: String) {
    let (ticket, audio_ctx) = {
        let mut s = session.borrow_mut();
        (s.begin_load(&url), s.backend().audio_ctx().clone())
    };
    let result = load_track(&audio_ctx, &url).await;
    session.borrow_mut().complete_load(ticket, result);
}

/// Route the end of a non-looping track back into `session`.
pub fn watch_track_end(session: &Rc<RefCell<WebAudioSession>>) {
    let weak: Weak<RefCell<WebAudioSession>> = Rc::downgrade(session);
    let hook = Closure::wrap(Box::new(move || {
        if let Some(session) = weak.upgrade() {
            if let Ok(mut s) = session.try_borrow_mut() {
                s.track_ended();
            }
        }
    }) as Box<dyn FnMut()>);
    session.borrow_mut().backend_mut().set_ended_hook(hook);
}

async fn resume_then_start(session: Rc<RefCell<WebAudioSession>>, ticket: PlayTicket) {
    let audio_ctx = session.borrow().backend().audio_ctx().clone();
    let resumed = resume(&audio_ctx).await;
    session.borrow_mut().finish_play(ticket, resumed);
}

/// Ask for playback; the context resume completes asynchronously.
pub fn play(session: &Rc<RefCell<WebAudioSession>>) {
    let ticket = session.borrow_mut().request_play();
    if let Some(ticket) = ticket {
        spawn_local(resume_then_start(session.clone(), ticket));
    }
}

pub fn toggle(session: &Rc<RefCell<WebAudioSession>>) {
    let action = session.borrow_mut().toggle();
    if let Toggle::ResumeRequested(ticket) = action {
        spawn_local(resume_then_start(session.clone(), ticket));
    }
}
