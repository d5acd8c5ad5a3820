use crate::audio::{self, WebAudioBackend, WebAudioSession};
use crate::constants::{CANVAS_CLASS, PLAY_TOGGLE_ID};
use crate::core::{
    AppConfig, AudioConfig, AudioError, AudioSession, SceneDriver, SessionStatus, StatusWatch,
};
use crate::dom::{self, EventListener};
use crate::events;
use crate::frame;
use crate::overlay;
use crate::render::{GpuState, GpuSurface};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

type Driver = SceneDriver<GpuSurface>;
type SharedSession = Rc<RefCell<WebAudioSession>>;

fn js_error(e: anyhow::Error) -> JsValue {
    JsValue::from_str(&format!("{:#}", e))
}

fn load_config(track_url: Option<String>) -> AppConfig {
    let mut config = AppConfig::default();
    let pairs = dom::query_pairs();
    config.apply_overrides(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    if let Some(url) = track_url.filter(|u| !u.trim().is_empty()) {
        config.audio.track_url = url;
    }
    config
}

fn open_audio(config: &AudioConfig) -> Result<SharedSession, AudioError> {
    let audio_ctx = web::AudioContext::new().map_err(|e| AudioError::Context(format!("{:?}", e)))?;
    let backend = match WebAudioBackend::new(audio_ctx.clone(), config.volume, config.loop_track) {
        Ok(b) => b,
        Err(e) => {
            _ = audio_ctx.close();
            return Err(e);
        }
    };
    let session = Rc::new(RefCell::new(AudioSession::new(backend, config.fft_size)));
    audio::watch_track_end(&session);
    Ok(session)
}

fn current_status(session: Option<&SharedSession>) -> Option<SessionStatus> {
    match session {
        Some(s) => s.try_borrow().ok().map(|s| s.status()),
        None => Some(SessionStatus::unavailable()),
    }
}

/// Audio-reactive corridor mounted into a page element.
#[wasm_bindgen]
pub struct Visualizer {
    driver: Rc<RefCell<Driver>>,
    /// `None` when no output context could be created; the scene still renders.
    session: Option<SharedSession>,
    disposed: bool,
}

#[wasm_bindgen]
impl Visualizer {
    /// Create the canvas inside `container`, start rendering and begin loading the track.
    pub async fn mount(container: web::HtmlElement, track_url: Option<String>) -> Result<Visualizer, JsValue> {
        Self::build(container, track_url).await.map_err(|e| {
            log::error!("[scene] mount failed: {:#}", e);
            js_error(e)
        })
    }

    pub fn play(&self) {
        if let Some(s) = self.live_session() {
            audio::play(s);
        }
    }

    pub fn pause(&self) {
        if let Some(s) = self.live_session() {
            s.borrow_mut().pause();
        }
    }

    pub fn toggle(&self) {
        if let Some(s) = self.live_session() {
            audio::toggle(s);
        }
    }

    pub fn is_playing(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.borrow().is_playing())
    }

    pub fn is_loading(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.borrow().status().is_loading)
    }

    pub fn has_analyser(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.borrow().has_analyser())
    }

    /// Stop rendering and audio and detach everything from the page. Safe to call twice.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.driver.borrow_mut().dispose();
        if let Some(session) = &self.session {
            let audio_ctx = {
                let mut s = session.borrow_mut();
                s.teardown();
                s.backend().audio_ctx().clone()
            };
            if let Ok(p) = audio_ctx.close() {
                spawn_local(async move {
                    if let Err(e) = wasm_bindgen_futures::JsFuture::from(p).await {
                        log::warn!("[audio] context close failed: {:?}", e);
                    }
                });
            }
        }
        if let Some(document) = dom::window_document() {
            overlay::clear(&document);
        }
    }
}

impl Visualizer {
    fn live_session(&self) -> Option<&SharedSession> {
        if self.disposed {
            return None;
        }
        self.session.as_ref()
    }

    async fn build(container: web::HtmlElement, track_url: Option<String>) -> anyhow::Result<Self> {
        let document = dom::window_document().ok_or_else(|| anyhow::anyhow!("no document"))?;
        let config = load_config(track_url);

        let canvas = dom::create_canvas(&document, CANVAS_CLASS)?;
        let viewport = dom::window_viewport();
        dom::apply_viewport(&canvas, viewport);
        container
            .append_child(&canvas)
            .map_err(|e| anyhow::anyhow!("append canvas: {:?}", e))?;

        // Nothing past this point fails; every missing capability degrades instead.
        Ok(Self::assemble(document, canvas, viewport, &config).await)
    }

    async fn assemble(
        document: web::Document,
        canvas: web::HtmlCanvasElement,
        viewport: crate::core::Viewport,
        config: &AppConfig,
    ) -> Self {
        let gpu = match GpuState::new(&canvas).await {
            Ok(g) => Some(g),
            Err(e) => {
                log::error!("[gpu] WebGPU unavailable, rendering disabled: {:#}", e);
                None
            }
        };
        let driver = Rc::new(RefCell::new(SceneDriver::new(
            &config.scene,
            GpuSurface::new(gpu),
            viewport,
        )));

        let session = match open_audio(&config.audio) {
            Ok(session) => {
                driver
                    .borrow_mut()
                    .set_frequency_source(Box::new(session.clone()));
                spawn_local(audio::initialize(session.clone(), config.audio.track_url.clone()));
                Some(session)
            }
            Err(e) => {
                log::error!("[audio] {}; continuing without audio", e);
                None
            }
        };

        let status_session = session.clone();
        let status_document = document.clone();
        let mut watch = StatusWatch::new();
        let frames = frame::start_loop(driver.clone(), move || {
            if let Some(status) = current_status(status_session.as_ref()) {
                if watch.changed(status) {
                    overlay::show_status(&status_document, &status);
                }
            }
        });

        let mut listeners: Vec<EventListener> = events::wire_orbit_controls(&canvas, &driver);
        if let Some(session) = &session {
            listeners.extend(events::wire_play_keys(session));
            let session = session.clone();
            listeners.extend(dom::click_listener(&document, PLAY_TOGGLE_ID, move || {
                audio::toggle(&session);
            }));
        }
        if let Some(window) = web::window() {
            let target: &web::EventTarget = window.as_ref();
            let driver = driver.clone();
            let canvas = canvas.clone();
            listeners.push(EventListener::new(target, "resize", move |_| {
                let viewport = dom::window_viewport();
                dom::apply_viewport(&canvas, viewport);
                if let Ok(mut d) = driver.try_borrow_mut() {
                    d.resize(viewport);
                }
            }));
        }

        {
            let mut d = driver.borrow_mut();
            d.on_dispose("canvas", move || canvas.remove());
            d.on_dispose("listeners", move || drop(listeners));
            d.on_dispose("frame loop", move || frames.cancel());
        }

        Self {
            driver,
            session,
            disposed: false,
        }
    }
}
