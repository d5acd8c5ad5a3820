//! Per-frame orchestration: spectrum → strip uniforms → draw.

use super::camera::{OrbitCamera, Viewport};
use super::config::{Reactivity, SceneConfig};
use super::constants::CAMERA_EYE;
use super::lifecycle::DisposeBag;
use super::session::FrequencySource;
use super::strip::Corridor;
use glam::Vec3;
use instant::Instant;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderError {
    #[error("surface lost or outdated")]
    SurfaceLost,
    #[error("out of GPU memory")]
    OutOfMemory,
    #[error("frame acquire timed out")]
    Timeout,
    #[error("{0}")]
    Other(String),
}

/// Everything a surface needs to draw one frame.
pub struct FrameView<'a> {
    pub corridor: &'a Corridor,
    pub camera: &'a OrbitCamera,
}

/// Drawable the driver renders into.
pub trait SceneSurface {
    fn resize(&mut self, viewport: Viewport);
    fn draw(&mut self, frame: &FrameView<'_>) -> Result<(), RenderError>;
    /// Drop GPU resources. Called once from `SceneDriver::dispose`.
    fn release(&mut self);
}

pub struct SceneDriver<S: SceneSurface> {
    surface: S,
    corridor: Corridor,
    camera: OrbitCamera,
    reactivity: Reactivity,
    source: Option<Box<dyn FrequencySource>>,
    scratch: Vec<u8>,
    started: Instant,
    frames: u64,
    disposables: DisposeBag,
}

impl<S: SceneSurface> SceneDriver<S> {
    pub fn new(config: &SceneConfig, mut surface: S, viewport: Viewport) -> Self {
        let corridor = Corridor::new(config);
        let mut camera = OrbitCamera::new(Vec3::from_array(CAMERA_EYE), Vec3::ZERO, viewport.aspect());
        camera.enabled = config.controls_enabled;
        camera.damping = config.damping;
        surface.resize(viewport);
        log::info!(
            "[scene] {} strips, reactivity={:?}, controls={}",
            corridor.len(),
            config.reactivity,
            camera.enabled
        );
        Self {
            surface,
            corridor,
            camera,
            reactivity: config.reactivity,
            source: None,
            scratch: Vec::new(),
            started: Instant::now(),
            frames: 0,
            disposables: DisposeBag::new(),
        }
    }

    pub fn set_frequency_source(&mut self, source: Box<dyn FrequencySource>) {
        self.source = Some(source);
    }

    pub fn corridor(&self) -> &Corridor {
        &self.corridor
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut OrbitCamera {
        &mut self.camera
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn is_disposed(&self) -> bool {
        self.disposables.is_disposed()
    }

    /// Tick against the driver's own clock.
    pub fn tick(&mut self) -> Result<(), RenderError> {
        let elapsed = self.started.elapsed().as_secs_f32();
        self.tick_at(elapsed)
    }

    pub fn tick_at(&mut self, elapsed_sec: f32) -> Result<(), RenderError> {
        if self.is_disposed() {
            return Ok(());
        }
        self.frames += 1;
        self.corridor.set_time(elapsed_sec);

        if let Some(source) = &self.source {
            let gate_open = match self.reactivity {
                Reactivity::Always => true,
                Reactivity::WhilePlaying => source.is_playing(),
            };
            if gate_open && source.snapshot_into(&mut self.scratch) {
                self.corridor.apply_spectrum(&self.scratch);
            }
        }

        self.camera.update();
        self.surface.draw(&FrameView {
            corridor: &self.corridor,
            camera: &self.camera,
        })
    }

    pub fn resize(&mut self, viewport: Viewport) {
        if self.is_disposed() {
            return;
        }
        self.camera.set_aspect(viewport.aspect());
        self.surface.resize(viewport);
    }

    /// Register a teardown hook (frame loop, listeners, DOM nodes).
    pub fn on_dispose(&mut self, label: &'static str, hook: impl FnOnce() + 'static) {
        self.disposables.push(label, hook);
    }

    pub fn dispose(&mut self) {
        if self.is_disposed() {
            return;
        }
        self.disposables.dispose();
        self.source = None;
        self.corridor.clear();
        self.surface.release();
        log::info!("[scene] disposed after {} frames", self.frames);
    }
}
