// Host-side tests for the per-frame driver, with fake surface and spectrum source.

use spectral_corridor::core::*;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Default)]
struct FakeSurface {
    draws: u32,
    resizes: Vec<Viewport>,
    releases: u32,
    last_strengths: Vec<f32>,
    fail_next: Option<RenderError>,
}

impl SceneSurface for FakeSurface {
    fn resize(&mut self, viewport: Viewport) {
        self.resizes.push(viewport);
    }

    fn draw(&mut self, frame: &FrameView<'_>) -> Result<(), RenderError> {
        self.draws += 1;
        self.last_strengths = frame
            .corridor
            .strips()
            .iter()
            .map(|s| s.uniforms.strength)
            .collect();
        match self.fail_next.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn release(&mut self) {
        self.releases += 1;
    }
}

#[derive(Clone, Default)]
struct FakeSource {
    bins: Rc<RefCell<Option<Vec<u8>>>>,
    playing: Rc<Cell<bool>>,
}

impl FrequencySource for FakeSource {
    fn snapshot_into(&self, out: &mut Vec<u8>) -> bool {
        match self.bins.borrow().as_ref() {
            Some(b) => {
                out.clear();
                out.extend_from_slice(b);
                true
            }
            None => false,
        }
    }

    fn is_playing(&self) -> bool {
        self.playing.get()
    }
}

fn small_config(reactivity: Reactivity) -> SceneConfig {
    SceneConfig {
        strip_count: 3,
        initial_strength: 1.0,
        reactivity,
        ..SceneConfig::default()
    }
}

fn driver(reactivity: Reactivity) -> (SceneDriver<FakeSurface>, FakeSource) {
    let mut d = SceneDriver::new(
        &small_config(reactivity),
        FakeSurface::default(),
        Viewport::new(800.0, 600.0, 1.0),
    );
    let src = FakeSource::default();
    d.set_frequency_source(Box::new(src.clone()));
    (d, src)
}

#[test]
fn new_driver_sizes_surface_and_camera() {
    let (d, _) = driver(Reactivity::Always);
    assert_eq!(d.surface().resizes.len(), 1);
    assert!((d.camera().aspect() - 800.0 / 600.0).abs() < 1e-6);
    assert_eq!(d.corridor().len(), 3);
    assert_eq!(d.frames(), 0);
}

#[test]
fn tick_without_spectrum_keeps_strength() {
    let (mut d, _) = driver(Reactivity::Always);
    d.tick_at(0.5).unwrap();
    assert_eq!(d.surface().draws, 1);
    assert_eq!(d.surface().last_strengths, vec![1.0; 3]);
    assert!(d.corridor().strips().iter().all(|s| s.uniforms.time == 0.5));
}

#[test]
fn tick_applies_spectrum_before_draw() {
    let (mut d, src) = driver(Reactivity::Always);
    *src.bins.borrow_mut() = Some(vec![0, 0, 0]);
    d.tick_at(0.0).unwrap();
    assert_eq!(d.surface().last_strengths, vec![0.75; 3]);
    d.tick_at(0.016).unwrap();
    assert!((d.surface().last_strengths[0] - 0.5625).abs() < 1e-6);
}

#[test]
fn while_playing_gate_holds_strength_when_paused() {
    let (mut d, src) = driver(Reactivity::WhilePlaying);
    *src.bins.borrow_mut() = Some(vec![0, 0, 0]);
    d.tick_at(0.0).unwrap();
    assert_eq!(d.surface().last_strengths, vec![1.0; 3]);
    src.playing.set(true);
    d.tick_at(0.016).unwrap();
    assert_eq!(d.surface().last_strengths, vec![0.75; 3]);
    // Time keeps moving regardless of the gate
    src.playing.set(false);
    d.tick_at(0.032).unwrap();
    assert_eq!(d.surface().last_strengths, vec![0.75; 3]);
    assert!(d.corridor().strips()[0].uniforms.time > 0.03);
}

#[test]
fn always_gate_reacts_while_paused() {
    let (mut d, src) = driver(Reactivity::Always);
    src.playing.set(false);
    *src.bins.borrow_mut() = Some(vec![255, 255, 255]);
    d.tick_at(0.0).unwrap();
    assert_eq!(d.surface().last_strengths, vec![1.0; 3]);
    *src.bins.borrow_mut() = Some(vec![0]);
    d.tick_at(0.0).unwrap();
    assert_eq!(d.surface().last_strengths, vec![0.75; 3]);
}

#[test]
fn render_errors_surface_to_caller() {
    let (mut d, _) = driver(Reactivity::Always);
    d.surface_mut().fail_next = Some(RenderError::SurfaceLost);
    assert_eq!(d.tick_at(0.0), Err(RenderError::SurfaceLost));
    assert_eq!(d.tick_at(0.0), Ok(()));
    assert_eq!(d.frames(), 2);
}

#[test]
fn resize_updates_aspect_and_surface() {
    let (mut d, _) = driver(Reactivity::Always);
    d.resize(Viewport::new(1000.0, 500.0, 3.0));
    assert!((d.camera().aspect() - 2.0).abs() < 1e-6);
    let last = *d.surface().resizes.last().unwrap();
    assert_eq!(last.pixel_ratio, 2.0);
    assert_eq!(last.physical_size(), (2000, 1000));
}

#[test]
fn dispose_runs_hooks_once_in_reverse() {
    let (mut d, _) = driver(Reactivity::Always);
    let order = Rc::new(RefCell::new(Vec::new()));
    for label in ["canvas", "listeners", "frame loop"] {
        let order = order.clone();
        d.on_dispose(label, move || order.borrow_mut().push(label));
    }
    d.dispose();
    d.dispose();
    assert_eq!(*order.borrow(), vec!["frame loop", "listeners", "canvas"]);
    assert_eq!(d.surface().releases, 1);
    assert!(d.is_disposed());
    assert!(d.corridor().is_empty());
}

#[test]
fn disposed_driver_ignores_ticks_and_resizes() {
    let (mut d, src) = driver(Reactivity::Always);
    *src.bins.borrow_mut() = Some(vec![0, 0, 0]);
    d.dispose();
    d.tick_at(1.0).unwrap();
    d.resize(Viewport::new(10.0, 10.0, 1.0));
    assert_eq!(d.surface().draws, 0);
    assert_eq!(d.surface().resizes.len(), 1);
    assert_eq!(d.frames(), 0);
}

#[test]
fn hook_registered_after_dispose_runs_immediately() {
    let (mut d, _) = driver(Reactivity::Always);
    d.dispose();
    let ran = Rc::new(Cell::new(0));
    let r = ran.clone();
    d.on_dispose("late", move || r.set(r.get() + 1));
    assert_eq!(ran.get(), 1);
    d.dispose();
    assert_eq!(ran.get(), 1);
}

#[test]
fn dispose_bag_reports_labels() {
    let mut bag = DisposeBag::new();
    bag.push("a", || {});
    bag.push("b", || {});
    assert_eq!(bag.len(), 2);
    assert!(format!("{:?}", bag).contains("\"b\""));
    bag.dispose();
    assert!(bag.is_empty());
    assert!(bag.is_disposed());
}
