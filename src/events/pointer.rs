use crate::constants::WHEEL_PIXELS_PER_NOTCH;
use crate::core::{SceneDriver, SceneSurface};
use crate::dom::EventListener;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys as web;

#[derive(Default, Clone, Copy)]
struct DragState {
    active: bool,
    pointer_id: i32,
    last_x: f32,
    last_y: f32,
}

/// Orbit drag and wheel zoom on `canvas`. The camera ignores both while controls are off.
pub fn wire_orbit_controls<S: SceneSurface + 'static>(
    canvas: &web::HtmlCanvasElement,
    driver: &Rc<RefCell<SceneDriver<S>>>,
) -> Vec<EventListener> {
    let drag = Rc::new(RefCell::new(DragState::default()));
    let target: &web::EventTarget = canvas.as_ref();

    let down = {
        let drag = drag.clone();
        let canvas = canvas.clone();
        EventListener::new(target, "pointerdown", move |ev| {
            let Some(ev) = ev.dyn_ref::<web::PointerEvent>() else {
                return;
            };
            let mut d = drag.borrow_mut();
            d.active = true;
            d.pointer_id = ev.pointer_id();
            d.last_x = ev.client_x() as f32;
            d.last_y = ev.client_y() as f32;
            _ = canvas.set_pointer_capture(ev.pointer_id());
        })
    };

    let moved = {
        let drag = drag.clone();
        let driver = driver.clone();
        let canvas = canvas.clone();
        EventListener::new(target, "pointermove", move |ev| {
            let Some(ev) = ev.dyn_ref::<web::PointerEvent>() else {
                return;
            };
            let (dx, dy) = {
                let mut d = drag.borrow_mut();
                if !d.active || d.pointer_id != ev.pointer_id() {
                    return;
                }
                let (x, y) = (ev.client_x() as f32, ev.client_y() as f32);
                let delta = (x - d.last_x, y - d.last_y);
                d.last_x = x;
                d.last_y = y;
                delta
            };
            let height = canvas.client_height() as f32;
            if let Ok(mut drv) = driver.try_borrow_mut() {
                drv.camera_mut().rotate(dx, dy, height);
            }
        })
    };

    let release = |kind: &'static str| {
        let drag = drag.clone();
        let canvas = canvas.clone();
        EventListener::new(target, kind, move |ev| {
            let Some(ev) = ev.dyn_ref::<web::PointerEvent>() else {
                return;
            };
            let mut d = drag.borrow_mut();
            if d.active && d.pointer_id == ev.pointer_id() {
                d.active = false;
                _ = canvas.release_pointer_capture(ev.pointer_id());
            }
        })
    };
    let up = release("pointerup");
    let cancel = release("pointercancel");

    let wheel = {
        let driver = driver.clone();
        EventListener::new(target, "wheel", move |ev| {
            let Some(ev) = ev.dyn_ref::<web::WheelEvent>() else {
                return;
            };
            let notches = match ev.delta_mode() {
                web::WheelEvent::DOM_DELTA_PIXEL => ev.delta_y() as f32 / WHEEL_PIXELS_PER_NOTCH,
                _ => (ev.delta_y() as f32).signum(),
            };
            if notches == 0.0 {
                return;
            }
            if let Ok(mut drv) = driver.try_borrow_mut() {
                if drv.camera().enabled {
                    ev.prevent_default();
                }
                drv.camera_mut().zoom(notches);
            }
        })
    };

    vec![down, moved, up, cancel, wheel]
}
