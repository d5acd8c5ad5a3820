use crate::core::{RenderError, SceneDriver, SceneSurface};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

struct LoopInner {
    tick: RefCell<Option<Closure<dyn FnMut()>>>,
    handle: Cell<Option<i32>>,
    running: Cell<bool>,
}

impl LoopInner {
    fn schedule(&self) {
        if !self.running.get() {
            return;
        }
        let Some(w) = web::window() else {
            return;
        };
        if let Some(tick) = self.tick.borrow().as_ref() {
            match w.request_animation_frame(tick.as_ref().unchecked_ref()) {
                Ok(h) => self.handle.set(Some(h)),
                Err(e) => log::error!("[frame] requestAnimationFrame failed: {:?}", e),
            }
        }
    }
}

/// requestAnimationFrame loop that can be cancelled.
///
/// The callback only holds a weak reference back to the loop, so dropping the
/// `FrameLoop` releases the closure and everything it captured.
pub struct FrameLoop {
    inner: Rc<LoopInner>,
}

impl FrameLoop {
    /// Calls `on_frame` once per display refresh until it returns false or the loop is cancelled.
    pub fn start(mut on_frame: impl FnMut() -> bool + 'static) -> Self {
        let inner = Rc::new(LoopInner {
            tick: RefCell::new(None),
            handle: Cell::new(None),
            running: Cell::new(true),
        });
        let weak: Weak<LoopInner> = Rc::downgrade(&inner);
        *inner.tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            inner.handle.set(None);
            if !inner.running.get() {
                return;
            }
            if on_frame() {
                inner.schedule();
            } else {
                inner.running.set(false);
            }
        }) as Box<dyn FnMut()>));
        inner.schedule();
        Self { inner }
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.get()
    }

    pub fn cancel(&self) {
        self.inner.running.set(false);
        if let Some(h) = self.inner.handle.take() {
            if let Some(w) = web::window() {
                _ = w.cancel_animation_frame(h);
            }
        }
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Tick `driver` every frame, then run `after_frame`. Stops by itself once the driver is disposed.
pub fn start_loop<S: SceneSurface + 'static>(
    driver: Rc<RefCell<SceneDriver<S>>>,
    mut after_frame: impl FnMut() + 'static,
) -> FrameLoop {
    FrameLoop::start(move || {
        let Ok(mut d) = driver.try_borrow_mut() else {
            return true;
        };
        if d.is_disposed() {
            return false;
        }
        match d.tick() {
            Ok(()) | Err(RenderError::SurfaceLost) => {}
            Err(e) => log::error!("[gpu] render error: {}", e),
        }
        drop(d);
        after_frame();
        true
    })
}
