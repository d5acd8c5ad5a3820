use crate::audio::{self, WebAudioSession};
use crate::dom::EventListener;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys as web;

/// Keys that toggle playback. Ignored while typing into a form field.
#[inline]
pub fn is_toggle_key(key: &str) -> bool {
    matches!(key, " " | "Spacebar")
}

fn typing_into_field(ev: &web::KeyboardEvent) -> bool {
    ev.target()
        .and_then(|t| t.dyn_into::<web::Element>().ok())
        .map(|el| matches!(el.tag_name().as_str(), "INPUT" | "TEXTAREA" | "SELECT"))
        .unwrap_or(false)
}

/// Space toggles playback for the whole window.
pub fn wire_play_keys(session: &Rc<RefCell<WebAudioSession>>) -> Option<EventListener> {
    let window = web::window()?;
    let target: &web::EventTarget = window.as_ref();
    let session = session.clone();
    Some(EventListener::new(target, "keydown", move |ev| {
        let Some(ev) = ev.dyn_ref::<web::KeyboardEvent>() else {
            return;
        };
        if ev.repeat() || !is_toggle_key(&ev.key()) || typing_into_field(ev) {
            return;
        }
        ev.prevent_default();
        log::info!("[keys] toggle playback");
        audio::toggle(&session);
    }))
}
