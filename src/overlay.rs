use crate::constants::{AUDIO_STATUS_ID, PLAY_TOGGLE_ID};
use crate::core::{SessionState, SessionStatus};
use web_sys as web;

/// Reflect the session in `#audio-status` and the `#play-toggle` button, if present.
pub fn show_status(document: &web::Document, status: &SessionStatus) {
    if let Some(el) = document.get_element_by_id(AUDIO_STATUS_ID) {
        let text = status.label();
        if el.text_content().as_deref() != Some(text) {
            el.set_text_content(Some(text));
        }
    }
    if let Some(el) = document.get_element_by_id(PLAY_TOGGLE_ID) {
        let cl = el.class_list();
        _ = cl.toggle_with_force("playing", status.is_playing);
        _ = cl.toggle_with_force("disabled", status.state != SessionState::Ready);
        let label = if status.is_playing { "Pause" } else { "Play" };
        if el.text_content().as_deref() != Some(label) {
            el.set_text_content(Some(label));
        }
    }
}

/// Clear the status line when the visualizer goes away.
pub fn clear(document: &web::Document) {
    if let Some(el) = document.get_element_by_id(AUDIO_STATUS_ID) {
        el.set_text_content(None);
    }
    if let Some(el) = document.get_element_by_id(PLAY_TOGGLE_ID) {
        let cl = el.class_list();
        _ = cl.remove_2("playing", "disabled");
    }
}
