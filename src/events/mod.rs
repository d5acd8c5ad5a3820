pub mod keyboard;
pub mod pointer;

pub use keyboard::wire_play_keys;
pub use pointer::wire_orbit_controls;
