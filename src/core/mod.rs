pub mod camera;
pub mod config;
pub mod constants;
pub mod driver;
pub mod geometry;
pub mod lifecycle;
pub mod math;
pub mod session;
pub mod strip;

pub use camera::{OrbitCamera, Viewport};
pub use config::{AppConfig, AudioConfig, ConfigError, Reactivity, SceneConfig};
pub use constants::*;
pub use driver::{FrameView, RenderError, SceneDriver, SceneSurface};
pub use lifecycle::DisposeBag;
pub use math::{
    frequency_to_strength, lerp, map_range, smooth_strength, RangeError, RangeMap, BYTE_TO_UNIT,
};
pub use session::{
    advance_playhead, start_offset, AudioBackend, AudioError, AudioSession, FrequencySource,
    LoadTicket, PlayTicket, SessionState, SessionStatus, StatusWatch, Toggle,
};
pub use strip::{Corridor, Strip, StripInstance, StripUniforms};

// Shader bundled as a string constant
pub static CORRIDOR_WGSL: &str = include_str!("../../shaders/corridor.wgsl");
