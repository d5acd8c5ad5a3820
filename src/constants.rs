/// Render and host-side tuning constants.
///
/// Scene layout lives in `core::constants`; these only matter to the browser
/// surface and its input wiring.
// Clear colour, sRGB bytes (#021119)
pub const CLEAR_SRGB: [u8; 3] = [0x02, 0x11, 0x19];

// Depth buffer
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

// Plane translucency is blended over the bars, so planes draw second
pub const PLANE_ALPHA_BLEND: wgpu::BlendState = wgpu::BlendState::ALPHA_BLENDING;

// Wheel deltas are reported in pixels; this many pixels make one zoom notch
pub const WHEEL_PIXELS_PER_NOTCH: f32 = 100.0;

// DOM hooks the page may provide
pub const PLAY_TOGGLE_ID: &str = "play-toggle";
pub const AUDIO_STATUS_ID: &str = "audio-status";
pub const CANVAS_CLASS: &str = "corridor-canvas";
