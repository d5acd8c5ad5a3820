// Shared layout/audio tuning constants for the corridor.

// Corridor layout
pub const STRIP_COUNT: usize = 96; // bar+plane pairs, one per frequency bin
pub const STRIP_SPACING: f32 = 0.095; // depth gap between neighbouring strips
pub const GROUP_Z: f32 = 6.5; // world-space z of strip 0; the rest recede behind it
pub const PLANE_DROP: f32 = 0.75; // plane centre sits this far below its bar

// Per-strip uniforms
pub const OFFSET_STEP: f32 = 11.0; // phase offset per strip index
pub const INITIAL_STRENGTH: f32 = 1.5;
pub const STRENGTH_SMOOTHING: f32 = 0.25; // per-frame lerp factor toward the new sample

// Strip geometry
pub const STRIP_WIDTH: f32 = 5.5;
pub const BAR_HEIGHT: f32 = 0.03;
pub const BAR_DEPTH: f32 = 0.02;
pub const PLANE_HEIGHT: f32 = 1.5;
pub const STRIP_SEGMENTS: u32 = 128;

// Analyser
pub const FFT_SIZE: u32 = 2048;
pub const FFT_SIZE_MIN: u32 = 32;
pub const FFT_SIZE_MAX: u32 = 32768;
pub const BYTE_MAX: f32 = 255.0;

// Camera
pub const CAMERA_FOV_DEG: f32 = 45.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 300.0;
pub const CAMERA_EYE: [f32; 3] = [0.0, 10.0, -9.5];

// Orbit controls
pub const ORBIT_ROTATE_SPEED: f32 = 1.0;
pub const ORBIT_ZOOM_SPEED: f32 = 0.95; // radius scale per wheel notch
pub const ORBIT_DAMPING: f32 = 0.05;
pub const ORBIT_MIN_RADIUS: f32 = 1.0;
pub const ORBIT_MAX_RADIUS: f32 = 60.0;
pub const ORBIT_POLAR_EPS: f32 = 1e-3;

// Viewport
pub const MAX_PIXEL_RATIO: f64 = 2.0;
