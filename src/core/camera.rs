use super::constants::*;
use glam::{Mat4, Vec3};

/// Drawable size in CSS pixels plus the capped device pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub pixel_ratio: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64, device_pixel_ratio: f64) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
            pixel_ratio: device_pixel_ratio.clamp(1.0, MAX_PIXEL_RATIO),
        }
    }

    pub fn aspect(&self) -> f32 {
        (self.width / self.height) as f32
    }

    /// Backing-store size in device pixels.
    pub fn physical_size(&self) -> (u32, u32) {
        let w = (self.width * self.pixel_ratio).round() as u32;
        let h = (self.height * self.pixel_ratio).round() as u32;
        (w.max(1), h.max(1))
    }
}

/// Perspective camera orbiting a target on a sphere.
///
/// Pointer input accumulates into pending deltas; `update` folds them in,
/// either at once or a `ORBIT_DAMPING` fraction per frame when damping is on.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pub target: Vec3,
    radius: f32,
    azimuth: f32,
    polar: f32,
    fov_y: f32,
    aspect: f32,
    near: f32,
    far: f32,
    pub enabled: bool,
    pub damping: bool,
    pending_azimuth: f32,
    pending_polar: f32,
    pending_scale: f32,
}

impl OrbitCamera {
    pub fn new(eye: Vec3, target: Vec3, aspect: f32) -> Self {
        let offset = eye - target;
        let radius = offset.length().max(ORBIT_MIN_RADIUS);
        let azimuth = offset.x.atan2(offset.z);
        let polar = (offset.y / radius).clamp(-1.0, 1.0).acos();
        Self {
            target,
            radius,
            azimuth,
            polar,
            fov_y: CAMERA_FOV_DEG.to_radians(),
            aspect,
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
            enabled: false,
            damping: false,
            pending_azimuth: 0.0,
            pending_polar: 0.0,
            pending_scale: 1.0,
        }
    }

    pub fn eye(&self) -> Vec3 {
        let sin_polar = self.polar.sin();
        self.target
            + Vec3::new(
                self.radius * sin_polar * self.azimuth.sin(),
                self.radius * self.polar.cos(),
                self.radius * sin_polar * self.azimuth.cos(),
            )
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    /// Drag by a pixel delta on a viewport `height` pixels tall.
    pub fn rotate(&mut self, dx: f32, dy: f32, height: f32) {
        if !self.enabled {
            return;
        }
        let k = std::f32::consts::TAU * ORBIT_ROTATE_SPEED / height.max(1.0);
        self.pending_azimuth -= dx * k;
        self.pending_polar -= dy * k;
    }

    /// Positive `notches` dolly out, negative dolly in.
    pub fn zoom(&mut self, notches: f32) {
        if !self.enabled {
            return;
        }
        self.pending_scale *= ORBIT_ZOOM_SPEED.powf(-notches);
    }

    pub fn update(&mut self) {
        let t = if self.damping { ORBIT_DAMPING } else { 1.0 };
        self.azimuth += self.pending_azimuth * t;
        self.polar = (self.polar + self.pending_polar * t)
            .clamp(ORBIT_POLAR_EPS, std::f32::consts::PI - ORBIT_POLAR_EPS);
        let scale_step = self.pending_scale.powf(t);
        self.radius = (self.radius * scale_step).clamp(ORBIT_MIN_RADIUS, ORBIT_MAX_RADIUS);
        if self.damping {
            self.pending_azimuth *= 1.0 - t;
            self.pending_polar *= 1.0 - t;
            self.pending_scale /= scale_step;
        } else {
            self.pending_azimuth = 0.0;
            self.pending_polar = 0.0;
            self.pending_scale = 1.0;
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection() * self.view()
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(Vec3::from_array(CAMERA_EYE), Vec3::ZERO, 1.0)
    }
}
