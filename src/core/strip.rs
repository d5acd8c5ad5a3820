use super::config::SceneConfig;
use super::math::smooth_strength;

/// Shader parameters shared by a strip's bar and its plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StripUniforms {
    pub offset: f32,
    pub strength: f32,
    pub time: f32,
}

/// One bar+plane pair. Both drawables read the same `uniforms`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Strip {
    pub index: usize,
    /// World-space depth of the pair.
    pub z: f32,
    pub uniforms: StripUniforms,
}

impl Strip {
    pub fn bar_position(&self) -> [f32; 3] {
        [0.0, 0.0, self.z]
    }

    pub fn plane_position(&self, plane_drop: f32) -> [f32; 3] {
        [0.0, -plane_drop, self.z]
    }
}

/// Per-instance GPU layout; one entry per strip, bound for both pipelines.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct StripInstance {
    pub z: f32,
    pub offset: f32,
    pub strength: f32,
    pub time: f32,
}

/// Receding row of strips; strip `i` listens to frequency bin `i`.
#[derive(Debug, Clone)]
pub struct Corridor {
    strips: Vec<Strip>,
    smoothing: f32,
    plane_drop: f32,
}

impl Corridor {
    pub fn new(config: &SceneConfig) -> Self {
        let strips = (0..config.strip_count)
            .map(|i| Strip {
                index: i,
                z: config.group_z - i as f32 * config.spacing,
                uniforms: StripUniforms {
                    offset: i as f32 * config.offset_step,
                    strength: config.initial_strength,
                    time: 0.0,
                },
            })
            .collect();
        Self {
            strips,
            smoothing: config.smoothing,
            plane_drop: config.plane_drop,
        }
    }

    pub fn strips(&self) -> &[Strip] {
        &self.strips
    }

    pub fn len(&self) -> usize {
        self.strips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strips.is_empty()
    }

    pub fn plane_drop(&self) -> f32 {
        self.plane_drop
    }

    pub fn set_time(&mut self, elapsed_sec: f32) {
        for s in &mut self.strips {
            s.uniforms.time = elapsed_sec;
        }
    }

    /// Move every strip one smoothing step toward its bin; bins past the end read 0.
    pub fn apply_spectrum(&mut self, bins: &[u8]) {
        let factor = self.smoothing;
        for s in &mut self.strips {
            let frequency = bins.get(s.index).copied().unwrap_or(0);
            s.uniforms.strength = smooth_strength(frequency, s.uniforms.strength, factor);
        }
    }

    pub fn write_instances(&self, out: &mut Vec<StripInstance>) {
        out.clear();
        out.extend(self.strips.iter().map(|s| StripInstance {
            z: s.z,
            offset: s.uniforms.offset,
            strength: s.uniforms.strength,
            time: s.uniforms.time,
        }));
    }

    pub(crate) fn clear(&mut self) {
        self.strips.clear();
    }
}
