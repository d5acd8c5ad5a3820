use super::constants::*;

/// When the spectrum is allowed to drive strip strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reactivity {
    /// Apply the spectrum whenever a snapshot exists, playing or not.
    #[default]
    Always,
    /// Only while the frequency source reports playback.
    WhilePlaying,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    pub strip_count: usize,
    pub spacing: f32,
    pub group_z: f32,
    pub plane_drop: f32,
    pub offset_step: f32,
    pub initial_strength: f32,
    pub smoothing: f32,
    pub reactivity: Reactivity,
    pub controls_enabled: bool,
    pub damping: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            strip_count: STRIP_COUNT,
            spacing: STRIP_SPACING,
            group_z: GROUP_Z,
            plane_drop: PLANE_DROP,
            offset_step: OFFSET_STEP,
            initial_strength: INITIAL_STRENGTH,
            smoothing: STRENGTH_SMOOTHING,
            reactivity: Reactivity::Always,
            controls_enabled: false,
            damping: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AudioConfig {
    pub track_url: String,
    pub fft_size: u32,
    pub loop_track: bool,
    pub volume: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            track_url: "audio/track.mp3".to_string(),
            fft_size: FFT_SIZE,
            loop_track: false,
            volume: 1.0,
        }
    }
}

impl AudioConfig {
    pub fn bin_count(&self) -> usize {
        (self.fft_size / 2) as usize
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppConfig {
    pub scene: SceneConfig,
    pub audio: AudioConfig,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("`{key}`: cannot parse {value:?}")]
    Parse { key: String, value: String },
    #[error("`{key}`: {value} is outside {range}")]
    OutOfRange {
        key: String,
        value: String,
        range: &'static str,
    },
}

fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Parse {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim() {
        "" | "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" => Ok(false),
        _ => Err(ConfigError::Parse {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

fn out_of_range(key: &str, value: impl ToString, range: &'static str) -> ConfigError {
    ConfigError::OutOfRange {
        key: key.to_string(),
        value: value.to_string(),
        range,
    }
}

impl AppConfig {
    /// Apply a single `key=value` override. Unknown keys are ignored.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "track" => {
                let url = value.trim();
                if url.is_empty() {
                    return Err(out_of_range(key, "\"\"", "non-empty"));
                }
                self.audio.track_url = url.to_string();
            }
            "strips" => {
                let n: usize = parse(key, value)?;
                if !(1..=4096).contains(&n) {
                    return Err(out_of_range(key, n, "1..=4096"));
                }
                self.scene.strip_count = n;
            }
            "spacing" => {
                let s: f32 = parse(key, value)?;
                if !(s.is_finite() && s > 0.0) {
                    return Err(out_of_range(key, s, "> 0"));
                }
                self.scene.spacing = s;
            }
            "smoothing" => {
                let s: f32 = parse(key, value)?;
                if !(s > 0.0 && s <= 1.0) {
                    return Err(out_of_range(key, s, "(0, 1]"));
                }
                self.scene.smoothing = s;
            }
            "fft" => {
                let n: u32 = parse(key, value)?;
                if !n.is_power_of_two() || !(FFT_SIZE_MIN..=FFT_SIZE_MAX).contains(&n) {
                    return Err(out_of_range(key, n, "power of two in 32..=32768"));
                }
                self.audio.fft_size = n;
            }
            "reactivity" => {
                self.scene.reactivity = match value.trim() {
                    "always" => Reactivity::Always,
                    "playing" => Reactivity::WhilePlaying,
                    _ => {
                        return Err(ConfigError::Parse {
                            key: key.to_string(),
                            value: value.to_string(),
                        })
                    }
                };
            }
            "controls" => self.scene.controls_enabled = parse_flag(key, value)?,
            "damping" => self.scene.damping = parse_flag(key, value)?,
            "loop" => self.audio.loop_track = parse_flag(key, value)?,
            "volume" => {
                let v: f32 = parse(key, value)?;
                if !(0.0..=1.0).contains(&v) {
                    return Err(out_of_range(key, v, "0..=1"));
                }
                self.audio.volume = v;
            }
            _ => log::debug!("[config] ignoring unknown key {:?}", key),
        }
        Ok(())
    }

    /// Apply every pair, logging and skipping the ones that fail validation.
    /// Returns the rejected overrides.
    pub fn apply_overrides<'a, I>(&mut self, pairs: I) -> Vec<ConfigError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut rejected = Vec::new();
        for (key, value) in pairs {
            if let Err(e) = self.set(key, value) {
                log::warn!("[config] {}; keeping default", e);
                rejected.push(e);
            }
        }
        if self.scene.strip_count > self.audio.bin_count() {
            log::warn!(
                "[config] {} strips but only {} bins; trailing strips stay silent",
                self.scene.strip_count,
                self.audio.bin_count()
            );
        }
        rejected
    }
}
