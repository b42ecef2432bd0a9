use std::{fmt, path::Path};

use serde::{Deserialize, Serialize};

use crate::{color::Rgb, random::RandomSource, FireworksError, Result};

/// Top-level configuration for one animation run.
///
/// Every field is a tunable constant; nothing here changes while the
/// animation runs. Missing sections in a JSON file fall back to the
/// [`Preset::Recording`] values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FireworksConfig {
    pub canvas: CanvasConfig,
    pub timing: TimingConfig,
    pub physics: PhysicsConfig,
    pub launch: LaunchConfig,
    pub burst: BurstConfig,
    pub palette: PaletteConfig,
    pub render: RenderConfig,
}

impl Default for FireworksConfig {
    fn default() -> Self {
        Self::recording()
    }
}

/// The two shipped looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Portrait 720x1280 starbursts with random hues, tuned for video export.
    Recording,
    /// Dense golden chrysanthemum rings with glow, tuned for a fullscreen display.
    Desktop,
}

impl Preset {
    pub fn name(self) -> &'static str {
        match self {
            Preset::Recording => "recording",
            Preset::Desktop => "desktop",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FireworksConfig {
    pub fn preset(preset: Preset) -> Self {
        match preset {
            Preset::Recording => Self::recording(),
            Preset::Desktop => Self::desktop(),
        }
    }

    /// Video-aligned portrait render with loose random-angle bursts.
    pub fn recording() -> Self {
        Self {
            canvas: CanvasConfig {
                width: 720,
                height: 1280,
            },
            timing: TimingConfig {
                fps: 30,
                duration_seconds: 7.67,
                tail_seconds: 0.25,
            },
            physics: PhysicsConfig {
                gravity: 0.15,
                air_drag: 0.995,
                rocket_gravity_scale: 0.6,
            },
            launch: LaunchConfig {
                schedule: vec![0.6, 2.2, 3.6, 5.0, 6.2],
                horizontal_band: SampleRange::new(0.2, 0.8),
                target_band: SampleRange::new(0.20, 0.45),
                rocket_speed: SampleRange::new(16.0, 22.0),
                drift: 1.2,
                launch_inset: 10.0,
            },
            burst: BurstConfig {
                particle_count: 140,
                pattern: BurstPattern::Random,
                ring_jitter: 0.01,
                speed: SampleRange::new(2.0, 7.5),
                lifetime: TickRange::new(45, 75),
                size: SampleRange::new(1.4, 2.2),
            },
            palette: PaletteConfig {
                base_hue: None,
                hue_jitter: 0.03,
                saturation: SampleRange::new(1.0, 1.0),
                value: 1.0,
            },
            render: RenderConfig {
                background: Rgb(6, 8, 12),
                trail_alpha: 30,
                trail_blend: TrailBlend::Replace,
                rocket_color: Rgb(255, 240, 200),
                rocket_radius: 3,
                flicker: 0.0,
                glow: None,
            },
        }
    }

    /// Fullscreen golden ring bursts with a denser trail and bloom.
    pub fn desktop() -> Self {
        Self {
            canvas: CanvasConfig {
                width: 1920,
                height: 1080,
            },
            timing: TimingConfig {
                fps: 30,
                duration_seconds: 8.0,
                tail_seconds: 0.25,
            },
            physics: PhysicsConfig {
                gravity: 0.12,
                air_drag: 0.992,
                rocket_gravity_scale: 0.6,
            },
            launch: LaunchConfig {
                schedule: vec![0.5, 1.6, 2.7, 3.8, 4.9, 6.0],
                horizontal_band: SampleRange::new(0.2, 0.8),
                target_band: SampleRange::new(0.25, 0.45),
                rocket_speed: SampleRange::new(18.0, 24.0),
                drift: 1.2,
                launch_inset: 10.0,
            },
            burst: BurstConfig {
                particle_count: 180,
                pattern: BurstPattern::Ring,
                ring_jitter: 0.01,
                speed: SampleRange::new(4.5, 5.2),
                lifetime: TickRange::new(55, 82),
                size: SampleRange::new(1.6, 2.4),
            },
            palette: PaletteConfig {
                base_hue: Some(0.12),
                hue_jitter: 0.02,
                saturation: SampleRange::new(0.9, 1.0),
                value: 1.0,
            },
            render: RenderConfig {
                background: Rgb(4, 6, 10),
                trail_alpha: 22,
                trail_blend: TrailBlend::Replace,
                rocket_color: Rgb(255, 240, 200),
                rocket_radius: 3,
                flicker: 0.15,
                glow: Some(GlowConfig {
                    probability: 0.6,
                    brightness: 0.6,
                    radius_scale: 2.0,
                    min_radius: 2,
                }),
            },
        }
    }

    /// Parses a JSON document, overlaying it on the default preset, and
    /// validates the result.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Replaces the canvas size, e.g. with the display size discovered at
    /// startup.
    pub fn with_canvas(mut self, width: u32, height: u32) -> Self {
        self.canvas = CanvasConfig { width, height };
        self
    }

    /// Rejects configurations that could make sampling ill-formed. Runs once
    /// at load time; the simulation assumes a validated config.
    pub fn validate(&self) -> Result<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(FireworksError::invalid_config(
                "canvas",
                format!(
                    "dimensions must be non-zero, got {}x{}",
                    self.canvas.width, self.canvas.height
                ),
            ));
        }
        if self.timing.fps == 0 {
            return Err(FireworksError::invalid_config(
                "timing.fps",
                "must be positive",
            ));
        }
        non_negative("timing.duration_seconds", self.timing.duration_seconds)?;
        non_negative("timing.tail_seconds", self.timing.tail_seconds)?;

        finite("physics.gravity", self.physics.gravity)?;
        finite("physics.rocket_gravity_scale", self.physics.rocket_gravity_scale)?;
        finite("physics.air_drag", self.physics.air_drag)?;
        if self.physics.air_drag <= 0.0 {
            return Err(FireworksError::invalid_config(
                "physics.air_drag",
                "must be a positive multiplier",
            ));
        }

        self.launch.validate()?;
        self.burst.validate()?;
        self.palette.validate()?;
        self.render.validate(&self.burst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    pub fps: u32,
    pub duration_seconds: f32,
    /// Idle time after `duration_seconds` before the run returns. Nothing is
    /// rendered or recorded during it.
    pub tail_seconds: f32,
}

impl TimingConfig {
    pub fn tick_seconds(&self) -> f32 {
        1.0 / self.fps as f32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsConfig {
    /// Per-tick downward acceleration applied to burst particles.
    pub gravity: f32,
    /// Per-tick velocity multiplier for burst particles; below 1.
    pub air_drag: f32,
    /// Fraction of `gravity` applied to rockets while they ascend.
    pub rocket_gravity_scale: f32,
}

impl PhysicsConfig {
    pub fn rocket_gravity(&self) -> f32 {
        self.gravity * self.rocket_gravity_scale
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchConfig {
    /// Seconds from animation start; non-decreasing.
    pub schedule: Vec<f32>,
    /// Launch x as a fraction of canvas width.
    pub horizontal_band: SampleRange,
    /// Explosion altitude as a fraction of canvas height, measured from the top.
    pub target_band: SampleRange,
    /// Initial upward speed in pixels per tick.
    pub rocket_speed: SampleRange,
    /// Maximum absolute horizontal rocket speed.
    pub drift: f32,
    /// Distance above the bottom edge where rockets start.
    pub launch_inset: f32,
}

impl LaunchConfig {
    fn validate(&self) -> Result<()> {
        let mut previous = 0.0_f32;
        for (index, &offset) in self.schedule.iter().enumerate() {
            if !offset.is_finite() || offset < 0.0 {
                return Err(FireworksError::invalid_config(
                    "launch.schedule",
                    format!("entry {index} must be a non-negative number of seconds, got {offset}"),
                ));
            }
            if offset < previous {
                return Err(FireworksError::invalid_config(
                    "launch.schedule",
                    format!("entry {index} ({offset}) comes before the previous entry ({previous})"),
                ));
            }
            previous = offset;
        }
        self.horizontal_band.validate_fraction("launch.horizontal_band")?;
        self.target_band.validate_fraction("launch.target_band")?;
        self.rocket_speed.validate("launch.rocket_speed")?;
        non_negative("launch.drift", self.drift)?;
        non_negative("launch.launch_inset", self.launch_inset)
    }
}

/// How burst particles are spread around the circle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BurstPattern {
    /// Independent uniform angles in `[0, 2π)`; a loose starburst.
    Random,
    /// Evenly spaced angles with a small jitter; a clean ring.
    Ring,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BurstConfig {
    pub particle_count: usize,
    pub pattern: BurstPattern,
    /// Maximum angular offset in radians for [`BurstPattern::Ring`].
    pub ring_jitter: f32,
    /// Outward speed range. Narrow gives a tight ring, wide a dispersed burst.
    pub speed: SampleRange,
    pub lifetime: TickRange,
    /// Particle radius in pixels.
    pub size: SampleRange,
}

impl BurstConfig {
    fn validate(&self) -> Result<()> {
        non_negative("burst.ring_jitter", self.ring_jitter)?;
        self.speed.validate("burst.speed")?;
        self.size.validate("burst.size")?;
        at_most_radius("burst.size", self.size.max)?;
        self.lifetime.validate("burst.lifetime")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaletteConfig {
    /// Fixed base hue, or `None` to pick a random one per firework.
    pub base_hue: Option<f32>,
    /// Each palette entry's hue is `base ± hue_jitter`.
    pub hue_jitter: f32,
    pub saturation: SampleRange,
    pub value: f32,
}

impl PaletteConfig {
    fn validate(&self) -> Result<()> {
        if let Some(hue) = self.base_hue {
            finite("palette.base_hue", hue)?;
        }
        non_negative("palette.hue_jitter", self.hue_jitter)?;
        self.saturation.validate_fraction("palette.saturation")?;
        unit_interval("palette.value", self.value)
    }
}

/// How the freshly drawn frame is written back into the trail buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrailBlend {
    /// The trail becomes a copy of the frame.
    Replace,
    /// Per-channel maximum of trail and frame.
    Lighten,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    pub background: Rgb,
    /// Opacity of the fade rectangle laid over the trail each tick. Higher
    /// values fade faster and give shorter trails.
    pub trail_alpha: u8,
    pub trail_blend: TrailBlend,
    pub rocket_color: Rgb,
    pub rocket_radius: u32,
    /// Amplitude of the random per-particle brightness shimmer, `0..=1`.
    pub flicker: f32,
    pub glow: Option<GlowConfig>,
}

impl RenderConfig {
    fn validate(&self, burst: &BurstConfig) -> Result<()> {
        unit_interval("render.flicker", self.flicker)?;
        at_most_radius("render.rocket_radius", self.rocket_radius as f32)?;
        if let Some(glow) = &self.glow {
            unit_interval("render.glow.probability", glow.probability)?;
            non_negative("render.glow.brightness", glow.brightness)?;
            non_negative("render.glow.radius_scale", glow.radius_scale)?;
            at_most_radius("render.glow.min_radius", glow.min_radius as f32)?;
            at_most_radius(
                "render.glow.radius_scale",
                burst.size.max * glow.radius_scale,
            )?;
        }
        Ok(())
    }
}

/// Cheap bloom: a dimmer, larger circle drawn under some particles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlowConfig {
    pub probability: f32,
    pub brightness: f32,
    pub radius_scale: f32,
    pub min_radius: u32,
}

/// Inclusive float range sampled uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleRange {
    pub min: f32,
    pub max: f32,
}

impl SampleRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn sample(&self, rng: &mut dyn RandomSource) -> f32 {
        rng.uniform(self.min, self.max)
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    fn validate(&self, field: &str) -> Result<()> {
        finite(field, self.min)?;
        finite(field, self.max)?;
        if self.min > self.max {
            return Err(FireworksError::invalid_config(
                field,
                format!("min {} exceeds max {}", self.min, self.max),
            ));
        }
        Ok(())
    }

    fn validate_fraction(&self, field: &str) -> Result<()> {
        self.validate(field)?;
        unit_interval(field, self.min)?;
        unit_interval(field, self.max)
    }
}

/// Inclusive integer range of ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickRange {
    pub min: u32,
    pub max: u32,
}

impl TickRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn sample(&self, rng: &mut dyn RandomSource) -> u32 {
        rng.uniform_int(self.min, self.max)
    }

    pub fn contains(&self, value: u32) -> bool {
        value >= self.min && value <= self.max
    }

    fn validate(&self, field: &str) -> Result<()> {
        if self.min == 0 {
            return Err(FireworksError::invalid_config(
                field,
                "minimum lifetime must be at least one tick",
            ));
        }
        if self.min > self.max {
            return Err(FireworksError::invalid_config(
                field,
                format!("min {} exceeds max {}", self.min, self.max),
            ));
        }
        Ok(())
    }
}

fn finite(field: &str, value: f32) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(FireworksError::invalid_config(
            field,
            format!("must be finite, got {value}"),
        ))
    }
}

fn non_negative(field: &str, value: f32) -> Result<()> {
    finite(field, value)?;
    if value < 0.0 {
        return Err(FireworksError::invalid_config(
            field,
            format!("must not be negative, got {value}"),
        ));
    }
    Ok(())
}

/// Largest circle radius, in pixels, any particle, rocket or glow may reach.
pub const MAX_RADIUS: u32 = 512;

fn at_most_radius(field: &str, value: f32) -> Result<()> {
    if value > MAX_RADIUS as f32 {
        return Err(FireworksError::invalid_config(
            field,
            format!("radius must not exceed {MAX_RADIUS} pixels, got {value}"),
        ));
    }
    Ok(())
}

fn unit_interval(field: &str, value: f32) -> Result<()> {
    finite(field, value)?;
    if !(0.0..=1.0).contains(&value) {
        return Err(FireworksError::invalid_config(
            field,
            format!("must lie in [0, 1], got {value}"),
        ));
    }
    Ok(())
}
