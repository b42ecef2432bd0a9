//! Core library for the fireworks animation.
//!
//! Rockets launch on a fixed schedule, climb under damped gravity, burst into
//! a ring of particles and fade while a trail buffer smears their motion.
//! Each module owns one stage of that pipeline; windowing, frame pacing and
//! video encoding stay outside and talk to the core through [`FrameClock`],
//! [`Renderer`] and [`FrameSink`].

pub mod animation;
pub mod color;
pub mod config;
pub mod error;
pub mod firework;
pub mod particle;
pub mod random;
pub mod record;
pub mod render;
pub mod simulation;
pub mod timeline;

pub use animation::{Animation, RunSummary};
pub use color::{hsv_to_rgb, Palette, Rgb};
pub use config::{BurstPattern, FireworksConfig, Preset, TrailBlend};
pub use error::{FireworksError, Result};
pub use firework::{Firework, FireworkState, StepOutcome};
pub use particle::Particle;
pub use random::{RandomSource, RngSource, ScriptedSource};
pub use record::{FrameSink, Recorder, RecordingSettings};
pub use render::{DrawCommand, FrameCompositor, Layer, Raster, Rect, Renderer, SoftwareRenderer};
pub use simulation::{Simulation, SimulationStats, TickReport};
pub use timeline::{FrameClock, LaunchSchedule, LaunchScheduler, PlaybackClock, ScheduledLaunch};
