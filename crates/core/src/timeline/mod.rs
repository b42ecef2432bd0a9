use crate::{FireworksError, Result};

/// Source of elapsed time for the run loop.
///
/// Implementations own frame pacing: [`FrameClock::wait_for_next_tick`] is
/// the only point where the loop yields between ticks.
pub trait FrameClock {
    /// Seconds since the animation started. Must never decrease.
    fn elapsed(&self) -> f32;

    /// Blocks (or simply advances) until the next tick is due.
    fn wait_for_next_tick(&mut self);
}

/// Deterministic clock that advances by exactly one frame per tick without
/// sleeping. Used for offline rendering and tests.
#[derive(Debug, Clone)]
pub struct PlaybackClock {
    fps: u32,
    frame: u64,
}

impl PlaybackClock {
    pub fn new(fps: u32) -> Self {
        Self {
            fps: fps.max(1),
            frame: 0,
        }
    }

    pub fn reset(&mut self) {
        self.frame = 0;
    }

    pub fn advance(&mut self, frames: u64) {
        self.frame += frames;
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }
}

impl FrameClock for PlaybackClock {
    fn elapsed(&self) -> f32 {
        (self.frame as f64 / self.fps as f64) as f32
    }

    fn wait_for_next_tick(&mut self) {
        self.advance(1);
    }
}

/// One fired schedule entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledLaunch {
    pub index: usize,
    pub time_seconds: f32,
}

/// Ordered list of launch offsets in seconds from animation start.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaunchSchedule {
    offsets: Vec<f32>,
}

impl LaunchSchedule {
    /// Rejects negative, non-finite or descending offsets.
    pub fn new(offsets: Vec<f32>) -> Result<Self> {
        for (index, pair) in offsets.windows(2).enumerate() {
            if pair[1] < pair[0] {
                return Err(FireworksError::invalid_config(
                    "launch.schedule",
                    format!(
                        "entry {} ({}) comes before the previous entry ({})",
                        index + 1,
                        pair[1],
                        pair[0]
                    ),
                ));
            }
        }
        if let Some(bad) = offsets.iter().find(|o| !o.is_finite() || **o < 0.0) {
            return Err(FireworksError::invalid_config(
                "launch.schedule",
                format!("offsets must be non-negative seconds, got {bad}"),
            ));
        }
        Ok(Self { offsets })
    }

    pub fn offsets(&self) -> &[f32] {
        &self.offsets
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

/// Walks a [`LaunchSchedule`] with a cursor, firing each entry exactly once.
#[derive(Debug, Default)]
pub struct LaunchScheduler {
    schedule: LaunchSchedule,
    next_launch: usize,
}

impl LaunchScheduler {
    pub fn new(schedule: LaunchSchedule) -> Self {
        Self {
            schedule,
            next_launch: 0,
        }
    }

    /// Returns every unfired entry whose offset is at or before `elapsed`,
    /// in order. Several entries fire together when time jumps past them.
    pub fn tick(&mut self, elapsed: f32) -> Vec<ScheduledLaunch> {
        let mut fired = Vec::new();
        while let Some(&time_seconds) = self.schedule.offsets.get(self.next_launch) {
            if elapsed < time_seconds {
                break;
            }
            fired.push(ScheduledLaunch {
                index: self.next_launch,
                time_seconds,
            });
            self.next_launch += 1;
        }
        fired
    }

    pub fn reset(&mut self) {
        self.next_launch = 0;
    }

    pub fn fired(&self) -> usize {
        self.next_launch
    }

    pub fn remaining(&self) -> usize {
        self.schedule.len() - self.next_launch
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    pub fn schedule(&self) -> &LaunchSchedule {
        &self.schedule
    }
}
