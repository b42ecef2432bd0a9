use std::sync::Arc;

use crate::{
    config::FireworksConfig,
    firework::{Firework, StepOutcome},
    random::RandomSource,
    timeline::{LaunchSchedule, LaunchScheduler},
    Result,
};

/// Counts for a single [`Simulation::step`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub launched: usize,
    pub exploded: usize,
    pub retired: usize,
    pub active: usize,
}

/// Totals accumulated across every tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulationStats {
    pub ticks: u64,
    pub launched: usize,
    pub exploded: usize,
    pub retired: usize,
}

/// Owns the active fireworks and the launch scheduler, and advances both one
/// tick at a time.
pub struct Simulation {
    config: Arc<FireworksConfig>,
    scheduler: LaunchScheduler,
    fireworks: Vec<Firework>,
    rng: Box<dyn RandomSource>,
    stats: SimulationStats,
}

impl Simulation {
    pub fn new(config: Arc<FireworksConfig>, rng: Box<dyn RandomSource>) -> Result<Self> {
        let schedule = LaunchSchedule::new(config.launch.schedule.clone())?;
        Ok(Self {
            config,
            scheduler: LaunchScheduler::new(schedule),
            fireworks: Vec::new(),
            rng,
            stats: SimulationStats::default(),
        })
    }

    /// Launches whatever the schedule says is due at `elapsed`, advances
    /// every firework, then drops the ones that have finished.
    pub fn step(&mut self, elapsed: f32) -> TickReport {
        let mut report = TickReport::default();

        for launch in self.scheduler.tick(elapsed) {
            let firework = Firework::spawn(&self.config, self.rng.as_mut());
            tracing::debug!(
                index = launch.index,
                scheduled = launch.time_seconds,
                elapsed,
                x = firework.rocket_position().x,
                target = firework.target_altitude(),
                "launching firework"
            );
            self.fireworks.push(firework);
            report.launched += 1;
        }

        let physics = &self.config.physics;
        let burst = &self.config.burst;
        let rng = self.rng.as_mut();
        for firework in &mut self.fireworks {
            if firework.step(physics, burst, rng) == StepOutcome::Exploded {
                report.exploded += 1;
            }
        }

        let before = self.fireworks.len();
        self.fireworks.retain(|firework| !firework.is_finished());
        report.retired = before - self.fireworks.len();
        report.active = self.fireworks.len();
        if report.retired > 0 {
            tracing::trace!(retired = report.retired, active = report.active, "fireworks faded out");
        }

        self.stats.ticks += 1;
        self.stats.launched += report.launched;
        self.stats.exploded += report.exploded;
        self.stats.retired += report.retired;
        report
    }

    pub fn fireworks(&self) -> &[Firework] {
        &self.fireworks
    }

    pub fn config(&self) -> &FireworksConfig {
        &self.config
    }

    pub fn stats(&self) -> SimulationStats {
        self.stats
    }

    pub fn scheduler(&self) -> &LaunchScheduler {
        &self.scheduler
    }

    /// No launches left and nothing on screen.
    pub fn is_idle(&self) -> bool {
        self.scheduler.is_exhausted() && self.fireworks.is_empty()
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("scheduler", &self.scheduler)
            .field("fireworks", &self.fireworks.len())
            .field("stats", &self.stats)
            .finish()
    }
}
