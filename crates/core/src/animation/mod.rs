use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::{
    config::FireworksConfig,
    random::{RandomSource, RngSource},
    record::Recorder,
    render::{FrameCompositor, Raster, Renderer, SoftwareRenderer},
    simulation::{Simulation, TickReport},
    timeline::FrameClock,
    Result,
};

/// Outcome of [`Animation::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunSummary {
    pub ticks: u64,
    pub launched: usize,
    pub exploded: usize,
    /// Fireworks still on screen when the loop ended.
    pub active: usize,
    pub last_elapsed: f32,
    /// The loop ended because a stop was requested.
    pub stopped: bool,
}

/// The full per-tick pipeline: simulation step, composition and software
/// rendering.
#[derive(Debug)]
pub struct Animation {
    config: Arc<FireworksConfig>,
    simulation: Simulation,
    compositor: FrameCompositor,
    renderer: SoftwareRenderer,
}

impl Animation {
    /// Validates the configuration and wires the pipeline with entropy-seeded
    /// random sources.
    pub fn new(config: FireworksConfig) -> Result<Self> {
        Self::with_sources(
            config,
            Box::new(RngSource::from_entropy()),
            Box::new(RngSource::from_entropy()),
        )
    }

    /// Same as [`Animation::new`] but reproducible.
    pub fn seeded(config: FireworksConfig, seed: u64) -> Result<Self> {
        Self::with_sources(
            config,
            Box::new(RngSource::seeded(seed)),
            Box::new(RngSource::seeded(seed.wrapping_add(1))),
        )
    }

    /// `physics_rng` drives launches and bursts; `render_rng` drives glow and
    /// flicker so visual-only rolls never perturb the simulation.
    pub fn with_sources(
        config: FireworksConfig,
        physics_rng: Box<dyn RandomSource>,
        render_rng: Box<dyn RandomSource>,
    ) -> Result<Self> {
        config.validate()?;
        let config = Arc::new(config);
        let simulation = Simulation::new(config.clone(), physics_rng)?;
        let compositor = FrameCompositor::new(&config, render_rng);
        let renderer = SoftwareRenderer::new(config.canvas.width, config.canvas.height);
        Ok(Self {
            config,
            simulation,
            compositor,
            renderer,
        })
    }

    /// Advances the simulation to `elapsed` and renders the resulting frame.
    pub fn tick(&mut self, elapsed: f32) -> Result<TickReport> {
        let report = self.simulation.step(elapsed);
        let commands = self.compositor.compose(self.simulation.fireworks());
        self.renderer.render(commands)?;
        Ok(report)
    }

    /// Runs ticks until the configured duration has elapsed or `stop` is set.
    ///
    /// The stop flag is checked once per tick, before any work. The duration
    /// check happens after a tick completes. The recorder is stopped even when
    /// a tick or the sink fails. A finished run then idles on the clock for
    /// `tail_seconds` without rendering or recording anything.
    pub fn run(
        &mut self,
        clock: &mut dyn FrameClock,
        stop: &AtomicBool,
        recorder: &mut Recorder,
    ) -> Result<RunSummary> {
        let timing = self.config.timing;
        let mut summary = RunSummary::default();

        tracing::info!(
            width = self.config.canvas.width,
            height = self.config.canvas.height,
            fps = timing.fps,
            duration = timing.duration_seconds,
            launches = self.config.launch.schedule.len(),
            "animation started"
        );
        recorder.start()?;

        let outcome = self.run_ticks(clock, stop, recorder, &mut summary);
        let finished = recorder.stop();
        if let Err(err) = &outcome {
            tracing::error!(ticks = summary.ticks, error = %err, "animation aborted");
        }
        outcome?;
        finished?;

        tracing::info!(
            ticks = summary.ticks,
            launched = summary.launched,
            exploded = summary.exploded,
            active = summary.active,
            "animation finished"
        );

        if !summary.stopped {
            let cutoff = timing.duration_seconds + timing.tail_seconds;
            while clock.elapsed() < cutoff && !stop.load(Ordering::Relaxed) {
                clock.wait_for_next_tick();
            }
        }
        Ok(summary)
    }

    fn run_ticks(
        &mut self,
        clock: &mut dyn FrameClock,
        stop: &AtomicBool,
        recorder: &mut Recorder,
        summary: &mut RunSummary,
    ) -> Result<()> {
        loop {
            if stop.load(Ordering::Relaxed) {
                summary.stopped = true;
                tracing::info!(elapsed = summary.last_elapsed, "stop requested");
                return Ok(());
            }

            let elapsed = clock.elapsed();
            let report = self.tick(elapsed)?;
            recorder.record(self.renderer.frame())?;

            summary.ticks += 1;
            summary.launched += report.launched;
            summary.exploded += report.exploded;
            summary.active = report.active;
            summary.last_elapsed = elapsed;

            if elapsed >= self.config.timing.duration_seconds {
                return Ok(());
            }
            clock.wait_for_next_tick();
        }
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn frame(&self) -> &Raster {
        self.renderer.frame()
    }

    pub fn config(&self) -> &FireworksConfig {
        &self.config
    }
}
