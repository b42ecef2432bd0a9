use std::{
    io::BufRead,
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use clap::{Args, Parser, Subcommand, ValueEnum};
use fireworks_core::{
    Animation, FireworksConfig, FrameClock, PlaybackClock, Preset, Recorder, RecordingSettings,
    RunSummary,
};
use tracing_subscriber::EnvFilter;

mod clock;
mod sink;

use clock::PacedClock;
use sink::PngSequenceSink;

fn main() -> fireworks_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render(args) => run_render(&args),
        Commands::Play(args) => run_play(&args),
        Commands::Preset { preset, output } => dump_preset(preset.into(), output.as_ref()),
    }
}

fn run_render(args: &RunArgs) -> fireworks_core::Result<()> {
    let config = args.load_config()?;
    tracing::info!(preset = ?args.preset, output = ?args.output, "rendering offline");

    let mut clock = PlaybackClock::new(config.timing.fps);
    let stop = AtomicBool::new(false);
    let summary = run_animation(args, config, &mut clock, &stop)?;
    report(&summary);
    Ok(())
}

fn run_play(args: &RunArgs) -> fireworks_core::Result<()> {
    let config = args.load_config()?;
    tracing::info!(preset = ?args.preset, "playing in real time; press Enter to stop");

    let stop = Arc::new(AtomicBool::new(false));
    watch_stdin(stop.clone());

    let mut clock = PacedClock::start(config.timing.fps);
    let summary = run_animation(args, config, &mut clock, &stop)?;
    report(&summary);
    Ok(())
}

fn run_animation(
    args: &RunArgs,
    config: FireworksConfig,
    clock: &mut dyn FrameClock,
    stop: &AtomicBool,
) -> fireworks_core::Result<RunSummary> {
    let fps = config.timing.fps;
    let mut animation = match args.seed {
        Some(seed) => Animation::seeded(config, seed)?,
        None => Animation::new(config)?,
    };

    let mut recorder = match &args.output {
        Some(dir) => {
            let settings = RecordingSettings {
                output_dir: dir.clone(),
                fps,
                ..RecordingSettings::default()
            };
            let sink = PngSequenceSink::create(&settings)?;
            Recorder::new(settings, Box::new(sink))
        }
        None => Recorder::disabled(),
    };

    animation.run(clock, stop, &mut recorder)
}

fn dump_preset(preset: Preset, output: Option<&PathBuf>) -> fireworks_core::Result<()> {
    let json = FireworksConfig::preset(preset).to_json_pretty()?;
    match output {
        Some(path) => {
            std::fs::write(path, json)?;
            tracing::info!(%preset, path = %path.display(), "preset written");
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// Requests a stop as soon as a line arrives on stdin. A closed stdin never
/// stops the run.
fn watch_stdin(stop: Arc<AtomicBool>) {
    std::thread::spawn(move || {
        let mut line = String::new();
        if let Ok(read) = std::io::stdin().lock().read_line(&mut line) {
            if read > 0 {
                stop.store(true, Ordering::Relaxed);
            }
        }
    });
}

fn report(summary: &RunSummary) {
    tracing::info!(
        ticks = summary.ticks,
        launched = summary.launched,
        exploded = summary.exploded,
        stopped = summary.stopped,
        elapsed = summary.last_elapsed,
        "done"
    );
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Scheduled fireworks with particle trails", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render the animation as fast as possible with a fixed-step clock.
    Render(RunArgs),
    /// Run the animation in real time at the configured frame rate.
    Play(RunArgs),
    /// Print a preset as JSON, as a starting point for `--config`.
    Preset {
        #[arg(value_enum)]
        preset: PresetArg,
        /// Write to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Built-in look to start from.
    #[arg(short, long, value_enum, conflicts_with = "config")]
    preset: Option<PresetArg>,
    /// JSON configuration file; missing sections use the recording preset.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Directory to write PNG frames into.
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Override the canvas width, e.g. with the display width.
    #[arg(long, requires = "height")]
    width: Option<u32>,
    /// Override the canvas height.
    #[arg(long, requires = "width")]
    height: Option<u32>,
    /// Seed for reproducible runs.
    #[arg(long)]
    seed: Option<u64>,
}

impl RunArgs {
    fn load_config(&self) -> fireworks_core::Result<FireworksConfig> {
        let mut config = match &self.config {
            Some(path) => FireworksConfig::load(path)?,
            None => FireworksConfig::preset(self.preset.unwrap_or(PresetArg::Recording).into()),
        };
        if let (Some(width), Some(height)) = (self.width, self.height) {
            config = config.with_canvas(width, height);
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PresetArg {
    Recording,
    Desktop,
}

impl From<PresetArg> for Preset {
    fn from(value: PresetArg) -> Self {
        match value {
            PresetArg::Recording => Preset::Recording,
            PresetArg::Desktop => Preset::Desktop,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn canvas_override_applies_to_the_preset() {
        let cli = Cli::parse_from([
            "fireworks", "render", "--preset", "desktop", "--width", "800", "--height", "600",
        ]);
        let Commands::Render(args) = cli.command else {
            panic!("expected render");
        };
        let config = args.load_config().unwrap();
        assert_eq!((config.canvas.width, config.canvas.height), (800, 600));
        assert_eq!(config.burst.particle_count, 180);
    }

    #[test]
    fn preset_and_config_conflict() {
        let result = Cli::try_parse_from([
            "fireworks", "render", "--preset", "desktop", "--config", "show.json",
        ]);
        assert!(result.is_err());
    }
}
