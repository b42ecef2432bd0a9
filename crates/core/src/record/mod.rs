use std::path::PathBuf;

use crate::{render::Raster, Result};

/// Configuration options for the recording subsystem.
#[derive(Debug, Clone)]
pub struct RecordingSettings {
    pub output_dir: PathBuf,
    /// File name prefix for each frame; the frame index is appended.
    pub frame_prefix: String,
    pub fps: u32,
}

impl Default for RecordingSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("frames"),
            frame_prefix: "fireworks_".to_string(),
            fps: 30,
        }
    }
}

/// Destination for presented frames, e.g. an image sequence or an encoder
/// pipe. Implemented outside the core.
pub trait FrameSink {
    fn write_frame(&mut self, index: u64, frame: &Raster) -> Result<()>;

    /// Called once after the last frame.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Forwards frames to an optional [`FrameSink`] while recording is active.
#[derive(Default)]
pub struct Recorder {
    settings: RecordingSettings,
    sink: Option<Box<dyn FrameSink>>,
    is_recording: bool,
    frames_written: u64,
}

impl Recorder {
    pub fn new(settings: RecordingSettings, sink: Box<dyn FrameSink>) -> Self {
        Self {
            settings,
            sink: Some(sink),
            is_recording: false,
            frames_written: 0,
        }
    }

    /// A recorder that drops every frame.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn start(&mut self) -> Result<()> {
        self.is_recording = self.sink.is_some();
        Ok(())
    }

    pub fn stop(&mut self) -> Result<()> {
        if self.is_recording {
            self.is_recording = false;
            if let Some(sink) = self.sink.as_mut() {
                sink.finish()?;
            }
            tracing::info!(
                frames = self.frames_written,
                dir = %self.settings.output_dir.display(),
                "recording finished"
            );
        }
        Ok(())
    }

    pub fn is_recording(&self) -> bool {
        self.is_recording
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    pub fn settings(&self) -> &RecordingSettings {
        &self.settings
    }

    pub fn record(&mut self, frame: &Raster) -> Result<()> {
        if !self.is_recording {
            return Ok(());
        }
        if let Some(sink) = self.sink.as_mut() {
            sink.write_frame(self.frames_written, frame)?;
            self.frames_written += 1;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Recorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recorder")
            .field("settings", &self.settings)
            .field("has_sink", &self.sink.is_some())
            .field("is_recording", &self.is_recording)
            .field("frames_written", &self.frames_written)
            .finish()
    }
}
