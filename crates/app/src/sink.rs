use std::path::PathBuf;

use fireworks_core::{FireworksError, FrameSink, Raster, RecordingSettings, Result};

/// Writes every frame as a numbered PNG, ready to be fed to an encoder such
/// as `ffmpeg -framerate 30 -i fireworks_%05d.png`.
#[derive(Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    prefix: String,
}

impl PngSequenceSink {
    pub fn create(settings: &RecordingSettings) -> Result<Self> {
        std::fs::create_dir_all(&settings.output_dir)?;
        Ok(Self {
            dir: settings.output_dir.clone(),
            prefix: settings.frame_prefix.clone(),
        })
    }

    fn frame_path(&self, index: u64) -> PathBuf {
        self.dir.join(format!("{}{index:05}.png", self.prefix))
    }
}

impl FrameSink for PngSequenceSink {
    fn write_frame(&mut self, index: u64, frame: &Raster) -> Result<()> {
        let path = self.frame_path(index);
        image::save_buffer(
            &path,
            frame.as_bytes(),
            frame.width(),
            frame.height(),
            image::ColorType::Rgba8,
        )
        .map_err(|err| FireworksError::msg(format!("failed to write {}: {err}", path.display())))?;
        tracing::trace!(path = %path.display(), "frame written");
        Ok(())
    }
}
