use crate::render::OverlaySurface;
use anyhow::{anyhow, Context, Result};
use chrono::Local;
use std::path::{Path, PathBuf};

pub const SNAPSHOT_SUBDIR: &str = "overlay_snapshots";

pub fn timestamped_stem(now: chrono::DateTime<Local>) -> String {
    now.format("%Y%m%d_%H%M%S").to_string()
}

pub fn build_filename(stem: &str, suffix: &str) -> String {
    format!("{}_{}.png", stem, suffix)
}

/// Encodes the rendered overlay surface as a PNG, alpha included. A QA/debug
/// artifact of the painted surface, not annotation persistence.
pub fn write_png(surface: &OverlaySurface, path: &Path) -> Result<()> {
    let (width, height) = surface.size();
    if width == 0 || height == 0 {
        return Err(anyhow!("overlay surface has no pixels to export"));
    }
    let buffer = image::RgbaImage::from_raw(width, height, surface.pixels().to_vec())
        .ok_or_else(|| anyhow!("overlay surface pixel buffer has unexpected length"))?;
    buffer
        .save(path)
        .with_context(|| format!("write overlay snapshot {}", path.display()))
}

/// Writes a timestamped snapshot into `output_dir`, creating it if needed,
/// and returns the file path.
pub fn save_snapshot(surface: &OverlaySurface, output_dir: &Path, suffix: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("create snapshot folder {}", output_dir.display()))?;
    let path = output_dir.join(build_filename(&timestamped_stem(Local::now()), suffix));
    write_png(surface, &path)?;
    tracing::debug!(path = %path.display(), "overlay snapshot written");
    Ok(path)
}
