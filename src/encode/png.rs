use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::code::grid::CodeGrid;
use crate::render::frame::CodeRenderer;

/// File stem shared by the image and its JSON sidecar.
pub fn export_stem(timestamp: i64) -> String {
    format!("audio-code-{}", timestamp)
}

/// Paths of one exported code.
#[derive(Debug)]
pub struct ExportedCode {
    pub image: PathBuf,
    pub sidecar: PathBuf,
}

/// Write `rgba` (square, `size` pixels wide) as an 8-bit RGBA PNG.
pub fn write_png(path: &Path, rgba: &[u8], size: u32) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create image file: {}", path.display()))?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), size, size);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder
        .write_header()
        .with_context(|| format!("Failed to write PNG header: {}", path.display()))?;
    writer
        .write_image_data(rgba)
        .with_context(|| format!("Failed to write PNG data: {}", path.display()))?;
    writer.finish().context("Failed to finish PNG stream")?;
    Ok(())
}

/// Render the code and write `audio-code-<timestamp>.png` plus a `.json`
/// sidecar carrying the raw grid into `dir`.
pub fn export_code(code: &CodeGrid, renderer: &CodeRenderer, dir: &Path) -> Result<ExportedCode> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

    let stem = export_stem(code.metadata.timestamp);
    let image = dir.join(format!("{}.png", stem));
    let sidecar = dir.join(format!("{}.json", stem));

    let pixels = renderer.render(code);
    write_png(&image, &pixels, renderer.size)?;

    let json = code.to_json().context("Failed to serialize code grid")?;
    std::fs::write(&sidecar, json)
        .with_context(|| format!("Failed to write code sidecar: {}", sidecar.display()))?;

    log::info!("Exported {} and {}", image.display(), sidecar.display());

    Ok(ExportedCode { image, sidecar })
}
