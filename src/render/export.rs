use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use plotters::coord::Shift;
use plotters::prelude::*;

use super::style::PlotStyle;
use crate::error::PlotError;

/// Output image format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum ImageFormat {
    Png,
    #[value(alias = "jpeg")]
    Jpg,
    Svg,
}

impl ImageFormat {
    pub const ALL: [ImageFormat; 3] = [ImageFormat::Png, ImageFormat::Jpg, ImageFormat::Svg];

    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpg => "jpg",
            ImageFormat::Svg => "svg",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A plot that can be drawn onto any plotters backend.
pub trait Figure {
    fn style(&self) -> PlotStyle;

    /// Output file name without extension.
    fn file_stem(&self) -> String;

    /// Draw onto `root`, which already has a white background. Line widths,
    /// markers and text are multiplied by `scale`.
    fn draw<DB>(&self, root: &DrawingArea<DB, Shift>, scale: f64) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static;
}

/// Write `figure` to `out_dir` once per format and return the written paths.
pub fn save<F: Figure>(figure: &F, out_dir: &Path, formats: &[ImageFormat]) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory: {}", out_dir.display()))?;

    let stem = figure.file_stem();
    let mut written = Vec::with_capacity(formats.len());
    for &format in formats {
        let path = out_dir.join(format!("{stem}.{}", format.extension()));
        save_as(figure, &path, format)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        log::info!("Saved {}", path.display());
        written.push(path);
    }
    Ok(written)
}

/// Write `figure` to `path` in `format`.
pub fn save_as<F: Figure>(figure: &F, path: &Path, format: ImageFormat) -> Result<()> {
    match format {
        ImageFormat::Svg => save_svg(figure, path),
        ImageFormat::Png => save_raster(figure, path, image::ImageFormat::Png),
        ImageFormat::Jpg => save_raster(figure, path, image::ImageFormat::Jpeg),
    }
}

fn save_svg<F: Figure>(figure: &F, path: &Path) -> Result<()> {
    let style = figure.style();
    let root = SVGBackend::new(path, (style.width, style.height)).into_drawing_area();
    root.fill(&WHITE)?;
    figure.draw(&root, 1.0)?;
    root.present()?;
    Ok(())
}

/// Render into an RGB buffer at the style's raster scale and encode it.
fn save_raster<F: Figure>(figure: &F, path: &Path, encoding: image::ImageFormat) -> Result<()> {
    let style = figure.style();
    let scale = style.raster_scale;
    let width = (style.width as f64 * scale).round() as u32;
    let height = (style.height as f64 * scale).round() as u32;

    let mut buffer = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE)?;
        figure.draw(&root, scale)?;
        root.present()?;
    }

    let image = image::RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
        PlotError::Drawing(format!("pixel buffer does not match a {width}×{height} image"))
    })?;
    image.save_with_format(path, encoding)?;
    log::debug!("{}: {width}×{height} px", path.display());
    Ok(())
}
