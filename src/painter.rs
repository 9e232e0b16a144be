use std::path::Path;

use image::{GrayImage, Luma};
use log::debug;

use crate::error::{Error, Result};
use crate::solver::FractalResult;

/// Writes escape counts as 8-bit grey levels.
///
/// By default a pixel's level is its escape count. With `stretch` the
/// counts are rescaled from `[min, max]` onto `[0, 255]` (a constant image
/// maps to 0); with `invert` the levels are flipped afterwards.
#[derive(Copy, Clone, Debug, Default)]
pub struct GreyscalePainter {
    pub invert: bool,
    pub stretch: bool,
}

impl GreyscalePainter {
    pub fn new(invert: bool, stretch: bool) -> Self {
        Self { invert, stretch }
    }

    fn level(&self, count: u8, min: u8, max: u8) -> u8 {
        let level = if !self.stretch {
            count
        } else if max == min {
            0
        } else {
            let frac = f64::from(count - min) / f64::from(max - min);
            (frac * 255.0).round() as u8
        };
        if self.invert {
            u8::MAX - level
        } else {
            level
        }
    }

    pub fn paint(&self, counts: &FractalResult) -> Result<GrayImage> {
        let width = u32::try_from(counts.ncols())
            .map_err(|_| Error::config(format!("{} columns is too wide", counts.ncols())))?;
        let height = u32::try_from(counts.nrows())
            .map_err(|_| Error::config(format!("{} rows is too tall", counts.nrows())))?;
        let (min, max) = counts
            .iter()
            .fold((u8::MAX, u8::MIN), |(min, max), &v| (min.min(v), max.max(v)));

        Ok(GrayImage::from_fn(width, height, |x, y| {
            Luma([self.level(counts[[y as usize, x as usize]], min, max)])
        }))
    }

    pub fn save<P: AsRef<Path>>(&self, counts: &FractalResult, path: P) -> Result<()> {
        let img = self.paint(counts)?;
        debug!(
            "saving {}x{} image to {}",
            img.width(),
            img.height(),
            path.as_ref().display()
        );
        img.save(path)?;
        Ok(())
    }
}
