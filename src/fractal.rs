//! Fractal families and their escape-time recurrences.
use std::fmt;
use std::str::FromStr;

use crate::complex::{c, C};
use crate::coord::Viewport;
use crate::error::{Error, Result};

pub const ESCAPE_RADIUS: f64 = 2.0;

pub const JULIA_C: C<f64> = C { re: -0.8, im: 0.156 };

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum Fractal {
    #[default]
    Mandelbrot,
    /// Julia set for a fixed constant `c`.
    Julia(C<f64>),
    BurningShip,
}

impl Fractal {
    pub const NAMES: [&'static str; 3] = ["mandelbrot", "julia", "burning_ship"];

    pub fn name(&self) -> &'static str {
        match self {
            Fractal::Mandelbrot => "mandelbrot",
            Fractal::Julia(_) => "julia",
            Fractal::BurningShip => "burning_ship",
        }
    }

    pub fn default_viewport(&self) -> Viewport {
        match self {
            Fractal::Mandelbrot => Viewport::from_corners(c(-2.0, 1.0), c(2.0, -1.0)),
            Fractal::Julia(_) => Viewport::from_corners(c(-1.5, 1.0), c(1.5, -1.0)),
            Fractal::BurningShip => Viewport::from_corners(c(-2.5, 1.0), c(1.0, -1.0)),
        }
    }

    /// Value of `z` before the first step.
    #[inline]
    pub fn initial(&self, sample: C<f64>) -> C<f64> {
        match self {
            Fractal::Julia(_) => sample,
            Fractal::Mandelbrot | Fractal::BurningShip => C::new(0.0, 0.0),
        }
    }

    #[inline]
    pub fn step(&self, z: C<f64>, sample: C<f64>) -> C<f64> {
        match self {
            Fractal::Mandelbrot => (z * z) + sample,
            Fractal::Julia(k) => (z * z) + *k,
            Fractal::BurningShip => {
                let w = C::new(z.re.abs(), z.im.abs());
                (w * w) + sample
            }
        }
    }
}

#[inline]
pub fn escaped(z: C<f64>) -> bool {
    z.norm() > ESCAPE_RADIUS
}

impl fmt::Display for Fractal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fractal::Julia(k) => write!(f, "julia(c={})", k),
            other => f.write_str(other.name()),
        }
    }
}

impl FromStr for Fractal {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mandelbrot" => Ok(Fractal::Mandelbrot),
            "julia" => Ok(Fractal::Julia(JULIA_C)),
            "burning_ship" => Ok(Fractal::BurningShip),
            other => Err(Error::config(format!(
                "unknown fractal '{}' (expected one of {})",
                other,
                Fractal::NAMES.join(", ")
            ))),
        }
    }
}

/// A fractal bound to an iteration budget. Counts are reported as `u8`,
/// so the budget is capped at 255.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Suite {
    pub fractal: Fractal,
    pub max_iter: u8,
}

impl Suite {
    pub fn new(fractal: Fractal, max_iter: u32) -> Result<Self> {
        let max_iter = u8::try_from(max_iter).map_err(|_| {
            Error::config(format!("max_iter must be at most {}, got {}", u8::MAX, max_iter))
        })?;
        Ok(Self { fractal, max_iter })
    }

    /// First step (1-based) at which `|z| > 2`, or 0 if the sample is still
    /// bounded after `max_iter` steps.
    pub fn escape_count(&self, sample: C<f64>) -> u8 {
        let mut z = self.fractal.initial(sample);
        for n in 1..=self.max_iter {
            z = self.fractal.step(z, sample);
            if escaped(z) {
                return n;
            }
        }
        0
    }
}
