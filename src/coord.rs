use std::fmt;
use std::ops::Range;

use ndarray::{Array1, Array2};

use crate::complex::{c, C};
use crate::error::{Error, Result};
use crate::threads::{RangeSplitter, Split};

pub type SampleGrid = Array2<C<f64>>;

/// Rectangle of the complex plane given by its upper-left and lower-right
/// corners.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    pub upper_left: C<f64>,
    pub lower_right: C<f64>,
}

impl Viewport {
    pub fn new(upper_left: C<f64>, lower_right: C<f64>) -> Result<Self> {
        let ordered = upper_left.re <= lower_right.re && upper_left.im >= lower_right.im;
        if !ordered {
            return Err(Error::config(format!(
                "viewport corner {} is not above-left of {}",
                upper_left, lower_right
            )));
        }
        Ok(Self::from_corners(upper_left, lower_right))
    }

    pub(crate) const fn from_corners(upper_left: C<f64>, lower_right: C<f64>) -> Self {
        Self {
            upper_left,
            lower_right,
        }
    }

    pub fn width(&self) -> f64 {
        self.lower_right.re - self.upper_left.re
    }

    pub fn height(&self) -> f64 {
        self.upper_left.im - self.lower_right.im
    }

    pub fn sample_grid(&self, n_rows: usize, n_columns: usize) -> Result<SampleGrid> {
        sample_grid(self.upper_left, self.lower_right, n_rows, n_columns)
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.upper_left, self.lower_right)
    }
}

/// Interpolates an `n_rows` x `n_columns` grid of samples between two
/// corners. Both corners are sampled exactly.
pub fn sample_grid(
    upper_left: C<f64>,
    lower_right: C<f64>,
    n_rows: usize,
    n_columns: usize,
) -> Result<SampleGrid> {
    sample_rows(upper_left, lower_right, n_rows, n_columns, 0..n_rows)
}

/// Same lattice as [`sample_grid`], restricted to the global row indices in
/// `rows`. Stacking the row ranges of a partition gives back the full grid
/// bit for bit.
pub fn sample_rows(
    upper_left: C<f64>,
    lower_right: C<f64>,
    n_rows: usize,
    n_columns: usize,
    rows: Range<usize>,
) -> Result<SampleGrid> {
    if n_rows < 2 || n_columns < 2 {
        return Err(Error::DegenerateGrid {
            rows: n_rows,
            columns: n_columns,
        });
    }
    if rows.start > rows.end || rows.end > n_rows {
        return Err(Error::config(format!(
            "row range {:?} is outside 0..{}",
            rows, n_rows
        )));
    }

    let re_step = (lower_right.re - upper_left.re) / (n_columns as f64 - 1.0);
    let im_step = (lower_right.im - upper_left.im) / (n_rows as f64 - 1.0);
    let re: Array1<f64> = (0..n_columns)
        .map(|col| upper_left.re + col as f64 * re_step)
        .collect();
    let im: Array1<f64> = rows
        .clone()
        .map(|row| upper_left.im + row as f64 * im_step)
        .collect();

    Ok(Array2::from_shape_fn((rows.len(), n_columns), |(r, col)| {
        c(re[col], im[r])
    }))
}

/// A viewport at a fixed resolution: the whole of one render.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Frame {
    pub viewport: Viewport,
    pub n_rows: usize,
    pub n_columns: usize,
}

impl Frame {
    pub fn new(viewport: Viewport, n_rows: usize, n_columns: usize) -> Result<Self> {
        if n_rows < 2 || n_columns < 2 {
            return Err(Error::DegenerateGrid {
                rows: n_rows,
                columns: n_columns,
            });
        }
        Ok(Self {
            viewport,
            n_rows,
            n_columns,
        })
    }

    pub fn sample_grid(&self) -> Result<SampleGrid> {
        self.viewport.sample_grid(self.n_rows, self.n_columns)
    }

    /// The single band covering every row.
    pub fn band(&self) -> Band {
        Band {
            index: 0,
            viewport: self.viewport,
            rows: 0..self.n_rows,
            frame: *self,
        }
    }

    pub fn bands(&self, n: usize) -> Vec<Band> {
        self.band().split_to_vec(n)
    }
}

/// Horizontal slice of a frame: a contiguous row range plus the part of the
/// complex plane it covers.
#[derive(Clone, Debug, PartialEq)]
pub struct Band {
    pub index: usize,
    pub viewport: Viewport,
    pub rows: Range<usize>,
    frame: Frame,
}

impl Band {
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_columns(&self) -> usize {
        self.frame.n_columns
    }

    /// Samples the band's rows on the lattice of its frame, so results do
    /// not depend on how the frame was partitioned.
    pub fn sample_grid(&self) -> Result<SampleGrid> {
        let Frame {
            viewport,
            n_rows,
            n_columns,
        } = self.frame;
        sample_rows(
            viewport.upper_left,
            viewport.lower_right,
            n_rows,
            n_columns,
            self.rows.clone(),
        )
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "band {} rows {}..{} {}",
            self.index, self.rows.start, self.rows.end, self.viewport
        )
    }
}

impl Split for Band {
    /// Cuts the band into `n` bands of equal row count (the last one takes
    /// the remainder) and `n` equal-height slices of the plane. `n` is
    /// clamped to the number of rows.
    fn split_to_vec(self, n: usize) -> Vec<Self> {
        let n = n.clamp(1, self.n_rows().max(1));
        let upper_left = self.viewport.upper_left;
        let lower_right = self.viewport.lower_right;
        let slice = (upper_left.im - lower_right.im) / n as f64;

        RangeSplitter::split(self.rows.start, self.rows.end, n)
            .into_iter()
            .enumerate()
            .map(|(i, rows)| {
                let upper = c(upper_left.re, upper_left.im - i as f64 * slice);
                let lower = if i == n - 1 {
                    lower_right
                } else {
                    c(lower_right.re, upper_left.im - (i + 1) as f64 * slice)
                };
                Band {
                    index: i,
                    viewport: Viewport::from_corners(upper, lower),
                    rows,
                    frame: self.frame,
                }
            })
            .collect()
    }
}
