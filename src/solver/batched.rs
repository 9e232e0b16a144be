use ndarray::{Array2, Zip};

use crate::complex::C;
use crate::coord::SampleGrid;
use crate::fractal::{escaped, Suite};
use crate::solver::{FractalResult, Solver};

/// Samples that have not escaped yet. Members only ever leave.
#[derive(Clone, Debug)]
pub struct ActiveSet {
    mask: Array2<bool>,
    len: usize,
}

impl ActiveSet {
    pub fn full(dim: (usize, usize)) -> Self {
        Self {
            mask: Array2::from_elem(dim, true),
            len: dim.0 * dim.1,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.mask.get((row, col)).copied().unwrap_or(false)
    }
}

#[derive(Clone, Debug)]
pub struct BatchedSolver {
    suite: Suite,
}

impl BatchedSolver {
    pub fn new(suite: Suite) -> Self {
        Self { suite }
    }

    pub fn suite(&self) -> &Suite {
        &self.suite
    }

    /// Advances every active sample by one step. Samples escaping on this
    /// step get count `n` and leave the active set.
    fn iterate(
        &self,
        n: u8,
        samples: &SampleGrid,
        z: &mut Array2<C<f64>>,
        counts: &mut FractalResult,
        active: &mut ActiveSet,
    ) {
        let fractal = self.suite.fractal;
        let mut retired = 0;
        Zip::from(&mut active.mask)
            .and(z)
            .and(counts)
            .and(samples)
            .for_each(|live, z, count, &sample| {
                if *live {
                    *z = fractal.step(*z, sample);
                    if escaped(*z) {
                        *count = n;
                        *live = false;
                        retired += 1;
                    }
                }
            });
        active.len -= retired;
    }
}

impl Solver for BatchedSolver {
    fn solve(&self, samples: &SampleGrid) -> FractalResult {
        let fractal = self.suite.fractal;
        let mut z = samples.map(|&sample| fractal.initial(sample));
        let mut counts = FractalResult::zeros(samples.raw_dim());
        let mut active = ActiveSet::full(samples.dim());

        for n in 1..=self.suite.max_iter {
            if active.is_empty() {
                break;
            }
            self.iterate(n, samples, &mut z, &mut counts, &mut active);
        }
        counts
    }
}
