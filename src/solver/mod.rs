use std::fmt;
use std::str::FromStr;

use log::debug;
use ndarray::Array2;

use crate::coord::{Band, SampleGrid};
use crate::error::{Error, Result};
use crate::fractal::Suite;
use crate::threads::WorkerPool;

pub mod batched;
pub mod scalar;

pub use batched::{ActiveSet, BatchedSolver};
pub use scalar::ScalarSolver;

/// Escape counts, one per sample.
pub type FractalResult = Array2<u8>;

pub trait Solver {
    fn solve(&self, samples: &SampleGrid) -> FractalResult;

    /// A pool of `n` workers, each rendering whole bands with its own copy
    /// of this solver.
    fn threaded(self, n: usize) -> Result<WorkerPool<Band, FractalResult>>
    where
        Self: Clone + Send + 'static,
    {
        WorkerPool::with(n, || {
            let solver = self.clone();
            move |band: Band| -> Result<FractalResult> {
                debug!("rendering {}", band);
                let samples = band.sample_grid()?;
                let counts = solver.solve(&samples);
                debug!("band {} done", band.index);
                Ok(counts)
            }
        })
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Strategy {
    /// One sample at a time, stopping as soon as it escapes.
    #[default]
    Scalar,
    /// Every sample in lockstep, masked by an active set.
    Batched,
}

impl Strategy {
    pub const NAMES: [&'static str; 2] = ["scalar", "batched"];

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Scalar => "scalar",
            Strategy::Batched => "batched",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "scalar" => Ok(Strategy::Scalar),
            "batched" => Ok(Strategy::Batched),
            other => Err(Error::config(format!(
                "unknown strategy '{}' (expected one of {})",
                other,
                Strategy::NAMES.join(", ")
            ))),
        }
    }
}

#[derive(Clone, Debug)]
pub enum EscapeSolver {
    Scalar(ScalarSolver),
    Batched(BatchedSolver),
}

impl EscapeSolver {
    pub fn new(strategy: Strategy, suite: Suite) -> Self {
        match strategy {
            Strategy::Scalar => EscapeSolver::Scalar(ScalarSolver::new(suite)),
            Strategy::Batched => EscapeSolver::Batched(BatchedSolver::new(suite)),
        }
    }

    pub fn strategy(&self) -> Strategy {
        match self {
            EscapeSolver::Scalar(_) => Strategy::Scalar,
            EscapeSolver::Batched(_) => Strategy::Batched,
        }
    }
}

impl Solver for EscapeSolver {
    fn solve(&self, samples: &SampleGrid) -> FractalResult {
        match self {
            EscapeSolver::Scalar(solver) => solver.solve(samples),
            EscapeSolver::Batched(solver) => solver.solve(samples),
        }
    }
}
