use crate::coord::SampleGrid;
use crate::fractal::Suite;
use crate::solver::{FractalResult, Solver};

#[derive(Clone, Debug)]
pub struct ScalarSolver {
    suite: Suite,
}

impl ScalarSolver {
    pub fn new(suite: Suite) -> Self {
        Self { suite }
    }

    pub fn suite(&self) -> &Suite {
        &self.suite
    }
}

impl Solver for ScalarSolver {
    fn solve(&self, samples: &SampleGrid) -> FractalResult {
        samples.map(|&sample| self.suite.escape_count(sample))
    }
}
