//! Escape-time fractal renderer.
//!
//! A frame (viewport plus resolution) is cut into horizontal bands, each band
//! is sampled on the frame's lattice and solved on a worker pool, and the
//! per-band escape counts are stacked back into one `u8` array.
use log::{info, warn};

pub mod bench;
pub mod complex;
pub mod coord;
pub mod error;
pub mod fractal;
pub mod painter;
pub mod solver;
pub mod threads;

pub use coord::{Band, Frame, SampleGrid, Viewport};
pub use error::{Error, Result};
pub use fractal::{Fractal, Suite};
pub use painter::GreyscalePainter;
pub use solver::{EscapeSolver, FractalResult, Solver, Strategy};

use threads::{Call, WorkerPool};

/// A worker pool bound to one fractal, budget and strategy. The pool is
/// kept alive between renders.
pub struct Renderer {
    suite: Suite,
    strategy: Strategy,
    pool: WorkerPool<Band, FractalResult>,
}

impl Renderer {
    pub fn new(suite: Suite, strategy: Strategy, n_threads: usize) -> Result<Self> {
        if n_threads == 0 {
            return Err(Error::config("n_threads must be at least 1"));
        }
        let pool = EscapeSolver::new(strategy, suite).threaded(n_threads)?;
        Ok(Self {
            suite,
            strategy,
            pool,
        })
    }

    pub fn suite(&self) -> &Suite {
        &self.suite
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn threads(&self) -> usize {
        self.pool.size()
    }

    pub fn render(&self, frame: &Frame) -> Result<FractalResult> {
        let n_threads = self.pool.size();
        if n_threads > frame.n_rows {
            warn!(
                "{} threads for {} rows, only {} bands will be rendered",
                n_threads, frame.n_rows, frame.n_rows
            );
        }
        info!(
            "rendering {} {} at {}x{}, max_iter {}, {} solver on {} thread(s)",
            self.suite.fractal,
            frame.viewport,
            frame.n_rows,
            frame.n_columns,
            self.suite.max_iter,
            self.strategy,
            n_threads
        );
        let counts = self.pool.call(frame.band())?;
        debug_assert_eq!(counts.dim(), (frame.n_rows, frame.n_columns));
        Ok(counts)
    }
}

/// Renders `fractal` over `viewport` at `n_rows` x `n_columns` using
/// `n_threads` workers and the default strategy.
pub fn render(
    fractal: Fractal,
    viewport: Viewport,
    n_rows: usize,
    n_columns: usize,
    max_iter: u32,
    n_threads: usize,
) -> Result<FractalResult> {
    let suite = Suite::new(fractal, max_iter)?;
    let frame = Frame::new(viewport, n_rows, n_columns)?;
    Renderer::new(suite, Strategy::default(), n_threads)?.render(&frame)
}
