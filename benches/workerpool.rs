use std::collections::HashSet;

use fractox::bench::{Benchmark, BenchmarkReport};
use fractox::{Fractal, Frame, Renderer, Strategy, Suite};

const SIZE: usize = 1000;
const REPEATS: usize = 3;

fn thread_counts() -> Vec<usize> {
    let cpus = num_cpus::get_physical();
    let threads = num_cpus::get();
    let mut tcounts: HashSet<usize> = HashSet::new();

    tcounts.insert(1);
    tcounts.insert(2);
    tcounts.insert(4);
    tcounts.insert(cpus);
    tcounts.insert(threads);

    let mut tcounts: Vec<usize> = tcounts.into_iter().collect();
    tcounts.sort();
    tcounts
}

fn benchmark_renderer(strategy: Strategy, threads: usize) -> fractox::Result<Benchmark> {
    let fractal = Fractal::Mandelbrot;
    let frame = Frame::new(fractal.default_viewport(), SIZE, SIZE)?;
    let renderer = Renderer::new(Suite::new(fractal, 100)?, strategy, threads)?;
    let f = move || {
        renderer.render(&frame)?;
        Ok(())
    };
    Ok(Benchmark::iter(
        &format!("render-{}-t{}-{}", strategy, threads, SIZE),
        REPEATS,
        f,
    ))
}

fn main() -> fractox::Result<()> {
    let mut report = BenchmarkReport::new();
    for strategy in [Strategy::Scalar, Strategy::Batched] {
        for t in thread_counts() {
            report.add_bench(benchmark_renderer(strategy, t)?);
        }
    }
    report.report("workerpool")
}
