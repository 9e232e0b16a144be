use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use env_logger::Builder;
use log::{info, warn, LevelFilter};
use structopt::StructOpt;

use fractox::complex::{parse_complex, C};
use fractox::{Fractal, Frame, GreyscalePainter, Renderer, Strategy, Suite};

fn parse_julia_c(s: &str) -> std::result::Result<C<f64>, String> {
    parse_complex(s).ok_or_else(|| format!("expected \"re,im\", got \"{}\"", s))
}

#[derive(Debug, StructOpt)]
#[structopt(
    name = "fractox-imagegen",
    about = "Render an escape-time fractal to a grayscale image"
)]
struct Opt {
    /// Fractal to render: mandelbrot, julia or burning_ship
    fractal: Fractal,

    /// Output image, format chosen from the extension
    #[structopt(parse(from_os_str))]
    output: PathBuf,

    /// Maximum number of iterations, at most 255
    #[structopt(long = "max_iter", default_value = "100")]
    max_iter: u32,

    #[structopt(long = "n_rows", default_value = "1000")]
    n_rows: usize,

    #[structopt(long = "n_columns", default_value = "1000")]
    n_columns: usize,

    /// Number of worker threads, one band per thread
    #[structopt(long = "n_threads", default_value = "1")]
    n_threads: usize,

    /// Escape-time strategy: scalar or batched
    #[structopt(long, default_value = "scalar")]
    strategy: Strategy,

    /// Julia constant as "re,im", e.g. --julia_c=-0.7269,0.1889
    #[structopt(long = "julia_c", parse(try_from_str = parse_julia_c))]
    julia_c: Option<C<f64>>,

    /// Invert the grayscale map
    #[structopt(long)]
    invert: bool,

    /// Stretch escape counts over the full 0..255 range
    #[structopt(long)]
    stretch: bool,

    /// Log level: off, error, warn, info, debug or trace
    #[structopt(short, long, default_value = "warn")]
    verbosity: LevelFilter,
}

fn main() -> Result<()> {
    let opt = Opt::from_args();
    Builder::from_default_env()
        .filter_level(opt.verbosity)
        .init();
    info!(
        "'{}' version {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    let fractal = match (opt.fractal, opt.julia_c) {
        (Fractal::Julia(_), Some(k)) => Fractal::Julia(k),
        (fractal, Some(_)) => {
            warn!("--julia_c has no effect on {}", fractal);
            fractal
        }
        (fractal, None) => fractal,
    };

    let frame = Frame::new(fractal.default_viewport(), opt.n_rows, opt.n_columns)?;
    let suite = Suite::new(fractal, opt.max_iter)?;
    let renderer = Renderer::new(suite, opt.strategy, opt.n_threads)?;

    println!(
        "Computing {} ({}x{}, max_iter {}, {} strategy, {} thread(s))",
        fractal, opt.n_rows, opt.n_columns, opt.max_iter, opt.strategy, opt.n_threads
    );
    let now = Instant::now();
    let counts = renderer.render(&frame)?;
    println!("Elapsed time: {:.3} s", now.elapsed().as_secs_f64());

    println!("Saving image to {}", opt.output.display());
    GreyscalePainter::new(opt.invert, opt.stretch)
        .save(&counts, &opt.output)
        .with_context(|| format!("failed to write {}", opt.output.display()))?;
    Ok(())
}
