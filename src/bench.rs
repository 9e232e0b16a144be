//! Minimal wall-clock benchmark harness used by the `benches/` targets to
//! compare solver strategies and thread counts.
use std::fs;
use std::io::{stdout, Write};
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::error::Result;

#[derive(Clone)]
pub struct Benchmark {
    f: Rc<dyn Fn() -> Result<()>>,
    name: String,
    iterations: usize,
}

pub enum Unit {
    Nanosecond,
    Microsecond,
    Millisecond,
    Second,
}

impl Unit {
    pub fn format(&self, d: &Duration, width: usize) -> String {
        let (symbol, value) = match self {
            Self::Nanosecond => ("ns", d.as_nanos()),
            Self::Microsecond => ("µs", d.as_micros()),
            Self::Millisecond => ("ms", d.as_millis()),
            Self::Second => ("s", d.as_secs() as u128),
        };
        format!("{:>width$}{:<2}", value, symbol)
    }

    pub fn scaled(d: &Duration, treshold: u128) -> Self {
        if d.as_nanos() < treshold {
            Self::Nanosecond
        } else if d.as_micros() < treshold {
            Self::Microsecond
        } else if d.as_millis() < treshold {
            Self::Millisecond
        } else {
            Self::Second
        }
    }
}

impl Benchmark {
    pub fn iter<F: Fn() -> Result<()> + 'static>(name: &str, n: usize, f: F) -> Self {
        Self {
            f: Rc::new(f),
            name: name.to_string(),
            iterations: n.max(1),
        }
    }

    pub fn once<F: Fn() -> Result<()> + 'static>(name: &str, f: F) -> Self {
        Self::iter(name, 1, f)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn run(&self) -> Result<Duration> {
        let start = Instant::now();
        for _ in 0..self.iterations {
            (self.f)()?;
        }
        Ok(start.elapsed())
    }
}

struct Measurement {
    name: String,
    iterations: usize,
    total: Duration,
}

impl Measurement {
    fn per_call(&self) -> Duration {
        self.total.div_f64(self.iterations as f64)
    }
}

/// Runs a list of benchmarks in order. Speedups are relative to the first
/// benchmark in the list.
pub struct BenchmarkReport {
    benches: Vec<Benchmark>,
    results: Vec<Measurement>,
}

impl BenchmarkReport {
    pub fn new() -> Self {
        Self {
            benches: vec![],
            results: vec![],
        }
    }

    pub fn add_bench(&mut self, bench: Benchmark) {
        self.benches.push(bench);
    }

    pub fn add_benches(&mut self, benches: &[Benchmark]) {
        for bench in benches {
            self.benches.push(bench.clone())
        }
    }

    pub fn with_benches(benches: &[Benchmark]) -> Self {
        let mut this = Self::new();
        this.add_benches(benches);
        this
    }

    pub fn run(&mut self) -> Result<()> {
        for bench in &self.benches {
            let total = bench.run()?;
            self.results.push(Measurement {
                name: bench.name.to_string(),
                iterations: bench.iterations,
                total,
            });
            print!(".");
            stdout().flush()?;
        }
        println!();
        Ok(())
    }

    fn speedup(&self, m: &Measurement) -> f64 {
        match self.results.first() {
            Some(base) if m.per_call().as_nanos() > 0 => {
                base.per_call().as_secs_f64() / m.per_call().as_secs_f64()
            }
            _ => 1.0,
        }
    }

    pub fn show(&self) -> Result<()> {
        println!(
            "  {: <36} {: >8}   {: >8}   {: >7}",
            "benchmark", "total", "per_call", "speedup"
        );
        for m in &self.results {
            let per_call = m.per_call();
            println!(
                "  {: <36} {}   {}   {:>6.2}x",
                m.name,
                Unit::scaled(&m.total, 100000).format(&m.total, 6),
                Unit::scaled(&per_call, 100000).format(&per_call, 6),
                self.speedup(m),
            )
        }
        stdout().flush()?;
        Ok(())
    }

    pub fn to_csv(&self) -> String {
        let mut lines: Vec<String> =
            vec!["benchmark,total_us,iterations,per_call_us,speedup".to_string()];
        for m in &self.results {
            lines.push(format!(
                "{},{},{},{},{:.3}",
                m.name,
                m.total.as_micros(),
                m.iterations,
                m.per_call().as_micros(),
                self.speedup(m),
            ));
        }
        lines.push("".to_string());
        lines.join("\n")
    }

    pub fn write_csv(&self, filename: &str) -> Result<()> {
        fs::write(filename, self.to_csv())?;
        Ok(())
    }

    pub fn report(&mut self, name: &str) -> Result<()> {
        print!("Benchmark: {}", name);
        self.run()?;
        self.show()?;
        self.write_csv(&format!("benchmark_{}.csv", name))
    }
}

impl Default for BenchmarkReport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_runs_every_iteration() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let mut report = BenchmarkReport::with_benches(&[Benchmark::iter("count", 5, move || {
            counter.set(counter.get() + 1);
            Ok(())
        })]);
        report.run().unwrap();
        assert_eq!(calls.get(), 5);
        let csv = report.to_csv();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("benchmark,total_us,iterations,per_call_us,speedup")
        );
        assert!(lines.next().unwrap().starts_with("count,"));
    }

    #[test]
    fn test_failing_bench_stops_report() {
        let mut report = BenchmarkReport::new();
        report.add_bench(Benchmark::once("bad", || {
            Err(crate::error::Error::config("nope"))
        }));
        assert!(report.run().is_err());
    }

    #[test]
    fn test_unit_scaling() {
        let d = Duration::from_micros(1500);
        assert!(matches!(Unit::scaled(&d, 1000), Unit::Millisecond));
        assert_eq!(Unit::Millisecond.format(&d, 4), "   1ms");
    }
}
