use std::any::Any;
use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::thread;

use log::{debug, trace};
use ndarray::{concatenate, Array2, ArrayView2, Axis};

use crate::error::{Error, Result};

pub trait Split: Sized {
    fn split_to_vec(self, n: usize) -> Vec<Self>;
}

pub trait Join: Sized {
    fn join_vec(parts: Vec<Self>) -> Result<Self>;
}

pub trait Call<T, U> {
    fn call(&self, input: T) -> Result<U>;
}

pub struct RangeSplitter;

impl RangeSplitter {
    /// Splits `start..end` into `n` contiguous ranges. Every range but the
    /// last holds `len / n` items; the last one takes the remainder.
    pub fn split(start: usize, end: usize, n: usize) -> Vec<Range<usize>> {
        let n = n.max(1);
        let end = end.max(start);
        let size = (end - start) / n;
        (0..n)
            .map(|i| {
                let m = start + i * size;
                if i == n - 1 {
                    m..end
                } else {
                    m..m + size
                }
            })
            .collect()
    }
}

impl<A> Join for Array2<A>
where
    A: Clone,
{
    fn join_vec(parts: Vec<Self>) -> Result<Self> {
        let views: Vec<ArrayView2<A>> = parts.iter().map(|part| part.view()).collect();
        Ok(concatenate(Axis(0), &views)?)
    }
}

type Task<T> = (usize, T);
type Outcome<U> = (usize, Result<U>);

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

struct Worker<T> {
    tx: mpsc::Sender<Task<T>>,
    handle: thread::JoinHandle<()>,
}

impl<T> Worker<T>
where
    T: Send + 'static,
{
    fn spawn<U, F>(id: usize, f: F, out: mpsc::Sender<Outcome<U>>) -> Result<Self>
    where
        U: Send + 'static,
        F: Fn(T) -> Result<U> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<Task<T>>();
        let handle = thread::Builder::new()
            .name(format!("fractox-worker-{}", id))
            .spawn(move || {
                for (n, task) in rx {
                    trace!("worker {} picked up task {}", id, n);
                    let outcome = match panic::catch_unwind(AssertUnwindSafe(|| f(task))) {
                        Ok(Ok(result)) => Ok(result),
                        Ok(Err(e)) => Err(Error::WorkerFailure(format!("task {}: {}", n, e))),
                        Err(payload) => Err(Error::WorkerFailure(format!(
                            "task {} panicked: {}",
                            n,
                            panic_message(&*payload)
                        ))),
                    };
                    if out.send((n, outcome)).is_err() {
                        return;
                    }
                }
                trace!("worker {} shutting down", id);
            })?;
        Ok(Self { tx, handle })
    }

    fn send(&self, task: Task<T>) -> Result<()> {
        let n = task.0;
        self.tx
            .send(task)
            .map_err(|_| Error::WorkerFailure(format!("worker gone before task {}", n)))
    }
}

/// Fixed set of threads, each running its own copy of a task function.
/// Tasks are dealt round-robin; results come back in task order.
pub struct WorkerPool<T, U> {
    workers: Vec<Worker<T>>,
    rx: mpsc::Receiver<Outcome<U>>,
}

impl<T, U> WorkerPool<T, U>
where
    T: Send + 'static,
    U: Send + 'static,
{
    pub fn with<F, G>(n: usize, factory: F) -> Result<Self>
    where
        F: Fn() -> G,
        G: Fn(T) -> Result<U> + Send + 'static,
    {
        if n == 0 {
            return Err(Error::config("worker pool needs at least one thread"));
        }
        let (tx, rx) = mpsc::channel::<Outcome<U>>();
        let mut workers = Vec::with_capacity(n);
        for id in 0..n {
            workers.push(Worker::spawn(id, factory(), tx.clone())?);
        }
        debug!("started worker pool with {} threads", n);
        Ok(Self { workers, rx })
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Runs every task and waits for all of them. The first failure is
    /// returned once every outcome is in.
    pub fn map(&self, tasks: Vec<T>) -> Result<Vec<U>> {
        let count = tasks.len();
        for (n, task) in tasks.into_iter().enumerate() {
            self.workers[n % self.workers.len()].send((n, task))?;
        }

        let mut results: Vec<Option<U>> = (0..count).map(|_| None).collect();
        let mut failure: Option<Error> = None;
        for _ in 0..count {
            let (n, outcome) = self
                .rx
                .recv()
                .map_err(|_| Error::WorkerFailure("all workers disconnected".to_string()))?;
            match outcome {
                Ok(result) => results[n] = Some(result),
                Err(e) => {
                    failure.get_or_insert(e);
                }
            }
        }
        if let Some(e) = failure {
            return Err(e);
        }

        results
            .into_iter()
            .enumerate()
            .map(|(n, result)| {
                result.ok_or_else(|| Error::WorkerFailure(format!("no result for task {}", n)))
            })
            .collect()
    }
}

impl<T, U> Call<T, U> for WorkerPool<T, U>
where
    T: Split + Send + 'static,
    U: Join + Send + 'static,
{
    fn call(&self, input: T) -> Result<U> {
        let parts = input.split_to_vec(self.size());
        U::join_vec(self.map(parts)?)
    }
}

impl<T, U> Drop for WorkerPool<T, U> {
    fn drop(&mut self) {
        for Worker { tx, handle } in self.workers.drain(..) {
            drop(tx);
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use ndarray::array;

    fn check_split(start: usize, end: usize, n: usize) {
        let ranges = RangeSplitter::split(start, end, n);
        assert_eq!(ranges.len(), n);
        assert_eq!(ranges[0].start, start);
        assert_eq!(ranges[n - 1].end, end);
        for pair in ranges.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        let total: usize = ranges.iter().map(|r| r.len()).sum();
        assert_eq!(total, end - start);
        for r in &ranges[..n - 1] {
            assert_eq!(r.len(), (end - start) / n);
        }
    }

    #[test]
    fn test_range_splits() {
        check_split(0, 1, 1);
        check_split(0, 8, 5);
        check_split(0, 100, 1);
        check_split(0, 55, 47);
        check_split(10, 1000, 7);
        for total in 1..40 {
            for n in 1..=total {
                check_split(0, total, n);
            }
        }
    }

    #[test]
    fn test_last_range_takes_remainder() {
        assert_eq!(RangeSplitter::split(0, 10, 3), vec![0..3, 3..6, 6..10]);
        assert_eq!(RangeSplitter::split(0, 1000, 1), vec![0..1000]);
    }

    #[test]
    fn test_join_arrays() {
        let joined = Array2::join_vec(vec![array![[1u8, 2]], array![[3, 4], [5, 6]]]).unwrap();
        assert_eq!(joined, array![[1u8, 2], [3, 4], [5, 6]]);
    }

    #[test]
    fn test_join_mismatched_widths_fails() {
        let parts = vec![array![[1u8, 2]], array![[3u8, 4, 5]]];
        assert!(matches!(Array2::join_vec(parts), Err(Error::Shape(_))));
    }

    #[test]
    fn test_pool_keeps_task_order() {
        let pool: WorkerPool<u64, u64> = WorkerPool::with(3, || {
            |x: u64| -> Result<u64> {
                thread::sleep(std::time::Duration::from_millis(10 * (x % 3)));
                Ok(x * x)
            }
        })
        .unwrap();
        let out = pool.map((0..10).collect()).unwrap();
        assert_eq!(out, (0..10u64).map(|x| x * x).collect::<Vec<_>>());
        // pool is reusable
        assert_eq!(pool.map(vec![7]).unwrap(), vec![49]);
    }

    #[test]
    fn test_pool_reports_task_error() {
        let pool: WorkerPool<u32, u32> = WorkerPool::with(2, || {
            |x: u32| -> Result<u32> {
                if x == 3 {
                    Err(Error::config("bad task"))
                } else {
                    Ok(x)
                }
            }
        })
        .unwrap();
        assert!(matches!(
            pool.map((0..6).collect()),
            Err(Error::WorkerFailure(_))
        ));
        assert_eq!(pool.map(vec![1, 2]).unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_pool_survives_panic() {
        let pool: WorkerPool<u32, u32> = WorkerPool::with(2, || {
            |x: u32| -> Result<u32> {
                if x == 1 {
                    panic!("boom");
                }
                Ok(x)
            }
        })
        .unwrap();
        match pool.map(vec![0, 1, 2]) {
            Err(Error::WorkerFailure(msg)) => assert!(msg.contains("boom")),
            other => panic!("expected worker failure, got {:?}", other.map(|_| ())),
        }
        assert_eq!(pool.map(vec![4, 5]).unwrap(), vec![4, 5]);
    }

    #[test]
    fn test_pool_needs_threads() {
        let pool = WorkerPool::<u32, u32>::with(0, || |x: u32| -> Result<u32> { Ok(x) });
        assert!(matches!(pool, Err(Error::Configuration(_))));
    }
}
