//! Host-side compute strategies.
//!
//! Each strategy owns its output buffer and applies the same per-element
//! [`CombineFn`] over the whole index range; only the execution shape
//! differs.  Construction binds the shared inputs and allocates the output,
//! so [`ComputeStrategy::execute`] is exactly the unit of work the timing
//! harness wall-clocks.  Outputs are disjoint per index, which is what lets
//! the parallel variants run without any synchronization beyond a join.

use std::sync::Arc;
use std::thread;

use rayon::prelude::*;

use crate::data::InputSet;
use crate::error::BenchError;
use crate::kernel::CombineFn;

/// One interchangeable way of computing the per-element output over the
/// whole buffer.
///
/// `execute` must not return until every element of the output has been
/// produced — for device-backed implementations that includes the blocking
/// wait for kernel completion, so that a caller's clock around `execute`
/// measures execution rather than submission.
pub trait ComputeStrategy {
    /// Human-readable name used in report headers.
    fn name(&self) -> String;

    /// One complete pass over every element.
    fn execute(&mut self) -> Result<(), BenchError>;

    /// Host copy of the output produced by the most recent `execute`.
    fn read_output(&mut self) -> Result<Vec<f32>, BenchError>;
}

/// Single in-order loop over all elements; the benchmark's baseline.
pub struct Sequential {
    inputs: Arc<InputSet>,
    combine: CombineFn,
    output: Vec<f32>,
}

impl Sequential {
    pub fn new(inputs: Arc<InputSet>, combine: CombineFn) -> Self {
        let len = inputs.len();
        Self {
            inputs,
            combine,
            output: vec![0.0; len],
        }
    }
}

impl ComputeStrategy for Sequential {
    fn name(&self) -> String {
        "host sequential".to_string()
    }

    fn execute(&mut self) -> Result<(), BenchError> {
        let combine = self.combine;
        for ((out, &x), &y) in self
            .output
            .iter_mut()
            .zip(&self.inputs.a)
            .zip(&self.inputs.b)
        {
            *out = combine(x, y);
        }
        Ok(())
    }

    fn read_output(&mut self) -> Result<Vec<f32>, BenchError> {
        Ok(self.output.clone())
    }
}

/// Element-wise work delegated to rayon's data-parallel iterators.
///
/// No ordering guarantee among elements; write destinations are disjoint so
/// no locking is involved.
pub struct ParallelFor {
    inputs: Arc<InputSet>,
    combine: CombineFn,
    output: Vec<f32>,
}

impl ParallelFor {
    pub fn new(inputs: Arc<InputSet>, combine: CombineFn) -> Self {
        let len = inputs.len();
        Self {
            inputs,
            combine,
            output: vec![0.0; len],
        }
    }
}

impl ComputeStrategy for ParallelFor {
    fn name(&self) -> String {
        "host parallel-for (rayon)".to_string()
    }

    fn execute(&mut self) -> Result<(), BenchError> {
        let combine = self.combine;
        let (a, b) = (&self.inputs.a, &self.inputs.b);
        self.output
            .par_iter_mut()
            .zip(a.par_iter().zip(b.par_iter()))
            .for_each(|(out, (&x, &y))| *out = combine(x, y));
        Ok(())
    }

    fn read_output(&mut self) -> Result<Vec<f32>, BenchError> {
        Ok(self.output.clone())
    }
}

/// Manual partition of the index range into contiguous, non-overlapping
/// chunks, one scoped worker thread per chunk.
///
/// The scope's end is the join barrier: `execute` returns only after every
/// worker has finished.  Run with the hardware thread count to measure
/// parallel speedup and with a single worker to isolate the cost of the
/// threading machinery itself.
pub struct ThreadPartition {
    inputs: Arc<InputSet>,
    combine: CombineFn,
    output: Vec<f32>,
    workers: usize,
}

impl ThreadPartition {
    pub fn new(inputs: Arc<InputSet>, combine: CombineFn, workers: usize) -> Self {
        assert!(workers >= 1, "at least one worker is required");
        let len = inputs.len();
        Self {
            inputs,
            combine,
            output: vec![0.0; len],
            workers,
        }
    }
}

impl ComputeStrategy for ThreadPartition {
    fn name(&self) -> String {
        format!("host threads ({})", self.workers)
    }

    fn execute(&mut self) -> Result<(), BenchError> {
        let combine = self.combine;
        let (a, b) = (&self.inputs.a, &self.inputs.b);
        // chunks_mut hands every worker a disjoint slice of the output, so
        // the partition needs no locking, only the scope join.
        let chunk = self.output.len().div_ceil(self.workers).max(1);
        thread::scope(|scope| {
            for ((out, xs), ys) in self
                .output
                .chunks_mut(chunk)
                .zip(a.chunks(chunk))
                .zip(b.chunks(chunk))
            {
                scope.spawn(move || {
                    for ((o, &x), &y) in out.iter_mut().zip(xs).zip(ys) {
                        *o = combine(x, y);
                    }
                });
            }
        });
        Ok(())
    }

    fn read_output(&mut self) -> Result<Vec<f32>, BenchError> {
        Ok(self.output.clone())
    }
}
