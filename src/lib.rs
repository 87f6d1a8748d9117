//! Throughput benchmark for a per-element floating-point calculation.
//!
//! The same pure `combine(a, b) -> f32` kernel is executed over two shared
//! input buffers by a set of interchangeable strategies: a sequential host
//! loop, a rayon parallel-for, a manual thread partition, and a
//! GPU-offloaded compute shader dispatched through
//! [wgpu](https://github.com/gfx-rs/wgpu).  A wall-clock harness times
//! repeated runs of each strategy, derives median/average/min/max
//! statistics and a speedup ratio over the sequential baseline, and a
//! validator reports the relative error of each accelerated output against
//! the baseline output.
//!
//! All APIs are synchronous and blocking: a strategy's `execute` returns
//! only once the result is fully produced, including any device-side
//! completion wait, so a clock wrapped around it measures execution rather
//! than submission.

pub mod buffer;
pub mod context;
pub mod data;
pub mod driver;
pub mod error;
pub mod kernel;
pub mod offload;
pub mod stats;
pub mod strategy;
pub mod validate;

pub use buffer::GpuBuffer;
pub use context::GpuContext;
pub use data::InputSet;
pub use driver::HarnessConfig;
pub use error::{BenchError, BenchResult};
pub use kernel::{CombineFn, KernelSource};
pub use offload::DeviceStrategy;
pub use stats::{measure, RunStats};
pub use strategy::{ComputeStrategy, ParallelFor, Sequential, ThreadPartition};
pub use validate::{compare, ErrorSummary};
