//! Benchmark orchestration.
//!
//! The driver is single-threaded: it generates the inputs once, establishes
//! the sequential host baseline (reference output plus baseline timing),
//! runs every alternative host strategy against that baseline and finally
//! walks every GPU adapter the instance can see.  A failure on one device is
//! logged with its message and numeric code and the loop moves on — one bad
//! driver or kernel source must not abort the whole benchmark.

use std::path::PathBuf;
use std::sync::Arc;

use log::{error, info};

use crate::context::GpuContext;
use crate::data::{self, InputSet};
use crate::error::{BenchError, BenchResult};
use crate::kernel::{self, CombineFn, KernelSource, DEFAULT_WORKGROUP_SIZE};
use crate::offload::DeviceStrategy;
use crate::stats::{self, RunStats};
use crate::strategy::{ComputeStrategy, ParallelFor, Sequential, ThreadPartition};
use crate::validate::{self, ErrorSummary};

/// Everything the benchmark run is parameterized by.
///
/// There is no configuration file; the binary runs the defaults and demos
/// construct custom configs in code.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Elements per input buffer.
    pub len: usize,
    /// Uniform range the input values are drawn from.
    pub range: std::ops::Range<f32>,
    /// Repetitions for the sequential baseline.
    pub baseline_repetitions: usize,
    /// Repetitions for each alternative host strategy.
    pub host_repetitions: usize,
    /// Repetitions for each device strategy.
    pub device_repetitions: usize,
    /// Threads in the @workgroup_size attribute of the kernel source.
    pub workgroup_size: u32,
    /// Device kernel source file, read once per device attempt.
    pub kernel_path: PathBuf,
    /// Entry point inside the kernel source.
    pub entry_point: String,
    /// Host-side counterpart of the device kernel.
    pub combine: CombineFn,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        // Device runs get the most repetitions, host alternatives a fifth
        // of that and the slow sequential baseline a tenth.
        Self {
            len: 4 * 1024 * 1024,
            range: 0.0..1.0,
            baseline_repetitions: 10,
            host_repetitions: 20,
            device_repetitions: 100,
            workgroup_size: DEFAULT_WORKGROUP_SIZE,
            kernel_path: PathBuf::from("kernels/combine.wgsl"),
            entry_point: "combine".to_string(),
            combine: kernel::combine,
        }
    }
}

impl HarnessConfig {
    fn validate(&self) -> BenchResult<()> {
        if self.len == 0 {
            return Err(BenchError::InvalidConfig(
                "element count must be positive".to_string(),
            ));
        }
        if self.range.start >= self.range.end {
            return Err(BenchError::InvalidConfig(format!(
                "input range {:?} is empty",
                self.range
            )));
        }
        if self.baseline_repetitions == 0
            || self.host_repetitions == 0
            || self.device_repetitions == 0
        {
            return Err(BenchError::InvalidConfig(
                "repetition counts must be positive".to_string(),
            ));
        }
        if self.workgroup_size == 0 {
            return Err(BenchError::InvalidConfig(
                "workgroup size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Run the full benchmark and print the report to stdout.
///
/// Only configuration and data-generation problems abort the run; every
/// device-side failure is contained to its device.
pub fn run(config: &HarnessConfig) -> BenchResult<()> {
    config.validate()?;

    info!(
        "generating 2 x {} elements in {:?}",
        config.len, config.range
    );
    let inputs = Arc::new(data::generate(config.len, config.range.clone()));
    println!(
        "Element-wise benchmark: {} elements per buffer, inputs in {:?}",
        config.len, config.range
    );

    // The baseline's own report shows its ~1.0x ratio against itself.
    let mut baseline = Sequential::new(inputs.clone(), config.combine);
    let baseline_stats = stats::measure(&mut baseline, config.baseline_repetitions)?;
    let reference = baseline.read_output()?;
    print_report(&baseline.name(), &baseline_stats, baseline_stats.mean_ms, None);

    let workers = num_cpus::get().max(1);
    let mut alternatives: Vec<Box<dyn ComputeStrategy>> = vec![
        Box::new(ParallelFor::new(inputs.clone(), config.combine)),
        Box::new(ThreadPartition::new(inputs.clone(), config.combine, workers)),
        Box::new(ThreadPartition::new(inputs.clone(), config.combine, 1)),
    ];
    for strategy in &mut alternatives {
        let run_stats = stats::measure(strategy.as_mut(), config.host_repetitions)?;
        let output = strategy.read_output()?;
        let errors = validate::compare(&reference, &output)?;
        print_report(
            &strategy.name(),
            &run_stats,
            baseline_stats.mean_ms,
            Some(&errors),
        );
    }

    run_devices(config, &inputs, &reference, baseline_stats.mean_ms);

    println!("{RULE}");
    Ok(())
}

/// Enumerate every adapter over all backends and benchmark each in turn.
///
/// All failures are per-device: logged, printed and skipped.
fn run_devices(
    config: &HarnessConfig,
    inputs: &Arc<InputSet>,
    reference: &[f32],
    baseline_mean_ms: f64,
) {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
    let adapters = instance.enumerate_adapters(wgpu::Backends::all());
    if adapters.is_empty() {
        println!("{RULE}");
        println!("No offload devices available.");
        return;
    }
    for adapter in adapters {
        let name = adapter.get_info().name.clone();
        match run_one_device(config, instance.clone(), adapter, inputs, reference, baseline_mean_ms)
        {
            Ok(()) => {}
            Err(err) => {
                error!("device '{name}' skipped: {err} (code {})", err.code());
                println!("{RULE}");
                println!("Device: {name}");
                println!("  skipped: {err} (code {})", err.code());
            }
        }
    }
}

fn run_one_device(
    config: &HarnessConfig,
    instance: wgpu::Instance,
    adapter: wgpu::Adapter,
    inputs: &Arc<InputSet>,
    reference: &[f32],
    baseline_mean_ms: f64,
) -> BenchResult<()> {
    let context = GpuContext::from_adapter(instance, adapter)?;
    // Re-read the kernel source for every device attempt so a fixed file is
    // picked up without restarting the benchmark.
    let kernel = KernelSource::from_file(&config.kernel_path, &config.entry_point)?;
    let mut strategy = DeviceStrategy::new(context, inputs, &kernel, config.workgroup_size)?;
    let run_stats = stats::measure(&mut strategy, config.device_repetitions)?;
    let output = strategy.read_output()?;
    let errors = validate::compare(reference, &output)?;
    print_report(&strategy.name(), &run_stats, baseline_mean_ms, Some(&errors));
    Ok(())
}

const RULE: &str = "----------------------------------------------------------------";

/// One human-readable report block per strategy.
fn print_report(
    name: &str,
    run_stats: &RunStats,
    baseline_mean_ms: f64,
    errors: Option<&ErrorSummary>,
) {
    println!("{RULE}");
    println!("Strategy: {name}");
    println!(
        "  ({} runs) Med: {:.3} ms  ({:.2}x faster than host baseline)",
        run_stats.runs,
        run_stats.median_ms,
        run_stats.speedup_over(baseline_mean_ms)
    );
    println!(
        "            Avg: {:.3} ms  Min: {:.3} ms  Max: {:.3} ms",
        run_stats.mean_ms, run_stats.min_ms, run_stats.max_ms
    );
    if let Some(summary) = errors {
        println!(
            "  Errors vs baseline: avg {:.3e}, max {:.3e}",
            summary.avg_rel_error, summary.max_rel_error
        );
    }
}
