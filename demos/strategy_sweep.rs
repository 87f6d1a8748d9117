//! Size sweep across every compute strategy.
//!
//! Runs the bundled workload kernel over a range of buffer sizes and prints
//! the median run time of each strategy at each size.  By varying the
//! element count you can see where rayon starts to beat the sequential
//! loop, where the fixed cost of spawning threads stops mattering, and
//! where GPU dispatch overhead is finally amortised by throughput.
//!
//! The GPU column is filled in only when a default adapter exists; on a
//! headless machine without one the sweep still runs the host strategies.

use std::sync::Arc;

use elementwise_bench::{
    data, kernel, measure, ComputeStrategy, DeviceStrategy, GpuContext, KernelSource,
    ParallelFor, Sequential, ThreadPartition,
};

const REPETITIONS: usize = 10;

fn median_ms(strategy: &mut dyn ComputeStrategy) -> f64 {
    measure(strategy, REPETITIONS)
        .expect("measurement cannot fail for positive repetitions")
        .median_ms
}

fn main() {
    env_logger::init();
    let sizes = [1_024usize, 65_536, 1_048_576, 8_388_608];
    let workers = num_cpus::get().max(1);

    // Probe once so a headless machine prints the notice a single time.
    let gpu_available = match GpuContext::new_blocking() {
        Ok(_) => true,
        Err(err) => {
            println!("no GPU available, host strategies only ({err})");
            false
        }
    };

    println!("Median run time in ms over {REPETITIONS} runs, bundled workload kernel");
    println!(
        "{:>12}  {:>12}  {:>12}  {:>14}  {:>12}",
        "elements", "sequential", "rayon", "threads", "gpu"
    );
    for &len in &sizes {
        let inputs = Arc::new(data::generate(len, 0.0..1.0));

        let sequential = median_ms(&mut Sequential::new(inputs.clone(), kernel::combine));
        let rayon = median_ms(&mut ParallelFor::new(inputs.clone(), kernel::combine));
        let threads = median_ms(&mut ThreadPartition::new(
            inputs.clone(),
            kernel::combine,
            workers,
        ));

        // A fresh context per size keeps the strategy's buffers sized to
        // the current inputs.
        let gpu_cell = if gpu_available {
            let context = GpuContext::new_blocking().expect("GPU was available a moment ago");
            let mut strategy = DeviceStrategy::new(
                context,
                &inputs,
                &KernelSource::builtin_combine(),
                kernel::DEFAULT_WORKGROUP_SIZE,
            )
            .expect("built-in kernel must compile");
            format!("{:12.3}", median_ms(&mut strategy))
        } else {
            format!("{:>12}", "-")
        };

        println!(
            "{len:>12}  {sequential:>12.3}  {rayon:>12.3}  {threads:>14.3}  {gpu_cell}",
        );
    }
    println!();
    println!(
        "Host threads column uses {workers} workers; GPU column includes the \
         completion wait but not readback."
    );
}
