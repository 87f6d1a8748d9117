//! Criterion benchmarks comparing the compute strategies.
//!
//! To run use `cargo bench`.  The context and every strategy are built up
//! front so that pipeline creation and input upload stay out of the
//! measured loop; what criterion times is one full pass over the buffer,
//! including the device completion wait for the GPU case.  The GPU
//! benchmark is registered only when an adapter is present, so the suite
//! still runs on headless machines.

use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};

use elementwise_bench::{
    data, kernel, ComputeStrategy, DeviceStrategy, GpuContext, KernelSource, ParallelFor,
    Sequential, ThreadPartition,
};

const LEN: usize = 1 << 20;

fn strategy_benchmark(c: &mut Criterion) {
    let inputs = Arc::new(data::generate_seeded(LEN, 0.0..1.0, 0xBEEF));
    let workers = num_cpus::get().max(1);

    let mut group = c.benchmark_group("combine_1Mi");
    group.throughput(Throughput::Elements(LEN as u64));

    let mut sequential = Sequential::new(inputs.clone(), kernel::combine);
    group.bench_function("host sequential", |bencher| {
        bencher.iter(|| sequential.execute().expect("host execute cannot fail"));
    });

    let mut parallel = ParallelFor::new(inputs.clone(), kernel::combine);
    group.bench_function("host rayon", |bencher| {
        bencher.iter(|| parallel.execute().expect("host execute cannot fail"));
    });

    let mut partitioned = ThreadPartition::new(inputs.clone(), kernel::combine, workers);
    group.bench_function(format!("host threads ({workers})"), |bencher| {
        bencher.iter(|| partitioned.execute().expect("host execute cannot fail"));
    });

    match GpuContext::new_blocking() {
        Ok(context) => {
            let mut device = DeviceStrategy::new(
                context,
                &inputs,
                &KernelSource::builtin_combine(),
                kernel::DEFAULT_WORKGROUP_SIZE,
            )
            .expect("built-in kernel must compile");
            group.bench_function("device offload", |bencher| {
                bencher.iter(|| device.execute().expect("dispatch failed"));
            });
        }
        Err(err) => eprintln!("skipping GPU benchmark: {err}"),
    }

    group.finish();
}

criterion_group!(benches, strategy_benchmark);
criterion_main!(benches);
