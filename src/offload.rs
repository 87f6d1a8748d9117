//! The device-offloaded compute strategy.
//!
//! Unlike the host strategies, most of the work here happens once at
//! construction: the inputs are uploaded, the kernel source is compiled and
//! the pipeline and bind group are built, so that a timed
//! [`ComputeStrategy::execute`] covers exactly one dispatch plus the
//! blocking wait for the device to finish it.  Readback is deliberately
//! separate — the benchmark reads the output once after all timed
//! repetitions, not per repetition.

use std::num::NonZeroU64;

use wgpu::{ShaderModuleDescriptor, ShaderSource};

use crate::buffer::GpuBuffer;
use crate::context::GpuContext;
use crate::data::InputSet;
use crate::error::BenchError;
use crate::kernel::KernelSource;
use crate::strategy::ComputeStrategy;

/// Calculate an (x, y) workgroup grid that covers `total_groups`
/// workgroups without exceeding the per-dimension limit.  The kernel
/// rebuilds the linear element index from this grid and guards it against
/// `arrayLength`, so over-covering the range is harmless.
fn split_workgroups(total_groups: u32, limit: u32) -> (u32, u32) {
    if total_groups <= limit {
        (total_groups, 1)
    } else {
        (limit, total_groups.div_ceil(limit))
    }
}

/// Per-element computation offloaded to one GPU/accelerator device.
///
/// Holds the compiled pipeline, the uploaded input buffers and the device
/// output buffer for the lifetime of the benchmark run on that device.
#[derive(Debug)]
pub struct DeviceStrategy {
    context: GpuContext,
    label: String,
    pipeline: wgpu::ComputePipeline,
    bind_group: wgpu::BindGroup,
    output: GpuBuffer<f32>,
    download: GpuBuffer<f32>,
    groups: (u32, u32),
}

impl DeviceStrategy {
    /// Upload the inputs and compile `kernel` for the context's device.
    ///
    /// Shader and pipeline creation run inside a validation error scope, so
    /// a malformed kernel surfaces as a [`BenchError::KernelBuild`] for this
    /// device instead of the process-wide uncaptured-error panic.
    pub fn new(
        context: GpuContext,
        inputs: &InputSet,
        kernel: &KernelSource,
        workgroup_size: u32,
    ) -> Result<Self, BenchError> {
        assert!(workgroup_size > 0, "workgroup size must be positive");
        assert!(!inputs.is_empty(), "device dispatch needs at least one element");
        let label = context.device_label();
        let device = &context.device;

        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let module = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("combine_kernel"),
            source: ShaderSource::Wgsl(kernel.wgsl.as_str().into()),
        });

        let min_binding_size = NonZeroU64::new(std::mem::size_of::<f32>() as u64).unwrap();
        let storage_entry = |binding: u32, read_only: bool| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only },
                has_dynamic_offset: false,
                min_binding_size: Some(min_binding_size),
            },
            count: None,
        };
        let bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("combine_bind_group_layout"),
                entries: &[
                    storage_entry(0, true),
                    storage_entry(1, true),
                    storage_entry(2, false),
                ],
            });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("combine_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("combine_pipeline"),
            layout: Some(&pipeline_layout),
            module: &module,
            entry_point: Some(&kernel.entry_point),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            cache: None,
        });

        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            return Err(BenchError::KernelBuild {
                device: label,
                detail: error.to_string(),
            });
        }

        let buffer_a = GpuBuffer::<f32>::from_slice(&context, &inputs.a);
        let buffer_b = GpuBuffer::<f32>::from_slice(&context, &inputs.b);
        // Zero-initialized by wgpu, which doubles as the reset before the
        // device's first run.
        let output = GpuBuffer::<f32>::new_output(&context, inputs.len());
        let download = GpuBuffer::<f32>::new_download(&context, inputs.len());

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("combine_bind_group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer_a.buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: buffer_b.buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: output.buffer.as_entire_binding(),
                },
            ],
        });

        let total_groups = (inputs.len() as u32).div_ceil(workgroup_size);
        let limit = device.limits().max_compute_workgroups_per_dimension;
        let groups = split_workgroups(total_groups, limit);

        Ok(Self {
            context,
            label,
            pipeline,
            bind_group,
            output,
            download,
            groups,
        })
    }
}

impl ComputeStrategy for DeviceStrategy {
    fn name(&self) -> String {
        format!("device offload ({})", self.label)
    }

    /// One kernel dispatch, then a blocking wait for the device to drain.
    ///
    /// The wait is what makes a wall clock around this call measure device
    /// execution rather than submission latency.
    fn execute(&mut self) -> Result<(), BenchError> {
        let mut encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("combine_encoder"),
            });
        {
            let mut cpass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("combine_pass"),
                timestamp_writes: None,
            });
            cpass.set_pipeline(&self.pipeline);
            cpass.set_bind_group(0, &self.bind_group, &[]);
            let (groups_x, groups_y) = self.groups;
            cpass.dispatch_workgroups(groups_x, groups_y, 1);
        }
        self.context.queue.submit([encoder.finish()]);
        self.context
            .device
            .poll(wgpu::PollType::Wait)
            .map_err(|err| BenchError::Execution(format!("device poll failed: {err}")))?;
        Ok(())
    }

    fn read_output(&mut self) -> Result<Vec<f32>, BenchError> {
        let mut encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("readback_encoder"),
            });
        encoder.copy_buffer_to_buffer(
            &self.output.buffer,
            0,
            &self.download.buffer,
            0,
            self.output.byte_len(),
        );
        self.context.queue.submit([encoder.finish()]);
        self.download.read_to_vec(&self.context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_counts_stay_one_dimensional() {
        assert_eq!(split_workgroups(1, 65_535), (1, 1));
        assert_eq!(split_workgroups(65_535, 65_535), (65_535, 1));
    }

    #[test]
    fn large_counts_spill_into_the_second_dimension() {
        let (x, y) = split_workgroups(65_536, 65_535);
        assert_eq!(x, 65_535);
        assert_eq!(y, 2);
    }

    #[test]
    fn the_grid_always_covers_every_group() {
        for total in [1u32, 100, 65_535, 65_536, 1_000_000] {
            let (x, y) = split_workgroups(total, 65_535);
            assert!(u64::from(x) * u64::from(y) >= u64::from(total));
        }
    }
}
