//! GPU context initialization.
//!
//! A thin wrapper around wgpu's instance, adapter, device and queue objects.
//! The driver enumerates every adapter the instance can see and builds one
//! context per adapter through [`GpuContext::from_adapter`]; demos and tests
//! that only care about "some GPU" use [`GpuContext::new_blocking`], which
//! picks the platform's default adapter.  Both constructors hide the
//! asynchronous adapter/device requests behind [`pollster`].

use wgpu::{Adapter, Device, Instance, Queue};

use crate::error::BenchError;

/// Everything needed to submit compute work to one device.
///
/// The wrapped wgpu types are internally reference counted, so the instance
/// can be shared across the contexts built from its adapters.  A context is
/// rejected at construction when the adapter lacks compute-shader support,
/// so downstream code never has to re-check.
#[derive(Debug)]
pub struct GpuContext {
    /// The global GPU instance the adapter was discovered through.
    pub instance: Instance,
    /// The physical device selected for computation.
    pub adapter: Adapter,
    /// Logical device used to create resources and command encoders.
    pub device: Device,
    /// Queue used to submit recorded command buffers.
    pub queue: Queue,
}

impl GpuContext {
    /// Create a context around the platform's default adapter.
    ///
    /// Blocks the current thread while the adapter and device requests
    /// resolve.
    pub fn new_blocking() -> Result<Self, BenchError> {
        let instance = Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = pollster::block_on(
            instance.request_adapter(&wgpu::RequestAdapterOptions::default()),
        )
        .map_err(|err| BenchError::AdapterUnavailable(err.to_string()))?;
        Self::from_adapter(instance, adapter)
    }

    /// Create a context around one specific adapter, as handed out by
    /// `Instance::enumerate_adapters`.
    pub fn from_adapter(instance: Instance, adapter: Adapter) -> Result<Self, BenchError> {
        // Downlevel devices may not support compute on all backends; refuse
        // them here rather than failing at pipeline creation.
        let capabilities = adapter.get_downlevel_capabilities();
        if !capabilities
            .flags
            .contains(wgpu::DownlevelFlags::COMPUTE_SHADERS)
        {
            return Err(BenchError::ComputeUnsupported(adapter.get_info().name));
        }
        // No special features are required: timing is wall-clock on the
        // host, and the benchmark buffers fit inside downlevel limits.
        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("elementwise_bench_device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_defaults(),
            memory_hints: wgpu::MemoryHints::MemoryUsage,
            trace: wgpu::Trace::Off,
        }))
        .map_err(|err| BenchError::DeviceRequest(err.to_string()))?;

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
        })
    }

    /// Adapter display name for report headers, e.g.
    /// `"NVIDIA GeForce RTX 3060 [Vulkan]"`.
    pub fn device_label(&self) -> String {
        let info = self.adapter.get_info();
        format!("{} [{:?}]", info.name, info.backend)
    }
}
