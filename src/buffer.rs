//! Typed GPU buffers and host readback utilities.
//!
//! This module defines a [`GpuBuffer`] wrapper around [`wgpu::Buffer`]
//! that tracks the number of typed elements stored in the buffer and
//! provides convenience methods for uploading and downloading data.
//! The buffer itself does not maintain ownership of the CPU data; it
//! merely references GPU memory.  All interactions with the GPU are
//! performed through a [`crate::GpuContext`].

use std::sync::mpsc;

use bytemuck::{cast_slice, Pod};
use wgpu::{Buffer, BufferDescriptor, BufferUsages};

use crate::context::GpuContext;
use crate::error::BenchError;

/// A typed GPU buffer.
///
/// This struct wraps a `wgpu::Buffer` together with the element length and
/// a phantom type parameter.  The length records how many elements of type
/// `T` are stored in the buffer; the underlying buffer size in bytes is
/// `len * std::mem::size_of::<T>()`.
#[derive(Debug)]
pub struct GpuBuffer<T: Pod> {
    pub buffer: Buffer,
    pub len: usize,
    _marker: std::marker::PhantomData<T>,
}

impl<T: Pod> GpuBuffer<T> {
    /// Create a new storage buffer from a slice of data.
    ///
    /// The buffer has usage `STORAGE | COPY_DST`; the contents are uploaded
    /// through a queue write, which avoids requiring the `MAP_WRITE` usage
    /// flag.  Writing immediately after creation is safe because the GPU
    /// has not yet seen the buffer.
    pub fn from_slice(context: &GpuContext, data: &[T]) -> Self {
        let bytes = cast_slice(data);
        let buffer = context.device.create_buffer(&BufferDescriptor {
            label: Some("input_buffer"),
            size: bytes.len() as u64,
            usage: BufferUsages::STORAGE | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        context.queue.write_buffer(&buffer, 0, bytes);
        Self {
            buffer,
            len: data.len(),
            _marker: std::marker::PhantomData,
        }
    }

    /// Create an output buffer of `len` elements with usage flags `STORAGE`
    /// and `COPY_SRC`, so it can be bound to a compute shader and later
    /// copied into a download buffer.  wgpu zero-initializes it, which is
    /// also the reset the benchmark wants before a device's first run.
    pub fn new_output(context: &GpuContext, len: usize) -> Self {
        let size = (len * std::mem::size_of::<T>()) as u64;
        let buffer = context.device.create_buffer(&BufferDescriptor {
            label: Some("output_buffer"),
            size,
            usage: BufferUsages::STORAGE | BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        Self {
            buffer,
            len,
            _marker: std::marker::PhantomData,
        }
    }

    /// Create a download buffer sized for `len` elements, with usage flags
    /// `COPY_DST` and `MAP_READ`.  It cannot be bound directly to a shader.
    pub fn new_download(context: &GpuContext, len: usize) -> Self {
        let size = (len * std::mem::size_of::<T>()) as u64;
        let buffer = context.device.create_buffer(&BufferDescriptor {
            label: Some("download_buffer"),
            size,
            usage: BufferUsages::COPY_DST | BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });
        Self {
            buffer,
            len,
            _marker: std::marker::PhantomData,
        }
    }

    /// Size of the buffer in bytes.
    pub fn byte_len(&self) -> u64 {
        (self.len * std::mem::size_of::<T>()) as u64
    }

    /// Read the contents of the buffer back to the CPU.
    ///
    /// The buffer must have `MAP_READ` usage and already contain the data of
    /// interest (i.e. be the target of a completed or submitted
    /// `copy_buffer_to_buffer`).  Blocks the current thread until the device
    /// has finished and the mapping is ready, then unmaps before returning.
    pub fn read_to_vec(&self, context: &GpuContext) -> Result<Vec<T>, BenchError> {
        let slice = self.buffer.slice(..);
        let (sender, receiver) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });

        // PollType::Wait keeps the CPU thread idle until the device has
        // completed all outstanding work, including the mapping.
        context
            .device
            .poll(wgpu::PollType::Wait)
            .map_err(|err| BenchError::Readback(format!("device poll failed: {err}")))?;
        receiver
            .recv()
            .map_err(|_| BenchError::Readback("map callback never ran".to_string()))?
            .map_err(|err| BenchError::Readback(format!("buffer map failed: {err}")))?;

        // The mapped view borrows the buffer; drop it before unmapping.
        let data = slice.get_mapped_range();
        let result: Vec<T> = cast_slice(&data).to_vec();
        drop(data);
        self.buffer.unmap();
        Ok(result)
    }
}
