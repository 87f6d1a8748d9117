//! Error type shared across the harness.
//!
//! Device-side failures are the interesting ones: the driver catches them
//! per device, logs the message together with a stable numeric code, and
//! moves on to the next device.  Host-side strategies cannot fail once
//! constructed, so most library calls only ever surface these variants
//! around GPU setup, dispatch and readback.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Crate-wide result alias.
pub type BenchResult<T> = Result<T, BenchError>;

/// Everything that can go wrong while preparing or running a benchmark.
#[derive(Debug, Error)]
pub enum BenchError {
    /// The harness configuration was rejected before any work started.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The device kernel source file could not be read.
    #[error("kernel source {path:?} unreadable: {source}")]
    KernelSource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// No adapter was found, or the platform refused the adapter request.
    #[error("no suitable GPU adapter: {0}")]
    AdapterUnavailable(String),

    /// The selected adapter cannot run compute shaders.
    #[error("adapter '{0}' does not support compute shaders")]
    ComputeUnsupported(String),

    /// Logical device and queue creation failed.
    #[error("failed to create GPU device: {0}")]
    DeviceRequest(String),

    /// The kernel source or the pipeline built from it was rejected.
    #[error("kernel build failed on '{device}': {detail}")]
    KernelBuild { device: String, detail: String },

    /// The device did not complete the submitted work.
    #[error("device execution failed: {0}")]
    Execution(String),

    /// Copying results back to the host failed.
    #[error("output readback failed: {0}")]
    Readback(String),
}

impl BenchError {
    /// Stable numeric code printed alongside the message when a device is
    /// skipped, mirroring the numeric error codes of native compute APIs.
    pub fn code(&self) -> i32 {
        match self {
            BenchError::InvalidConfig(_) => 2,
            BenchError::KernelSource { .. } => 10,
            BenchError::AdapterUnavailable(_) => 11,
            BenchError::ComputeUnsupported(_) => 12,
            BenchError::DeviceRequest(_) => 13,
            BenchError::KernelBuild { .. } => 14,
            BenchError::Execution(_) => 15,
            BenchError::Readback(_) => 16,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        let errors = [
            BenchError::InvalidConfig(String::new()),
            BenchError::KernelSource {
                path: PathBuf::from("k.wgsl"),
                source: io::Error::new(io::ErrorKind::NotFound, "missing"),
            },
            BenchError::AdapterUnavailable(String::new()),
            BenchError::ComputeUnsupported(String::new()),
            BenchError::DeviceRequest(String::new()),
            BenchError::KernelBuild {
                device: String::new(),
                detail: String::new(),
            },
            BenchError::Execution(String::new()),
            BenchError::Readback(String::new()),
        ];
        let mut codes: Vec<i32> = errors.iter().map(BenchError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn kernel_source_message_names_the_path() {
        let err = BenchError::KernelSource {
            path: PathBuf::from("kernels/missing.wgsl"),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        let message = err.to_string();
        assert!(message.contains("missing.wgsl"));
        assert_eq!(err.code(), 10);
    }
}
