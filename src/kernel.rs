//! The pluggable per-element kernel.
//!
//! Every strategy applies the same pure function `combine(a, b) -> f32` to
//! each index pair.  On the host that function is a plain fn pointer; on the
//! device it is an opaque WGSL source text handed to the compute API, read
//! from a file on disk or taken from one of the embedded built-ins.  The
//! host fn and the WGSL text are meant to implement the same formula — the
//! validator exists to report how far apart they drift.
//!
//! WGSL contract expected by [`crate::offload::DeviceStrategy`]: two
//! read-only `array<f32>` storage buffers at bindings 0 and 1, one
//! read_write `array<f32>` storage buffer at binding 2, and an entry point
//! that rebuilds the linear element index from the workgroup grid and guards
//! it against `arrayLength` (dispatches are ceil-divided and may be split
//! over two grid dimensions).  The element count the original native APIs
//! pass as a fourth kernel argument is subsumed by `arrayLength`.

use std::fs;
use std::path::Path;

use crate::error::BenchError;

/// Host-side per-element function.
pub type CombineFn = fn(f32, f32) -> f32;

/// Workgroup size used by the bundled kernels' `@workgroup_size` attribute.
/// A custom kernel source must keep its attribute in sync with the value
/// configured on the harness.
pub const DEFAULT_WORKGROUP_SIZE: u32 = 64;

/// Device-side kernel program: WGSL source plus the entry point to invoke.
#[derive(Debug, Clone)]
pub struct KernelSource {
    pub wgsl: String,
    pub entry_point: String,
}

impl KernelSource {
    /// Wrap an already-loaded WGSL string.
    pub fn from_wgsl(wgsl: impl Into<String>, entry_point: impl Into<String>) -> Self {
        Self {
            wgsl: wgsl.into(),
            entry_point: entry_point.into(),
        }
    }

    /// Read the kernel source from a plain text file on disk.
    ///
    /// The file content is not inspected here; a malformed kernel surfaces
    /// later as a per-device build failure.
    pub fn from_file(path: &Path, entry_point: &str) -> Result<Self, BenchError> {
        let wgsl = fs::read_to_string(path).map_err(|source| BenchError::KernelSource {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_wgsl(wgsl, entry_point))
    }

    /// Embedded copy of the bundled workload kernel
    /// (`kernels/combine.wgsl`); host reference is [`combine`].
    pub fn builtin_combine() -> Self {
        Self::from_wgsl(COMBINE_WGSL, "combine")
    }

    /// Embedded element-wise addition kernel; host reference is [`add`].
    /// Used by tests and demos where the output is exactly predictable.
    pub fn builtin_add() -> Self {
        Self::from_wgsl(ADD_WGSL, "add")
    }
}

const COMBINE_WGSL: &str = include_str!("../kernels/combine.wgsl");

const ADD_WGSL: &str = r#"
@group(0) @binding(0)
var<storage, read> a: array<f32>;
@group(0) @binding(1)
var<storage, read> b: array<f32>;
@group(0) @binding(2)
var<storage, read_write> out: array<f32>;

@compute @workgroup_size(64)
fn add(@builtin(global_invocation_id) gid: vec3<u32>,
       @builtin(num_workgroups) groups: vec3<u32>) {
    let i = gid.y * (groups.x * 64u) + gid.x;
    if (i >= arrayLength(&a)) {
        return;
    }
    out[i] = a[i] + b[i];
}
"#;

const COMBINE_TERMS: u32 = 16;

/// Host reference implementation of the bundled workload kernel: a bounded
/// sin/cos accumulation, arithmetic-dense enough that offload has something
/// to amortise its transfer and dispatch overhead against.
pub fn combine(a: f32, b: f32) -> f32 {
    let mut acc = 0.0f32;
    for k in 1..=COMBINE_TERMS {
        let kf = k as f32;
        acc += (a * kf).sin() * (b * kf).cos();
    }
    acc / COMBINE_TERMS as f32
}

/// Host reference implementation of the embedded addition kernel.
pub fn add(a: f32, b: f32) -> f32 {
    a + b
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn builtin_sources_carry_their_entry_points() {
        let combine = KernelSource::builtin_combine();
        assert!(combine.wgsl.contains("fn combine"));
        assert_eq!(combine.entry_point, "combine");

        let add = KernelSource::builtin_add();
        assert!(add.wgsl.contains("fn add"));
        assert_eq!(add.entry_point, "add");
    }

    #[test]
    fn missing_kernel_file_is_a_setup_error() {
        let err = KernelSource::from_file(Path::new("kernels/does_not_exist.wgsl"), "combine")
            .expect_err("reading a missing file must fail");
        assert!(matches!(err, BenchError::KernelSource { .. }));
        assert_eq!(err.code(), 10);
    }

    #[test]
    fn kernel_file_round_trips_from_disk() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "{ADD_WGSL}").expect("write WGSL");
        let source =
            KernelSource::from_file(file.path(), "add").expect("readable file must load");
        assert_eq!(source.wgsl, ADD_WGSL);
        assert_eq!(source.entry_point, "add");
    }

    #[test]
    fn host_add_matches_plain_addition() {
        assert_eq!(add(1.0, 1.0), 2.0);
        assert_eq!(add(-3.5, 0.5), -3.0);
    }

    #[test]
    fn host_combine_is_pure_and_bounded() {
        let first = combine(0.25, 0.75);
        let second = combine(0.25, 0.75);
        assert_eq!(first, second);
        // Each term is a product of a sine and a cosine, so the mean of the
        // terms stays within [-1, 1].
        assert!(first.abs() <= 1.0);
    }
}
