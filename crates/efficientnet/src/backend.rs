//! Compile-time backend selection.

/// Backend for binaries and tools (NdArray by default; WGPU if enabled).
#[cfg(feature = "backend-wgpu")]
pub type DefaultBackend = burn_wgpu::Wgpu<f32>;
#[cfg(not(feature = "backend-wgpu"))]
pub type DefaultBackend = burn_ndarray::NdArray<f32>;

pub type DefaultDevice = <DefaultBackend as burn::tensor::backend::Backend>::Device;

pub fn backend_name() -> &'static str {
    if cfg!(feature = "backend-wgpu") {
        "wgpu"
    } else {
        "ndarray"
    }
}
