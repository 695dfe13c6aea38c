use burn::backend::Autodiff;
use burn::tensor::backend::Backend;
use tracing::info;

/// Training backend, resolved once at compile time: the GPU backend when the
/// `wgpu-backend` feature is enabled, otherwise the always-available CPU
/// backend. Evaluation runs on the matching inner (non-autodiff) backend.
#[cfg(feature = "wgpu-backend")]
pub type TrainBackend = Autodiff<burn_wgpu::Wgpu<f32, i32>>;

#[cfg(not(feature = "wgpu-backend"))]
pub type TrainBackend = Autodiff<burn_ndarray::NdArray<f32>>;

pub fn backend_name() -> &'static str {
    if cfg!(feature = "wgpu-backend") {
        "wgpu"
    } else {
        "ndarray"
    }
}

/// Resolve the compute device once at startup; the loops receive it by
/// injection and never query for devices themselves.
pub fn default_device() -> <TrainBackend as Backend>::Device {
    info!("Using {} backend", backend_name());
    Default::default()
}
