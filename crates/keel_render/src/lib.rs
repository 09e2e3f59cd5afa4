//! Keel Render
//!
//! Fills in [`DeviceCaps`](keel_core::DeviceCaps) from a real adapter so a
//! state context can be sized for the hardware it will drive.

pub mod probe;

pub use probe::{caps_from_limits, probe_adapter, probe_default_adapter, AdapterReport, ProbeError};
pub use wgpu;

/// Rendering backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// Metal (macOS, iOS)
    Metal,
    /// DirectX 12 (Windows)
    DirectX12,
    /// Vulkan (cross-platform)
    Vulkan,
    /// OpenGL / GLES (cross-platform, fallback)
    OpenGL,
    /// WebGPU (web)
    WebGpu,
    /// No real backend
    Software,
}

impl From<wgpu::Backend> for BackendType {
    fn from(backend: wgpu::Backend) -> Self {
        match backend {
            wgpu::Backend::Metal => BackendType::Metal,
            wgpu::Backend::Dx12 => BackendType::DirectX12,
            wgpu::Backend::Vulkan => BackendType::Vulkan,
            wgpu::Backend::Gl => BackendType::OpenGL,
            wgpu::Backend::BrowserWebGpu => BackendType::WebGpu,
            #[allow(unreachable_patterns)]
            _ => BackendType::Software,
        }
    }
}
