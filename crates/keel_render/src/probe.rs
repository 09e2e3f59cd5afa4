//! Adapter capability probe
//!
//! Translates wgpu limits, features and the downlevel shader model into the
//! capability bits and limits a state context is created with.

use crate::BackendType;
use keel_core::{CapBits, Capabilities, DeviceCaps, GpuVendor};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("no compatible GPU adapter found")]
    NoAdapter,
}

/// What a probe found, for logging and reporting.
#[derive(Debug, Clone)]
pub struct AdapterReport {
    pub name: String,
    pub backend: BackendType,
    pub caps: DeviceCaps,
}

/// Derive device caps from raw adapter data.
pub fn caps_from_limits(
    vendor: u32,
    limits: &wgpu::Limits,
    features: wgpu::Features,
    downlevel: &wgpu::DownlevelCapabilities,
) -> DeviceCaps {
    let mut bits = match downlevel.shader_model {
        wgpu::ShaderModel::Sm5 => CapBits::API4 | CapBits::API3,
        wgpu::ShaderModel::Sm4 => CapBits::API3,
        wgpu::ShaderModel::Sm2 => CapBits::API2,
    };
    // core wgpu always exposes occlusion queries
    bits |= CapBits::OCCQUERY;
    if downlevel.flags.contains(wgpu::DownlevelFlags::INDEPENDENT_BLEND) {
        bits |= CapBits::BLENDSEP;
    }
    if features.contains(wgpu::Features::TEXTURE_COMPRESSION_BC) {
        bits |= CapBits::TEXS3TC | CapBits::TEXRGTC;
    }
    if features.contains(wgpu::Features::DEPTH_CLIP_CONTROL) {
        bits |= CapBits::DEPTHCLAMP;
    }

    let texunits = limits
        .max_sampled_textures_per_shader_stage
        .min(limits.max_samplers_per_shader_stage);
    let texaniso = if downlevel.flags.contains(wgpu::DownlevelFlags::ANISOTROPIC_FILTERING) {
        16.0
    } else {
        1.0
    };

    let limits = Capabilities {
        texsize: limits.max_texture_dimension_2d,
        texsize3d: limits.max_texture_dimension_3d,
        texlayers: limits.max_texture_array_layers,
        texunits,
        teximages: limits.max_storage_textures_per_shader_stage,
        texcoords: limits.max_vertex_attributes,
        texvtxunits: limits.max_sampled_textures_per_shader_stage,
        texaniso,
        pointsize: 1.0,
        drawbuffers: limits.max_color_attachments,
        // wgpu exposes a single viewport
        viewports: 1,
        fbosamples: 4,
    };

    DeviceCaps::new(bits, limits).with_vendor(GpuVendor::from_pci_id(vendor))
}

/// Probe an adapter the caller already holds.
pub fn probe_adapter(adapter: &wgpu::Adapter) -> AdapterReport {
    let info = adapter.get_info();
    let caps = caps_from_limits(
        info.vendor,
        &adapter.limits(),
        adapter.features(),
        &adapter.get_downlevel_capabilities(),
    );
    tracing::debug!(
        adapter = %info.name,
        backend = ?info.backend,
        bits = ?caps.bits,
        texunits = caps.limits.texunits,
        "probed adapter"
    );
    AdapterReport {
        name: info.name,
        backend: info.backend.into(),
        caps,
    }
}

/// Request the default high-performance adapter and probe it.
pub fn probe_default_adapter() -> Result<AdapterReport, ProbeError> {
    let instance = wgpu::Instance::default();
    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::HighPerformance,
        compatible_surface: None,
        force_fallback_adapter: false,
    }))
    .ok_or(ProbeError::NoAdapter)?;
    Ok(probe_adapter(&adapter))
}
