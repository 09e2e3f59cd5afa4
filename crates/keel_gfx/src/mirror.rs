//! Mirror of the driver-visible state of one context

use crate::state::{FeedbackState, ProgramState, RasterState, VertexState, ViewPort, ViewPortMrt};
use keel_core::resource::{
    RenderTargetRef, RenderTargetType, SamplerRef, TextureImageRef, TextureRef,
};
use keel_core::{CapBits, Capabilities, DeviceCaps, FrameBounds, GpuVendor, Rect};

/// Upper bound on combined texture/sampler units tracked per context
pub const MAX_TEXTURE_IMAGES: usize = 32;
/// Upper bound on read-write image units tracked per context
pub const MAX_RWTEXTURE_IMAGES: usize = 8;

/// Last applied state, slot by slot.
///
/// Only the apply layer writes here. Slot tables are sized once from the
/// device limits and never grow.
#[derive(Debug, Clone)]
pub struct Mirror {
    pub(crate) capbits: CapBits,
    pub(crate) capabilities: Capabilities,
    pub(crate) vendor: GpuVendor,

    pub(crate) textures: Vec<Option<TextureRef>>,
    pub(crate) samplers: Vec<Option<SamplerRef>>,
    pub(crate) images: Vec<Option<TextureImageRef>>,
    pub(crate) render_targets: [Option<RenderTargetRef>; RenderTargetType::COUNT],

    pub(crate) vertex: VertexState,
    pub(crate) feedback: FeedbackState,
    pub(crate) program: ProgramState,
    pub(crate) raster: RasterState,

    pub(crate) viewport: ViewPort,
    /// Scissor test as the driver has it, derived from `viewport` and `framebounds`
    pub(crate) scissor: bool,
    /// Scissor rectangle as the driver has it
    pub(crate) scissor_rect: Rect,
    pub(crate) framebounds: FrameBounds,
    pub(crate) window: FrameBounds,
    pub(crate) viewport_mrt: ViewPortMrt,
}

impl Mirror {
    pub(crate) fn new(caps: &DeviceCaps, texture_units: usize, window: FrameBounds) -> Self {
        let units = texture_units.min(MAX_TEXTURE_IMAGES);
        let images = (caps.limits.teximages as usize).min(MAX_RWTEXTURE_IMAGES);
        let full = window.full_rect();
        Self {
            capbits: caps.bits,
            capabilities: caps.limits,
            vendor: caps.vendor,
            textures: vec![None; units],
            samplers: vec![None; units],
            images: vec![None; images],
            render_targets: Default::default(),
            vertex: VertexState::default(),
            feedback: FeedbackState::default(),
            program: ProgramState::default(),
            raster: RasterState::default(),
            viewport: ViewPort::new(full),
            scissor: false,
            scissor_rect: full,
            framebounds: window,
            window,
            viewport_mrt: ViewPortMrt::default(),
        }
    }

    pub fn capbits(&self) -> CapBits {
        self.capbits
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn vendor(&self) -> GpuVendor {
        self.vendor
    }

    pub fn textures(&self) -> &[Option<TextureRef>] {
        &self.textures
    }

    pub fn samplers(&self) -> &[Option<SamplerRef>] {
        &self.samplers
    }

    pub fn images(&self) -> &[Option<TextureImageRef>] {
        &self.images
    }

    pub fn texture(&self, unit: usize) -> Option<&TextureRef> {
        self.textures[unit].as_ref()
    }

    pub fn sampler(&self, unit: usize) -> Option<&SamplerRef> {
        self.samplers[unit].as_ref()
    }

    pub fn image(&self, unit: usize) -> Option<&TextureImageRef> {
        self.images[unit].as_ref()
    }

    pub fn render_target(&self, ty: RenderTargetType) -> Option<&RenderTargetRef> {
        self.render_targets[ty.index()].as_ref()
    }

    pub fn vertex(&self) -> &VertexState {
        &self.vertex
    }

    pub fn feedback(&self) -> &FeedbackState {
        &self.feedback
    }

    pub fn program(&self) -> &ProgramState {
        &self.program
    }

    pub fn raster(&self) -> &RasterState {
        &self.raster
    }

    pub fn viewport(&self) -> &ViewPort {
        &self.viewport
    }

    pub fn scissor(&self) -> bool {
        self.scissor
    }

    pub fn scissor_rect(&self) -> Rect {
        self.scissor_rect
    }

    pub fn framebounds(&self) -> FrameBounds {
        self.framebounds
    }

    pub fn window(&self) -> FrameBounds {
        self.window
    }

    pub fn viewport_mrt(&self) -> &ViewPortMrt {
        &self.viewport_mrt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_tables_are_capped() {
        let mut caps = DeviceCaps::default();
        caps.limits.teximages = 64;
        let mirror = Mirror::new(&caps, 192, FrameBounds::new(640, 480));
        assert_eq!(mirror.textures().len(), MAX_TEXTURE_IMAGES);
        assert_eq!(mirror.samplers().len(), MAX_TEXTURE_IMAGES);
        assert_eq!(mirror.images().len(), MAX_RWTEXTURE_IMAGES);
    }

    #[test]
    fn starts_unbound_with_full_viewport() {
        let caps = DeviceCaps::default();
        let mirror = Mirror::new(&caps, 16, FrameBounds::new(640, 480));
        assert!(mirror.textures().iter().all(Option::is_none));
        assert!(mirror.render_target(RenderTargetType::Draw).is_none());
        assert_eq!(mirror.viewport().bounds, Rect::new(0, 0, 640, 480));
        assert!(!mirror.scissor());
    }
}
