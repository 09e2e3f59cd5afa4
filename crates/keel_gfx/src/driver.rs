//! Driver boundary
//!
//! Every state transition the context decides to issue goes through exactly
//! one [`Driver`] call. Implementations must execute calls in the order they
//! arrive and must not reorder or coalesce them; redundancy elimination is the
//! context's job.

mod null;
mod recording;

pub use null::NullDriver;
pub use recording::{DriverCall, RecordingDriver};

use keel_core::resource::{
    BlendDesc, BlitFilter, BlitMask, Buffer, ColorDesc, DepthDesc, LogicDesc, Program, RasterObject,
    RasterizerDesc, RenderFlags, RenderTarget, RenderTargetBlit, RenderTargetType, Sampler,
    SamplerAttribs, SamplerRef, ShaderStage, StencilDesc, StreamHost, Texture, TextureImage,
    TextureImageRef, TextureRef, VertexDecl,
};
use keel_core::{DeviceCaps, Rect, ResourceId};

/// Graphics API backend driven by a [`Context`](crate::Context).
///
/// Raster setters receive `None` to restore API defaults. Render target and
/// blit calls receive `None` for the default framebuffer.
pub trait Driver {
    /// Capability bits and limits, queried once at context creation.
    fn capabilities(&self) -> DeviceCaps;

    fn bind_texture(&mut self, unit: usize, texture: Option<&Texture>);

    fn bind_textures(&mut self, start: usize, textures: &[Option<TextureRef>]) {
        for (i, texture) in textures.iter().enumerate() {
            self.bind_texture(start + i, texture.as_deref());
        }
    }

    fn bind_sampler(&mut self, unit: usize, sampler: Option<&Sampler>);

    fn bind_samplers(&mut self, start: usize, samplers: &[Option<SamplerRef>]) {
        for (i, sampler) in samplers.iter().enumerate() {
            self.bind_sampler(start + i, sampler.as_deref());
        }
    }

    fn bind_texture_image(&mut self, unit: usize, image: Option<&TextureImage>);

    fn bind_texture_images(&mut self, start: usize, images: &[Option<TextureImageRef>]) {
        for (i, image) in images.iter().enumerate() {
            self.bind_texture_image(start + i, image.as_deref());
        }
    }

    /// Copy sampler parameters onto the texture object itself (bound-texture sampling state).
    fn copy_sampler_to_texture(&mut self, texture: &Texture, sampler: Option<&Sampler>, attribs: SamplerAttribs);

    fn set_depth(&mut self, depth: Option<&RasterObject<DepthDesc>>);
    fn set_stencil(&mut self, stencil: Option<&RasterObject<StencilDesc>>);
    fn set_blend(&mut self, blend: Option<&RasterObject<BlendDesc>>);
    fn set_logic(&mut self, logic: Option<&RasterObject<LogicDesc>>);
    fn set_color(&mut self, color: Option<&RasterObject<ColorDesc>>);
    fn set_rasterizer(&mut self, rasterizer: Option<&RasterObject<RasterizerDesc>>);

    /// Toggle only the flags in `changed`; `enabled` holds their target values.
    fn set_render_flags(&mut self, enabled: RenderFlags, changed: RenderFlags);

    /// Enable/disable only the attribute locations in `changed`.
    fn set_vertex_attribs(&mut self, enabled: u32, changed: u32);

    /// Specify attribute formats of `decl` for the streams in `streams`.
    fn set_vertex_layout(&mut self, decl: &VertexDecl, streams: u32);

    fn bind_vertex_stream(&mut self, stream: usize, host: &StreamHost);

    /// Bindless stream binding by resident address.
    fn bind_vertex_stream_address(&mut self, stream: usize, address: u64, len: u64, stride: u32);

    fn bind_feedback_stream(&mut self, index: usize, host: &StreamHost);

    fn use_program(&mut self, program: Option<&Program>);

    fn upload_uniform(&mut self, program: &Program, location: u32, data: &[u8]);

    fn bind_uniform_buffer(&mut self, slot: usize, buffer: Option<&Buffer>);

    fn upload_subroutines(&mut self, program: &Program, stage: ShaderStage, selections: &[u32]);

    fn set_viewport(&mut self, rect: &Rect);
    fn set_scissor(&mut self, rect: &Rect);
    fn set_scissor_enabled(&mut self, enabled: bool);

    /// Per draw buffer viewports starting at index `first`.
    fn set_viewports(&mut self, first: usize, rects: &[Rect]);
    fn set_scissors(&mut self, first: usize, rects: &[Rect]);

    fn bind_render_target(&mut self, ty: RenderTargetType, target: Option<&RenderTarget>);

    /// Copy a region between targets. Must leave the draw/read bindings as it found them.
    fn blit(
        &mut self,
        to: Option<&RenderTarget>,
        from: Option<&RenderTarget>,
        blit: &RenderTargetBlit,
        mask: BlitMask,
        filter: BlitFilter,
    );

    /// Driver-visible bindings, if the backend can report them.
    fn snapshot(&self) -> Option<DriverSnapshot> {
        None
    }
}

/// Bindings as seen by the driver, used to verify the mirror.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriverSnapshot {
    pub textures: Vec<Option<ResourceId>>,
    pub samplers: Vec<Option<ResourceId>>,
    pub images: Vec<Option<ResourceId>>,
    pub render_targets: [Option<ResourceId>; RenderTargetType::COUNT],
    pub program: Option<ResourceId>,
    /// depth, stencil, blend, logic, color, rasterizer
    pub raster: [Option<ResourceId>; 6],
    pub render_flags: RenderFlags,
    pub vertex_attribs: u32,
    /// Last viewport set, `None` until the first one
    pub viewport: Option<Rect>,
    pub scissor_enabled: bool,
}

impl DriverSnapshot {
    /// Slot `index` of a binding table; slots never written read as unbound.
    pub fn slot(table: &[Option<ResourceId>], index: usize) -> Option<ResourceId> {
        table.get(index).copied().flatten()
    }

    pub(crate) fn store(table: &mut Vec<Option<ResourceId>>, index: usize, id: Option<ResourceId>) {
        if table.len() <= index {
            table.resize(index + 1, None);
        }
        table[index] = id;
    }
}
