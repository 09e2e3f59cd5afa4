//! Driver that records every call and shadows the bindings it was told about.

use super::{Driver, DriverSnapshot};
use keel_core::handle::id_of;
use keel_core::resource::{
    BlendDesc, BlitFilter, BlitMask, Buffer, ColorDesc, DepthDesc, LogicDesc, Program, RasterObject,
    RasterizerDesc, RenderFlags, RenderTarget, RenderTargetBlit, RenderTargetType, Sampler,
    SamplerAttribs, SamplerRef, ShaderStage, StencilDesc, StreamHost, Texture, TextureImage,
    TextureImageRef, TextureRef, VertexDecl,
};
use keel_core::{DeviceCaps, Rect, Resource, ResourceId};

/// One recorded driver call. Resources are captured by identity.
#[derive(Debug, Clone, PartialEq)]
pub enum DriverCall {
    BindTexture { unit: usize, texture: Option<ResourceId> },
    BindTextures { start: usize, textures: Vec<Option<ResourceId>> },
    BindSampler { unit: usize, sampler: Option<ResourceId> },
    BindSamplers { start: usize, samplers: Vec<Option<ResourceId>> },
    BindTextureImage { unit: usize, image: Option<ResourceId> },
    BindTextureImages { start: usize, images: Vec<Option<ResourceId>> },
    CopySamplerToTexture { texture: ResourceId, sampler: Option<ResourceId>, attribs: SamplerAttribs },
    SetDepth(Option<ResourceId>),
    SetStencil(Option<ResourceId>),
    SetBlend(Option<ResourceId>),
    SetLogic(Option<ResourceId>),
    SetColor(Option<ResourceId>),
    SetRasterizer(Option<ResourceId>),
    SetRenderFlags { enabled: RenderFlags, changed: RenderFlags },
    SetVertexAttribs { enabled: u32, changed: u32 },
    SetVertexLayout { decl: ResourceId, streams: u32 },
    BindVertexStream { stream: usize, buffer: Option<ResourceId>, offset: u64, stride: u32 },
    BindVertexStreamAddress { stream: usize, address: u64, len: u64, stride: u32 },
    BindFeedbackStream { index: usize, buffer: Option<ResourceId>, offset: u64 },
    UseProgram(Option<ResourceId>),
    UploadUniform { program: ResourceId, location: u32, len: usize },
    BindUniformBuffer { slot: usize, buffer: Option<ResourceId> },
    UploadSubroutines { program: ResourceId, stage: ShaderStage, selections: Vec<u32> },
    SetViewport(Rect),
    SetScissor(Rect),
    SetScissorEnabled(bool),
    SetViewports { first: usize, rects: Vec<Rect> },
    SetScissors { first: usize, rects: Vec<Rect> },
    BindRenderTarget { ty: RenderTargetType, target: Option<ResourceId> },
    Blit {
        to: Option<ResourceId>,
        from: Option<ResourceId>,
        blit: RenderTargetBlit,
        mask: BlitMask,
        filter: BlitFilter,
    },
}

impl DriverCall {
    /// Coarse category, used for per-frame reports.
    pub fn category(&self) -> &'static str {
        match self {
            DriverCall::BindTexture { .. } | DriverCall::BindTextures { .. } => "texture",
            DriverCall::BindSampler { .. } | DriverCall::BindSamplers { .. } => "sampler",
            DriverCall::BindTextureImage { .. } | DriverCall::BindTextureImages { .. } => "image",
            DriverCall::CopySamplerToTexture { .. } => "texture_sampler",
            DriverCall::SetDepth(_)
            | DriverCall::SetStencil(_)
            | DriverCall::SetBlend(_)
            | DriverCall::SetLogic(_)
            | DriverCall::SetColor(_)
            | DriverCall::SetRasterizer(_)
            | DriverCall::SetRenderFlags { .. } => "raster",
            DriverCall::SetVertexAttribs { .. }
            | DriverCall::SetVertexLayout { .. }
            | DriverCall::BindVertexStream { .. }
            | DriverCall::BindVertexStreamAddress { .. } => "vertex",
            DriverCall::BindFeedbackStream { .. } => "feedback",
            DriverCall::UseProgram(_)
            | DriverCall::UploadUniform { .. }
            | DriverCall::BindUniformBuffer { .. }
            | DriverCall::UploadSubroutines { .. } => "program",
            DriverCall::SetViewport(_)
            | DriverCall::SetScissor(_)
            | DriverCall::SetScissorEnabled(_)
            | DriverCall::SetViewports { .. }
            | DriverCall::SetScissors { .. } => "viewport",
            DriverCall::BindRenderTarget { .. } | DriverCall::Blit { .. } => "rendertarget",
        }
    }
}

fn ids<T: Resource>(slots: &[Option<T>]) -> Vec<Option<ResourceId>> {
    slots.iter().map(|s| id_of(s.as_ref())).collect()
}

/// Records calls in order and keeps a [`DriverSnapshot`] of what was bound.
#[derive(Debug, Clone)]
pub struct RecordingDriver {
    caps: DeviceCaps,
    calls: Vec<DriverCall>,
    shadow: DriverSnapshot,
}

impl RecordingDriver {
    pub fn new(caps: DeviceCaps) -> Self {
        Self {
            caps,
            calls: Vec::new(),
            shadow: DriverSnapshot::default(),
        }
    }

    pub fn calls(&self) -> &[DriverCall] {
        &self.calls
    }

    /// Drain the log, keeping the shadow bindings.
    pub fn take_calls(&mut self) -> Vec<DriverCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    pub fn count(&self, pred: impl Fn(&DriverCall) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    fn push(&mut self, call: DriverCall) {
        self.calls.push(call);
    }
}

impl Default for RecordingDriver {
    fn default() -> Self {
        Self::new(super::NullDriver::default().capabilities())
    }
}

impl Driver for RecordingDriver {
    fn capabilities(&self) -> DeviceCaps {
        self.caps
    }

    fn bind_texture(&mut self, unit: usize, texture: Option<&Texture>) {
        let id = id_of(texture);
        DriverSnapshot::store(&mut self.shadow.textures, unit, id);
        self.push(DriverCall::BindTexture { unit, texture: id });
    }

    fn bind_textures(&mut self, start: usize, textures: &[Option<TextureRef>]) {
        let textures = ids(textures);
        for (i, id) in textures.iter().enumerate() {
            DriverSnapshot::store(&mut self.shadow.textures, start + i, *id);
        }
        self.push(DriverCall::BindTextures { start, textures });
    }

    fn bind_sampler(&mut self, unit: usize, sampler: Option<&Sampler>) {
        let id = id_of(sampler);
        DriverSnapshot::store(&mut self.shadow.samplers, unit, id);
        self.push(DriverCall::BindSampler { unit, sampler: id });
    }

    fn bind_samplers(&mut self, start: usize, samplers: &[Option<SamplerRef>]) {
        let samplers = ids(samplers);
        for (i, id) in samplers.iter().enumerate() {
            DriverSnapshot::store(&mut self.shadow.samplers, start + i, *id);
        }
        self.push(DriverCall::BindSamplers { start, samplers });
    }

    fn bind_texture_image(&mut self, unit: usize, image: Option<&TextureImage>) {
        let id = id_of(image);
        DriverSnapshot::store(&mut self.shadow.images, unit, id);
        self.push(DriverCall::BindTextureImage { unit, image: id });
    }

    fn bind_texture_images(&mut self, start: usize, images: &[Option<TextureImageRef>]) {
        let images = ids(images);
        for (i, id) in images.iter().enumerate() {
            DriverSnapshot::store(&mut self.shadow.images, start + i, *id);
        }
        self.push(DriverCall::BindTextureImages { start, images });
    }

    fn copy_sampler_to_texture(&mut self, texture: &Texture, sampler: Option<&Sampler>, attribs: SamplerAttribs) {
        self.push(DriverCall::CopySamplerToTexture {
            texture: texture.id(),
            sampler: id_of(sampler),
            attribs,
        });
    }

    fn set_depth(&mut self, depth: Option<&RasterObject<DepthDesc>>) {
        self.shadow.raster[0] = id_of(depth);
        self.push(DriverCall::SetDepth(id_of(depth)));
    }

    fn set_stencil(&mut self, stencil: Option<&RasterObject<StencilDesc>>) {
        self.shadow.raster[1] = id_of(stencil);
        self.push(DriverCall::SetStencil(id_of(stencil)));
    }

    fn set_blend(&mut self, blend: Option<&RasterObject<BlendDesc>>) {
        self.shadow.raster[2] = id_of(blend);
        self.push(DriverCall::SetBlend(id_of(blend)));
    }

    fn set_logic(&mut self, logic: Option<&RasterObject<LogicDesc>>) {
        self.shadow.raster[3] = id_of(logic);
        self.push(DriverCall::SetLogic(id_of(logic)));
    }

    fn set_color(&mut self, color: Option<&RasterObject<ColorDesc>>) {
        self.shadow.raster[4] = id_of(color);
        self.push(DriverCall::SetColor(id_of(color)));
    }

    fn set_rasterizer(&mut self, rasterizer: Option<&RasterObject<RasterizerDesc>>) {
        self.shadow.raster[5] = id_of(rasterizer);
        self.push(DriverCall::SetRasterizer(id_of(rasterizer)));
    }

    fn set_render_flags(&mut self, enabled: RenderFlags, changed: RenderFlags) {
        self.shadow.render_flags = (self.shadow.render_flags & !changed) | (enabled & changed);
        self.push(DriverCall::SetRenderFlags { enabled, changed });
    }

    fn set_vertex_attribs(&mut self, enabled: u32, changed: u32) {
        self.shadow.vertex_attribs = (self.shadow.vertex_attribs & !changed) | (enabled & changed);
        self.push(DriverCall::SetVertexAttribs { enabled, changed });
    }

    fn set_vertex_layout(&mut self, decl: &VertexDecl, streams: u32) {
        self.push(DriverCall::SetVertexLayout { decl: decl.id(), streams });
    }

    fn bind_vertex_stream(&mut self, stream: usize, host: &StreamHost) {
        self.push(DriverCall::BindVertexStream {
            stream,
            buffer: id_of(host.buffer.as_ref()),
            offset: host.offset,
            stride: host.stride,
        });
    }

    fn bind_vertex_stream_address(&mut self, stream: usize, address: u64, len: u64, stride: u32) {
        self.push(DriverCall::BindVertexStreamAddress { stream, address, len, stride });
    }

    fn bind_feedback_stream(&mut self, index: usize, host: &StreamHost) {
        self.push(DriverCall::BindFeedbackStream {
            index,
            buffer: id_of(host.buffer.as_ref()),
            offset: host.offset,
        });
    }

    fn use_program(&mut self, program: Option<&Program>) {
        self.shadow.program = id_of(program);
        self.push(DriverCall::UseProgram(id_of(program)));
    }

    fn upload_uniform(&mut self, program: &Program, location: u32, data: &[u8]) {
        self.push(DriverCall::UploadUniform {
            program: program.id(),
            location,
            len: data.len(),
        });
    }

    fn bind_uniform_buffer(&mut self, slot: usize, buffer: Option<&Buffer>) {
        self.push(DriverCall::BindUniformBuffer { slot, buffer: id_of(buffer) });
    }

    fn upload_subroutines(&mut self, program: &Program, stage: ShaderStage, selections: &[u32]) {
        self.push(DriverCall::UploadSubroutines {
            program: program.id(),
            stage,
            selections: selections.to_vec(),
        });
    }

    fn set_viewport(&mut self, rect: &Rect) {
        self.shadow.viewport = Some(*rect);
        self.push(DriverCall::SetViewport(*rect));
    }

    fn set_scissor(&mut self, rect: &Rect) {
        self.push(DriverCall::SetScissor(*rect));
    }

    fn set_scissor_enabled(&mut self, enabled: bool) {
        self.shadow.scissor_enabled = enabled;
        self.push(DriverCall::SetScissorEnabled(enabled));
    }

    fn set_viewports(&mut self, first: usize, rects: &[Rect]) {
        if first == 0 {
            if let Some(rect) = rects.first() {
                self.shadow.viewport = Some(*rect);
            }
        }
        self.push(DriverCall::SetViewports { first, rects: rects.to_vec() });
    }

    fn set_scissors(&mut self, first: usize, rects: &[Rect]) {
        self.push(DriverCall::SetScissors { first, rects: rects.to_vec() });
    }

    fn bind_render_target(&mut self, ty: RenderTargetType, target: Option<&RenderTarget>) {
        self.shadow.render_targets[ty.index()] = id_of(target);
        self.push(DriverCall::BindRenderTarget { ty, target: id_of(target) });
    }

    fn blit(
        &mut self,
        to: Option<&RenderTarget>,
        from: Option<&RenderTarget>,
        blit: &RenderTargetBlit,
        mask: BlitMask,
        filter: BlitFilter,
    ) {
        self.push(DriverCall::Blit {
            to: id_of(to),
            from: id_of(from),
            blit: *blit,
            mask,
            filter,
        });
    }

    fn snapshot(&self) -> Option<DriverSnapshot> {
        Some(self.shadow.clone())
    }
}
