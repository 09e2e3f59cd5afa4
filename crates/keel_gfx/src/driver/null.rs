use super::Driver;
use keel_core::resource::{
    BlendDesc, BlitFilter, BlitMask, Buffer, ColorDesc, DepthDesc, LogicDesc, Program, RasterObject,
    RasterizerDesc, RenderFlags, RenderTarget, RenderTargetBlit, RenderTargetType, Sampler,
    SamplerAttribs, ShaderStage, StencilDesc, StreamHost, Texture, TextureImage, VertexDecl,
};
use keel_core::{CapBits, Capabilities, DeviceCaps, Rect};

/// Driver that accepts every call and does nothing.
///
/// Useful for headless runs and for measuring the cost of the mirror itself.
#[derive(Debug, Clone)]
pub struct NullDriver {
    caps: DeviceCaps,
}

impl NullDriver {
    pub fn new(caps: DeviceCaps) -> Self {
        Self { caps }
    }
}

impl Default for NullDriver {
    fn default() -> Self {
        Self::new(DeviceCaps::new(
            CapBits::API3 | CapBits::BLENDSEP | CapBits::OCCQUERY | CapBits::DEPTHCLAMP,
            Capabilities::default(),
        ))
    }
}

impl Driver for NullDriver {
    fn capabilities(&self) -> DeviceCaps {
        self.caps
    }

    fn bind_texture(&mut self, _unit: usize, _texture: Option<&Texture>) {}
    fn bind_sampler(&mut self, _unit: usize, _sampler: Option<&Sampler>) {}
    fn bind_texture_image(&mut self, _unit: usize, _image: Option<&TextureImage>) {}
    fn copy_sampler_to_texture(&mut self, _texture: &Texture, _sampler: Option<&Sampler>, _attribs: SamplerAttribs) {}

    fn set_depth(&mut self, _depth: Option<&RasterObject<DepthDesc>>) {}
    fn set_stencil(&mut self, _stencil: Option<&RasterObject<StencilDesc>>) {}
    fn set_blend(&mut self, _blend: Option<&RasterObject<BlendDesc>>) {}
    fn set_logic(&mut self, _logic: Option<&RasterObject<LogicDesc>>) {}
    fn set_color(&mut self, _color: Option<&RasterObject<ColorDesc>>) {}
    fn set_rasterizer(&mut self, _rasterizer: Option<&RasterObject<RasterizerDesc>>) {}
    fn set_render_flags(&mut self, _enabled: RenderFlags, _changed: RenderFlags) {}

    fn set_vertex_attribs(&mut self, _enabled: u32, _changed: u32) {}
    fn set_vertex_layout(&mut self, _decl: &VertexDecl, _streams: u32) {}
    fn bind_vertex_stream(&mut self, _stream: usize, _host: &StreamHost) {}
    fn bind_vertex_stream_address(&mut self, _stream: usize, _address: u64, _len: u64, _stride: u32) {}
    fn bind_feedback_stream(&mut self, _index: usize, _host: &StreamHost) {}

    fn use_program(&mut self, _program: Option<&Program>) {}
    fn upload_uniform(&mut self, _program: &Program, _location: u32, _data: &[u8]) {}
    fn bind_uniform_buffer(&mut self, _slot: usize, _buffer: Option<&Buffer>) {}
    fn upload_subroutines(&mut self, _program: &Program, _stage: ShaderStage, _selections: &[u32]) {}

    fn set_viewport(&mut self, _rect: &Rect) {}
    fn set_scissor(&mut self, _rect: &Rect) {}
    fn set_scissor_enabled(&mut self, _enabled: bool) {}
    fn set_viewports(&mut self, _first: usize, _rects: &[Rect]) {}
    fn set_scissors(&mut self, _first: usize, _rects: &[Rect]) {}

    fn bind_render_target(&mut self, _ty: RenderTargetType, _target: Option<&RenderTarget>) {}

    fn blit(
        &mut self,
        _to: Option<&RenderTarget>,
        _from: Option<&RenderTarget>,
        _blit: &RenderTargetBlit,
        _mask: BlitMask,
        _filter: BlitFilter,
    ) {
    }
}
