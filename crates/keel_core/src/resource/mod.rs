//! Bindable GPU resource objects
//!
//! Resources are created by the renderer and shared as `Arc`s. Contexts only
//! read their identity/incarnation (and write back the texture sampler hint).

pub mod buffer;
pub mod program;
pub mod raster;
pub mod sampler;
pub mod target;
pub mod texture;
pub mod vertex;

pub use buffer::{Buffer, BufferRef, BufferUsage, StreamHost};
pub use program::{Program, ProgramRef, ShaderStage};
pub use raster::{
    BlendDesc, BlendEquation, BlendFactor, BlendOp, BlendRef, ColorDesc, ColorRef, ColorWrite, CullMode,
    DepthDesc, DepthRef, FillMode, LogicDesc, LogicOp, LogicRef, RasterObject, RasterizerDesc,
    RasterizerRef, RenderFlags, StencilDesc, StencilFace, StencilOp, StencilRef,
};
pub use sampler::{AddressMode, CompareFunc, Filter, Sampler, SamplerAttribs, SamplerDesc, SamplerRef};
pub use target::{
    BlitFilter, BlitMask, RenderTarget, RenderTargetBlit, RenderTargetDesc, RenderTargetRef,
    RenderTargetType,
};
pub use texture::{ImageAccess, Texture, TextureDesc, TextureImage, TextureImageRef, TextureKind, TextureRef};
pub use vertex::{
    VertexAttrib, VertexDecl, VertexDeclRef, VertexFormat, MAX_VERTEX_ATTRIBS, MAX_VERTEX_STREAMS,
};
