//! JSON state scripts
//!
//! A script declares named resources and a list of frames. Each frame is a
//! sequence of state requests that is pushed through the checked layer of a
//! context, optionally several times in a row.

use keel_core::resource::{
    BlendDesc, BlendRef, Buffer, BufferRef, BufferUsage, DepthDesc, DepthRef, Program, ProgramRef,
    RasterObject, RasterizerDesc, RasterizerRef, RenderFlags, RenderTarget, RenderTargetDesc,
    RenderTargetRef, RenderTargetType, Sampler, SamplerDesc, SamplerRef, ShaderStage, StreamHost,
    Texture, TextureDesc, TextureRef, VertexAttrib, VertexDecl, VertexDeclRef, MAX_VERTEX_STREAMS,
};
use keel_core::handle::same;
use keel_core::{FrameBounds, Rect};
use keel_gfx::{Context, Driver, ParameterData, ProgramParameter, MAX_UNIFORM_BUFFERS};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("reading script: {0}")]
    Io(#[from] std::io::Error),
    #[error("parsing script: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unknown {kind} '{name}'")]
    UnknownResource { kind: &'static str, name: String },
    #[error("{kind} slot {slot} out of range (limit {limit})")]
    BadSlot {
        kind: &'static str,
        slot: usize,
        limit: usize,
    },
    #[error("'{op}' needs a current program")]
    NoProgram { op: &'static str },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Script {
    /// Window extent the replay starts with
    pub window: Option<FrameBounds>,
    pub resources: Resources,
    pub frames: Vec<Frame>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Resources {
    pub textures: BTreeMap<String, TextureDesc>,
    pub samplers: BTreeMap<String, SamplerDesc>,
    pub buffers: BTreeMap<String, BufferSpec>,
    pub programs: BTreeMap<String, ProgramSpec>,
    pub targets: BTreeMap<String, RenderTargetDesc>,
    pub decls: BTreeMap<String, Vec<VertexAttrib>>,
    pub depth: BTreeMap<String, DepthDesc>,
    pub blend: BTreeMap<String, BlendDesc>,
    pub rasterizer: BTreeMap<String, RasterizerDesc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BufferSpec {
    pub usage: BufferUsage,
    pub size: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProgramSpec {
    pub subroutines: Vec<SubroutineSpec>,
}

/// Number of subroutine uniforms a stage declares.
#[derive(Debug, Clone, Deserialize)]
pub struct SubroutineSpec {
    pub stage: ShaderStage,
    pub count: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Frame {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default = "one")]
    pub repeat: u32,
    pub ops: Vec<Op>,
}

fn one() -> u32 {
    1
}

/// One state request. `name: null` unbinds.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Op {
    Texture { unit: usize, name: Option<String> },
    Sampler { unit: usize, name: Option<String> },
    /// Copy the unit's sampler parameters into its texture
    TextureSampler { unit: usize },
    Depth { name: Option<String> },
    Blend { name: Option<String> },
    Rasterizer { name: Option<String> },
    Flags { flags: RenderFlags },
    Program { name: Option<String> },
    UniformBuffer { slot: usize, name: Option<String> },
    Subroutine { stage: ShaderStage, index: usize, value: u32 },
    VertexDecl { name: Option<String> },
    VertexStream {
        stream: usize,
        buffer: String,
        #[serde(default)]
        offset: u64,
        stride: u32,
    },
    /// Flush scheduled vertex work, as before a draw
    Draw,
    Viewport { rect: Option<Rect> },
    Scissor { rect: Option<Rect> },
    Target {
        name: Option<String>,
        #[serde(default = "yes")]
        set_viewport: bool,
    },
    Window { width: i32, height: i32 },
    /// Respecify a sampler in place
    Respecify { sampler: String, desc: SamplerDesc },
    InvalidateStreams,
    SyncRaster,
}

fn yes() -> bool {
    true
}

impl Op {
    pub fn name(&self) -> &'static str {
        match self {
            Op::Texture { .. } => "texture",
            Op::Sampler { .. } => "sampler",
            Op::TextureSampler { .. } => "texture_sampler",
            Op::Depth { .. } => "depth",
            Op::Blend { .. } => "blend",
            Op::Rasterizer { .. } => "rasterizer",
            Op::Flags { .. } => "flags",
            Op::Program { .. } => "program",
            Op::UniformBuffer { .. } => "uniform_buffer",
            Op::Subroutine { .. } => "subroutine",
            Op::VertexDecl { .. } => "vertex_decl",
            Op::VertexStream { .. } => "vertex_stream",
            Op::Draw => "draw",
            Op::Viewport { .. } => "viewport",
            Op::Scissor { .. } => "scissor",
            Op::Target { .. } => "target",
            Op::Window { .. } => "window",
            Op::Respecify { .. } => "respecify",
            Op::InvalidateStreams => "invalidate_streams",
            Op::SyncRaster => "sync_raster",
        }
    }
}

impl Script {
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, ScriptError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Total number of replayed frames, repeats included.
    pub fn frame_count(&self) -> usize {
        self.frames.iter().map(|f| f.repeat as usize).sum()
    }
}

/// Live resources created from a script's declarations.
#[derive(Debug, Default)]
pub struct Scene {
    textures: BTreeMap<String, TextureRef>,
    samplers: BTreeMap<String, SamplerRef>,
    buffers: BTreeMap<String, BufferRef>,
    programs: BTreeMap<String, ProgramRef>,
    targets: BTreeMap<String, RenderTargetRef>,
    decls: BTreeMap<String, VertexDeclRef>,
    depth: BTreeMap<String, DepthRef>,
    blend: BTreeMap<String, BlendRef>,
    rasterizer: BTreeMap<String, RasterizerRef>,
}

fn lookup<T: Clone>(map: &BTreeMap<String, T>, kind: &'static str, name: &str) -> Result<T, ScriptError> {
    map.get(name).cloned().ok_or_else(|| ScriptError::UnknownResource {
        kind,
        name: name.to_string(),
    })
}

fn lookup_opt<T: Clone>(
    map: &BTreeMap<String, T>,
    kind: &'static str,
    name: Option<&str>,
) -> Result<Option<T>, ScriptError> {
    name.map(|n| lookup(map, kind, n)).transpose()
}

fn check_slot(kind: &'static str, slot: usize, limit: usize) -> Result<(), ScriptError> {
    if slot >= limit {
        return Err(ScriptError::BadSlot { kind, slot, limit });
    }
    Ok(())
}

impl Scene {
    pub fn build(resources: &Resources) -> Self {
        let mut scene = Scene::default();
        for (name, desc) in &resources.textures {
            scene.textures.insert(name.clone(), Texture::new(name.as_str(), *desc));
        }
        for (name, desc) in &resources.samplers {
            scene.samplers.insert(name.clone(), Sampler::new(name.as_str(), *desc));
        }
        for (name, spec) in &resources.buffers {
            scene
                .buffers
                .insert(name.clone(), Buffer::new(name.as_str(), spec.usage, spec.size));
        }
        for (name, spec) in &resources.programs {
            let mut counts = [0; ShaderStage::COUNT];
            for sub in &spec.subroutines {
                counts[sub.stage.index()] = sub.count;
            }
            scene
                .programs
                .insert(name.clone(), Program::with_subroutines(name.as_str(), counts));
        }
        for (name, desc) in &resources.targets {
            scene.targets.insert(name.clone(), RenderTarget::new(name.as_str(), *desc));
        }
        for (name, attribs) in &resources.decls {
            scene
                .decls
                .insert(name.clone(), VertexDecl::new(name.as_str(), attribs.clone()));
        }
        for (name, desc) in &resources.depth {
            scene.depth.insert(name.clone(), RasterObject::new(*desc));
        }
        for (name, desc) in &resources.blend {
            scene.blend.insert(name.clone(), RasterObject::new(*desc));
        }
        for (name, desc) in &resources.rasterizer {
            scene.rasterizer.insert(name.clone(), RasterObject::new(*desc));
        }
        tracing::debug!(
            textures = scene.textures.len(),
            samplers = scene.samplers.len(),
            programs = scene.programs.len(),
            "scene built"
        );
        scene
    }

    /// Push one request through the checked layer.
    pub fn run<D: Driver>(&self, ctx: &mut Context<D>, op: &Op) -> Result<(), ScriptError> {
        match op {
            Op::Texture { unit, name } => {
                check_slot("texture", *unit, ctx.mirror().textures().len())?;
                let texture = lookup_opt(&self.textures, "texture", name.as_deref())?;
                ctx.checked_texture(texture.as_ref(), *unit);
            }
            Op::Sampler { unit, name } => {
                check_slot("sampler", *unit, ctx.mirror().samplers().len())?;
                let sampler = lookup_opt(&self.samplers, "sampler", name.as_deref())?;
                ctx.checked_sampler(sampler.as_ref(), *unit);
            }
            Op::TextureSampler { unit } => {
                check_slot("texture", *unit, ctx.mirror().textures().len())?;
                ctx.checked_bound_texture_sampler(*unit);
            }
            Op::Depth { name } => {
                let depth = lookup_opt(&self.depth, "depth state", name.as_deref())?;
                ctx.checked_depth(depth.as_ref());
            }
            Op::Blend { name } => {
                let blend = lookup_opt(&self.blend, "blend state", name.as_deref())?;
                ctx.checked_blend(blend.as_ref());
            }
            Op::Rasterizer { name } => {
                let rasterizer = lookup_opt(&self.rasterizer, "rasterizer state", name.as_deref())?;
                ctx.checked_rasterizer(rasterizer.as_ref());
            }
            Op::Flags { flags } => {
                ctx.checked_render_flag(*flags);
            }
            Op::Program { name } => {
                let program = lookup_opt(&self.programs, "program", name.as_deref())?;
                ctx.checked_program(program.as_ref());
            }
            Op::UniformBuffer { slot, name } => {
                check_slot("uniform buffer", *slot, MAX_UNIFORM_BUFFERS)?;
                let buffer = lookup_opt(&self.buffers, "buffer", name.as_deref())?;
                let program = current_program(ctx, op)?;
                let param = ProgramParameter::buffer(format!("ubo{slot}"), *slot);
                ctx.apply_program_parameters(&program, &[&param], &[ParameterData::Buffer(buffer.as_ref())]);
            }
            Op::Subroutine { stage, index, value } => {
                let program = current_program(ctx, op)?;
                check_slot("subroutine", *index, program.subroutine_count(*stage) as usize)?;
                let param = ProgramParameter::subroutine(format!("{stage:?}.{index}"), *stage, *index);
                ctx.apply_program_parameters(&program, &[&param], &[ParameterData::Subroutine(*value)]);
            }
            Op::VertexDecl { name } => {
                let decl = lookup_opt(&self.decls, "vertex declaration", name.as_deref())?;
                ctx.checked_vertex_decl(decl.as_ref());
            }
            Op::VertexStream {
                stream,
                buffer,
                offset,
                stride,
            } => {
                check_slot("vertex stream", *stream, MAX_VERTEX_STREAMS)?;
                let buffer = lookup(&self.buffers, "buffer", buffer)?;
                ctx.set_vertex_stream(*stream, &StreamHost::new(buffer, *offset, *stride));
            }
            Op::Draw => {
                match ctx.config().vertex_path {
                    keel_gfx::VertexPath::Standard => ctx.checked_vertex(),
                    keel_gfx::VertexPath::Bindless => ctx.checked_vertex_bindless(),
                };
            }
            Op::Viewport { rect } => {
                ctx.apply_viewport_rect(rect.as_ref());
            }
            Op::Scissor { rect } => {
                ctx.checked_viewport_scissor(rect.as_ref());
            }
            Op::Target { name, set_viewport } => {
                let target = lookup_opt(&self.targets, "render target", name.as_deref())?;
                let current = ctx.mirror().render_target(RenderTargetType::Draw);
                if !same(current, target.as_ref()) {
                    ctx.apply_render_target_draw(target.as_ref(), *set_viewport);
                }
            }
            Op::Window { width, height } => {
                ctx.set_window(FrameBounds::new(*width, *height));
            }
            Op::Respecify { sampler, desc } => {
                let sampler = lookup(&self.samplers, "sampler", sampler)?;
                let desc = *desc;
                sampler.update(|d| *d = desc);
            }
            Op::InvalidateStreams => ctx.invalidate_vertex_streams(),
            Op::SyncRaster => ctx.sync_raster_states(),
        }
        Ok(())
    }
}

fn current_program<D: Driver>(ctx: &Context<D>, op: &Op) -> Result<ProgramRef, ScriptError> {
    ctx.mirror()
        .program()
        .current()
        .cloned()
        .ok_or(ScriptError::NoProgram { op: op.name() })
}
