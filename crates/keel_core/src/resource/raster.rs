//! Immutable raster sub-state blocks
//!
//! Depth, stencil, blend, logic, color and rasterizer state are each built once
//! as a [`RasterObject`] and then switched by identity.

use super::sampler::CompareFunc;
use crate::handle::{Resource, ResourceId};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Immutable state block with identity.
#[derive(Debug)]
pub struct RasterObject<T> {
    id: ResourceId,
    desc: T,
}

impl<T> RasterObject<T> {
    pub fn new(desc: T) -> Arc<Self> {
        Arc::new(Self {
            id: ResourceId::next(),
            desc,
        })
    }

    pub fn desc(&self) -> &T {
        &self.desc
    }
}

impl<T> Resource for RasterObject<T> {
    fn id(&self) -> ResourceId {
        self.id
    }
}

pub type DepthRef = Arc<RasterObject<DepthDesc>>;
pub type StencilRef = Arc<RasterObject<StencilDesc>>;
pub type BlendRef = Arc<RasterObject<BlendDesc>>;
pub type LogicRef = Arc<RasterObject<LogicDesc>>;
pub type ColorRef = Arc<RasterObject<ColorDesc>>;
pub type RasterizerRef = Arc<RasterObject<RasterizerDesc>>;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct DepthDesc {
    pub func: CompareFunc,
    pub write: bool,
    pub clamp: bool,
}

impl Default for DepthDesc {
    fn default() -> Self {
        Self {
            func: CompareFunc::Less,
            write: true,
            clamp: false,
        }
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StencilOp {
    #[default]
    Keep,
    Zero,
    Replace,
    IncrementClamp,
    DecrementClamp,
    Invert,
    IncrementWrap,
    DecrementWrap,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct StencilFace {
    pub func: CompareFunc,
    pub reference: u8,
    pub read_mask: u8,
    pub write_mask: u8,
    pub fail: StencilOp,
    pub depth_fail: StencilOp,
    pub pass: StencilOp,
}

impl Default for StencilFace {
    fn default() -> Self {
        Self {
            func: CompareFunc::Always,
            reference: 0,
            read_mask: 0xFF,
            write_mask: 0xFF,
            fail: StencilOp::Keep,
            depth_fail: StencilOp::Keep,
            pass: StencilOp::Keep,
        }
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct StencilDesc {
    pub front: StencilFace,
    pub back: StencilFace,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstColor,
    OneMinusDstColor,
    DstAlpha,
    OneMinusDstAlpha,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlendOp {
    #[default]
    Add,
    Subtract,
    ReverseSubtract,
    Min,
    Max,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlendEquation {
    pub src: BlendFactor,
    pub dst: BlendFactor,
    pub op: BlendOp,
}

impl BlendEquation {
    pub const REPLACE: Self = Self {
        src: BlendFactor::One,
        dst: BlendFactor::Zero,
        op: BlendOp::Add,
    };

    pub const ALPHA: Self = Self {
        src: BlendFactor::SrcAlpha,
        dst: BlendFactor::OneMinusSrcAlpha,
        op: BlendOp::Add,
    };
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendDesc {
    pub color: BlendEquation,
    /// `None` uses the color equation for alpha as well
    pub alpha: Option<BlendEquation>,
}

impl Default for BlendDesc {
    fn default() -> Self {
        Self {
            color: BlendEquation::REPLACE,
            alpha: None,
        }
    }
}

impl BlendDesc {
    /// True if alpha needs its own equation (requires `CapBits::BLENDSEP`).
    pub fn is_separate(&self) -> bool {
        self.alpha.is_some_and(|a| a != self.color)
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicOp {
    Clear,
    And,
    #[default]
    Copy,
    Xor,
    Or,
    Nor,
    Invert,
    Set,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogicDesc {
    pub op: LogicOp,
}

bitflags! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ColorWrite: u32 {
        const R = 1 << 0;
        const G = 1 << 1;
        const B = 1 << 2;
        const A = 1 << 3;
        const ALL = Self::R.bits() | Self::G.bits() | Self::B.bits() | Self::A.bits();
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColorDesc {
    pub write: ColorWrite,
}

impl Default for ColorDesc {
    fn default() -> Self {
        Self { write: ColorWrite::ALL }
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CullMode {
    None,
    Front,
    #[default]
    Back,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FillMode {
    #[default]
    Solid,
    Line,
    Point,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterizerDesc {
    pub cull: CullMode,
    pub front_ccw: bool,
    pub fill: FillMode,
    /// (factor, units)
    pub polygon_offset: Option<(f32, f32)>,
}

impl Default for RasterizerDesc {
    fn default() -> Self {
        Self {
            cull: CullMode::Back,
            front_ccw: true,
            fill: FillMode::Solid,
            polygon_offset: None,
        }
    }
}

bitflags! {
    /// Fixed-function enables toggled independently of the state blocks.
    #[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct RenderFlags: u32 {
        const DEPTH_TEST = 1 << 0;
        const STENCIL_TEST = 1 << 1;
        const BLEND = 1 << 2;
        const LOGIC_OP = 1 << 3;
        const CULL_FACE = 1 << 4;
        const POLYGON_OFFSET = 1 << 5;
        const ALPHA_TO_COVERAGE = 1 << 6;
        const PRIMITIVE_RESTART = 1 << 7;
        const DEPTH_CLAMP = 1 << 8;
        const RASTERIZER_DISCARD = 1 << 9;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_descs_are_distinct_objects() {
        let a = RasterObject::new(DepthDesc::default());
        let b = RasterObject::new(DepthDesc::default());
        assert_eq!(a.desc(), b.desc());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn blend_separation() {
        let mut blend = BlendDesc::default();
        assert!(!blend.is_separate());
        blend.alpha = Some(BlendEquation::REPLACE);
        assert!(!blend.is_separate());
        blend.alpha = Some(BlendEquation::ALPHA);
        assert!(blend.is_separate());
    }
}
