//! Render targets and blits

use crate::handle::{Resource, ResourceId};
use crate::math::{FrameBounds, Rect};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub type RenderTargetRef = Arc<RenderTarget>;

/// Binding point of a render target.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RenderTargetType {
    Draw,
    Read,
}

impl RenderTargetType {
    pub const COUNT: usize = 2;

    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderTargetDesc {
    pub width: i32,
    pub height: i32,
    pub color_attachments: u32,
    pub depth: bool,
    pub stencil: bool,
    pub samples: u32,
}

impl Default for RenderTargetDesc {
    fn default() -> Self {
        Self {
            width: 1,
            height: 1,
            color_attachments: 1,
            depth: true,
            stencil: false,
            samples: 1,
        }
    }
}

#[derive(Debug)]
pub struct RenderTarget {
    id: ResourceId,
    label: String,
    desc: RenderTargetDesc,
}

impl RenderTarget {
    pub fn new(label: impl Into<String>, desc: RenderTargetDesc) -> RenderTargetRef {
        Arc::new(Self {
            id: ResourceId::next(),
            label: label.into(),
            desc,
        })
    }

    pub fn desc(&self) -> &RenderTargetDesc {
        &self.desc
    }

    pub fn bounds(&self) -> FrameBounds {
        FrameBounds::new(self.desc.width, self.desc.height)
    }
}

impl Resource for RenderTarget {
    fn id(&self) -> ResourceId {
        self.id
    }

    fn label(&self) -> &str {
        &self.label
    }
}

bitflags! {
    /// Buffers copied by a blit.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct BlitMask: u32 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
        const STENCIL = 1 << 2;
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlitFilter {
    #[default]
    Nearest,
    Linear,
}

/// Source and destination regions of a blit.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderTargetBlit {
    pub from: Rect,
    pub to: Rect,
}

impl RenderTargetBlit {
    /// Same-size copy of `rect`.
    pub fn region(rect: Rect) -> Self {
        Self { from: rect, to: rect }
    }

    pub fn is_scaled(&self) -> bool {
        self.from.size() != self.to.size()
    }
}
