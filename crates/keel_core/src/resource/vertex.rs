//! Vertex declarations
//!
//! A declaration describes which attributes are fetched from which streams.
//! The buffers feeding those streams are bound separately as `StreamHost`s.

use crate::handle::{Resource, ResourceId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub type VertexDeclRef = Arc<VertexDecl>;

/// Attribute locations addressable by a declaration (bits of an attribute mask)
pub const MAX_VERTEX_ATTRIBS: usize = 16;
/// Vertex streams addressable by a declaration (bits of a stream mask)
pub const MAX_VERTEX_STREAMS: usize = 8;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VertexFormat {
    Float32x1,
    Float32x2,
    Float32x3,
    Float32x4,
    Float16x2,
    Float16x4,
    Unorm8x4,
    Snorm8x4,
    Uint8x4,
    Sint16x2,
    Sint16x4,
    Uint32x1,
}

impl VertexFormat {
    pub fn size(self) -> u32 {
        match self {
            VertexFormat::Float32x1 | VertexFormat::Uint32x1 => 4,
            VertexFormat::Float32x2 => 8,
            VertexFormat::Float32x3 => 12,
            VertexFormat::Float32x4 => 16,
            VertexFormat::Float16x2 => 4,
            VertexFormat::Float16x4 => 8,
            VertexFormat::Unorm8x4 | VertexFormat::Snorm8x4 | VertexFormat::Uint8x4 => 4,
            VertexFormat::Sint16x2 => 4,
            VertexFormat::Sint16x4 => 8,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VertexAttrib {
    /// Attribute location
    pub location: u8,
    pub stream: u8,
    pub format: VertexFormat,
    pub offset: u32,
}

#[derive(Debug)]
pub struct VertexDecl {
    id: ResourceId,
    label: String,
    attribs: Vec<VertexAttrib>,
    attrib_mask: u32,
    stream_mask: u32,
}

impl VertexDecl {
    /// # Panics
    ///
    /// Panics if an attribute location or stream index is out of range.
    pub fn new(label: impl Into<String>, attribs: Vec<VertexAttrib>) -> VertexDeclRef {
        let mut attrib_mask = 0u32;
        let mut stream_mask = 0u32;
        for a in &attribs {
            assert!(
                (a.location as usize) < MAX_VERTEX_ATTRIBS,
                "attribute location {} out of range",
                a.location
            );
            assert!(
                (a.stream as usize) < MAX_VERTEX_STREAMS,
                "vertex stream {} out of range",
                a.stream
            );
            attrib_mask |= 1 << a.location;
            stream_mask |= 1 << a.stream;
        }
        Arc::new(Self {
            id: ResourceId::next(),
            label: label.into(),
            attribs,
            attrib_mask,
            stream_mask,
        })
    }

    pub fn attribs(&self) -> &[VertexAttrib] {
        &self.attribs
    }

    /// Attributes that must be enabled when this declaration is active.
    pub fn attrib_mask(&self) -> u32 {
        self.attrib_mask
    }

    /// Streams that must have a host bound.
    pub fn stream_mask(&self) -> u32 {
        self.stream_mask
    }

    /// Attributes fetched from `stream`.
    pub fn stream_attribs(&self, stream: usize) -> impl Iterator<Item = &VertexAttrib> {
        self.attribs.iter().filter(move |a| a.stream as usize == stream)
    }
}

impl Resource for VertexDecl {
    fn id(&self) -> ResourceId {
        self.id
    }

    fn label(&self) -> &str {
        &self.label
    }
}
