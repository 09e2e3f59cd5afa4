//! Textures and texture images

use super::sampler::Sampler;
use crate::handle::{Resource, ResourceId};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

pub type TextureRef = Arc<Texture>;
pub type TextureImageRef = Arc<TextureImage>;

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureKind {
    D1,
    #[default]
    D2,
    D3,
    Cube,
    D1Array,
    D2Array,
    CubeArray,
    D2Multisample,
    Rect,
    Buffer,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureDesc {
    pub kind: TextureKind,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub mip_levels: u32,
}

impl Default for TextureDesc {
    fn default() -> Self {
        Self {
            kind: TextureKind::D2,
            width: 1,
            height: 1,
            depth: 1,
            mip_levels: 1,
        }
    }
}

/// A bindable texture.
///
/// Carries a hint of the sampler whose parameters were last copied onto it
/// (identity plus that sampler's incarnation at the time). Contexts write
/// this hint back; it is atomic because textures are shared between contexts.
#[derive(Debug)]
pub struct Texture {
    id: ResourceId,
    label: String,
    desc: TextureDesc,
    last_sampler: AtomicU32,
    last_sampler_incarnation: AtomicU32,
}

impl Texture {
    pub fn new(label: impl Into<String>, desc: TextureDesc) -> TextureRef {
        Arc::new(Self {
            id: ResourceId::next(),
            label: label.into(),
            desc,
            last_sampler: AtomicU32::new(0),
            last_sampler_incarnation: AtomicU32::new(0),
        })
    }

    pub fn desc(&self) -> &TextureDesc {
        &self.desc
    }

    pub fn last_sampler(&self) -> Option<ResourceId> {
        ResourceId::from_bits(self.last_sampler.load(Ordering::Acquire))
    }

    pub fn last_sampler_incarnation(&self) -> u32 {
        self.last_sampler_incarnation.load(Ordering::Acquire)
    }

    /// True if the recorded association matches `sampler` (identity and incarnation).
    pub fn sampler_matches(&self, sampler: Option<&Sampler>) -> bool {
        let (id, incarnation) = match sampler {
            Some(s) => (Some(s.id()), s.incarnation()),
            None => (None, 0),
        };
        self.last_sampler() == id && self.last_sampler_incarnation() == incarnation
    }

    /// Record which sampler state the texture now carries.
    pub fn record_sampler(&self, sampler: Option<&Sampler>) {
        let (bits, incarnation) = match sampler {
            Some(s) => (s.id().get(), s.incarnation()),
            None => (0, 0),
        };
        self.last_sampler_incarnation.store(incarnation, Ordering::Release);
        self.last_sampler.store(bits, Ordering::Release);
    }
}

impl Resource for Texture {
    fn id(&self) -> ResourceId {
        self.id
    }

    fn label(&self) -> &str {
        &self.label
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageAccess {
    Read,
    Write,
    #[default]
    ReadWrite,
}

/// A single level/layer view of a texture bound for load/store access.
#[derive(Debug)]
pub struct TextureImage {
    id: ResourceId,
    texture: TextureRef,
    level: u32,
    layer: Option<u32>,
    access: ImageAccess,
}

impl TextureImage {
    pub fn new(texture: TextureRef, level: u32, layer: Option<u32>, access: ImageAccess) -> TextureImageRef {
        Arc::new(Self {
            id: ResourceId::next(),
            texture,
            level,
            layer,
            access,
        })
    }

    pub fn texture(&self) -> &TextureRef {
        &self.texture
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn layer(&self) -> Option<u32> {
        self.layer
    }

    pub fn access(&self) -> ImageAccess {
        self.access
    }
}

impl Resource for TextureImage {
    fn id(&self) -> ResourceId {
        self.id
    }

    fn label(&self) -> &str {
        self.texture.label()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::sampler::SamplerDesc;

    #[test]
    fn sampler_hint_tracks_identity_and_incarnation() {
        let tex = Texture::new("albedo", TextureDesc::default());
        let sampler = Sampler::new("s", SamplerDesc::default());

        assert!(tex.sampler_matches(None));
        assert!(!tex.sampler_matches(Some(&*sampler)));

        tex.record_sampler(Some(&*sampler));
        assert!(tex.sampler_matches(Some(&*sampler)));

        sampler.update(|d| d.aniso = 4.0);
        assert!(!tex.sampler_matches(Some(&*sampler)));
        assert_eq!(tex.last_sampler(), Some(sampler.id()));
    }

    #[test]
    fn images_have_their_own_identity() {
        let tex = Texture::new("target", TextureDesc::default());
        let a = TextureImage::new(tex.clone(), 0, None, ImageAccess::ReadWrite);
        let b = TextureImage::new(tex, 0, None, ImageAccess::ReadWrite);
        assert_ne!(a.id(), b.id());
        assert_eq!(a.texture().id(), b.texture().id());
    }
}
