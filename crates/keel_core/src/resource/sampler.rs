//! Sampler objects
//!
//! A sampler's parameters can change in place. Every change bumps its
//! incarnation so textures that cached an association with the sampler can
//! tell the association is stale.

use crate::handle::{Incarnation, Resource, ResourceId};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};

pub type SamplerRef = Arc<Sampler>;

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Filter {
    Nearest,
    #[default]
    Linear,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressMode {
    #[default]
    Repeat,
    MirroredRepeat,
    ClampToEdge,
    ClampToBorder,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareFunc {
    Never,
    Less,
    Equal,
    #[default]
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    Always,
}

bitflags! {
    /// Groups of sampler parameters, used when copying sampler state onto a texture.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct SamplerAttribs: u32 {
        const FILTER = 1 << 0;
        const ADDRESS = 1 << 1;
        const ANISO = 1 << 2;
        const LOD = 1 << 3;
        const COMPARE = 1 << 4;
        const ALL = Self::FILTER.bits()
            | Self::ADDRESS.bits()
            | Self::ANISO.bits()
            | Self::LOD.bits()
            | Self::COMPARE.bits();
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerDesc {
    pub min_filter: Filter,
    pub mag_filter: Filter,
    pub mip_filter: Option<Filter>,
    pub address: [AddressMode; 3],
    pub aniso: f32,
    pub lod_bias: f32,
    pub lod_range: [f32; 2],
    pub compare: Option<CompareFunc>,
}

impl Default for SamplerDesc {
    fn default() -> Self {
        Self {
            min_filter: Filter::Linear,
            mag_filter: Filter::Linear,
            mip_filter: Some(Filter::Linear),
            address: [AddressMode::Repeat; 3],
            aniso: 1.0,
            lod_bias: 0.0,
            lod_range: [-1000.0, 1000.0],
            compare: None,
        }
    }
}

#[derive(Debug)]
pub struct Sampler {
    id: ResourceId,
    label: String,
    incarnation: Incarnation,
    desc: Mutex<SamplerDesc>,
}

impl Sampler {
    pub fn new(label: impl Into<String>, desc: SamplerDesc) -> SamplerRef {
        Arc::new(Self {
            id: ResourceId::next(),
            label: label.into(),
            incarnation: Incarnation::new(),
            desc: Mutex::new(desc),
        })
    }

    pub fn incarnation(&self) -> u32 {
        self.incarnation.get()
    }

    pub fn desc(&self) -> SamplerDesc {
        *self.desc.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Respecify parameters in place. Identity is kept, incarnation advances.
    pub fn update(&self, f: impl FnOnce(&mut SamplerDesc)) -> u32 {
        let mut desc = self.desc.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut desc);
        self.incarnation.bump()
    }
}

impl Resource for Sampler {
    fn id(&self) -> ResourceId {
        self.id
    }

    fn label(&self) -> &str {
        &self.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_keeps_identity_and_bumps_incarnation() {
        let sampler = Sampler::new("linear", SamplerDesc::default());
        let id = sampler.id();
        assert_eq!(sampler.incarnation(), 0);

        sampler.update(|d| d.min_filter = Filter::Nearest);

        assert_eq!(sampler.id(), id);
        assert_eq!(sampler.incarnation(), 1);
        assert_eq!(sampler.desc().min_filter, Filter::Nearest);
    }

    #[test]
    fn partial_desc_deserializes_with_defaults() {
        let desc: SamplerDesc = serde_json::from_str(r#"{ "aniso": 8.0 }"#).unwrap();
        assert_eq!(desc.aniso, 8.0);
        assert_eq!(desc.address, [AddressMode::Repeat; 3]);
    }
}
