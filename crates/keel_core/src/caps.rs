//! Hardware capability bits and limits
//!
//! Queried once when a context is created and read-only afterwards.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Feature groups reported by the device.
    #[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct CapBits: u32 {
        /// Separate blend functions per render target / per channel
        const BLENDSEP = 1 << 2;
        /// Occlusion queries
        const OCCQUERY = 1 << 3;

        const TEXS3TC = 1 << 14;
        const TEXRGTC = 1 << 15;

        const DEPTHCLAMP = 1 << 19;

        /// ES 2.0 class hardware
        const API2 = 1 << 23;
        /// GL 3.2 class hardware
        const API3 = 1 << 25;
        /// GL 4.2 class hardware
        const API4 = 1 << 26;

        const API_ANY = Self::API2.bits() | Self::API3.bits() | Self::API4.bits();
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GpuVendor {
    #[default]
    Unknown,
    Nvidia,
    Ati,
    Intel,
}

impl GpuVendor {
    /// Map a PCI vendor id.
    pub fn from_pci_id(vendor: u32) -> Self {
        match vendor {
            0x10DE => GpuVendor::Nvidia,
            0x1002 | 0x1022 => GpuVendor::Ati,
            0x8086 => GpuVendor::Intel,
            _ => GpuVendor::Unknown,
        }
    }
}

/// Numeric hardware limits.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capabilities {
    pub texsize: u32,
    pub texsize3d: u32,
    pub texlayers: u32,
    /// Combined texture/sampler units
    pub texunits: u32,
    /// Read-write image units
    pub teximages: u32,
    pub texcoords: u32,
    pub texvtxunits: u32,
    pub texaniso: f32,
    pub pointsize: f32,
    pub drawbuffers: u32,
    pub viewports: u32,
    pub fbosamples: u32,
}

impl Default for Capabilities {
    fn default() -> Self {
        // GL 3.2 core minimums
        Self {
            texsize: 8192,
            texsize3d: 2048,
            texlayers: 2048,
            texunits: 16,
            teximages: 8,
            texcoords: 8,
            texvtxunits: 16,
            texaniso: 16.0,
            pointsize: 1.0,
            drawbuffers: 8,
            viewports: 16,
            fbosamples: 4,
        }
    }
}

/// Everything a context learns about its device at init.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceCaps {
    pub bits: CapBits,
    pub limits: Capabilities,
    pub vendor: GpuVendor,
}

impl DeviceCaps {
    pub fn new(bits: CapBits, limits: Capabilities) -> Self {
        Self {
            bits,
            limits,
            vendor: GpuVendor::Unknown,
        }
    }

    pub fn with_vendor(mut self, vendor: GpuVendor) -> Self {
        self.vendor = vendor;
        self
    }

    pub fn has(&self, bits: CapBits) -> bool {
        self.bits.contains(bits)
    }
}
