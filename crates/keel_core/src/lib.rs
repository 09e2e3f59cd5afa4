//! Keel Core
//!
//! Shared vocabulary of the state-caching layer:
//! - Resource identity and incarnation counters
//! - Bindable resource objects (textures, samplers, buffers, programs, ...)
//! - Device capability bits and limits
//! - Integer rectangle math

pub mod caps;
pub mod handle;
pub mod math;
pub mod resource;

pub use glam;

pub use caps::{CapBits, Capabilities, DeviceCaps, GpuVendor};
pub use handle::{Incarnation, Resource, ResourceId};
pub use math::{FrameBounds, Rect};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
