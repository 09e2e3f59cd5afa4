//! State-caching context
//!
//! A [`Context`] owns a [`Driver`] and a [`Mirror`] of what that driver has
//! been told. Every group of state has two entry points:
//!
//! - `apply_*` always issues the driver call and records the result
//! - `checked_*` compares against the mirror (by identity) and only forwards
//!   to `apply_*` on a mismatch, returning whether it did
//!
//! Composite appliers (vertex state, program parameters, texture ranges)
//! resolve several dirty bits at once in a fixed order.

mod program;
mod raster;
mod target;
mod texture;
mod vertex;
mod viewport;

use crate::config::{ContextConfig, VertexPath};
use crate::driver::{Driver, DriverSnapshot};
use crate::error::InitError;
use crate::mirror::Mirror;
use keel_core::handle::id_of;
use keel_core::resource::RenderTargetType;
use keel_core::{CapBits, Capabilities, ResourceId};
use keel_metrics::Counter;

pub struct Context<D: Driver> {
    driver: D,
    mirror: Mirror,
    stats: Counter,
    config: ContextConfig,
}

impl<D: Driver> Context<D> {
    /// Query the driver's capabilities and start from an all-unbound mirror.
    pub fn new(driver: D, config: ContextConfig) -> Result<Self, InitError> {
        let caps = driver.capabilities();
        if !caps.bits.intersects(CapBits::API_ANY) {
            return Err(InitError::NoApiTier { bits: caps.bits.bits() });
        }

        let available = caps.limits.texunits;
        if available == 0 {
            return Err(InitError::NoTextureUnits);
        }
        let units = match config.max_texture_units {
            Some(0) => return Err(InitError::NoTextureUnits),
            Some(requested) if requested > available => {
                return Err(InitError::TextureUnitCap { requested, available });
            }
            Some(requested) => requested,
            None => available,
        };

        if config.vertex_path == VertexPath::Bindless && !caps.has(CapBits::API4) {
            return Err(InitError::BindlessUnsupported);
        }

        tracing::debug!(
            bits = ?caps.bits,
            vendor = ?caps.vendor,
            texture_units = units,
            image_units = caps.limits.teximages,
            viewports = caps.limits.viewports,
            "context capabilities"
        );

        let mirror = Mirror::new(&caps, units as usize, config.window);
        Ok(Self {
            driver,
            mirror,
            stats: Counter::new(),
            config,
        })
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Direct driver access. Calls made here bypass the mirror; follow them
    /// with the matching `clear_*`/`invalidate_*` or `sync_raster_states`.
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn into_driver(self) -> D {
        self.driver
    }

    pub fn mirror(&self) -> &Mirror {
        &self.mirror
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    pub fn capbits(&self) -> CapBits {
        self.mirror.capbits
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.mirror.capabilities
    }

    /// Applied/skipped transition counters (`"<group>.applied"`, `"<group>.skipped"`).
    pub fn stats(&self) -> &Counter {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats.reset_all();
    }

    #[inline]
    fn note(&mut self, name: &'static str) {
        self.stats.increment(name, 1);
    }

    /// Compare the mirror with the bindings the driver reports.
    ///
    /// Returns true when they agree, or when the driver cannot report its
    /// state. Every mismatch is logged.
    pub fn check_states(&self) -> bool {
        let Some(snap) = self.driver.snapshot() else {
            return true;
        };
        let m = &self.mirror;
        let mut ok = true;

        for (i, slot) in m.textures.iter().enumerate() {
            ok &= agree("texture", i, id_of(slot.as_ref()), DriverSnapshot::slot(&snap.textures, i));
        }
        for (i, slot) in m.samplers.iter().enumerate() {
            ok &= agree("sampler", i, id_of(slot.as_ref()), DriverSnapshot::slot(&snap.samplers, i));
        }
        for (i, slot) in m.images.iter().enumerate() {
            ok &= agree("image", i, id_of(slot.as_ref()), DriverSnapshot::slot(&snap.images, i));
        }
        for ty in [RenderTargetType::Draw, RenderTargetType::Read] {
            ok &= agree(
                "render_target",
                ty.index(),
                id_of(m.render_targets[ty.index()].as_ref()),
                snap.render_targets[ty.index()],
            );
        }
        ok &= agree("program", 0, id_of(m.program.current.as_ref()), snap.program);

        let raster = [
            id_of(m.raster.depth.as_ref()),
            id_of(m.raster.stencil.as_ref()),
            id_of(m.raster.blend.as_ref()),
            id_of(m.raster.logic.as_ref()),
            id_of(m.raster.color.as_ref()),
            id_of(m.raster.rasterizer.as_ref()),
        ];
        for (i, (mine, theirs)) in raster.iter().zip(snap.raster).enumerate() {
            ok &= agree("raster", i, *mine, theirs);
        }

        if m.raster.flags != snap.render_flags {
            tracing::warn!(mirror = ?m.raster.flags, driver = ?snap.render_flags, "render flags out of sync");
            ok = false;
        }
        if m.vertex.active != snap.vertex_attribs {
            tracing::warn!(mirror = m.vertex.active, driver = snap.vertex_attribs, "vertex attribs out of sync");
            ok = false;
        }
        if let Some(viewport) = snap.viewport {
            if viewport != m.viewport.bounds {
                tracing::warn!(mirror = ?m.viewport.bounds, driver = ?viewport, "viewport out of sync");
                ok = false;
            }
        }
        if m.scissor != snap.scissor_enabled {
            tracing::warn!(mirror = m.scissor, driver = snap.scissor_enabled, "scissor state out of sync");
            ok = false;
        }
        ok
    }
}

fn agree(what: &str, index: usize, mirror: Option<ResourceId>, driver: Option<ResourceId>) -> bool {
    if mirror != driver {
        tracing::warn!(what, index, ?mirror, ?driver, "mirror out of sync with driver");
        return false;
    }
    true
}

impl<D: Driver> std::fmt::Debug for Context<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("mirror", &self.mirror)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::driver::{NullDriver, RecordingDriver};
    use keel_core::{Capabilities, DeviceCaps};

    pub(crate) fn caps_with_units(units: u32) -> DeviceCaps {
        DeviceCaps::new(
            CapBits::API4 | CapBits::API3 | CapBits::BLENDSEP,
            Capabilities {
                texunits: units,
                ..Capabilities::default()
            },
        )
    }

    pub(crate) fn recording(units: u32) -> Context<RecordingDriver> {
        Context::new(RecordingDriver::new(caps_with_units(units)), ContextConfig::default())
            .expect("valid caps")
    }

    #[test]
    fn init_sizes_slots_from_limits() {
        let ctx = recording(16);
        assert_eq!(ctx.mirror().textures().len(), 16);
        assert_eq!(ctx.mirror().samplers().len(), 16);
        assert_eq!(ctx.mirror().images().len(), 8);
        assert!(ctx.driver().is_empty());
    }

    #[test]
    fn init_honors_unit_cap() {
        let config = ContextConfig {
            max_texture_units: Some(4),
            ..ContextConfig::default()
        };
        let ctx = Context::new(RecordingDriver::new(caps_with_units(16)), config).unwrap();
        assert_eq!(ctx.mirror().textures().len(), 4);
    }

    #[test]
    fn init_rejects_bad_devices() {
        let no_tier = DeviceCaps::new(CapBits::BLENDSEP, Capabilities::default());
        assert_eq!(
            Context::new(NullDriver::new(no_tier), ContextConfig::default()).unwrap_err(),
            InitError::NoApiTier { bits: CapBits::BLENDSEP.bits() }
        );

        assert_eq!(
            Context::new(NullDriver::new(caps_with_units(0)), ContextConfig::default()).unwrap_err(),
            InitError::NoTextureUnits
        );

        let greedy = ContextConfig {
            max_texture_units: Some(64),
            ..ContextConfig::default()
        };
        assert_eq!(
            Context::new(NullDriver::new(caps_with_units(16)), greedy).unwrap_err(),
            InitError::TextureUnitCap { requested: 64, available: 16 }
        );

        let bindless = ContextConfig {
            vertex_path: VertexPath::Bindless,
            ..ContextConfig::default()
        };
        assert_eq!(
            Context::new(NullDriver::default(), bindless).unwrap_err(),
            InitError::BindlessUnsupported
        );
    }

    #[test]
    fn fresh_context_agrees_with_driver() {
        let ctx = recording(8);
        assert!(ctx.check_states());
    }

    #[test]
    fn bypassing_the_mirror_is_detected() {
        let mut ctx = recording(8);
        let tex = keel_core::resource::Texture::new("t", Default::default());
        ctx.driver_mut().bind_texture(2, Some(&tex));
        assert!(!ctx.check_states());
    }

    #[test]
    fn drivers_without_snapshot_always_agree() {
        let ctx = Context::new(NullDriver::default(), ContextConfig::default()).unwrap();
        assert!(ctx.check_states());
    }
}
