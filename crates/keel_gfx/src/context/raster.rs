//! Raster blocks and render flags

use super::Context;
use crate::driver::Driver;
use keel_core::handle::same;
use keel_core::resource::{BlendRef, ColorRef, DepthRef, LogicRef, RasterizerRef, RenderFlags, StencilRef};
use keel_core::Resource;

/// `apply_*`/`checked_*` pair for one raster block. Each pair touches only
/// its own slot.
macro_rules! raster_slot {
    ($apply:ident, $checked:ident, $field:ident, $set:ident, $ty:ty, $applied:literal, $skipped:literal) => {
        pub fn $apply(&mut self, obj: Option<&$ty>) {
            tracing::trace!(block = stringify!($field), id = ?obj.map(|o| o.id()), "set raster block");
            self.driver.$set(obj.map(|o| &**o));
            self.mirror.raster.$field = obj.cloned();
            self.note($applied);
        }

        pub fn $checked(&mut self, obj: Option<&$ty>) -> bool {
            if same(self.mirror.raster.$field.as_ref(), obj) {
                self.note($skipped);
                return false;
            }
            self.$apply(obj);
            true
        }
    };
}

impl<D: Driver> Context<D> {
    raster_slot!(apply_depth, checked_depth, depth, set_depth, DepthRef, "depth.applied", "depth.skipped");
    raster_slot!(apply_stencil, checked_stencil, stencil, set_stencil, StencilRef, "stencil.applied", "stencil.skipped");
    raster_slot!(apply_blend, checked_blend, blend, set_blend, BlendRef, "blend.applied", "blend.skipped");
    raster_slot!(apply_logic, checked_logic, logic, set_logic, LogicRef, "logic.applied", "logic.skipped");
    raster_slot!(apply_color, checked_color, color, set_color, ColorRef, "color.applied", "color.skipped");
    raster_slot!(
        apply_rasterizer,
        checked_rasterizer,
        rasterizer,
        set_rasterizer,
        RasterizerRef,
        "rasterizer.applied",
        "rasterizer.skipped"
    );

    /// Toggle the flags in `changed` to their values in `enabled`.
    pub fn apply_render_flags(&mut self, enabled: RenderFlags, changed: RenderFlags) {
        tracing::trace!(?enabled, ?changed, "set render flags");
        self.driver.set_render_flags(enabled, changed);
        let flags = &mut self.mirror.raster.flags;
        *flags = (*flags - changed) | (enabled & changed);
        self.note("flags.applied");
    }

    /// Toggle exactly the flags that differ from `needed`.
    pub fn checked_render_flag(&mut self, needed: RenderFlags) -> bool {
        let changed = needed ^ self.mirror.raster.flags;
        if changed.is_empty() {
            self.note("flags.skipped");
            return false;
        }
        self.apply_render_flags(needed, changed);
        true
    }

    /// Push every recorded raster block and flag again, e.g. after the
    /// driver state was lost or touched behind the context's back.
    pub fn sync_raster_states(&mut self) {
        tracing::debug!("sync raster states");
        let raster = self.mirror.raster.clone();
        self.driver.set_depth(raster.depth.as_deref());
        self.driver.set_stencil(raster.stencil.as_deref());
        self.driver.set_blend(raster.blend.as_deref());
        self.driver.set_logic(raster.logic.as_deref());
        self.driver.set_color(raster.color.as_deref());
        self.driver.set_rasterizer(raster.rasterizer.as_deref());
        self.driver.set_render_flags(raster.flags, RenderFlags::all());
    }

    /// Return every raster block to the API default and disable all flags.
    pub fn clear_raster_state(&mut self) {
        tracing::debug!("clear raster state");
        self.apply_depth(None);
        self.apply_stencil(None);
        self.apply_blend(None);
        self.apply_logic(None);
        self.apply_color(None);
        self.apply_rasterizer(None);
        self.apply_render_flags(RenderFlags::empty(), RenderFlags::all());
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::recording;
    use crate::driver::DriverCall;
    use keel_core::resource::{BlendDesc, BlendEquation, DepthDesc, RasterObject, RenderFlags};
    use keel_core::Resource;

    #[test]
    fn each_block_touches_only_its_slot() {
        let mut ctx = recording(8);
        let depth = RasterObject::new(DepthDesc::default());
        let blend = RasterObject::new(BlendDesc {
            color: BlendEquation::ALPHA,
            alpha: None,
        });

        assert!(ctx.checked_depth(Some(&depth)));
        assert!(ctx.checked_blend(Some(&blend)));
        assert!(!ctx.checked_depth(Some(&depth)));

        let raster = ctx.mirror().raster();
        assert_eq!(raster.depth().map(|d| d.id()), Some(depth.id()));
        assert_eq!(raster.blend().map(|b| b.id()), Some(blend.id()));
        assert!(raster.stencil().is_none());
        assert!(raster.rasterizer().is_none());
        assert_eq!(ctx.driver().len(), 2);
        assert!(ctx.check_states());
    }

    #[test]
    fn equal_descs_switch_by_identity() {
        let mut ctx = recording(8);
        let a = RasterObject::new(DepthDesc::default());
        let b = RasterObject::new(DepthDesc::default());
        ctx.checked_depth(Some(&a));
        assert!(ctx.checked_depth(Some(&b)));
        assert!(ctx.checked_depth(None));
        assert!(!ctx.checked_depth(None));
    }

    #[test]
    fn render_flag_diff() {
        let mut ctx = recording(8);
        ctx.checked_render_flag(RenderFlags::DEPTH_TEST | RenderFlags::CULL_FACE);
        ctx.driver_mut().clear();

        assert!(ctx.checked_render_flag(RenderFlags::DEPTH_TEST | RenderFlags::BLEND));
        assert_eq!(
            ctx.driver().calls(),
            &[DriverCall::SetRenderFlags {
                enabled: RenderFlags::DEPTH_TEST | RenderFlags::BLEND,
                changed: RenderFlags::CULL_FACE | RenderFlags::BLEND,
            }]
        );
        assert_eq!(
            ctx.mirror().raster().flags(),
            RenderFlags::DEPTH_TEST | RenderFlags::BLEND
        );
        assert!(!ctx.checked_render_flag(RenderFlags::DEPTH_TEST | RenderFlags::BLEND));
        assert!(ctx.check_states());
    }

    #[test]
    fn sync_repushes_without_touching_the_mirror() {
        let mut ctx = recording(8);
        let depth = RasterObject::new(DepthDesc::default());
        ctx.apply_depth(Some(&depth));
        ctx.driver_mut().clear();

        ctx.sync_raster_states();
        assert_eq!(ctx.driver().len(), 7);
        assert_eq!(ctx.driver().calls()[0], DriverCall::SetDepth(Some(depth.id())));
        assert_eq!(ctx.mirror().raster().depth().map(|d| d.id()), Some(depth.id()));
    }

    #[test]
    fn clear_restores_defaults() {
        let mut ctx = recording(8);
        ctx.apply_depth(Some(&RasterObject::new(DepthDesc::default())));
        ctx.checked_render_flag(RenderFlags::STENCIL_TEST);
        ctx.clear_raster_state();
        assert!(ctx.mirror().raster().depth().is_none());
        assert!(ctx.mirror().raster().flags().is_empty());
        assert!(ctx.check_states());
    }
}
