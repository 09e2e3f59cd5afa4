//! Render target bindings and blits

use super::Context;
use crate::driver::Driver;
use keel_core::handle::same;
use keel_core::resource::{BlitFilter, BlitMask, RenderTargetBlit, RenderTargetRef, RenderTargetType};
use keel_core::Resource;

impl<D: Driver> Context<D> {
    /// Bind `target` (`None` = default framebuffer) to the `ty` binding point.
    ///
    /// Frame bounds are left alone; use [`Context::apply_render_target_draw`]
    /// to switch the draw target together with its extent.
    pub fn apply_render_target(&mut self, target: Option<&RenderTargetRef>, ty: RenderTargetType) {
        tracing::trace!(?ty, target = ?target.map(|t| t.label()), "bind render target");
        self.driver.bind_render_target(ty, target.map(|t| &**t));
        self.mirror.render_targets[ty.index()] = target.cloned();
        self.note("rendertarget.applied");
    }

    pub fn checked_render_target(&mut self, target: Option<&RenderTargetRef>, ty: RenderTargetType) -> bool {
        if same(self.mirror.render_targets[ty.index()].as_ref(), target) {
            self.note("rendertarget.skipped");
            return false;
        }
        self.apply_render_target(target, ty);
        true
    }

    /// Bind the draw target and take over its extent as the frame bounds.
    ///
    /// With `set_viewport` the viewport is reset to the full new extent;
    /// otherwise the current viewport is kept and the scissor re-derived.
    pub fn apply_render_target_draw(&mut self, target: Option<&RenderTargetRef>, set_viewport: bool) {
        self.apply_render_target(target, RenderTargetType::Draw);
        self.mirror.framebounds = target.map_or(self.mirror.window, |t| t.bounds());
        if set_viewport {
            self.apply_viewport_rect(None);
        } else {
            self.resolve_scissor();
        }
    }

    /// Copy `blit.from` of `from` into `blit.to` of `to`.
    ///
    /// Render target bindings, recorded or actual, are left untouched.
    pub fn blit_render_targets(
        &mut self,
        to: Option<&RenderTargetRef>,
        from: Option<&RenderTargetRef>,
        blit: &RenderTargetBlit,
        mask: BlitMask,
        filter: BlitFilter,
    ) {
        debug_assert!(!mask.is_empty(), "blit without buffers");
        debug_assert!(
            filter == BlitFilter::Nearest || mask == BlitMask::COLOR,
            "linear filtering only applies to color blits"
        );
        tracing::trace!(
            to = ?to.map(|t| t.label()),
            from = ?from.map(|t| t.label()),
            ?mask,
            ?filter,
            "blit"
        );
        self.driver
            .blit(to.map(|t| &**t), from.map(|t| &**t), blit, mask, filter);
        self.note("blit.applied");
    }
}
