//! Viewport and scissor
//!
//! The scissor test is derived: it is on whenever the viewport does not
//! cover the whole frame (so nothing outside the viewport is touched) or the
//! caller forced it. Every viewport entry point returns the resolved state.

use super::Context;
use crate::driver::Driver;
use crate::state::{ViewPort, ViewPortMrt, MAX_VIEWPORTS};
use keel_core::resource::RenderTargetType;
use keel_core::{FrameBounds, Rect};

impl<D: Driver> Context<D> {
    /// Set the viewport rectangle; `None` covers the whole frame.
    pub fn apply_viewport_rect(&mut self, rect: Option<&Rect>) -> bool {
        let bounds = rect.copied().unwrap_or_else(|| self.mirror.framebounds.full_rect());
        tracing::trace!(?bounds, "set viewport");
        self.driver.set_viewport(&bounds);
        self.mirror.viewport.bounds = bounds;
        self.note("viewport.applied");
        self.resolve_scissor()
    }

    /// Force (or stop forcing) the scissor test.
    pub fn apply_viewport_scissor_state(&mut self, state: bool) -> bool {
        self.mirror.viewport.scissor = state;
        self.resolve_scissor()
    }

    pub fn apply_viewport(&mut self, viewport: &ViewPort) -> bool {
        tracing::trace!(bounds = ?viewport.bounds, scissor = viewport.scissor, "set viewport");
        self.driver.set_viewport(&viewport.bounds);
        self.mirror.viewport = *viewport;
        self.note("viewport.applied");
        self.resolve_scissor()
    }

    /// Scissor to `rect`, or stop forcing the scissor test with `None`.
    /// The enable state is only touched when it changes.
    pub fn checked_viewport_scissor(&mut self, rect: Option<&Rect>) -> bool {
        if let Some(rect) = rect {
            self.mirror.viewport.scissor_rect = *rect;
            if self.mirror.scissor_rect != *rect {
                tracing::trace!(?rect, "set scissor");
                self.driver.set_scissor(rect);
                self.mirror.scissor_rect = *rect;
            }
        }
        let forced = rect.is_some();
        if forced != self.mirror.viewport.scissor {
            return self.apply_viewport_scissor_state(forced);
        }
        self.mirror.scissor
    }

    /// Per draw buffer viewports (and scissors when `mrt.scissor` is set).
    /// The scissor enable is derived from viewport 0 like the single case.
    pub fn apply_viewport_mrt(&mut self, mrt: &ViewPortMrt) -> bool {
        let limit = MAX_VIEWPORTS.min(self.mirror.capabilities.viewports as usize);
        debug_assert!(
            (1..=limit).contains(&mrt.num),
            "{} viewports, device supports {limit}",
            mrt.num
        );
        tracing::trace!(num = mrt.num, scissor = mrt.scissor, "set viewports");
        self.driver.set_viewports(0, &mrt.bounds[..mrt.num]);
        if mrt.scissor {
            self.driver.set_scissors(0, &mrt.scissors[..mrt.num]);
            self.mirror.scissor_rect = mrt.scissors[0];
        }
        self.mirror.viewport = ViewPort {
            scissor: mrt.scissor,
            bounds: mrt.bounds[0],
            scissor_rect: mrt.scissors[0],
        };
        self.mirror.viewport_mrt = *mrt;
        self.note("viewport.applied");
        self.resolve_scissor()
    }

    /// Record a new window extent. Takes effect immediately while the default
    /// framebuffer is the draw target.
    pub fn set_window(&mut self, window: FrameBounds) -> bool {
        self.mirror.window = window;
        if self.mirror.render_targets[RenderTargetType::Draw.index()].is_none() {
            self.mirror.framebounds = window;
        }
        self.resolve_scissor()
    }

    /// Bring the driver's scissor rectangle and enable state in line with the
    /// recorded viewport and frame bounds.
    pub(crate) fn resolve_scissor(&mut self) -> bool {
        let viewport = self.mirror.viewport;
        let clip = !self.mirror.framebounds.is_full(&viewport.bounds);
        let want = viewport.scissor || clip;

        if want {
            let rect = if viewport.scissor { viewport.scissor_rect } else { viewport.bounds };
            if rect != self.mirror.scissor_rect {
                tracing::trace!(?rect, "set scissor");
                self.driver.set_scissor(&rect);
                self.mirror.scissor_rect = rect;
            }
        }
        if want != self.mirror.scissor {
            tracing::trace!(enabled = want, "toggle scissor");
            self.driver.set_scissor_enabled(want);
            self.mirror.scissor = want;
        }
        want
    }
}
