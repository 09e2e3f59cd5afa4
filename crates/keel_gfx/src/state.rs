//! Mirrored sub-states
//!
//! Each group keeps the last applied resources plus the dirty/valid/change
//! bits that let the checked layer decide whether a transition is needed.
//! Transitions on the bits are plain methods so they can be tested without a
//! driver.

use keel_core::handle::same;
use keel_core::resource::{
    BlendRef, BufferRef, ColorRef, DepthRef, LogicRef, ProgramRef, RasterizerRef, RenderFlags,
    ShaderStage, StencilRef, StreamHost, VertexDeclRef, MAX_VERTEX_STREAMS,
};
use keel_core::Rect;

/// Feedback (stream output) binding points
pub const MAX_FEEDBACK_STREAMS: usize = 4;
/// Uniform buffer binding points tracked per context
pub const MAX_UNIFORM_BUFFERS: usize = 12;
/// Per draw buffer viewports
pub const MAX_VIEWPORTS: usize = 16;

const ALL_STREAMS: u32 = (1 << MAX_VERTEX_STREAMS) - 1;

/// Iterate the set bit indices of `mask`, lowest first.
pub(crate) fn bits(mut mask: u32) -> impl Iterator<Item = usize> {
    std::iter::from_fn(move || {
        if mask == 0 {
            return None;
        }
        let i = mask.trailing_zeros() as usize;
        mask &= mask - 1;
        Some(i)
    })
}

/// Vertex declaration, enabled attributes and stream hosts.
///
/// Bit `i` of every mask refers to vertex stream `i`, except `active` which is
/// indexed by attribute location.
#[derive(Debug, Clone, Default)]
pub struct VertexState {
    pub(crate) decl: Option<VertexDeclRef>,
    /// Enabled attribute locations
    pub(crate) active: u32,
    /// Streams the current declaration reads from
    pub(crate) decl_valid: u32,
    /// Streams whose layout must be (re)specified
    pub(crate) decl_change: u32,
    /// Streams whose driver binding matches `streams`
    pub(crate) stream_valid: u32,
    /// Streams whose host changed since the last apply
    pub(crate) stream_change: u32,
    pub(crate) streams: [StreamHost; MAX_VERTEX_STREAMS],
    /// Buffer incarnation each stream had when it was last bound
    pub(crate) bound_incarnation: [u32; MAX_VERTEX_STREAMS],
}

impl VertexState {
    pub fn decl(&self) -> Option<&VertexDeclRef> {
        self.decl.as_ref()
    }

    pub fn active(&self) -> u32 {
        self.active
    }

    pub fn decl_valid(&self) -> u32 {
        self.decl_valid
    }

    pub fn decl_change(&self) -> u32 {
        self.decl_change
    }

    pub fn stream_valid(&self) -> u32 {
        self.stream_valid
    }

    pub fn stream_change(&self) -> u32 {
        self.stream_change
    }

    pub fn stream(&self, idx: usize) -> &StreamHost {
        &self.streams[idx]
    }

    /// Record `decl`. Returns true if it differs from the current declaration.
    pub fn set_decl(&mut self, decl: Option<&VertexDeclRef>) -> bool {
        if same(self.decl.as_ref(), decl) {
            return false;
        }
        self.decl = decl.cloned();
        self.decl_valid = decl.map_or(0, |d| d.stream_mask());
        self.decl_change = ALL_STREAMS;
        true
    }

    /// Record the host of stream `idx`. Returns true if a rebind got scheduled.
    ///
    /// A stream that is not known to be bound is scheduled even when the host
    /// is unchanged, as long as the current declaration reads from it. So is
    /// a bound stream whose buffer was reallocated since the bind.
    pub fn set_stream(&mut self, idx: usize, host: &StreamHost) -> bool {
        debug_assert!(idx < MAX_VERTEX_STREAMS, "vertex stream {idx} out of range");
        let bit = 1u32 << idx;
        if self.streams[idx] != *host {
            self.streams[idx] = host.clone();
            self.stream_valid &= !bit;
            self.stream_change |= bit;
            true
        } else if self.stream_valid & bit == 0 && self.decl_valid & bit != 0 {
            self.stream_change |= bit;
            true
        } else if self.stale_streams() & bit != 0 {
            self.stream_valid &= !bit;
            self.stream_change |= bit;
            true
        } else {
            false
        }
    }

    /// Forget which streams the driver has bound. Hosts are kept, and every
    /// stream the declaration reads from is rebound by the next flush.
    pub fn invalidate_streams(&mut self) {
        self.stream_valid = 0;
        self.stream_change = 0;
    }

    /// Bound streams whose buffer has been reallocated since.
    pub fn stale_streams(&self) -> u32 {
        bits(self.stream_valid & self.decl_valid)
            .filter(|&i| self.streams[i].incarnation() != self.bound_incarnation[i])
            .fold(0u32, |mask, i| mask | 1u32 << i)
    }

    /// True if `checked_vertex` has work to do.
    pub fn pending(&self) -> bool {
        self.layout_pending() || self.streams_to_bind() != 0
    }

    pub(crate) fn layout_pending(&self) -> bool {
        (self.decl_change & self.decl_valid) != 0
    }

    /// Streams the next apply has to bind.
    pub(crate) fn streams_to_bind(&self) -> u32 {
        (self.decl_valid & (self.stream_change | !self.stream_valid)) | self.stale_streams()
    }

    /// Attribute mask change needed to reach `needed`.
    pub fn attrib_diff(&self, needed: u32) -> u32 {
        needed ^ self.active
    }

    pub(crate) fn commit_attribs(&mut self, attribs: u32, changed: u32) {
        self.active = (self.active & !changed) | (attribs & changed);
    }

    pub(crate) fn commit(&mut self, bound: u32, layout_applied: bool) {
        for i in bits(bound) {
            self.bound_incarnation[i] = self.streams[i].incarnation();
        }
        self.stream_valid |= bound;
        self.stream_change = 0;
        if layout_applied {
            self.decl_change = 0;
        }
    }
}

/// Transform feedback stream hosts.
#[derive(Debug, Clone, Default)]
pub struct FeedbackState {
    pub(crate) streams: [StreamHost; MAX_FEEDBACK_STREAMS],
    /// Streams with a buffer bound
    pub(crate) active: u32,
}

impl FeedbackState {
    pub fn stream(&self, idx: usize) -> &StreamHost {
        &self.streams[idx]
    }

    pub fn active(&self) -> u32 {
        self.active
    }

    pub(crate) fn record(&mut self, idx: usize, host: &StreamHost) {
        let bit = 1u32 << idx;
        self.streams[idx] = host.clone();
        if host.is_bound() {
            self.active |= bit;
        } else {
            self.active &= !bit;
        }
    }
}

/// Current program, uniform buffer slots and subroutine selections.
#[derive(Debug, Clone, Default)]
pub struct ProgramState {
    pub(crate) current: Option<ProgramRef>,
    pub(crate) uniform: [Option<BufferRef>; MAX_UNIFORM_BUFFERS],
    pub(crate) dirty_subroutines: bool,
    /// Stages whose selections must be uploaded
    pub(crate) dirty_stages: u32,
    pub(crate) subroutines: [Vec<u32>; ShaderStage::COUNT],
}

impl ProgramState {
    pub fn current(&self) -> Option<&ProgramRef> {
        self.current.as_ref()
    }

    pub fn uniform_buffer(&self, idx: usize) -> Option<&BufferRef> {
        self.uniform[idx].as_ref()
    }

    pub fn dirty_subroutines(&self) -> bool {
        self.dirty_subroutines
    }

    pub fn subroutines(&self, stage: ShaderStage) -> &[u32] {
        &self.subroutines[stage.index()]
    }

    /// Overwrite uniform buffer slot `idx`. Returns true if the identity changed.
    pub fn set_uniform_buffer(&mut self, idx: usize, buffer: Option<&BufferRef>) -> bool {
        debug_assert!(idx < MAX_UNIFORM_BUFFERS, "uniform buffer slot {idx} out of range");
        let changed = !same(self.uniform[idx].as_ref(), buffer);
        self.uniform[idx] = buffer.cloned();
        changed
    }

    /// Select subroutine `value` for uniform `index` of `stage`.
    pub fn set_subroutine(&mut self, stage: ShaderStage, index: usize, value: u32) -> bool {
        let selections = &mut self.subroutines[stage.index()];
        debug_assert!(
            index < selections.len(),
            "subroutine uniform {index} out of range for {stage:?}"
        );
        if selections[index] == value {
            return false;
        }
        selections[index] = value;
        self.dirty_stages |= 1 << stage.index();
        self.dirty_subroutines = true;
        true
    }

    /// Reset selections for a newly activated program. The driver forgets
    /// subroutine state on program switches, so every stage that has
    /// subroutine uniforms becomes dirty.
    pub(crate) fn switch_program(&mut self, program: Option<&ProgramRef>) {
        self.current = program.cloned();
        self.dirty_stages = 0;
        for stage in ShaderStage::ALL {
            let count = program.map_or(0, |p| p.subroutine_count(stage)) as usize;
            self.subroutines[stage.index()] = vec![0; count];
            if count > 0 {
                self.dirty_stages |= 1 << stage.index();
            }
        }
        self.dirty_subroutines = self.dirty_stages != 0;
    }

    pub(crate) fn take_dirty_stages(&mut self) -> u32 {
        self.dirty_subroutines = false;
        std::mem::take(&mut self.dirty_stages)
    }
}

/// Immutable raster blocks plus fixed-function enables.
#[derive(Debug, Clone, Default)]
pub struct RasterState {
    pub(crate) depth: Option<DepthRef>,
    pub(crate) stencil: Option<StencilRef>,
    pub(crate) blend: Option<BlendRef>,
    pub(crate) logic: Option<LogicRef>,
    pub(crate) color: Option<ColorRef>,
    pub(crate) rasterizer: Option<RasterizerRef>,
    pub(crate) flags: RenderFlags,
}

impl RasterState {
    pub fn depth(&self) -> Option<&DepthRef> {
        self.depth.as_ref()
    }

    pub fn stencil(&self) -> Option<&StencilRef> {
        self.stencil.as_ref()
    }

    pub fn blend(&self) -> Option<&BlendRef> {
        self.blend.as_ref()
    }

    pub fn logic(&self) -> Option<&LogicRef> {
        self.logic.as_ref()
    }

    pub fn color(&self) -> Option<&ColorRef> {
        self.color.as_ref()
    }

    pub fn rasterizer(&self) -> Option<&RasterizerRef> {
        self.rasterizer.as_ref()
    }

    pub fn flags(&self) -> RenderFlags {
        self.flags
    }
}

/// Viewport rectangle with an optional caller-forced scissor.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct ViewPort {
    /// Scissor test requested regardless of the viewport extent
    pub scissor: bool,
    pub bounds: Rect,
    /// Used only while `scissor` is set
    pub scissor_rect: Rect,
}

impl ViewPort {
    pub fn new(bounds: Rect) -> Self {
        Self {
            scissor: false,
            bounds,
            scissor_rect: bounds,
        }
    }

    pub fn with_scissor(bounds: Rect, scissor_rect: Rect) -> Self {
        Self {
            scissor: true,
            bounds,
            scissor_rect,
        }
    }
}

/// Per draw buffer viewports and scissors.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ViewPortMrt {
    pub num: usize,
    pub scissor: bool,
    pub bounds: [Rect; MAX_VIEWPORTS],
    pub scissors: [Rect; MAX_VIEWPORTS],
}

impl Default for ViewPortMrt {
    fn default() -> Self {
        Self {
            num: 0,
            scissor: false,
            bounds: [Rect::default(); MAX_VIEWPORTS],
            scissors: [Rect::default(); MAX_VIEWPORTS],
        }
    }
}

impl ViewPortMrt {
    /// Build from per draw buffer viewports, scissoring each to its own extent.
    pub fn from_bounds(bounds: &[Rect], scissor: bool) -> Self {
        debug_assert!(bounds.len() <= MAX_VIEWPORTS, "too many viewports ({})", bounds.len());
        let mut mrt = Self {
            num: bounds.len(),
            scissor,
            ..Self::default()
        };
        mrt.bounds[..bounds.len()].copy_from_slice(bounds);
        mrt.scissors[..bounds.len()].copy_from_slice(bounds);
        mrt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keel_core::resource::{Buffer, BufferUsage, Program, VertexAttrib, VertexDecl, VertexFormat};

    fn decl_on_streams(streams: &[u8]) -> VertexDeclRef {
        let attribs = streams
            .iter()
            .enumerate()
            .map(|(i, &stream)| VertexAttrib {
                location: i as u8,
                stream,
                format: VertexFormat::Float32x4,
                offset: 0,
            })
            .collect();
        VertexDecl::new("test", attribs)
    }

    fn host() -> StreamHost {
        StreamHost::new(Buffer::new("vb", BufferUsage::VERTEX, 1024), 0, 16)
    }

    #[test]
    fn bit_iteration() {
        assert_eq!(bits(0b1010_0001).collect::<Vec<_>>(), vec![0, 5, 7]);
        assert_eq!(bits(0).count(), 0);
    }

    #[test]
    fn same_decl_is_not_a_change() {
        let mut vtx = VertexState::default();
        let decl = decl_on_streams(&[0, 1]);
        assert!(vtx.set_decl(Some(&decl)));
        assert_eq!(vtx.decl_valid(), 0b11);
        assert!(vtx.layout_pending());
        vtx.commit(0, true);
        assert!(!vtx.set_decl(Some(&decl.clone())));
        assert!(!vtx.layout_pending());
    }

    #[test]
    fn decl_change_without_valid_streams_stays_idle() {
        let mut vtx = VertexState::default();
        let decl = decl_on_streams(&[0]);
        vtx.set_decl(Some(&decl));
        vtx.commit(0, true);
        assert!(vtx.set_decl(None));
        assert_eq!(vtx.decl_valid(), 0);
        assert_ne!(vtx.decl_change(), 0);
        assert!(!vtx.pending());
    }

    #[test]
    fn stream_change_then_commit() {
        let mut vtx = VertexState::default();
        vtx.set_decl(Some(&decl_on_streams(&[0, 2])));
        let h = host();
        assert!(vtx.set_stream(2, &h));
        assert_eq!(vtx.stream_change(), 0b100);
        assert_eq!(vtx.streams_to_bind(), 0b101);
        vtx.commit(vtx.streams_to_bind(), true);
        assert_eq!(vtx.stream_valid(), 0b101);
        assert_eq!(vtx.stream_change(), 0);

        assert!(!vtx.set_stream(2, &h.clone()));
        assert!(!vtx.pending());
    }

    #[test]
    fn invalidated_stream_rebinds_same_host() {
        let mut vtx = VertexState::default();
        vtx.set_decl(Some(&decl_on_streams(&[0])));
        let h = host();
        vtx.set_stream(0, &h);
        vtx.commit(vtx.streams_to_bind(), true);

        vtx.invalidate_streams();
        assert_eq!(vtx.stream_valid(), 0);
        assert_eq!(vtx.stream_change(), 0);
        assert!(vtx.stream(0).is_bound());
        assert!(vtx.pending());
        assert_eq!(vtx.streams_to_bind(), 0b1);

        assert!(vtx.set_stream(0, &h));
        vtx.commit(vtx.streams_to_bind(), false);
        assert!(!vtx.pending());
    }

    #[test]
    fn reallocated_buffer_makes_stream_stale() {
        let mut vtx = VertexState::default();
        vtx.set_decl(Some(&decl_on_streams(&[0, 1])));
        let (a, b) = (host(), host());
        vtx.set_stream(0, &a);
        vtx.set_stream(1, &b);
        vtx.commit(vtx.streams_to_bind(), true);
        assert!(!vtx.pending());

        b.buffer.as_ref().unwrap().reallocate(2048, 0);
        assert_eq!(vtx.stale_streams(), 0b10);
        assert!(vtx.pending());
        assert!(vtx.set_stream(1, &b));
        assert_eq!(vtx.streams_to_bind(), 0b10);

        vtx.commit(vtx.streams_to_bind(), false);
        assert_eq!(vtx.stale_streams(), 0);
        assert!(!vtx.set_stream(1, &b));
    }

    #[test]
    fn unused_stream_is_not_rescheduled() {
        let mut vtx = VertexState::default();
        vtx.set_decl(Some(&decl_on_streams(&[0])));
        vtx.commit(0, true);
        let h = host();
        assert!(vtx.set_stream(3, &h));
        vtx.commit(vtx.streams_to_bind(), false);
        assert_eq!(vtx.stream_valid() & 0b1000, 0);
        assert!(!vtx.set_stream(3, &h));
    }

    #[test]
    fn attribute_diff() {
        let mut vtx = VertexState::default();
        vtx.active = 0b0100;
        let changed = vtx.attrib_diff(0b0110);
        assert_eq!(changed, 0b0010);
        vtx.commit_attribs(0b0110, changed);
        assert_eq!(vtx.active(), 0b0110);
        assert_eq!(vtx.attrib_diff(0b0110), 0);
    }

    #[test]
    fn uniform_buffer_slot_reports_identity_change() {
        let mut program = ProgramState::default();
        let a = Buffer::new("a", BufferUsage::UNIFORM, 256);
        let b = Buffer::new("b", BufferUsage::UNIFORM, 256);
        assert!(program.set_uniform_buffer(3, Some(&a)));
        assert!(!program.set_uniform_buffer(3, Some(&a)));
        assert!(program.set_uniform_buffer(3, Some(&b)));
        assert!(program.set_uniform_buffer(3, None));
        assert!(program.uniform_buffer(3).is_none());
    }

    #[test]
    fn program_switch_dirties_subroutine_stages() {
        let mut state = ProgramState::default();
        let mut counts = [0; ShaderStage::COUNT];
        counts[ShaderStage::Fragment.index()] = 2;
        let prog = Program::with_subroutines("lit", counts);

        state.switch_program(Some(&prog));
        assert!(state.dirty_subroutines());
        assert_eq!(state.subroutines(ShaderStage::Fragment), &[0, 0]);
        assert_eq!(state.take_dirty_stages(), 1 << ShaderStage::Fragment.index());
        assert!(!state.dirty_subroutines());

        assert!(!state.set_subroutine(ShaderStage::Fragment, 1, 0));
        assert!(state.set_subroutine(ShaderStage::Fragment, 1, 4));
        assert!(state.dirty_subroutines());

        state.switch_program(Some(&Program::new("plain")));
        assert!(!state.dirty_subroutines());
    }

    #[test]
    fn feedback_active_mask_follows_hosts() {
        let mut fb = FeedbackState::default();
        fb.record(1, &host());
        assert_eq!(fb.active(), 0b10);
        fb.record(1, &StreamHost::default());
        assert_eq!(fb.active(), 0);
    }

    #[test]
    fn mrt_from_bounds() {
        let rects = [Rect::new(0, 0, 64, 64), Rect::new(64, 0, 64, 64)];
        let mrt = ViewPortMrt::from_bounds(&rects, true);
        assert_eq!(mrt.num, 2);
        assert_eq!(mrt.scissors[1], rects[1]);
        assert_eq!(mrt.bounds[2], Rect::default());
    }
}
