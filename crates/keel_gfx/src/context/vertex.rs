//! Vertex declaration, attributes, vertex and feedback streams
//!
//! Declaration and stream setters only record and schedule. The scheduled
//! work is flushed by `checked_vertex` (or `checked_vertex_bindless`) in this
//! order: layout, attribute enables, stream bindings.

use super::Context;
use crate::config::VertexPath;
use crate::driver::Driver;
use crate::state::{bits, MAX_FEEDBACK_STREAMS};
use keel_core::resource::{StreamHost, VertexDeclRef};
use keel_core::Resource;

impl<D: Driver> Context<D> {
    /// Enable/disable the attribute locations in `changed`; `attribs` holds
    /// their target values.
    pub fn apply_vertex_attribs(&mut self, attribs: u32, changed: u32) {
        tracing::trace!(attribs, changed, "set vertex attribs");
        self.driver.set_vertex_attribs(attribs, changed);
        self.mirror.vertex.commit_attribs(attribs, changed);
        self.note("attribs.applied");
    }

    /// Apply exactly `needed ^ active`, leaving `active == needed`.
    pub fn checked_vertex_attrib(&mut self, needed: u32) -> bool {
        let changed = self.mirror.vertex.attrib_diff(needed);
        if changed == 0 {
            self.note("attribs.skipped");
            return false;
        }
        self.apply_vertex_attribs(needed, changed);
        true
    }

    /// Record `decl` and schedule its layout.
    pub fn set_vertex_decl(&mut self, decl: Option<&VertexDeclRef>) {
        tracing::trace!(decl = ?decl.map(|d| d.label()), "set vertex decl");
        // Forces the schedule even for the current declaration.
        self.mirror.vertex.decl = None;
        self.mirror.vertex.set_decl(decl);
    }

    pub fn checked_vertex_decl(&mut self, decl: Option<&VertexDeclRef>) -> bool {
        let changed = self.mirror.vertex.set_decl(decl);
        if changed {
            tracing::trace!(decl = ?decl.map(|d| d.label()), "set vertex decl");
        }
        changed
    }

    /// Record `decl` together with the hosts of the streams it reads from.
    ///
    /// `hosts` is indexed by stream.
    pub fn set_vertex_decl_streams(&mut self, decl: &VertexDeclRef, hosts: &[StreamHost]) {
        self.set_vertex_decl(Some(decl));
        for stream in bits(decl.stream_mask()) {
            debug_assert!(stream < hosts.len(), "no host given for vertex stream {stream}");
            self.mirror.vertex.set_stream(stream, &hosts[stream]);
        }
    }

    /// Record the host of stream `idx`. Returns true if a rebind got scheduled.
    pub fn set_vertex_stream(&mut self, idx: usize, host: &StreamHost) -> bool {
        self.mirror.vertex.set_stream(idx, host)
    }

    /// Forget which streams are bound; the next flush rebinds every stream
    /// the declaration reads from.
    pub fn invalidate_vertex_streams(&mut self) {
        tracing::debug!("invalidate vertex streams");
        self.mirror.vertex.invalidate_streams();
    }

    /// Flush scheduled vertex work through buffer + offset bindings.
    pub fn apply_vertex_state(&mut self) {
        debug_assert_eq!(
            self.config.vertex_path,
            VertexPath::Standard,
            "standard vertex apply on a bindless context"
        );
        self.flush_vertex(VertexPath::Standard);
    }

    /// Flush scheduled vertex work through resident GPU addresses.
    pub fn apply_vertex_state_bindless(&mut self) {
        debug_assert_eq!(
            self.config.vertex_path,
            VertexPath::Bindless,
            "bindless vertex apply on a standard context"
        );
        self.flush_vertex(VertexPath::Bindless);
    }

    /// Flush if the declaration's layout or any stream changed.
    pub fn checked_vertex(&mut self) -> bool {
        if !self.mirror.vertex.pending() {
            self.note("vertex.skipped");
            return false;
        }
        self.apply_vertex_state();
        true
    }

    pub fn checked_vertex_bindless(&mut self) -> bool {
        if !self.mirror.vertex.pending() {
            self.note("vertex.skipped");
            return false;
        }
        self.apply_vertex_state_bindless();
        true
    }

    fn flush_vertex(&mut self, path: VertexPath) {
        let Some(decl) = self.mirror.vertex.decl.clone() else {
            self.mirror.vertex.commit(0, false);
            return;
        };

        let layout = self.mirror.vertex.layout_pending();
        if layout {
            tracing::trace!(decl = decl.label(), streams = self.mirror.vertex.decl_valid, "set vertex layout");
            self.driver.set_vertex_layout(&decl, self.mirror.vertex.decl_valid);
            self.checked_vertex_attrib(decl.attrib_mask());
        }

        let bound = self.mirror.vertex.streams_to_bind();
        for stream in bits(bound) {
            let host = &self.mirror.vertex.streams[stream];
            tracing::trace!(stream, offset = host.offset, stride = host.stride, "bind vertex stream");
            match path {
                VertexPath::Standard => self.driver.bind_vertex_stream(stream, host),
                VertexPath::Bindless => {
                    self.driver
                        .bind_vertex_stream_address(stream, host.address(), host.len(), host.stride)
                }
            }
        }

        self.mirror.vertex.commit(bound, layout);
        self.note("vertex.applied");
    }

    /// Disable every attribute and forget declaration and streams.
    pub fn clear_vertex_state(&mut self) {
        tracing::debug!("clear vertex state");
        let active = self.mirror.vertex.active;
        if active != 0 {
            self.apply_vertex_attribs(0, active);
        }
        self.mirror.vertex = Default::default();
    }

    /// Bind `hosts` to feedback streams `0..hosts.len()` and unbind the rest.
    pub fn apply_feedback_streams(&mut self, hosts: &[StreamHost]) {
        debug_assert!(
            hosts.len() <= MAX_FEEDBACK_STREAMS,
            "{} feedback streams, at most {MAX_FEEDBACK_STREAMS}",
            hosts.len()
        );
        for (idx, host) in hosts.iter().enumerate() {
            self.apply_feedback_stream(idx, host);
        }
        let stale = self.mirror.feedback.active & !((1u32 << hosts.len()) - 1);
        for idx in bits(stale) {
            self.apply_feedback_stream(idx, &StreamHost::default());
        }
    }

    pub fn apply_feedback_stream(&mut self, idx: usize, host: &StreamHost) {
        debug_assert!(idx < MAX_FEEDBACK_STREAMS, "feedback stream {idx} out of range");
        tracing::trace!(idx, bound = host.is_bound(), "bind feedback stream");
        self.driver.bind_feedback_stream(idx, host);
        self.mirror.feedback.record(idx, host);
        self.note("feedback.applied");
    }

    pub fn clear_feedback_state(&mut self) {
        tracing::debug!("clear feedback state");
        for idx in bits(self.mirror.feedback.active) {
            self.apply_feedback_stream(idx, &StreamHost::default());
        }
        self.mirror.feedback = Default::default();
    }
}
