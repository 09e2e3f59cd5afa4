//! Buffers and stream hosts

use crate::handle::{same, Incarnation, Resource, ResourceId};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub type BufferRef = Arc<Buffer>;

bitflags! {
    #[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct BufferUsage: u32 {
        const VERTEX = 1 << 0;
        const INDEX = 1 << 1;
        const UNIFORM = 1 << 2;
        const FEEDBACK = 1 << 3;
        const STORAGE = 1 << 4;
    }
}

/// GPU buffer.
///
/// `size` and `gpu_address` change when the storage is reallocated; that is
/// an in-place respecification and bumps the incarnation.
#[derive(Debug)]
pub struct Buffer {
    id: ResourceId,
    label: String,
    usage: BufferUsage,
    size: AtomicU64,
    gpu_address: AtomicU64,
    incarnation: Incarnation,
}

impl Buffer {
    pub fn new(label: impl Into<String>, usage: BufferUsage, size: u64) -> BufferRef {
        Self::with_address(label, usage, size, 0)
    }

    /// Buffer made resident for bindless access at `gpu_address`.
    pub fn with_address(label: impl Into<String>, usage: BufferUsage, size: u64, gpu_address: u64) -> BufferRef {
        Arc::new(Self {
            id: ResourceId::next(),
            label: label.into(),
            usage,
            size: AtomicU64::new(size),
            gpu_address: AtomicU64::new(gpu_address),
            incarnation: Incarnation::new(),
        })
    }

    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    pub fn size(&self) -> u64 {
        self.size.load(Ordering::Acquire)
    }

    pub fn gpu_address(&self) -> u64 {
        self.gpu_address.load(Ordering::Acquire)
    }

    pub fn incarnation(&self) -> u32 {
        self.incarnation.get()
    }

    /// Storage was reallocated. Bindings made against the old storage are stale.
    pub fn reallocate(&self, size: u64, gpu_address: u64) -> u32 {
        self.size.store(size, Ordering::Release);
        self.gpu_address.store(gpu_address, Ordering::Release);
        self.incarnation.bump()
    }
}

impl Resource for Buffer {
    fn id(&self) -> ResourceId {
        self.id
    }

    fn label(&self) -> &str {
        &self.label
    }
}

/// A buffer range feeding a vertex or feedback stream.
#[derive(Debug, Clone, Default)]
pub struct StreamHost {
    pub buffer: Option<BufferRef>,
    pub offset: u64,
    pub stride: u32,
}

impl StreamHost {
    pub fn new(buffer: BufferRef, offset: u64, stride: u32) -> Self {
        Self {
            buffer: Some(buffer),
            offset,
            stride,
        }
    }

    pub fn is_bound(&self) -> bool {
        self.buffer.is_some()
    }

    /// Bindless address of the first element, 0 when unbound.
    pub fn address(&self) -> u64 {
        self.buffer
            .as_ref()
            .map_or(0, |b| b.gpu_address() + self.offset)
    }

    /// Incarnation of the hosted buffer, 0 when unbound.
    pub fn incarnation(&self) -> u32 {
        self.buffer.as_ref().map_or(0, |b| b.incarnation())
    }

    /// Bytes from `offset` to the end of the buffer.
    pub fn len(&self) -> u64 {
        self.buffer
            .as_ref()
            .map_or(0, |b| b.size().saturating_sub(self.offset))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PartialEq for StreamHost {
    fn eq(&self, other: &Self) -> bool {
        same(self.buffer.as_ref(), other.buffer.as_ref())
            && self.offset == other.offset
            && self.stride == other.stride
    }
}

impl Eq for StreamHost {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_host_equality_is_identity_based() {
        let a = Buffer::new("a", BufferUsage::VERTEX, 256);
        let b = Buffer::new("b", BufferUsage::VERTEX, 256);
        assert_eq!(StreamHost::new(a.clone(), 0, 16), StreamHost::new(a.clone(), 0, 16));
        assert_ne!(StreamHost::new(a.clone(), 0, 16), StreamHost::new(b, 0, 16));
        assert_ne!(StreamHost::new(a.clone(), 16, 16), StreamHost::new(a, 0, 16));
        assert_eq!(StreamHost::default(), StreamHost::default());
    }

    #[test]
    fn reallocation_bumps_incarnation_and_moves_address() {
        let buf = Buffer::with_address("vb", BufferUsage::VERTEX, 64, 0x1000);
        let host = StreamHost::new(buf.clone(), 16, 16);
        assert_eq!(host.address(), 0x1010);
        assert_eq!(host.len(), 48);

        assert_eq!(host.incarnation(), 0);
        assert_eq!(buf.reallocate(128, 0x8000), 1);
        assert_eq!(host.incarnation(), 1);
        assert_eq!(host.address(), 0x8010);
        assert_eq!(host.len(), 112);
    }
}
