//! Resource identity and incarnation counters
//!
//! Every bindable GPU object carries a process-unique [`ResourceId`]. Two
//! objects with identical parameters are still different resources: the
//! state mirror compares ids, never contents.
//!
//! Objects whose content can be respecified in place (samplers, buffers) also
//! carry an [`Incarnation`], bumped on every in-place mutation.

use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

static NEXT_RESOURCE_ID: AtomicU32 = AtomicU32::new(1);

/// Resource identity (process-unique, never zero)
///
/// Format: 32-bit counter, allocated from a global atomic.
/// `0` is reserved as the "unbound" marker in packed form (see [`ResourceId::to_bits`]).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(NonZeroU32);

impl ResourceId {
    /// Allocate a fresh identity.
    pub fn next() -> Self {
        let raw = NEXT_RESOURCE_ID.fetch_add(1, Ordering::Relaxed);
        // Wrapping past u32::MAX would hand out 0; skip it.
        match NonZeroU32::new(raw) {
            Some(id) => Self(id),
            None => Self::next(),
        }
    }

    pub fn get(&self) -> u32 {
        self.0.get()
    }

    /// Pack an optional id (0 = none). Used by atomics that store "last bound" hints.
    pub fn to_bits(id: Option<ResourceId>) -> u32 {
        id.map_or(0, |id| id.get())
    }

    /// Inverse of [`ResourceId::to_bits`]
    pub fn from_bits(bits: u32) -> Option<ResourceId> {
        NonZeroU32::new(bits).map(Self)
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic in-place mutation counter.
///
/// Shared between every context that references the owning resource.
#[derive(Debug, Default)]
pub struct Incarnation(AtomicU32);

impl Incarnation {
    pub fn new() -> Self {
        Self(AtomicU32::new(0))
    }

    pub fn get(&self) -> u32 {
        self.0.load(Ordering::Acquire)
    }

    /// Record an in-place mutation. Returns the new incarnation.
    pub fn bump(&self) -> u32 {
        self.0.fetch_add(1, Ordering::AcqRel).wrapping_add(1)
    }
}

/// Anything that can sit in a mirror slot.
pub trait Resource {
    fn id(&self) -> ResourceId;

    fn label(&self) -> &str {
        ""
    }
}

impl<T: Resource + ?Sized> Resource for Arc<T> {
    fn id(&self) -> ResourceId {
        (**self).id()
    }

    fn label(&self) -> &str {
        (**self).label()
    }
}

/// Id of an optional slot entry.
pub fn id_of<T: Resource>(slot: Option<&T>) -> Option<ResourceId> {
    slot.map(T::id)
}

/// Identity equality of two optional slot entries.
#[inline]
pub fn same<T: Resource>(a: Option<&T>, b: Option<&T>) -> bool {
    id_of(a) == id_of(b)
}

/// Identity equality of two slot ranges, compared in a single pass.
///
/// Ranges of different length are never equal.
pub fn same_range<T: Resource>(a: &[Option<T>], b: &[Option<T>]) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b)
            .all(|(x, y)| same(x.as_ref(), y.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dummy(ResourceId);

    impl Resource for Dummy {
        fn id(&self) -> ResourceId {
            self.0
        }
    }

    #[test]
    fn ids_are_unique() {
        let a = ResourceId::next();
        let b = ResourceId::next();
        assert_ne!(a, b);
    }

    #[test]
    fn bits_round_trip_none() {
        assert_eq!(ResourceId::to_bits(None), 0);
        assert_eq!(ResourceId::from_bits(0), None);
        let id = ResourceId::next();
        assert_eq!(ResourceId::from_bits(ResourceId::to_bits(Some(id))), Some(id));
    }

    #[test]
    fn incarnation_bumps_monotonically() {
        let inc = Incarnation::new();
        assert_eq!(inc.get(), 0);
        assert_eq!(inc.bump(), 1);
        assert_eq!(inc.bump(), 2);
        assert_eq!(inc.get(), 2);
    }

    #[test]
    fn identity_not_value() {
        let a = Arc::new(Dummy(ResourceId::next()));
        let b = Arc::new(Dummy(ResourceId::next()));
        assert!(same(Some(&a), Some(&a.clone())));
        assert!(!same(Some(&a), Some(&b)));
        assert!(!same(Some(&a), None));
        assert!(same::<Arc<Dummy>>(None, None));
    }

    #[test]
    fn range_compare_detects_single_difference() {
        let a = Arc::new(Dummy(ResourceId::next()));
        let b = Arc::new(Dummy(ResourceId::next()));
        let left = vec![Some(a.clone()), None, Some(b.clone())];
        let mut right = left.clone();
        assert!(same_range(&left, &right));
        right[1] = Some(a.clone());
        assert!(!same_range(&left, &right));
        assert!(!same_range(&left, &right[..2]));
    }
}
