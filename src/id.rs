//! Process-unique identity for core objects.
//!
//! A GC-backed runtime cannot use an object's address as a stable identity
//! (the collector is free to move it), so every declared record type, field
//! descriptor, managed record, branch, and isolation context is additionally
//! tagged with a [`UniformId`] handed out by a single process-wide counter.

use std::fmt;
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

/// A process-unique, never-reused identifier.
///
/// Ids are assigned in increasing order but callers must not rely on any
/// particular spacing between them.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UniformId {
    value: NonZeroU64,
}

impl UniformId {
    fn from_u64(v: u64) -> Self {
        UniformId {
            value: NonZeroU64::new(v).expect("uniform id counter must never yield zero"),
        }
    }

    pub fn as_u64(self) -> u64 {
        self.value.get()
    }
}

impl fmt::Debug for UniformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.value)
    }
}

/// Hands out increasing [`UniformId`] values. One instance backs an entire
/// [`Runtime`](crate::Runtime); every identifiable object constructed through
/// that runtime draws from the same counter.
#[derive(Debug)]
pub struct UniformIdSource {
    next: AtomicU64,
}

impl Default for UniformIdSource {
    fn default() -> Self {
        Self::new()
    }
}

impl UniformIdSource {
    pub fn new() -> Self {
        // Start at 1 so `NonZeroU64` never has to represent 0.
        UniformIdSource {
            next: AtomicU64::new(1),
        }
    }

    pub fn next(&self) -> UniformId {
        let v = self.next.fetch_add(1, Ordering::Relaxed);
        assert!(v != 0, "uniform id counter overflowed");
        UniformId::from_u64(v)
    }
}
