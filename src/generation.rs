//! Monotonic generation counters used to order the version chain inside a
//! single [`Msv`](crate::msv::Msv).
//!
//! Every modification appended to a branch's chain is tagged with the
//! generation that produced it, so two concurrent writers racing on the same
//! branch can be ordered even though both observe the same "current" value at
//! the start of their attempt.

use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

const START_U64: u64 = 1;

/// The generation at which a particular chain node was installed.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation {
    value: NonZeroU64,
}

impl Generation {
    fn from(g: u64) -> Self {
        Self {
            value: NonZeroU64::new(g).expect("generation counter must never yield zero"),
        }
    }

    fn as_u64(self) -> u64 {
        self.value.get()
    }
}

impl std::fmt::Debug for Generation {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(fmt, "G{}", self.value)
    }
}

/// A slot-local generation counter, shared by every branch of a single MSV.
#[derive(Debug)]
pub(crate) struct AtomicGeneration {
    data: AtomicU64,
}

impl AtomicGeneration {
    pub(crate) fn start() -> Self {
        Self {
            data: AtomicU64::new(START_U64),
        }
    }

    /// Allocate the next generation for a newly-installed chain node.
    pub(crate) fn fetch_then_increment(&self) -> Generation {
        let v = self.data.fetch_add(1, Ordering::SeqCst);
        assert!(v != u64::MAX, "generation counter overflow");
        Generation::from(v)
    }
}
