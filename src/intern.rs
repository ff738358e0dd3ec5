//! Canonical, pointer-comparable names.
//!
//! The type registry and field tables compare names constantly (`find`,
//! `lookup_field`). Interning turns those comparisons into pointer
//! comparisons instead of byte-wise `str` comparisons, mirroring the source
//! runtime's `interned_string` service.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;

use crate::hash::FxDashMap;

/// A cheap, `Copy`-like handle to a canonicalized string.
///
/// Two `Symbol`s compare equal iff they were interned from equal strings by
/// the same [`Interner`]; this is implemented as a pointer comparison on the
/// backing `Arc<str>`, not a string comparison.
#[derive(Clone)]
pub struct Symbol(Arc<str>);

impl Symbol {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.0) as *const () as usize).hash(state)
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A concurrent, grow-only string table.
#[derive(Debug, Default)]
pub struct Interner {
    table: FxDashMap<Box<str>, Symbol>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity_hint(hint: usize) -> Self {
        Interner {
            table: FxDashMap::with_capacity_and_hasher(hint, Default::default()),
        }
    }

    /// Intern `s`, returning the same [`Symbol`] for every equal string.
    pub fn intern(&self, s: &str) -> Symbol {
        if let Some(existing) = self.table.get(s) {
            return existing.clone();
        }
        match self.table.entry(Box::from(s)) {
            Entry::Occupied(occupied) => occupied.get().clone(),
            Entry::Vacant(vacant) => {
                let symbol = Symbol(Arc::from(s));
                vacant.insert(symbol.clone());
                symbol
            }
        }
    }
}
