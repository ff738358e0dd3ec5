//! The top-level handle that owns the interner, the type registry, and the
//! top-level branch.
//!
//! The source system keeps these as process-wide singletons ("created once
//! at process start, destroyed at process exit"). We make the equivalent
//! state an explicit, constructible value instead, so a test can spin up as
//! many independent runtimes as it needs.

use std::sync::Arc;

use crate::branch::Branch;
use crate::context::IsolationContext;
use crate::error::Result;
use crate::id::UniformIdSource;
use crate::intern::{Interner, Symbol};
use crate::kind::Kind;
use crate::record::ManagedRecord;
use crate::record_type::{FieldDescriptor, RecordType, RecordTypeRegistry};

/// Tunables for a [`Runtime`]. Currently just a capacity hint for the
/// interner's backing table; grows as the ambient stack grows.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    interner_capacity_hint: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            interner_capacity_hint: 256,
        }
    }
}

impl RuntimeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_interner_capacity_hint(mut self, hint: usize) -> Self {
        self.interner_capacity_hint = hint;
        self
    }
}

/// Owns everything a running MDS core needs: the identity source, the
/// interner, the type registry, and the root of the version tree.
#[derive(Debug)]
pub struct Runtime {
    ids: UniformIdSource,
    interner: Interner,
    registry: RecordTypeRegistry,
    top_level_branch: Branch,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new(RuntimeConfig::default())
    }
}

impl Runtime {
    pub fn new(config: RuntimeConfig) -> Self {
        let ids = UniformIdSource::new();
        let top_level_branch = Branch::root(&ids);
        crate::tracing::debug!("runtime initialized");
        Runtime {
            ids,
            interner: Interner::with_capacity_hint(config.interner_capacity_hint),
            registry: RecordTypeRegistry::new(),
            top_level_branch,
        }
    }

    pub fn intern(&self, s: &str) -> Symbol {
        self.interner.intern(s)
    }

    pub fn find_type(&self, name: &str) -> Option<RecordType> {
        let name = self.intern(name);
        self.registry.find(&name)
    }

    pub fn declare_type(&self, name: &str, super_type: Option<&RecordType>) -> Result<RecordType> {
        let name = self.intern(name);
        self.registry.declare(&self.ids, name, super_type.cloned())
    }

    pub fn field_in(
        &self,
        r_type: &RecordType,
        name: &str,
        kind: Kind,
        create_if_absent: bool,
    ) -> Result<Option<Arc<FieldDescriptor>>> {
        let name = self.intern(name);
        self.registry.field_in(&self.ids, r_type, name, kind, create_if_absent)
    }

    pub fn top_level_branch(&self) -> Branch {
        self.top_level_branch.clone()
    }

    /// A context that shadows every branch to itself.
    pub fn top_level_context(&self) -> IsolationContext {
        IsolationContext::top_level(self.ids.next())
    }

    /// A child of `parent` that shadows `top_level_branch` with a freshly
    /// allocated private branch, isolating writes made through it.
    pub fn isolate(&self, parent: &IsolationContext) -> IsolationContext {
        let substitute = Branch::child_of(&self.ids, &self.top_level_branch);
        IsolationContext::isolated_from(self.ids.next(), parent.clone(), self.top_level_branch.clone(), substitute)
    }

    pub fn new_branch(&self, parent: &Branch) -> Branch {
        Branch::child_of(&self.ids, parent)
    }

    /// Construct a new instance of `r_type`, paired with the branch the
    /// caller should use for subsequent field accesses (`ctxt`'s shadow of
    /// the top-level branch).
    ///
    /// Freezes `r_type` (and, transitively, whatever it forwards to) via
    /// `ensure_created`, the same as the source `record_type::create_record`:
    /// a type can no longer grow fields once a record has been built from it.
    pub fn create_record(&self, r_type: &RecordType, ctxt: &IsolationContext) -> Result<(ManagedRecord, Branch)> {
        let mut rt = r_type.clone();
        while let Some(forwardee) = rt.ensure_created()? {
            rt = forwardee;
        }
        let branch = ctxt.shadow(&self.top_level_branch);
        Ok((ManagedRecord::new(self.ids.next(), rt), branch))
    }
}
