//! The multi-version slot: per-(record, field) versioned storage.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::branch::Branch;
use crate::generation::{AtomicGeneration, Generation};
use crate::hash::FxDashMap;
use crate::id::UniformId;
use crate::kind::{ArithOp, Kind, ModifyOp, ResMode, Value};

/// Identifies the slot during three-way merge without holding an owned
/// pointer back to the record (which would be a reference cycle).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConflictGenerator {
    pub record: UniformId,
    pub field: UniformId,
}

#[derive(Debug)]
struct BranchState {
    /// Append-only version chain for this branch: `(value, generation)`.
    chain: Vec<(Value, Generation)>,
    /// Index into `chain` that `last_stable_val` resolves to. Only moves
    /// forward, and only on a `resolving` modify.
    stable_index: usize,
}

impl BranchState {
    fn new() -> Self {
        BranchState {
            chain: Vec::new(),
            stable_index: 0,
        }
    }
}

/// Per-(record, field) versioned storage.
///
/// Every branch gets its own [`BranchState`] behind its own `Mutex`, so
/// writers on different branches never contend. Ancestor lookups never hold
/// more than one branch's lock at a time: the walk locks a branch, reads its
/// last entry, releases, and only then moves to the parent.
#[derive(Debug)]
pub struct Msv {
    kind: Kind,
    conflict: ConflictGenerator,
    generation: AtomicGeneration,
    branches: FxDashMap<UniformId, Arc<Mutex<BranchState>>>,
}

impl Msv {
    pub(crate) fn new(kind: Kind, conflict: ConflictGenerator) -> Self {
        Msv {
            kind,
            conflict,
            generation: AtomicGeneration::start(),
            branches: FxDashMap::default(),
        }
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn conflict_generator(&self) -> ConflictGenerator {
        self.conflict
    }

    fn state_for(&self, branch: &Branch) -> Arc<Mutex<BranchState>> {
        self.branches
            .entry(branch.id())
            .or_insert_with(|| Arc::new(Mutex::new(BranchState::new())))
            .clone()
    }

    /// Existing state for `branch`, without creating one. Used by read paths
    /// so a never-written branch doesn't allocate bookkeeping.
    fn existing_state(&self, branch: &Branch) -> Option<Arc<Mutex<BranchState>>> {
        self.branches.get(&branch.id()).map(|r| r.clone())
    }

    /// The value visible on `branch`: its own latest entry, or the nearest
    /// ancestor's.
    pub fn read(&self, branch: &Branch) -> Value {
        for ancestor in branch.ancestors() {
            if let Some(state) = self.existing_state(&ancestor) {
                let guard = state.lock();
                if let Some((value, _)) = guard.chain.last() {
                    return value.clone();
                }
            }
        }
        self.kind.absent()
    }

    /// The value a publish/merge operation would see for `branch` right now.
    pub fn read_frozen(&self, branch: &Branch) -> Value {
        for ancestor in branch.ancestors() {
            if let Some(state) = self.existing_state(&ancestor) {
                let guard = state.lock();
                if let Some((value, _)) = guard.chain.get(guard.stable_index) {
                    return value.clone();
                }
            }
        }
        self.kind.absent()
    }

    pub fn has_value(&self, branch: &Branch) -> bool {
        for ancestor in branch.ancestors() {
            if let Some(state) = self.existing_state(&ancestor) {
                if !state.lock().chain.is_empty() {
                    return true;
                }
            }
        }
        false
    }

    /// Value visible on `branch` given its own ancestors, deliberately
    /// skipping `branch` itself (its own state is handled by the caller,
    /// which may already be holding that branch's lock).
    fn ancestor_value(&self, branch: &Branch) -> Value {
        for ancestor in branch.ancestors().skip(1) {
            if let Some(state) = self.existing_state(&ancestor) {
                let guard = state.lock();
                if let Some((value, _)) = guard.chain.last() {
                    return value.clone();
                }
            }
        }
        self.kind.absent()
    }

    /// `last_stable_val` visible on `branch`'s ancestors, skipping `branch`
    /// itself for the same reason as [`Self::ancestor_value`].
    fn ancestor_stable_value(&self, branch: &Branch) -> Value {
        for ancestor in branch.ancestors().skip(1) {
            if let Some(state) = self.existing_state(&ancestor) {
                let guard = state.lock();
                if let Some((value, _)) = guard.chain.get(guard.stable_index) {
                    return value.clone();
                }
            }
        }
        self.kind.absent()
    }

    /// Apply `op` to the value currently visible on `branch`, returning the
    /// value that was visible immediately beforehand.
    pub fn modify(&self, branch: &Branch, op: ModifyOp, res_mode: ResMode, arg: Option<Value>) -> Value {
        let state = self.state_for(branch);
        let mut guard = state.lock();

        let prior = match guard.chain.last() {
            Some((value, _)) => value.clone(),
            None => self.ancestor_value(branch),
        };

        if op == ModifyOp::CurrentVal {
            if res_mode == ResMode::Resolving && !guard.chain.is_empty() {
                guard.stable_index = guard.chain.len() - 1;
            }
            return prior;
        }

        let new_value = match op {
            ModifyOp::Set => arg.expect("set requires an argument"),
            ModifyOp::Add => prior.apply_arith(ArithOp::Add, &arg.expect("add requires an argument")),
            ModifyOp::Sub => prior.apply_arith(ArithOp::Sub, &arg.expect("sub requires an argument")),
            ModifyOp::Mul => prior.apply_arith(ArithOp::Mul, &arg.expect("mul requires an argument")),
            ModifyOp::Div => prior.apply_arith(ArithOp::Div, &arg.expect("div requires an argument")),
            ModifyOp::ParentVal => match branch.parent() {
                Some(parent) => self.read(parent),
                None => self.kind.absent(),
            },
            ModifyOp::LastStableVal => match guard.chain.get(guard.stable_index) {
                Some((value, _)) => value.clone(),
                None => self.ancestor_stable_value(branch),
            },
            ModifyOp::CurrentVal => unreachable!("handled above"),
        };

        let gen = self.generation.fetch_then_increment();
        guard.chain.push((new_value, gen));
        if res_mode == ResMode::Resolving {
            guard.stable_index = guard.chain.len() - 1;
        }
        prior
    }
}
