//! Isolation contexts: per-task objects that shadow branches.

use crate::branch::Branch;
use crate::id::UniformId;

#[derive(Debug, Clone)]
enum ContextInner {
    /// Shadows every branch to itself.
    TopLevel,
    /// Shadows one distinguished branch to a private substitute; every
    /// other branch delegates to `parent`.
    Isolated {
        shadowed: Branch,
        substitute: Branch,
        parent: Box<IsolationContext>,
    },
}

/// A per-task mapping from branches to the branches they actually observe.
///
/// `shadow` is total and idempotent: every branch has a shadow, even if it
/// is only ever itself.
#[derive(Debug, Clone)]
pub struct IsolationContext {
    id: UniformId,
    inner: ContextInner,
}

impl IsolationContext {
    pub(crate) fn top_level(id: UniformId) -> Self {
        IsolationContext {
            id,
            inner: ContextInner::TopLevel,
        }
    }

    /// Create a context that isolates `shadowed` behind a freshly allocated
    /// private branch, delegating every other branch to `parent`.
    pub(crate) fn isolated_from(id: UniformId, parent: IsolationContext, shadowed: Branch, substitute: Branch) -> Self {
        IsolationContext {
            id,
            inner: ContextInner::Isolated {
                shadowed,
                substitute,
                parent: Box::new(parent),
            },
        }
    }

    pub fn id(&self) -> UniformId {
        self.id
    }

    pub fn shadow(&self, b: &Branch) -> Branch {
        match &self.inner {
            ContextInner::TopLevel => b.clone(),
            ContextInner::Isolated {
                shadowed,
                substitute,
                parent,
            } => {
                if b == shadowed {
                    substitute.clone()
                } else {
                    parent.shadow(b)
                }
            }
        }
    }
}
