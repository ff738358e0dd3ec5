//! Branches: nodes in the version tree that MSVs and contexts operate over.

use std::sync::Arc;

use crate::id::{UniformId, UniformIdSource};

#[derive(Debug)]
struct BranchInner {
    id: UniformId,
    parent: Option<Branch>,
}

/// A node in the version tree rooted at [`Runtime::top_level_branch`](crate::Runtime::top_level_branch).
///
/// Cloning a `Branch` is cheap (an `Arc` bump); two clones of the same branch
/// compare equal by [`UniformId`], not by pointer.
#[derive(Debug, Clone)]
pub struct Branch(Arc<BranchInner>);

impl PartialEq for Branch {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for Branch {}

impl std::hash::Hash for Branch {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.id.hash(state)
    }
}

impl Branch {
    pub(crate) fn root(ids: &UniformIdSource) -> Self {
        Branch(Arc::new(BranchInner {
            id: ids.next(),
            parent: None,
        }))
    }

    pub(crate) fn child_of(ids: &UniformIdSource, parent: &Branch) -> Self {
        Branch(Arc::new(BranchInner {
            id: ids.next(),
            parent: Some(parent.clone()),
        }))
    }

    pub fn id(&self) -> UniformId {
        self.0.id
    }

    pub fn parent(&self) -> Option<&Branch> {
        self.0.parent.as_ref()
    }

    /// Walk `self`, `self.parent()`, `self.parent().parent()`, ... inclusive.
    pub(crate) fn ancestors(&self) -> impl Iterator<Item = Branch> + '_ {
        let mut cur = Some(self.clone());
        std::iter::from_fn(move || {
            let next = cur.take()?;
            cur = next.parent().cloned();
            Some(next)
        })
    }

    /// True iff `self` is `other` or a descendant of it.
    pub fn is_descendant_of(&self, other: &Branch) -> bool {
        self.ancestors().any(|b| &b == other)
    }
}
