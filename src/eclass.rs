use std::fmt::{self, Debug};
use std::iter::ExactSizeIterator;

use crate::{util::HashMap, ENode, Id};

/// An equivalence class of [`ENode`]s.
#[non_exhaustive]
#[derive(Clone)]
pub struct EClass {
    /// This eclass's id.
    pub id: Id,
    /// The equivalent enodes in this equivalence class.
    pub nodes: Vec<ENode>,
    /// The e-node whose [`add`](crate::EGraph::add) created this class.
    /// A merge uses it to find the absorbed class's stale hashcons
    /// entry.
    pub(crate) original: ENode,
    /// Every e-node that mentions this class in its children, mapped to
    /// the e-class that node lives in. Keeping this as a map collapses
    /// duplicate parents during repair.
    pub(crate) parents: HashMap<ENode, Id>,
}

impl Debug for EClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("EClass")
            .field("id", &self.id)
            .field("nodes", &self.nodes)
            .field("parents", &self.parents)
            .finish()
    }
}

impl EClass {
    pub(crate) fn new(id: Id, original: ENode) -> Self {
        EClass {
            id,
            nodes: vec![original.clone()],
            original,
            parents: HashMap::default(),
        }
    }

    /// Returns `true` if the `eclass` is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the number of enodes in this eclass.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Iterates over the enodes in this eclass.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &ENode> {
        self.nodes.iter()
    }

    /// Iterates over the childless enodes in this eclass.
    pub fn leaves(&self) -> impl Iterator<Item = &ENode> {
        self.nodes.iter().filter(|&n| n.is_leaf())
    }
}
