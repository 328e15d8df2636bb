use instant::Instant;
use log::*;

use crate::{
    unionfind::{Union, UnionFind},
    util::{concat_vecs, HashMap, UniqueQueue},
    EClass, ENode, Id, Pattern, Subst, Term,
};

/** Data structure to keep track of equalities between terms.

An `EGraph` is three structures kept in sync:

- a [`UnionFind`] over e-class [`Id`]s,
- `classes`, mapping each canonical id to its [`EClass`],
- `memo`, the hashcons: a structural map from canonical [`ENode`] to
  the id of the class that owns it. Two e-nodes with the same operator
  and equivalent children can never live under different ids in `memo`;
  that is what makes congruence closure fall out of plain map lookups.

[`union`](EGraph::union) only records the equality and folds one class
into the other; the invariants are restored by
[`rebuild`](EGraph::rebuild), which drains a worklist of classes whose
parent e-nodes need re-canonicalizing. Call `rebuild` after a batch of
unions and before searching; the [`Runner`](crate::Runner) does this
once per iteration.

The e-graph exclusively owns its classes, nodes, and union-find;
callers only hold [`Id`]s and must re-interpret them through
[`find`](EGraph::find) after unions.
*/
#[derive(Debug, Clone, Default)]
pub struct EGraph {
    unionfind: UnionFind,
    memo: HashMap<ENode, Id>,
    classes: HashMap<Id, EClass>,
    pending: UniqueQueue<Id>,
    unions_since_rebuild: usize,
}

impl EGraph {
    /// Returns an iterator over the eclasses in the egraph.
    pub fn classes(&self) -> impl ExactSizeIterator<Item = &EClass> {
        self.classes.values()
    }

    /// Returns `true` if the egraph is empty.
    pub fn is_empty(&self) -> bool {
        self.memo.is_empty()
    }

    /// The number of e-nodes in the egraph, i.e. the size of the
    /// hashcons index.
    ///
    /// This may briefly overcount between a [`union`](EGraph::union)
    /// and the next [`rebuild`](EGraph::rebuild), while congruent
    /// entries are still waiting to be collapsed.
    pub fn total_size(&self) -> usize {
        self.memo.len()
    }

    /// The number of e-classes in the egraph.
    pub fn number_of_classes(&self) -> usize {
        self.classes.len()
    }

    /// Canonicalizes an eclass id.
    pub fn find(&self, id: Id) -> Id {
        self.unionfind.find(id)
    }

    /// Returns a new e-node with every child replaced by its canonical
    /// representative. Pure; the e-graph is not modified.
    pub fn canonicalize(&self, enode: &ENode) -> ENode {
        enode.clone().map_children(|id| self.find(id))
    }

    /// Looks up a (not necessarily canonical) e-node in the hashcons
    /// without inserting it.
    pub fn lookup(&self, enode: &ENode) -> Option<Id> {
        let enode = self.canonicalize(enode);
        self.memo.get(&enode).map(|&id| self.find(id))
    }

    /// Looks up a whole [`Term`], returning its class if every node of
    /// it is already represented.
    pub fn lookup_term(&self, term: &Term) -> Option<Id> {
        let children = term
            .children
            .iter()
            .map(|t| self.lookup_term(t))
            .collect::<Option<Vec<Id>>>()?;
        self.lookup(&ENode::new(term.op, children))
    }

    /// Do these two terms belong to the same e-class?
    ///
    /// `false` if either term is not fully represented in the egraph.
    pub fn equivs(&self, t1: &Term, t2: &Term) -> bool {
        match (self.lookup_term(t1), self.lookup_term(t2)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Adds an e-node to the egraph, returning its e-class.
    ///
    /// This is idempotent: re-adding a structurally equal (after
    /// canonicalization) e-node returns the same class. The children
    /// must already be in the egraph; an unknown id panics.
    pub fn add(&mut self, enode: ENode) -> Id {
        let enode = self.canonicalize(&enode);
        if let Some(&existing) = self.memo.get(&enode) {
            let existing = self.find(existing);
            trace!("adding *{:4}: {}", existing, enode);
            return existing;
        }

        let id = self.unionfind.make_set();
        trace!("adding  {:4}: {}", id, enode);

        // every child learns about its new parent
        for &child in &enode.children {
            let class = self
                .classes
                .get_mut(&child)
                .unwrap_or_else(|| panic!("no eclass for child {}", child));
            class.parents.insert(enode.clone(), id);
        }

        self.classes.insert(id, EClass::new(id, enode.clone()));
        let old = self.memo.insert(enode, id);
        debug_assert_eq!(old, None);
        id
    }

    /// Adds a ground term bottom-up, returning the class of its root.
    pub fn add_term(&mut self, term: &Term) -> Id {
        let children = term.children.iter().map(|t| self.add_term(t)).collect();
        self.add(ENode::new(term.op, children))
    }

    /// Adds the instantiation of `pattern` under `subst`, returning the
    /// class of its root.
    ///
    /// Every variable of the pattern must be bound in `subst`; an
    /// unbound variable is a bug in the caller and panics. The
    /// saturation loop only calls this on right-hand sides whose
    /// variables were bound by matching the left-hand side.
    pub fn add_instantiation(&mut self, subst: &Subst, pattern: &Pattern) -> Id {
        match pattern {
            Pattern::Var(v) => self.find(subst[*v]),
            Pattern::Node(op, args) => {
                let children = args
                    .iter()
                    .map(|arg| self.add_instantiation(subst, arg))
                    .collect();
                self.add(ENode::new(*op, children))
            }
        }
    }

    /// Unions two eclasses, returning whether anything changed.
    ///
    /// The absorbed class is folded into the surviving root and deleted;
    /// the survivor is queued for repair by the next
    /// [`rebuild`](EGraph::rebuild).
    pub fn union(&mut self, id1: Id, id2: Id) -> bool {
        let Union { root, absorbed } = match self.unionfind.union(id1, id2) {
            Some(u) => u,
            None => return false,
        };
        trace!("union {} -> {}", absorbed, root);
        self.unions_since_rebuild += 1;

        let class = self
            .classes
            .remove(&absorbed)
            .unwrap_or_else(|| panic!("no eclass for absorbed root {}", absorbed));
        let EClass {
            nodes,
            original,
            parents,
            ..
        } = class;

        let survivor = self.classes.get_mut(&root).unwrap();
        concat_vecs(&mut survivor.nodes, nodes);
        survivor.parents.extend(parents);

        // The absorbed class's founding node just lost its canonical
        // form, and nothing upward points at it: re-key its hashcons
        // entry here or it dangles.
        self.memo.remove(&original);
        let canonical = self.canonicalize(&original);
        self.memo.insert(canonical, root);

        self.pending.insert(root);
        true
    }

    /// Restores the egraph invariants after a batch of
    /// [`union`](EGraph::union)s: re-canonicalizes every affected
    /// parent e-node and merges classes that the unions made congruent.
    ///
    /// Returns the number of repairs performed. Terminates because
    /// every merge strictly decreases the number of e-classes.
    pub fn rebuild(&mut self) -> usize {
        if self.unions_since_rebuild == 0 {
            debug_assert!(self.pending.is_empty());
            return 0;
        }

        let old_hc_size = self.memo.len();
        let old_n_eclasses = self.classes.len();
        let start = Instant::now();

        let mut n_repairs = 0;
        while let Some(id) = self.pending.pop() {
            let id = self.find(id);
            self.repair(id);
            n_repairs += 1;
        }

        let trimmed_nodes = self.rebuild_classes();
        self.unions_since_rebuild = 0;

        #[cfg(debug_assertions)]
        self.check_memo();

        let elapsed = start.elapsed();
        info!(
            concat!(
                "rebuilt {} times in {}.{:03}s\n",
                "  old: hc size {}, eclasses: {}\n",
                "  new: hc size {}, eclasses: {}\n",
                "  trimmed nodes: {}"
            ),
            n_repairs,
            elapsed.as_secs(),
            elapsed.subsec_millis(),
            old_hc_size,
            old_n_eclasses,
            self.memo.len(),
            self.classes.len(),
            trimmed_nodes,
        );

        n_repairs
    }

    /// Re-canonicalizes the parents of `id` in the hashcons and merges
    /// any parents that canonicalization revealed to be congruent.
    fn repair(&mut self, id: Id) {
        let parents = std::mem::take(&mut self.classes.get_mut(&id).unwrap().parents);

        // re-key each parent under its canonical form
        for (p_node, p_class) in &parents {
            self.memo.remove(p_node);
            let canonical = self.canonicalize(p_node);
            self.memo.insert(canonical, self.find(*p_class));
        }

        // parents that collapsed to the same canonical form were made
        // congruent by the unions that queued this repair
        let mut seen: HashMap<ENode, Id> = HashMap::default();
        for (p_node, p_class) in parents {
            let canonical = self.canonicalize(&p_node);
            if let Some(&other) = seen.get(&canonical) {
                self.union(p_class, other);
            }
            seen.insert(canonical, self.find(p_class));
        }

        // the unions above may have absorbed `id` itself
        let root = self.find(id);
        self.classes.get_mut(&root).unwrap().parents.extend(seen);
    }

    /// Canonicalizes and dedups every class's node set and refreshes
    /// the hashcons values, so that both sides of the index are fully
    /// canonical when [`rebuild`](EGraph::rebuild) returns.
    fn rebuild_classes(&mut self) -> usize {
        let uf = &self.unionfind;
        let memo = &mut self.memo;

        let mut trimmed = 0;
        for class in self.classes.values_mut() {
            let old_len = class.nodes.len();
            for node in &mut class.nodes {
                node.update_children(|id| uf.find(id));
            }
            class.nodes.sort_unstable();
            class.nodes.dedup();
            trimmed += old_len - class.nodes.len();

            for node in &class.nodes {
                memo.insert(node.clone(), class.id);
            }
        }
        trimmed
    }

    #[cfg(debug_assertions)]
    fn check_memo(&self) {
        let mut test_memo = HashMap::<&ENode, Id>::default();

        for (&id, class) in &self.classes {
            assert_eq!(class.id, id);
            assert_eq!(self.find(id), id, "class key {} is not a root", id);
            for node in &class.nodes {
                if let Some(old) = test_memo.insert(node, id) {
                    assert_eq!(
                        old, id,
                        "found unexpected duplicate in classes: {}",
                        node
                    );
                }
            }
        }

        for (node, &id) in &test_memo {
            assert_eq!(
                **node,
                self.canonicalize(node),
                "non-canonical node {} in class {}",
                node,
                id
            );
            assert_eq!(
                Some(id),
                self.memo.get(*node).map(|&m| self.find(m)),
                "hashcons disagrees about {}",
                node
            );
        }
    }
}

impl std::ops::Index<Id> for EGraph {
    type Output = EClass;
    fn index(&self, id: Id) -> &Self::Output {
        let id = self.find(id);
        self.classes
            .get(&id)
            .unwrap_or_else(|| panic!("no eclass for {}", id))
    }
}
