use std::cell::Cell;
use std::fmt::{self, Debug};

use indexmap::{IndexMap, IndexSet};

use crate::Id;

/// The result of a successful [`UnionFind::union`].
///
/// The `root` survives as the canonical representative of the joined
/// set; the `absorbed` root is now a child of `root` and must no longer
/// be used as a map key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Union {
    /// The surviving root of the joined set.
    pub root: Id,
    /// The root that was absorbed under `root`.
    pub absorbed: Id,
}

/// A disjoint-set forest over dense [`Id`] keys, with path compression
/// and union by rank.
///
/// The distinction between the surviving and the absorbed root in
/// [`union`](UnionFind::union) is part of the contract: the
/// [`EGraph`](crate::EGraph) relies on it to decide which e-class to
/// delete on a merge.
///
/// Keys out of range are a programmer error and panic.
#[derive(Clone, Default)]
pub struct UnionFind {
    parents: Vec<Cell<Id>>,
    ranks: Vec<u8>,
}

// we must manually implement debug because Cell<T> requires T: Copy
// to implement Debug, so we add that bound (implied by Id)
impl Debug for UnionFind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("UnionFind")
            .field("parents", &self.parents)
            .field("ranks", &self.ranks)
            .finish()
    }
}

impl UnionFind {
    /// Create a union-find with `n` singleton sets keyed `0..n`.
    pub fn new(n: usize) -> Self {
        let parents = (0..n).map(|i| Cell::new(Id::from(i))).collect();
        UnionFind {
            parents,
            ranks: vec![0; n],
        }
    }

    /// Allocate a fresh singleton set, returning its key.
    pub fn make_set(&mut self) -> Id {
        let new = Id::from(self.total_size());
        self.parents.push(Cell::new(new));
        self.ranks.push(0);
        new
    }

    /// The total number of keys ever allocated, joined or not.
    pub fn total_size(&self) -> usize {
        debug_assert_eq!(self.parents.len(), self.ranks.len());
        self.parents.len()
    }

    #[inline(always)]
    fn parent(&self, query: Id) -> Option<Id> {
        let parent = self.parents[usize::from(query)].get();
        if query == parent {
            None
        } else {
            Some(parent)
        }
    }

    fn just_find(&self, query: Id) -> Id {
        let mut current = query;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    /// The canonical representative of `query`'s set.
    ///
    /// Compresses the traversed chain with a second pass; the `Cell`s
    /// in `parents` let this happen behind a shared reference.
    pub fn find(&self, query: Id) -> Id {
        let root = self.just_find(query);

        // do simple path compression with another loop
        let mut current = query;
        while let Some(parent) = self.parent(current) {
            self.parents[usize::from(current)].set(root);
            current = parent;
        }

        current
    }

    /// Are `a` and `b` in the same set?
    pub fn connected(&self, a: Id, b: Id) -> bool {
        self.find(a) == self.find(b)
    }

    /// Join the sets of `set1` and `set2`.
    ///
    /// Returns `None` if they are already the same set. Otherwise the
    /// lower-ranked root is attached under the higher-ranked one; on a
    /// rank tie `set1`'s root survives and its rank is bumped.
    pub fn union(&mut self, set1: Id, set2: Id) -> Option<Union> {
        let root1 = self.find(set1);
        let root2 = self.find(set2);

        if root1 == root2 {
            return None;
        }

        let rank1 = self.ranks[usize::from(root1)];
        let rank2 = self.ranks[usize::from(root2)];
        let (root, absorbed) = if rank1 < rank2 {
            (root2, root1)
        } else {
            (root1, root2)
        };
        if rank1 == rank2 {
            self.ranks[usize::from(root)] += 1;
        }

        self.parents[usize::from(absorbed)].set(root);
        Some(Union { root, absorbed })
    }

    /// Group every key under its canonical representative.
    pub fn build_sets(&self) -> IndexMap<Id, IndexSet<Id>> {
        let mut map: IndexMap<Id, IndexSet<Id>> = IndexMap::default();

        for i in (0..self.total_size()).map(Id::from) {
            let leader = self.find(i);
            let actual_set = map.entry(leader).or_default();
            actual_set.insert(i);
        }

        map
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    use indexmap::{indexmap, indexset};

    fn id(i: usize) -> Id {
        Id::from(i)
    }

    #[test]
    fn union_find() {
        let n = 10;

        let mut uf = UnionFind::new(n);

        // test the initial condition of everyone in their own set
        for i in 0..n {
            assert_eq!(uf.parent(id(i)), None);
            assert_eq!(uf.find(id(i)), id(i));
            assert_eq!(uf.find(id(i)), id(i));
        }

        // make sure build_sets works
        let expected_sets = (0..n)
            .map(|i| (id(i), indexset!(id(i))))
            .collect::<IndexMap<_, _>>();
        assert_eq!(uf.build_sets(), expected_sets);

        // these should all merge into 0, whose rank is bumped by the
        // first tie
        assert_eq!(uf.union(id(0), id(1)).unwrap().root, id(0));
        assert_eq!(uf.union(id(1), id(2)).unwrap().root, id(0));
        assert_eq!(uf.union(id(3), id(2)).unwrap().root, id(0));

        // build up another set
        assert_eq!(uf.union(id(6), id(7)).unwrap().root, id(6));
        assert_eq!(uf.union(id(8), id(9)).unwrap().root, id(8));
        assert_eq!(uf.union(id(7), id(9)).unwrap().root, id(6));

        // make sure union on the same set returns None
        assert_eq!(uf.union(id(1), id(3)), None);
        assert_eq!(uf.union(id(7), id(8)), None);

        // check set structure
        let expected_sets = indexmap!(
            id(0) => indexset!(id(0), id(1), id(2), id(3)),
            id(4) => indexset!(id(4)),
            id(5) => indexset!(id(5)),
            id(6) => indexset!(id(6), id(7), id(8), id(9)),
        );
        assert_eq!(uf.build_sets(), expected_sets);

        // compress all paths
        for i in 0..n {
            // make sure the leader is a leader
            let leader = uf.find(id(i));
            assert_eq!(uf.parent(leader), None);

            // make sure the path is compressed
            assert_eq!(uf.parents[i].get(), leader);

            // make sure this didn't change the set structure
            assert_eq!(uf.build_sets(), expected_sets);
        }
    }

    #[test]
    fn connected_is_an_equivalence() {
        let mut uf = UnionFind::new(6);

        uf.union(id(0), id(1));
        uf.union(id(1), id(2));
        uf.union(id(4), id(5));

        // reflexivity
        for i in 0..6 {
            assert!(uf.connected(id(i), id(i)));
        }

        // symmetry
        for i in 0..6 {
            for j in 0..6 {
                assert_eq!(uf.connected(id(i), id(j)), uf.connected(id(j), id(i)));
            }
        }

        // transitivity via the chained unions above
        assert!(uf.connected(id(0), id(2)));
        assert!(!uf.connected(id(0), id(3)));
        assert!(!uf.connected(id(2), id(4)));
    }

    #[test]
    fn absorbed_side_is_reported() {
        let mut uf = UnionFind::new(4);

        // tie: the first argument's root survives
        let u = uf.union(id(2), id(3)).unwrap();
        assert_eq!(u, Union { root: id(2), absorbed: id(3) });

        // rank 1 vs rank 0: the ranked root survives even as the
        // second argument
        let u = uf.union(id(0), id(3)).unwrap();
        assert_eq!(u, Union { root: id(2), absorbed: id(0) });
    }

    /// Behavioral equivalence with a naive set-of-sets model under a
    /// fixed script of unions.
    #[test]
    fn matches_naive_model() {
        let n = 12;
        let script = [
            (0, 5),
            (5, 7),
            (2, 3),
            (3, 3),
            (7, 0),
            (9, 10),
            (11, 2),
            (1, 8),
            (8, 9),
            (4, 4),
            (10, 1),
        ];

        let mut uf = UnionFind::new(n);
        let mut model: Vec<IndexSet<usize>> =
            (0..n).map(|i| indexset!(i)).collect();

        for &(a, b) in &script {
            let joined = uf.union(id(a), id(b)).is_some();

            let sa = model.iter().position(|s| s.contains(&a)).unwrap();
            let sb = model.iter().position(|s| s.contains(&b)).unwrap();
            assert_eq!(joined, sa != sb);
            if sa != sb {
                let set = model.remove(sb);
                let sa = model.iter().position(|s| s.contains(&a)).unwrap();
                model[sa].extend(set);
            }

            for i in 0..n {
                for j in 0..n {
                    let in_model = model.iter().any(|s| s.contains(&i) && s.contains(&j));
                    assert_eq!(uf.connected(id(i), id(j)), in_model);
                }
            }
        }
    }
}
