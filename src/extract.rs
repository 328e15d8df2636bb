use crate::{util::HashSet, EGraph, Id, Term};

/// The cost of a term: its node count.
pub type Cost = usize;

/// Extracts a minimum-size [`Term`] from an e-class.
///
/// Every node weighs one, so the cost of a term is `1 +` the cost of
/// its children and the smallest term is the one with the fewest nodes.
///
/// ```
/// use eqsat::{EGraph, Extractor, Term};
///
/// let mut egraph = EGraph::default();
/// let long: Term = "(+ x (+ 0 0))".parse().unwrap();
/// let short: Term = "(+ x 0)".parse().unwrap();
/// let root = egraph.add_term(&long);
/// let other = egraph.add_term(&short);
/// egraph.union(root, other);
/// egraph.rebuild();
///
/// let (size, best) = Extractor::new(&egraph).find_best(root);
/// assert_eq!(size, 3);
/// assert_eq!(best, short);
/// ```
#[derive(Debug)]
pub struct Extractor<'a> {
    egraph: &'a EGraph,
}

impl<'a> Extractor<'a> {
    /// Create an extractor for the given egraph.
    pub fn new(egraph: &'a EGraph) -> Self {
        Extractor { egraph }
    }

    /// The smallest term in `eclass` and its size.
    ///
    /// Every class created by [`EGraph::add_term`] contains at least
    /// one acyclic term (the one that was added), so extraction from
    /// such a class cannot fail. A class with no acyclic witness at all
    /// is a programmer error and panics.
    pub fn find_best(&self, eclass: Id) -> (Cost, Term) {
        let mut on_path = HashSet::default();
        self.extract(&mut on_path, Cost::MAX, eclass)
            .unwrap_or_else(|| panic!("no acyclic term in eclass {}", self.egraph.find(eclass)))
    }

    /// The core recursion: the smallest term in `eclass` of size at
    /// most `bound`, or `None` if there is none on an acyclic path.
    ///
    /// `None` here is pure control flow, it never escapes to the user.
    /// `on_path` holds the classes on the current recursion path;
    /// re-entering one would build an infinite term, so that branch is
    /// abandoned. The bound tightens as a candidate's children are
    /// summed up, pruning anything that can no longer beat the best
    /// term found so far.
    fn extract(&self, on_path: &mut HashSet<Id>, bound: Cost, eclass: Id) -> Option<(Cost, Term)> {
        let eclass = self.egraph.find(eclass);
        if bound == 0 || on_path.contains(&eclass) {
            return None;
        }
        on_path.insert(eclass);

        let mut best: Option<(Cost, Term)> = None;
        'nodes: for node in self.egraph[eclass].iter() {
            // only candidates strictly smaller than the best so far
            // are interesting
            let limit = match &best {
                Some((cost, _)) => cost - 1,
                None => bound,
            };

            let mut cost = 1;
            let mut children = Vec::with_capacity(node.len());
            for &child in &node.children {
                let budget = match limit.checked_sub(cost) {
                    Some(b) => b,
                    None => continue 'nodes,
                };
                match self.extract(on_path, budget, child) {
                    Some((child_cost, term)) => {
                        cost += child_cost;
                        children.push(term);
                    }
                    None => continue 'nodes,
                }
            }

            if cost <= limit {
                best = Some((cost, Term::new(node.op, children)));
            }
        }

        let popped = on_path.pop();
        debug_assert_eq!(popped, Some(eclass));
        best
    }
}
