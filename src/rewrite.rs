use log::*;

use crate::{EGraph, Pattern, SearchMatches};

/// A rewrite rule: wherever `lhs` matches, `rhs` is added and unioned
/// in.
///
/// Rewrites are usually built with the [`rewrite!`](crate::rewrite)
/// macro:
///
/// ```
/// use eqsat::rewrite;
///
/// let commute = rewrite!("commute-add"; "(+ ?x ?y)" => "(+ ?y ?x)");
/// assert_eq!(commute.name, "commute-add");
/// ```
#[derive(Debug, Clone)]
pub struct Rewrite {
    /// The name of the rewrite, for logging and iteration reports.
    pub name: String,
    /// The pattern to search for.
    pub lhs: Pattern,
    /// The pattern to instantiate and union in at every match.
    pub rhs: Pattern,
}

impl Rewrite {
    /// Create a rewrite, checking that every right-hand variable is
    /// bound on the left. A rule like `(f ?x) => (g ?y)` has no way to
    /// pick `?y` and is rejected.
    pub fn new(
        name: impl Into<String>,
        lhs: Pattern,
        rhs: Pattern,
    ) -> Result<Self, String> {
        let name = name.into();
        let bound = lhs.vars();
        for var in rhs.vars() {
            if !bound.contains(&var) {
                return Err(format!(
                    "rewrite {} refers to unbound variable {}",
                    name, var
                ));
            }
        }
        Ok(Rewrite { name, lhs, rhs })
    }

    /// All matches of the left-hand side, as a snapshot.
    pub fn search(&self, egraph: &EGraph) -> Vec<SearchMatches> {
        self.lhs.search(egraph)
    }

    /// Instantiate the right-hand side at every match and union it
    /// with the matched class. Returns the number of unions that
    /// changed the egraph.
    pub fn apply(&self, egraph: &mut EGraph, matches: &[SearchMatches]) -> usize {
        let mut applications = 0;
        for m in matches {
            for subst in &m.substs {
                let id = egraph.add_instantiation(subst, &self.rhs);
                if egraph.union(m.eclass, id) {
                    applications += 1;
                }
            }
        }
        debug!("applied {} {} times", self.name, applications);
        applications
    }
}
