use std::fmt::{self, Display};
use std::str::FromStr;

use smallvec::{smallvec, SmallVec};
use symbolic_expressions::Sexp;

use crate::{EGraph, Id, ParseError, Subst, Symbol, Term, Var};

/// A pattern: a term whose leaves may be [`Var`]s.
///
/// Patterns parse from the same s-expression syntax as [`Term`]s, with
/// atoms starting with `?` denoting variables. Operators cannot be
/// variables.
///
/// ```
/// use eqsat::Pattern;
///
/// let p: Pattern = "(+ ?x (* ?y ?x))".parse().unwrap();
/// assert_eq!(p.vars().len(), 2);
/// assert_eq!(p.to_string(), "(+ ?x (* ?y ?x))");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// A pattern variable.
    Var(Var),
    /// An operator applied to child patterns.
    Node(Symbol, Vec<Pattern>),
}

/// The result of searching one eclass with a [`Pattern`]: every
/// substitution under which the pattern is present in that class.
#[derive(Debug, Clone)]
pub struct SearchMatches {
    /// The matched eclass.
    pub eclass: Id,
    /// The substitutions, one per match.
    pub substs: Vec<Subst>,
}

impl Pattern {
    /// The variables occurring in this pattern, in first-occurrence
    /// order, deduplicated.
    pub fn vars(&self) -> Vec<Var> {
        fn walk(pat: &Pattern, vars: &mut Vec<Var>) {
            match pat {
                Pattern::Var(v) => {
                    if !vars.contains(v) {
                        vars.push(*v);
                    }
                }
                Pattern::Node(_, args) => {
                    for arg in args {
                        walk(arg, vars);
                    }
                }
            }
        }
        let mut vars = vec![];
        walk(self, &mut vars);
        vars
    }

    /// Search the whole egraph, returning matches for every eclass the
    /// pattern is present in.
    ///
    /// The returned matches are a snapshot: they stay valid (modulo
    /// [`EGraph::find`]) while the caller unions in right-hand sides.
    pub fn search(&self, egraph: &EGraph) -> Vec<SearchMatches> {
        egraph
            .classes()
            .filter_map(|class| self.search_eclass(egraph, class.id))
            .collect()
    }

    /// Search a single eclass.
    pub fn search_eclass(&self, egraph: &EGraph, eclass: Id) -> Option<SearchMatches> {
        let substs = self.search_pat(egraph, eclass, Subst::default());
        if substs.is_empty() {
            None
        } else {
            Some(SearchMatches {
                eclass,
                substs: substs.into_vec(),
            })
        }
    }

    /// Depth-first backtracking over the node set of `eclass`.
    ///
    /// A variable binds the canonical id on first sight and must agree
    /// with its binding afterwards; a node pattern tries every node of
    /// the class with the right operator and arity, threading the set
    /// of surviving substitutions through the children left to right.
    fn search_pat(&self, egraph: &EGraph, eclass: Id, subst: Subst) -> SmallVec<[Subst; 1]> {
        let eclass = egraph.find(eclass);
        match self {
            Pattern::Var(v) => match subst.get(*v) {
                None => {
                    let mut subst = subst;
                    subst.insert(*v, eclass);
                    smallvec![subst]
                }
                Some(&bound) if egraph.find(bound) == eclass => smallvec![subst],
                Some(_) => SmallVec::new(),
            },
            Pattern::Node(op, args) => {
                let mut matches = SmallVec::new();
                for node in egraph[eclass].iter() {
                    // wrong arity never matches, silently
                    if node.op != *op || node.len() != args.len() {
                        continue;
                    }
                    let mut candidates: SmallVec<[Subst; 1]> = smallvec![subst.clone()];
                    for (arg, &child) in args.iter().zip(&node.children) {
                        if candidates.is_empty() {
                            break;
                        }
                        let mut survived = SmallVec::new();
                        for candidate in candidates {
                            survived.extend(arg.search_pat(egraph, child, candidate));
                        }
                        candidates = survived;
                    }
                    matches.extend(candidates);
                }
                matches
            }
        }
    }

    pub(crate) fn to_sexp(&self) -> Sexp {
        match self {
            Pattern::Var(v) => Sexp::String(v.to_string()),
            Pattern::Node(op, args) => {
                let op = Sexp::String(op.to_string());
                if args.is_empty() {
                    op
                } else {
                    let mut vec = vec![op];
                    vec.extend(args.iter().map(Pattern::to_sexp));
                    Sexp::List(vec)
                }
            }
        }
    }
}

impl Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_sexp())
    }
}

impl FromStr for Pattern {
    type Err = ParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::parse::parse_pattern(s)
    }
}

impl From<&Term> for Pattern {
    fn from(term: &Term) -> Self {
        Pattern::Node(term.op, term.children.iter().map(Pattern::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ENode;

    #[test]
    fn simple_match() {
        crate::init_logger();
        let mut egraph = EGraph::default();

        let x = egraph.add(ENode::leaf("x"));
        let y = egraph.add(ENode::leaf("y"));
        let plus = egraph.add(ENode::new("+", vec![x, y]));

        let z = egraph.add(ENode::leaf("z"));
        let w = egraph.add(ENode::leaf("w"));
        let plus2 = egraph.add(ENode::new("+", vec![z, w]));

        egraph.union(plus, plus2);
        egraph.rebuild();

        let commute: Pattern = "(+ ?a ?b)".parse().unwrap();
        let matches = commute.search(&egraph);

        // one eclass matched, two ways
        assert_eq!(matches.len(), 1);
        assert_eq!(egraph.find(matches[0].eclass), egraph.find(plus));
        assert_eq!(matches[0].substs.len(), 2);

        let a: Var = "?a".parse().unwrap();
        let b: Var = "?b".parse().unwrap();
        for subst in &matches[0].substs {
            assert_eq!(subst.len(), 2);
            assert!(subst.get(a).is_some());
            assert!(subst.get(b).is_some());
        }
    }

    #[test]
    fn repeated_vars_constrain() {
        crate::init_logger();
        let mut egraph = EGraph::default();

        let a = egraph.add(ENode::leaf("a"));
        let b = egraph.add(ENode::leaf("b"));
        let faa = egraph.add(ENode::new("f", vec![a, a]));
        let fab = egraph.add(ENode::new("f", vec![a, b]));

        let pat: Pattern = "(f ?x ?x)".parse().unwrap();
        let matches = pat.search(&egraph);
        assert_eq!(matches.len(), 1);
        assert_eq!(egraph.find(matches[0].eclass), egraph.find(faa));

        // once a and b are the same class, both f-nodes match
        egraph.union(a, b);
        egraph.rebuild();
        let matches = pat.search(&egraph);
        assert_eq!(matches.len(), 1);
        assert_eq!(egraph.find(matches[0].eclass), egraph.find(fab));
    }

    #[test]
    fn arity_mismatch_is_silent() {
        crate::init_logger();
        let mut egraph = EGraph::default();

        let x = egraph.add(ENode::leaf("x"));
        let _fx = egraph.add(ENode::new("f", vec![x]));

        let pat: Pattern = "(f ?a ?b)".parse().unwrap();
        assert!(pat.search(&egraph).is_empty());
    }

    #[test]
    fn matches_are_sound() {
        crate::init_logger();
        let mut egraph = EGraph::default();

        let term: Term = "(+ (* a b) (* b a))".parse().unwrap();
        egraph.add_term(&term);

        let pat: Pattern = "(* ?x ?y)".parse().unwrap();
        for m in pat.search(&egraph) {
            for subst in &m.substs {
                let id = egraph.add_instantiation(subst, &pat);
                assert_eq!(egraph.find(id), egraph.find(m.eclass));
            }
        }
    }

    #[test]
    fn ground_pattern_finds_term() {
        crate::init_logger();
        let mut egraph = EGraph::default();

        let term: Term = "(g (h x))".parse().unwrap();
        let root = egraph.add_term(&term);

        let pat = Pattern::from(&term);
        let matches = pat.search(&egraph);
        assert_eq!(matches.len(), 1);
        assert_eq!(egraph.find(matches[0].eclass), egraph.find(root));
        assert!(matches[0].substs[0].is_empty());
    }
}
