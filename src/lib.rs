#![warn(missing_docs)]
/*!

`eqsat` is a little e-graph library for equality saturation over a
simple term language.

An [`EGraph`] compactly represents a large set of terms together with a
congruence relation over them. Starting from an initial [`Term`], the
[`Runner`] repeatedly matches the left-hand sides of a list of
[`Rewrite`]s against the e-graph and unions in the right-hand sides,
until nothing changes or an iteration budget runs out. The [`Extractor`]
then picks the smallest term represented by the initial term's e-class.

Terms and patterns are written as s-expressions; pattern variables are
atoms with a leading `?`:

```
use eqsat::{rewrite as rw, *};

let rules = &[
    rw!("mul-to-shift"; "(* ?x 2)" => "(<< ?x 1)"),
    rw!("reassoc-div"; "(/ (* ?x ?y) ?z)" => "(* ?x (/ ?y ?z))"),
    rw!("div-same"; "(/ ?x ?x)" => "1"),
    rw!("mul-one"; "(* ?x 1)" => "?x"),
];

let start: Term = "(/ (* a 2) 2)".parse().unwrap();
let runner = Runner::default().with_expr(&start).run(rules);
let (size, best) = Extractor::new(&runner.egraph).find_best(runner.roots[0]);

assert_eq!(best.to_string(), "a");
assert_eq!(size, 1);
```

## Logging

Many parts of `eqsat` dump useful logging info using the
[`log`](https://docs.rs/log/) crate. The easiest way to see this info is
to use the [`env_logger`](https://docs.rs/env_logger/) crate in your
binary or test. The simplest way to enable `env_logger` is to put the
following line near the top of your `main`: `env_logger::init();`.
Then, set the environment variable `RUST_LOG=eqsat=info`, or use `warn`
or `debug` instead of info for less or more logging.

*/

mod macros;

mod eclass;
mod egraph;
mod extract;
mod language;
mod parse;
mod pattern;
mod rewrite;
mod run;
mod subst;
mod unionfind;
mod util;

/// A key to identify [`EClass`]es within an
/// [`EGraph`].
///
/// Two `Id`s denote the same e-class iff the e-graph's union-find maps
/// them to the same root; always re-canonicalize through
/// [`EGraph::find`] before comparing ids that may have seen a union.
#[derive(Clone, Copy, Default, Ord, PartialOrd, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde-1", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-1", serde(transparent))]
pub struct Id(u32);

impl From<usize> for Id {
    fn from(n: usize) -> Id {
        Id(n as u32)
    }
}

impl From<Id> for usize {
    fn from(id: Id) -> usize {
        id.0 as usize
    }
}

impl std::fmt::Debug for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub use {
    eclass::EClass,
    egraph::EGraph,
    extract::{Cost, Extractor},
    language::{ENode, Term},
    parse::ParseError,
    pattern::{Pattern, SearchMatches},
    rewrite::Rewrite,
    run::{Iteration, Runner, StopReason},
    subst::{Subst, Var},
    unionfind::{Union, UnionFind},
    util::Symbol,
};

#[cfg(test)]
fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
