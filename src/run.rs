use indexmap::IndexMap;
use instant::Instant;
use log::*;

use crate::{EGraph, Id, Rewrite, Term};

/** Facilitates running rewrites over an [`EGraph`].

Since an egraph never "forgets" state when applying a [`Rewrite`], it
can absorb many rewrites applied many times. Once a full sweep of the
rules no longer changes the egraph, it compactly represents every term
reachable from the initial one under the rules, and is ready for
extraction with an [`Extractor`](crate::Extractor). This technique is
called equality saturation.

`Runner` is the outer loop of that process. Per iteration it sweeps the
rules in order (for each rule, all matches are searched first, then
applied), rebuilds the egraph, and checks whether to stop:

- *Saturation.* If neither the number of e-classes nor the number of
  e-nodes changed over the sweep, no rule can ever fire again to any
  effect, and the run stops with [`StopReason::Saturated`].

- *Iteration limit.* A safety cap (default 16) for rule sets that never
  saturate, like `x => (+ x 0)`. Stops with
  [`StopReason::IterationLimit`].

- *Node limit.* A cap on the size of the hashcons (default 10 000), for
  rule sets that saturate only after exhausting memory. Stops with
  [`StopReason::NodeLimit`].

# Example
```
use eqsat::{rewrite as rw, *};

let rules = &[
    rw!("mul-zero"; "(* 0 ?x)" => "0"),
    rw!("add-zero"; "(+ 0 ?x)" => "?x"),
];

let start: Term = "(+ (* 0 x) y)".parse().unwrap();
let runner = Runner::default().with_expr(&start).run(rules);

assert!(matches!(runner.stop_reason, Some(StopReason::Saturated)));
let (_, best) = Extractor::new(&runner.egraph).find_best(runner.roots[0]);
assert_eq!(best.to_string(), "y");
```
*/
pub struct Runner {
    /// The [`EGraph`] used.
    pub egraph: EGraph,
    /// The roots of terms added by [`with_expr`](Runner::with_expr), in
    /// insertion order.
    pub roots: Vec<Id>,
    /// Data accumulated over each [`Iteration`].
    pub iterations: Vec<Iteration>,
    /// Why the `Runner` stopped. This will be `None` if it hasn't
    /// stopped yet.
    pub stop_reason: Option<StopReason>,

    iter_limit: usize,
    node_limit: usize,
}

impl Default for Runner {
    fn default() -> Self {
        Runner {
            egraph: EGraph::default(),
            roots: vec![],
            iterations: vec![],
            stop_reason: None,

            iter_limit: 16,
            node_limit: 10_000,
        }
    }
}

/// Why a [`Runner`] stopped.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde-1", derive(serde::Serialize))]
pub enum StopReason {
    /// The egraph saturated: a full sweep of the rules changed neither
    /// the e-class count nor the e-node count.
    Saturated,
    /// The iteration limit was hit. The data is the iteration limit.
    IterationLimit(usize),
    /// The e-node limit was hit. The data is the e-node limit.
    NodeLimit(usize),
}

/// Data generated by running a [`Runner`] one iteration.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Iteration {
    /// The number of enodes in the egraph at the end of this iteration.
    pub egraph_nodes: usize,
    /// The number of eclasses in the egraph at the end of this
    /// iteration.
    pub egraph_classes: usize,
    /// A map from rule name to number of times its application changed
    /// the egraph in this iteration.
    pub applied: IndexMap<String, usize>,
    /// Seconds spent searching in this iteration.
    pub search_time: f64,
    /// Seconds spent applying rules in this iteration.
    pub apply_time: f64,
    /// Seconds spent [`rebuild`](EGraph::rebuild)ing the egraph in this
    /// iteration.
    pub rebuild_time: f64,
}

type RunnerResult<T> = std::result::Result<T, StopReason>;

impl Runner {
    /// Sets the iteration limit. Default: 16
    pub fn with_iter_limit(self, iter_limit: usize) -> Self {
        Self { iter_limit, ..self }
    }

    /// Sets the egraph size limit (in enodes). Default: 10,000
    pub fn with_node_limit(self, node_limit: usize) -> Self {
        Self { node_limit, ..self }
    }

    /// Add a term to the egraph to be run.
    ///
    /// The eclass id of this addition will be recorded in the
    /// [`roots`](Runner::roots) field, ordered by insertion order.
    pub fn with_expr(mut self, term: &Term) -> Self {
        let id = self.egraph.add_term(term);
        self.roots.push(id);
        self
    }

    /// Run this `Runner` until it stops. After this, the field
    /// [`stop_reason`](Runner::stop_reason) is guaranteed to be set.
    pub fn run(mut self, rules: &[Rewrite]) -> Self {
        check_rules(rules);
        self.egraph.rebuild();
        loop {
            if let Err(stop_reason) = self.run_one(rules) {
                info!("stopping: {:?}", stop_reason);
                self.stop_reason = Some(stop_reason);
                break;
            }
        }
        self
    }

    fn run_one(&mut self, rules: &[Rewrite]) -> RunnerResult<()> {
        let iteration = self.iterations.len();
        if iteration >= self.iter_limit {
            return Err(StopReason::IterationLimit(self.iter_limit));
        }

        let classes_before = self.egraph.number_of_classes();
        let nodes_before = self.egraph.total_size();

        let mut applied = IndexMap::default();
        let mut search_time = 0.0;
        let mut apply_time = 0.0;

        // rules fire in input order; within a rule, all matches are
        // snapshotted before any right-hand side goes in
        for rule in rules {
            let start = Instant::now();
            let matches = rule.search(&self.egraph);
            search_time += start.elapsed().as_secs_f64();

            let start = Instant::now();
            let n = rule.apply(&mut self.egraph, &matches);
            apply_time += start.elapsed().as_secs_f64();

            if n > 0 {
                applied.insert(rule.name.clone(), n);
            }
        }

        let start = Instant::now();
        self.egraph.rebuild();
        let rebuild_time = start.elapsed().as_secs_f64();

        let classes_after = self.egraph.number_of_classes();
        let nodes_after = self.egraph.total_size();
        info!(
            "iteration {}: {} classes, {} nodes, applied {:?}",
            iteration, classes_after, nodes_after, applied
        );

        self.iterations.push(Iteration {
            egraph_nodes: nodes_after,
            egraph_classes: classes_after,
            applied,
            search_time,
            apply_time,
            rebuild_time,
        });

        if (classes_before, nodes_before) == (classes_after, nodes_after) {
            return Err(StopReason::Saturated);
        }
        if nodes_after > self.node_limit {
            return Err(StopReason::NodeLimit(self.node_limit));
        }
        Ok(())
    }
}

fn check_rules(rules: &[Rewrite]) {
    let mut names = std::collections::HashSet::new();
    for rule in rules {
        if !names.insert(rule.name.as_str()) {
            warn!("two rules are named {}", rule.name);
        }
    }
}
