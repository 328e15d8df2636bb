use eqsat::{rewrite as rw, Extractor, Runner, Term};

fn main() {
    env_logger::init();

    let rules = vec![
        rw!("mul-to-shift"; "(* ?x 2)" => "(<< ?x 1)"),
        rw!("reassoc-div"; "(/ (* ?x ?y) ?z)" => "(* ?x (/ ?y ?z))"),
        rw!("div-same"; "(/ ?x ?x)" => "1"),
        rw!("mul-one"; "(* ?x 1)" => "?x"),
    ];

    let start: Term = "(/ (* a 2) 2)".parse().unwrap();
    println!("start: {} (size {})", start, start.size());

    let runner = Runner::default().with_expr(&start).run(&rules);
    let stop_reason = runner.stop_reason.as_ref().unwrap();
    println!(
        "stopped after {} iterations ({:?}): {} classes, {} nodes",
        runner.iterations.len(),
        stop_reason,
        runner.egraph.number_of_classes(),
        runner.egraph.total_size(),
    );

    let extractor = Extractor::new(&runner.egraph);
    let (size, best) = extractor.find_best(runner.roots[0]);
    println!("best:  {} (size {})", best, size);
}
