use eqsat::{rewrite as rw, *};

fn saturate(start: &str, rules: &[Rewrite], iter_limit: usize) -> Runner {
    let _ = env_logger::builder().is_test(true).try_init();
    let start: Term = start.parse().unwrap();
    Runner::default()
        .with_iter_limit(iter_limit)
        .with_expr(&start)
        .run(rules)
}

fn best(runner: &Runner) -> (usize, Term) {
    Extractor::new(&runner.egraph).find_best(runner.roots[0])
}

#[test]
fn lone_atom() {
    let runner = saturate("a", &[], 16);
    assert!(matches!(runner.stop_reason, Some(StopReason::Saturated)));

    let (size, term) = best(&runner);
    assert_eq!(size, 1);
    assert_eq!(term.to_string(), "a");
}

#[test]
fn commute_add() {
    let rules = vec![rw!("commute-add"; "(+ ?x ?y)" => "(+ ?y ?x)")];
    let runner = saturate("(+ a b)", &rules, 4);
    assert!(matches!(runner.stop_reason, Some(StopReason::Saturated)));

    // both orders are size 3; which one wins is a tie-break we don't
    // pin down
    let (size, term) = best(&runner);
    assert_eq!(size, 3);
    let printed = term.to_string();
    assert!(
        printed == "(+ a b)" || printed == "(+ b a)",
        "unexpected best term {}",
        printed
    );

    let forward: Term = "(+ a b)".parse().unwrap();
    let flipped: Term = "(+ b a)".parse().unwrap();
    assert!(runner.egraph.equivs(&forward, &flipped));
}

#[test]
fn mul_div_cancel() {
    let rules = vec![
        rw!("mul-to-shift"; "(* ?x 2)" => "(<< ?x 1)"),
        rw!("reassoc-div"; "(/ (* ?x ?y) ?z)" => "(* ?x (/ ?y ?z))"),
        rw!("div-same"; "(/ ?x ?x)" => "1"),
        rw!("mul-one"; "(* ?x 1)" => "?x"),
    ];
    let runner = saturate("(/ (* a 2) 2)", &rules, 16);

    let (size, term) = best(&runner);
    assert_eq!(size, 1);
    assert_eq!(term.to_string(), "a");
}

#[test]
fn zero_annihilates() {
    let rules = vec![
        rw!("mul-zero"; "(* 0 ?x)" => "0"),
        rw!("add-zero"; "(+ 0 ?x)" => "?x"),
    ];
    let runner = saturate("(+ (* 0 x) y)", &rules, 16);

    let (size, term) = best(&runner);
    assert_eq!(size, 1);
    assert_eq!(term.to_string(), "y");
}

#[test]
fn double_to_times_two() {
    let rules = vec![rw!("double"; "(+ ?x ?x)" => "(* 2 ?x)")];
    let runner = saturate("(+ a a)", &rules, 16);

    // (+ a a) and (* 2 a) are both size 3; either may win the tie
    let (size, term) = best(&runner);
    assert_eq!(size, 3);
    let printed = term.to_string();
    assert!(
        printed == "(+ a a)" || printed == "(* 2 a)",
        "unexpected best term {}",
        printed
    );
}

#[test]
fn saturation_really_is_a_fixed_point() {
    let rules = vec![
        rw!("mul-to-shift"; "(* ?x 2)" => "(<< ?x 1)"),
        rw!("reassoc-div"; "(/ (* ?x ?y) ?z)" => "(* ?x (/ ?y ?z))"),
        rw!("div-same"; "(/ ?x ?x)" => "1"),
        rw!("mul-one"; "(* ?x 1)" => "?x"),
    ];
    let mut runner = saturate("(/ (* a 2) 2)", &rules, 16);
    assert!(matches!(runner.stop_reason, Some(StopReason::Saturated)));

    // one more sweep by hand must change neither count
    let classes = runner.egraph.number_of_classes();
    let nodes = runner.egraph.total_size();
    for rule in &rules {
        let matches = rule.search(&runner.egraph);
        rule.apply(&mut runner.egraph, &matches);
    }
    runner.egraph.rebuild();
    assert_eq!(runner.egraph.number_of_classes(), classes);
    assert_eq!(runner.egraph.total_size(), nodes);
}

#[test]
fn rules_prove_ground_equalities() {
    let rules = vec![
        rw!("commute-add"; "(+ ?x ?y)" => "(+ ?y ?x)"),
        rw!("assoc-add"; "(+ (+ ?x ?y) ?z)" => "(+ ?x (+ ?y ?z))"),
    ];
    let runner = saturate("(+ (+ a b) c)", &rules, 16);

    let left: Term = "(+ (+ a b) c)".parse().unwrap();
    let right: Term = "(+ a (+ b c))".parse().unwrap();
    let rotated: Term = "(+ c (+ a b))".parse().unwrap();
    assert!(runner.egraph.equivs(&left, &right));
    assert!(runner.egraph.equivs(&left, &rotated));

    let unrelated: Term = "(+ a b)".parse().unwrap();
    assert!(!runner.egraph.equivs(&left, &unrelated));
}

#[test]
fn matcher_agrees_with_instantiation() {
    let rules = vec![rw!("commute-add"; "(+ ?x ?y)" => "(+ ?y ?x)")];
    let mut runner = saturate("(+ (+ a b) (+ b a))", &rules, 16);

    // soundness: instantiating the matched pattern lands back in the
    // matched class
    let pattern: Pattern = "(+ ?x ?y)".parse().unwrap();
    let matches = pattern.search(&runner.egraph);
    assert!(!matches.is_empty());
    for m in &matches {
        for subst in &m.substs {
            let id = runner.egraph.add_instantiation(subst, &pattern);
            assert_eq!(runner.egraph.find(id), runner.egraph.find(m.eclass));
        }
    }
}
