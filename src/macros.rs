/** A macro to easily create a [`Rewrite`](crate::Rewrite).

The `;` after the name and the `=>` between the patterns mirror how a
rule reads on paper:

```
use eqsat::rewrite;

let rules = vec![
    rewrite!("commute-add"; "(+ ?x ?y)" => "(+ ?y ?x)"),
    rewrite!("mul-one"; "(* ?x 1)" => "?x"),
];
assert_eq!(rules.len(), 2);
```

Both sides must parse as patterns and every right-hand variable must be
bound on the left; violations panic at construction time, which is
where you want to hear about a malformed rule.
*/
#[macro_export]
macro_rules! rewrite {
    ($name:expr; $lhs:literal => $rhs:literal) => {{
        let lhs: $crate::Pattern = $lhs.parse().unwrap();
        let rhs: $crate::Pattern = $rhs.parse().unwrap();
        $crate::Rewrite::new($name, lhs, rhs).unwrap()
    }};
}
