use sprout::{many1, range, Parser, Rule};

fn chars(s: &str) -> Vec<char> {
    s.chars().collect()
}

/// `expr = expr '+' num | num`, both alternatives tagged `expr`.
fn sum_grammar() -> Rule<char> {
    let expr = Rule::new("expr");
    let num = many1(range('0', '9'));
    expr.define((&expr >> '+' >> num.clone()).tag("expr") | num.tag("expr"));
    expr
}

#[test]
fn left_recursive_sum_consumes_whole_input() {
    let input = chars("1+2+3");
    let outcome = sum_grammar().parse(&input).unwrap();
    assert!(outcome.is_accepted());
    assert_eq!(outcome.position(), 5);
}

#[test]
fn left_recursive_sum_builds_left_leaning_tree() {
    let input = chars("1+2+3");
    let outcome = sum_grammar().parse(&input).unwrap();

    let matches = outcome.matches();
    assert_eq!(matches.len(), 1);

    let outer = &matches[0];
    assert_eq!(outer.label(), "expr");
    assert_eq!(outer.span(), 0..5);
    assert_eq!(outer.children().len(), 1);

    let middle = &outer.children()[0];
    assert_eq!(middle.label(), "expr");
    assert_eq!(middle.span(), 0..3);
    assert_eq!(middle.children().len(), 1);

    let inner = &middle.children()[0];
    assert_eq!(inner.label(), "expr");
    assert_eq!(inner.span(), 0..1);
    assert!(inner.children().is_empty());
}

#[test]
fn seed_alone_accepts_without_growth() {
    let input = chars("1");
    let outcome = sum_grammar().parse(&input).unwrap();
    assert!(outcome.is_accepted());
    assert_eq!(outcome.position(), 1);
    assert_eq!(outcome.matches().len(), 1);
    assert_eq!(outcome.matches()[0].span(), 0..1);
}

#[test]
fn growth_stops_at_trailing_operator() {
    let input = chars("1+2+");
    let outcome = sum_grammar().parse(&input).unwrap();
    assert!(outcome.is_accepted());
    // the dangling '+' is left unconsumed
    assert_eq!(outcome.position(), 3);
}

#[test]
fn untagged_left_recursion_parses_without_matches() {
    let expr = Rule::new("expr");
    let num = many1(range('0', '9'));
    expr.define(&expr >> '+' >> num.clone() | num);

    let input = chars("1+2+3");
    let outcome = expr.parse(&input).unwrap();
    assert!(outcome.is_accepted());
    assert_eq!(outcome.position(), 5);
    assert!(outcome.matches().is_empty());
}

#[test]
fn recursion_without_an_alternative_rejects() {
    let loopy = Rule::new("loopy");
    loopy.define(&loopy >> 'a');

    let input = chars("aaa");
    let outcome = loopy.parse(&input).unwrap();
    assert!(!outcome.is_accepted());
    assert_eq!(outcome.position(), 0);
}

#[test]
fn left_recursive_parses_are_deterministic() {
    let input = chars("9+8+7+6");
    let grammar = sum_grammar();
    let first = grammar.parse(&input).unwrap();
    let second = grammar.parse(&input).unwrap();
    assert_eq!(first, second);
}

/// `expr = expr '+' term | term; term = term '*' num | num`
///
/// Both rules are returned: expressions hold rules through non-owning links,
/// so `term` has to stay alive for as long as `expr`'s body references it.
fn arith_grammar() -> (Rule<char>, Rule<char>) {
    let expr = Rule::new("expr");
    let term = Rule::new("term");
    let num = many1(range('0', '9'));
    term.define((&term >> '*' >> num.clone()).tag("term") | num.tag("term"));
    expr.define((&expr >> '+' >> Parser::from(&term)).tag("expr") | term.tag("expr"));
    (expr, term)
}

#[test]
fn nested_left_recursion_layers_operators() {
    let input = chars("1+2*3+4");
    let (expr, _term) = arith_grammar();
    let outcome = expr.parse(&input).unwrap();
    assert!(outcome.is_accepted());
    assert_eq!(outcome.position(), 7);

    let top = &outcome.matches()[0];
    assert_eq!(top.label(), "expr");
    assert_eq!(top.span(), 0..7);
    assert_eq!(top.children().len(), 2);
    assert_eq!(top.children()[0].span(), 0..5);
    assert_eq!(top.children()[1].label(), "term");
    assert_eq!(top.children()[1].span(), 6..7);

    let left = &top.children()[0];
    assert_eq!(left.label(), "expr");
    assert_eq!(left.children().len(), 2);
    assert_eq!(left.children()[0].span(), 0..1);

    // the multiplication grew inside its own rule
    let product = &left.children()[1];
    assert_eq!(product.label(), "term");
    assert_eq!(product.span(), 2..5);
    assert_eq!(product.children().len(), 1);
    assert_eq!(product.children()[0].span(), 2..3);
}

#[test]
fn nested_left_recursion_handles_plain_sums() {
    let input = chars("2*3*4");
    let (expr, _term) = arith_grammar();
    let outcome = expr.parse(&input).unwrap();
    assert!(outcome.is_accepted());
    assert_eq!(outcome.position(), 5);

    // expr's seed is the fully grown term
    let top = &outcome.matches()[0];
    assert_eq!(top.label(), "expr");
    assert_eq!(top.span(), 0..5);
    let product = &top.children()[0];
    assert_eq!(product.label(), "term");
    assert_eq!(product.span(), 0..5);
    assert_eq!(product.children()[0].span(), 0..3);
}
