use rstest::rstest;
use sprout::{any, empty, eof, literal, literal_seq, range, set, text, ParseState, Verdict};

fn chars(s: &str) -> Vec<char> {
    s.chars().collect()
}

#[test]
fn literal_matches_and_advances() {
    let input = chars("abc");
    let mut state = ParseState::new(&input);
    assert_eq!(literal('a').parse(&mut state), Verdict::Accepted);
    assert_eq!(state.position(), 1);
}

#[test]
fn literal_rejects_without_moving() {
    let input = chars("abc");
    let mut state = ParseState::new(&input);
    assert_eq!(literal('b').parse(&mut state), Verdict::Rejected);
    assert_eq!(state.position(), 0);
}

#[test]
fn literal_rejects_at_end_of_input() {
    let input = chars("");
    let mut state = ParseState::new(&input);
    assert_eq!(literal('a').parse(&mut state), Verdict::Rejected);
}

#[rstest]
#[case('0', true)]
#[case('5', true)]
#[case('9', true)]
#[case('a', false)]
#[case('/', false)]
fn range_bounds_are_inclusive(#[case] element: char, #[case] expected: bool) {
    let input = vec![element];
    let mut state = ParseState::new(&input);
    let verdict = range('0', '9').parse(&mut state);
    assert_eq!(verdict.is_accepted(), expected);
    assert_eq!(state.position(), usize::from(expected));
}

#[rstest]
#[case('+', true)]
#[case('-', true)]
#[case('*', true)]
#[case('x', false)]
fn set_matches_members_only(#[case] element: char, #[case] expected: bool) {
    let input = vec![element];
    let mut state = ParseState::new(&input);
    let verdict = set(['+', '-', '*', '/']).parse(&mut state);
    assert_eq!(verdict.is_accepted(), expected);
}

#[test]
fn literal_seq_advances_over_whole_sequence() {
    let input = chars("ifx");
    let mut state = ParseState::new(&input);
    assert_eq!(text("if").parse(&mut state), Verdict::Accepted);
    assert_eq!(state.position(), 2);
}

#[test]
fn literal_seq_rejects_on_partial_prefix() {
    let input = chars("i");
    let mut state = ParseState::new(&input);
    assert_eq!(text("if").parse(&mut state), Verdict::Rejected);
    assert_eq!(state.position(), 0);
}

#[test]
fn literal_seq_over_tokens() {
    let input = vec![1u32, 2, 3];
    let mut state = ParseState::new(&input);
    assert_eq!(literal_seq([1u32, 2]).parse(&mut state), Verdict::Accepted);
    assert_eq!(state.position(), 2);
}

#[test]
fn eof_accepts_only_at_end() {
    let input = chars("a");
    let mut state = ParseState::new(&input);
    assert_eq!(eof::<char>().parse(&mut state), Verdict::Rejected);
    state.advance_by(1);
    assert_eq!(eof::<char>().parse(&mut state), Verdict::Accepted);
    assert_eq!(state.position(), 1);
}

#[test]
fn empty_accepts_without_consuming() {
    let input = chars("abc");
    let mut state = ParseState::new(&input);
    assert_eq!(empty::<char>().parse(&mut state), Verdict::Accepted);
    assert_eq!(state.position(), 0);
}

#[test]
fn any_consumes_one_element_but_not_the_end() {
    let input = chars("x");
    let mut state = ParseState::new(&input);
    assert_eq!(any::<char>().parse(&mut state), Verdict::Accepted);
    assert_eq!(state.position(), 1);
    assert_eq!(any::<char>().parse(&mut state), Verdict::Rejected);
}
