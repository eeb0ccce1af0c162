//! Evaluation of parser expressions against a parse state
//!
//! Every combinator here obeys the same contract: on acceptance the cursor
//! has advanced past the consumed input and any matches are recorded; on
//! rejection cursor and match list are exactly as the caller left them. A
//! left-recursion verdict also restores the state before propagating, and is
//! resolved by the ordered-choice evaluator below.

use std::rc::Rc;

use crate::matches::Match;
use crate::parser::{Expr, Parser};
use crate::rule;
use crate::state::{ParseState, Recursion, RuleFrame, RuleId, Snapshot, Verdict};

pub(crate) fn eval<T: PartialOrd>(parser: &Parser<T>, st: &mut ParseState<'_, T>) -> Verdict {
    match parser.expr() {
        Expr::Literal(element) => expect_one(st, |e| e == element),
        Expr::Range(lo, hi) => expect_one(st, |e| lo <= e && e <= hi),
        Expr::Set(elements) => expect_one(st, |e| elements.contains(e)),
        Expr::Any => expect_one(st, |_| true),
        Expr::LiteralSeq(seq) => match st.lookahead(seq.len()) {
            Some(window) if window == &seq[..] => {
                st.advance_by(seq.len());
                Verdict::Accepted
            }
            _ => Verdict::Rejected,
        },
        Expr::Eof => {
            if st.at_end() {
                Verdict::Accepted
            } else {
                Verdict::Rejected
            }
        }
        Expr::Empty => Verdict::Accepted,
        Expr::Sequence(children) => eval_sequence(children, st),
        Expr::Choice(alternatives) => eval_choice(alternatives, st),
        Expr::ZeroOrMore(inner) => eval_repeat(inner, st, 0),
        Expr::OneOrMore(inner) => eval_repeat(inner, st, 1),
        Expr::Optional(inner) => eval_optional(inner, st),
        Expr::Peek(inner) => eval_peek(inner, st),
        Expr::Not(inner) => eval_not(inner, st),
        Expr::Tag { inner, label } => eval_tag(inner, label, st),
        Expr::RuleRef(link) => match link.upgrade() {
            Some(cell) => rule::dispatch(&cell, st),
            // dangling reference; validation reports this before a parse
            None => Verdict::Rejected,
        },
    }
}

// === Terminals ===

fn expect_one<T>(st: &mut ParseState<'_, T>, pred: impl FnOnce(&T) -> bool) -> Verdict {
    match st.peek() {
        Some(element) if pred(element) => {
            st.advance_by(1);
            Verdict::Accepted
        }
        _ => Verdict::Rejected,
    }
}

// === Composite parsers ===

fn eval_sequence<T: PartialOrd>(children: &[Parser<T>], st: &mut ParseState<'_, T>) -> Verdict {
    let snap = st.snapshot();
    for child in children {
        match eval(child, st) {
            Verdict::Accepted => {}
            verdict => {
                st.restore(snap);
                return verdict;
            }
        }
    }
    Verdict::Accepted
}

fn eval_repeat<T: PartialOrd>(inner: &Parser<T>, st: &mut ParseState<'_, T>, min: usize) -> Verdict {
    let mut count = 0usize;
    loop {
        let snap = st.snapshot();
        match eval(inner, st) {
            Verdict::Accepted => {
                count += 1;
                // an iteration that consumes nothing would never stop
                if st.position() == snap.position() {
                    st.restore(snap);
                    break;
                }
            }
            Verdict::Rejected => {
                st.restore(snap);
                break;
            }
            verdict => {
                st.restore(snap);
                return verdict;
            }
        }
    }
    if count >= min {
        Verdict::Accepted
    } else {
        Verdict::Rejected
    }
}

fn eval_optional<T: PartialOrd>(inner: &Parser<T>, st: &mut ParseState<'_, T>) -> Verdict {
    let snap = st.snapshot();
    match eval(inner, st) {
        Verdict::Accepted => Verdict::Accepted,
        Verdict::Rejected => {
            st.restore(snap);
            Verdict::Accepted
        }
        verdict => {
            st.restore(snap);
            verdict
        }
    }
}

fn eval_peek<T: PartialOrd>(inner: &Parser<T>, st: &mut ParseState<'_, T>) -> Verdict {
    let snap = st.snapshot();
    let verdict = eval(inner, st);
    st.restore(snap);
    verdict
}

fn eval_not<T: PartialOrd>(inner: &Parser<T>, st: &mut ParseState<'_, T>) -> Verdict {
    let snap = st.snapshot();
    let verdict = eval(inner, st);
    st.restore(snap);
    match verdict {
        Verdict::Accepted => Verdict::Rejected,
        Verdict::Rejected => Verdict::Accepted,
        verdict => verdict,
    }
}

fn eval_tag<T: PartialOrd>(
    inner: &Parser<T>,
    label: &Rc<str>,
    st: &mut ParseState<'_, T>,
) -> Verdict {
    let snap = st.snapshot();
    match eval(inner, st) {
        Verdict::Accepted => {
            let children = st.drain_matches(snap.match_count());
            st.push_match(Match::new(
                Rc::clone(label),
                snap.position(),
                st.position(),
                children,
            ));
            Verdict::Accepted
        }
        verdict => {
            st.restore(snap);
            verdict
        }
    }
}

// === Ordered choice and left recursion ===

fn eval_choice<T: PartialOrd>(alternatives: &[Parser<T>], st: &mut ParseState<'_, T>) -> Verdict {
    let snap = st.snapshot();
    for (index, alternative) in alternatives.iter().enumerate() {
        match eval(alternative, st) {
            Verdict::Accepted => return Verdict::Accepted,
            Verdict::Rejected => st.restore(snap),
            Verdict::LeftRecursion(id) => {
                st.restore(snap);
                return grow_left_recursion(alternatives, index, id, st, snap);
            }
        }
    }
    Verdict::Rejected
}

/// Resolve a left-recursion signal raised by `alternatives[index]`.
///
/// Seed: with the rule pinned to reject its own re-entry, the remaining
/// alternatives are attempted in order to produce a non-recursive base parse.
/// Grow: with the rule pinned to accept its own re-entry without consuming,
/// the recursive alternative is re-applied from the end of the seed until it
/// stops advancing, each round extending the parse further right.
fn grow_left_recursion<T: PartialOrd>(
    alternatives: &[Parser<T>],
    index: usize,
    id: RuleId,
    st: &mut ParseState<'_, T>,
    snap: Snapshot,
) -> Verdict {
    log::trace!("left recursion at {}, seeding", snap.position());
    let saved = st.replace_rule_frame(
        id,
        RuleFrame {
            mode: Recursion::Reject,
            position: Some(snap.position()),
        },
    );

    match eval_choice(&alternatives[index + 1..], st) {
        Verdict::Accepted => {}
        Verdict::Rejected => {
            // no seed here; let an outer choice try its own alternatives
            *st.rule_frame(id) = saved;
            st.restore(snap);
            return Verdict::LeftRecursion(id);
        }
        verdict => {
            *st.rule_frame(id) = saved;
            st.restore(snap);
            return verdict;
        }
    }

    log::trace!("seed accepted up to {}, growing", st.position());
    st.rule_frame(id).mode = Recursion::Accept;
    while !st.at_end() {
        let before = st.snapshot();
        st.rule_frame(id).position = Some(before.position());
        match eval(&alternatives[index], st) {
            Verdict::Accepted if st.position() > before.position() => {
                absorb_grown_match(st, snap.match_count(), before.match_count());
            }
            _ => {
                st.restore(before);
                break;
            }
        }
    }

    *st.rule_frame(id) = saved;
    Verdict::Accepted
}

/// Fold the match produced by a grow round over the one accumulated so far.
///
/// When a round appends exactly one record adjacent to the single record the
/// seed (or the previous round) left behind, the new record absorbs the old
/// one as its first child and stretches leftward over it. That turns
/// `1+2+3` under `expr = expr '+' num | num` into the left-leaning tree
/// `expr [0,5) { expr [0,3) { expr [0,1) } }`. Any other match shape is left
/// exactly as the round produced it.
fn absorb_grown_match<T>(st: &mut ParseState<'_, T>, base: usize, before_round: usize) {
    if before_round != base + 1 || st.match_count() != before_round + 1 {
        return;
    }
    match <[Match; 2]>::try_from(st.drain_matches(base)) {
        Ok([accumulated, mut grown]) if grown.begin == accumulated.end => {
            grown.begin = accumulated.begin;
            grown.children.insert(0, accumulated);
            st.push_match(grown);
        }
        Ok([accumulated, grown]) => {
            st.push_match(accumulated);
            st.push_match(grown);
        }
        Err(records) => {
            for record in records {
                st.push_match(record);
            }
        }
    }
}
