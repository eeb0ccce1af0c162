//! Sprout - parser combinators that grow through direct left recursion
//!
//! This library composes small recognizers into grammars written as
//! algebraic expressions: `>>` sequences, `|` chooses, [`many`]/[`many1`]
//! loop, `-` makes optional, `!` and [`peek`] look ahead, and
//! [`Parser::tag`] records labelled match spans. [`Rule`]s tie the knot for
//! recursive grammars and, unusually for a recursive-descent engine, accept
//! *direct left recursion*: a rule whose first step is itself is resolved by
//! seeding from its non-recursive alternatives and growing the parse
//! rightward.
//!
//! ```text
//! let expr = Rule::new("expr");
//! let num = many1(range('0', '9'));
//! expr.define((&expr >> '+' >> num.clone()).tag("expr") | num.tag("expr"));
//!
//! let input: Vec<char> = "1+2+3".chars().collect();
//! let outcome = parse(&expr, &input)?;     // left-leaning match tree
//! ```
//!
//! The engine is purely in-memory and single-threaded: expression trees are
//! immutable and shareable, while each parse owns a [`ParseState`].

pub mod error;
pub mod matches;
pub mod parser;
pub mod rule;
pub mod state;

mod engine;

pub use error::GrammarError;
pub use matches::Match;
pub use parser::{
    any, empty, eof, literal, literal_seq, many, many1, not, optional, peek, range, set, text,
    Parser,
};
pub use rule::Rule;
pub use state::{ParseState, RuleId, Snapshot, Verdict};

/// Result of a top-level parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOutcome {
    accepted: bool,
    position: usize,
    matches: Vec<Match>,
}

impl ParseOutcome {
    pub fn is_accepted(&self) -> bool {
        self.accepted
    }

    /// Cursor position reached: the end of the consumed input on acceptance
    /// (compare against the input length to detect partial consumption), or
    /// the furthest position any terminal reached on rejection.
    pub fn position(&self) -> usize {
        self.position
    }

    /// The ordered forest of match records; empty on rejection.
    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    pub fn into_matches(self) -> Vec<Match> {
        self.matches
    }
}

/// Parse `input` with `start` as the grammar's start rule.
///
/// The grammar is validated first: every rule reachable from `start` must be
/// alive and have a body. Rejection is not an error; it is an accepted
/// outcome value with [`ParseOutcome::is_accepted`] false and the furthest
/// cursor position reached.
pub fn parse<T: PartialOrd>(start: &Rule<T>, input: &[T]) -> Result<ParseOutcome, GrammarError> {
    start.validate()?;
    log::debug!(
        "parsing {} elements from rule `{}`",
        input.len(),
        start.name()
    );
    let mut state = ParseState::new(input);
    let verdict = rule::dispatch(start.cell(), &mut state);
    if verdict.is_accepted() {
        Ok(ParseOutcome {
            accepted: true,
            position: state.position(),
            matches: state.take_matches(),
        })
    } else {
        // a left-recursion signal that escapes the outermost rule rejects
        Ok(ParseOutcome {
            accepted: false,
            position: state.furthest(),
            matches: Vec::new(),
        })
    }
}
