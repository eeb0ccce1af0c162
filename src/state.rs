//! # Parse State Management
//!
//! This module provides the mutable context threaded through every parser:
//!
//! - **ParseState**: input cursor, match accumulator, and per-rule recursion
//!   bookkeeping
//! - **Snapshot**: a saved (cursor, match-list-length) pair for backtracking
//! - **Verdict**: the closed set of outcomes a parser can produce
//!
//! ## Backtracking
//!
//! Combinators that try alternatives snapshot the state before an attempt and
//! restore it when the attempt fails:
//!
//! ```text
//! let snap = state.snapshot();
//! match parser.parse(state) {
//!     Verdict::Accepted => ...,
//!     _ => state.restore(snap),   // cursor and matches roll back together
//! }
//! ```
//!
//! ## Furthest position
//!
//! Rollback means a rejected parse ends with the cursor back at its starting
//! point, which is useless for locating the problem. The state therefore
//! records the furthest position any terminal ever reached; the top-level
//! entry point reports it on rejection.
//!
//! ## Related Modules
//!
//! - [`crate::engine`] - combinator evaluation against this state
//! - [`crate::rule`] - rule dispatch, which owns the recursion frames stored here

use std::sync::atomic::{AtomicU32, Ordering};

use hashbrown::HashMap;

use crate::matches::Match;

/// Outcome of applying a parser at the current cursor.
///
/// `Accepted` and `Rejected` are ordinary verdicts. `LeftRecursion` is an
/// internal control-flow signal raised by a rule that is re-entered at the
/// same position; it unwinds to the nearest enclosing ordered choice, which
/// resolves it with the seed-and-grow protocol. If it escapes the outermost
/// rule, the parse rejects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Rejected,
    LeftRecursion(RuleId),
}

impl Verdict {
    pub fn is_accepted(self) -> bool {
        self == Verdict::Accepted
    }
}

/// Stable identity of a rule, used to key recursion state on the parse state.
///
/// Identities come from a process-wide counter so that rules can be compared
/// across grammars without reference juggling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuleId(u32);

impl RuleId {
    pub(crate) fn fresh() -> Self {
        static NEXT: AtomicU32 = AtomicU32::new(0);
        RuleId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// How a rule answers a re-entry at its recorded position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Recursion {
    /// Ordinary descent; a same-position re-entry raises the signal.
    #[default]
    Normal,
    /// Seed phase; a same-position re-entry rejects.
    Reject,
    /// Grow phase; a same-position re-entry accepts without consuming.
    Accept,
}

/// Recursion bookkeeping for one rule, held on the parse state so that the
/// rule itself stays immutable and shareable across parses.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct RuleFrame {
    pub(crate) mode: Recursion,
    /// Position the rule is currently being attempted at, if on the call stack.
    pub(crate) position: Option<usize>,
}

/// A saved restore point: cursor plus match-list length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    index: usize,
    matches: usize,
}

impl Snapshot {
    /// Cursor position at the time the snapshot was taken.
    pub fn position(self) -> usize {
        self.index
    }

    /// Match-list length at the time the snapshot was taken.
    pub fn match_count(self) -> usize {
        self.matches
    }
}

/// Mutable state of a single parse over a slice of input elements.
///
/// One `ParseState` serves exactly one parse; it is not thread-safe. The
/// expression tree being parsed with it is immutable and may be shared.
pub struct ParseState<'a, T> {
    input: &'a [T],
    index: usize,
    furthest: usize,
    matches: Vec<Match>,
    rules: HashMap<RuleId, RuleFrame>,
}

impl<'a, T> ParseState<'a, T> {
    pub fn new(input: &'a [T]) -> Self {
        Self {
            input,
            index: 0,
            furthest: 0,
            matches: Vec::new(),
            rules: HashMap::new(),
        }
    }

    /// Current cursor position (index of the next element to consume).
    pub fn position(&self) -> usize {
        self.index
    }

    /// The end-of-input sentinel; a valid cursor value, never dereferenced.
    pub fn end_position(&self) -> usize {
        self.input.len()
    }

    pub fn at_end(&self) -> bool {
        self.index >= self.input.len()
    }

    /// Furthest position any terminal has reached during this parse.
    pub fn furthest(&self) -> usize {
        self.furthest
    }

    /// Peek at the element under the cursor without consuming it.
    pub fn peek(&self) -> Option<&T> {
        self.input.get(self.index)
    }

    /// The next `n` elements, if that many remain.
    pub fn lookahead(&self, n: usize) -> Option<&[T]> {
        self.input.get(self.index..self.index + n)
    }

    /// Advance the cursor past `n` consumed elements.
    pub fn advance_by(&mut self, n: usize) {
        self.index += n;
        debug_assert!(self.index <= self.input.len());
        if self.index > self.furthest {
            self.furthest = self.index;
        }
    }

    /// Move the cursor to an absolute position within `[0, end]`.
    pub fn set_position(&mut self, position: usize) {
        debug_assert!(position <= self.input.len());
        self.index = position;
    }

    /// Capture a restore point covering cursor and match list.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            index: self.index,
            matches: self.matches.len(),
        }
    }

    /// Roll cursor and match list back to a previously captured snapshot.
    pub fn restore(&mut self, snapshot: Snapshot) {
        self.index = snapshot.index;
        self.matches.truncate(snapshot.matches);
    }

    pub fn push_match(&mut self, record: Match) {
        self.matches.push(record);
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    /// Matches accumulated so far, oldest first.
    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    pub fn truncate_matches(&mut self, len: usize) {
        self.matches.truncate(len);
    }

    /// Remove and return every match recorded at or after `from`.
    pub fn drain_matches(&mut self, from: usize) -> Vec<Match> {
        self.matches.split_off(from)
    }

    pub fn take_matches(&mut self) -> Vec<Match> {
        std::mem::take(&mut self.matches)
    }

    pub(crate) fn rule_frame(&mut self, id: RuleId) -> &mut RuleFrame {
        self.rules.entry(id).or_default()
    }

    pub(crate) fn replace_rule_frame(&mut self, id: RuleId, frame: RuleFrame) -> RuleFrame {
        std::mem::replace(self.rule_frame(id), frame)
    }
}
