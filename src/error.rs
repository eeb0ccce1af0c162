//! Grammar construction errors
//!
//! Parse *rejection* is not an error; it is an ordinary [`Verdict`] carried
//! through to the [`ParseOutcome`]. The errors here cover grammar shapes the
//! engine refuses to run at all, detected by validation before a parse
//! starts.
//!
//! [`Verdict`]: crate::state::Verdict
//! [`ParseOutcome`]: crate::ParseOutcome

use thiserror::Error;

/// A grammar that cannot be parsed with, reported before any input is read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    /// A rule reachable from the start rule was never given a body.
    #[error("rule `{name}` has no body")]
    UnboundRule { name: String },

    /// An expression still references a rule that has been dropped.
    ///
    /// Expressions hold rules through non-owning handles, so dropping every
    /// `Rule` value for a rule while an expression still points at it leaves
    /// a dangling reference.
    #[error("rule `{name}` was dropped but is still referenced")]
    DroppedRule { name: String },
}
