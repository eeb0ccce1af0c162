//! Parser expressions: terminals, combinators, and the operators that
//! compose them
//!
//! A [`Parser`] is a cheap-to-clone handle to an immutable expression tree.
//! Terminals are the leaves; combinators are the inner nodes; the only cyclic
//! edges go through [`Rule`](crate::rule::Rule) references, which are
//! non-owning. Grammars read as algebra:
//!
//! ```text
//! let ident = letter.clone() >> many(letter | digit);
//! let kw = text("if") | text("in");
//! ```

use std::ops::{BitOr, Neg, Not, Shr};
use std::rc::Rc;

use crate::engine;
use crate::rule::RuleLink;
use crate::state::{ParseState, Verdict};

/// One node of a parser expression tree.
///
/// Values are immutable after construction; all mutable parse state lives on
/// the [`ParseState`].
pub(crate) enum Expr<T> {
    Literal(T),
    Range(T, T),
    Set(Vec<T>),
    LiteralSeq(Vec<T>),
    Any,
    Eof,
    Empty,
    Sequence(Vec<Parser<T>>),
    Choice(Vec<Parser<T>>),
    ZeroOrMore(Parser<T>),
    OneOrMore(Parser<T>),
    Optional(Parser<T>),
    Peek(Parser<T>),
    Not(Parser<T>),
    Tag { inner: Parser<T>, label: Rc<str> },
    RuleRef(RuleLink<T>),
}

/// A composable parser over elements of type `T`.
///
/// Cloning shares the underlying expression; combinator constructors take
/// their operands by value, so reusing a parser in two places means cloning
/// it first, as with any shared handle.
pub struct Parser<T> {
    expr: Rc<Expr<T>>,
}

impl<T> Clone for Parser<T> {
    fn clone(&self) -> Self {
        Parser {
            expr: Rc::clone(&self.expr),
        }
    }
}

impl<T> Parser<T> {
    pub(crate) fn new(expr: Expr<T>) -> Self {
        Parser {
            expr: Rc::new(expr),
        }
    }

    pub(crate) fn expr(&self) -> &Expr<T> {
        &self.expr
    }

    /// Wrap this parser so a successful subparse is recorded as a [`Match`]
    /// with the given label, spanning the consumed input and owning the
    /// matches produced inside it.
    ///
    /// [`Match`]: crate::matches::Match
    pub fn tag(self, label: impl Into<Rc<str>>) -> Parser<T> {
        Parser::new(Expr::Tag {
            inner: self,
            label: label.into(),
        })
    }
}

impl<T: PartialOrd> Parser<T> {
    /// Apply this parser at the state's current cursor.
    ///
    /// On acceptance the cursor has advanced past the consumed input; on any
    /// other verdict cursor and match list are unchanged.
    pub fn parse(&self, state: &mut ParseState<'_, T>) -> Verdict {
        engine::eval(self, state)
    }
}

// === Terminals ===

/// Match a single element equal to `element`.
pub fn literal<T>(element: T) -> Parser<T> {
    Parser::new(Expr::Literal(element))
}

/// Match a single element within `lo..=hi`.
pub fn range<T>(lo: T, hi: T) -> Parser<T> {
    Parser::new(Expr::Range(lo, hi))
}

/// Match a single element that is a member of `elements`.
pub fn set<T>(elements: impl IntoIterator<Item = T>) -> Parser<T> {
    Parser::new(Expr::Set(elements.into_iter().collect()))
}

/// Match a fixed sequence of elements, advancing past all of them at once.
pub fn literal_seq<T>(elements: impl IntoIterator<Item = T>) -> Parser<T> {
    Parser::new(Expr::LiteralSeq(elements.into_iter().collect()))
}

/// Match a literal string, character by character.
pub fn text(s: &str) -> Parser<char> {
    literal_seq(s.chars())
}

/// Match any single element.
pub fn any<T>() -> Parser<T> {
    Parser::new(Expr::Any)
}

/// Succeed only at the end of input; never consumes.
pub fn eof<T>() -> Parser<T> {
    Parser::new(Expr::Eof)
}

/// Always succeed without consuming.
pub fn empty<T>() -> Parser<T> {
    Parser::new(Expr::Empty)
}

// === Combinators ===

/// Zero or more repetitions; always succeeds. An iteration that succeeds
/// without advancing the cursor is rolled back and terminates the loop.
pub fn many<T>(parser: impl Into<Parser<T>>) -> Parser<T> {
    Parser::new(Expr::ZeroOrMore(parser.into()))
}

/// One or more repetitions; rejects if the first attempt rejects.
pub fn many1<T>(parser: impl Into<Parser<T>>) -> Parser<T> {
    Parser::new(Expr::OneOrMore(parser.into()))
}

/// Try the parser; on rejection succeed with no effect.
pub fn optional<T>(parser: impl Into<Parser<T>>) -> Parser<T> {
    Parser::new(Expr::Optional(parser.into()))
}

/// Positive lookahead: propagate the parser's verdict but never consume
/// input or record matches.
pub fn peek<T>(parser: impl Into<Parser<T>>) -> Parser<T> {
    Parser::new(Expr::Peek(parser.into()))
}

/// Negative lookahead: invert the parser's verdict, never consuming input.
pub fn not<T>(parser: impl Into<Parser<T>>) -> Parser<T> {
    Parser::new(Expr::Not(parser.into()))
}

// Chained `>>` and `|` flatten into one n-ary node, so `a >> b >> c` is a
// single sequence and an ordered choice sees all of its alternatives, which
// the left-recursion protocol depends on.
fn flat_sequence<T>(lhs: Parser<T>, rhs: Parser<T>) -> Parser<T> {
    let mut children = if let Expr::Sequence(items) = &*lhs.expr {
        items.clone()
    } else {
        vec![lhs]
    };
    if let Expr::Sequence(items) = &*rhs.expr {
        children.extend(items.iter().cloned());
    } else {
        children.push(rhs);
    }
    Parser::new(Expr::Sequence(children))
}

fn flat_choice<T>(lhs: Parser<T>, rhs: Parser<T>) -> Parser<T> {
    let mut children = if let Expr::Choice(items) = &*lhs.expr {
        items.clone()
    } else {
        vec![lhs]
    };
    if let Expr::Choice(items) = &*rhs.expr {
        children.extend(items.iter().cloned());
    } else {
        children.push(rhs);
    }
    Parser::new(Expr::Choice(children))
}

// === Operator Overloading ===

/// `>>` for sequence: both sides must match, in order.
impl<T> Shr<Parser<T>> for Parser<T> {
    type Output = Parser<T>;

    fn shr(self, rhs: Parser<T>) -> Parser<T> {
        flat_sequence(self, rhs)
    }
}

/// `>>` with a bare element on the right: `p >> 'x'`.
impl<T> Shr<T> for Parser<T> {
    type Output = Parser<T>;

    fn shr(self, rhs: T) -> Parser<T> {
        flat_sequence(self, literal(rhs))
    }
}

/// `|` for ordered choice: commit to the first alternative that matches.
impl<T> BitOr<Parser<T>> for Parser<T> {
    type Output = Parser<T>;

    fn bitor(self, rhs: Parser<T>) -> Parser<T> {
        flat_choice(self, rhs)
    }
}

/// `|` with a bare element on the right: `p | 'x'`.
impl<T> BitOr<T> for Parser<T> {
    type Output = Parser<T>;

    fn bitor(self, rhs: T) -> Parser<T> {
        flat_choice(self, literal(rhs))
    }
}

/// Unary `-` for optional.
impl<T> Neg for Parser<T> {
    type Output = Parser<T>;

    fn neg(self) -> Parser<T> {
        optional(self)
    }
}

/// Unary `!` for negative lookahead.
impl<T> Not for Parser<T> {
    type Output = Parser<T>;

    fn not(self) -> Parser<T> {
        crate::parser::not(self)
    }
}
