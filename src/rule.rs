//! Grammar rules: named, shareable, late-bindable parser expressions
//!
//! Rules are the only cycle-admitting nodes in an expression graph. A rule
//! owns its body behind a late-bindable cell; expressions refer back to rules
//! through non-owning links, so `expr = expr '+' num | num` builds without an
//! ownership cycle. Rules also implement the entry side of the
//! left-recursion protocol: a re-entry at an unchanged cursor is answered
//! from the rule's recursion frame instead of descending again.

use std::cell::RefCell;
use std::ops::{BitOr, Neg, Not, Shr};
use std::rc::{Rc, Weak};

use hashbrown::HashSet;

use crate::engine;
use crate::error::GrammarError;
use crate::parser::{Expr, Parser};
use crate::state::{ParseState, Recursion, RuleFrame, RuleId, Verdict};
use crate::ParseOutcome;

pub(crate) struct RuleCell<T> {
    pub(crate) id: RuleId,
    pub(crate) name: Rc<str>,
    pub(crate) body: RefCell<Option<Parser<T>>>,
}

/// A non-owning edge from an expression back into a rule.
pub(crate) struct RuleLink<T> {
    cell: Weak<RuleCell<T>>,
    pub(crate) id: RuleId,
    pub(crate) name: Rc<str>,
}

impl<T> RuleLink<T> {
    pub(crate) fn upgrade(&self) -> Option<Rc<RuleCell<T>>> {
        self.cell.upgrade()
    }
}

impl<T> Clone for RuleLink<T> {
    fn clone(&self) -> Self {
        RuleLink {
            cell: Weak::clone(&self.cell),
            id: self.id,
            name: Rc::clone(&self.name),
        }
    }
}

/// A named grammar rule.
///
/// Rules exist before their bodies do, which is what makes recursive and
/// forward-referencing grammars expressible:
///
/// ```text
/// let expr = Rule::new("expr");
/// let num = many1(range('0', '9'));
/// expr.define(&expr >> '+' >> num.clone() | num);
/// ```
///
/// Cloning a rule shares it. The expression graph reachable from a rule is
/// immutable during parsing and may be reused across parses; per-parse
/// recursion state lives on the [`ParseState`], keyed by the rule's identity.
///
/// Expressions hold rules through *non-owning* links (that is what lets a
/// body refer back to its own rule without leaking), so every rule must
/// outlive the parsers that reference it; validation reports a
/// [`GrammarError::DroppedRule`] otherwise.
pub struct Rule<T> {
    cell: Rc<RuleCell<T>>,
}

impl<T> Clone for Rule<T> {
    fn clone(&self) -> Self {
        Rule {
            cell: Rc::clone(&self.cell),
        }
    }
}

impl<T> Rule<T> {
    /// Create a rule with no body yet.
    pub fn new(name: impl Into<Rc<str>>) -> Self {
        Rule {
            cell: Rc::new(RuleCell {
                id: RuleId::fresh(),
                name: name.into(),
                body: RefCell::new(None),
            }),
        }
    }

    /// Bind (or rebind) the rule's body. The body may refer to the rule
    /// itself or to rules that are still undefined; validation happens when
    /// a parse starts.
    pub fn define(&self, body: impl Into<Parser<T>>) {
        *self.cell.body.borrow_mut() = Some(body.into());
    }

    pub fn name(&self) -> &str {
        &self.cell.name
    }

    pub fn is_defined(&self) -> bool {
        self.cell.body.borrow().is_some()
    }

    /// A tagged reference to this rule, equivalent to
    /// `Parser::from(rule).tag(label)`.
    pub fn tag(&self, label: impl Into<Rc<str>>) -> Parser<T> {
        Parser::from(self).tag(label)
    }

    pub(crate) fn cell(&self) -> &RuleCell<T> {
        &self.cell
    }
}

impl<T: PartialOrd> Rule<T> {
    /// Parse `input` with this rule as the grammar start. See [`crate::parse`].
    pub fn parse(&self, input: &[T]) -> Result<ParseOutcome, GrammarError> {
        crate::parse(self, input)
    }

    /// Check that every rule reachable from this one is alive and has a body.
    pub fn validate(&self) -> Result<(), GrammarError> {
        let mut seen: HashSet<RuleId> = HashSet::new();
        let mut pending: Vec<Parser<T>> = Vec::new();
        seen.insert(self.cell.id);
        match &*self.cell.body.borrow() {
            Some(body) => pending.push(body.clone()),
            None => {
                return Err(GrammarError::UnboundRule {
                    name: self.name().to_string(),
                })
            }
        }

        while let Some(parser) = pending.pop() {
            match parser.expr() {
                Expr::Sequence(children) | Expr::Choice(children) => {
                    pending.extend(children.iter().cloned());
                }
                Expr::ZeroOrMore(inner)
                | Expr::OneOrMore(inner)
                | Expr::Optional(inner)
                | Expr::Peek(inner)
                | Expr::Not(inner)
                | Expr::Tag { inner, .. } => pending.push(inner.clone()),
                Expr::RuleRef(link) => {
                    if seen.insert(link.id) {
                        let Some(cell) = link.upgrade() else {
                            return Err(GrammarError::DroppedRule {
                                name: link.name.to_string(),
                            });
                        };
                        match &*cell.body.borrow() {
                            Some(body) => pending.push(body.clone()),
                            None => {
                                return Err(GrammarError::UnboundRule {
                                    name: link.name.to_string(),
                                })
                            }
                        };
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Referencing a rule in an expression creates a non-owning link to it.
impl<T> From<&Rule<T>> for Parser<T> {
    fn from(rule: &Rule<T>) -> Self {
        Parser::new(Expr::RuleRef(RuleLink {
            cell: Rc::downgrade(&rule.cell),
            id: rule.cell.id,
            name: Rc::clone(&rule.cell.name),
        }))
    }
}

// === Rule dispatch and the left-recursion entry check ===

/// Invoke a rule at the current cursor.
///
/// A re-entry at the position already recorded for the rule is direct left
/// recursion and is answered from the recursion frame: `Normal` raises the
/// signal for the nearest enclosing choice, `Reject` fails the seed-phase
/// descent, `Accept` stands in for the already-parsed seed without consuming
/// anything. A first entry records its position, runs the body, and restores
/// the previous frame so that unrelated parses of the same rule through
/// other call paths cannot interfere.
pub(crate) fn dispatch<T: PartialOrd>(cell: &RuleCell<T>, st: &mut ParseState<'_, T>) -> Verdict {
    let at = st.position();
    let frame = *st.rule_frame(cell.id);
    if frame.position == Some(at) {
        return match frame.mode {
            Recursion::Normal => Verdict::LeftRecursion(cell.id),
            Recursion::Reject => Verdict::Rejected,
            Recursion::Accept => Verdict::Accepted,
        };
    }

    let body = cell.body.borrow().clone();
    let Some(body) = body else {
        // unbound body; validation reports this before a parse
        return Verdict::Rejected;
    };

    let saved = st.replace_rule_frame(
        cell.id,
        RuleFrame {
            mode: Recursion::Normal,
            position: Some(at),
        },
    );
    let verdict = engine::eval(&body, st);
    *st.rule_frame(cell.id) = saved;
    verdict
}

// === Operators on rule references ===
//
// Rules appear directly in operator positions so grammars read the same
// whether an operand is a rule or a plain parser.

impl<T> Shr<Parser<T>> for &Rule<T> {
    type Output = Parser<T>;

    fn shr(self, rhs: Parser<T>) -> Parser<T> {
        Parser::from(self) >> rhs
    }
}

impl<T> Shr<&Rule<T>> for Parser<T> {
    type Output = Parser<T>;

    fn shr(self, rhs: &Rule<T>) -> Parser<T> {
        self >> Parser::from(rhs)
    }
}

impl<T> Shr<&Rule<T>> for &Rule<T> {
    type Output = Parser<T>;

    fn shr(self, rhs: &Rule<T>) -> Parser<T> {
        Parser::from(self) >> Parser::from(rhs)
    }
}

impl<T> Shr<T> for &Rule<T> {
    type Output = Parser<T>;

    fn shr(self, rhs: T) -> Parser<T> {
        Parser::from(self) >> rhs
    }
}

impl<T> BitOr<Parser<T>> for &Rule<T> {
    type Output = Parser<T>;

    fn bitor(self, rhs: Parser<T>) -> Parser<T> {
        Parser::from(self) | rhs
    }
}

impl<T> BitOr<&Rule<T>> for Parser<T> {
    type Output = Parser<T>;

    fn bitor(self, rhs: &Rule<T>) -> Parser<T> {
        self | Parser::from(rhs)
    }
}

impl<T> BitOr<&Rule<T>> for &Rule<T> {
    type Output = Parser<T>;

    fn bitor(self, rhs: &Rule<T>) -> Parser<T> {
        Parser::from(self) | Parser::from(rhs)
    }
}

impl<T> BitOr<T> for &Rule<T> {
    type Output = Parser<T>;

    fn bitor(self, rhs: T) -> Parser<T> {
        Parser::from(self) | rhs
    }
}

impl<T> Neg for &Rule<T> {
    type Output = Parser<T>;

    fn neg(self) -> Parser<T> {
        -Parser::from(self)
    }
}

impl<T> Not for &Rule<T> {
    type Output = Parser<T>;

    fn not(self) -> Parser<T> {
        !Parser::from(self)
    }
}
