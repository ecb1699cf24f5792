//! The expression tree shared by preconditions, effects and task-network guards.
//!
//! A single tagged node (see [`Connective`]) replaces the class hierarchy a parser written in an
//! object-oriented style would use for `Atom`, `And`, `Forall`, `Increase`, etc. Every traversal
//! in this crate is a `match` on [`ExprNode::connective`]; fields that a given connective does not
//! use carry a sentinel (`None`, or an empty `children` vector) rather than being folded into a
//! separate struct per connective.

use smallvec::SmallVec;
use std::fmt;

use crate::ids::{PredicateId, TypeId, VarId};

pub type ArgVec = SmallVec<[i32; 4]>;

/// The closed set of connectives an [`ExprNode`] can carry.
///
/// Boolean and quantified connectives are the ones this crate rewrites (see
/// [`crate::simplify`]); temporal, arithmetic and assignment connectives are carried through
/// structurally and are only ever recursed into, never rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Connective {
    Atom,
    And,
    Or,
    Not,
    Forall,
    Exists,
    When,
    AtStart,
    AtEnd,
    OverAll,
    Always,
    Sometime,
    AtMostOnce,
    SometimeBefore,
    SometimeAfter,
    Within,
    HoldAfter,
    HoldDuring,
    AlwaysWithin,
    EqualAtom,
    FnHead,
    FnAtom,
    DurationAtom,
    Plus,
    Minus,
    Mul,
    Div,
    UMinus,
    Less,
    LessOrEqual,
    Equal,
    Greater,
    GreaterOrEqual,
    Assign,
    Increase,
    Decrease,
    ScaleUp,
    ScaleDown,
    FExp,
    FExpT,
    TimeVar,
    Number,
    Minimize,
    Maximize,
    IsViolated,
    True,
    False,
}

impl Connective {
    /// The spec's own name for this connective (§3), used in [`crate::errors::PreinstantiationError::MalformedExpression`].
    fn name(self) -> &'static str {
        match self {
            Connective::Atom => "ATOM",
            Connective::And => "AND",
            Connective::Or => "OR",
            Connective::Not => "NOT",
            Connective::Forall => "FORALL",
            Connective::Exists => "EXISTS",
            Connective::When => "WHEN",
            Connective::AtStart => "AT_START",
            Connective::AtEnd => "AT_END",
            Connective::OverAll => "OVER_ALL",
            Connective::Always => "ALWAYS",
            Connective::Sometime => "SOMETIME",
            Connective::AtMostOnce => "AT_MOST_ONCE",
            Connective::SometimeBefore => "SOMETIME_BEFORE",
            Connective::SometimeAfter => "SOMETIME_AFTER",
            Connective::Within => "WITHIN",
            Connective::HoldAfter => "HOLD_AFTER",
            Connective::HoldDuring => "HOLD_DURING",
            Connective::AlwaysWithin => "ALWAYS_WITHIN",
            Connective::EqualAtom => "EQUAL_ATOM",
            Connective::FnHead => "FN_HEAD",
            Connective::FnAtom => "FN_ATOM",
            Connective::DurationAtom => "DURATION_ATOM",
            Connective::Plus => "PLUS",
            Connective::Minus => "MINUS",
            Connective::Mul => "MUL",
            Connective::Div => "DIV",
            Connective::UMinus => "UMINUS",
            Connective::Less => "LESS",
            Connective::LessOrEqual => "LESS_OR_EQUAL",
            Connective::Equal => "EQUAL",
            Connective::Greater => "GREATER",
            Connective::GreaterOrEqual => "GREATER_OR_EQUAL",
            Connective::Assign => "ASSIGN",
            Connective::Increase => "INCREASE",
            Connective::Decrease => "DECREASE",
            Connective::ScaleUp => "SCALE_UP",
            Connective::ScaleDown => "SCALE_DOWN",
            Connective::FExp => "F_EXP",
            Connective::FExpT => "F_EXP_T",
            Connective::TimeVar => "TIME_VAR",
            Connective::Number => "NUMBER",
            Connective::Minimize => "MINIMIZE",
            Connective::Maximize => "MAXIMIZE",
            Connective::IsViolated => "IS_VIOLATED",
            Connective::True => "TRUE",
            Connective::False => "FALSE",
        }
    }

    /// The minimum number of children a node tagged with this connective needs to be
    /// structurally meaningful (§7 `MalformedExpression`: "connective requires more children
    /// than present"). `AND`/`OR` have no minimum — the empty conjunction/disjunction are
    /// degenerate but well-formed; leaf connectives (`ATOM`, `NUMBER`, `TRUE`, ...) carry their
    /// payload outside `children` and likewise require none.
    fn required_children(self) -> usize {
        match self {
            Connective::Not
            | Connective::Forall
            | Connective::Exists
            | Connective::AtStart
            | Connective::AtEnd
            | Connective::OverAll
            | Connective::Always
            | Connective::Sometime
            | Connective::AtMostOnce
            | Connective::SometimeBefore
            | Connective::SometimeAfter
            | Connective::Within
            | Connective::HoldAfter
            | Connective::UMinus
            | Connective::Minimize
            | Connective::Maximize => 1,
            Connective::When
            | Connective::Plus
            | Connective::Minus
            | Connective::Mul
            | Connective::Div
            | Connective::Less
            | Connective::LessOrEqual
            | Connective::Equal
            | Connective::Greater
            | Connective::GreaterOrEqual
            | Connective::Assign
            | Connective::Increase
            | Connective::Decrease
            | Connective::ScaleUp
            | Connective::ScaleDown => 2,
            // children 0, 1 and 3 are dereferenced by scan/substitute (§4.6); position 2 is a
            // numeric bound, but it must still be present for position 3 to exist.
            Connective::AlwaysWithin | Connective::HoldDuring => 4,
            _ => 0,
        }
    }
}

/// A node of the expression tree.
///
/// Only the fields relevant to `connective` are meaningful; the others carry a sentinel
/// (`None`/empty). This mirrors the source IR, which stores every node in one record rather than
/// a tagged union of distinct Rust types, and keeps a single non-generic `match` at every
/// traversal site.
#[derive(Debug, Clone)]
pub struct ExprNode {
    pub connective: Connective,
    pub predicate: Option<PredicateId>,
    pub arguments: ArgVec,
    pub variable: Option<VarId>,
    pub tpe: Option<TypeId>,
    pub value: Option<f64>,
    pub children: Vec<ExprNode>,
}

impl ExprNode {
    fn leaf(connective: Connective) -> ExprNode {
        ExprNode {
            connective,
            predicate: None,
            arguments: ArgVec::new(),
            variable: None,
            tpe: None,
            value: None,
            children: Vec::new(),
        }
    }

    pub fn atom(predicate: PredicateId, arguments: ArgVec) -> ExprNode {
        ExprNode {
            predicate: Some(predicate),
            arguments,
            ..ExprNode::leaf(Connective::Atom)
        }
    }

    pub fn boolean(value: bool) -> ExprNode {
        ExprNode::leaf(if value { Connective::True } else { Connective::False })
    }

    pub fn not(child: ExprNode) -> ExprNode {
        ExprNode {
            children: vec![child],
            ..ExprNode::leaf(Connective::Not)
        }
    }

    pub fn and(children: Vec<ExprNode>) -> ExprNode {
        ExprNode {
            children,
            ..ExprNode::leaf(Connective::And)
        }
    }

    pub fn or(children: Vec<ExprNode>) -> ExprNode {
        ExprNode {
            children,
            ..ExprNode::leaf(Connective::Or)
        }
    }

    pub fn quantified(connective: Connective, variable: VarId, tpe: TypeId, body: ExprNode) -> ExprNode {
        debug_assert!(matches!(connective, Connective::Forall | Connective::Exists));
        ExprNode {
            variable: Some(variable),
            tpe: Some(tpe),
            children: vec![body],
            ..ExprNode::leaf(connective)
        }
    }

    /// Rebuilds a structural node (one with no predicate/variable/type/value payload) with a new
    /// child list, preserving `connective`. Used by [`crate::simplify`] to reassemble a node after
    /// recursing into (and possibly rewriting) its children.
    pub(crate) fn with_children(connective: Connective, children: Vec<ExprNode>) -> ExprNode {
        ExprNode {
            children,
            ..ExprNode::leaf(connective)
        }
    }

    pub fn when(condition: ExprNode, effect: ExprNode) -> ExprNode {
        ExprNode {
            children: vec![condition, effect],
            ..ExprNode::leaf(Connective::When)
        }
    }

    pub fn is_true(&self) -> bool {
        matches!(self.connective, Connective::True)
    }

    pub fn is_false(&self) -> bool {
        matches!(self.connective, Connective::False)
    }

    /// Whether this node is the literal `(p args)` or `(not (p args))`, matching the
    /// "Expression equality" design note: two atoms are equal iff predicate id and argument
    /// sequence match. Used by [`crate::simplify`] to locate substitution sites.
    pub fn matches_literal(&self, predicate: PredicateId, arguments: &[i32], positive: bool) -> bool {
        match (self.connective, positive) {
            (Connective::Atom, true) => self.predicate == Some(predicate) && self.arguments.as_slice() == arguments,
            (Connective::Not, false) => self.children.len() == 1 && self.children[0].matches_literal(predicate, arguments, true),
            _ => false,
        }
    }

    /// If this node is `ATOM` or `NOT ATOM`, returns `(predicate, arguments, polarity)`.
    pub fn as_literal(&self) -> Option<(PredicateId, &[i32], bool)> {
        match self.connective {
            Connective::Atom => self.predicate.map(|p| (p, self.arguments.as_slice(), true)),
            Connective::Not if self.children.len() == 1 => {
                let child = &self.children[0];
                match child.connective {
                    Connective::Atom => child.predicate.map(|p| (p, child.arguments.as_slice(), false)),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// Checks, depth-first, that every node in this tree carries at least as many children as
    /// its connective structurally requires (§7 `MalformedExpression`). Surfaced immediately by
    /// [`crate::pipeline::preinstantiate`] before any other step runs, per the "fatal, no partial
    /// recovery" error-handling design.
    pub fn check_well_formed(&self) -> Result<(), crate::errors::PreinstantiationError> {
        let required = self.connective.required_children();
        if self.children.len() < required {
            return Err(crate::errors::PreinstantiationError::MalformedExpression {
                connective: self.connective.name(),
                required,
                found: self.children.len(),
            });
        }
        for child in &self.children {
            child.check_well_formed()?;
        }
        Ok(())
    }
}

impl fmt::Display for ExprNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.connective {
            Connective::True => write!(f, "true"),
            Connective::False => write!(f, "false"),
            Connective::Atom => {
                write!(f, "(")?;
                if let Some(p) = self.predicate {
                    write!(f, "{p}")?;
                }
                for a in &self.arguments {
                    write!(f, " {a}")?;
                }
                write!(f, ")")
            }
            Connective::Not => write!(f, "(not {})", self.children[0]),
            Connective::And => {
                write!(f, "(and")?;
                for c in &self.children {
                    write!(f, " {c}")?;
                }
                write!(f, ")")
            }
            Connective::Or => {
                write!(f, "(or")?;
                for c in &self.children {
                    write!(f, " {c}")?;
                }
                write!(f, ")")
            }
            Connective::Forall => write!(f, "(forall {:?} {})", self.variable, self.children[0]),
            Connective::Exists => write!(f, "(exists {:?} {})", self.variable, self.children[0]),
            _ => write!(f, "<{:?}>", self.connective),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ConstantId;

    fn p(i: u32) -> PredicateId {
        PredicateId::from_u32(i)
    }
    fn c(i: u32) -> i32 {
        ConstantId::from_u32(i).to_u32() as i32
    }

    #[test]
    fn atom_matches_literal_and_its_negation() {
        let at = ExprNode::atom(p(0), ArgVec::from_slice(&[c(1)]));
        assert!(at.matches_literal(p(0), &[c(1)], true));
        assert!(!at.matches_literal(p(0), &[c(1)], false));

        let not_at = ExprNode::not(ExprNode::atom(p(0), ArgVec::from_slice(&[c(1)])));
        assert!(not_at.matches_literal(p(0), &[c(1)], false));
        assert!(!not_at.matches_literal(p(0), &[c(1)], true));
    }

    #[test]
    fn as_literal_round_trips() {
        let at = ExprNode::atom(p(2), ArgVec::from_slice(&[c(3), -1]));
        let (pred, args, pos) = at.as_literal().unwrap();
        assert_eq!(pred, p(2));
        assert_eq!(args, &[c(3), -1]);
        assert!(pos);
    }

    #[test]
    fn well_formed_atom_and_and_pass() {
        let atom = ExprNode::atom(p(0), ArgVec::from_slice(&[c(1)]));
        assert!(atom.check_well_formed().is_ok());
        assert!(ExprNode::and(vec![]).check_well_formed().is_ok());
    }

    #[test]
    fn when_with_a_single_child_is_malformed() {
        let malformed = ExprNode::with_children(Connective::When, vec![ExprNode::boolean(true)]);
        let err = malformed.check_well_formed().unwrap_err();
        match err {
            crate::errors::PreinstantiationError::MalformedExpression { connective, required, found } => {
                assert_eq!(connective, "WHEN");
                assert_eq!(required, 2);
                assert_eq!(found, 1);
            }
            other => panic!("expected MalformedExpression, got {other:?}"),
        }
    }

    #[test]
    fn malformed_child_is_detected_however_deeply_nested() {
        let bad_not = ExprNode::with_children(Connective::Not, vec![]);
        let wrapped = ExprNode::and(vec![ExprNode::boolean(true), bad_not]);
        assert!(wrapped.check_well_formed().is_err());
    }

    #[test]
    fn hold_during_needs_four_children() {
        let three_children = ExprNode::with_children(
            Connective::HoldDuring,
            vec![ExprNode::boolean(true), ExprNode::boolean(true), ExprNode::boolean(true)],
        );
        assert!(three_children.check_well_formed().is_err());

        let four_children = ExprNode::with_children(
            Connective::HoldDuring,
            vec![
                ExprNode::boolean(true),
                ExprNode::boolean(true),
                ExprNode::boolean(true),
                ExprNode::boolean(true),
            ],
        );
        assert!(four_children.check_well_formed().is_ok());
    }
}
