//! Inertia classification: the first of the three mechanisms in the design overview.
//!
//! A predicate starts `Inertia` (never touched) and only ever moves towards `Fluent` as effects
//! are scanned — the height-2 join-semilattice from §3/§6. Extraction only looks at *effects*;
//! preconditions never reclassify a predicate.

use crate::action::Action;
use crate::expr::{Connective, ExprNode};
use crate::ids::PredicateId;
use crate::tables::PreprocessingContext;

/// A predicate's inertia tag.
///
/// `Inertia` means "no effect has touched this predicate yet"; `Positive`/`Negative` mean "only
/// ever added"/"only ever deleted"; `Fluent` means both polarities of effect have been observed.
/// The lattice never downgrades: once `Fluent`, a predicate stays `Fluent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Inertia {
    Inertia,
    Positive,
    Negative,
    Fluent,
}

impl Inertia {
    /// Transition on observing a positive literal effect (`(p args)`, an add effect).
    fn on_positive_effect(self) -> Inertia {
        match self {
            Inertia::Inertia => Inertia::Negative,
            Inertia::Positive => Inertia::Fluent,
            Inertia::Negative => Inertia::Negative,
            Inertia::Fluent => Inertia::Fluent,
        }
    }

    /// Transition on observing a negative literal effect (`(not (p args))`, a delete effect).
    fn on_negative_effect(self) -> Inertia {
        match self {
            Inertia::Inertia => Inertia::Positive,
            Inertia::Positive => Inertia::Positive,
            Inertia::Negative => Inertia::Fluent,
            Inertia::Fluent => Inertia::Fluent,
        }
    }
}

/// Runs inertia extraction over every action's effect tree, updating `tableOfInertia` in `ctx`.
/// Idempotent: running it twice over the same actions leaves the tags unchanged (property 1,
/// §8), since the lattice has no way back once a predicate reaches a tag it already visited for
/// the same effect polarity.
pub fn extract_inertia(actions: &[Action], ctx: &mut PreprocessingContext) {
    let _span = tracing::trace_span!("extract_inertia").entered();
    for action in actions {
        scan_effects(&action.effects, ctx);
    }
}

fn scan_effects(node: &ExprNode, ctx: &mut PreprocessingContext) {
    if let Some((predicate, _args, positive)) = node.as_literal() {
        apply_literal(ctx, predicate, positive);
        return;
    }
    match node.connective {
        Connective::And
        | Connective::Or
        | Connective::AtStart
        | Connective::AtEnd
        | Connective::Forall
        | Connective::Exists => {
            for child in &node.children {
                scan_effects(child, ctx);
            }
        }
        // Only the consequent of a conditional effect is scanned: changes to the antecedent are
        // precondition-shaped and do not classify a predicate's inertia (§4.3, §9).
        Connective::When if node.children.len() == 2 => scan_effects(&node.children[1], ctx),
        // Arithmetic, comparison and other numeric/temporal operators never touch inertia.
        _ => {}
    }
}

fn apply_literal(ctx: &mut PreprocessingContext, predicate: PredicateId, positive: bool) {
    let current = ctx.inertia(predicate);
    let next = if positive {
        current.on_positive_effect()
    } else {
        current.on_negative_effect()
    };
    if next != current {
        tracing::trace!(predicate = %ctx.predicate_name(predicate), from = ?current, to = ?next, "inertia reclassified");
    }
    ctx.set_inertia(predicate, next);
}
