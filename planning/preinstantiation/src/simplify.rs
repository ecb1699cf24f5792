//! Action/method simplification by typed-parameter splitting: the third preinstantiation
//! mechanism, and the one that actually shrinks the grounding space. For every unary-inertia
//! literal reachable in an operator's preconditions (and effects, for actions), the operator is
//! cloned in two: one candidate where the split parameter's type is narrowed to the intersection
//! with the literal's inferred domain (and the literal substituted by `TRUE`), one where it is
//! narrowed to the difference (literal substituted by `FALSE`). A candidate whose root collapses
//! to `FALSE` is discarded.

use std::collections::BTreeSet;

use env_param::EnvParam;

use crate::action::{Action, Method};
use crate::expr::{ArgVec, Connective, ExprNode};
use crate::ids::{ArgRef, PredicateId, TypeId};
use crate::tables::PreprocessingContext;

/// When a unary-inertia literal's sole argument is a constant rather than a parameter reference,
/// the source implementation breaks out of the whole split loop for that action rather than
/// skipping just this one literal (§9, open question). `true` (default) preserves that behavior;
/// `false` skips the offending literal and continues splitting on the remaining ones.
pub static PREINST_BREAK_ON_CONSTANT_ARG: EnvParam<bool> = EnvParam::new("PREINST_BREAK_ON_CONSTANT_ARG", "true");

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct UnaryLiteral {
    predicate: PredicateId,
    arguments: ArgVec,
}

/// Walks `node` collecting every reachable atom (or its negation) whose predicate has a non-null
/// inferred domain, following the same structural reach as [`substitute`]: both children of
/// `AND`/`OR`, the body of `FORALL`/`EXISTS`/unary wrappers, and children 0/1/3 of
/// `ALWAYS_WITHIN`/`HOLD_DURING`.
fn collect_unary_inertia_literals(node: &ExprNode, ctx: &PreprocessingContext, out: &mut Vec<UnaryLiteral>) {
    if let Some((predicate, arguments, _positive)) = node.as_literal() {
        if ctx.inferred_domain(predicate).is_some() {
            out.push(UnaryLiteral {
                predicate,
                arguments: ArgVec::from_slice(arguments),
            });
        }
        return;
    }
    match node.connective {
        Connective::And | Connective::Or => {
            for child in &node.children {
                collect_unary_inertia_literals(child, ctx, out);
            }
        }
        Connective::Forall
        | Connective::Exists
        | Connective::Not
        | Connective::AtStart
        | Connective::AtEnd
        | Connective::OverAll
        | Connective::When
        | Connective::Always
        | Connective::Sometime
        | Connective::AtMostOnce
        | Connective::SometimeBefore
        | Connective::SometimeAfter
        | Connective::Within
        | Connective::HoldAfter => {
            if let Some(child) = node.children.first() {
                collect_unary_inertia_literals(child, ctx, out);
            }
        }
        Connective::AlwaysWithin | Connective::HoldDuring => {
            for &i in &[0usize, 1, 3] {
                if let Some(child) = node.children.get(i) {
                    collect_unary_inertia_literals(child, ctx, out);
                }
            }
        }
        _ => {}
    }
}

fn dedupe(mut literals: Vec<UnaryLiteral>) -> Vec<UnaryLiteral> {
    let mut seen = BTreeSet::new();
    literals.retain(|l| seen.insert((l.predicate, l.arguments.to_vec())));
    literals
}

/// Substitutes every occurrence of `predicate(arguments)` in `node` by the constant
/// `literal_value` (for a positive occurrence) or its negation (for a `NOT` occurrence), then
/// folds the resulting `AND`/`OR` constants bottom-up.
fn substitute(node: ExprNode, predicate: PredicateId, arguments: &[i32], literal_value: bool) -> ExprNode {
    if let Some((p, args, positive)) = node.as_literal() {
        if p == predicate && args == arguments {
            let value = if positive { literal_value } else { !literal_value };
            return ExprNode::boolean(value);
        }
    }
    match node.connective {
        Connective::And => {
            let mut children = Vec::with_capacity(node.children.len());
            for child in node.children {
                let child = substitute(child, predicate, arguments, literal_value);
                if child.is_false() {
                    return ExprNode::boolean(false);
                }
                if !child.is_true() {
                    children.push(child);
                }
            }
            if children.is_empty() {
                ExprNode::boolean(true)
            } else {
                ExprNode::and(children)
            }
        }
        Connective::Or => {
            let mut children = Vec::with_capacity(node.children.len());
            for child in node.children {
                let child = substitute(child, predicate, arguments, literal_value);
                if child.is_true() {
                    return ExprNode::boolean(true);
                }
                if !child.is_false() {
                    children.push(child);
                }
            }
            if children.is_empty() {
                ExprNode::boolean(false)
            } else {
                ExprNode::or(children)
            }
        }
        Connective::Forall | Connective::Exists if shadows_split_variable(&node, arguments) => {
            // The quantifier rebinds the exact variable slot the split literal refers to: the
            // body's occurrences are local to this quantifier, not the outer split parameter, so
            // both partitions of the local variable's domain are folded in here rather than at
            // the top-level ti/ts clone.
            let body = node.children.into_iter().next().expect("quantified node has a body");
            let true_branch = substitute(body.clone(), predicate, arguments, true);
            let false_branch = substitute(body, predicate, arguments, false);
            match node.connective {
                Connective::Forall => ExprNode::and(vec![true_branch, false_branch]),
                Connective::Exists => ExprNode::or(vec![true_branch, false_branch]),
                _ => unreachable!(),
            }
        }
        Connective::Forall | Connective::Exists => {
            let variable = node.variable.expect("quantified node carries its bound variable");
            let tpe = node.tpe.expect("quantified node carries its bound type");
            let body = node.children.into_iter().next().expect("quantified node has a body");
            ExprNode::quantified(node.connective, variable, tpe, substitute(body, predicate, arguments, literal_value))
        }
        Connective::Not
        | Connective::AtStart
        | Connective::AtEnd
        | Connective::OverAll
        | Connective::When
        | Connective::Always
        | Connective::Sometime
        | Connective::AtMostOnce
        | Connective::SometimeBefore
        | Connective::SometimeAfter
        | Connective::Within
        | Connective::HoldAfter => {
            let connective = node.connective;
            let mut children = node.children;
            if let Some(first) = children.first().cloned() {
                children[0] = substitute(first, predicate, arguments, literal_value);
            }
            ExprNode::with_children(connective, children)
        }
        Connective::AlwaysWithin | Connective::HoldDuring => {
            let connective = node.connective;
            let mut children = node.children;
            for &i in &[0usize, 1, 3] {
                if let Some(child) = children.get(i).cloned() {
                    children[i] = substitute(child, predicate, arguments, literal_value);
                }
            }
            ExprNode::with_children(connective, children)
        }
        _ => node,
    }
}

fn shadows_split_variable(node: &ExprNode, arguments: &[i32]) -> bool {
    let Some(variable) = node.variable else { return false };
    let Some(&x) = arguments.first() else { return false };
    matches!(ArgRef::decode(x), ArgRef::Param(i) if i as u32 == variable.to_u32())
}

fn type_names(ctx: &PreprocessingContext, declared: TypeId, inertia_predicate: PredicateId) -> (String, String) {
    let declared_name = ctx.type_name(declared);
    let predicate_name = ctx.predicate_name(inertia_predicate);
    (format!("{declared_name}^{predicate_name}"), format!("{declared_name}\\{predicate_name}"))
}

/// Splits a single action along every unary-inertia literal reachable in its preconditions and
/// effects, in order, until either the literals are exhausted or the candidate set empties out.
pub fn simplify_action(action: &Action, ctx: &mut PreprocessingContext) -> Vec<Action> {
    let _span = tracing::debug_span!("simplify_action", name = %action.name).entered();
    let mut literals = Vec::new();
    collect_unary_inertia_literals(&action.preconditions, ctx, &mut literals);
    collect_unary_inertia_literals(&action.effects, ctx, &mut literals);
    let literals = dedupe(literals);

    let mut candidates = vec![action.clone()];
    for literal in literals {
        if candidates.is_empty() {
            break;
        }
        let x = literal.arguments[0];
        let Some(k) = (match ArgRef::decode(x) {
            ArgRef::Param(i) => Some(i),
            ArgRef::Constant(_) => None,
        }) else {
            if PREINST_BREAK_ON_CONSTANT_ARG.get() {
                break;
            } else {
                continue;
            }
        };

        let mut next = Vec::new();
        for candidate in candidates {
            next.extend(split_candidate(candidate, k, &literal, ctx));
        }
        candidates = next;
    }
    candidates
}

fn split_candidate(candidate: Action, k: usize, literal: &UnaryLiteral, ctx: &mut PreprocessingContext) -> Vec<Action> {
    if k >= candidate.parameters.len() {
        return vec![candidate];
    }
    let declared = candidate.parameters[k];
    let inferred = ctx
        .inferred_domain(literal.predicate)
        .cloned()
        .expect("collected literal's predicate has a non-null inferred domain");
    let declared_domain = ctx.domain(declared).clone();
    let (ti_name, ts_name) = type_names(ctx, declared, literal.predicate);
    let ti_domain: BTreeSet<_> = declared_domain.intersection(&inferred).cloned().collect();
    let ts_domain: BTreeSet<_> = declared_domain.difference(&inferred).cloned().collect();
    let ti = ctx.declare_or_get_type(ti_name, || ti_domain);
    let ts = ctx.declare_or_get_type(ts_name, || ts_domain);

    let mut result = Vec::with_capacity(2);

    let mut ti_candidate = candidate.clone();
    ti_candidate.parameters[k] = ti;
    ti_candidate.preconditions = substitute(candidate.preconditions.clone(), literal.predicate, &literal.arguments, true);
    ti_candidate.effects = substitute(candidate.effects.clone(), literal.predicate, &literal.arguments, true);
    if !ti_candidate.preconditions.is_false() && !ti_candidate.effects.is_false() {
        result.push(ti_candidate);
    }

    let mut ts_candidate = candidate;
    ts_candidate.parameters[k] = ts;
    ts_candidate.preconditions = substitute(ts_candidate.preconditions, literal.predicate, &literal.arguments, false);
    ts_candidate.effects = substitute(ts_candidate.effects, literal.predicate, &literal.arguments, false);
    if !ts_candidate.preconditions.is_false() && !ts_candidate.effects.is_false() {
        result.push(ts_candidate);
    }

    result
}

/// Splits a single method along every unary-inertia literal reachable in its preconditions, in
/// order, until either the literals are exhausted or the candidate set empties out. Unlike
/// [`simplify_action`], only preconditions are scanned: a method's task network carries no
/// effects of its own (§4.6: "for each action **or method**, collect unary inertia literals
/// reachable in its preconditions (and, for actions, effects)").
pub fn simplify_method(method: &Method, ctx: &mut PreprocessingContext) -> Vec<Method> {
    let _span = tracing::debug_span!("simplify_method", name = %method.name).entered();
    let mut literals = Vec::new();
    collect_unary_inertia_literals(&method.preconditions, ctx, &mut literals);
    let literals = dedupe(literals);

    let mut candidates = vec![method.clone()];
    for literal in literals {
        if candidates.is_empty() {
            break;
        }
        let x = literal.arguments[0];
        let Some(k) = (match ArgRef::decode(x) {
            ArgRef::Param(i) => Some(i),
            ArgRef::Constant(_) => None,
        }) else {
            if PREINST_BREAK_ON_CONSTANT_ARG.get() {
                break;
            } else {
                continue;
            }
        };

        let mut next = Vec::new();
        for candidate in candidates {
            next.extend(split_method_candidate(candidate, k, &literal, ctx));
        }
        candidates = next;
    }
    candidates
}

fn split_method_candidate(candidate: Method, k: usize, literal: &UnaryLiteral, ctx: &mut PreprocessingContext) -> Vec<Method> {
    if k >= candidate.parameters.len() {
        return vec![candidate];
    }
    let declared = candidate.parameters[k];
    let inferred = ctx
        .inferred_domain(literal.predicate)
        .cloned()
        .expect("collected literal's predicate has a non-null inferred domain");
    let declared_domain = ctx.domain(declared).clone();
    let (ti_name, ts_name) = type_names(ctx, declared, literal.predicate);
    let ti_domain: BTreeSet<_> = declared_domain.intersection(&inferred).cloned().collect();
    let ts_domain: BTreeSet<_> = declared_domain.difference(&inferred).cloned().collect();
    let ti = ctx.declare_or_get_type(ti_name, || ti_domain);
    let ts = ctx.declare_or_get_type(ts_name, || ts_domain);

    let mut result = Vec::with_capacity(2);

    // Built with `duration: None` rather than via a full struct clone, so that
    // `with_duration_from` observes a freshly constructed candidate the way the source's
    // clone-then-set-fields sequence does (§9 duration deep-copy open question).
    let mut ti_candidate = Method {
        name: candidate.name.clone(),
        parameters: candidate.parameters.clone(),
        preconditions: substitute(candidate.preconditions.clone(), literal.predicate, &literal.arguments, true),
        task_network: candidate.task_network.clone(),
        duration: None,
    }
    .with_duration_from(&candidate);
    ti_candidate.parameters[k] = ti;
    if !ti_candidate.preconditions.is_false() {
        result.push(ti_candidate);
    }

    let mut ts_candidate = Method {
        name: candidate.name.clone(),
        parameters: candidate.parameters.clone(),
        preconditions: substitute(candidate.preconditions.clone(), literal.predicate, &literal.arguments, false),
        task_network: candidate.task_network.clone(),
        duration: None,
    }
    .with_duration_from(&candidate);
    ts_candidate.parameters[k] = ts;
    if !ts_candidate.preconditions.is_false() {
        result.push(ts_candidate);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::ArgVec as AV;
    use crate::ids::ConstantId;

    fn atom_of(p: PredicateId, arg: i32) -> ExprNode {
        ExprNode::atom(p, AV::from_slice(&[arg]))
    }

    #[test]
    fn s5_type_split_on_a_single_unary_precondition() {
        let mut ctx = PreprocessingContext::new();
        let a = ctx.declare_constant("a");
        let b = ctx.declare_constant("b");
        let c = ctx.declare_constant("c");
        let object = ctx.declare_type("object", BTreeSet::from([a, b, c])).unwrap();
        let p = ctx.declare_predicate("P", vec![object]).unwrap();
        ctx.set_inferred_domain(p, Some(BTreeSet::from([a, b])));

        let param0 = ArgRef::Param(0).encode();
        let action = Action {
            name: "pick".to_string(),
            parameters: vec![object],
            preconditions: atom_of(p, param0),
            effects: ExprNode::boolean(true),
        };

        let candidates = simplify_action(&action, &mut ctx);
        assert_eq!(candidates.len(), 1, "the A\\P candidate has domain {{c}} but precondition FALSE, and must be discarded");

        let kept = &candidates[0];
        assert!(kept.preconditions.is_true());
        let kept_type = kept.parameters[0];
        assert_eq!(ctx.type_name(kept_type), "object^P");
        assert_eq!(ctx.domain(kept_type), &BTreeSet::from([a, b]));
    }

    #[test]
    fn constant_argument_aborts_remaining_splits_by_default() {
        let mut ctx = PreprocessingContext::new();
        let a = ctx.declare_constant("a");
        let object = ctx.declare_type("object", BTreeSet::from([a])).unwrap();
        let p = ctx.declare_predicate("P", vec![object]).unwrap();
        ctx.set_inferred_domain(p, Some(BTreeSet::from([a])));
        let q = ctx.declare_predicate("Q", vec![object]).unwrap();
        ctx.set_inferred_domain(q, Some(BTreeSet::from([a])));

        let const_arg = ConstantId::to_u32(a) as i32;
        let param0 = ArgRef::Param(0).encode();
        let action = Action {
            name: "act".to_string(),
            parameters: vec![object],
            preconditions: ExprNode::and(vec![atom_of(p, const_arg), atom_of(q, param0)]),
            effects: ExprNode::boolean(true),
        };
        let candidates = simplify_action(&action, &mut ctx);
        // the P(a) literal (constant argument) is collected first in traversal order and, with
        // the default bug-compatible flag, aborts the loop before Q(?x) is ever split on.
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].parameters[0], object);
    }

    fn method_with_precondition(object: TypeId, preconditions: ExprNode) -> Method {
        Method {
            name: "decompose".to_string(),
            parameters: vec![object],
            preconditions,
            task_network: crate::action::TaskNetwork::new(vec![]),
            duration: None,
        }
    }

    #[test]
    fn method_type_split_mirrors_action_split() {
        let mut ctx = PreprocessingContext::new();
        let a = ctx.declare_constant("a");
        let b = ctx.declare_constant("b");
        let c = ctx.declare_constant("c");
        let object = ctx.declare_type("object", BTreeSet::from([a, b, c])).unwrap();
        let p = ctx.declare_predicate("P", vec![object]).unwrap();
        ctx.set_inferred_domain(p, Some(BTreeSet::from([a, b])));

        let param0 = ArgRef::Param(0).encode();
        let method = method_with_precondition(object, atom_of(p, param0));

        let candidates = simplify_method(&method, &mut ctx);
        assert_eq!(candidates.len(), 1, "the object\\P candidate has domain {{c}} but precondition FALSE, and must be discarded");

        let kept = &candidates[0];
        assert!(kept.preconditions.is_true());
        assert_eq!(ctx.type_name(kept.parameters[0]), "object^P");
    }

    #[test]
    fn duration_is_copied_to_split_candidates_by_default() {
        let mut ctx = PreprocessingContext::new();
        let a = ctx.declare_constant("a");
        let b = ctx.declare_constant("b");
        let object = ctx.declare_type("object", BTreeSet::from([a, b])).unwrap();
        let p = ctx.declare_predicate("P", vec![object]).unwrap();
        ctx.set_inferred_domain(p, Some(BTreeSet::from([a, b])));

        let param0 = ArgRef::Param(0).encode();
        let mut method = method_with_precondition(object, atom_of(p, param0));
        method.duration = Some(ExprNode::boolean(true));

        let candidates = simplify_method(&method, &mut ctx);
        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].duration.is_some(), "PREINST_COPY_DURATION_IFF_PRESENT defaults to true");
    }
}
