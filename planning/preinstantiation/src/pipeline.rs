//! The preinstantiation driver: runs the four steps in order over an already-parsed problem.
//!
//! `Parser → IR of actions+methods+init → extract_inertia → infer_types_from_inertia →
//! create_predicate_tables → simplify_with_inferred_types → ground instantiator`. This module is
//! the one piece of the crate a caller is expected to reach for directly; everything else is
//! exposed for testing and for callers who want to run the steps individually.

use crate::action::{Action, Method};
use crate::errors::PreinstantiationError;
use crate::expr::ExprNode;
use crate::ids::ConstantId;
use crate::inertia::extract_inertia;
use crate::predicate_tables::PredicateOccurrenceTables;
use crate::simplify::{simplify_action, simplify_method};
use crate::tables::PreprocessingContext;
use crate::type_inference::infer_types_from_inertia;

/// The refined problem handed to the grounder: the same actions/methods, with inertia and
/// inferred-domain tables populated in `ctx`, type-split candidates in place of the originals,
/// and per-predicate occurrence tables available off `ctx`.
pub struct PreinstantiationOutput {
    pub actions: Vec<Action>,
    pub methods: Vec<Method>,
}

/// Runs the full pipeline: inertia extraction, unary-inertia domain inference, predicate
/// occurrence tables, then type-split simplification of every action and every method. Methods
/// are inertia-reclassification-free (HTN methods have no effects of their own) but are split the
/// same way actions are, scanning only their preconditions (§4.6); see [`simplify_action`] and
/// [`simplify_method`] for the two splits.
pub fn preinstantiate(
    actions: Vec<Action>,
    methods: Vec<Method>,
    init: Vec<ExprNode>,
    ctx: &mut PreprocessingContext,
) -> Result<PreinstantiationOutput, PreinstantiationError> {
    let _span = tracing::info_span!("preinstantiate", actions = actions.len(), methods = methods.len()).entered();

    if actions.is_empty() && methods.is_empty() && init.is_empty() {
        return Err(PreinstantiationError::NullInput);
    }
    ctx.validate()?;

    tracing::debug!("checking expression well-formedness");
    for action in &actions {
        action.preconditions.check_well_formed()?;
        action.effects.check_well_formed()?;
    }
    for method in &methods {
        method.preconditions.check_well_formed()?;
    }

    tracing::debug!("extracting inertia");
    extract_inertia(&actions, ctx);

    tracing::debug!("inferring unary-inertia domains");
    infer_types_from_inertia(&init, ctx);

    tracing::debug!("building predicate occurrence tables");
    build_occurrence_tables(&init, ctx);

    tracing::debug!("simplifying actions by typed-parameter split");
    let mut refined_actions = Vec::new();
    for action in &actions {
        refined_actions.extend(simplify_action(action, ctx));
    }
    tracing::info!(before = actions.len(), after = refined_actions.len(), "action simplification done");

    tracing::debug!("simplifying methods by typed-parameter split");
    let mut refined_methods = Vec::new();
    for method in &methods {
        refined_methods.extend(simplify_method(method, ctx));
    }
    tracing::info!(before = methods.len(), after = refined_methods.len(), "method simplification done");

    Ok(PreinstantiationOutput {
        actions: refined_actions,
        methods: refined_methods,
    })
}

/// Builds `predicatesTables` for every declared predicate from the ground facts in `init`.
fn build_occurrence_tables(init: &[ExprNode], ctx: &mut PreprocessingContext) {
    let predicates: Vec<_> = ctx.predicates().collect();
    for p in predicates {
        let arity = ctx.arity(p);
        let facts: Vec<Vec<ConstantId>> = init
            .iter()
            .filter_map(|atom| atom.as_literal())
            .filter(|&(predicate, _args, positive)| predicate == p && positive)
            .map(|(_predicate, args, _positive)| args.iter().map(|&a| ConstantId::from_u32(a as u32)).collect())
            .collect();
        let tables = PredicateOccurrenceTables::build(arity, facts);
        ctx.set_occurrence_tables(p, tables);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn null_input_is_rejected() {
        let mut ctx = PreprocessingContext::new();
        let err = preinstantiate(vec![], vec![], vec![], &mut ctx).unwrap_err();
        assert!(matches!(err, PreinstantiationError::NullInput));
    }

    #[test]
    fn malformed_effect_is_rejected_before_any_step_runs() {
        let mut ctx = PreprocessingContext::new();
        let malformed_when = crate::expr::ExprNode::with_children(crate::expr::Connective::When, vec![ExprNode::boolean(true)]);
        let actions = vec![Action {
            name: "bad".to_string(),
            parameters: vec![],
            preconditions: ExprNode::boolean(true),
            effects: malformed_when,
        }];
        let err = preinstantiate(actions, vec![], vec![], &mut ctx).unwrap_err();
        assert!(matches!(err, PreinstantiationError::MalformedExpression { connective: "WHEN", required: 2, found: 1 }));
    }

    #[test]
    fn s1_and_s6_run_through_the_full_pipeline() {
        let mut ctx = PreprocessingContext::new();
        let object = ctx.declare_type("object", BTreeSet::new()).unwrap();
        let at = ctx.declare_predicate("at", vec![object, object]).unwrap();
        let r = ctx.declare_constant("r");
        let l1 = ctx.declare_constant("l1");
        let l2 = ctx.declare_constant("l2");

        let arg = |c: ConstantId| c.to_u32() as i32;
        let eff1 = ExprNode::atom(at, crate::expr::ArgVec::from_slice(&[arg(r), arg(l1)]));
        let eff2 = ExprNode::atom(at, crate::expr::ArgVec::from_slice(&[arg(r), arg(l2)]));
        let actions = vec![
            Action {
                name: "move1".to_string(),
                parameters: vec![],
                preconditions: ExprNode::boolean(true),
                effects: eff1,
            },
            Action {
                name: "move2".to_string(),
                parameters: vec![],
                preconditions: ExprNode::boolean(true),
                effects: eff2,
            },
        ];
        let init = vec![ExprNode::atom(at, crate::expr::ArgVec::from_slice(&[arg(r), arg(l1)]))];

        let out = preinstantiate(actions, vec![], init, &mut ctx).unwrap();
        assert_eq!(ctx.inertia(at), crate::inertia::Inertia::Negative);
        assert_eq!(out.actions.len(), 2);
        assert!(ctx.occurrence_tables(at).is_some());
    }
}
