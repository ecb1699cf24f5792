//! Inferred-type refinement: the second mechanism, built directly on the inertia tags from
//! [`crate::inertia`]. A unary `INERTIA` predicate's initial extension never changes, so it is
//! both a predicate and a sound static refinement of its single parameter's type.

use std::collections::BTreeSet;

use crate::expr::ExprNode;
use crate::inertia::Inertia;
use crate::tables::PreprocessingContext;

/// For every predicate of arity 1 whose inertia is still `INERTIA`, sets its inferred domain to
/// the set of constants for which it holds in `init`. Every other predicate keeps a `None`
/// inferred domain. `init` holds `ATOM`/`NOT ATOM` ground facts, per the input contract; a
/// leading `NOT` is unwrapped since a negative fact never contributes to a positive inertia
/// predicate's extension (and a unary `FLUENT`/`POSITIVE`/`NEGATIVE` predicate is skipped
/// entirely regardless of what `init` says about it).
pub fn infer_types_from_inertia(init: &[ExprNode], ctx: &mut PreprocessingContext) {
    let _span = tracing::trace_span!("infer_types_from_inertia").entered();
    let candidates: Vec<_> = ctx
        .predicates()
        .filter(|&p| ctx.arity(p) == 1 && ctx.inertia(p) == Inertia::Inertia)
        .collect();

    for p in candidates {
        let mut domain = BTreeSet::new();
        for atom in init {
            if let Some((predicate, args, true)) = atom.as_literal() {
                if predicate == p {
                    debug_assert_eq!(args.len(), 1);
                    domain.insert(crate::ids::ConstantId::from_u32(args[0] as u32));
                }
            }
        }
        tracing::trace!(predicate = %ctx.predicate_name(p), size = domain.len(), "inferred unary domain");
        ctx.set_inferred_domain(p, Some(domain));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::ArgVec;
    use crate::ids::{ConstantId, PredicateId};

    fn atom(p: PredicateId, c: ConstantId) -> ExprNode {
        ExprNode::atom(p, ArgVec::from_slice(&[c.to_u32() as i32]))
    }

    #[test]
    fn s5_inertia_unary_predicate_gets_inferred_domain() {
        let mut ctx = PreprocessingContext::new();
        let object = ctx.declare_type("object", BTreeSet::new()).unwrap();
        let p = ctx.declare_predicate("P", vec![object]).unwrap();
        let a = ConstantId::from_u32(0);
        let b = ConstantId::from_u32(1);
        let init = vec![atom(p, a), atom(p, b)];
        infer_types_from_inertia(&init, &mut ctx);
        let domain = ctx.inferred_domain(p).expect("P is unary INERTIA");
        assert_eq!(domain, &BTreeSet::from([a, b]));
    }

    #[test]
    fn non_inertia_unary_predicate_stays_null() {
        let mut ctx = PreprocessingContext::new();
        let object = ctx.declare_type("object", BTreeSet::new()).unwrap();
        let p = ctx.declare_predicate("moving", vec![object]).unwrap();
        ctx.set_inertia(p, Inertia::Fluent);
        let a = ConstantId::from_u32(0);
        infer_types_from_inertia(&[atom(p, a)], &mut ctx);
        assert_eq!(ctx.inferred_domain(p), None);
    }

    #[test]
    fn arity_above_one_is_never_a_candidate() {
        let mut ctx = PreprocessingContext::new();
        let object = ctx.declare_type("object", BTreeSet::new()).unwrap();
        let at = ctx.declare_predicate("at", vec![object, object]).unwrap();
        infer_types_from_inertia(&[], &mut ctx);
        assert_eq!(ctx.inferred_domain(at), None);
    }

    #[test]
    fn negative_initial_literal_does_not_populate_the_domain() {
        let mut ctx = PreprocessingContext::new();
        let object = ctx.declare_type("object", BTreeSet::new()).unwrap();
        let p = ctx.declare_predicate("P", vec![object]).unwrap();
        let a = ConstantId::from_u32(0);
        let init = vec![ExprNode::not(atom(p, a))];
        infer_types_from_inertia(&init, &mut ctx);
        assert_eq!(ctx.inferred_domain(p), Some(BTreeSet::new()));
    }
}
