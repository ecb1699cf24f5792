//! Top-level error type for the preinstantiation pipeline.
//!
//! Only the fatal, structural kinds from the error-handling design are modeled as an error type:
//! a sub-expression collapsing to `TRUE`/`FALSE` during type split is a value handled in place by
//! [`crate::simplify`], and a cyclic ordering network is reported through
//! [`crate::ordering::OrderingConstraintNetwork::is_acyclic`]'s boolean return rather than an
//! error. There is no retry policy: the pipeline is deterministic and pure over its inputs.

use crate::tables::TableError;

#[derive(thiserror::Error, Debug)]
pub enum PreinstantiationError {
    /// The pipeline was handed a problem with no actions, no methods and no init facts: there is
    /// nothing to preinstantiate.
    #[error("preinstantiation received a null/empty input problem")]
    NullInput,

    /// `|tableOfInertia| != |tableOfPredicates|` or similar: one of the global side tables has
    /// drifted out of lockstep with the predicate table.
    #[error("global table `{table}` has {actual} entries, expected {expected} (one per predicate)")]
    MismatchedTable { table: &'static str, expected: usize, actual: usize },

    /// A connective was found with fewer children than it requires (e.g. a `WHEN` with one
    /// child, or a quantified node with no body).
    #[error("malformed expression: {connective} requires {required} child/children, found {found}")]
    MalformedExpression { connective: &'static str, required: usize, found: usize },

    #[error(transparent)]
    Table(#[from] TableError),
}
