//! Preprocessing core for a PDDL planning pipeline: inertia classification, inferred-type
//! refinement from unary inertia, predicate occurrence tables, and typed-parameter action
//! simplification, plus the bit-matrix HTN ordering-constraint analyzer these lean on.
//!
//! The crate does not parse PDDL and does not ground/instantiate the refined problem; it sits
//! between those two stages. See [`pipeline::preinstantiate`] for the driver, or use the
//! individual steps (`inertia`, `type_inference`, `predicate_tables`, `simplify`) directly.

pub mod action;
pub mod bitmatrix;
pub mod errors;
pub mod expr;
pub mod ids;
pub mod inertia;
pub mod ordering;
pub mod pipeline;
pub mod predicate_tables;
pub mod simplify;
pub mod tables;
pub mod type_inference;

pub use action::{Action, Method, Subtask, TaskNetwork};
pub use bitmatrix::{BitMatrix, SquareBitMatrix};
pub use errors::PreinstantiationError;
pub use expr::{Connective, ExprNode};
pub use ids::{ArgRef, ConstantId, PredicateId, TypeId, VarId};
pub use inertia::Inertia;
pub use ordering::OrderingConstraintNetwork;
pub use pipeline::{preinstantiate, PreinstantiationOutput};
pub use predicate_tables::PredicateOccurrenceTables;
pub use tables::{PreprocessingContext, TableError};
