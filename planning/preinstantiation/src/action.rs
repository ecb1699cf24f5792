//! Action and method operators: the candidates that inertia extraction scans and that
//! [`crate::simplify`] splits along unary-inertia boundaries.

use crate::expr::{ArgVec, ExprNode};
use crate::ids::TypeId;
use crate::ordering::OrderingConstraintNetwork;
use env_param::EnvParam;

/// Whether a method clone's `duration` is copied from its source only when the source has one
/// (`true`, the sensible reading), or only when the *destination* already has one before the
/// copy (`false` — bug-compatible with a guard that checks the wrong side; since a freshly built
/// candidate always starts with `duration: None`, this reproduces the historical bug where
/// type-split candidates of durative methods silently lose their duration). See
/// [`Method::with_duration_from`] and the design note on duration deep-copy.
pub static PREINST_COPY_DURATION_IFF_PRESENT: EnvParam<bool> = EnvParam::new("PREINST_COPY_DURATION_IFF_PRESENT", "true");

/// A ground-ready but not yet instantiated action.
#[derive(Debug, Clone)]
pub struct Action {
    pub name: String,
    pub parameters: Vec<TypeId>,
    pub preconditions: ExprNode,
    pub effects: ExprNode,
}

impl Action {
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }
}

/// One element of a [`TaskNetwork`]: a reference to a task (primitive or compound) together with
/// its arguments, using the same `ArgRef` encoding as [`ExprNode::arguments`].
#[derive(Debug, Clone)]
pub struct Subtask {
    pub task_name: String,
    pub arguments: ArgVec,
}

/// A method's task network: the subtasks it decomposes into, plus the ordering constraints
/// between them.
#[derive(Debug, Clone)]
pub struct TaskNetwork {
    pub subtasks: Vec<Subtask>,
    pub ordering: OrderingConstraintNetwork,
}

impl TaskNetwork {
    pub fn new(subtasks: Vec<Subtask>) -> TaskNetwork {
        let n = subtasks.len();
        TaskNetwork {
            subtasks,
            ordering: OrderingConstraintNetwork::new(n),
        }
    }
}

/// An HTN method: decomposes a compound task under `preconditions` into a [`TaskNetwork`].
/// `duration` is only meaningful for durative methods; plain methods carry `None`.
#[derive(Debug, Clone)]
pub struct Method {
    pub name: String,
    pub parameters: Vec<TypeId>,
    pub preconditions: ExprNode,
    pub task_network: TaskNetwork,
    pub duration: Option<ExprNode>,
}

impl Method {
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    /// Assigns `self.duration` from `source`, following whichever of the two documented readings
    /// [`PREINST_COPY_DURATION_IFF_PRESENT`] selects. Call this on a freshly built clone (as
    /// [`crate::simplify`] does): with the flag off, `self.duration` is `None` at this point, so
    /// the bug-compatible branch never copies anything.
    pub fn with_duration_from(mut self, source: &Method) -> Method {
        let copy = if PREINST_COPY_DURATION_IFF_PRESENT.get() {
            source.duration.is_some()
        } else {
            self.duration.is_some()
        };
        if copy {
            self.duration = source.duration.clone();
        }
        self
    }
}
