//! HTN ordering-constraint network: `M[i][j]` holds iff subtask `i` must precede subtask `j`.
//!
//! Built directly on [`SquareBitMatrix`]; the interesting logic here is graph-shaped (acyclicity,
//! total order, frontier queries) rather than bit-twiddling, so it stays a thin layer on top
//! rather than duplicating the matrix's own `get`/`set`/`transitive_closure`.

use crate::bitmatrix::SquareBitMatrix;
use std::fmt;

#[derive(Debug, Clone)]
pub struct OrderingConstraintNetwork {
    matrix: SquareBitMatrix,
}

impl OrderingConstraintNetwork {
    pub fn new(num_tasks: usize) -> OrderingConstraintNetwork {
        OrderingConstraintNetwork {
            matrix: SquareBitMatrix::new(num_tasks),
        }
    }

    pub fn num_tasks(&self) -> usize {
        self.matrix.size()
    }

    /// Records that task `before` must precede task `after`.
    pub fn add_constraint(&mut self, before: usize, after: usize) {
        self.matrix.set(before, after);
    }

    pub fn precedes(&self, before: usize, after: usize) -> bool {
        self.matrix.get(before, after)
    }

    pub fn transitive_closure(&mut self) {
        self.matrix.transitive_closure();
    }

    /// Applies the transitive closure and checks the diagonal. Mutates `self`: the closure is
    /// idempotent, so calling this more than once is harmless but re-does the work.
    pub fn is_acyclic(&mut self) -> bool {
        self.matrix.transitive_closure();
        self.matrix.is_acyclic_diagonal()
    }

    /// Tasks with no predecessor. After [`Self::transitive_closure`] (or [`Self::is_acyclic`])
    /// this is transitive; on a matrix holding only direct constraints it is the direct frontier.
    pub fn tasks_with_no_predecessors(&self) -> Vec<usize> {
        (0..self.num_tasks())
            .filter(|&i| self.matrix.column(i).count_ones(..) == 0)
            .collect()
    }

    /// Tasks with no successor, symmetric to [`Self::tasks_with_no_predecessors`].
    pub fn tasks_with_no_successors(&self) -> Vec<usize> {
        (0..self.num_tasks())
            .filter(|&i| self.matrix.row(i).count_ones(..) == 0)
            .collect()
    }

    /// Whether the network admits a unique topological order, tested by iterated minimum-element
    /// peel: at every step there must be exactly one task with no remaining predecessor. Works on
    /// an internal copy so `self` is left untouched (the teacher's
    /// `OrderingConstraintNetwork::isTotallyOrdered` takes the same precaution before peeling).
    pub fn is_totally_ordered(&self) -> bool {
        let mut working = self.matrix.clone();
        working.transitive_closure();
        loop {
            let n = working.size();
            if n <= 1 {
                return true;
            }
            let no_predecessors: Vec<usize> = (0..n).filter(|&i| working.column(i).count_ones(..) == 0).collect();
            if no_predecessors.len() != 1 {
                return false;
            }
            working.remove(no_predecessors[0]);
        }
    }
}

impl fmt::Display for OrderingConstraintNetwork {
    /// Stable textual form used by tests: one line per set bit in row-major order,
    /// `" C{idx}: T{r} < T{c}\n"`. An empty network prints `" ()"`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut idx = 0;
        let mut any = false;
        for r in 0..self.num_tasks() {
            for c in 0..self.num_tasks() {
                if self.matrix.get(r, c) {
                    writeln!(f, " C{idx}: T{r} < T{c}")?;
                    idx += 1;
                    any = true;
                }
            }
        }
        if !any {
            write!(f, " ()")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn network_with(constraints: &[(usize, usize)], num_tasks: usize) -> OrderingConstraintNetwork {
        let mut net = OrderingConstraintNetwork::new(num_tasks);
        for &(a, b) in constraints {
            net.add_constraint(a, b);
        }
        net
    }

    #[test]
    fn s2_chain_is_acyclic_and_total() {
        let mut net = network_with(&[(0, 1), (1, 2)], 3);
        assert!(net.is_acyclic());
        assert!(net.is_totally_ordered());
        assert_eq!(net.tasks_with_no_predecessors(), vec![0]);
        assert_eq!(net.tasks_with_no_successors(), vec![2]);
    }

    #[test]
    fn s3_adding_back_edge_creates_cycle() {
        let mut net = network_with(&[(0, 1), (1, 2), (2, 0)], 3);
        assert!(!net.is_acyclic());
    }

    #[test]
    fn s4_fork_is_acyclic_but_not_totally_ordered() {
        let mut net = network_with(&[(0, 1), (0, 2)], 3);
        assert!(net.is_acyclic());
        assert!(!net.is_totally_ordered());
    }

    #[test]
    fn fewer_than_two_tasks_is_trivially_total() {
        assert!(OrderingConstraintNetwork::new(0).is_totally_ordered());
        assert!(OrderingConstraintNetwork::new(1).is_totally_ordered());
    }

    #[test]
    fn empty_network_with_two_or_more_tasks_is_not_totally_ordered() {
        let net = OrderingConstraintNetwork::new(2);
        assert!(!net.is_totally_ordered());
    }

    #[test]
    fn display_matches_stable_textual_form() {
        let net = network_with(&[(0, 1), (1, 2)], 3);
        let text = net.to_string();
        assert_eq!(text, " C0: T0 < T1\n C1: T1 < T2\n");

        let empty = OrderingConstraintNetwork::new(2);
        assert_eq!(empty.to_string(), " ()");
    }
}
