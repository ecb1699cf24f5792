//! Rectangular and square bit matrices.
//!
//! Each row is backed by a [`FixedBitSet`] rather than `Vec<bool>`, the same packed-bitset idiom
//! used for [`State`](https://docs.rs/fixedbitset) in the classical-planning state representation
//! this crate is descended from: row union/cardinality become word-at-a-time operations instead
//! of per-bit loops, which matters once [`SquareBitMatrix::transitive_closure`] runs Warshall over
//! a non-trivial number of subtasks.

use fixedbitset::FixedBitSet;

/// A dense `rows x columns` matrix of bits.
#[derive(Debug, Clone)]
pub struct BitMatrix {
    rows: Vec<FixedBitSet>,
    columns: usize,
}

impl BitMatrix {
    pub fn new(rows: usize, columns: usize) -> BitMatrix {
        BitMatrix {
            rows: (0..rows).map(|_| FixedBitSet::with_capacity(columns)).collect(),
            columns,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn get(&self, i: usize, j: usize) -> bool {
        self.rows[i].contains(j)
    }

    pub fn set(&mut self, i: usize, j: usize) {
        self.rows[i].insert(j);
    }

    pub fn clear(&mut self, i: usize, j: usize) {
        self.rows[i].set(j, false);
    }

    pub fn row(&self, i: usize) -> &FixedBitSet {
        &self.rows[i]
    }

    pub fn column(&self, j: usize) -> FixedBitSet {
        let mut col = FixedBitSet::with_capacity(self.rows());
        for (i, row) in self.rows.iter().enumerate() {
            if row.contains(j) {
                col.insert(i);
            }
        }
        col
    }

    pub fn cardinality(&self) -> usize {
        self.rows.iter().map(|r| r.count_ones(..)).sum()
    }

    /// Removes a row, shifting the index of every row below it down by one. Does not touch the
    /// column count: rows and columns are removed independently, as required when peeling a
    /// square matrix one task at a time (see [`crate::ordering::OrderingConstraintNetwork`]).
    pub fn remove_row(&mut self, i: usize) {
        self.rows.remove(i);
    }

    /// Removes a column, compacting the bit index of every surviving column greater than `j`
    /// down by one in every row.
    pub fn remove_column(&mut self, j: usize) {
        for row in &mut self.rows {
            let mut shifted = FixedBitSet::with_capacity(self.columns - 1);
            for bit in row.ones() {
                match bit.cmp(&j) {
                    std::cmp::Ordering::Less => shifted.insert(bit),
                    std::cmp::Ordering::Equal => {}
                    std::cmp::Ordering::Greater => shifted.insert(bit - 1),
                }
            }
            *row = shifted;
        }
        self.columns -= 1;
    }
}

/// A square [`BitMatrix`]: `rows() == columns()` is an invariant maintained by every operation
/// exposed here (in particular [`remove`](SquareBitMatrix::remove), which removes the row and the
/// column of the same index together).
#[derive(Debug, Clone)]
pub struct SquareBitMatrix {
    inner: BitMatrix,
}

impl SquareBitMatrix {
    pub fn new(size: usize) -> SquareBitMatrix {
        SquareBitMatrix {
            inner: BitMatrix::new(size, size),
        }
    }

    pub fn size(&self) -> usize {
        self.inner.rows()
    }

    pub fn get(&self, i: usize, j: usize) -> bool {
        self.inner.get(i, j)
    }
    pub fn set(&mut self, i: usize, j: usize) {
        self.inner.set(i, j)
    }
    pub fn clear(&mut self, i: usize, j: usize) {
        self.inner.clear(i, j)
    }
    pub fn row(&self, i: usize) -> &FixedBitSet {
        self.inner.row(i)
    }
    pub fn column(&self, j: usize) -> FixedBitSet {
        self.inner.column(j)
    }
    pub fn cardinality(&self) -> usize {
        self.inner.cardinality()
    }

    /// Removes task `i`: its row and its column together, keeping the matrix square.
    pub fn remove(&mut self, i: usize) {
        self.inner.remove_row(i);
        self.inner.remove_column(i);
    }

    /// In-place Warshall transitive closure: for every `k`, every row `i` that can reach `k`
    /// absorbs everything `k` can reach. Does not add reflexive bits on its own; `M[i][i]`
    /// becomes set only if a genuine cycle through `i` exists.
    pub fn transitive_closure(&mut self) {
        let n = self.size();
        for k in 0..n {
            let row_k = self.inner.row(k).clone();
            for i in 0..n {
                if self.inner.row(i).contains(k) {
                    self.inner.rows[i].union_with(&row_k);
                }
            }
        }
    }

    pub fn is_acyclic_diagonal(&self) -> bool {
        (0..self.size()).all(|i| !self.get(i, i))
    }
}
