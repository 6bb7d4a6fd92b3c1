use std::collections::BTreeMap;

use ndarray::Array2;

use crate::building::BuildingId;
use crate::error::InvariantError;

/// Marker for a cell no worker has written yet.
const UNSET: u32 = u32::MAX;

/// A complete, symmetric, zero-diagonal table of obstruction counts,
/// indexed by building id.
///
/// Only produced by `MatrixBuilder::finish`, which verifies every invariant,
/// so a `CrossingMatrix` in hand is always fully populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossingMatrix {
    cells: Array2<u32>,
}

impl CrossingMatrix {
    /// Number of buildings covered (the matrix is `len x len`).
    #[inline] pub fn len(&self) -> usize { self.cells.nrows() }

    #[inline] pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Obstruction count between two buildings.
    pub fn get(&self, a: BuildingId, b: BuildingId) -> Option<u32> {
        self.cells.get((a.index(), b.index())).copied()
    }

    /// The full row of counts for `id`, ordered by building id.
    pub fn row(&self, id: BuildingId) -> Option<Vec<u32>> {
        (id.index() < self.len()).then(|| self.cells.row(id.index()).to_vec())
    }

    /// Borrow the dense table. Row and column `k` belong to `BuildingId(k + 1)`.
    #[inline] pub fn as_array(&self) -> &Array2<u32> { &self.cells }

    /// Sparse upper-triangle view: every pair `(a, b)` with `a < b` and a
    /// non-zero count.
    pub fn edges(&self) -> impl Iterator<Item = (BuildingId, BuildingId, u32)> + '_ {
        self.cells.indexed_iter()
            .filter(|&((i, j), &count)| i < j && count > 0)
            .map(|((i, j), &count)| (BuildingId::from_index(i), BuildingId::from_index(j), count))
    }

    /// Dense row-per-building export: `{id: [count to 1, count to 2, ...]}`.
    pub fn to_rows(&self) -> BTreeMap<u32, Vec<u32>> {
        self.cells.outer_iter().enumerate()
            .map(|(i, row)| (BuildingId::from_index(i).0, row.to_vec()))
            .collect()
    }

    /// Re-check the matrix invariants: no unset cell, zero diagonal, symmetry,
    /// and no count above `n - 2`.
    pub fn verify(&self) -> Result<(), InvariantError> {
        verify(&self.cells)
    }
}

/// Collects per-pair counts and produces a verified `CrossingMatrix`.
#[derive(Debug)]
pub(crate) struct MatrixBuilder {
    cells: Array2<u32>,
}

impl MatrixBuilder {
    /// Allocate all `n x n` cells up front, with the diagonal already zero.
    pub(crate) fn new(n: usize) -> Self {
        let mut cells = Array2::from_elem((n, n), UNSET);
        cells.diag_mut().fill(0);
        Self { cells }
    }

    /// Record the count for the unordered pair `(i, j)`, writing both cells.
    pub(crate) fn record(&mut self, i: usize, j: usize, count: u32) -> Result<(), InvariantError> {
        if self.cells[[i, j]] != UNSET || self.cells[[j, i]] != UNSET {
            return Err(InvariantError::DuplicateWrite {
                row: BuildingId::from_index(i),
                col: BuildingId::from_index(j),
            });
        }
        self.cells[[i, j]] = count;
        self.cells[[j, i]] = count;
        Ok(())
    }

    /// Verify every invariant and hand out the finished matrix.
    pub(crate) fn finish(self) -> Result<CrossingMatrix, InvariantError> {
        verify(&self.cells)?;
        Ok(CrossingMatrix { cells: self.cells })
    }
}

fn verify(cells: &Array2<u32>) -> Result<(), InvariantError> {
    let n = cells.nrows();
    let max = n.saturating_sub(2) as u32;

    for ((i, j), &count) in cells.indexed_iter() {
        let (row, col) = (BuildingId::from_index(i), BuildingId::from_index(j));
        if count == UNSET {
            return Err(InvariantError::UnsetCell { row, col });
        }
        if i == j {
            if count != 0 {
                return Err(InvariantError::NonZeroDiagonal { id: row, value: count });
            }
            continue;
        }
        let backward = cells[[j, i]];
        if count != backward {
            return Err(InvariantError::Asymmetric { row, col, forward: count, backward });
        }
        if count > max {
            return Err(InvariantError::CountOutOfBounds { row, col, count, max });
        }
    }
    Ok(())
}
