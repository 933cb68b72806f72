// This code is part of unitary-synth.
//
// (C) Copyright IBM 2025
//
// This code is licensed under the Apache License, Version 2.0. You may
// obtain a copy of this license in the LICENSE.txt file in the root directory
// of this source tree or at http://www.apache.org/licenses/LICENSE-2.0.
//
// Any modifications or derivative works of this code must retain this
// copyright notice, and modified files need to carry a notice indicating
// that they have been altered from the originals.

//! Two-level factorisation of a unitary matrix.
//!
//! The matrix is first relabeled through the binary-reflected Gray code so
//! that neighbouring row indices differ in exactly one bit. Entries are then
//! eliminated row by row with 2x2 column rotations acting on neighbouring
//! column pairs, which keeps every recorded factor on a one-bit index pair
//! after the labels are mapped back.

use ndarray::prelude::*;
use num_complex::Complex64;

use crate::linalg::{
    mat2_adjoint, mat2_allclose, mat2_x_conjugate, C_ONE, C_ZERO, EPSILON, IDENTITY_2X2, PAULI_X,
};

/// A unitary equal to the identity outside one 2x2 subblock.
///
/// The full matrix coincides with the identity except that rows and columns
/// (`index1`, `index2`) hold `matrix`. Invariant: `index1 < index2` and
/// `matrix` is unitary.
#[derive(Clone, Copy, Debug)]
pub struct TwoLevelUnitary {
    pub index1: usize,
    pub index2: usize,
    pub matrix: [[Complex64; 2]; 2],
}

impl TwoLevelUnitary {
    pub fn new(index1: usize, index2: usize, matrix: [[Complex64; 2]; 2]) -> Self {
        if index1 <= index2 {
            TwoLevelUnitary {
                index1,
                index2,
                matrix,
            }
        } else {
            TwoLevelUnitary {
                index1: index2,
                index2: index1,
                matrix: mat2_x_conjugate(&matrix),
            }
        }
    }

    /// Relabel the pair this block acts on.
    pub fn permuted(&self, perm: &[usize]) -> Self {
        TwoLevelUnitary::new(perm[self.index1], perm[self.index2], self.matrix)
    }

    pub fn full_matrix(&self, dim: usize) -> Array2<Complex64> {
        let mut out = Array2::eye(dim);
        out[[self.index1, self.index1]] = self.matrix[0][0];
        out[[self.index1, self.index2]] = self.matrix[0][1];
        out[[self.index2, self.index1]] = self.matrix[1][0];
        out[[self.index2, self.index2]] = self.matrix[1][1];
        out
    }
}

/// The binary-reflected Gray sequence of length `dim`; consecutive entries
/// differ in exactly one bit.
pub fn gray_permutation(dim: usize) -> Vec<usize> {
    (0..dim).map(|x| x ^ (x >> 1)).collect()
}

/// Unitary G with `[a, b] · G = [hypot(|a|, |b|), 0]`.
///
/// hypot-style normalisation avoids cancellation for small entries; the
/// result leaves the surviving entry real and non-negative, so fully
/// eliminated rows need no residual phase factor.
fn eliminating_matrix(a: Complex64, b: Complex64) -> [[Complex64; 2]; 2] {
    let hypot = a.norm().hypot(b.norm());
    let cos = a.norm() / hypot;
    let sin = b.norm() / hypot;
    let lambda = -a.arg();
    let mu = std::f64::consts::PI + b.arg() - a.arg() - lambda;
    [
        [
            Complex64::from_polar(cos, lambda),
            Complex64::from_polar(sin, mu),
        ],
        [
            Complex64::from_polar(-sin, -mu),
            Complex64::from_polar(cos, -lambda),
        ],
    ]
}

/// Multiply `matrix` on the right by the two-level block (`col1`, `col2`, `m2`).
fn multiply_into_columns(
    matrix: &mut Array2<Complex64>,
    col1: usize,
    col2: usize,
    m2: &[[Complex64; 2]; 2],
) {
    for row in 0..matrix.nrows() {
        let x = matrix[[row, col1]];
        let y = matrix[[row, col2]];
        matrix[[row, col1]] = x * m2[0][0] + y * m2[1][0];
        matrix[[row, col2]] = x * m2[0][1] + y * m2[1][1];
    }
}

/// Factor `matrix` into two-level unitaries on neighbouring index pairs.
/// The product of the factors in application order equals the input.
fn two_level_decompose(matrix: ArrayView2<Complex64>) -> Vec<TwoLevelUnitary> {
    let dim = matrix.nrows();
    let mut work = matrix.to_owned();
    let mut result = Vec::new();

    for row in 0..dim.saturating_sub(2) {
        for col in ((row + 1)..dim).rev() {
            if work[[row, col]].norm() <= EPSILON {
                continue;
            }
            let block = if work[[row, col - 1]].norm() <= EPSILON {
                PAULI_X
            } else {
                eliminating_matrix(work[[row, col - 1]], work[[row, col]])
            };
            multiply_into_columns(&mut work, col - 1, col, &block);
            result.push(TwoLevelUnitary::new(col - 1, col, mat2_adjoint(&block)));
        }
    }

    // Rows that needed no elimination may leave a unit-modulus phase on the
    // diagonal; absorb each into a diagonal factor on its neighbour pair.
    for row in 0..dim.saturating_sub(2) {
        let phase = work[[row, row]];
        if (phase - C_ONE).norm() > EPSILON {
            result.push(TwoLevelUnitary::new(
                row,
                row + 1,
                [[phase, C_ZERO], [C_ZERO, C_ONE]],
            ));
        }
    }

    if dim >= 2 {
        let block = [
            [work[[dim - 2, dim - 2]], work[[dim - 2, dim - 1]]],
            [work[[dim - 1, dim - 2]], work[[dim - 1, dim - 1]]],
        ];
        if !mat2_allclose(&block, &IDENTITY_2X2, EPSILON) {
            result.push(TwoLevelUnitary::new(dim - 2, dim - 1, block));
        }
    }
    result
}

/// Factor `matrix` into two-level unitaries, each acting on an index pair
/// whose binary representations differ in exactly one bit.
pub fn two_level_decompose_gray(matrix: ArrayView2<Complex64>) -> Vec<TwoLevelUnitary> {
    let dim = matrix.nrows();
    let perm = gray_permutation(dim);
    let relabeled = Array2::from_shape_fn((dim, dim), |(i, j)| matrix[[perm[i], perm[j]]]);
    two_level_decompose(relabeled.view())
        .into_iter()
        .map(|factor| factor.permuted(&perm))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg::{allclose, random_unitary};

    fn product(factors: &[TwoLevelUnitary], dim: usize) -> Array2<Complex64> {
        let mut out = Array2::eye(dim);
        for factor in factors {
            out = factor.full_matrix(dim).dot(&out);
        }
        out
    }

    #[test]
    fn gray_neighbours_differ_in_one_bit() {
        for dim in [2, 4, 8, 16, 32] {
            let perm = gray_permutation(dim);
            for pair in perm.windows(2) {
                assert_eq!((pair[0] ^ pair[1]).count_ones(), 1);
            }
        }
    }

    #[test]
    fn factors_multiply_back_to_input() {
        for (dim, seed) in [(2, 1u64), (4, 2), (8, 3), (16, 4)] {
            let u = random_unitary(dim, seed);
            let factors = two_level_decompose_gray(u.view());
            assert!(allclose(product(&factors, dim).view(), u.view(), 1e-8));
        }
    }

    #[test]
    fn factor_count_is_bounded() {
        for (dim, seed) in [(2, 7u64), (4, 8), (8, 9), (16, 10)] {
            let u = random_unitary(dim, seed);
            let factors = two_level_decompose_gray(u.view());
            assert!(factors.len() <= dim * (dim - 1) / 2);
        }
    }

    #[test]
    fn factors_act_on_one_bit_pairs() {
        let u = random_unitary(16, 11);
        for factor in two_level_decompose_gray(u.view()) {
            assert!(factor.index1 < factor.index2);
            assert_eq!((factor.index1 ^ factor.index2).count_ones(), 1);
        }
    }

    #[test]
    fn identity_needs_no_factors() {
        let eye: Array2<Complex64> = Array2::eye(8);
        assert!(two_level_decompose_gray(eye.view()).is_empty());
    }

    #[test]
    fn diagonal_phases_are_absorbed() {
        let phases = [0.7, 0., -1.1, 0.4];
        let diag = Array2::from_shape_fn((4, 4), |(i, j)| {
            if i == j {
                Complex64::from_polar(1., phases[i])
            } else {
                C_ZERO
            }
        });
        let factors = two_level_decompose_gray(diag.view());
        assert!(allclose(product(&factors, 4).view(), diag.view(), 1e-9));
    }

    #[test]
    fn swap_factorises_into_three_flips() {
        let mut swap: Array2<Complex64> = Array2::eye(4);
        swap[[1, 1]] = C_ZERO;
        swap[[2, 2]] = C_ZERO;
        swap[[1, 2]] = C_ONE;
        swap[[2, 1]] = C_ONE;
        let factors = two_level_decompose_gray(swap.view());
        assert_eq!(factors.len(), 3);
        for factor in &factors {
            assert!(crate::linalg::is_pauli_x(&factor.matrix, EPSILON));
        }
        assert!(allclose(product(&factors, 4).view(), swap.view(), 1e-12));
    }

    #[test]
    fn normalisation_orders_indices() {
        let factor = TwoLevelUnitary::new(3, 1, PAULI_X);
        assert_eq!((factor.index1, factor.index2), (1, 3));
    }
}
