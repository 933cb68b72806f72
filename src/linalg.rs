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

use ndarray::prelude::*;
use num_complex::Complex64;
use rand::prelude::*;
use rand_distr::StandardNormal;
use rand_pcg::Pcg64Mcg;

/// Tolerance used for unitarity checks, zero tests and round-trip
/// assertions throughout the crate.
pub const EPSILON: f64 = 1e-9;

/// Angles below this threshold are treated as exact zeros when gates
/// are simplified away.
pub const ANGLE_ZERO_EPSILON: f64 = 1e-12;

pub const C_ZERO: Complex64 = Complex64::new(0., 0.);
pub const C_ONE: Complex64 = Complex64::new(1., 0.);

pub const PAULI_X: [[Complex64; 2]; 2] = [[C_ZERO, C_ONE], [C_ONE, C_ZERO]];

pub const IDENTITY_2X2: [[Complex64; 2]; 2] = [[C_ONE, C_ZERO], [C_ZERO, C_ONE]];

pub fn adjoint(matrix: ArrayView2<Complex64>) -> Array2<Complex64> {
    matrix.t().mapv(|x| x.conj())
}

/// Largest absolute entry-wise difference between two matrices.
pub fn max_abs_diff(a: ArrayView2<Complex64>, b: ArrayView2<Complex64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).norm())
        .fold(0., f64::max)
}

pub fn allclose(a: ArrayView2<Complex64>, b: ArrayView2<Complex64>, atol: f64) -> bool {
    a.dim() == b.dim() && max_abs_diff(a, b) <= atol
}

pub fn is_unitary(matrix: ArrayView2<Complex64>, atol: f64) -> bool {
    let (rows, cols) = matrix.dim();
    if rows != cols {
        return false;
    }
    let product = matrix.dot(&adjoint(matrix));
    allclose(product.view(), Array2::eye(rows).view(), atol)
}

pub fn mat2_allclose(a: &[[Complex64; 2]; 2], b: &[[Complex64; 2]; 2], atol: f64) -> bool {
    (0..2).all(|i| (0..2).all(|j| (a[i][j] - b[i][j]).norm() <= atol))
}

pub fn is_pauli_x(matrix: &[[Complex64; 2]; 2], atol: f64) -> bool {
    mat2_allclose(matrix, &PAULI_X, atol)
}

pub fn mat2_mul(a: &[[Complex64; 2]; 2], b: &[[Complex64; 2]; 2]) -> [[Complex64; 2]; 2] {
    let mut out = [[C_ZERO; 2]; 2];
    for i in 0..2 {
        for j in 0..2 {
            out[i][j] = a[i][0] * b[0][j] + a[i][1] * b[1][j];
        }
    }
    out
}

pub fn mat2_adjoint(m: &[[Complex64; 2]; 2]) -> [[Complex64; 2]; 2] {
    [
        [m[0][0].conj(), m[1][0].conj()],
        [m[0][1].conj(), m[1][1].conj()],
    ]
}

pub fn mat2_det(m: &[[Complex64; 2]; 2]) -> Complex64 {
    m[0][0] * m[1][1] - m[0][1] * m[1][0]
}

/// Conjugate a 2x2 block by Pauli-X, i.e. swap the basis order of the pair
/// it acts on.
pub fn mat2_x_conjugate(m: &[[Complex64; 2]; 2]) -> [[Complex64; 2]; 2] {
    [[m[1][1], m[1][0]], [m[0][1], m[0][0]]]
}

pub fn rx_matrix(theta: f64) -> [[Complex64; 2]; 2] {
    let half = theta / 2.;
    let cos = Complex64::new(half.cos(), 0.);
    let isin = Complex64::new(0., -half.sin());
    [[cos, isin], [isin, cos]]
}

pub fn ry_matrix(theta: f64) -> [[Complex64; 2]; 2] {
    let half = theta / 2.;
    let cos = Complex64::new(half.cos(), 0.);
    let sin = Complex64::new(half.sin(), 0.);
    [[cos, -sin], [sin, cos]]
}

pub fn rz_matrix(theta: f64) -> [[Complex64; 2]; 2] {
    let half = Complex64::new(0., theta / 2.);
    [[(-half).exp(), C_ZERO], [C_ZERO, half.exp()]]
}

pub fn r1_matrix(theta: f64) -> [[Complex64; 2]; 2] {
    [
        [C_ONE, C_ZERO],
        [C_ZERO, Complex64::from_polar(1., theta)],
    ]
}

/// A Haar-distributed random unitary, from the QR-style orthonormalization
/// of a complex Gaussian matrix. Deterministic in the seed.
pub fn random_unitary(dim: usize, seed: u64) -> Array2<Complex64> {
    let mut rng = Pcg64Mcg::seed_from_u64(seed);
    let mut columns: Vec<Vec<Complex64>> = (0..dim)
        .map(|_| {
            (0..dim)
                .map(|_| Complex64::new(rng.sample(StandardNormal), rng.sample(StandardNormal)))
                .collect()
        })
        .collect();
    // Gram-Schmidt
    for k in 0..dim {
        for prev in 0..k {
            let inner: Complex64 = (0..dim)
                .map(|r| columns[prev][r].conj() * columns[k][r])
                .sum();
            for r in 0..dim {
                let correction = inner * columns[prev][r];
                columns[k][r] -= correction;
            }
        }
        let norm: f64 = columns[k].iter().map(|x| x.norm_sqr()).sum::<f64>().sqrt();
        for r in 0..dim {
            columns[k][r] /= norm;
        }
    }
    Array2::from_shape_fn((dim, dim), |(r, c)| columns[c][r])
}
