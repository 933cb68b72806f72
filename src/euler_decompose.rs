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

//! ZYZ Euler-angle decomposition of 2x2 unitaries.
//!
//! Any unitary factors exactly as `U = Rz(α)·Ry(θ)·Rz(β)·R1(φ)` with
//! `φ = arg(det U)`, so a gate stream needs no global-phase side channel:
//! the determinant phase is carried by a real R1 gate. This keeps
//! fully-controlled emission phase-faithful, where the phase is observable.

use num_complex::Complex64;
use smallvec::SmallVec;
use std::f64::consts::PI;

use crate::gate::Axis;
use crate::linalg::{mat2_det, ANGLE_ZERO_EPSILON};

pub type OneQubitGateList = SmallVec<[(Axis, f64); 4]>;

/// Wrap an angle into [-π, π). Within `atol` of π it clamps to -π.
pub fn mod_2pi(angle: f64, atol: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(2. * PI) - PI;
    if (wrapped - PI).abs() < atol {
        -PI
    } else {
        wrapped
    }
}

/// Whether an Rx/Ry/Rz gate with this angle is the identity matrix.
/// Half-angle rotations have period 4π; 2π is -I and must be kept.
pub fn rotation_is_identity(angle: f64, atol: f64) -> bool {
    let wrapped = angle.rem_euclid(4. * PI);
    wrapped.min(4. * PI - wrapped) < atol
}

/// Whether an R1 gate with this angle is the identity matrix (period 2π).
pub fn r1_is_identity(angle: f64, atol: f64) -> bool {
    mod_2pi(angle, atol).abs() < atol
}

/// Extract `[θ, α, β, φ]` with `U = Rz(α)·Ry(θ)·Rz(β)·R1(φ)` exactly.
///
/// The special-unitary part `V = R1(-φ)·U` satisfies
/// `V = [[cos(θ/2)e^{-i(α+β)/2}, -sin(θ/2)e^{-i(α-β)/2}],
///       [sin(θ/2)e^{i(α-β)/2},   cos(θ/2)e^{i(α+β)/2}]]`,
/// so both z-angles read off the bottom row. The diagonal and
/// anti-diagonal cases need no branch: `atan2(0, 0) = 0`.
pub fn params_zyz(matrix: &[[Complex64; 2]; 2]) -> [f64; 4] {
    let phi = mat2_det(matrix).arg();
    let lower_phase = Complex64::from_polar(1., -phi);
    let v10 = matrix[1][0] * lower_phase;
    let v11 = matrix[1][1] * lower_phase;
    let theta = 2. * v10.norm().atan2(v11.norm());
    let alpha = v11.arg() + v10.arg();
    let beta = v11.arg() - v10.arg();
    [theta, alpha, beta, phi]
}

/// Decompose a 2x2 unitary into a rotation-gate list in application order.
/// Identity factors are dropped; the stream multiplies back to the input
/// exactly, including its determinant phase.
pub fn unitary_to_zyz_gates(matrix: &[[Complex64; 2]; 2]) -> OneQubitGateList {
    let [theta, alpha, beta, phi] = params_zyz(matrix);
    let mut gates = OneQubitGateList::new();
    let (theta, alpha, beta) = if theta.abs() < ANGLE_ZERO_EPSILON {
        (0., alpha + beta, 0.)
    } else {
        (theta, alpha, beta)
    };
    if !rotation_is_identity(beta, ANGLE_ZERO_EPSILON) {
        gates.push((Axis::Rz, beta));
    }
    if !rotation_is_identity(theta, ANGLE_ZERO_EPSILON) {
        gates.push((Axis::Ry, theta));
    }
    if !rotation_is_identity(alpha, ANGLE_ZERO_EPSILON) {
        gates.push((Axis::Rz, alpha));
    }
    if !r1_is_identity(phi, ANGLE_ZERO_EPSILON) {
        gates.push((Axis::R1, phi));
    }
    gates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg::{
        mat2_allclose, mat2_mul, r1_matrix, random_unitary, ry_matrix, rz_matrix, IDENTITY_2X2,
        PAULI_X,
    };
    use num_complex::Complex64;

    fn rebuild(gates: &OneQubitGateList) -> [[Complex64; 2]; 2] {
        let mut out = IDENTITY_2X2;
        for (axis, angle) in gates {
            let m = match axis {
                Axis::Ry => ry_matrix(*angle),
                Axis::Rz => rz_matrix(*angle),
                Axis::R1 => r1_matrix(*angle),
                _ => unreachable!("zyz emits rotations only"),
            };
            out = mat2_mul(&m, &out);
        }
        out
    }

    fn mat2_of(seed: u64) -> [[Complex64; 2]; 2] {
        let u = random_unitary(2, seed);
        [[u[[0, 0]], u[[0, 1]]], [u[[1, 0]], u[[1, 1]]]]
    }

    #[test]
    fn round_trips_random_unitaries() {
        for seed in 0..50 {
            let m = mat2_of(seed);
            let rebuilt = rebuild(&unitary_to_zyz_gates(&m));
            assert!(mat2_allclose(&rebuilt, &m, 1e-12), "seed {seed}");
        }
    }

    #[test]
    fn identity_produces_no_gates() {
        assert!(unitary_to_zyz_gates(&IDENTITY_2X2).is_empty());
    }

    #[test]
    fn hadamard_round_trips() {
        let s = Complex64::new(std::f64::consts::FRAC_1_SQRT_2, 0.);
        let h = [[s, s], [s, -s]];
        let rebuilt = rebuild(&unitary_to_zyz_gates(&h));
        assert!(mat2_allclose(&rebuilt, &h, 1e-12));
    }

    #[test]
    fn pauli_x_round_trips_through_rotations() {
        let rebuilt = rebuild(&unitary_to_zyz_gates(&PAULI_X));
        assert!(mat2_allclose(&rebuilt, &PAULI_X, 1e-12));
    }

    #[test]
    fn minus_identity_keeps_its_sign() {
        let m = [
            [Complex64::new(-1., 0.), Complex64::new(0., 0.)],
            [Complex64::new(0., 0.), Complex64::new(-1., 0.)],
        ];
        let gates = unitary_to_zyz_gates(&m);
        assert!(!gates.is_empty());
        assert!(mat2_allclose(&rebuild(&gates), &m, 1e-12));
    }

    #[test]
    fn diagonal_phase_becomes_r1() {
        let m = [
            [Complex64::new(1., 0.), Complex64::new(0., 0.)],
            [Complex64::new(0., 0.), Complex64::from_polar(1., 0.7)],
        ];
        let gates = unitary_to_zyz_gates(&m);
        assert!(mat2_allclose(&rebuild(&gates), &m, 1e-12));
        assert!(gates.iter().any(|(axis, _)| *axis == Axis::R1));
    }

    #[test]
    fn mod_2pi_clamps_endpoint() {
        use approx::assert_abs_diff_eq;
        assert_eq!(mod_2pi(std::f64::consts::PI, 1e-12), -std::f64::consts::PI);
        assert_abs_diff_eq!(mod_2pi(2. * std::f64::consts::PI, 1e-12), 0., epsilon = 1e-12);
    }

    #[test]
    fn rotation_identity_period_is_4pi() {
        let two_pi = 2. * std::f64::consts::PI;
        assert!(rotation_is_identity(0., 1e-12));
        assert!(rotation_is_identity(2. * two_pi, 1e-9));
        assert!(!rotation_is_identity(two_pi, 1e-9));
        assert!(r1_is_identity(two_pi, 1e-9));
    }
}
