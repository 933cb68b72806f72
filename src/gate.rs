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

use crate::linalg::{r1_matrix, rx_matrix, ry_matrix, rz_matrix, C_ZERO, PAULI_X};

/// The primitive single-qubit operations the synthesis targets.
///
/// `X` is the plain Pauli flip and carries no angle; the rotation axes are
/// the standard half-angle rotations, and `R1(θ) = diag(1, e^{iθ})`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Rx,
    Ry,
    Rz,
    R1,
}

impl Axis {
    pub fn name(&self) -> &'static str {
        match self {
            Axis::X => "X",
            Axis::Rx => "Rx",
            Axis::Ry => "Ry",
            Axis::Rz => "Rz",
            Axis::R1 => "R1",
        }
    }
}

/// A gate in the output stream.
///
/// A `FullyControlled` gate applies its operation to `target` conditioned on
/// every other qubit of the register being |1⟩. Gate streams are ordered in
/// application order: the first element is applied first. Qubit 0 is the
/// least significant bit of a basis-state index.
#[derive(Clone, Copy, Debug)]
pub enum Gate {
    Single {
        axis: Axis,
        angle: f64,
        qubit: usize,
    },
    FullyControlled {
        axis: Axis,
        angle: f64,
        target: usize,
    },
}

impl Gate {
    pub fn single(axis: Axis, angle: f64, qubit: usize) -> Self {
        Gate::Single { axis, angle, qubit }
    }

    pub fn fully_controlled(axis: Axis, angle: f64, target: usize) -> Self {
        Gate::FullyControlled {
            axis,
            angle,
            target,
        }
    }

    pub fn x(qubit: usize) -> Self {
        Gate::Single {
            axis: Axis::X,
            angle: 0.,
            qubit,
        }
    }

    pub fn axis(&self) -> Axis {
        match self {
            Gate::Single { axis, .. } | Gate::FullyControlled { axis, .. } => *axis,
        }
    }

    pub fn angle(&self) -> f64 {
        match self {
            Gate::Single { angle, .. } | Gate::FullyControlled { angle, .. } => *angle,
        }
    }

    pub fn is_controlled(&self) -> bool {
        matches!(self, Gate::FullyControlled { .. })
    }

    /// Field-wise equality with angle tolerance.
    pub fn approx_eq(&self, other: &Gate, atol: f64) -> bool {
        match (self, other) {
            (
                Gate::Single { axis, angle, qubit },
                Gate::Single {
                    axis: axis2,
                    angle: angle2,
                    qubit: qubit2,
                },
            ) => axis == axis2 && qubit == qubit2 && (angle - angle2).abs() <= atol,
            (
                Gate::FullyControlled { axis, angle, target },
                Gate::FullyControlled {
                    axis: axis2,
                    angle: angle2,
                    target: target2,
                },
            ) => axis == axis2 && target == target2 && (angle - angle2).abs() <= atol,
            _ => false,
        }
    }

    pub fn matrix2(&self) -> [[Complex64; 2]; 2] {
        match self.axis() {
            Axis::X => PAULI_X,
            Axis::Rx => rx_matrix(self.angle()),
            Axis::Ry => ry_matrix(self.angle()),
            Axis::Rz => rz_matrix(self.angle()),
            Axis::R1 => r1_matrix(self.angle()),
        }
    }

    /// The full 2^n x 2^n matrix of this gate on an n-qubit register.
    pub fn full_matrix(&self, num_qubits: usize) -> Array2<Complex64> {
        let dim = 1 << num_qubits;
        let m2 = self.matrix2();
        match self {
            Gate::Single { qubit, .. } => {
                let mask = 1usize << qubit;
                Array2::from_shape_fn((dim, dim), |(row, col)| {
                    if row & !mask != col & !mask {
                        C_ZERO
                    } else {
                        m2[(row & mask).min(1)][(col & mask).min(1)]
                    }
                })
            }
            Gate::FullyControlled { target, .. } => {
                // Non-identity only on the pair of basis states with every
                // non-target qubit set.
                let hi = dim - 1;
                let lo = hi - (1 << target);
                let mut out = Array2::eye(dim);
                out[[lo, lo]] = m2[0][0];
                out[[lo, hi]] = m2[0][1];
                out[[hi, lo]] = m2[1][0];
                out[[hi, hi]] = m2[1][1];
                out
            }
        }
    }
}

/// Multiply a gate stream back into a single matrix, in application order.
/// This is the reference semantics used by the round-trip tests.
pub fn gates_to_matrix(gates: &[Gate], num_qubits: usize) -> Array2<Complex64> {
    let dim = 1 << num_qubits;
    let mut out = Array2::eye(dim);
    for gate in gates {
        out = gate.full_matrix(num_qubits).dot(&out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg::{allclose, EPSILON};
    use ndarray::array;
    use std::f64::consts::PI;

    #[test]
    fn single_x_embeds_on_correct_qubit() {
        let m = Gate::x(0).full_matrix(2);
        let expected = array![
            [C_ZERO, Complex64::new(1., 0.), C_ZERO, C_ZERO],
            [Complex64::new(1., 0.), C_ZERO, C_ZERO, C_ZERO],
            [C_ZERO, C_ZERO, C_ZERO, Complex64::new(1., 0.)],
            [C_ZERO, C_ZERO, Complex64::new(1., 0.), C_ZERO],
        ];
        assert!(allclose(m.view(), expected.view(), EPSILON));
    }

    #[test]
    fn fully_controlled_x_is_cnot() {
        // Control q1, target q0: swaps |10> and |11>.
        let m = Gate::fully_controlled(Axis::X, 0., 0).full_matrix(2);
        let mut expected = Array2::eye(4);
        expected[[2, 2]] = C_ZERO;
        expected[[3, 3]] = C_ZERO;
        expected[[2, 3]] = Complex64::new(1., 0.);
        expected[[3, 2]] = Complex64::new(1., 0.);
        assert!(allclose(m.view(), expected.view(), EPSILON));
    }

    #[test]
    fn stream_order_is_application_order() {
        let gates = [Gate::x(0), Gate::single(Axis::Rz, PI / 2., 0)];
        let m = gates_to_matrix(&gates, 1);
        // Rz applied after X.
        let expected = Gate::single(Axis::Rz, PI / 2., 0)
            .full_matrix(1)
            .dot(&Gate::x(0).full_matrix(1));
        assert!(allclose(m.view(), expected.view(), EPSILON));
    }

    #[test]
    fn approx_eq_tolerates_angle_noise() {
        let a = Gate::single(Axis::Ry, 1.0, 2);
        let b = Gate::single(Axis::Ry, 1.0 + 1e-12, 2);
        assert!(a.approx_eq(&b, 1e-9));
        assert!(!a.approx_eq(&Gate::single(Axis::Rz, 1.0, 2), 1e-9));
        assert!(!a.approx_eq(&Gate::fully_controlled(Axis::Ry, 1.0, 2), 1e-9));
    }
}
