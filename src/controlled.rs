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

//! Synthesis of a two-level unitary as a fully-controlled gate block.

use crate::euler_decompose::unitary_to_zyz_gates;
use crate::gate::{Axis, Gate};
use crate::linalg::{is_pauli_x, EPSILON};
use crate::two_level::TwoLevelUnitary;

/// Emit a two-level unitary on a one-bit index pair as gates on an n-qubit
/// register.
///
/// The differing bit is the target. X flips on every non-target qubit whose
/// bit is 0 align the index pair with the all-ones control pattern that a
/// fully-controlled gate fires on; the same flips restore the register
/// afterwards. On a single qubit there are no controls and the block is
/// emitted as plain gates.
pub fn two_level_to_gates(factor: &TwoLevelUnitary, num_qubits: usize) -> Vec<Gate> {
    let diff = factor.index1 ^ factor.index2;
    debug_assert_eq!(diff.count_ones(), 1);
    let target = diff.trailing_zeros() as usize;

    if num_qubits == 1 {
        if is_pauli_x(&factor.matrix, EPSILON) {
            return vec![Gate::x(0)];
        }
        return unitary_to_zyz_gates(&factor.matrix)
            .into_iter()
            .map(|(axis, angle)| Gate::single(axis, angle, 0))
            .collect();
    }

    let flips: Vec<Gate> = (0..num_qubits)
        .filter(|&qubit| qubit != target && (factor.index1 >> qubit) & 1 == 0)
        .map(Gate::x)
        .collect();

    let mut gates = flips.clone();
    if is_pauli_x(&factor.matrix, EPSILON) {
        gates.push(Gate::fully_controlled(Axis::X, 0., target));
    } else {
        gates.extend(
            unitary_to_zyz_gates(&factor.matrix)
                .into_iter()
                .map(|(axis, angle)| Gate::fully_controlled(axis, angle, target)),
        );
    }
    gates.extend(flips);
    gates
}
