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

//! Local rewrites over the flat gate stream.
//!
//! Two rules run to a fixed point: adjacent X pairs on the same qubit
//! cancel, and rotations that equal the identity matrix are dropped. Neither
//! rule changes the unitary of the stream.

use crate::euler_decompose::{r1_is_identity, rotation_is_identity};
use crate::gate::{Axis, Gate};
use crate::linalg::EPSILON;

/// Whether `gate` prevents an X on `qubit` from pairing with a later X.
///
/// A gate on another qubit is transparent. A fully-controlled gate blocks
/// unless the register has no controls at all: its control set contains
/// every other qubit, so it always touches `qubit` when n > 1.
fn blocks_x_pairing(gate: &Gate, qubit: usize, num_qubits: usize) -> bool {
    match gate {
        Gate::Single { qubit: other, .. } => *other == qubit,
        Gate::FullyControlled { target, .. } => num_qubits > 1 || *target == qubit,
    }
}

fn cancel_x_pairs(gates: &mut Vec<Gate>, num_qubits: usize) -> bool {
    let mut changed = false;
    let mut index = 0;
    while index < gates.len() {
        let gate = gates[index];
        let qubit = match gate {
            Gate::Single {
                axis: Axis::X,
                qubit,
                ..
            } => qubit,
            _ => {
                index += 1;
                continue;
            }
        };
        let mut partner = None;
        for (offset, candidate) in gates[index + 1..].iter().enumerate() {
            if let Gate::Single {
                axis: Axis::X,
                qubit: other,
                ..
            } = candidate
            {
                if *other == qubit {
                    partner = Some(index + 1 + offset);
                    break;
                }
            }
            if blocks_x_pairing(candidate, qubit, num_qubits) {
                break;
            }
        }
        if let Some(partner) = partner {
            gates.remove(partner);
            gates.remove(index);
            changed = true;
        } else {
            index += 1;
        }
    }
    changed
}

fn drop_identity_rotations(gates: &mut Vec<Gate>) -> bool {
    let before = gates.len();
    gates.retain(|gate| match gate.axis() {
        Axis::X => true,
        Axis::Rx | Axis::Ry | Axis::Rz => !rotation_is_identity(gate.angle(), EPSILON),
        Axis::R1 => !r1_is_identity(gate.angle(), EPSILON),
    });
    gates.len() != before
}

/// Apply the peephole rewrites until nothing changes. Idempotent.
pub fn optimize_gates(mut gates: Vec<Gate>, num_qubits: usize) -> Vec<Gate> {
    loop {
        let cancelled = cancel_x_pairs(&mut gates, num_qubits);
        let dropped = drop_identity_rotations(&mut gates);
        if !cancelled && !dropped {
            return gates;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn adjacent_x_pairs_cancel() {
        let gates = vec![Gate::x(0), Gate::x(0)];
        assert!(optimize_gates(gates, 2).is_empty());
    }

    #[test]
    fn x_pairs_cancel_through_other_qubits() {
        let gates = vec![
            Gate::x(0),
            Gate::single(Axis::Ry, 0.5, 1),
            Gate::x(0),
        ];
        let optimized = optimize_gates(gates, 2);
        assert_eq!(optimized.len(), 1);
        assert!(matches!(optimized[0], Gate::Single { axis: Axis::Ry, qubit: 1, .. }));
    }

    #[test]
    fn controlled_gates_block_cancellation() {
        let gates = vec![
            Gate::x(1),
            Gate::fully_controlled(Axis::Ry, 0.5, 0),
            Gate::x(1),
        ];
        let optimized = optimize_gates(gates.clone(), 2);
        assert_eq!(optimized.len(), 3);
    }

    #[test]
    fn gate_on_same_qubit_blocks_cancellation() {
        let gates = vec![
            Gate::x(0),
            Gate::single(Axis::Rz, 0.5, 0),
            Gate::x(0),
        ];
        assert_eq!(optimize_gates(gates, 1).len(), 3);
    }

    #[test]
    fn cascading_pairs_cancel_to_nothing() {
        let gates = vec![Gate::x(0), Gate::x(1), Gate::x(1), Gate::x(0)];
        assert!(optimize_gates(gates, 2).is_empty());
    }

    #[test]
    fn zero_rotations_are_dropped() {
        let gates = vec![
            Gate::single(Axis::Rz, 0., 0),
            Gate::single(Axis::Ry, 4. * PI, 1),
            Gate::single(Axis::R1, 2. * PI, 0),
            Gate::single(Axis::Ry, 0.5, 1),
        ];
        let optimized = optimize_gates(gates, 2);
        assert_eq!(optimized.len(), 1);
    }

    #[test]
    fn two_pi_rotation_is_kept() {
        // Ry(2π) is -I, not the identity.
        let gates = vec![Gate::single(Axis::Ry, 2. * PI, 0)];
        assert_eq!(optimize_gates(gates, 1).len(), 1);
    }

    #[test]
    fn optimisation_is_idempotent() {
        let gates = vec![
            Gate::x(0),
            Gate::single(Axis::Rz, 0., 1),
            Gate::x(0),
            Gate::x(1),
            Gate::fully_controlled(Axis::Rz, 1.0, 0),
            Gate::x(1),
        ];
        let once = optimize_gates(gates, 2);
        let twice = optimize_gates(once.clone(), 2);
        assert_eq!(once.len(), twice.len());
        for (a, b) in once.iter().zip(twice.iter()) {
            assert!(a.approx_eq(b, 0.));
        }
    }
}
