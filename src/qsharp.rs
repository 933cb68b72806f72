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

//! Q# text emission.
//!
//! Q# rotates in the opposite direction, so Rx/Ry/Rz angles are negated in
//! the emitted text; R1 angles are not. A fully-controlled X with a single
//! control is written as CNOT.

use itertools::Itertools;
use smallvec::SmallVec;

use crate::gate::{Axis, Gate};

fn angle(value: f64) -> String {
    format!("{value:.15}")
}

fn controls(num_qubits: usize, target: usize) -> SmallVec<[usize; 4]> {
    (0..num_qubits).filter(|&q| q != target).collect()
}

fn statement(gate: &Gate, num_qubits: usize) -> String {
    match gate {
        Gate::Single { axis, angle: theta, qubit } => match axis {
            Axis::X => format!("X(qs[{qubit}]);"),
            Axis::R1 => format!("R1({}, qs[{qubit}]);", angle(*theta)),
            _ => format!("{}({}, qs[{qubit}]);", axis.name(), angle(-theta)),
        },
        Gate::FullyControlled { axis, angle: theta, target } => {
            let control_list = controls(num_qubits, *target);
            if control_list.is_empty() {
                return statement(
                    &Gate::single(*axis, *theta, *target),
                    num_qubits,
                );
            }
            let rendered = control_list
                .iter()
                .map(|c| format!("qs[{c}]"))
                .join(", ");
            match axis {
                Axis::X if control_list.len() == 1 => {
                    format!("CNOT(qs[{}], qs[{target}]);", control_list[0])
                }
                Axis::X => format!("Controlled X([{rendered}], (qs[{target}]));"),
                Axis::R1 => format!(
                    "Controlled R1([{rendered}], ({}, qs[{target}]));",
                    angle(*theta)
                ),
                _ => format!(
                    "Controlled {}([{rendered}], ({}, qs[{target}]));",
                    axis.name(),
                    angle(-theta)
                ),
            }
        }
    }
}

/// Render a gate stream as a Q# operation acting on a register `qs`.
pub fn format_qsharp(gates: &[Gate], num_qubits: usize, op_name: &str) -> String {
    let mut lines = Vec::with_capacity(gates.len() + 2);
    lines.push(format!("operation {op_name} (qs : Qubit[]) : Unit {{"));
    lines.extend(gates.iter().map(|gate| format!("  {}", statement(gate, num_qubits))));
    lines.push("}".to_string());
    lines.join("\n") + "\n"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_angles_are_negated() {
        let line = statement(&Gate::single(Axis::Ry, 0.5, 1), 2);
        assert_eq!(line, "Ry(-0.500000000000000, qs[1]);");
    }

    #[test]
    fn r1_angle_keeps_its_sign() {
        let line = statement(&Gate::single(Axis::R1, 0.5, 0), 2);
        assert_eq!(line, "R1(0.500000000000000, qs[0]);");
    }

    #[test]
    fn plain_x_has_no_angle() {
        assert_eq!(statement(&Gate::x(3), 4), "X(qs[3]);");
    }

    #[test]
    fn single_control_x_is_cnot() {
        let line = statement(&Gate::fully_controlled(Axis::X, 0., 0), 2);
        assert_eq!(line, "CNOT(qs[1], qs[0]);");
    }

    #[test]
    fn multi_control_gates_use_controlled_functor() {
        let line = statement(&Gate::fully_controlled(Axis::X, 0., 1), 3);
        assert_eq!(line, "Controlled X([qs[0], qs[2]], (qs[1]));");
        let line = statement(&Gate::fully_controlled(Axis::Rz, -0.25, 0), 3);
        assert_eq!(
            line,
            "Controlled Rz([qs[1], qs[2]], (0.250000000000000, qs[0]));"
        );
    }

    #[test]
    fn controlled_gate_on_one_qubit_register_is_single() {
        let line = statement(&Gate::fully_controlled(Axis::Ry, 1.0, 0), 1);
        assert_eq!(line, "Ry(-1.000000000000000, qs[0]);");
    }

    #[test]
    fn operation_block_shape() {
        let text = format_qsharp(&[Gate::x(0)], 1, "Apply");
        assert_eq!(text, "operation Apply (qs : Qubit[]) : Unit {\n  X(qs[0]);\n}\n");
    }

    #[test]
    fn empty_stream_emits_empty_body() {
        let text = format_qsharp(&[], 2, "Apply");
        assert_eq!(text, "operation Apply (qs : Qubit[]) : Unit {\n}\n");
    }
}
