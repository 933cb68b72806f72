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

//! Conversion of gate streams into Cirq circuits.
//!
//! Only compiled with the `cirq` feature; requires a Python environment with
//! cirq importable. Cirq's rotation direction matches Q#, so Rx/Ry/Rz angles
//! are negated here as well, and R1 maps to `ZPowGate(exponent = θ/π)`.
//! Cirq's qubit 0 is the most significant, hence the reversed LineQubit
//! range.

use ndarray::ArrayView2;
use num_complex::Complex64;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyTuple};
use std::f64::consts::PI;

use crate::gate::{Axis, Gate};
use crate::{decompose_to_gates, validate_unitary};

fn axis_gate<'py>(
    cirq: &Bound<'py, PyModule>,
    axis: Axis,
    angle: f64,
) -> PyResult<Bound<'py, PyAny>> {
    match axis {
        Axis::X => cirq.getattr("X"),
        Axis::Rx => cirq.call_method1("rx", (-angle,)),
        Axis::Ry => cirq.call_method1("ry", (-angle,)),
        Axis::Rz => cirq.call_method1("rz", (-angle,)),
        Axis::R1 => {
            let kwargs = PyDict::new_bound(cirq.py());
            kwargs.set_item("exponent", angle / PI)?;
            cirq.getattr("ZPowGate")?.call((), Some(&kwargs))
        }
    }
}

/// Build a `cirq.Circuit` implementing the unitary.
pub fn emit_cirq(
    py: Python<'_>,
    unitary: ArrayView2<Complex64>,
    optimize: bool,
) -> PyResult<Py<PyAny>> {
    let num_qubits =
        validate_unitary(unitary).map_err(|err| PyValueError::new_err(err.to_string()))?;
    let gates = decompose_to_gates(unitary, optimize)
        .map_err(|err| PyValueError::new_err(err.to_string()))?;

    let cirq = py.import_bound("cirq")?;
    let circuit = cirq.getattr("Circuit")?.call0()?;
    let qubits: Vec<Bound<'_, PyAny>> = cirq
        .getattr("LineQubit")?
        .call_method1("range", (num_qubits,))?
        .extract::<Vec<Bound<'_, PyAny>>>()?
        .into_iter()
        .rev()
        .collect();

    for gate in &gates {
        let operation = match gate {
            Gate::Single { axis, angle, qubit } => {
                axis_gate(&cirq, *axis, *angle)?.call_method1("on", (&qubits[*qubit],))?
            }
            Gate::FullyControlled { axis, angle, target } => {
                let kwargs = PyDict::new_bound(py);
                kwargs.set_item("num_controls", num_qubits - 1)?;
                let controlled = cirq
                    .getattr("ControlledGate")?
                    .call((axis_gate(&cirq, *axis, *angle)?,), Some(&kwargs))?;
                let mut operands: Vec<&Bound<'_, PyAny>> = (0..num_qubits)
                    .filter(|q| q != target)
                    .map(|q| &qubits[q])
                    .collect();
                operands.push(&qubits[*target]);
                controlled.call_method1("on", PyTuple::new_bound(py, operands))?
            }
        };
        circuit.call_method1("append", (operation,))?;
    }
    Ok(circuit.unbind())
}
