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

//! Compile arbitrary unitary matrices into elementary quantum gate circuits.
//!
//! Given a 2^n x 2^n unitary, [`decompose_to_gates`] produces an ordered
//! stream of single-qubit rotations and fully-controlled gates whose product
//! equals the input within 1e-9. The generic path factors the matrix into
//! two-level unitaries along a Gray-code relabeling; for two qubits with
//! `optimize` enabled, a Magic-basis decomposition emits at most three
//! CNOTs. [`emit_qsharp`] renders the stream as Q# source, and with the
//! `cirq` feature [`emit_cirq`] builds a Cirq circuit in-process.
//!
//! ```
//! use ndarray::array;
//! use num_complex::Complex64;
//!
//! let x = array![
//!     [Complex64::new(0., 0.), Complex64::new(1., 0.)],
//!     [Complex64::new(1., 0.), Complex64::new(0., 0.)],
//! ];
//! let gates = unitary_synth::decompose_to_gates(x.view(), false).unwrap();
//! assert_eq!(gates.len(), 1);
//! ```

use ndarray::ArrayView2;
use num_complex::Complex64;
use thiserror::Error;

pub mod controlled;
pub mod euler_decompose;
pub mod gate;
pub mod linalg;
pub mod optimize;
pub mod qsharp;
pub mod two_level;
pub mod two_qubit_decompose;

#[cfg(feature = "cirq")]
mod cirq;

pub use gate::{gates_to_matrix, Axis, Gate};
pub use linalg::EPSILON;
pub use optimize::optimize_gates;
pub use two_level::TwoLevelUnitary;

#[cfg(feature = "cirq")]
pub use cirq::emit_cirq;

pub const DEFAULT_OP_NAME: &str = "ApplyUnitaryMatrix";

#[derive(Debug, Error)]
pub enum DecomposeError {
    #[error("input matrix is not square ({rows}x{cols})")]
    NotSquare { rows: usize, cols: usize },
    #[error("matrix side {side} is not a power of two")]
    NotPowerOfTwo { side: usize },
    #[error("input matrix is not unitary within tolerance {tolerance:e}")]
    NotUnitary { tolerance: f64 },
    #[error("optimized synthesis supports at most 2 qubits, got {qubits}")]
    UnsupportedOptimize { qubits: usize },
    #[error("failed to diagonalize the magic-basis Gram matrix")]
    Diagonalization,
}

/// Check shape and unitarity; returns the register size n.
pub fn validate_unitary(unitary: ArrayView2<Complex64>) -> Result<usize, DecomposeError> {
    let (rows, cols) = unitary.dim();
    if rows != cols {
        return Err(DecomposeError::NotSquare { rows, cols });
    }
    if rows < 2 || !rows.is_power_of_two() {
        return Err(DecomposeError::NotPowerOfTwo { side: rows });
    }
    if !linalg::is_unitary(unitary, EPSILON) {
        return Err(DecomposeError::NotUnitary { tolerance: EPSILON });
    }
    Ok(rows.trailing_zeros() as usize)
}

/// Decompose a unitary into an application-ordered gate stream.
///
/// With `optimize` enabled a 4x4 input goes through the Magic-basis
/// synthesiser (at most three CNOTs); larger matrices reject the flag. The
/// stream is peephole-optimised before it is returned.
pub fn decompose_to_gates(
    unitary: ArrayView2<Complex64>,
    optimize: bool,
) -> Result<Vec<Gate>, DecomposeError> {
    let num_qubits = validate_unitary(unitary)?;
    if optimize && num_qubits > 2 {
        return Err(DecomposeError::UnsupportedOptimize { qubits: num_qubits });
    }
    let gates = if optimize && num_qubits == 2 {
        two_qubit_decompose::decompose_two_qubit_optimal(unitary)?
    } else {
        two_level::two_level_decompose_gray(unitary)
            .iter()
            .flat_map(|factor| controlled::two_level_to_gates(factor, num_qubits))
            .collect()
    };
    Ok(optimize_gates(gates, num_qubits))
}

/// The Gray-coded two-level factorisation, exposed for inspection. Every
/// returned factor acts on an index pair differing in exactly one bit.
pub fn decompose_to_two_level(
    unitary: ArrayView2<Complex64>,
) -> Result<Vec<TwoLevelUnitary>, DecomposeError> {
    validate_unitary(unitary)?;
    Ok(two_level::two_level_decompose_gray(unitary))
}

/// Render the decomposition of `unitary` as a Q# operation named `op_name`.
pub fn emit_qsharp(
    unitary: ArrayView2<Complex64>,
    op_name: &str,
    optimize: bool,
) -> Result<String, DecomposeError> {
    let num_qubits = validate_unitary(unitary)?;
    let gates = decompose_to_gates(unitary, optimize)?;
    Ok(qsharp::format_qsharp(&gates, num_qubits, op_name))
}
