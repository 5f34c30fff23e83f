// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Operator authoring data and full-space operator construction.
//!
//! The caller describes physics per basis *label* (self-energies, drives,
//! couplings, Lindblad rates) in an [`OperatorTable`]; this module embeds
//! those 1- and 2-qubit definitions into the full Hilbert space of a
//! component:
//!
//! - [`table`]: label interning and the per-label [`OperatorSpec`] contract
//! - [`embed`]: dense Kronecker embedding of small unitaries, standard gates
//! - [`build`]: Hamiltonian and jump-operator assembly for one component
//!
//! Embedding is dense and O(4ⁿ) in register count; factorization keeps
//! components small enough for this to stay viable.

pub mod build;
pub mod embed;
pub mod table;

pub use build::{build_hamiltonian, build_jump_operators, JumpKind, JumpOperator};
pub use embed::{cnot, embed_1q, embed_2q, hadamard, pauli_x, pauli_z};
pub use table::{Drive, DriveKind, LabelId, LabelTable, OperatorSpec, OperatorTable};
