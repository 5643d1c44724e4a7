//! Error types for pharmacophore synthesis.
//!
//! Errors are categorized by source: input validation of the ligand and
//! configuration problems discovered when the stages run.

use thiserror::Error;

/// Errors that can occur while running [`synthesize`](super::synthesize).
#[derive(Debug, Error)]
pub enum Error {
    /// The input molecule contains no atoms.
    #[error("input molecule is empty: at least one atom is required")]
    EmptyMolecule,

    /// Invalid bond definition in the input molecule.
    #[error("invalid bond between atoms {i} and {j}: {detail}")]
    InvalidBond {
        /// First atom index.
        i: usize,
        /// Second atom index.
        j: usize,
        /// Description of the problem.
        detail: String,
    },

    /// The configuration cannot drive a generation run.
    ///
    /// Occurs for non-positive thresholds, a non-positive Poisson mean, or
    /// an area coefficient that produces no budget.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Creates an [`InvalidBond`](Error::InvalidBond) error.
    pub fn invalid_bond(i: usize, j: usize, details: impl Into<String>) -> Self {
        Self::InvalidBond {
            i,
            j,
            detail: details.into(),
        }
    }

    /// Creates an [`InvalidConfig`](Error::InvalidConfig) error.
    pub fn invalid_config(details: impl Into<String>) -> Self {
        Self::InvalidConfig(details.into())
    }
}
