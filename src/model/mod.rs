//! Core data structures for ligands and sampled pharmacophores.
//!
//! This module provides the types that flow through `synth-phore`:
//!
//! - [`types`] – Drug-like element set and bond order classifications.
//! - [`molecule`] – Molecules with atoms, bonds, and 3D coordinates.
//! - [`site`] – Virtual interaction sites and the pharmacophore container.
//!
//! The data model keeps ligand geometry ([`Molecule`]) separate from the
//! synthetic output ([`Pharmacophore`]), letting the [`crate::synth`]
//! pipeline map one into the other without mixing real and virtual atoms.
//!
//! [`Molecule`]: molecule::Molecule
//! [`Pharmacophore`]: site::Pharmacophore

pub mod molecule;
pub mod site;
pub mod types;
