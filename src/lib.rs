//! Synthetic labeled pharmacophore datasets for virtual screening models, in pure Rust.
//! For every input ligand it samples a plausible arrangement of virtual interaction
//! sites, derives a noise-free activity label from the geometry, and writes a dataset
//! a point-cloud classifier can train on end to end.
//!
//! # Features
//!
//! - **Feature perception** — Hydrogen bond donors and acceptors, aromatic
//!   rings, and hydrophobic carbons found from elements and connectivity
//! - **Site synthesis** — Complementary virtual sites scattered around the
//!   ligand, clash-filtered, spaced, and subset-sampled per molecule
//! - **Exact labels** — A pair is active precisely when a site answers a
//!   ligand feature within the interaction distance, so labels carry no
//!   assay noise
//! - **Dataset I/O** — Multi-record SDF, CSV coordinate tables, and YAML
//!   label maps in a fixed on-disk tree, with sparse indices preserved
//! - **Training** — A message-passing point-cloud classifier over generated
//!   datasets, built on candle
//!
//! # Quick Start
//!
//! The main entry point is the [`synthesize`] function, which takes a
//! [`Molecule`] and [`SynthConfig`] and produces a labeled [`Synthesis`]:
//!
//! ```
//! use rand::SeedableRng;
//! use rand::rngs::SmallRng;
//! use synth_phore::{Atom, Bond, BondOrder, Element, Molecule};
//! use synth_phore::{SiteCount, SynthConfig, SynthError, synthesize};
//!
//! // Build an ethanol molecule (C₂H₅OH)
//! let mut ligand = Molecule::new("ethanol");
//!
//! ligand.atoms.push(Atom::new(Element::C, [-1.270,  0.248,  0.000])); // C1
//! ligand.atoms.push(Atom::new(Element::C, [ 0.139, -0.308,  0.000])); // C2
//! ligand.atoms.push(Atom::new(Element::O, [ 1.036,  0.789,  0.000])); // O
//! ligand.atoms.push(Atom::new(Element::H, [-1.317,  0.885,  0.883])); // H on C1
//! ligand.atoms.push(Atom::new(Element::H, [-1.317,  0.885, -0.883])); // H on C1
//! ligand.atoms.push(Atom::new(Element::H, [-2.030, -0.533,  0.000])); // H on C1
//! ligand.atoms.push(Atom::new(Element::H, [ 0.358, -0.920,  0.876])); // H on C2
//! ligand.atoms.push(Atom::new(Element::H, [ 0.358, -0.920, -0.876])); // H on C2
//! ligand.atoms.push(Atom::new(Element::H, [ 1.939,  0.473,  0.000])); // H on O
//!
//! ligand.bonds.push(Bond::new(0, 1, BondOrder::Single)); // C1-C2
//! ligand.bonds.push(Bond::new(1, 2, BondOrder::Single)); // C2-O
//! ligand.bonds.push(Bond::new(0, 3, BondOrder::Single)); // C1-H
//! ligand.bonds.push(Bond::new(0, 4, BondOrder::Single)); // C1-H
//! ligand.bonds.push(Bond::new(0, 5, BondOrder::Single)); // C1-H
//! ligand.bonds.push(Bond::new(1, 6, BondOrder::Single)); // C2-H
//! ligand.bonds.push(Bond::new(1, 7, BondOrder::Single)); // C2-H
//! ligand.bonds.push(Bond::new(2, 8, BondOrder::Single)); // O-H
//!
//! // Sample at most four virtual sites around the ligand
//! let config = SynthConfig {
//!     count: SiteCount::Exact(4),
//!     ..Default::default()
//! };
//!
//! let mut rng = SmallRng::seed_from_u64(7);
//! let result = synthesize(&ligand, &config, &mut rng)?;
//!
//! assert!(result.pharmacophore.site_count() <= 4);
//!
//! // The label is 1 exactly when a complementary site landed within the
//! // interaction threshold of a ligand feature
//! assert_eq!(result.label == 1, !result.positive_coords.is_empty());
//! # Ok::<(), SynthError>(())
//! ```
//!
//! # Module Organization
//!
//! - [`model`] — Molecules, elements, virtual sites, pharmacophores
//! - [`perceive`] — Ligand interaction feature perception
//! - [`synth`] — The site synthesis and labeling pipeline
//! - [`dataset`] — The on-disk dataset tree and its statistics
//! - [`io`] — SDF records, coordinate tables, label maps
//! - [`train`] — Point-cloud classifier training on generated data
//!
//! # Data Types
//!
//! ## Ligand Side
//!
//! - [`Molecule`] — Atoms, bonds, and a name
//! - [`Atom`] — Single atom with element and Cartesian coordinates
//! - [`Bond`] — Bond between two atoms with bond order
//! - [`Element`] — The drug-like element set
//! - [`ChemFeature`] — A perceived interaction feature on the ligand
//!
//! ## Pharmacophore Side
//!
//! - [`Pharmacophore`] — The sampled collection of virtual sites
//! - [`VirtualSite`] — One site with kind and position
//! - [`SiteKind`] — Donor-like, acceptor-like, or apolar
//!
//! ## Configuration
//!
//! - [`SynthConfig`] — Thresholds, budget, and site count for synthesis
//! - [`CandidateBudget`] — Fixed cap or per-surface-area candidate budget
//! - [`SiteCount`] — Poisson-drawn or exact surviving site count
//! - [`train::TrainConfig`] — Epochs, batch size, and model dimensions

pub mod dataset;
pub mod io;
pub mod model;
pub mod perceive;
pub mod synth;
pub mod train;

pub use model::molecule::{Atom, Bond, Molecule};
pub use model::site::{Pharmacophore, SiteKind, VirtualSite};
pub use model::types::{BondOrder, Element, ParseBondOrderError, ParseElementError};

pub use perceive::{ChemFeature, FeatureKind, perceive_features};

pub use synth::{
    CandidateBudget, SiteCount, SynthConfig, Synthesis, synthesize, synthesize_forced,
};

pub use synth::Error as SynthError;
