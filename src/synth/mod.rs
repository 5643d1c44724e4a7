//! Synthetic pharmacophore generation.
//!
//! [`synthesize`] runs the full pipeline for one ligand: perceive its
//! interaction features, propose complementary candidate sites, drop the
//! candidates that clash with the ligand or crowd each other, sample the
//! surviving subset, and assign the binary activity label. The result is a
//! bond-less [`Pharmacophore`] plus the label evidence.
//!
//! [`synthesize_forced`] repeats the pipeline with fresh randomness until a
//! requested label comes out, and gives up after the configured number of
//! attempts so a pathological ligand cannot stall a run.

mod candidates;
mod config;
mod error;
mod filters;
mod label;
mod spatial;

pub use config::{
    CandidateBudget, SiteCount, SynthConfig, DEFAULT_CLASH_DISTANCE, DEFAULT_DISTANCE_THRESHOLD,
    DEFAULT_RETRY_BUDGET, DEFAULT_SITE_SPACING,
};
pub use error::Error;

use crate::model::molecule::Molecule;
use crate::model::site::Pharmacophore;
use crate::perceive;
use rand::Rng;

/// The outcome of one generation run for one ligand.
#[derive(Debug, Clone)]
pub struct Synthesis {
    /// The sampled interaction sites.
    pub pharmacophore: Pharmacophore,
    /// Binary activity label: 1 when any site answers a ligand feature
    /// within the distance threshold, 0 otherwise.
    pub label: u8,
    /// Positions of the ligand features that were answered. Non-empty
    /// exactly when `label` is 1.
    pub positive_coords: Vec<[f64; 3]>,
}

impl Synthesis {
    #[inline]
    pub fn is_active(&self) -> bool {
        self.label == 1
    }
}

/// Generates one labeled pharmacophore for `ligand`.
///
/// # Errors
///
/// Returns [`Error::EmptyMolecule`] for a ligand with no atoms,
/// [`Error::InvalidBond`] when a bond references an out-of-bounds atom, and
/// [`Error::InvalidConfig`] when the configuration cannot drive a run.
pub fn synthesize(
    ligand: &Molecule,
    config: &SynthConfig,
    rng: &mut impl Rng,
) -> Result<Synthesis, Error> {
    config.validate()?;
    validate_ligand(ligand)?;

    let features = perceive::perceive_features(ligand);

    let proposed = candidates::propose(ligand, &features, &config.budget, rng);

    let ligand_positions: Vec<[f64; 3]> = ligand.atoms.iter().map(|a| a.position).collect();
    let cleared = filters::ligand_distance_filter(proposed, &ligand_positions, config.clash_distance);
    let spaced = filters::mutual_distance_filter(cleared, config.site_spacing);

    let sites = filters::sample_sites(spaced, &config.count, rng)?;
    let pharmacophore = Pharmacophore::new(sites);

    let (label, positive_coords) =
        label::assign_label(&features, &pharmacophore, config.distance_threshold);

    Ok(Synthesis {
        pharmacophore,
        label,
        positive_coords,
    })
}

/// Generates until the label equals `target`, or gives up.
///
/// Each attempt reruns the whole pipeline with fresh randomness, so site
/// placement, subset sampling, and therefore the label can all change.
/// Returns `Ok(None)` once `config.retry_budget` attempts have produced the
/// wrong label; the caller is expected to drop the ligand from the dataset.
pub fn synthesize_forced(
    ligand: &Molecule,
    config: &SynthConfig,
    target: u8,
    rng: &mut impl Rng,
) -> Result<Option<Synthesis>, Error> {
    for _ in 0..config.retry_budget {
        let result = synthesize(ligand, config, rng)?;
        if result.label == target {
            return Ok(Some(result));
        }
    }
    Ok(None)
}

fn validate_ligand(ligand: &Molecule) -> Result<(), Error> {
    if ligand.atoms.is_empty() {
        return Err(Error::EmptyMolecule);
    }
    let n_atoms = ligand.atom_count();
    for bond in &ligand.bonds {
        if bond.i >= n_atoms || bond.j >= n_atoms {
            return Err(Error::invalid_bond(
                bond.i,
                bond.j,
                format!("atom index out of bounds (n_atoms = {n_atoms})"),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::molecule::{Atom, Bond};
    use crate::model::types::{BondOrder, Element};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn ethanol() -> Molecule {
        let mut mol = Molecule::new("ethanol");
        mol.atoms = vec![
            Atom::new(Element::C, [-0.888, -0.181, 0.000]),
            Atom::new(Element::C, [0.478, 0.475, 0.000]),
            Atom::new(Element::O, [1.446, -0.540, 0.000]),
            Atom::new(Element::H, [-1.653, 0.594, 0.000]),
            Atom::new(Element::H, [-1.003, -0.808, 0.890]),
            Atom::new(Element::H, [-1.003, -0.808, -0.890]),
            Atom::new(Element::H, [0.592, 1.102, 0.890]),
            Atom::new(Element::H, [0.592, 1.102, -0.890]),
            Atom::new(Element::H, [2.318, -0.130, 0.000]),
        ];
        mol.bonds = vec![
            Bond::new(0, 1, BondOrder::Single),
            Bond::new(1, 2, BondOrder::Single),
            Bond::new(0, 3, BondOrder::Single),
            Bond::new(0, 4, BondOrder::Single),
            Bond::new(0, 5, BondOrder::Single),
            Bond::new(1, 6, BondOrder::Single),
            Bond::new(1, 7, BondOrder::Single),
            Bond::new(2, 8, BondOrder::Single),
        ];
        mol
    }

    #[test]
    fn empty_molecule_is_rejected() {
        let mut rng = SmallRng::seed_from_u64(1);
        let result = synthesize(&Molecule::new("void"), &SynthConfig::default(), &mut rng);
        assert!(matches!(result, Err(Error::EmptyMolecule)));
    }

    #[test]
    fn out_of_bounds_bond_is_rejected() {
        let mut mol = Molecule::new("broken");
        mol.atoms.push(Atom::new(Element::C, [0.0, 0.0, 0.0]));
        mol.bonds.push(Bond::new(0, 7, BondOrder::Single));
        let mut rng = SmallRng::seed_from_u64(1);
        let result = synthesize(&mol, &SynthConfig::default(), &mut rng);
        assert!(matches!(result, Err(Error::InvalidBond { j: 7, .. })));
    }

    #[test]
    fn invalid_config_is_rejected_before_any_work() {
        let config = SynthConfig {
            distance_threshold: -1.0,
            ..Default::default()
        };
        let mut rng = SmallRng::seed_from_u64(1);
        let result = synthesize(&ethanol(), &config, &mut rng);
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn label_agrees_with_positive_coords() {
        let config = SynthConfig {
            budget: CandidateBudget::Fixed(12),
            count: SiteCount::Exact(5),
            ..Default::default()
        };
        let mol = ethanol();
        for seed in 0..24 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let result = synthesize(&mol, &config, &mut rng).unwrap();
            assert_eq!(result.is_active(), !result.positive_coords.is_empty());
            assert!(result.pharmacophore.site_count() <= 5);
        }
    }

    #[test]
    fn a_fixed_seed_reproduces_the_run() {
        let config = SynthConfig::default();
        let mol = ethanol();

        let mut rng_a = SmallRng::seed_from_u64(99);
        let mut rng_b = SmallRng::seed_from_u64(99);
        let a = synthesize(&mol, &config, &mut rng_a).unwrap();
        let b = synthesize(&mol, &config, &mut rng_b).unwrap();

        assert_eq!(a.label, b.label);
        assert_eq!(a.pharmacophore.sites, b.pharmacophore.sites);
        assert_eq!(a.positive_coords, b.positive_coords);
    }

    #[test]
    fn sites_respect_the_clash_distance() {
        let config = SynthConfig::default();
        let mol = ethanol();
        let mut rng = SmallRng::seed_from_u64(7);
        let result = synthesize(&mol, &config, &mut rng).unwrap();
        for site in &result.pharmacophore.sites {
            for atom in &mol.atoms {
                let d = [
                    site.position[0] - atom.position[0],
                    site.position[1] - atom.position[1],
                    site.position[2] - atom.position[2],
                ];
                let dist = (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt();
                assert!(
                    dist >= config.clash_distance - 1e-9,
                    "site at {:?} clashes with atom at {:?} (d = {dist:.3})",
                    site.position,
                    atom.position
                );
            }
        }
    }

    #[test]
    fn kept_sites_respect_mutual_spacing() {
        let config = SynthConfig {
            budget: CandidateBudget::Fixed(16),
            count: SiteCount::Exact(16),
            ..Default::default()
        };
        let mut rng = SmallRng::seed_from_u64(11);
        let result = synthesize(&ethanol(), &config, &mut rng).unwrap();
        let sites = &result.pharmacophore.sites;
        for a in 0..sites.len() {
            for b in (a + 1)..sites.len() {
                let d = [
                    sites[a].position[0] - sites[b].position[0],
                    sites[a].position[1] - sites[b].position[1],
                    sites[a].position[2] - sites[b].position[2],
                ];
                let dist = (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt();
                assert!(dist >= config.site_spacing - 1e-9);
            }
        }
    }

    #[test]
    fn forcing_an_impossible_label_gives_up() {
        // A single apolar carbon perceives one hydrophobe feature at most;
        // with a zero site count the label can never be 1.
        let mut mol = Molecule::new("methane-ish");
        mol.atoms.push(Atom::new(Element::C, [0.0, 0.0, 0.0]));
        let config = SynthConfig {
            count: SiteCount::Exact(0),
            retry_budget: 10,
            ..Default::default()
        };
        let mut rng = SmallRng::seed_from_u64(3);
        let result = synthesize_forced(&mol, &config, 1, &mut rng).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn forcing_zero_with_no_sites_succeeds_immediately() {
        let config = SynthConfig {
            count: SiteCount::Exact(0),
            ..Default::default()
        };
        let mut rng = SmallRng::seed_from_u64(3);
        let result = synthesize_forced(&ethanol(), &config, 0, &mut rng)
            .unwrap()
            .unwrap();
        assert_eq!(result.label, 0);
        assert!(result.pharmacophore.is_empty());
    }
}
