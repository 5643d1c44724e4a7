//! Ligand feature perception.
//!
//! Detects the interaction features the sampling stages build on: hydrogen
//! bond donors and acceptors, aromatic rings, and hydrophobic carbons. The
//! rules are element/connectivity heuristics in the Lipinski tradition, kept
//! deliberately small; library-grade chemical perception is out of scope.

use crate::model::molecule::Molecule;
use crate::model::site::SiteKind;

pub mod rings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    Donor,
    Acceptor,
    Aromatic,
    Hydrophobe,
}

impl FeatureKind {
    /// The site kind that answers this feature from the receptor side.
    pub fn complement(&self) -> SiteKind {
        match self {
            FeatureKind::Donor => SiteKind::AcceptorLike,
            FeatureKind::Acceptor => SiteKind::DonorLike,
            FeatureKind::Aromatic | FeatureKind::Hydrophobe => SiteKind::Apolar,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FeatureKind::Donor => "donor",
            FeatureKind::Acceptor => "acceptor",
            FeatureKind::Aromatic => "aromatic",
            FeatureKind::Hydrophobe => "hydrophobe",
        }
    }
}

/// A perceived feature point on the ligand. Atom-anchored features carry one
/// index; aromatic features carry the ring and sit at its centroid.
#[derive(Debug, Clone, PartialEq)]
pub struct ChemFeature {
    pub kind: FeatureKind,
    pub position: [f64; 3],
    pub atoms: Vec<usize>,
}

pub fn perceive_features(molecule: &Molecule) -> Vec<ChemFeature> {
    use crate::model::types::Element;

    let adj = molecule.neighbor_map();
    let orders = rings::bond_orders(molecule);
    let mut features = Vec::new();

    let mut aromatic_atoms = vec![false; molecule.atom_count()];
    for len in [5usize, 6] {
        for cycle in rings::cycles_of_len(&adj, len) {
            if !rings::is_aromatic_ring(molecule, &cycle, &orders) {
                continue;
            }
            for &a in &cycle {
                aromatic_atoms[a] = true;
            }
            features.push(ChemFeature {
                kind: FeatureKind::Aromatic,
                position: centroid(molecule, &cycle),
                atoms: cycle,
            });
        }
    }

    for (i, atom) in molecule.atoms.iter().enumerate() {
        match atom.element {
            Element::N | Element::O => {
                let has_hydrogen = adj[i]
                    .iter()
                    .any(|&nb| molecule.atoms[nb].element.is_hydrogen());
                if has_hydrogen {
                    features.push(ChemFeature {
                        kind: FeatureKind::Donor,
                        position: atom.position,
                        atoms: vec![i],
                    });
                }
                // Quaternary nitrogen has no lone pair left to accept with.
                if adj[i].len() < 4 {
                    features.push(ChemFeature {
                        kind: FeatureKind::Acceptor,
                        position: atom.position,
                        atoms: vec![i],
                    });
                }
            }
            Element::C => {
                if aromatic_atoms[i] {
                    continue;
                }
                let apolar = adj[i].iter().all(|&nb| {
                    matches!(molecule.atoms[nb].element, Element::C | Element::H)
                });
                if apolar {
                    features.push(ChemFeature {
                        kind: FeatureKind::Hydrophobe,
                        position: atom.position,
                        atoms: vec![i],
                    });
                }
            }
            _ => {}
        }
    }

    features
}

fn centroid(molecule: &Molecule, atoms: &[usize]) -> [f64; 3] {
    let mut c = [0.0f64; 3];
    for &a in atoms {
        for k in 0..3 {
            c[k] += molecule.atoms[a].position[k];
        }
    }
    let n = atoms.len() as f64;
    [c[0] / n, c[1] / n, c[2] / n]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::molecule::{Atom, Bond};
    use crate::model::types::{BondOrder, Element};

    fn make_water() -> Molecule {
        let mut mol = Molecule::new("water");
        mol.atoms.push(Atom::new(Element::O, [0.0, 0.0, 0.0]));
        mol.atoms.push(Atom::new(Element::H, [0.96, 0.0, 0.0]));
        mol.atoms.push(Atom::new(Element::H, [-0.24, 0.93, 0.0]));
        mol.bonds.push(Bond::new(0, 1, BondOrder::Single));
        mol.bonds.push(Bond::new(0, 2, BondOrder::Single));
        mol
    }

    fn make_ethanol() -> Molecule {
        let mut mol = Molecule::new("ethanol");
        mol.atoms.push(Atom::new(Element::C, [-0.89, -0.18, 0.0]));
        mol.atoms.push(Atom::new(Element::C, [0.47, 0.48, 0.0]));
        mol.atoms.push(Atom::new(Element::O, [1.54, -0.45, 0.0]));
        mol.atoms.push(Atom::new(Element::H, [-1.66, 0.58, 0.0]));
        mol.atoms.push(Atom::new(Element::H, [-0.95, -0.81, 0.89]));
        mol.atoms.push(Atom::new(Element::H, [-0.95, -0.81, -0.89]));
        mol.atoms.push(Atom::new(Element::H, [0.53, 1.10, 0.89]));
        mol.atoms.push(Atom::new(Element::H, [0.53, 1.10, -0.89]));
        mol.atoms.push(Atom::new(Element::H, [2.40, 0.0, 0.0]));
        mol.bonds.push(Bond::new(0, 1, BondOrder::Single));
        mol.bonds.push(Bond::new(1, 2, BondOrder::Single));
        mol.bonds.push(Bond::new(0, 3, BondOrder::Single));
        mol.bonds.push(Bond::new(0, 4, BondOrder::Single));
        mol.bonds.push(Bond::new(0, 5, BondOrder::Single));
        mol.bonds.push(Bond::new(1, 6, BondOrder::Single));
        mol.bonds.push(Bond::new(1, 7, BondOrder::Single));
        mol.bonds.push(Bond::new(2, 8, BondOrder::Single));
        mol
    }

    fn make_benzene() -> Molecule {
        let mut mol = Molecule::new("benzene");
        for k in 0..6 {
            let angle = std::f64::consts::PI / 3.0 * k as f64;
            mol.atoms.push(Atom::new(
                Element::C,
                [1.39 * angle.cos(), 1.39 * angle.sin(), 0.0],
            ));
        }
        for k in 0..6 {
            let order = if k % 2 == 0 {
                BondOrder::Double
            } else {
                BondOrder::Single
            };
            mol.bonds.push(Bond::new(k, (k + 1) % 6, order));
        }
        mol
    }

    fn kinds_of(features: &[ChemFeature], kind: FeatureKind) -> Vec<&ChemFeature> {
        features.iter().filter(|f| f.kind == kind).collect()
    }

    #[test]
    fn water_is_donor_and_acceptor() {
        let features = perceive_features(&make_water());
        assert_eq!(kinds_of(&features, FeatureKind::Donor).len(), 1);
        assert_eq!(kinds_of(&features, FeatureKind::Acceptor).len(), 1);
        assert!(kinds_of(&features, FeatureKind::Hydrophobe).is_empty());
        assert!(kinds_of(&features, FeatureKind::Aromatic).is_empty());
    }

    #[test]
    fn ethanol_features() {
        let features = perceive_features(&make_ethanol());
        let donors = kinds_of(&features, FeatureKind::Donor);
        assert_eq!(donors.len(), 1);
        assert_eq!(donors[0].atoms, vec![2]);
        assert_eq!(kinds_of(&features, FeatureKind::Acceptor).len(), 1);
        // Both carbons touch only C/H.
        assert_eq!(kinds_of(&features, FeatureKind::Hydrophobe).len(), 2);
    }

    #[test]
    fn benzene_is_one_aromatic_feature() {
        let features = perceive_features(&make_benzene());
        let aromatic = kinds_of(&features, FeatureKind::Aromatic);
        assert_eq!(aromatic.len(), 1);
        let pos = aromatic[0].position;
        assert!(pos[0].abs() < 1e-9 && pos[1].abs() < 1e-9);
        // Ring carbons do not double as hydrophobes.
        assert!(kinds_of(&features, FeatureKind::Hydrophobe).is_empty());
        assert!(kinds_of(&features, FeatureKind::Donor).is_empty());
    }

    #[test]
    fn methylamine_carbon_is_not_hydrophobic() {
        let mut mol = Molecule::new("methylamine");
        mol.atoms.push(Atom::new(Element::C, [0.0, 0.0, 0.0]));
        mol.atoms.push(Atom::new(Element::N, [1.47, 0.0, 0.0]));
        mol.atoms.push(Atom::new(Element::H, [1.9, 0.85, 0.0]));
        mol.atoms.push(Atom::new(Element::H, [1.9, -0.85, 0.0]));
        mol.bonds.push(Bond::new(0, 1, BondOrder::Single));
        mol.bonds.push(Bond::new(1, 2, BondOrder::Single));
        mol.bonds.push(Bond::new(1, 3, BondOrder::Single));

        let features = perceive_features(&mol);
        assert!(kinds_of(&features, FeatureKind::Hydrophobe).is_empty());
        assert_eq!(kinds_of(&features, FeatureKind::Donor).len(), 1);
        assert_eq!(kinds_of(&features, FeatureKind::Acceptor).len(), 1);
    }

    #[test]
    fn complement_mapping() {
        assert_eq!(FeatureKind::Donor.complement(), SiteKind::AcceptorLike);
        assert_eq!(FeatureKind::Acceptor.complement(), SiteKind::DonorLike);
        assert_eq!(FeatureKind::Aromatic.complement(), SiteKind::Apolar);
        assert_eq!(FeatureKind::Hydrophobe.complement(), SiteKind::Apolar);
    }
}
