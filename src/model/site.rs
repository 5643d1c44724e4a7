use super::molecule::{Atom, Molecule};
use super::types::Element;

/// Interaction character of a sampled pharmacophore point. Sites stand in
/// for receptor atoms, so each kind is the complement of the ligand feature
/// it answers (a donor on the ligand is answered by an acceptor-like site).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiteKind {
    AcceptorLike,
    DonorLike,
    Apolar,
}

impl SiteKind {
    /// Class index used in coordinate tables and the training type
    /// vocabulary.
    #[inline]
    pub fn class_id(&self) -> u8 {
        match self {
            SiteKind::AcceptorLike => 0,
            SiteKind::DonorLike => 1,
            SiteKind::Apolar => 2,
        }
    }

    /// Element used to encode the site when written as an SDF atom.
    #[inline]
    pub fn element(&self) -> Element {
        match self {
            SiteKind::AcceptorLike => Element::O,
            SiteKind::DonorLike => Element::N,
            SiteKind::Apolar => Element::C,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VirtualSite {
    pub kind: SiteKind,
    pub position: [f64; 3],
}

impl VirtualSite {
    pub fn new(kind: SiteKind, position: [f64; 3]) -> Self {
        Self { kind, position }
    }
}

/// The sampled interaction points for one ligand. Bond-less by construction;
/// conversion to [`Molecule`] exists so the standard SDF writer applies.
#[derive(Debug, Clone, Default)]
pub struct Pharmacophore {
    pub sites: Vec<VirtualSite>,
}

impl Pharmacophore {
    pub fn new(sites: Vec<VirtualSite>) -> Self {
        Self { sites }
    }

    #[inline]
    pub fn site_count(&self) -> usize {
        self.sites.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn to_molecule(&self, name: impl Into<String>) -> Molecule {
        let mut mol = Molecule::new(name);
        for site in &self.sites {
            mol.atoms.push(Atom::new(site.kind.element(), site.position));
        }
        mol
    }
}
