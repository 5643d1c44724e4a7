use super::types::{BondOrder, Element};

#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub element: Element,
    pub position: [f64; 3],
}

impl Atom {
    pub fn new(element: Element, position: [f64; 3]) -> Self {
        Self { element, position }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Bond {
    pub i: usize,
    pub j: usize,
    pub order: BondOrder,
}

impl Bond {
    pub fn new(idx1: usize, idx2: usize, order: BondOrder) -> Self {
        if idx1 <= idx2 {
            Self { i: idx1, j: idx2, order }
        } else {
            Self { i: idx2, j: idx1, order }
        }
    }
}

/// A single small molecule with 3D coordinates. Coordinates exist iff atoms
/// exist; an atom always carries a position.
#[derive(Debug, Clone, Default)]
pub struct Molecule {
    pub name: String,
    pub atoms: Vec<Atom>,
    pub bonds: Vec<Bond>,
}

impl Molecule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            atoms: Vec::new(),
            bonds: Vec::new(),
        }
    }

    #[inline]
    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    #[inline]
    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    pub fn heavy_atom_count(&self) -> usize {
        self.atoms
            .iter()
            .filter(|a| !a.element.is_hydrogen())
            .count()
    }

    /// Adjacency lists indexed by atom. Bond indices are assumed valid;
    /// readers validate them against the atom count before constructing.
    pub fn neighbor_map(&self) -> Vec<Vec<usize>> {
        let mut neighbors = vec![Vec::new(); self.atoms.len()];
        for bond in &self.bonds {
            neighbors[bond.i].push(bond.j);
            neighbors[bond.j].push(bond.i);
        }
        neighbors
    }
}
