use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid or unsupported element symbol: '{0}'")]
pub struct ParseElementError(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid bond order string: '{0}'")]
pub struct ParseBondOrderError(String);

/// Elements that occur in drug-like small molecules. Anything outside this
/// set fails to parse, which surfaces exotic SDF records early instead of
/// letting them drift into the geometry stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Element {
    H = 1,
    B = 5,
    C = 6,
    N = 7,
    O = 8,
    F = 9,
    Na = 11,
    Mg = 12,
    Si = 14,
    P = 15,
    S = 16,
    Cl = 17,
    K = 19,
    Ca = 20,
    Zn = 30,
    Se = 34,
    Br = 35,
    I = 53,
}

impl Element {
    /// Every supported element, in atomic-number order. The position of an
    /// element in this array is its ordinal in the training type vocabulary.
    pub const ALL: [Element; 18] = [
        Element::H,
        Element::B,
        Element::C,
        Element::N,
        Element::O,
        Element::F,
        Element::Na,
        Element::Mg,
        Element::Si,
        Element::P,
        Element::S,
        Element::Cl,
        Element::K,
        Element::Ca,
        Element::Zn,
        Element::Se,
        Element::Br,
        Element::I,
    ];

    #[inline]
    pub fn atomic_number(&self) -> u8 {
        *self as u8
    }

    pub fn from_atomic_number(z: u8) -> Option<Element> {
        Element::ALL.iter().copied().find(|e| e.atomic_number() == z)
    }

    /// Bondi van der Waals radius in Angstrom.
    pub fn vdw_radius(&self) -> f64 {
        match self {
            Element::H => 1.20,
            Element::B => 1.92,
            Element::C => 1.70,
            Element::N => 1.55,
            Element::O => 1.52,
            Element::F => 1.47,
            Element::Na => 2.27,
            Element::Mg => 1.73,
            Element::Si => 2.10,
            Element::P => 1.80,
            Element::S => 1.80,
            Element::Cl => 1.75,
            Element::K => 2.75,
            Element::Ca => 2.31,
            Element::Zn => 1.39,
            Element::Se => 1.90,
            Element::Br => 1.85,
            Element::I => 1.98,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Element::H => "H",
            Element::B => "B",
            Element::C => "C",
            Element::N => "N",
            Element::O => "O",
            Element::F => "F",
            Element::Na => "Na",
            Element::Mg => "Mg",
            Element::Si => "Si",
            Element::P => "P",
            Element::S => "S",
            Element::Cl => "Cl",
            Element::K => "K",
            Element::Ca => "Ca",
            Element::Zn => "Zn",
            Element::Se => "Se",
            Element::Br => "Br",
            Element::I => "I",
        }
    }

    #[inline]
    pub fn is_hydrogen(&self) -> bool {
        matches!(self, Element::H)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Element {
    type Err = ParseElementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "H" => Ok(Element::H),
            "B" => Ok(Element::B),
            "C" => Ok(Element::C),
            "N" => Ok(Element::N),
            "O" => Ok(Element::O),
            "F" => Ok(Element::F),
            "Na" => Ok(Element::Na),
            "Mg" => Ok(Element::Mg),
            "Si" => Ok(Element::Si),
            "P" => Ok(Element::P),
            "S" => Ok(Element::S),
            "Cl" => Ok(Element::Cl),
            "K" => Ok(Element::K),
            "Ca" => Ok(Element::Ca),
            "Zn" => Ok(Element::Zn),
            "Se" => Ok(Element::Se),
            "Br" => Ok(Element::Br),
            "I" => Ok(Element::I),
            _ => Err(ParseElementError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BondOrder {
    Single,
    Double,
    Triple,
    Aromatic,
}

impl BondOrder {
    /// Numeric code used by the V2000 bond block.
    pub fn sdf_code(&self) -> u8 {
        match self {
            BondOrder::Single => 1,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
            BondOrder::Aromatic => 4,
        }
    }
}

impl fmt::Display for BondOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BondOrder::Single => write!(f, "Single"),
            BondOrder::Double => write!(f, "Double"),
            BondOrder::Triple => write!(f, "Triple"),
            BondOrder::Aromatic => write!(f, "Aromatic"),
        }
    }
}

impl FromStr for BondOrder {
    type Err = ParseBondOrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" | "1" => Ok(BondOrder::Single),
            "double" | "2" => Ok(BondOrder::Double),
            "triple" | "3" => Ok(BondOrder::Triple),
            "aromatic" | "ar" | "4" => Ok(BondOrder::Aromatic),
            _ => Err(ParseBondOrderError(s.to_string())),
        }
    }
}
