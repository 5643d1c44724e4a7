//! Readers and writers for the formats the pipeline touches: multi-record
//! V2000 SDF for molecules, CSV coordinate tables, and YAML label maps.

use std::fmt;

pub mod error;
pub mod labels;
pub mod sdf;
pub mod table;

pub use error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Sdf,
    Csv,
    Yaml,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Sdf => write!(f, "SDF"),
            Format::Csv => write!(f, "CSV"),
            Format::Yaml => write!(f, "YAML"),
        }
    }
}
