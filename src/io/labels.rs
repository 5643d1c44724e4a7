use crate::io::error::Error;
use std::collections::BTreeMap;
use std::io::{Read, Write};

/// Dataset index to binary activity label.
pub type LabelMap = BTreeMap<usize, u8>;

/// Dataset index to the ligand feature coordinates matched by a site within
/// the distance threshold. Empty for negative examples.
pub type AtomicLabelMap = BTreeMap<usize, Vec<[f64; 3]>>;

pub fn write_labels<W: Write>(writer: W, labels: &LabelMap) -> Result<(), Error> {
    serde_yaml::to_writer(writer, labels)?;
    Ok(())
}

pub fn read_labels<R: Read>(reader: R) -> Result<LabelMap, Error> {
    Ok(serde_yaml::from_reader(reader)?)
}

pub fn write_atomic_labels<W: Write>(writer: W, labels: &AtomicLabelMap) -> Result<(), Error> {
    serde_yaml::to_writer(writer, labels)?;
    Ok(())
}

pub fn read_atomic_labels<R: Read>(reader: R) -> Result<AtomicLabelMap, Error> {
    Ok(serde_yaml::from_reader(reader)?)
}
