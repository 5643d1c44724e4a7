use crate::io::error::Error;
use crate::model::{molecule::Molecule, site::Pharmacophore};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// One point of a coordinate table. Ligand rows carry the atomic number in
/// `type`; pharmacophore rows carry the site class index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordRow {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[serde(rename = "type")]
    pub type_id: u8,
}

pub fn ligand_rows(molecule: &Molecule) -> Vec<CoordRow> {
    molecule
        .atoms
        .iter()
        .map(|a| CoordRow {
            x: a.position[0],
            y: a.position[1],
            z: a.position[2],
            type_id: a.element.atomic_number(),
        })
        .collect()
}

pub fn pharmacophore_rows(pharmacophore: &Pharmacophore) -> Vec<CoordRow> {
    pharmacophore
        .sites
        .iter()
        .map(|s| CoordRow {
            x: s.position[0],
            y: s.position[1],
            z: s.position[2],
            type_id: s.kind.class_id(),
        })
        .collect()
}

pub fn write_rows<W: Write>(writer: W, rows: &[CoordRow]) -> Result<(), Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn read_rows<R: Read>(reader: R) -> Result<Vec<CoordRow>, Error> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();
    for record in rdr.deserialize() {
        rows.push(record?);
    }
    Ok(rows)
}
