//! Dataset layout: writing a generation run to disk and reading it back.
//!
//! A dataset root holds one entry per kept ligand, keyed by the ligand's
//! input index. Indices are sparse: a ligand discarded by label forcing
//! leaves a gap, and every consumer resolves entries through `labels.yaml`
//! rather than assuming consecutive files.
//!
//! ```text
//! root/
//!   sdf/ligands/lig{i}.sdf             ligand structure
//!   sdf/pharmacophores/pharm{i}.sdf    sites encoded as atoms
//!   tables/ligands/lig{i}.csv          x,y,z,type (atomic number)
//!   tables/pharmacophores/pharm{i}.csv x,y,z,type (site class)
//!   labels.yaml                        index -> 0/1
//!   atomic_labels.yaml                 index -> matched feature coords
//!   stats.txt                          run summary
//! ```

pub mod stats;

use crate::io::labels::{self, AtomicLabelMap, LabelMap};
use crate::io::table::{self, CoordRow};
use crate::io::{sdf, Error};
use crate::model::molecule::Molecule;
use crate::model::site::Pharmacophore;
use crate::synth::SynthConfig;
use stats::RunStats;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

const LABELS_FILE: &str = "labels.yaml";
const ATOMIC_LABELS_FILE: &str = "atomic_labels.yaml";
const STATS_FILE: &str = "stats.txt";

/// Writes dataset entries into a root directory.
///
/// [`create`](DatasetWriter::create) lays out the directory tree; entries
/// and the label maps are then written through the instance.
#[derive(Debug)]
pub struct DatasetWriter {
    root: PathBuf,
}

impl DatasetWriter {
    /// Creates the output tree under `root`, including `root` itself.
    pub fn create(root: impl Into<PathBuf>) -> Result<Self, Error> {
        let root = root.into();
        for dir in [
            root.join("sdf").join("ligands"),
            root.join("sdf").join("pharmacophores"),
            root.join("tables").join("ligands"),
            root.join("tables").join("pharmacophores"),
        ] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(Self { root })
    }

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes the SDF pair and both coordinate tables for one entry.
    pub fn write_entry(
        &self,
        index: usize,
        ligand: &Molecule,
        pharmacophore: &Pharmacophore,
    ) -> Result<(), Error> {
        let lig_sdf = self
            .root
            .join("sdf")
            .join("ligands")
            .join(format!("lig{index}.sdf"));
        sdf::write(BufWriter::new(File::create(lig_sdf)?), ligand)?;

        let pharm_mol = pharmacophore.to_molecule(format!("pharm{index}"));
        let pharm_sdf = self
            .root
            .join("sdf")
            .join("pharmacophores")
            .join(format!("pharm{index}.sdf"));
        sdf::write(BufWriter::new(File::create(pharm_sdf)?), &pharm_mol)?;

        let lig_csv = self
            .root
            .join("tables")
            .join("ligands")
            .join(format!("lig{index}.csv"));
        table::write_rows(
            BufWriter::new(File::create(lig_csv)?),
            &table::ligand_rows(ligand),
        )?;

        let pharm_csv = self
            .root
            .join("tables")
            .join("pharmacophores")
            .join(format!("pharm{index}.csv"));
        table::write_rows(
            BufWriter::new(File::create(pharm_csv)?),
            &table::pharmacophore_rows(pharmacophore),
        )?;

        Ok(())
    }

    /// Writes `labels.yaml` and `atomic_labels.yaml`.
    pub fn write_labels(&self, labels: &LabelMap, atomic: &AtomicLabelMap) -> Result<(), Error> {
        labels::write_labels(
            BufWriter::new(File::create(self.root.join(LABELS_FILE))?),
            labels,
        )?;
        labels::write_atomic_labels(
            BufWriter::new(File::create(self.root.join(ATOMIC_LABELS_FILE))?),
            atomic,
        )?;
        Ok(())
    }

    /// Writes the human-readable run summary to `stats.txt`.
    pub fn write_stats(&self, stats: &RunStats, config: &SynthConfig) -> Result<(), Error> {
        let mut file = BufWriter::new(File::create(self.root.join(STATS_FILE))?);
        file.write_all(stats.render(config)?.as_bytes())?;
        file.flush()?;
        Ok(())
    }
}

/// One dataset entry loaded back from disk.
#[derive(Debug, Clone)]
pub struct Example {
    /// Input index of the source ligand (sparse; gaps are normal).
    pub index: usize,
    /// Ligand coordinate rows, `type` = atomic number.
    pub ligand: Vec<CoordRow>,
    /// Pharmacophore coordinate rows, `type` = site class.
    pub pharmacophore: Vec<CoordRow>,
    /// Binary activity label.
    pub label: u8,
}

/// Loads every entry listed in `labels.yaml` under `root`.
///
/// Entries come back ordered by index. A listed index whose coordinate
/// tables are missing is an error; the label map is the source of truth for
/// which entries exist.
pub fn read_examples(root: &Path) -> Result<Vec<Example>, Error> {
    let labels = labels::read_labels(BufReader::new(File::open(root.join(LABELS_FILE))?))?;

    let mut examples = Vec::with_capacity(labels.len());
    for (&index, &label) in &labels {
        let lig_csv = root
            .join("tables")
            .join("ligands")
            .join(format!("lig{index}.csv"));
        let ligand = table::read_rows(BufReader::new(File::open(lig_csv)?))?;

        let pharm_csv = root
            .join("tables")
            .join("pharmacophores")
            .join(format!("pharm{index}.csv"));
        let pharmacophore = table::read_rows(BufReader::new(File::open(pharm_csv)?))?;

        examples.push(Example {
            index,
            ligand,
            pharmacophore,
            label,
        });
    }
    Ok(examples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::molecule::Atom;
    use crate::model::site::{SiteKind, VirtualSite};
    use crate::model::types::Element;

    fn water() -> Molecule {
        let mut mol = Molecule::new("water");
        mol.atoms = vec![
            Atom::new(Element::O, [0.0, 0.0, 0.0]),
            Atom::new(Element::H, [0.757, 0.586, 0.0]),
            Atom::new(Element::H, [-0.757, 0.586, 0.0]),
        ];
        mol
    }

    fn two_site_pharm() -> Pharmacophore {
        Pharmacophore::new(vec![
            VirtualSite::new(SiteKind::DonorLike, [0.0, -3.0, 0.0]),
            VirtualSite::new(SiteKind::Apolar, [3.0, 3.0, 0.0]),
        ])
    }

    #[test]
    fn tree_layout_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("run");
        let writer = DatasetWriter::create(&root).unwrap();
        writer.write_entry(0, &water(), &two_site_pharm()).unwrap();

        assert!(root.join("sdf").join("ligands").join("lig0.sdf").is_file());
        assert!(root
            .join("sdf")
            .join("pharmacophores")
            .join("pharm0.sdf")
            .is_file());
        assert!(root
            .join("tables")
            .join("ligands")
            .join("lig0.csv")
            .is_file());
        assert!(root
            .join("tables")
            .join("pharmacophores")
            .join("pharm0.csv")
            .is_file());
    }

    #[test]
    fn sparse_indices_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let writer = DatasetWriter::create(dir.path()).unwrap();

        // Index 1 was discarded by forcing; 0 and 2 survive.
        writer.write_entry(0, &water(), &two_site_pharm()).unwrap();
        writer
            .write_entry(2, &water(), &Pharmacophore::default())
            .unwrap();

        let mut labels = LabelMap::new();
        labels.insert(0, 1);
        labels.insert(2, 0);
        let mut atomic = AtomicLabelMap::new();
        atomic.insert(0, vec![[0.0, 0.0, 0.0]]);
        atomic.insert(2, Vec::new());
        writer.write_labels(&labels, &atomic).unwrap();

        let examples = read_examples(dir.path()).unwrap();
        assert_eq!(examples.len(), 2);
        assert_eq!(examples[0].index, 0);
        assert_eq!(examples[1].index, 2);
        assert_eq!(examples[0].label, 1);
        assert_eq!(examples[1].label, 0);
        assert_eq!(examples[0].ligand.len(), 3);
        assert_eq!(examples[0].pharmacophore.len(), 2);
        assert!(examples[1].pharmacophore.is_empty());

        // Ligand rows carry atomic numbers, pharmacophore rows class ids.
        assert_eq!(examples[0].ligand[0].type_id, 8);
        assert_eq!(examples[0].pharmacophore[0].type_id, 1);
        assert_eq!(examples[0].pharmacophore[1].type_id, 2);
    }

    #[test]
    fn missing_labels_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_examples(dir.path()).is_err());
    }
}
