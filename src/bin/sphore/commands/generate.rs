use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rayon::prelude::*;

use synth_phore::dataset::DatasetWriter;
use synth_phore::dataset::stats::{Descriptive, RunStats};
use synth_phore::io::labels::{AtomicLabelMap, LabelMap};
use synth_phore::io::sdf::SdfReader;
use synth_phore::synth::{
    CandidateBudget, SiteCount, SynthConfig, Synthesis, synthesize, synthesize_forced,
};
use synth_phore::{Molecule, SynthError};

use crate::cli::{ForceLabels, GenArgs};
use crate::display::{
    Context as DisplayContext, Progress, print_label_distribution, print_run_summary,
};

const TOTAL_STEPS: u8 = 4;

pub fn run_gen(args: GenArgs, ctx: DisplayContext) -> Result<()> {
    let config = build_config(&args)?;
    let seed = args.run.seed.unwrap_or_else(rand::random);

    let started = Instant::now();
    let mut progress = Progress::new(ctx.interactive, TOTAL_STEPS);

    progress.step("Loading ligands");
    let inputs = resolve_inputs(&args.ligands)?;
    let loaded = read_ligands(&inputs, args.labeling.force_labels)?;

    let read_substeps = build_read_substeps(&inputs, &loaded);
    let read_substeps_ref: Vec<&str> = read_substeps.iter().map(|s| s.as_str()).collect();
    progress.complete_step("Loading ligands", &read_substeps_ref);

    progress.step("Generating pharmacophores");
    let results = generate_all(&loaded.ligands, &config, seed, args.run.parallel)?;
    let discarded = results
        .iter()
        .filter(|r| matches!(r, Outcome::Discarded))
        .count();
    let unusable = results
        .iter()
        .filter(|r| matches!(r, Outcome::Unusable))
        .count();

    let gen_substeps = build_gen_substeps(&config, args.labeling.force_labels, discarded, unusable);
    let gen_substeps_ref: Vec<&str> = gen_substeps.iter().map(|s| s.as_str()).collect();
    progress.complete_step("Generating pharmacophores", &gen_substeps_ref);

    progress.step("Writing dataset");
    let writer = DatasetWriter::create(&args.output_dir)
        .with_context(|| format!("Failed to create dataset under '{}'", args.output_dir.display()))?;

    let mut labels = LabelMap::new();
    let mut atomic = AtomicLabelMap::new();
    let mut kept_atoms = Vec::new();
    let mut kept_sites = Vec::new();
    let mut positives = 0usize;

    for (index, result) in results.into_iter().enumerate() {
        let Outcome::Kept(synthesis) = result else {
            continue;
        };
        let (ligand, _) = &loaded.ligands[index];

        writer.write_entry(index, ligand, &synthesis.pharmacophore)?;

        if synthesis.is_active() {
            positives += 1;
        }
        kept_atoms.push(ligand.atom_count());
        kept_sites.push(synthesis.pharmacophore.site_count());
        labels.insert(index, synthesis.label);
        atomic.insert(index, synthesis.positive_coords);
    }
    let entries_written = labels.len();
    writer.write_labels(&labels, &atomic)?;

    let write_substeps = build_write_substeps(entries_written);
    let write_substeps_ref: Vec<&str> = write_substeps.iter().map(|s| s.as_str()).collect();
    progress.complete_step("Writing dataset", &write_substeps_ref);

    progress.step("Collecting statistics");
    let stats = RunStats {
        ligands_read: loaded.ligands.len(),
        records_skipped: loaded.skipped,
        entries_written,
        discarded,
        unusable,
        positives,
        ligand_atoms: Descriptive::from_counts(kept_atoms),
        pharmacophore_sites: Descriptive::from_counts(kept_sites),
        workers: if args.run.parallel {
            rayon::current_num_threads()
        } else {
            1
        },
        seed,
        elapsed: started.elapsed(),
    };
    writer.write_stats(&stats, &config)?;
    progress.complete_step("Collecting statistics", &["Write stats.txt"]);

    if ctx.interactive {
        print_run_summary(&stats);
        print_label_distribution(&labels);
    }

    progress.finish();

    Ok(())
}

fn build_config(args: &GenArgs) -> Result<SynthConfig> {
    let budget = match (args.budget.max_features, args.budget.area_coef) {
        (Some(n), None) => CandidateBudget::Fixed(n),
        (None, Some(coef)) => CandidateBudget::PerArea(coef),
        (Some(_), Some(_)) => bail!("--max-features and --area-coef are mutually exclusive"),
        (None, None) => bail!("One of --max-features or --area-coef is required"),
    };

    let count = match (args.sampling.poisson_mean, args.sampling.num_opportunities) {
        (Some(mean), None) => SiteCount::Poisson(mean),
        (None, Some(n)) => SiteCount::Exact(n),
        (Some(_), Some(_)) => bail!("--poisson-mean and --num-opportunities are mutually exclusive"),
        (None, None) => bail!("One of --poisson-mean or --num-opportunities is required"),
    };

    Ok(SynthConfig {
        budget,
        count,
        distance_threshold: args.labeling.distance_threshold,
        ..Default::default()
    })
}

fn resolve_inputs(path: &Path) -> Result<Vec<PathBuf>> {
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files: Vec<PathBuf> = std::fs::read_dir(path)
        .with_context(|| format!("Failed to read directory '{}'", path.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.extension()
                .map(|ext| ext.eq_ignore_ascii_case("sdf"))
                .unwrap_or(false)
        })
        .collect();

    if files.is_empty() {
        bail!("No .sdf files found under '{}'", path.display());
    }

    files.sort();
    Ok(files)
}

struct LoadedLigands {
    /// Each ligand with the label it must reach, when forcing is on.
    ligands: Vec<(Molecule, Option<u8>)>,
    skipped: usize,
}

fn read_ligands(inputs: &[PathBuf], mode: ForceLabels) -> Result<LoadedLigands> {
    let mut ligands = Vec::new();
    let mut skipped = 0usize;

    for path in inputs {
        let target: Option<u8> = match mode {
            ForceLabels::Off => None,
            ForceLabels::Zero => Some(0),
            ForceLabels::One => Some(1),
            ForceLabels::Path => Some(target_from_path(path)?),
        };

        let file =
            File::open(path).with_context(|| format!("Failed to open '{}'", path.display()))?;
        for record in SdfReader::new(BufReader::new(file)) {
            match record {
                Ok(molecule) => ligands.push((molecule, target)),
                Err(_) => skipped += 1,
            }
        }
    }

    if ligands.is_empty() {
        bail!("No ligand records could be read from the input");
    }

    Ok(LoadedLigands { ligands, skipped })
}

fn target_from_path(path: &Path) -> Result<u8> {
    let text = path.to_string_lossy().to_lowercase();

    // "inactive" contains "active", so the negative checks run first.
    if text.contains("inactive") || text.contains("decoy") {
        Ok(0)
    } else if text.contains("active") {
        Ok(1)
    } else {
        bail!(
            "Cannot infer a label from '{}': the path must mention 'active', 'inactive', or 'decoy'",
            path.display()
        );
    }
}

/// Per-ligand outcome of the generation stage. Anything but `Kept` leaves
/// a gap at the ligand's index.
enum Outcome {
    Kept(Synthesis),
    /// Label forcing ran out of attempts.
    Discarded,
    /// The record parsed but there is nothing to synthesize from.
    Unusable,
}

fn generate_all(
    ligands: &[(Molecule, Option<u8>)],
    config: &SynthConfig,
    seed: u64,
    parallel: bool,
) -> Result<Vec<Outcome>> {
    let results = if parallel {
        ligands
            .par_iter()
            .enumerate()
            .map(|(index, (ligand, target))| generate_one(ligand, *target, config, seed, index))
            .collect::<Result<Vec<_>, _>>()?
    } else {
        ligands
            .iter()
            .enumerate()
            .map(|(index, (ligand, target))| generate_one(ligand, *target, config, seed, index))
            .collect::<Result<Vec<_>, _>>()?
    };

    Ok(results)
}

fn generate_one(
    ligand: &Molecule,
    target: Option<u8>,
    config: &SynthConfig,
    seed: u64,
    index: usize,
) -> Result<Outcome, SynthError> {
    let mut rng = SmallRng::seed_from_u64(mol_seed(seed, index as u64));
    let result = match target {
        Some(label) => synthesize_forced(ligand, config, label, &mut rng),
        None => synthesize(ligand, config, &mut rng).map(Some),
    };
    match result {
        Ok(Some(synthesis)) => Ok(Outcome::Kept(synthesis)),
        Ok(None) => Ok(Outcome::Discarded),
        // One degenerate ligand must not take the whole batch down with it;
        // only configuration errors abort the run.
        Err(SynthError::EmptyMolecule | SynthError::InvalidBond { .. }) => Ok(Outcome::Unusable),
        Err(err) => Err(err),
    }
}

/// Derives a per-molecule stream from the run seed so parallel and
/// sequential runs produce identical output.
fn mol_seed(base: u64, index: u64) -> u64 {
    base.wrapping_add(index.wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

fn build_read_substeps(inputs: &[PathBuf], loaded: &LoadedLigands) -> Vec<String> {
    let mut steps = Vec::new();

    if inputs.len() == 1 {
        let name = inputs[0]
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| inputs[0].display().to_string());
        steps.push(format!("Parse {}", name));
    } else {
        steps.push(format!("Parse {} SDF files", inputs.len()));
    }

    steps.push(format!("Read {} ligand records", loaded.ligands.len()));
    if loaded.skipped > 0 {
        steps.push(format!("Skip {} malformed records", loaded.skipped));
    }

    steps
}

fn build_gen_substeps(
    config: &SynthConfig,
    mode: ForceLabels,
    discarded: usize,
    unusable: usize,
) -> Vec<String> {
    let mut steps = vec!["Perceive complementary features".to_string()];

    steps.push(match config.budget {
        CandidateBudget::Fixed(n) => format!("Propose candidates (cap: {})", n),
        CandidateBudget::PerArea(coef) => {
            format!("Propose candidates ({} per Å² of surface)", coef)
        }
    });

    steps.push(format!(
        "Filter clashes (< {} Å) and spacing (< {} Å)",
        config.clash_distance, config.site_spacing
    ));

    steps.push(match config.count {
        SiteCount::Poisson(mean) => format!("Sample sites (Poisson, mean: {})", mean),
        SiteCount::Exact(n) => format!("Sample sites (exactly {})", n),
    });

    steps.push(match mode {
        ForceLabels::Off => format!("Assign labels (threshold: {} Å)", config.distance_threshold),
        ForceLabels::Zero => "Force labels to 0".to_string(),
        ForceLabels::One => "Force labels to 1".to_string(),
        ForceLabels::Path => "Force labels inferred from input paths".to_string(),
    });

    if unusable > 0 {
        steps.push(format!("Skip {} unusable ligand records", unusable));
    }

    if discarded > 0 {
        steps.push(format!(
            "Discard {} ligands after {} attempts each",
            discarded, config.retry_budget
        ));
    }

    steps
}

fn build_write_substeps(entries_written: usize) -> Vec<String> {
    vec![
        format!("Write {} ligand/pharmacophore SDF pairs", entries_written),
        format!("Write {} coordinate tables", entries_written * 2),
        "Write labels.yaml and atomic_labels.yaml".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use synth_phore::{Atom, Bond, BondOrder, Element};

    fn methane() -> Molecule {
        let mut mol = Molecule::new("methane");
        mol.atoms = vec![
            Atom::new(Element::C, [0.0, 0.0, 0.0]),
            Atom::new(Element::H, [0.63, 0.63, 0.63]),
            Atom::new(Element::H, [-0.63, -0.63, 0.63]),
            Atom::new(Element::H, [-0.63, 0.63, -0.63]),
            Atom::new(Element::H, [0.63, -0.63, -0.63]),
        ];
        mol.bonds = vec![
            Bond::new(0, 1, BondOrder::Single),
            Bond::new(0, 2, BondOrder::Single),
            Bond::new(0, 3, BondOrder::Single),
            Bond::new(0, 4, BondOrder::Single),
        ];
        mol
    }

    #[test]
    fn zero_atom_records_are_skipped_not_fatal() {
        let config = SynthConfig::default();
        let ligands = vec![
            (methane(), None),
            (Molecule::new("empty"), None),
            (methane(), None),
        ];

        let results = generate_all(&ligands, &config, 7, false).unwrap();

        assert_eq!(results.len(), 3);
        assert!(matches!(results[0], Outcome::Kept(_)));
        assert!(matches!(results[1], Outcome::Unusable));
        assert!(matches!(results[2], Outcome::Kept(_)));
    }

    #[test]
    fn forcing_on_a_zero_atom_record_is_still_skipped() {
        let config = SynthConfig::default();
        let ligands = vec![(Molecule::new("empty"), Some(1)), (methane(), None)];

        let results = generate_all(&ligands, &config, 3, false).unwrap();

        assert!(matches!(results[0], Outcome::Unusable));
        assert!(matches!(results[1], Outcome::Kept(_)));
    }

    #[test]
    fn an_invalid_config_still_aborts_the_run() {
        let config = SynthConfig {
            distance_threshold: -1.0,
            ..Default::default()
        };

        assert!(generate_all(&[(methane(), None)], &config, 3, false).is_err());
    }

    #[test]
    fn parallel_outcomes_match_sequential() {
        let config = SynthConfig::default();
        let ligands = vec![
            (methane(), None),
            (Molecule::new("empty"), None),
            (methane(), None),
        ];

        let seq = generate_all(&ligands, &config, 11, false).unwrap();
        let par = generate_all(&ligands, &config, 11, true).unwrap();

        assert_eq!(seq.len(), par.len());
        for (s, p) in seq.iter().zip(&par) {
            match (s, p) {
                (Outcome::Kept(a), Outcome::Kept(b)) => {
                    assert_eq!(a.label, b.label);
                    assert_eq!(a.pharmacophore.sites, b.pharmacophore.sites);
                }
                (Outcome::Discarded, Outcome::Discarded)
                | (Outcome::Unusable, Outcome::Unusable) => {}
                _ => panic!("sequential and parallel outcomes diverged"),
            }
        }
    }
}
