use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "sphore",
    about = "Synthetic pharmacophore dataset generation and training",
    version,
    author,
    before_help = crate::display::banner_for_help(),
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate a labeled pharmacophore dataset from ligand SDF files
    #[command(visible_alias = "g")]
    Gen(GenArgs),

    /// Train the point-cloud activity classifier on a generated dataset
    #[command(visible_alias = "t")]
    Train(TrainArgs),
}

#[derive(Args)]
pub struct GenArgs {
    /// Ligand SDF file, or a directory of .sdf files
    #[arg(value_name = "LIGANDS")]
    pub ligands: PathBuf,

    /// Directory the dataset tree is written into
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    #[command(flatten)]
    pub budget: BudgetOptions,

    #[command(flatten)]
    pub sampling: SamplingOptions,

    #[command(flatten)]
    pub labeling: LabelOptions,

    #[command(flatten)]
    pub run: RunOptions,
}

/// Candidate budget options (exactly one must be given).
#[derive(Args)]
#[command(next_help_heading = "Candidate Budget")]
pub struct BudgetOptions {
    /// Hard cap on candidate sites per ligand
    #[arg(short = 'm', long, value_name = "N")]
    pub max_features: Option<usize>,

    /// Candidate sites per Å² of ligand surface area
    #[arg(short = 'a', long, value_name = "COEF")]
    pub area_coef: Option<f64>,
}

/// Site count options (exactly one must be given).
#[derive(Args)]
#[command(next_help_heading = "Site Sampling")]
pub struct SamplingOptions {
    /// Poisson mean for the per-ligand site count
    #[arg(short = 'p', long, value_name = "MEAN")]
    pub poisson_mean: Option<f64>,

    /// Fixed number of interaction opportunities per ligand
    #[arg(short = 'n', long, value_name = "N")]
    pub num_opportunities: Option<usize>,
}

#[derive(Args)]
#[command(next_help_heading = "Labeling")]
pub struct LabelOptions {
    /// Maximum site-to-feature distance counted as an interaction (Å)
    #[arg(short = 't', long, value_name = "Å", default_value = "3.5")]
    pub distance_threshold: f64,

    /// Regenerate each ligand until it reaches a target label
    #[arg(short = 'f', long, value_name = "MODE", default_value = "off")]
    pub force_labels: ForceLabels,
}

#[derive(Args)]
#[command(next_help_heading = "Run Control")]
pub struct RunOptions {
    /// Random seed for a reproducible run
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Process ligands on all cores
    #[arg(long)]
    pub parallel: bool,

    /// Suppress progress output (for scripting)
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum ForceLabels {
    /// Keep whatever label the pipeline produces
    #[default]
    Off,
    /// Force every ligand to label 0 (no interactions)
    Zero,
    /// Force every ligand to label 1 (at least one interaction)
    One,
    /// Infer the target from each input path (active/inactive/decoy)
    Path,
}

#[derive(Args)]
pub struct TrainArgs {
    /// Root of a generated dataset (the directory holding labels.yaml)
    #[arg(value_name = "DATA_ROOT")]
    pub data_root: PathBuf,

    /// Dataset evaluated after every epoch
    #[arg(long, value_name = "DIR")]
    pub val_root: Option<PathBuf>,

    /// Run configuration YAML (flags below override its values)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub optim: OptimOptions,

    #[command(flatten)]
    pub run: TrainRunOptions,
}

#[derive(Args)]
#[command(next_help_heading = "Optimization")]
pub struct OptimOptions {
    /// Full passes over the training set
    #[arg(long, value_name = "N")]
    pub epochs: Option<usize>,

    /// Examples per optimization step
    #[arg(long, value_name = "N")]
    pub batch_size: Option<usize>,

    /// AdamW learning rate
    #[arg(long, value_name = "LR")]
    pub learning_rate: Option<f64>,
}

#[derive(Args)]
#[command(next_help_heading = "Run Control")]
pub struct TrainRunOptions {
    /// Directory for the checkpoint and resolved configuration
    #[arg(long, value_name = "DIR")]
    pub save_to: Option<PathBuf>,

    /// Seed for parameter initialization and epoch shuffling
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Suppress progress output (for scripting)
    #[arg(short, long)]
    pub quiet: bool,
}

pub fn parse() -> Cli {
    Cli::parse()
}
