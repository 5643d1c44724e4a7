//! Configuration types for pharmacophore synthesis.
//!
//! This module defines the knobs that control the behavior of the
//! [`synthesize`](super::synthesize) function: the candidate budget, the
//! per-molecule site count, and the geometric thresholds.
//!
//! # Overview
//!
//! - [`SynthConfig`] — Main configuration struct
//! - [`CandidateBudget`] — Cap on proposed candidate sites
//! - [`SiteCount`] — How many sites survive subset sampling

use super::error::Error;
use serde::Serialize;

/// Default label distance threshold in Angstrom.
pub const DEFAULT_DISTANCE_THRESHOLD: f64 = 3.5;
/// Default minimum site-to-ligand distance in Angstrom.
pub const DEFAULT_CLASH_DISTANCE: f64 = 2.0;
/// Default minimum site-to-site distance in Angstrom.
pub const DEFAULT_SITE_SPACING: f64 = 2.0;
/// Default number of attempts before a forced label is given up on.
pub const DEFAULT_RETRY_BUDGET: usize = 100;

/// Cap on the number of candidate sites proposed per ligand.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum CandidateBudget {
    /// Hard cap on the candidate count.
    Fixed(usize),
    /// Coefficient multiplied by the approximate solvent-accessible surface
    /// area (in square Angstrom) to obtain the cap.
    PerArea(f64),
}

/// How many sites are kept by subset sampling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum SiteCount {
    /// Draw the count from a Poisson distribution with this mean.
    Poisson(f64),
    /// Keep exactly this many sites (clamped to availability).
    Exact(usize),
}

/// Main configuration for synthetic pharmacophore generation.
///
/// # Examples
///
/// ```
/// use synth_phore::synth::{CandidateBudget, SiteCount, SynthConfig};
///
/// // Default configuration
/// let default = SynthConfig::default();
///
/// // Area-proportional budget with a fixed site count
/// let custom = SynthConfig {
///     budget: CandidateBudget::PerArea(0.05),
///     count: SiteCount::Exact(6),
///     ..Default::default()
/// };
/// assert!(custom.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct SynthConfig {
    /// Cap on proposed candidate sites.
    pub budget: CandidateBudget,

    /// Number of sites surviving subset sampling.
    pub count: SiteCount,

    /// Maximum distance between a site and a matching ligand feature for
    /// the pair to count as an interaction (the label threshold).
    pub distance_threshold: f64,

    /// Sites closer than this to any ligand atom are discarded.
    pub clash_distance: f64,

    /// Minimum mutual distance between kept sites.
    pub site_spacing: f64,

    /// Attempts before a molecule with a forced label is discarded.
    pub retry_budget: usize,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            budget: CandidateBudget::Fixed(16),
            count: SiteCount::Poisson(4.0),
            distance_threshold: DEFAULT_DISTANCE_THRESHOLD,
            clash_distance: DEFAULT_CLASH_DISTANCE,
            site_spacing: DEFAULT_SITE_SPACING,
            retry_budget: DEFAULT_RETRY_BUDGET,
        }
    }
}

impl SynthConfig {
    /// Checks that the configuration can drive a generation run.
    pub fn validate(&self) -> Result<(), Error> {
        if !(self.distance_threshold > 0.0) || !self.distance_threshold.is_finite() {
            return Err(Error::invalid_config(
                "distance threshold must be positive and finite",
            ));
        }
        if !(self.clash_distance > 0.0) || !self.clash_distance.is_finite() {
            return Err(Error::invalid_config(
                "clash distance must be positive and finite",
            ));
        }
        if !(self.site_spacing > 0.0) || !self.site_spacing.is_finite() {
            return Err(Error::invalid_config(
                "site spacing must be positive and finite",
            ));
        }
        match self.budget {
            CandidateBudget::Fixed(_) => {}
            CandidateBudget::PerArea(coef) => {
                if !(coef > 0.0) || !coef.is_finite() {
                    return Err(Error::invalid_config(
                        "area coefficient must be positive and finite",
                    ));
                }
            }
        }
        match self.count {
            SiteCount::Poisson(mean) => {
                if !(mean > 0.0) || !mean.is_finite() {
                    return Err(Error::invalid_config(
                        "Poisson mean must be positive and finite",
                    ));
                }
            }
            SiteCount::Exact(_) => {}
        }
        Ok(())
    }
}
