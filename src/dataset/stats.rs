//! Run summary statistics written to `stats.txt`.

use crate::io::Error;
use crate::synth::SynthConfig;
use std::fmt;
use std::time::Duration;

/// Min / mean / max over a set of per-entry counts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Descriptive {
    pub min: usize,
    pub mean: f64,
    pub max: usize,
}

impl Descriptive {
    /// `None` when there are no counts to describe.
    pub fn from_counts(counts: impl IntoIterator<Item = usize>) -> Option<Self> {
        let mut min = usize::MAX;
        let mut max = 0usize;
        let mut sum = 0usize;
        let mut n = 0usize;
        for c in counts {
            min = min.min(c);
            max = max.max(c);
            sum += c;
            n += 1;
        }
        if n == 0 {
            return None;
        }
        Some(Self {
            min,
            mean: sum as f64 / n as f64,
            max,
        })
    }
}

impl fmt::Display for Descriptive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "min {} / mean {:.1} / max {}", self.min, self.mean, self.max)
    }
}

/// Everything worth recording about one generation run.
#[derive(Debug, Clone)]
pub struct RunStats {
    /// Molecules successfully parsed from the input files.
    pub ligands_read: usize,
    /// Malformed SDF records skipped while reading.
    pub records_skipped: usize,
    /// Entries written to the dataset.
    pub entries_written: usize,
    /// Ligands dropped because label forcing ran out of attempts.
    pub discarded: usize,
    /// Ligands that parsed but had nothing to synthesize from.
    pub unusable: usize,
    /// Written entries with label 1.
    pub positives: usize,
    /// Atom counts over written ligands.
    pub ligand_atoms: Option<Descriptive>,
    /// Site counts over written pharmacophores.
    pub pharmacophore_sites: Option<Descriptive>,
    /// Worker threads used for generation.
    pub workers: usize,
    /// Seed the run was driven by.
    pub seed: u64,
    /// Wall time of the generation stage.
    pub elapsed: Duration,
}

impl RunStats {
    /// Fraction of written entries labeled active; 0 for an empty run.
    pub fn positive_fraction(&self) -> f64 {
        if self.entries_written == 0 {
            0.0
        } else {
            self.positives as f64 / self.entries_written as f64
        }
    }

    /// Renders the `stats.txt` body, effective configuration included.
    pub fn render(&self, config: &SynthConfig) -> Result<String, Error> {
        let mut out = String::new();
        out.push_str("synthetic pharmacophore generation run\n");
        out.push_str("======================================\n\n");

        out.push_str(&format!("ligands read:        {}\n", self.ligands_read));
        out.push_str(&format!("records skipped:     {}\n", self.records_skipped));
        out.push_str(&format!("entries written:     {}\n", self.entries_written));
        out.push_str(&format!("discarded (forcing): {}\n", self.discarded));
        out.push_str(&format!("unusable ligands:    {}\n", self.unusable));
        out.push_str(&format!(
            "positive entries:    {} ({:.3})\n\n",
            self.positives,
            self.positive_fraction()
        ));

        if let Some(d) = &self.ligand_atoms {
            out.push_str(&format!("ligand atoms:        {d}\n"));
        }
        if let Some(d) = &self.pharmacophore_sites {
            out.push_str(&format!("pharmacophore sites: {d}\n"));
        }

        out.push_str(&format!("\nworkers:             {}\n", self.workers));
        out.push_str(&format!("seed:                {}\n", self.seed));
        out.push_str(&format!(
            "wall time:           {}\n",
            format_duration(self.elapsed)
        ));

        out.push_str("\nconfiguration:\n");
        for line in serde_yaml::to_string(config)?.lines() {
            out.push_str("  ");
            out.push_str(line);
            out.push('\n');
        }
        Ok(out)
    }
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs >= 3600 {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    } else if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{:.2}s", d.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_stats() -> RunStats {
        RunStats {
            ligands_read: 13,
            records_skipped: 1,
            entries_written: 10,
            discarded: 2,
            unusable: 1,
            positives: 6,
            ligand_atoms: Descriptive::from_counts([8, 23, 14]),
            pharmacophore_sites: Descriptive::from_counts([0, 6, 3]),
            workers: 4,
            seed: 42,
            elapsed: Duration::from_millis(3210),
        }
    }

    #[test]
    fn descriptive_over_counts() {
        let d = Descriptive::from_counts([3, 10, 5]).unwrap();
        assert_eq!(d.min, 3);
        assert_eq!(d.max, 10);
        assert!((d.mean - 6.0).abs() < 1e-12);
        assert!(Descriptive::from_counts([]).is_none());
    }

    #[test]
    fn positive_fraction_handles_empty_runs() {
        let mut stats = sample_stats();
        assert!((stats.positive_fraction() - 0.6).abs() < 1e-12);
        stats.entries_written = 0;
        stats.positives = 0;
        assert_eq!(stats.positive_fraction(), 0.0);
    }

    #[test]
    fn render_includes_counts_and_config() {
        let text = sample_stats().render(&SynthConfig::default()).unwrap();
        assert!(text.contains("entries written:     10"));
        assert!(text.contains("unusable ligands:    1"));
        assert!(text.contains("positive entries:    6 (0.600)"));
        assert!(text.contains("min 8 / mean 15.0 / max 23"));
        assert!(text.contains("wall time:           3.21s"));
        assert!(text.contains("configuration:"));
        assert!(text.contains("distance_threshold"));
    }

    #[test]
    fn durations_format_by_magnitude() {
        assert_eq!(format_duration(Duration::from_millis(500)), "0.50s");
        assert_eq!(format_duration(Duration::from_secs(75)), "1m 15s");
        assert_eq!(format_duration(Duration::from_secs(3725)), "1h 2m 5s");
    }
}
