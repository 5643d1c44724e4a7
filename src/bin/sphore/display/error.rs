use std::io::{self, Write};

use anyhow::Error;

use super::text::wrap;

#[rustfmt::skip]
pub fn print_error(err: &Error) {
    let mut stderr = io::stderr().lock();

    let _ = writeln!(stderr);
    let _ = writeln!(stderr, "   ╔══════════════════════════════════════════════════════════════╗");
    let _ = writeln!(stderr, "   ║  ✗ Error                                                     ║");
    let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");

    let msg = err.to_string();
    for line in wrap(&msg, 59) {
        let _ = writeln!(stderr, "   ║  {:<59} ║", line);
    }

    let mut source = err.source();
    while let Some(cause) = source {
        let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");
        let _ = writeln!(stderr, "   ║  Caused by:                                                  ║");
        for line in wrap(&cause.to_string(), 59) {
            let _ = writeln!(stderr, "   ║    {:<57} ║", line);
        }
        source = cause.source();
    }

    if let Some(hints) = HintCollector::collect(err) {
        let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");
        let _ = writeln!(stderr, "   ║  Hints:                                                      ║");
        for hint in hints {
            let wrapped = wrap(&hint, 55);
            if let Some((first, rest)) = wrapped.split_first() {
                let _ = writeln!(stderr, "   ║    • {:<55} ║", first);
                for line in rest {
                    let _ = writeln!(stderr, "   ║      {:<55} ║", line);
                }
            }
        }
    }

    let _ = writeln!(stderr, "   ╚══════════════════════════════════════════════════════════════╝");
    let _ = writeln!(stderr);
}

struct HintCollector {
    hints: Vec<String>,
    has_typed_hints: bool,
}

impl HintCollector {
    fn new() -> Self {
        Self {
            hints: Vec::new(),
            has_typed_hints: false,
        }
    }

    fn collect(err: &Error) -> Option<Vec<String>> {
        let mut collector = Self::new();

        collector.collect_io_hints(err);
        collector.collect_synth_hints(err);
        collector.collect_train_hints(err);

        if !collector.has_typed_hints {
            collector.collect_fallback_hints(err);
        }

        if collector.hints.is_empty() {
            None
        } else {
            Some(collector.hints)
        }
    }

    fn add(&mut self, hint: impl Into<String>) {
        self.hints.push(hint.into());
    }

    fn mark_typed(&mut self) {
        self.has_typed_hints = true;
    }

    fn collect_io_hints(&mut self, err: &Error) {
        use synth_phore::io::Error as IoError;

        let Some(io_err) = err.downcast_ref::<IoError>() else {
            return;
        };

        self.mark_typed();
        self.add_io_error_hints(io_err);
    }

    fn add_io_error_hints(&mut self, io_err: &synth_phore::io::Error) {
        use synth_phore::io::{Error as IoError, Format};

        match io_err {
            IoError::Io { source } => {
                self.collect_std_io_hints(source);
            }

            IoError::Parse { format, line, .. } => {
                self.add(format!(
                    "Parser encountered an issue near line {} in {} data",
                    line, format
                ));
                self.add("Inspect the record around that line for malformed entries");
                match format {
                    Format::Sdf => {
                        self.add("SDF: Verify the V2000 counts line and block sizes");
                        self.add("SDF: Records must be separated by $$$$ lines");
                    }
                    Format::Csv => {
                        self.add("CSV: Rows must carry x,y,z,type columns");
                    }
                    Format::Yaml => {
                        self.add("YAML: Keys must be dataset indices, values labels");
                    }
                }
            }

            IoError::Table { .. } => {
                self.add("A coordinate table row could not be read");
                self.add("Regenerate the dataset if the tables were edited by hand");
            }

            IoError::Yaml { .. } => {
                self.add("A label map or configuration file is not valid YAML");
                self.add("Check indentation and that mapping keys are integers");
            }
        }
    }

    fn collect_synth_hints(&mut self, err: &Error) {
        use synth_phore::synth::Error as SynthError;

        let Some(synth_err) = err.downcast_ref::<SynthError>() else {
            return;
        };

        self.mark_typed();

        match synth_err {
            SynthError::EmptyMolecule => {
                self.add("An input record contains no atoms");
                self.add("Remove empty records from the ligand SDF");
            }

            SynthError::InvalidBond { .. } => {
                self.add("A bond references an atom that does not exist");
                self.add("The source SDF likely has a corrupt bond block");
            }

            SynthError::InvalidConfig(_) => {
                self.add("Generation parameters failed validation");
                self.add("Check the --max-features/--area-coef and --poisson-mean/--num-opportunities values");
            }
        }
    }

    fn collect_train_hints(&mut self, err: &Error) {
        use synth_phore::train::Error as TrainError;

        let Some(train_err) = err.downcast_ref::<TrainError>() else {
            return;
        };

        self.mark_typed();

        match train_err {
            TrainError::Dataset(inner) => {
                self.add_io_error_hints(inner);
                self.add("Regenerate the dataset with `sphore gen` if files are missing");
            }

            TrainError::Tensor(_) => {
                self.add("A tensor operation failed while training");
                self.add("Try a smaller --batch-size or fewer message layers");
            }

            TrainError::ConfigFile(_) => {
                self.add("The run configuration YAML could not be parsed");
                self.add("Compare field names against a saved train_config.yaml");
            }

            TrainError::InvalidConfig(_) => {
                self.add("Training parameters failed validation");
                self.add("Check the --epochs, --batch-size, and --learning-rate values");
            }

            TrainError::EmptyDataset { .. } => {
                self.add("The dataset root holds no labeled entries");
                self.add("DATA_ROOT must be the directory holding labels.yaml");
                self.add("Generate a dataset first with `sphore gen`");
            }

            TrainError::UnknownPointType { .. } => {
                self.add("A coordinate table carries an unknown point type id");
                self.add("Regenerate the dataset with this version of the tool");
            }
        }
    }

    fn collect_std_io_hints(&mut self, source: &std::io::Error) {
        use std::io::ErrorKind;

        match source.kind() {
            ErrorKind::NotFound => {
                self.add("File or directory not found");
                self.add("Check the path spelling and ensure the file exists");
            }

            ErrorKind::PermissionDenied => {
                self.add("Permission denied accessing the path");
                self.add("Check permissions with `ls -la` and your write access");
            }

            ErrorKind::InvalidData => {
                self.add("File contains invalid or corrupt data");
                self.add("Verify the file is not truncated");
            }

            ErrorKind::UnexpectedEof => {
                self.add("Unexpected end of file encountered");
                self.add("The file may be truncated or incomplete");
            }

            ErrorKind::WriteZero => {
                self.add("Failed to write data (disk full?)");
                self.add("Check available disk space");
            }

            _ => {
                self.add("I/O operation failed");
                self.add("Check file path, permissions, and disk space");
            }
        }
    }

    fn collect_fallback_hints(&mut self, err: &Error) {
        let msg = error_chain_text(err);

        if msg.contains("no such file") || msg.contains("not found") {
            self.add("Check that the path is correct");
            self.add("Verify the file exists and is readable");
            return;
        }

        if msg.contains("permission denied") {
            self.add("Check file permissions with `ls -la`");
            self.add("Ensure you have the required access rights");
            return;
        }

        if msg.contains("empty") {
            self.add("Input appears to be empty");
            self.add("Verify the ligand file holds at least one record");
        }
    }
}

fn error_chain_text(err: &Error) -> String {
    let mut text = String::new();

    text.push_str(&err.to_string());

    let mut source = err.source();
    while let Some(cause) = source {
        text.push('\n');
        text.push_str(&cause.to_string());
        source = cause.source();
    }

    text.to_lowercase()
}
