use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use synth_phore::train::{self, PointDataset, TrainConfig, TrainReport};

use crate::cli::TrainArgs;
use crate::display::{Context as DisplayContext, Progress, print_train_summary};

const TOTAL_STEPS: u8 = 3;

pub fn run_train(args: TrainArgs, ctx: DisplayContext) -> Result<()> {
    let config = resolve_config(&args)?;

    let mut progress = Progress::new(ctx.interactive, TOTAL_STEPS);

    progress.step("Loading datasets");
    let train_set = PointDataset::from_root(&args.data_root).with_context(|| {
        format!(
            "Failed to load training data from '{}'",
            args.data_root.display()
        )
    })?;
    let val_set = match &args.val_root {
        Some(root) => Some(PointDataset::from_root(root).with_context(|| {
            format!("Failed to load validation data from '{}'", root.display())
        })?),
        None => None,
    };

    let load_substeps = build_load_substeps(&train_set, val_set.as_ref());
    let load_substeps_ref: Vec<&str> = load_substeps.iter().map(|s| s.as_str()).collect();
    progress.complete_step("Loading datasets", &load_substeps_ref);

    progress.step("Preparing run");
    let checkpoint = prepare_save_dir(&args, &config)?;

    let prep_substeps = build_prepare_substeps(&config, checkpoint.as_deref());
    let prep_substeps_ref: Vec<&str> = prep_substeps.iter().map(|s| s.as_str()).collect();
    progress.complete_step("Preparing run", &prep_substeps_ref);

    progress.step("Training classifier");
    let report = train::fit(
        &train_set,
        val_set.as_ref(),
        &config,
        checkpoint.as_deref(),
        |metrics| {
            let mut line = format!(
                "Training classifier (epoch {}/{}, loss {:.4}",
                metrics.epoch, config.epochs, metrics.train_loss
            );
            if let Some(val) = &metrics.val {
                line.push_str(&format!(", val acc {:.0}%", val.accuracy * 100.0));
            }
            line.push(')');
            progress.update(&line);
        },
    )?;

    let train_substeps = build_train_substeps(&report);
    let train_substeps_ref: Vec<&str> = train_substeps.iter().map(|s| s.as_str()).collect();
    progress.complete_step("Training classifier", &train_substeps_ref);

    if ctx.interactive {
        print_train_summary(&report);
    }

    progress.finish();

    Ok(())
}

fn resolve_config(args: &TrainArgs) -> Result<TrainConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open '{}'", path.display()))?;
            TrainConfig::from_yaml(BufReader::new(file))
                .with_context(|| format!("Failed to parse '{}'", path.display()))?
        }
        None => TrainConfig::default(),
    };

    if let Some(epochs) = args.optim.epochs {
        config.epochs = epochs;
    }
    if let Some(batch_size) = args.optim.batch_size {
        config.batch_size = batch_size;
    }
    if let Some(learning_rate) = args.optim.learning_rate {
        config.learning_rate = learning_rate;
    }
    if let Some(seed) = args.run.seed {
        config.seed = seed;
    }

    config.validate()?;
    Ok(config)
}

/// Creates the save directory and persists the resolved configuration, so a
/// run can be reproduced even if it is interrupted mid-training.
fn prepare_save_dir(args: &TrainArgs, config: &TrainConfig) -> Result<Option<PathBuf>> {
    let Some(dir) = &args.run.save_to else {
        return Ok(None);
    };

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create '{}'", dir.display()))?;

    let config_path = dir.join("train_config.yaml");
    let file = File::create(&config_path)
        .with_context(|| format!("Failed to write '{}'", config_path.display()))?;
    config.to_yaml(BufWriter::new(file))?;

    Ok(Some(dir.join("model.safetensors")))
}

fn build_load_substeps(train_set: &PointDataset, val_set: Option<&PointDataset>) -> Vec<String> {
    let mut steps = vec![format!("Read {} training examples", train_set.len())];

    match val_set {
        Some(val) => steps.push(format!("Read {} validation examples", val.len())),
        None => steps.push("No validation set".to_string()),
    }

    steps
}

fn build_prepare_substeps(config: &TrainConfig, checkpoint: Option<&Path>) -> Vec<String> {
    let mut steps = vec![
        format!(
            "Epochs: {}, batch size: {}, learning rate: {}",
            config.epochs, config.batch_size, config.learning_rate
        ),
        format!(
            "Hidden dim: {}, message layers: {}, radius: {} Å",
            config.hidden_dim, config.message_layers, config.neighbor_radius
        ),
        format!("Seed: {}", config.seed),
    ];

    if checkpoint.is_some() {
        steps.push("Write train_config.yaml".to_string());
    }

    steps
}

fn build_train_substeps(report: &TrainReport) -> Vec<String> {
    let mut steps = vec![
        format!("Ran {} epochs", report.epochs_run),
        format!("Final train loss: {:.4}", report.final_train_loss),
    ];

    if let Some(eval) = &report.final_eval {
        steps.push(format!(
            "Validation: loss {:.4}, accuracy {:.1}%",
            eval.loss,
            eval.accuracy * 100.0
        ));
    }
    if let Some(path) = &report.checkpoint {
        steps.push(format!("Checkpoint → {}", path.display()));
    }

    steps
}
