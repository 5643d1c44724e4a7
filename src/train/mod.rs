//! Training driver for the point-cloud activity classifier.
//!
//! [`fit`] owns the whole run: model and optimizer construction, the
//! shuffled mini-batch epoch loop, per-epoch validation, the final
//! evaluation, and the safetensors checkpoint. Hyperparameters come from a
//! [`TrainConfig`], which can be loaded from YAML and merged with command
//! line overrides before the run starts.

pub mod data;
mod error;
pub mod model;

pub use data::{PointDataset, TYPE_VOCAB_SIZE};
pub use error::Error;
pub use model::{ModelConfig, PointClassifier};

use candle_core::{DType, Device};
use candle_nn::{loss, AdamW, Optimizer, ParamsAdamW, VarBuilder, VarMap};
use data::PointCloud;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Hyperparameters of one training run.
///
/// Every field has a default, so a YAML file only needs the values it wants
/// to change. The resolved configuration is what a run is reproducible
/// from; the command writes it next to the checkpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainConfig {
    /// Full passes over the training set.
    pub epochs: usize,
    /// Examples per optimization step.
    pub batch_size: usize,
    /// AdamW learning rate.
    pub learning_rate: f64,
    /// Width of point features.
    pub hidden_dim: usize,
    /// Message-passing rounds.
    pub message_layers: usize,
    /// Two points within this distance (Angstrom) exchange messages.
    pub neighbor_radius: f64,
    /// Seed for parameter initialization order and epoch shuffling.
    pub seed: u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            epochs: 30,
            batch_size: 32,
            learning_rate: 1e-3,
            hidden_dim: 64,
            message_layers: 3,
            neighbor_radius: 4.0,
            seed: 42,
        }
    }
}

impl TrainConfig {
    pub fn from_yaml<R: Read>(reader: R) -> Result<Self, Error> {
        let config: Self = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    pub fn to_yaml<W: Write>(&self, writer: W) -> Result<(), Error> {
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Checks that the configuration can drive a run.
    pub fn validate(&self) -> Result<(), Error> {
        if self.epochs == 0 {
            return Err(Error::invalid_config("epochs must be at least 1"));
        }
        if self.batch_size == 0 {
            return Err(Error::invalid_config("batch size must be at least 1"));
        }
        if !(self.learning_rate > 0.0) || !self.learning_rate.is_finite() {
            return Err(Error::invalid_config(
                "learning rate must be positive and finite",
            ));
        }
        if self.hidden_dim == 0 {
            return Err(Error::invalid_config("hidden dimension must be at least 1"));
        }
        if self.message_layers == 0 {
            return Err(Error::invalid_config(
                "at least one message-passing layer is required",
            ));
        }
        if !(self.neighbor_radius > 0.0) || !self.neighbor_radius.is_finite() {
            return Err(Error::invalid_config(
                "neighbor radius must be positive and finite",
            ));
        }
        Ok(())
    }
}

/// Loss and accuracy over one dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub loss: f64,
    pub accuracy: f64,
}

/// What one epoch produced.
#[derive(Debug, Clone, Copy)]
pub struct EpochMetrics {
    /// 1-based epoch number.
    pub epoch: usize,
    /// Mean batch loss over the epoch.
    pub train_loss: f64,
    /// Validation metrics, when a validation set was given.
    pub val: Option<Evaluation>,
}

/// Summary of a finished run.
#[derive(Debug, Clone)]
pub struct TrainReport {
    pub epochs_run: usize,
    pub final_train_loss: f64,
    /// Evaluation of the validation set after the last epoch.
    pub final_eval: Option<Evaluation>,
    /// Where the parameters were saved, if anywhere.
    pub checkpoint: Option<PathBuf>,
}

/// Trains the classifier on `train_set`.
///
/// `on_epoch` fires after every epoch with the metrics so far; the caller
/// decides how to surface them. When `checkpoint` is given the learned
/// parameters are written there as safetensors after the last epoch.
pub fn fit(
    train_set: &PointDataset,
    val_set: Option<&PointDataset>,
    config: &TrainConfig,
    checkpoint: Option<&Path>,
    mut on_epoch: impl FnMut(&EpochMetrics),
) -> Result<TrainReport, Error> {
    config.validate()?;

    let device = Device::Cpu;
    let varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);

    let model_config = ModelConfig {
        type_vocab: data::TYPE_VOCAB_SIZE,
        hidden_dim: config.hidden_dim,
        message_layers: config.message_layers,
    };
    let model = PointClassifier::new(vb, &model_config)?;

    let mut opt = AdamW::new(
        varmap.all_vars(),
        ParamsAdamW {
            lr: config.learning_rate,
            ..Default::default()
        },
    )?;

    let mut rng = SmallRng::seed_from_u64(config.seed);
    let mut final_train_loss = 0.0;

    for epoch in 1..=config.epochs {
        let order = train_set.shuffled_indices(&mut rng);
        let mut running_loss = 0f64;
        let mut batches = 0usize;

        for chunk in order.chunks(config.batch_size) {
            let clouds: Vec<&PointCloud> =
                chunk.iter().map(|&i| &train_set.examples()[i]).collect();
            let batch = data::make_batch(&clouds, config.neighbor_radius, &device)?;

            let logits = model.forward(&batch.types, &batch.coords, &batch.adj, &batch.mask)?;
            let batch_loss = loss::binary_cross_entropy_with_logit(&logits, &batch.targets)?;

            opt.backward_step(&batch_loss)?;

            running_loss += f64::from(batch_loss.to_scalar::<f32>()?);
            batches += 1;
        }

        final_train_loss = running_loss / batches.max(1) as f64;

        let val = match val_set {
            Some(set) => Some(evaluate(&model, set, config, &device)?),
            None => None,
        };
        on_epoch(&EpochMetrics {
            epoch,
            train_loss: final_train_loss,
            val,
        });
    }

    let final_eval = match val_set {
        Some(set) => Some(evaluate(&model, set, config, &device)?),
        None => None,
    };

    let checkpoint = match checkpoint {
        Some(path) => {
            varmap.save(path)?;
            Some(path.to_path_buf())
        }
        None => None,
    };

    Ok(TrainReport {
        epochs_run: config.epochs,
        final_train_loss,
        final_eval,
        checkpoint,
    })
}

/// Scores a dataset without touching the parameters.
///
/// A cloud counts as predicted active when its logit is non-negative.
pub fn evaluate(
    model: &PointClassifier,
    set: &PointDataset,
    config: &TrainConfig,
    device: &Device,
) -> Result<Evaluation, Error> {
    let mut loss_sum = 0f64;
    let mut batches = 0usize;
    let mut correct = 0usize;
    let mut total = 0usize;

    for chunk in set.examples().chunks(config.batch_size) {
        let clouds: Vec<&PointCloud> = chunk.iter().collect();
        let batch = data::make_batch(&clouds, config.neighbor_radius, device)?;

        let logits = model.forward(&batch.types, &batch.coords, &batch.adj, &batch.mask)?;
        let batch_loss = loss::binary_cross_entropy_with_logit(&logits, &batch.targets)?;
        loss_sum += f64::from(batch_loss.to_scalar::<f32>()?);
        batches += 1;

        let scores: Vec<Vec<f32>> = logits.to_vec2()?;
        for (row, cloud) in scores.iter().zip(chunk) {
            let predicted_active = row[0] >= 0.0;
            if predicted_active == (cloud.label >= 0.5) {
                correct += 1;
            }
            total += 1;
        }
    }

    Ok(Evaluation {
        loss: loss_sum / batches.max(1) as f64,
        accuracy: correct as f64 / total.max(1) as f64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn toy_config() -> TrainConfig {
        TrainConfig {
            epochs: 2,
            batch_size: 2,
            hidden_dim: 8,
            message_layers: 1,
            ..Default::default()
        }
    }

    fn toy_dataset() -> PointDataset {
        let active = PointCloud {
            types: vec![5, 20],
            coords: vec![[0.0, 0.0, 0.0], [2.5, 0.0, 0.0]],
            label: 1.0,
        };
        let inactive = PointCloud {
            types: vec![5, 20],
            coords: vec![[0.0, 0.0, 0.0], [9.0, 0.0, 0.0]],
            label: 0.0,
        };
        PointDataset::from_clouds(vec![
            active.clone(),
            inactive.clone(),
            active,
            inactive,
        ])
    }

    #[test]
    fn default_config_is_valid() {
        assert!(TrainConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_degenerate_values() {
        for broken in [
            TrainConfig {
                epochs: 0,
                ..Default::default()
            },
            TrainConfig {
                batch_size: 0,
                ..Default::default()
            },
            TrainConfig {
                learning_rate: 0.0,
                ..Default::default()
            },
            TrainConfig {
                neighbor_radius: f64::NAN,
                ..Default::default()
            },
            TrainConfig {
                message_layers: 0,
                ..Default::default()
            },
        ] {
            assert!(matches!(broken.validate(), Err(Error::InvalidConfig(_))));
        }
    }

    #[test]
    fn yaml_roundtrip_and_partial_files() {
        let config = toy_config();
        let mut buf = Vec::new();
        config.to_yaml(&mut buf).unwrap();
        let parsed = TrainConfig::from_yaml(Cursor::new(buf)).unwrap();
        assert_eq!(parsed, config);

        // A partial file keeps the defaults for everything it omits.
        let partial = TrainConfig::from_yaml(Cursor::new("epochs: 5\n")).unwrap();
        assert_eq!(partial.epochs, 5);
        assert_eq!(partial.batch_size, TrainConfig::default().batch_size);

        assert!(TrainConfig::from_yaml(Cursor::new("warp_speed: 9\n")).is_err());
    }

    #[test]
    fn fit_runs_epochs_and_reports() {
        let set = toy_dataset();
        let mut epochs_seen = Vec::new();
        let report = fit(&set, Some(&set), &toy_config(), None, |m| {
            epochs_seen.push(m.epoch);
            assert!(m.train_loss.is_finite());
            assert!(m.val.is_some());
        })
        .unwrap();

        assert_eq!(epochs_seen, vec![1, 2]);
        assert_eq!(report.epochs_run, 2);
        assert!(report.final_train_loss.is_finite());
        let eval = report.final_eval.unwrap();
        assert!(eval.loss.is_finite());
        assert!((0.0..=1.0).contains(&eval.accuracy));
        assert!(report.checkpoint.is_none());
    }

    #[test]
    fn fit_saves_a_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.safetensors");
        let set = toy_dataset();
        let report = fit(&set, None, &toy_config(), Some(&path), |_| {}).unwrap();
        assert_eq!(report.checkpoint.as_deref(), Some(path.as_path()));
        assert!(path.is_file());
    }

    #[test]
    fn invalid_config_fails_before_training() {
        let set = toy_dataset();
        let broken = TrainConfig {
            epochs: 0,
            ..Default::default()
        };
        assert!(matches!(
            fit(&set, None, &broken, None, |_| {}),
            Err(Error::InvalidConfig(_))
        ));
    }
}
