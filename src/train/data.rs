//! Adapters from dataset entries to point-cloud tensors.
//!
//! One training example is the ligand and its pharmacophore concatenated
//! into a single point cloud. Every point carries a type id from a shared
//! vocabulary: id 0 is padding, ids 1..=18 are the supported elements in
//! atomic-number order, and site class ids come after the elements so the
//! two families can never collide.

use super::error::Error;
use crate::dataset::{self, Example};
use crate::model::types::Element;
use candle_core::{Device, Tensor};
use rand::seq::SliceRandom;
use rand::Rng;
use std::path::Path;

const PAD_ID: i64 = 0;
pub(crate) const SITE_CLASS_COUNT: usize = 3;

/// Padding + elements + site classes.
pub const TYPE_VOCAB_SIZE: usize = 1 + Element::ALL.len() + SITE_CLASS_COUNT;

fn ligand_type_id(atomic_number: u8) -> Option<i64> {
    Element::ALL
        .iter()
        .position(|e| e.atomic_number() == atomic_number)
        .map(|ordinal| 1 + ordinal as i64)
}

fn site_type_id(class_id: u8) -> Option<i64> {
    if usize::from(class_id) < SITE_CLASS_COUNT {
        Some(1 + Element::ALL.len() as i64 + i64::from(class_id))
    } else {
        None
    }
}

/// One example in tensor-ready form.
#[derive(Debug, Clone)]
pub struct PointCloud {
    /// Vocabulary id per point.
    pub types: Vec<i64>,
    /// Position per point.
    pub coords: Vec<[f32; 3]>,
    /// Binary target as a float for the loss.
    pub label: f32,
}

impl PointCloud {
    pub fn from_example(example: &Example) -> Result<Self, Error> {
        let n = example.ligand.len() + example.pharmacophore.len();
        let mut types = Vec::with_capacity(n);
        let mut coords = Vec::with_capacity(n);

        for row in &example.ligand {
            let id = ligand_type_id(row.type_id).ok_or(Error::UnknownPointType {
                table: "ligand",
                type_id: row.type_id,
            })?;
            types.push(id);
            coords.push([row.x as f32, row.y as f32, row.z as f32]);
        }
        for row in &example.pharmacophore {
            let id = site_type_id(row.type_id).ok_or(Error::UnknownPointType {
                table: "pharmacophore",
                type_id: row.type_id,
            })?;
            types.push(id);
            coords.push([row.x as f32, row.y as f32, row.z as f32]);
        }

        Ok(Self {
            types,
            coords,
            label: f32::from(example.label),
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// An in-memory training or evaluation set.
#[derive(Debug)]
pub struct PointDataset {
    examples: Vec<PointCloud>,
}

impl PointDataset {
    /// Loads every entry of a generated dataset under `root`.
    pub fn from_root(root: &Path) -> Result<Self, Error> {
        let raw = dataset::read_examples(root)?;
        if raw.is_empty() {
            return Err(Error::EmptyDataset {
                path: root.to_path_buf(),
            });
        }
        let examples = raw
            .iter()
            .map(PointCloud::from_example)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { examples })
    }

    #[cfg(test)]
    pub(crate) fn from_clouds(examples: Vec<PointCloud>) -> Self {
        Self { examples }
    }

    #[inline]
    pub fn examples(&self) -> &[PointCloud] {
        &self.examples
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.examples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub(crate) fn shuffled_indices(&self, rng: &mut impl Rng) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..self.examples.len()).collect();
        indices.shuffle(rng);
        indices
    }
}

/// A padded batch of point clouds on a device.
pub(crate) struct Batch {
    /// `[B, N]` point type ids, 0 where padded.
    pub types: Tensor,
    /// `[B, N, 3]` positions.
    pub coords: Tensor,
    /// `[B, N, N]` degree-normalized neighbor weights; padded rows are zero.
    pub adj: Tensor,
    /// `[B, N, 1]` validity mask.
    pub mask: Tensor,
    /// `[B, 1]` float targets.
    pub targets: Tensor,
}

/// Pads the clouds to a common length and links points within
/// `neighbor_radius` of each other. Each adjacency row is normalized by its
/// neighbor count so aggregation averages rather than sums.
pub(crate) fn make_batch(
    clouds: &[&PointCloud],
    neighbor_radius: f64,
    device: &Device,
) -> candle_core::Result<Batch> {
    let b = clouds.len();
    let n_max = clouds.iter().map(|c| c.len()).max().unwrap_or(0).max(1);
    let radius_sq = (neighbor_radius * neighbor_radius) as f32;

    let mut types = vec![PAD_ID; b * n_max];
    let mut coords = vec![0f32; b * n_max * 3];
    let mut adj = vec![0f32; b * n_max * n_max];
    let mut mask = vec![0f32; b * n_max];
    let mut targets = Vec::with_capacity(b);

    for (bi, cloud) in clouds.iter().enumerate() {
        let n = cloud.len();
        for i in 0..n {
            types[bi * n_max + i] = cloud.types[i];
            let base = (bi * n_max + i) * 3;
            coords[base..base + 3].copy_from_slice(&cloud.coords[i]);
            mask[bi * n_max + i] = 1.0;
        }

        for i in 0..n {
            let mut neighbors = Vec::new();
            for j in 0..n {
                if i == j {
                    continue;
                }
                let d = [
                    cloud.coords[i][0] - cloud.coords[j][0],
                    cloud.coords[i][1] - cloud.coords[j][1],
                    cloud.coords[i][2] - cloud.coords[j][2],
                ];
                if d[0] * d[0] + d[1] * d[1] + d[2] * d[2] <= radius_sq {
                    neighbors.push(j);
                }
            }
            if neighbors.is_empty() {
                continue;
            }
            let weight = 1.0 / neighbors.len() as f32;
            for j in neighbors {
                adj[bi * n_max * n_max + i * n_max + j] = weight;
            }
        }

        targets.push(cloud.label);
    }

    Ok(Batch {
        types: Tensor::from_vec(types, (b, n_max), device)?,
        coords: Tensor::from_vec(coords, (b, n_max, 3), device)?,
        adj: Tensor::from_vec(adj, (b, n_max, n_max), device)?,
        mask: Tensor::from_vec(mask, (b, n_max, 1), device)?,
        targets: Tensor::from_vec(targets, (b, 1), device)?,
    })
}
