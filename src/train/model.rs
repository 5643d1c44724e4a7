//! The point-cloud activity classifier.
//!
//! Point features start as a learned type embedding plus a linear lift of
//! the raw coordinates. A stack of message-passing layers then mixes each
//! point with its geometric neighbors (the batch adjacency carries the
//! degree-normalized links), a masked mean pool collapses the cloud, and a
//! single-logit head scores it. Batches are padded, so the validity mask is
//! reapplied after every step that can smear values into padded rows.

use candle_core::{D, Module, Tensor};
use candle_nn::ops::sigmoid;
use candle_nn::{self as nn, Embedding, Linear, VarBuilder};

/// Shape of the classifier graph.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Size of the point type vocabulary, padding id included.
    pub type_vocab: usize,
    /// Width of point features.
    pub hidden_dim: usize,
    /// Number of message-passing rounds.
    pub message_layers: usize,
}

struct GruCell {
    w_ih: Linear, // in -> 3*h
    w_hh: Linear, // h -> 3*h
    hidden_dim: usize,
}

impl GruCell {
    fn new(vb: VarBuilder, hidden_dim: usize) -> candle_core::Result<Self> {
        let w_ih = nn::linear(hidden_dim, 3 * hidden_dim, vb.pp("w_ih"))?;
        let w_hh = nn::linear(hidden_dim, 3 * hidden_dim, vb.pp("w_hh"))?;
        Ok(Self {
            w_ih,
            w_hh,
            hidden_dim,
        })
    }

    fn forward(&self, x: &Tensor, h: &Tensor) -> candle_core::Result<Tensor> {
        // x, h: [B, N, H]
        let ih = self.w_ih.forward(x)?;
        let hh = self.w_hh.forward(h)?;

        let hsize = self.hidden_dim;
        let i_r = ih.narrow(D::Minus1, 0, hsize)?;
        let i_z = ih.narrow(D::Minus1, hsize, hsize)?;
        let i_n = ih.narrow(D::Minus1, 2 * hsize, hsize)?;

        let h_r = hh.narrow(D::Minus1, 0, hsize)?;
        let h_z = hh.narrow(D::Minus1, hsize, hsize)?;
        let h_n = hh.narrow(D::Minus1, 2 * hsize, hsize)?;

        let r = sigmoid(&(i_r + h_r)?)?;
        let z = sigmoid(&(i_z + h_z)?)?;
        let n = (i_n + (r * h_n)?)?.tanh()?;

        let one = Tensor::ones_like(&z)?;
        let one_minus_z = one.sub(&z)?;

        (&one_minus_z * n)? + (&z * h)?
    }
}

struct MessagePassingLayer {
    msg: Linear,
    gru: GruCell,
}

impl MessagePassingLayer {
    fn new(vb: VarBuilder, hidden_dim: usize) -> candle_core::Result<Self> {
        let msg = nn::linear(hidden_dim * 2, hidden_dim, vb.pp("msg"))?;
        let gru = GruCell::new(vb.pp("gru"), hidden_dim)?;
        Ok(Self { msg, gru })
    }

    fn forward(&self, h: &Tensor, adj: &Tensor, mask: &Tensor) -> candle_core::Result<Tensor> {
        // adj: [B, N, N] row-normalized, so this averages the neighbors.
        let agg = adj.matmul(h)?;

        let m_in = Tensor::cat(&[h, &agg], D::Minus1)?;
        let m = self.msg.forward(&m_in)?.relu()?;

        let h_new = self.gru.forward(&m, h)?;
        h_new.broadcast_mul(mask)
    }
}

pub struct PointClassifier {
    type_emb: Embedding,
    coord_lin: Linear,
    layers: Vec<MessagePassingLayer>,
    head: Linear,
}

impl PointClassifier {
    pub fn new(vb: VarBuilder, config: &ModelConfig) -> candle_core::Result<Self> {
        let type_emb = nn::embedding(config.type_vocab, config.hidden_dim, vb.pp("type_emb"))?;
        let coord_lin = nn::linear(3, config.hidden_dim, vb.pp("coord_lin"))?;

        let mut layers = Vec::with_capacity(config.message_layers);
        for i in 0..config.message_layers {
            layers.push(MessagePassingLayer::new(
                vb.pp(format!("mp{i}")),
                config.hidden_dim,
            )?);
        }

        let head = nn::linear(config.hidden_dim, 1, vb.pp("head"))?;
        Ok(Self {
            type_emb,
            coord_lin,
            layers,
            head,
        })
    }

    /// Returns one logit per cloud, shape `[B, 1]`.
    pub fn forward(
        &self,
        types: &Tensor,
        coords: &Tensor,
        adj: &Tensor,
        mask: &Tensor,
    ) -> candle_core::Result<Tensor> {
        let h_emb = self.type_emb.forward(types)?;
        let h_coord = self.coord_lin.forward(coords)?;
        let mut h = (h_emb + h_coord)?.broadcast_mul(mask)?;

        for layer in &self.layers {
            h = layer.forward(&h, adj, mask)?;
        }

        let summed = h.sum(1)?; // [B, H]
        let counts = mask.sum(1)?; // [B, 1]
        let pooled = summed.broadcast_div(&(counts + 1e-6)?)?;

        self.head.forward(&pooled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::train::data::{make_batch, PointCloud, TYPE_VOCAB_SIZE};
    use candle_core::{DType, Device};
    use candle_nn::{VarBuilder, VarMap};

    fn tiny_model(device: &Device) -> PointClassifier {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, device);
        let config = ModelConfig {
            type_vocab: TYPE_VOCAB_SIZE,
            hidden_dim: 8,
            message_layers: 2,
        };
        PointClassifier::new(vb, &config).unwrap()
    }

    fn cloud_a() -> PointCloud {
        PointCloud {
            types: vec![3, 5, 19],
            coords: vec![[0.0, 0.0, 0.0], [1.5, 0.0, 0.0], [0.0, 3.0, 0.0]],
            label: 1.0,
        }
    }

    fn cloud_b() -> PointCloud {
        PointCloud {
            types: vec![1, 3, 3, 4, 21],
            coords: vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [2.0, 0.0, 0.0],
                [3.0, 0.0, 0.0],
                [1.5, 3.0, 0.0],
            ],
            label: 0.0,
        }
    }

    #[test]
    fn forward_produces_one_logit_per_cloud() {
        let device = Device::Cpu;
        let model = tiny_model(&device);
        let a = cloud_a();
        let b = cloud_b();
        let batch = make_batch(&[&a, &b], 4.0, &device).unwrap();
        let logits = model
            .forward(&batch.types, &batch.coords, &batch.adj, &batch.mask)
            .unwrap();
        assert_eq!(logits.dims(), &[2, 1]);
        let values: Vec<Vec<f32>> = logits.to_vec2().unwrap();
        assert!(values[0][0].is_finite());
        assert!(values[1][0].is_finite());
    }

    #[test]
    fn padding_does_not_change_a_clouds_score() {
        let device = Device::Cpu;
        let model = tiny_model(&device);
        let a = cloud_a();
        let b = cloud_b();

        let alone = make_batch(&[&a], 4.0, &device).unwrap();
        let padded = make_batch(&[&a, &b], 4.0, &device).unwrap();

        let score_alone: Vec<Vec<f32>> = model
            .forward(&alone.types, &alone.coords, &alone.adj, &alone.mask)
            .unwrap()
            .to_vec2()
            .unwrap();
        let score_padded: Vec<Vec<f32>> = model
            .forward(&padded.types, &padded.coords, &padded.adj, &padded.mask)
            .unwrap()
            .to_vec2()
            .unwrap();

        assert!((score_alone[0][0] - score_padded[0][0]).abs() < 1e-4);
    }
}
