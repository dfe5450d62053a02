//! Squeeze-and-excitation channel gate.
//!
//! Shapes:
//! - Input: `[N, C, H, W]`
//! - Gate: `[N, C, 1, 1]`, each entry in `(0, 1)`
//! - Output: input scaled per channel, same shape as the input

use burn::module::Module;
use burn::nn::pool::{AdaptiveAvgPool2d, AdaptiveAvgPool2dConfig};
use burn::nn::{Linear, LinearConfig};
use burn::tensor::activation::{sigmoid, silu};
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::error::{ModelError, Result};

#[derive(Debug, Clone, Copy)]
pub struct SqueezeExcitationConfig {
    pub channels: usize,
    pub se_ratio: f64,
}

impl SqueezeExcitationConfig {
    pub fn new(channels: usize, se_ratio: f64) -> Self {
        Self { channels, se_ratio }
    }

    /// Bottleneck width, truncated toward zero.
    pub fn hidden(&self) -> usize {
        (self.channels as f64 * self.se_ratio) as usize
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<SqueezeExcitation<B>> {
        if !(self.se_ratio > 0.0 && self.se_ratio <= 1.0) {
            return Err(ModelError::InvalidSeRatio(self.se_ratio));
        }
        let hidden = self.hidden();
        if hidden == 0 {
            return Err(ModelError::ZeroHidden {
                channels: self.channels,
                se_ratio: self.se_ratio,
            });
        }
        Ok(SqueezeExcitation {
            pool: AdaptiveAvgPool2dConfig::new([1, 1]).init(),
            reduce: LinearConfig::new(self.channels, hidden)
                .with_bias(false)
                .init(device),
            expand: LinearConfig::new(hidden, self.channels)
                .with_bias(false)
                .init(device),
        })
    }
}

#[derive(Module, Debug)]
pub struct SqueezeExcitation<B: Backend> {
    pool: AdaptiveAvgPool2d,
    reduce: Linear<B>,
    expand: Linear<B>,
}

impl<B: Backend> SqueezeExcitation<B> {
    /// Per-channel gate in `(0, 1)`, shaped `[N, C, 1, 1]` for broadcasting.
    pub fn gate(&self, input: Tensor<B, 4>) -> Tensor<B, 4> {
        let [batch, channels, _, _] = input.dims();
        let squeezed: Tensor<B, 2> = self.pool.forward(input).reshape([batch, channels]);
        let hidden = silu(self.reduce.forward(squeezed));
        let weights = sigmoid(self.expand.forward(hidden));
        weights.reshape([batch, channels, 1, 1])
    }

    pub fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 4> {
        let gate = self.gate(input.clone());
        input * gate
    }
}
