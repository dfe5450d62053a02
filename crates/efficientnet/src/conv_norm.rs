//! Bias-free `Conv2d + BatchNorm` pair shared by every part of the network.

use burn::module::Module;
use burn::nn::conv::{Conv2d, Conv2dConfig};
use burn::nn::{BatchNorm, BatchNormConfig, Initializer, PaddingConfig2d};
use burn::tensor::activation::silu;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

/// Batch-norm settings used throughout the network.
///
/// `momentum` follows Burn's convention, where the running statistics move by
/// `momentum` toward each batch. The default of 0.01 corresponds to a Keras-style
/// decay of 0.99; passing 0.99 here would instead make the running statistics
/// track almost only the latest batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormSettings {
    pub epsilon: f64,
    pub momentum: f64,
}

impl Default for NormSettings {
    fn default() -> Self {
        Self {
            epsilon: 1e-3,
            momentum: 0.01,
        }
    }
}

/// Kaiming-normal in fan-out mode with the ReLU gain.
pub fn conv_initializer() -> Initializer {
    Initializer::KaimingNormal {
        gain: std::f64::consts::SQRT_2,
        fan_out_only: true,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ConvNormConfig {
    pub in_channels: usize,
    pub out_channels: usize,
    pub kernel_size: usize,
    pub stride: usize,
    pub groups: usize,
    /// Apply swish after the norm.
    pub activate: bool,
    pub norm: NormSettings,
}

impl ConvNormConfig {
    pub fn new(in_channels: usize, out_channels: usize, kernel_size: usize) -> Self {
        Self {
            in_channels,
            out_channels,
            kernel_size,
            stride: 1,
            groups: 1,
            activate: true,
            norm: NormSettings::default(),
        }
    }

    pub fn with_stride(mut self, stride: usize) -> Self {
        self.stride = stride;
        self
    }

    pub fn depthwise(mut self) -> Self {
        self.groups = self.in_channels;
        self
    }

    pub fn without_activation(mut self) -> Self {
        self.activate = false;
        self
    }

    pub fn with_norm(mut self, norm: NormSettings) -> Self {
        self.norm = norm;
        self
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> ConvNorm<B> {
        let padding = self.kernel_size / 2;
        let conv = Conv2dConfig::new(
            [self.in_channels, self.out_channels],
            [self.kernel_size, self.kernel_size],
        )
        .with_stride([self.stride, self.stride])
        .with_padding(PaddingConfig2d::Explicit(padding, padding))
        .with_groups(self.groups)
        .with_bias(false)
        .with_initializer(conv_initializer())
        .init(device);
        let bn = BatchNormConfig::new(self.out_channels)
            .with_epsilon(self.norm.epsilon)
            .with_momentum(self.norm.momentum)
            .init(device);
        ConvNorm {
            conv,
            bn,
            activate: self.activate,
            out_channels: self.out_channels,
        }
    }
}

#[derive(Module, Debug)]
pub struct ConvNorm<B: Backend> {
    conv: Conv2d<B>,
    bn: BatchNorm<B>,
    activate: bool,
    out_channels: usize,
}

impl<B: Backend> ConvNorm<B> {
    pub fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.bn.forward(self.conv.forward(input));
        if self.activate {
            silu(x)
        } else {
            x
        }
    }

    pub fn out_channels(&self) -> usize {
        self.out_channels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EfficientNetConfig;

    #[test]
    fn default_norm_uses_burn_momentum_convention() {
        let norm = NormSettings::default();
        assert_eq!(norm.epsilon, 1e-3);
        assert_eq!(norm.momentum, 0.01);
        assert_eq!(EfficientNetConfig::default().norm(), norm);
    }
}
