//! The EfficientNet network and its configuration.
//!
//! Shapes:
//! - Input images: `[N, 3, H, W]`
//! - Features (before pooling): `[N, head_channels, H' / 32, W' / 32]` where `H'`/`W'`
//!   are the sizes after the optional resolution upsample
//! - Logits: `[N, num_classes]`

use burn::module::Module;
use burn::nn::interpolate::{Interpolate2dConfig, InterpolateMode};
use burn::nn::pool::{AdaptiveAvgPool2d, AdaptiveAvgPool2dConfig};
use burn::nn::{Dropout, DropoutConfig, Linear, LinearConfig};
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use serde::{Deserialize, Serialize};

use crate::conv_norm::{ConvNorm, ConvNormConfig, NormSettings};
use crate::error::{ModelError, Result};
use crate::mbconv::{MbConvStage, MbConvStageConfig};
use crate::scaling::{
    check_coefficient, input_resolution, scaled_side, ScaledArchitecture, BASE_RESOLUTION,
    STEM_KERNEL, STEM_STRIDE,
};
use crate::variant::{DEFAULT_NUM_CLASSES, DEFAULT_SE_RATIO};

/// Number of RGB input channels the stem expects.
pub const INPUT_CHANNELS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EfficientNetConfig {
    pub num_classes: usize,
    pub width_coef: f64,
    pub depth_coef: f64,
    /// Input upsample factor; applied only when greater than 1.0.
    pub scale: f64,
    pub dropout: f64,
    pub se_ratio: f64,
    pub bn_epsilon: f64,
    pub bn_momentum: f64,
}

impl Default for EfficientNetConfig {
    fn default() -> Self {
        let norm = NormSettings::default();
        Self {
            num_classes: DEFAULT_NUM_CLASSES,
            width_coef: 1.0,
            depth_coef: 1.0,
            scale: 1.0,
            dropout: 0.2,
            se_ratio: DEFAULT_SE_RATIO,
            bn_epsilon: norm.epsilon,
            bn_momentum: norm.momentum,
        }
    }
}

impl EfficientNetConfig {
    pub fn with_num_classes(mut self, num_classes: usize) -> Self {
        self.num_classes = num_classes;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_classes == 0 {
            return Err(ModelError::ZeroClasses);
        }
        check_coefficient("scale", self.scale)?;
        if !(0.0..1.0).contains(&self.dropout) {
            return Err(ModelError::InvalidDropout(self.dropout));
        }
        if !(self.se_ratio > 0.0 && self.se_ratio <= 1.0) {
            return Err(ModelError::InvalidSeRatio(self.se_ratio));
        }
        check_coefficient("bn_epsilon", self.bn_epsilon)?;
        check_coefficient("bn_momentum", self.bn_momentum)?;
        self.architecture().map(|_| ())
    }

    pub fn architecture(&self) -> Result<ScaledArchitecture> {
        ScaledArchitecture::from_coefficients(self.width_coef, self.depth_coef)
    }

    /// Side length a 224px input reaches the stem at.
    pub fn input_resolution(&self) -> usize {
        input_resolution(self.scale, BASE_RESOLUTION)
    }

    pub fn norm(&self) -> NormSettings {
        NormSettings {
            epsilon: self.bn_epsilon,
            momentum: self.bn_momentum,
        }
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<EfficientNet<B>> {
        self.validate()?;
        let arch = self.architecture()?;
        let norm = self.norm();

        let upsample = (self.scale > 1.0).then(|| ResolutionUpsample { scale: self.scale });

        let stem = ConvNormConfig::new(INPUT_CHANNELS, arch.stem_channels, STEM_KERNEL)
            .with_stride(STEM_STRIDE)
            .with_norm(norm)
            .init(device);

        let stages = arch
            .stages
            .iter()
            .enumerate()
            .map(|(i, spec)| {
                MbConvStageConfig::new(i + 1, *spec, self.se_ratio)
                    .with_norm(norm)
                    .init(device)
            })
            .collect::<Result<Vec<_>>>()?;

        let last_stage = arch.stages.last().map_or(arch.stem_channels, |s| s.out_channels);
        let head = ConvNormConfig::new(last_stage, arch.head_channels, 1)
            .with_norm(norm)
            .init(device);
        let classifier = LinearConfig::new(arch.head_channels, self.num_classes).init(device);

        tracing::debug!(
            width = self.width_coef,
            depth = self.depth_coef,
            resolution = self.input_resolution(),
            blocks = arch.total_blocks(),
            head_channels = arch.head_channels,
            num_classes = self.num_classes,
            "built efficientnet"
        );

        Ok(EfficientNet {
            upsample,
            stem,
            stages,
            head,
            pool: AdaptiveAvgPool2dConfig::new([1, 1]).init(),
            dropout: DropoutConfig::new(self.dropout).init(),
            classifier,
            head_channels: arch.head_channels,
            num_classes: self.num_classes,
        })
    }
}

/// Bilinear resize by `scale`, floored per spatial dimension.
#[derive(Module, Debug, Clone)]
pub struct ResolutionUpsample {
    scale: f64,
}

impl ResolutionUpsample {
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn output_size(&self, height: usize, width: usize) -> [usize; 2] {
        [scaled_side(height, self.scale), scaled_side(width, self.scale)]
    }

    pub fn forward<B: Backend>(&self, input: Tensor<B, 4>) -> Tensor<B, 4> {
        let [_, _, height, width] = input.dims();
        Interpolate2dConfig::new()
            .with_output_size(Some(self.output_size(height, width)))
            .with_mode(InterpolateMode::Linear)
            .init()
            .forward(input)
    }
}

#[derive(Module, Debug)]
pub struct EfficientNet<B: Backend> {
    upsample: Option<ResolutionUpsample>,
    stem: ConvNorm<B>,
    stages: Vec<MbConvStage<B>>,
    head: ConvNorm<B>,
    pool: AdaptiveAvgPool2d,
    dropout: Dropout,
    classifier: Linear<B>,
    head_channels: usize,
    num_classes: usize,
}

impl<B: Backend> EfficientNet<B> {
    pub fn new(config: &EfficientNetConfig, device: &B::Device) -> Result<Self> {
        config.init(device)
    }

    /// Feature map produced by the head convolution, before pooling.
    pub fn features(&self, input: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = match &self.upsample {
            Some(upsample) => upsample.forward(input),
            None => input,
        };
        let x = self.stem.forward(x);
        let x = self.stages.iter().fold(x, |x, stage| stage.forward(x));
        self.head.forward(x)
    }

    pub fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 2> {
        let features = self.features(input);
        let [batch, channels, _, _] = features.dims();
        let pooled: Tensor<B, 2> = self.pool.forward(features).reshape([batch, channels]);
        self.classifier.forward(self.dropout.forward(pooled))
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    pub fn head_channels(&self) -> usize {
        self.head_channels
    }

    pub fn stage_depths(&self) -> Vec<usize> {
        self.stages.iter().map(MbConvStage::len).collect()
    }

    pub fn upsample(&self) -> Option<&ResolutionUpsample> {
        self.upsample.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_b0() {
        let cfg = EfficientNetConfig::default();
        assert_eq!(cfg, crate::Variant::B0.config(DEFAULT_NUM_CLASSES));
        cfg.validate().unwrap();
        assert_eq!(cfg.input_resolution(), 224);
    }

    #[test]
    fn validation_errors() {
        let base = EfficientNetConfig::default();
        assert_eq!(
            base.clone().with_num_classes(0).validate(),
            Err(ModelError::ZeroClasses)
        );
        let cfg = EfficientNetConfig {
            dropout: 1.0,
            ..base.clone()
        };
        assert_eq!(cfg.validate(), Err(ModelError::InvalidDropout(1.0)));
        let cfg = EfficientNetConfig {
            se_ratio: 0.0,
            ..base.clone()
        };
        assert_eq!(cfg.validate(), Err(ModelError::InvalidSeRatio(0.0)));
        let cfg = EfficientNetConfig {
            scale: -1.0,
            ..base.clone()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ModelError::InvalidCoefficient { name: "scale", .. })
        ));
        let cfg = EfficientNetConfig {
            depth_coef: 0.3,
            ..base
        };
        assert!(matches!(cfg.validate(), Err(ModelError::EmptyStage { .. })));
    }

    #[test]
    fn upsample_floors_each_dimension() {
        let up = ResolutionUpsample {
            scale: 300.0 / 224.0,
        };
        assert_eq!(up.output_size(224, 224), [300, 300]);
        assert_eq!(up.output_size(32, 64), [42, 85]);
    }

    #[test]
    fn upsample_applies_the_configured_scale_directly() {
        let cfg = EfficientNetConfig {
            scale: 1.3,
            ..EfficientNetConfig::default()
        };
        let up = ResolutionUpsample { scale: cfg.scale };
        assert_eq!(up.output_size(100, 100), [130, 130]);
        assert_eq!(up.output_size(224, 10), [291, 13]);

        let up = ResolutionUpsample { scale: 1.001 };
        assert_eq!(up.output_size(1000, 1000), [1001, 1001]);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let cfg: EfficientNetConfig =
            toml::from_str("num_classes = 10\nwidth_coef = 1.1").unwrap();
        assert_eq!(cfg.num_classes, 10);
        assert_eq!(cfg.width_coef, 1.1);
        assert_eq!(cfg.depth_coef, 1.0);
        assert_eq!(cfg.se_ratio, 0.25);
    }
}
