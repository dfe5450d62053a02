//! A stage of repeated bottleneck blocks sharing kernel size and expansion.

use burn::module::Module;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::bottleneck::{Bottleneck, BottleneckConfig};
use crate::conv_norm::NormSettings;
use crate::error::{ModelError, Result};
use crate::scaling::StageSpec;

#[derive(Debug, Clone, Copy)]
pub struct MbConvStageConfig {
    pub index: usize,
    pub spec: StageSpec,
    pub se_ratio: f64,
    pub norm: NormSettings,
}

impl MbConvStageConfig {
    pub fn new(index: usize, spec: StageSpec, se_ratio: f64) -> Self {
        Self {
            index,
            spec,
            se_ratio,
            norm: NormSettings::default(),
        }
    }

    pub fn with_norm(mut self, norm: NormSettings) -> Self {
        self.norm = norm;
        self
    }

    /// Block configs in order: the first carries the stage stride and width change.
    pub fn block_configs(&self) -> Vec<BottleneckConfig> {
        let spec = self.spec;
        (0..spec.repeats)
            .map(|i| {
                let (inplanes, stride) = if i == 0 {
                    (spec.in_channels, spec.stride)
                } else {
                    (spec.out_channels, 1)
                };
                BottleneckConfig::new(inplanes, spec.out_channels, spec.kernel_size, stride)
                    .with_expand(spec.expand)
                    .with_se_ratio(self.se_ratio)
                    .with_norm(self.norm)
            })
            .collect()
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<MbConvStage<B>> {
        if self.spec.repeats == 0 {
            return Err(ModelError::EmptyStage { stage: self.index });
        }
        let blocks = self
            .block_configs()
            .iter()
            .map(|cfg| cfg.init(device))
            .collect::<Result<Vec<_>>>()?;
        tracing::debug!(
            stage = self.index,
            in_channels = self.spec.in_channels,
            out_channels = self.spec.out_channels,
            repeats = self.spec.repeats,
            kernel = self.spec.kernel_size,
            stride = self.spec.stride,
            "built mbconv stage"
        );
        Ok(MbConvStage { blocks })
    }
}

#[derive(Module, Debug)]
pub struct MbConvStage<B: Backend> {
    blocks: Vec<Bottleneck<B>>,
}

impl<B: Backend> MbConvStage<B> {
    pub fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 4> {
        self.blocks
            .iter()
            .fold(input, |x, block| block.forward(x))
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn blocks(&self) -> &[Bottleneck<B>] {
        &self.blocks
    }
}
