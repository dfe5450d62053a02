//! Inverted-residual (MBConv) block.
//!
//! `expand (1x1) -> depthwise (kxk) -> squeeze-excitation -> project (1x1)`, with an
//! identity shortcut when the block keeps both resolution and width.

use burn::module::Module;
use burn::tensor::activation::silu;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::conv_norm::{ConvNorm, ConvNormConfig, NormSettings};
use crate::error::Result;
use crate::squeeze_excitation::{SqueezeExcitation, SqueezeExcitationConfig};

#[derive(Debug, Clone, Copy)]
pub struct BottleneckConfig {
    pub inplanes: usize,
    pub planes: usize,
    pub kernel_size: usize,
    pub stride: usize,
    pub expand: usize,
    pub se_ratio: f64,
    pub norm: NormSettings,
}

impl BottleneckConfig {
    pub fn new(inplanes: usize, planes: usize, kernel_size: usize, stride: usize) -> Self {
        Self {
            inplanes,
            planes,
            kernel_size,
            stride,
            expand: 1,
            se_ratio: 0.25,
            norm: NormSettings::default(),
        }
    }

    pub fn with_expand(mut self, expand: usize) -> Self {
        self.expand = expand;
        self
    }

    pub fn with_se_ratio(mut self, se_ratio: f64) -> Self {
        self.se_ratio = se_ratio;
        self
    }

    pub fn with_norm(mut self, norm: NormSettings) -> Self {
        self.norm = norm;
        self
    }

    pub fn expanded(&self) -> usize {
        self.inplanes * self.expand
    }

    pub fn has_residual(&self) -> bool {
        self.stride == 1 && self.inplanes == self.planes
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<Bottleneck<B>> {
        let expanded = self.expanded();
        let expand_conv = (self.expand != 1).then(|| {
            ConvNormConfig::new(self.inplanes, expanded, 1)
                .with_norm(self.norm)
                .init(device)
        });
        let depthwise = ConvNormConfig::new(expanded, expanded, self.kernel_size)
            .with_stride(self.stride)
            .depthwise()
            .with_norm(self.norm)
            .init(device);
        let se = SqueezeExcitationConfig::new(expanded, self.se_ratio).init(device)?;
        let project = ConvNormConfig::new(expanded, self.planes, 1)
            .without_activation()
            .with_norm(self.norm)
            .init(device);

        Ok(Bottleneck {
            expand_conv,
            depthwise,
            se,
            project,
            residual: self.has_residual(),
        })
    }
}

#[derive(Module, Debug)]
pub struct Bottleneck<B: Backend> {
    expand_conv: Option<ConvNorm<B>>,
    depthwise: ConvNorm<B>,
    se: SqueezeExcitation<B>,
    project: ConvNorm<B>,
    residual: bool,
}

impl<B: Backend> Bottleneck<B> {
    pub fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = match &self.expand_conv {
            Some(conv) => conv.forward(input.clone()),
            None => input.clone(),
        };
        let x = self.depthwise.forward(x);
        let x = self.project.forward(self.se.forward(x));
        let x = if self.residual { x + input } else { x };
        silu(x)
    }

    pub fn has_residual(&self) -> bool {
        self.residual
    }

    pub fn has_expansion(&self) -> bool {
        self.expand_conv.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn residual_only_when_shape_is_kept() {
        assert!(BottleneckConfig::new(16, 16, 3, 1).has_residual());
        assert!(!BottleneckConfig::new(16, 16, 3, 2).has_residual());
        assert!(!BottleneckConfig::new(16, 24, 3, 1).has_residual());
    }

    #[test]
    fn expansion_conv_is_skipped_for_unit_ratio() {
        let device = Default::default();
        let block = BottleneckConfig::new(32, 16, 3, 1)
            .init::<TestBackend>(&device)
            .unwrap();
        assert!(!block.has_expansion());
        assert!(!block.has_residual());

        let block = BottleneckConfig::new(16, 16, 3, 1)
            .with_expand(6)
            .init::<TestBackend>(&device)
            .unwrap();
        assert!(block.has_expansion());
        assert!(block.has_residual());
    }

    #[test]
    fn strided_block_halves_resolution() {
        let device = Default::default();
        let block = BottleneckConfig::new(8, 12, 5, 2)
            .with_expand(6)
            .init::<TestBackend>(&device)
            .unwrap();
        let input = Tensor::<TestBackend, 4>::ones([2, 8, 9, 9], &device);
        assert_eq!(block.forward(input).dims(), [2, 12, 5, 5]);
    }

    #[test]
    fn same_shape_block_keeps_shape() {
        let device = Default::default();
        let block = BottleneckConfig::new(8, 8, 3, 1)
            .with_expand(6)
            .init::<TestBackend>(&device)
            .unwrap();
        let input = Tensor::<TestBackend, 4>::ones([1, 8, 6, 6], &device);
        assert_eq!(block.forward(input).dims(), [1, 8, 6, 6]);
    }
}
