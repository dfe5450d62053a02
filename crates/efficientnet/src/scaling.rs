//! Compound scaling of the EfficientNet base table.
//!
//! The B0 network is described by a fixed per-stage table. Larger variants multiply
//! every channel count by a width coefficient and every repeat count by a depth
//! coefficient, rounding to the nearest integer (ties to even).

use crate::error::{ModelError, Result};

/// Input side length the coefficients are defined against.
pub const BASE_RESOLUTION: usize = 224;

/// Stem output width, the seven stage output widths, then the head width.
pub const BASE_CHANNELS: [usize; 9] = [32, 16, 24, 40, 80, 112, 192, 320, 1280];
pub const BASE_REPEATS: [usize; 7] = [1, 2, 2, 3, 3, 4, 1];
pub const KERNEL_SIZES: [usize; 7] = [3, 3, 5, 3, 5, 5, 3];
pub const STRIDES: [usize; 7] = [1, 2, 2, 2, 1, 2, 1];
pub const EXPANSIONS: [usize; 7] = [1, 6, 6, 6, 6, 6, 6];

pub const STEM_KERNEL: usize = 3;
pub const STEM_STRIDE: usize = 2;

/// Scale a channel count by `width_coef`, rounding half to even.
pub fn scale_channels(channels: usize, width_coef: f64) -> usize {
    round_half_even(channels as f64 * width_coef)
}

/// Scale a repeat count by `depth_coef`, rounding half to even.
pub fn scale_repeats(repeats: usize, depth_coef: f64) -> usize {
    round_half_even(repeats as f64 * depth_coef)
}

fn round_half_even(value: f64) -> usize {
    value.round_ties_even().max(0.0) as usize
}

/// `floor(side * scale)`.
///
/// Coefficients are stored as `resolution / 224`, so the product is nudged before
/// flooring to land back on the published resolution.
pub fn scaled_side(side: usize, scale: f64) -> usize {
    (side as f64 * scale + 1e-6).floor() as usize
}

/// Side length of the image the stem actually sees after the optional upsample.
pub fn input_resolution(scale: f64, base: usize) -> usize {
    if scale > 1.0 {
        scaled_side(base, scale)
    } else {
        base
    }
}

pub(crate) fn check_coefficient(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ModelError::InvalidCoefficient { name, value })
    }
}

/// One row of the scaled table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageSpec {
    pub in_channels: usize,
    pub out_channels: usize,
    pub repeats: usize,
    pub kernel_size: usize,
    pub stride: usize,
    pub expand: usize,
}

impl StageSpec {
    pub fn expanded_channels(&self) -> usize {
        self.in_channels * self.expand
    }
}

/// Stem, stage and head widths after applying width/depth coefficients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaledArchitecture {
    pub stem_channels: usize,
    pub stages: Vec<StageSpec>,
    pub head_channels: usize,
}

impl ScaledArchitecture {
    pub fn from_coefficients(width_coef: f64, depth_coef: f64) -> Result<Self> {
        check_coefficient("width_coef", width_coef)?;
        check_coefficient("depth_coef", depth_coef)?;

        let channels: Vec<usize> = BASE_CHANNELS
            .iter()
            .map(|&c| scale_channels(c, width_coef))
            .collect();
        if channels[0] == 0 {
            return Err(ModelError::ZeroChannels {
                stage: "stem".into(),
            });
        }
        if channels[8] == 0 {
            return Err(ModelError::ZeroChannels {
                stage: "head".into(),
            });
        }

        let mut stages = Vec::with_capacity(BASE_REPEATS.len());
        for i in 0..BASE_REPEATS.len() {
            let stage = i + 1;
            let out_channels = channels[stage];
            if out_channels == 0 {
                return Err(ModelError::ZeroChannels {
                    stage: format!("stage {stage}"),
                });
            }
            let repeats = scale_repeats(BASE_REPEATS[i], depth_coef);
            if repeats == 0 {
                return Err(ModelError::EmptyStage { stage });
            }
            stages.push(StageSpec {
                in_channels: channels[i],
                out_channels,
                repeats,
                kernel_size: KERNEL_SIZES[i],
                stride: STRIDES[i],
                expand: EXPANSIONS[i],
            });
        }

        Ok(Self {
            stem_channels: channels[0],
            stages,
            head_channels: channels[8],
        })
    }

    pub fn total_blocks(&self) -> usize {
        self.stages.iter().map(|s| s.repeats).sum()
    }

    /// Product of the stem stride and every stage stride.
    pub fn total_stride(&self) -> usize {
        self.stages
            .iter()
            .fold(STEM_STRIDE, |acc, stage| acc * stage.stride)
    }

    /// Output widths from stem to head, in the same order as [`BASE_CHANNELS`].
    pub fn channels(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(BASE_CHANNELS.len());
        out.push(self.stem_channels);
        out.extend(self.stages.iter().map(|s| s.out_channels));
        out.push(self.head_channels);
        out
    }

    pub fn repeats(&self) -> Vec<usize> {
        self.stages.iter().map(|s| s.repeats).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_coefficients_reproduce_base_table() {
        let arch = ScaledArchitecture::from_coefficients(1.0, 1.0).unwrap();
        assert_eq!(arch.channels(), BASE_CHANNELS.to_vec());
        assert_eq!(arch.repeats(), BASE_REPEATS.to_vec());
        assert_eq!(arch.total_blocks(), 16);
        assert_eq!(arch.total_stride(), 32);
    }

    #[test]
    fn b3_coefficients() {
        let arch = ScaledArchitecture::from_coefficients(1.2, 1.4).unwrap();
        assert_eq!(
            arch.channels(),
            vec![38, 19, 29, 48, 96, 134, 230, 384, 1536]
        );
        assert_eq!(arch.repeats(), vec![1, 3, 3, 4, 4, 6, 1]);
    }

    #[test]
    fn stages_chain_widths() {
        let arch = ScaledArchitecture::from_coefficients(1.4, 1.8).unwrap();
        assert_eq!(arch.stages[0].in_channels, arch.stem_channels);
        for pair in arch.stages.windows(2) {
            assert_eq!(pair[0].out_channels, pair[1].in_channels);
        }
    }

    #[test]
    fn ties_round_to_even() {
        assert_eq!(scale_channels(5, 0.5), 2);
        assert_eq!(scale_channels(7, 0.5), 4);
        assert_eq!(scale_repeats(3, 0.5), 2);
        assert_eq!(scale_repeats(1, 0.5), 0);
    }

    #[test]
    fn shallow_depth_empties_a_stage() {
        let err = ScaledArchitecture::from_coefficients(1.0, 0.4).unwrap_err();
        assert_eq!(err, ModelError::EmptyStage { stage: 1 });
    }

    #[test]
    fn rejects_bad_coefficients() {
        assert!(matches!(
            ScaledArchitecture::from_coefficients(0.0, 1.0),
            Err(ModelError::InvalidCoefficient {
                name: "width_coef",
                ..
            })
        ));
        assert!(matches!(
            ScaledArchitecture::from_coefficients(1.0, f64::NAN),
            Err(ModelError::InvalidCoefficient {
                name: "depth_coef",
                ..
            })
        ));
    }

    #[test]
    fn resolution_only_grows() {
        assert_eq!(input_resolution(1.0, BASE_RESOLUTION), 224);
        assert_eq!(input_resolution(0.5, BASE_RESOLUTION), 224);
        assert_eq!(input_resolution(300.0 / 224.0, BASE_RESOLUTION), 300);
        assert_eq!(input_resolution(600.0 / 224.0, BASE_RESOLUTION), 600);
        assert_eq!(input_resolution(1.3, BASE_RESOLUTION), 291);
    }

    #[test]
    fn scaled_side_floors_the_product() {
        assert_eq!(scaled_side(100, 1.3), 130);
        assert_eq!(scaled_side(1000, 1.001), 1001);
        assert_eq!(scaled_side(7, 1.5), 10);
    }
}
