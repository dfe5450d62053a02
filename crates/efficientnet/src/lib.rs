//! EfficientNet (B0-B7) image classifiers built from Burn layer primitives.
//!
//! The crate holds the architecture only:
//! - [`scaling`]: the B0 base table and the compound-scaling arithmetic.
//! - [`Variant`]: width/depth/resolution/dropout coefficients for B0-B7.
//! - [`SqueezeExcitation`], [`Bottleneck`], [`MbConvStage`]: the building blocks.
//! - [`EfficientNet`]: stem, seven MBConv stages, head and classifier.
//!
//! Models are generic over Burn backends; [`DefaultBackend`] picks NdArray unless the
//! `backend-wgpu` feature is enabled.

#![recursion_limit = "256"]

pub mod backend;
pub mod bottleneck;
pub mod conv_norm;
pub mod error;
pub mod mbconv;
pub mod model;
pub mod presets;
pub mod scaling;
pub mod squeeze_excitation;
pub mod variant;

pub use backend::{backend_name, DefaultBackend, DefaultDevice};
pub use bottleneck::{Bottleneck, BottleneckConfig};
pub use conv_norm::{ConvNorm, ConvNormConfig, NormSettings};
pub use error::{ModelError, Result};
pub use mbconv::{MbConvStage, MbConvStageConfig};
pub use model::{EfficientNet, EfficientNetConfig, ResolutionUpsample, INPUT_CHANNELS};
pub use presets::*;
pub use scaling::{ScaledArchitecture, StageSpec, BASE_RESOLUTION};
pub use squeeze_excitation::{SqueezeExcitation, SqueezeExcitationConfig};
pub use variant::{Coefficients, Variant, DEFAULT_NUM_CLASSES, DEFAULT_SE_RATIO};

pub mod prelude {
    pub use super::{
        build_variant, efficientnet_b0, efficientnet_b1, efficientnet_b2, efficientnet_b3,
        efficientnet_b4, efficientnet_b5, efficientnet_b6, efficientnet_b7, DefaultBackend,
        EfficientNet, EfficientNetConfig, ModelError, Variant,
    };
}
