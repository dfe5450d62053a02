//! Construction errors for the EfficientNet family.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ModelError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("coefficient {name} must be finite and positive, got {value}")]
    InvalidCoefficient { name: &'static str, value: f64 },
    #[error("stage {stage} scaled to zero repeats")]
    EmptyStage { stage: usize },
    #[error("{stage} scaled to zero channels")]
    ZeroChannels { stage: String },
    #[error("dropout probability out of range [0, 1): {0}")]
    InvalidDropout(f64),
    #[error("squeeze-excitation ratio out of range (0, 1]: {0}")]
    InvalidSeRatio(f64),
    #[error("squeeze-excitation hidden width is zero for {channels} channels at ratio {se_ratio}")]
    ZeroHidden { channels: usize, se_ratio: f64 },
    #[error("num_classes must be at least 1")]
    ZeroClasses,
    #[error("unknown EfficientNet variant {0:?} (expected b0..b7)")]
    UnknownVariant(String),
}
