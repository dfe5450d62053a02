//! The eight published EfficientNet sizes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::model::EfficientNetConfig;
use crate::scaling::BASE_RESOLUTION;

pub const DEFAULT_NUM_CLASSES: usize = 1000;
pub const DEFAULT_SE_RATIO: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    B0,
    B1,
    B2,
    B3,
    B4,
    B5,
    B6,
    B7,
}

/// Width, depth, resolution and dropout for one variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficients {
    pub width: f64,
    pub depth: f64,
    pub resolution: usize,
    pub dropout: f64,
}

impl Coefficients {
    /// Resolution expressed as an upsample factor over the 224px base.
    pub fn scale(&self) -> f64 {
        self.resolution as f64 / BASE_RESOLUTION as f64
    }
}

impl Variant {
    pub const ALL: [Variant; 8] = [
        Variant::B0,
        Variant::B1,
        Variant::B2,
        Variant::B3,
        Variant::B4,
        Variant::B5,
        Variant::B6,
        Variant::B7,
    ];

    pub fn coefficients(self) -> Coefficients {
        let (width, depth, resolution, dropout) = match self {
            Variant::B0 => (1.0, 1.0, 224, 0.2),
            Variant::B1 => (1.0, 1.1, 240, 0.2),
            Variant::B2 => (1.1, 1.2, 260, 0.3),
            Variant::B3 => (1.2, 1.4, 300, 0.3),
            Variant::B4 => (1.4, 1.8, 380, 0.4),
            Variant::B5 => (1.6, 2.2, 456, 0.4),
            Variant::B6 => (1.8, 2.6, 528, 0.5),
            Variant::B7 => (2.0, 3.1, 600, 0.5),
        };
        Coefficients {
            width,
            depth,
            resolution,
            dropout,
        }
    }

    pub fn config(self, num_classes: usize) -> EfficientNetConfig {
        let coef = self.coefficients();
        EfficientNetConfig {
            num_classes,
            width_coef: coef.width,
            depth_coef: coef.depth,
            scale: coef.scale(),
            dropout: coef.dropout,
            se_ratio: DEFAULT_SE_RATIO,
            ..EfficientNetConfig::default()
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Variant::B0 => "b0",
            Variant::B1 => "b1",
            Variant::B2 => "b2",
            Variant::B3 => "b3",
            Variant::B4 => "b4",
            Variant::B5 => "b5",
            Variant::B6 => "b6",
            Variant::B7 => "b7",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "efficientnet-{}", self.name())
    }
}

impl FromStr for Variant {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let short = lower
            .strip_prefix("efficientnet-")
            .or_else(|| lower.strip_prefix("efficientnet_"))
            .unwrap_or(&lower);
        Variant::ALL
            .into_iter()
            .find(|v| v.name() == short)
            .ok_or_else(|| ModelError::UnknownVariant(s.to_string()))
    }
}
