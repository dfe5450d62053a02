use std::path::{Path, PathBuf};

use cli_support::ModelArgs;
use efficientnet::{EfficientNetConfig, Variant, BASE_RESOLUTION, DEFAULT_NUM_CLASSES};
use serde::Deserialize;

const DEFAULT_CONFIG_NAME: &str = "efficientnet.toml";
const CONFIG_ENV: &str = "EFFICIENTNET_CONFIG";
const DEFAULT_BATCH_SIZE: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub variant: Variant,
    pub num_classes: usize,
    pub batch_size: usize,
    pub image_size: usize,
    pub overrides: ModelOverrides,
    pub report_path: Option<PathBuf>,
}

/// Per-field replacements for the coefficients a variant would otherwise supply.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ModelOverrides {
    pub width_coef: Option<f64>,
    pub depth_coef: Option<f64>,
    pub scale: Option<f64>,
    pub dropout: Option<f64>,
    pub se_ratio: Option<f64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            variant: Variant::B3,
            num_classes: DEFAULT_NUM_CLASSES,
            batch_size: DEFAULT_BATCH_SIZE,
            image_size: BASE_RESOLUTION,
            overrides: ModelOverrides::default(),
            report_path: None,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct RunConfigFile {
    variant: Option<String>,
    num_classes: Option<usize>,
    batch_size: Option<usize>,
    image_size: Option<usize>,
    report_path: Option<String>,
    overrides: Option<ModelOverrides>,
}

impl RunConfig {
    /// Read `$EFFICIENTNET_CONFIG`, else `efficientnet.toml` in the working directory,
    /// else fall back to defaults.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::load_or_default(Path::new(&path));
        }
        Self::load_or_default(Path::new(DEFAULT_CONFIG_NAME))
    }

    /// Like [`RunConfig::load`] but an explicit path takes precedence.
    pub fn load_with(path: Option<&Path>) -> Self {
        match path {
            Some(path) => Self::load_or_default(path),
            None => Self::load(),
        }
    }

    fn load_or_default(path: &Path) -> Self {
        let cfg = match Self::from_path(path) {
            Ok(Some(cfg)) => {
                tracing::debug!(path = %path.display(), "loaded run config");
                cfg
            }
            Ok(None) => Self::default(),
            Err(err) => {
                tracing::warn!(path = %path.display(), "ignoring run config: {err:#}");
                Self::default()
            }
        };
        cfg.warn_if_invalid();
        cfg
    }

    /// `Ok(None)` when the file does not exist.
    pub fn from_path(path: &Path) -> anyhow::Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw).map(Some)
    }

    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let file: RunConfigFile = toml::from_str(raw)?;
        Self::from_file(file)
    }

    fn from_file(file: RunConfigFile) -> anyhow::Result<Self> {
        let defaults = Self::default();
        let variant = match file.variant {
            Some(raw) => raw.parse::<Variant>()?,
            None => defaults.variant,
        };
        Ok(RunConfig {
            variant,
            num_classes: file.num_classes.unwrap_or(defaults.num_classes),
            batch_size: file.batch_size.unwrap_or(defaults.batch_size),
            image_size: file.image_size.unwrap_or(defaults.image_size),
            overrides: file.overrides.unwrap_or_default(),
            report_path: file
                .report_path
                .filter(|p| !p.trim().is_empty())
                .map(|p| expand_path(&p)),
        })
    }

    /// Command-line values win over file values.
    pub fn apply_cli(mut self, args: &ModelArgs) -> Self {
        if let Some(variant) = args.variant {
            self.variant = variant;
        }
        if let Some(num_classes) = args.num_classes {
            self.num_classes = num_classes;
        }
        self
    }

    pub fn model_config(&self) -> EfficientNetConfig {
        let mut cfg = self.variant.config(self.num_classes);
        let o = &self.overrides;
        if let Some(v) = o.width_coef {
            cfg.width_coef = v;
        }
        if let Some(v) = o.depth_coef {
            cfg.depth_coef = v;
        }
        if let Some(v) = o.scale {
            cfg.scale = v;
        }
        if let Some(v) = o.dropout {
            cfg.dropout = v;
        }
        if let Some(v) = o.se_ratio {
            cfg.se_ratio = v;
        }
        cfg
    }

    fn warn_if_invalid(&self) {
        if self.batch_size == 0 {
            tracing::warn!("run config: batch_size is 0; smoke runs will produce empty batches");
        }
        if self.image_size < 32 {
            tracing::warn!(
                image_size = self.image_size,
                "run config: image_size below 32 collapses the last stages to 1x1"
            );
        }
        if let Err(err) = self.model_config().validate() {
            tracing::warn!("run config: model settings are invalid: {err}");
        }
    }
}

fn expand_path(raw: &str) -> PathBuf {
    let mut out = raw.to_string();
    if let Some(stripped) = out.strip_prefix('~') {
        if let Ok(home) = std::env::var("HOME") {
            out = format!("{home}{stripped}");
        }
    }
    PathBuf::from(expand_env(&out))
}

/// Replace `${VAR}` with its value; unknown variables are left as written.
fn expand_env(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let key = &after[..end];
                match std::env::var(key) {
                    Ok(val) => out.push_str(&val),
                    Err(_) => out.push_str(&rest[start..start + end + 3]),
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
