use std::path::PathBuf;

use burn::module::Module;
use clap::Parser;
use cli_support::{init_tracing, LogArgs, ModelArgs};
use efficientnet::{DefaultBackend, DefaultDevice, EfficientNet, Variant};
use efficientnet_tools::{architecture_report, RunConfig};

#[derive(Parser, Debug)]
#[command(
    name = "describe",
    about = "Print the scaled stage table for one or all EfficientNet variants"
)]
struct Args {
    /// Run config (TOML); defaults to $EFFICIENTNET_CONFIG or ./efficientnet.toml.
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(flatten)]
    model: ModelArgs,
    /// Describe b0..b7 instead of a single variant (overrides are ignored).
    #[arg(long, default_value_t = false)]
    all: bool,
    /// Build each model to count parameters (slow for the large variants).
    #[arg(long, default_value_t = false)]
    params: bool,
    /// Also write the report here (defaults to report_path from the config).
    #[arg(long)]
    out: Option<PathBuf>,
    #[command(flatten)]
    log: LogArgs,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log);

    let run = RunConfig::load_with(args.config.as_deref()).apply_cli(&args.model);
    let configs = if args.all {
        Variant::ALL
            .iter()
            .map(|v| (v.to_string(), v.config(run.num_classes)))
            .collect::<Vec<_>>()
    } else {
        vec![(run.variant.to_string(), run.model_config())]
    };

    let device = DefaultDevice::default();
    let mut report = String::new();
    for (label, cfg) in configs {
        let arch = cfg.architecture()?;
        let num_params = if args.params {
            let model = EfficientNet::<DefaultBackend>::new(&cfg, &device)?;
            Some(model.num_params())
        } else {
            None
        };
        report.push_str(&architecture_report(&label, &cfg, &arch, num_params));
        report.push('\n');
    }
    print!("{report}");

    if let Some(path) = args.out.or(run.report_path) {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, &report)?;
        tracing::info!(path = %path.display(), "wrote report");
    }
    Ok(())
}
