use clap::Args;
use efficientnet::Variant;
use tracing_subscriber::EnvFilter;

/// Model selection shared by every binary.
///
/// Fields are optional so a run config file can supply them; see
/// `efficientnet_tools::RunConfig::apply_cli`.
#[derive(Debug, Clone, Args)]
pub struct ModelArgs {
    /// EfficientNet size (b0..b7).
    #[arg(long)]
    pub variant: Option<Variant>,
    /// Number of output classes.
    #[arg(long)]
    pub num_classes: Option<usize>,
}

#[derive(Debug, Clone, Args)]
pub struct LogArgs {
    /// Log filter (e.g. "info", "efficientnet=debug"); RUST_LOG wins when set.
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// Install the fmt subscriber. Safe to call more than once; later calls are ignored.
pub fn init_tracing(args: &LogArgs) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
