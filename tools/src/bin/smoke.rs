use std::path::PathBuf;

use burn::tensor::Tensor;
use clap::Parser;
use cli_support::{init_tracing, LogArgs, ModelArgs};
use efficientnet::{backend_name, DefaultBackend, DefaultDevice, EfficientNet};
use efficientnet_tools::RunConfig;

#[derive(Parser, Debug)]
#[command(
    name = "smoke",
    about = "Build an EfficientNet and push a synthetic batch through it"
)]
struct Args {
    /// Run config (TOML); defaults to $EFFICIENTNET_CONFIG or ./efficientnet.toml.
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(flatten)]
    model: ModelArgs,
    /// Synthetic batch size.
    #[arg(long)]
    batch_size: Option<usize>,
    /// Square input side length before any resolution upsample.
    #[arg(long)]
    image_size: Option<usize>,
    #[command(flatten)]
    log: LogArgs,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log);

    let mut run = RunConfig::load_with(args.config.as_deref()).apply_cli(&args.model);
    if let Some(batch) = args.batch_size {
        run.batch_size = batch;
    }
    if let Some(size) = args.image_size {
        run.image_size = size;
    }

    let device = DefaultDevice::default();
    let cfg = run.model_config();
    tracing::info!(
        variant = %run.variant,
        backend = backend_name(),
        batch = run.batch_size,
        image_size = run.image_size,
        "building model"
    );
    let model = EfficientNet::<DefaultBackend>::new(&cfg, &device)?;

    let input = Tensor::<DefaultBackend, 4>::zeros(
        [run.batch_size, 3, run.image_size, run.image_size],
        &device,
    );
    let logits = model.forward(input);
    let dims = logits.dims();
    tracing::info!(?dims, "forward pass complete");
    println!("{dims:?}");
    Ok(())
}
