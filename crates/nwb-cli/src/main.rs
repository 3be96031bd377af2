use anyhow::Context;
use clap::Parser;
use nwb_config::NwbConfig;
use nwb_docdb::DocDbClient;

mod cli;
mod pipeline;
mod source;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("nwb-subject error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let mut config = NwbConfig::load_with_dotenv(cli.config.as_deref())
        .context("failed to load nwb-subject configuration")?;
    cli.apply_overrides(&mut config);

    let store = DocDbClient::new(&config.docdb)?;
    tracing::debug!(base_url = store.base_url(), "metadata store client ready");

    let request = pipeline::RunRequest {
        backend: cli.backend().map(str::to_string),
        asset_name: cli.asset_name(),
    };
    pipeline::run(&request, &config, &store).await?;
    Ok(())
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("NWB_SUBJECT_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
