mod cli;

use clap::Parser;
use cli::{Cli, Commands, RunArgs};
use pdfharvest::Harvester;
use pdfharvest::config::Config;
use pdfharvest::observability;
use pdfharvest::worker::CancelFlag;
use tracing::info;

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[tokio::main]
async fn main() -> Result<(), AnyError> {
    observability::init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => run(args).await?,
    }

    Ok(())
}

async fn run(args: RunArgs) -> Result<(), AnyError> {
    let mut config = Config::load_layers(args.config.clone())?;
    args.apply(&mut config);
    config.validate()?;

    let harvester = Harvester::with_http(config)?;
    tokio::spawn(cancel_on_signal(harvester.cancel_flag()));

    let summary = harvester.run().await?;
    if summary.skipped {
        info!("Nothing to download");
    }

    Ok(())
}

async fn cancel_on_signal(cancel: CancelFlag) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received, finishing in-flight downloads");
    cancel.cancel();
}
