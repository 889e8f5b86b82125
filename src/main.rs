use anyhow::{Context, Result};
use clap::Parser;

use transmitter::cli::{Action, Args};
use transmitter::logger::{self, LogOptions};
use transmitter::{client, server};

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    logger::init(&LogOptions {
        file: Some(args.log_file.clone()),
        verbose: args.verbose,
    })?;
    tracing::debug!("Called with {:?}", args);

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;

    match args.action {
        Action::Recv => {
            let config = args.server_config();
            rt.block_on(server::serve(&config, shutdown_signal()))
                .context("receiver stopped")?;
        }
        Action::Send => {
            let config = args
                .client_config()
                .context("send requires a filename")?;
            let summary = rt.block_on(client::send(&config));
            if summary.failed > 0 {
                anyhow::bail!(
                    "{} of {} transfer(s) failed",
                    summary.failed,
                    summary.failed + summary.succeeded
                );
            }
        }
    }
    Ok(())
}
