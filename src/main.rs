use std::{panic::AssertUnwindSafe, sync::Arc};

use clap::Parser;
use cmdpal::{
    app::App,
    cli::{Cli, CliCommand},
    config::Config,
    errors::{self, AppError},
    gateway::SystemGateway,
    logging,
    service::PaletteService,
    storage::SqliteStorage,
};
use color_eyre::Result;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<()> {
    let (config_file, command) = Cli::parse().into_command();

    let config = Config::init(config_file)?;

    let (log_path, log_filter) = logging::resolve_path_and_filter(&config);
    let logs_enabled = log_filter.is_some();
    logging::init(log_path.clone(), log_filter)?;
    tracing::info!("cmdpal v{}", env!("CARGO_PKG_VERSION"));

    errors::init(
        logs_enabled.then_some(log_path),
        AssertUnwindSafe(async move {
            let cancellation_token = CancellationToken::new();
            let ctrl_c_token = cancellation_token.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::info!("Ctrl+C received, cancelling");
                    ctrl_c_token.cancel();
                }
            });

            let storage = SqliteStorage::new(&config.data_dir)
                .await
                .map_err(AppError::into_report)?;
            let mut gateway = SystemGateway::new(config.capabilities.clone());
            if matches!(command, CliCommand::Open(_)) {
                // Only the interactive palette lives long enough to collect a clipboard history
                gateway = gateway.watch_clipboard(cancellation_token.clone());
            }
            let service = PaletteService::new(Arc::new(gateway), storage);

            let output = App::new(cancellation_token.clone())
                .run(config, service, command)
                .await?;
            cancellation_token.cancel();

            if let Some(output) = output.filter(|o| !o.is_empty()) {
                println!("{output}");
            }
            Ok::<_, color_eyre::Report>(())
        }),
    )
    .await
}
