use std::path::Path;

use botomat_core::input::InputParams;
use botomat_master::{
    config::{Cli, MasterConfig},
    master::Master,
    shutdown::{shutdown_manager::ShutdownManager, shutdown_reason::ShutdownReason},
    status_server::{start_status_server, status_routes},
};
use clap::Parser;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(log_file: &Path) -> Result<WorkerGuard, Box<dyn std::error::Error>> {
    let directory = log_file
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = log_file
        .file_name()
        .ok_or("log file path has no file name")?;

    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(directory, file_name));

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .try_init()?;

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let _log_guard = init_tracing(&cli.log_file)?;

    let params = InputParams::read_yaml_file(&cli.user_yaml_file)
        .await
        .inspect_err(|err| error!("Error reading user input: {}", err))?;

    let input = params
        .validate()
        .inspect_err(|err| error!("Invalid user input: {}", err))?;

    info!("Input params: {:?}", params);

    let config = MasterConfig::from_cli(&cli, input.num_robots());
    let shutdown_manager = ShutdownManager::<ShutdownReason>::new();
    let shutdown = shutdown_manager.shutdown.clone();

    let address = config.address;
    let tasks_per_worker = config.tasks_per_worker;
    let master = Master::new(config, shutdown.clone());

    start_status_server(
        address,
        status_routes(master.store().clone(), tasks_per_worker),
        shutdown.clone(),
    )
    .await?;

    tokio::select! {
        summary = master.run(input) => {
            let summary = summary?;
            info!(
                "{} robots finished, {} completion events, at most {} working at once",
                summary.outcome.finished, summary.outcome.events, summary.peak_parallel
            );
        }
        _ = tokio::signal::ctrl_c() => {
            shutdown.trigger(ShutdownReason::Interrupted).await;
        }
    }

    let shutdown_reason = shutdown_manager.await_shutdown().await?;

    info!("Shutting down due to: {:?}", shutdown_reason);

    Ok(())
}
