//! House price service - Main Entry Point

use clap::Parser;
use house_price::cli::{cmd_predict, cmd_serve, cmd_train, parse_features, ArtifactArgs, Cli, Commands, TrainArgs};
use house_price::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let prefix = match cli.command {
        Commands::Train { .. } => "train",
        _ => "app",
    };
    let _guard = logging::init(&logging::log_dir_from_env(), prefix)?;

    match cli.command {
        Commands::Train { model, n_samples, noise, seed, test_size, trials, sampler, timeout, patience, jobs, models_dir } => {
            let args = TrainArgs {
                model, n_samples, noise, seed, test_size, trials, sampler, timeout, patience, jobs, models_dir,
            };
            // the orchestrator blocks for the whole run
            tokio::task::spawn_blocking(move || cmd_train(args)).await??;
        }
        Commands::Serve { host, port, models_path, model_date, model } => {
            cmd_serve(host, port, ArtifactArgs { models_path, model_date, model }).await?;
        }
        Commands::Predict { rooms, size, bathrooms, models_path, model_date, model } => {
            let features = parse_features(rooms, size, bathrooms)?;
            cmd_predict(features, ArtifactArgs { models_path, model_date, model })?;
        }
    }

    Ok(())
}
