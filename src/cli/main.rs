use clap::Parser;
use noshow_predictor::{config::Config, data, training::TrainingRun};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "noshow-train")]
#[command(about = "Train the no-show prediction pipeline", long_about = None)]
struct Cli {
    /// Raw training data CSV, overriding the configured path
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Artifact output path, overriding the configured path
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "noshow_predictor=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;
    let data_path = cli.data.unwrap_or_else(|| config.paths.data_raw.clone());
    let output_path = cli.output.unwrap_or_else(|| config.paths.model_output.clone());

    tracing::info!("Starting training run");
    let raw = data::load_csv(&data_path)?;
    let outcome = TrainingRun::new(config.training).execute(&raw)?;

    for score in &outcome.scores {
        tracing::info!(
            candidate = %score.name,
            family = score.family.as_str(),
            mean_f1 = format!("{:.4}", score.mean_f1),
            failed = score.failed,
            "Candidate score"
        );
    }
    tracing::info!(
        model = %outcome.pipeline.metadata.model_name,
        cv_f1 = format!("{:.4}", outcome.pipeline.metadata.cv_f1),
        test_f1 = format!("{:.4}", outcome.test_f1),
        threshold = format!("{:.2}", outcome.pipeline.decision_threshold),
        "Training complete"
    );

    outcome.pipeline.save(&output_path)?;
    Ok(())
}
