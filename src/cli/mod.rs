//! House price CLI
//!
//! Command-line interface for training, serving and one-shot prediction.
//! Flags override the values read from the environment.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use std::time::Instant;

use crate::config::{AppConfig, TrainerConfig};
use crate::features::HouseFeatures;
use crate::inference::{HousePredictor, Prediction};
use crate::optimizer::SamplerType;
use crate::server::{run_server, PredictionRequest, ServerConfig};
use crate::training::{ModelKind, ModelOrchestrator, TrainingReport};

// ─── Styling helpers ───────────────────────────────────────────────────────────

const W: usize = 58; // box inner width

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn line_box_top()    { println!("  {}", dim("┌─────────────────────────────────────────────────────────┐")); }
fn line_box_bottom() { println!("  {}", dim("└─────────────────────────────────────────────────────────┘")); }
fn line_box_sep()    { println!("  {}", dim("├─────────────────────────────────────────────────────────┤")); }

fn line_box(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let pad = W.saturating_sub(visible_len);
    println!("  {}  {}{} {}", dim("│"), content, " ".repeat(pad), dim("│"));
}

fn line_box_center(content: &str) {
    let total_pad = W.saturating_sub(strip_ansi(content).chars().count());
    let left = total_pad / 2;
    let right = total_pad - left;
    println!("  {}  {}{}{} {}", dim("│"), " ".repeat(left), content, " ".repeat(right), dim("│"));
}

fn line_box_empty() { line_box(""); }

fn strip_ansi(s: &str) -> String {
    let mut out = String::new();
    let mut in_escape = false;
    for c in s.chars() {
        if c == '\x1b' { in_escape = true; continue; }
        if in_escape { if c == 'm' { in_escape = false; } continue; }
        out.push(c);
    }
    out
}

fn kv(key: &str, val: &str) -> String {
    format!("{} {}", muted(key), val.white())
}

fn step_run(msg: &str) {
    println!("  {} {}...", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("  {} {}", ok("✓"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "house-price")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Train and serve a house price regression model")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate data, train, tune, evaluate and save a model
    Train {
        /// Model family (random_forest, elastic_net)
        #[arg(long)]
        model: Option<ModelKind>,

        /// Number of synthetic samples
        #[arg(long)]
        n_samples: Option<usize>,

        /// Target noise standard deviation
        #[arg(long)]
        noise: Option<f64>,

        /// Random seed
        #[arg(long)]
        seed: Option<u64>,

        /// Held-out fraction
        #[arg(long)]
        test_size: Option<f64>,

        /// Hyperparameter search trials
        #[arg(long)]
        trials: Option<usize>,

        /// Search sampler (tpe, random)
        #[arg(long)]
        sampler: Option<SamplerType>,

        /// Search time limit in seconds; the first trial always runs
        #[arg(long)]
        timeout: Option<f64>,

        /// Stop after this many trials without improvement
        #[arg(long)]
        patience: Option<usize>,

        /// Parallel trial evaluations (random sampler)
        #[arg(long)]
        jobs: Option<usize>,

        /// Artifact root directory
        #[arg(long)]
        models_dir: Option<PathBuf>,
    },

    /// Start the prediction API
    Serve {
        /// Server host
        #[arg(long)]
        host: Option<String>,

        /// Server port
        #[arg(short, long)]
        port: Option<u16>,

        /// Artifact root directory
        #[arg(long)]
        models_path: Option<PathBuf>,

        /// Artifact date (YYYYMMDD), latest when omitted
        #[arg(long)]
        model_date: Option<String>,

        /// Model family to serve
        #[arg(long)]
        model: Option<ModelKind>,
    },

    /// Predict the price of one house
    Predict {
        /// Number of rooms, 1 to 10
        #[arg(long, allow_hyphen_values = true)]
        rooms: i64,

        /// Floor area in square meters, up to 1000
        #[arg(long, allow_hyphen_values = true)]
        size: f64,

        /// Number of bathrooms, 1 to 10
        #[arg(long, allow_hyphen_values = true)]
        bathrooms: i64,

        /// Artifact root directory
        #[arg(long)]
        models_path: Option<PathBuf>,

        /// Artifact date (YYYYMMDD), latest when omitted
        #[arg(long)]
        model_date: Option<String>,

        /// Model family to load
        #[arg(long)]
        model: Option<ModelKind>,
    },
}

/// Flags of the `train` subcommand
#[derive(Debug, Default, Clone)]
pub struct TrainArgs {
    pub model: Option<ModelKind>,
    pub n_samples: Option<usize>,
    pub noise: Option<f64>,
    pub seed: Option<u64>,
    pub test_size: Option<f64>,
    pub trials: Option<usize>,
    pub sampler: Option<SamplerType>,
    pub timeout: Option<f64>,
    pub patience: Option<usize>,
    pub jobs: Option<usize>,
    pub models_dir: Option<PathBuf>,
}

impl TrainArgs {
    /// Apply the given flags on top of `base`
    pub fn apply(self, base: TrainerConfig) -> TrainerConfig {
        let mut config = base;
        if let Some(m) = self.model { config = config.with_model(m); }
        if let Some(n) = self.n_samples { config = config.with_n_samples(n); }
        if let Some(noise) = self.noise { config = config.with_noise(noise); }
        if let Some(seed) = self.seed { config = config.with_random_state(seed); }
        if let Some(t) = self.test_size { config = config.with_test_size(t); }
        if let Some(n) = self.trials { config = config.with_n_trials(n); }
        if let Some(s) = self.sampler { config = config.with_sampler(s); }
        if let Some(t) = self.timeout { config = config.with_timeout(t); }
        if let Some(p) = self.patience { config = config.with_patience(p); }
        if let Some(j) = self.jobs { config = config.with_n_jobs(j); }
        if let Some(dir) = self.models_dir { config = config.with_models_dir(dir); }
        config
    }
}

/// Artifact selection flags shared by `serve` and `predict`
#[derive(Debug, Default, Clone)]
pub struct ArtifactArgs {
    pub models_path: Option<PathBuf>,
    pub model_date: Option<String>,
    pub model: Option<ModelKind>,
}

impl ArtifactArgs {
    /// Apply the given flags on top of `base`
    pub fn apply(self, base: AppConfig) -> AppConfig {
        let mut config = base;
        if let Some(path) = self.models_path { config = config.with_models_path(path); }
        if let Some(date) = self.model_date { config = config.with_model_date(date); }
        if let Some(model) = self.model { config = config.with_model(model); }
        config
    }
}

/// Range-check command-line features the same way the API checks request bodies
pub fn parse_features(rooms: i64, size: f64, bathrooms: i64) -> anyhow::Result<HouseFeatures> {
    Ok(PredictionRequest { rooms, size, bathrooms }.validate()?)
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_train(args: TrainArgs) -> anyhow::Result<TrainingReport> {
    section("Train");

    let config = args.apply(TrainerConfig::from_env());
    step_run(&format!(
        "Running pipeline ({}, {} samples, {} {} trials)",
        config.model.to_string().cyan(),
        config.gen_n_samples,
        config.n_trials,
        config.sampler.to_string().cyan()
    ));
    let start = Instant::now();
    let report = ModelOrchestrator::new(config).run()?;
    step_done(&format!("{:.2?}", start.elapsed()));

    println!();
    line_box_top();
    line_box_empty();
    line_box_center(&format!("{}", "Training summary".white().bold()));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box(&kv("Test R²        ", &format!("{:.4}", report.score)));
    line_box(&kv("Baseline R²    ", &format!("{:.4}", report.baseline_metrics.r2)));
    line_box(&kv("RMSE           ", &format!("{:.4}", report.metrics.rmse)));
    line_box(&kv("MAE            ", &format!("{:.4}", report.metrics.mae)));
    line_box(&kv("Trials         ", &format!("{} ({} failed)", report.n_trials, report.n_failed_trials)));
    line_box(&kv("Model          ", report.best_params.kind().name()));
    for (name, value) in report.best_params.summary() {
        line_box(&kv(&format!("{:<15}", name), &value));
    }
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box(&kv("Model  ", &report.artifacts.model.display().to_string()));
    line_box(&kv("Scaler ", &report.scaler_path.display().to_string()));
    line_box_empty();
    line_box_bottom();
    println!();

    Ok(report)
}

pub async fn cmd_serve(host: Option<String>, port: Option<u16>, artifacts: ArtifactArgs) -> anyhow::Result<()> {
    let mut config = ServerConfig::from_env();
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }
    let app_config = artifacts.apply(AppConfig::from_env());

    println!();
    line_box_top();
    line_box_empty();
    line_box_center(&format!("{}", "House Price API".white().bold()));
    line_box_center(&format!("{}", dim(&format!("v{}", env!("CARGO_PKG_VERSION")))));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box(&kv("Predict ", &format!("http://{}:{}/api/v1/predict", config.host, config.port)));
    line_box(&kv("Health  ", &format!("http://{}:{}/health", config.host, config.port)));
    line_box(&kv("Models  ", &app_config.models_path.display().to_string()));
    line_box(&kv("Model   ", &app_config.model_name));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box_center(&format!("{}", dim("ctrl+c to stop")));
    line_box_empty();
    line_box_bottom();
    println!();

    run_server(config, app_config).await
}

pub fn cmd_predict(features: HouseFeatures, artifacts: ArtifactArgs) -> anyhow::Result<Prediction> {
    section("Predict");

    let config = artifacts.apply(AppConfig::from_env());
    step_run("Loading artifacts");
    let predictor = HousePredictor::load(&config)?;
    step_done(&config.layout()?.run_dir().display().to_string());

    let prediction = predictor.predict(&features)?;
    println!();
    match &prediction {
        Prediction::Accepted { value } => {
            println!("  {:<12} {}", muted("Prediction"), format!("{:.2}", value).white().bold());
        }
        Prediction::Rejected { violations } => {
            println!("  {:<12} {}", muted("Prediction"), format!("{:.1}", prediction.value()).yellow());
            println!("  {:<12} {}", muted("Violations"), violations.join(", ").yellow());
        }
    }
    println!();

    Ok(prediction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_train_flags() {
        let cli = Cli::try_parse_from([
            "house-price", "train", "--n-samples", "200", "--trials", "10", "--sampler", "random", "--jobs", "2",
            "--model", "elastic_net", "--timeout", "30", "--patience", "5",
        ])
        .unwrap();

        match cli.command {
            Commands::Train { model, n_samples, trials, sampler, timeout, patience, jobs, .. } => {
                assert_eq!(model, Some(ModelKind::ElasticNet));
                assert_eq!(n_samples, Some(200));
                assert_eq!(trials, Some(10));
                assert_eq!(sampler, Some(SamplerType::Random));
                assert_eq!(timeout, Some(30.0));
                assert_eq!(patience, Some(5));
                assert_eq!(jobs, Some(2));
            }
            _ => panic!("expected train"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_model() {
        assert!(Cli::try_parse_from(["house-price", "train", "--model", "svm"]).is_err());
    }

    #[test]
    fn test_parse_predict_accepts_negative_counts() {
        let cli = Cli::try_parse_from([
            "house-price", "predict", "--rooms", "-1", "--size", "120", "--bathrooms", "2",
        ])
        .unwrap();
        match cli.command {
            Commands::Predict { rooms, .. } => assert_eq!(rooms, -1),
            _ => panic!("expected predict"),
        }
    }

    #[test]
    fn test_parse_features_checks_ranges() {
        let house = parse_features(3, 120.0, 2).unwrap();
        assert_eq!(house, HouseFeatures::new(3, 120.0, 2));

        assert!(parse_features(0, 120.0, 2).is_err());
        assert!(parse_features(-1, 120.0, 2).is_err());
        assert!(parse_features(11, 120.0, 2).is_err());
        assert!(parse_features(3, 0.0, 2).is_err());
        assert!(parse_features(3, 1200.0, 2).is_err());
        assert!(parse_features(3, 120.0, 0).is_err());
        let err = parse_features(3, 120.0, 11).unwrap_err();
        assert!(err.to_string().contains("bathrooms"));
    }

    #[test]
    fn test_artifact_args_override_base() {
        let config = ArtifactArgs {
            models_path: Some(PathBuf::from("artifacts")),
            model_date: Some("20250805".to_string()),
            model: Some(ModelKind::ElasticNet),
        }
        .apply(AppConfig::default());

        assert_eq!(
            config.model_path().unwrap(),
            PathBuf::from("artifacts/20250805/ElasticNet/model.json")
        );
        assert_eq!(ArtifactArgs::default().apply(AppConfig::default()).model_name, "RandomForest");
    }

    #[test]
    fn test_parse_predict_requires_features() {
        assert!(Cli::try_parse_from(["house-price", "predict", "--rooms", "3"]).is_err());
        assert!(Cli::try_parse_from([
            "house-price", "predict", "--rooms", "3", "--size", "120", "--bathrooms", "2",
        ])
        .is_ok());
    }

    #[test]
    fn test_train_args_override_base() {
        let args = TrainArgs {
            trials: Some(7),
            test_size: Some(0.3),
            timeout: Some(1.5),
            patience: Some(3),
            ..Default::default()
        };
        let config = args.apply(TrainerConfig::default());
        assert_eq!(config.n_trials, 7);
        assert_eq!(config.timeout_secs, Some(1.5));
        assert_eq!(config.patience, Some(3));
        assert_eq!(config.model, ModelKind::RandomForest);
        assert!((config.test_size - 0.3).abs() < 1e-12);
        assert_eq!(config.gen_n_samples, 100);
    }

    #[test]
    fn test_strip_ansi() {
        let colored = format!("{}", "abc".red());
        assert_eq!(strip_ansi(&colored), "abc");
    }
}
