//! Integration test: training pipeline into a temporary directory, then serving from it

use house_price::artifacts::ArtifactLayout;
use house_price::config::{AppConfig, TrainerConfig};
use house_price::features::HouseFeatures;
use house_price::inference::{HousePredictor, Prediction};
use house_price::optimizer::{SamplerType, Study};
use house_price::preprocessing::StandardScaler;
use house_price::training::{ModelKind, ModelMetrics, ModelOrchestrator, Regressor, RegressorParams};

fn quick_config(dir: &std::path::Path) -> TrainerConfig {
    TrainerConfig::default()
        .with_n_trials(10)
        .with_models_dir(dir)
}

#[test]
fn test_full_pipeline_writes_dated_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let report = ModelOrchestrator::new(quick_config(dir.path())).run().unwrap();

    let layout = ArtifactLayout::new(dir.path(), report.date.clone());
    assert!(ArtifactLayout::is_date_name(&report.date));
    assert_eq!(ArtifactLayout::latest_date(dir.path()).unwrap(), report.date);
    assert!(layout.scaler_path().exists());
    assert!(layout.model_path("RandomForest").exists());
    assert!(layout.params_path("RandomForest").exists());
    assert!(layout.metrics_path("RandomForest").exists());
    assert!(layout.study_path("RandomForest").exists());

    assert_eq!(report.n_trials, 10);
    assert!(report.score > 0.3, "test R² was {}", report.score);
    assert_eq!(report.best_params.kind(), ModelKind::RandomForest);
}

#[test]
fn test_elastic_net_pipeline_serves_under_its_name() {
    let dir = tempfile::tempdir().unwrap();
    let config = quick_config(dir.path()).with_model(ModelKind::ElasticNet);
    let report = ModelOrchestrator::new(config).run().unwrap();

    let layout = ArtifactLayout::new(dir.path(), report.date.clone());
    assert!(layout.model_path("ElasticNet").exists());
    assert!(!layout.model_dir("RandomForest").exists());
    assert!(report.score > 0.9, "test R² was {}", report.score);

    let app = AppConfig::default()
        .with_models_path(dir.path())
        .with_model(ModelKind::ElasticNet);
    let predictor = HousePredictor::load(&app).unwrap();
    assert_eq!(predictor.regressor().kind(), ModelKind::ElasticNet);
    assert!(HousePredictor::load(&AppConfig::default().with_models_path(dir.path())).is_err());
}

#[test]
fn test_zero_timeout_still_trains() {
    let dir = tempfile::tempdir().unwrap();
    let config = quick_config(dir.path()).with_timeout(0.0);

    let report = ModelOrchestrator::new(config).run().unwrap();
    assert_eq!(report.n_trials, 1);
    assert!(report.artifacts.model.exists());
}

#[test]
fn test_persisted_records_match_report() {
    let dir = tempfile::tempdir().unwrap();
    let report = ModelOrchestrator::new(quick_config(dir.path())).run().unwrap();
    let layout = ArtifactLayout::new(dir.path(), report.date.clone());

    let params: RegressorParams =
        house_price::artifacts::read_json(&layout.params_path("RandomForest")).unwrap();
    assert_eq!(params, report.best_params);

    let metrics: ModelMetrics =
        house_price::artifacts::read_json(&layout.metrics_path("RandomForest")).unwrap();
    assert!((metrics.r2 - report.score).abs() < 1e-12);
    assert_eq!(metrics.n_samples, 20);

    let study = Study::load(&layout.study_path("RandomForest")).unwrap();
    assert_eq!(study.trials.len(), 10);

    let model = Regressor::load(&layout.model_path("RandomForest")).unwrap();
    assert_eq!(model.params(), &report.best_params);

    let scaler = StandardScaler::load(&layout.scaler_path()).unwrap();
    assert_eq!(scaler.feature_names(), vec!["rooms", "size", "bathrooms"]);
}

#[test]
fn test_pipeline_is_reproducible() {
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();
    let config = |dir: &std::path::Path| quick_config(dir).with_sampler(SamplerType::Random);

    let ra = ModelOrchestrator::new(config(a.path()))
        .run_with_layout(ArtifactLayout::new(a.path(), "20250101"))
        .unwrap();
    let rb = ModelOrchestrator::new(config(b.path()))
        .run_with_layout(ArtifactLayout::new(b.path(), "20250101"))
        .unwrap();

    assert_eq!(ra.best_params, rb.best_params);
    assert_eq!(ra.score, rb.score);
}

#[test]
fn test_serving_from_trained_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let report = ModelOrchestrator::new(quick_config(dir.path())).run().unwrap();

    // latest date is resolved when none is pinned
    let predictor = HousePredictor::load(&AppConfig::default().with_models_path(dir.path())).unwrap();
    let pinned = HousePredictor::load(
        &AppConfig::default()
            .with_models_path(dir.path())
            .with_model_date(report.date.clone()),
    )
    .unwrap();

    let house = HouseFeatures::new(3, 120.0, 2);
    let prediction = predictor.predict(&house).unwrap();
    assert!(matches!(prediction, Prediction::Accepted { .. }));
    assert_eq!(prediction, pinned.predict(&house).unwrap());

    let rejected = predictor.predict(&HouseFeatures::new(3, 120.0, 6)).unwrap();
    assert_eq!(rejected.value(), -1.0);
}

#[test]
fn test_parallel_random_search_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let config = quick_config(dir.path())
        .with_sampler(SamplerType::Random)
        .with_n_jobs(3)
        .with_n_trials(9);

    let report = ModelOrchestrator::new(config).run().unwrap();
    assert_eq!(report.n_trials, 9);
    assert_eq!(report.n_failed_trials, 0);
}
