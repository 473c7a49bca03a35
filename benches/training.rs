use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use house_price::artifacts::ArtifactLayout;
use house_price::config::{AppConfig, TrainerConfig};
use house_price::features::HouseFeatures;
use house_price::inference::HousePredictor;
use house_price::training::{ModelKind, ModelOrchestrator};

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    group.sample_size(10); // Fewer samples for training benchmarks

    for (kind, n_trials) in [(ModelKind::ElasticNet, 50usize), (ModelKind::RandomForest, 10)] {
        let dir = tempfile::tempdir().unwrap();
        let config = TrainerConfig::default()
            .with_model(kind)
            .with_n_trials(n_trials)
            .with_models_dir(dir.path());

        group.bench_with_input(BenchmarkId::new(kind.name(), n_trials), &config, |b, config| {
            b.iter(|| {
                ModelOrchestrator::new(black_box(config.clone()))
                    .run_with_layout(ArtifactLayout::new(dir.path(), "20250101"))
                    .unwrap()
            })
        });
    }

    group.finish();
}

fn bench_prediction(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let config = TrainerConfig::default().with_n_trials(10).with_models_dir(dir.path());
    ModelOrchestrator::new(config)
        .run_with_layout(ArtifactLayout::new(dir.path(), "20250101"))
        .unwrap();

    let predictor = HousePredictor::load(&AppConfig::default().with_models_path(dir.path())).unwrap();
    let house = HouseFeatures::new(3, 120.0, 2);

    c.bench_function("predict_single", |b| {
        b.iter(|| predictor.predict(black_box(&house)).unwrap())
    });
}

criterion_group!(benches, bench_pipeline, bench_prediction);
criterion_main!(benches);
