use criterion::{criterion_group, criterion_main, Criterion};
use ndarray::Array2;

use bayesnet_rs::dataset::{Dataset, Smoothing, States};
use bayesnet_rs::metrics::Metrics;
use bayesnet_rs::network::Network;
use bayesnet_rs::structure_learning::{Kdb, StructureLearner, Tan};

fn synthetic_dataset(n_features: usize, n_samples: usize) -> (Dataset, States) {
    let mut data = Array2::<i32>::zeros((n_features + 1, n_samples));
    for s in 0..n_samples {
        for f in 0..n_features {
            data[[f, s]] = ((s + f) % 3) as i32;
        }
        data[[n_features, s]] = (s % 2) as i32;
    }
    let feature_names: Vec<String> = (0..n_features).map(|i| format!("X{i}")).collect();
    let dataset = Dataset::new(data, feature_names.clone(), "class".to_string()).unwrap();

    let mut states = States::new();
    for f in &feature_names {
        states.insert(f.clone(), vec![0, 1, 2]);
    }
    states.insert("class".to_string(), vec![0, 1]);
    (dataset, states)
}

fn bench_tan(c: &mut Criterion) {
    let (dataset, states) = synthetic_dataset(12, 500);
    let weights = dataset.uniform_weights();

    c.bench_function("tan_fit_12_features_500_samples", |b| {
        b.iter(|| {
            let mut network = Network::new("class".to_string());
            for f in dataset.feature_names() {
                network.add_node(f).unwrap();
            }
            network.add_node("class").unwrap();
            let mut metrics = Metrics::new(dataset.matrix(), dataset.feature_names().to_vec(), "class".to_string(), 2);
            Tan::default().build(&mut network, &mut metrics, &weights).unwrap();
            network.fit(&dataset, &states, &weights, Smoothing::Laplace).unwrap();
        })
    });
}

fn bench_kdb(c: &mut Criterion) {
    let (dataset, states) = synthetic_dataset(12, 500);
    let weights = dataset.uniform_weights();

    c.bench_function("kdb_fit_12_features_500_samples", |b| {
        b.iter(|| {
            let mut network = Network::new("class".to_string());
            for f in dataset.feature_names() {
                network.add_node(f).unwrap();
            }
            network.add_node("class").unwrap();
            let mut metrics = Metrics::new(dataset.matrix(), dataset.feature_names().to_vec(), "class".to_string(), 2);
            Kdb::new(2, 0.0).build(&mut network, &mut metrics, &weights).unwrap();
            network.fit(&dataset, &states, &weights, Smoothing::Laplace).unwrap();
        })
    });
}

criterion_group!(benches, bench_tan, bench_kdb);
criterion_main!(benches);
