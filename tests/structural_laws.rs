//! Spec §8 "Structure-learner laws": exact edge counts for TAN, K-DB(k=0),
//! SPODE and the AODE sub-model count, exercised through the public
//! `Classifier`/`Aode` APIs rather than internal module state.

use ndarray::Array2;

use bayesnet_rs::classifier::Classifier;
use bayesnet_rs::dataset::{Smoothing, States};
use bayesnet_rs::ensemble::Aode;
use bayesnet_rs::structure_learning::{Kdb, NaiveBayes, Spode, Tan};

const N_FEATURES: usize = 5;
const N_SAMPLES: usize = 60;

fn synthetic(n_features: usize, n_samples: usize) -> (Array2<i32>, Vec<i32>, Vec<String>, States) {
    let mut x = Array2::<i32>::zeros((n_features, n_samples));
    let mut y = Vec::with_capacity(n_samples);
    for s in 0..n_samples {
        for f in 0..n_features {
            x[[f, s]] = ((s + f * 2) % 3) as i32;
        }
        y.push((s % 2) as i32);
    }
    let feature_names: Vec<String> = (0..n_features).map(|i| format!("X{i}")).collect();
    let mut states = States::new();
    for f in &feature_names {
        states.insert(f.clone(), vec![0, 1, 2]);
    }
    states.insert("class".to_string(), vec![0, 1]);
    (x, y, feature_names, states)
}

#[test]
fn naive_bayes_produces_only_class_edges() {
    let (x, y, features, states) = synthetic(N_FEATURES, N_SAMPLES);
    let mut classifier = Classifier::new(Box::new(NaiveBayes::new()));
    classifier
        .fit_xy(&x, &y, features.clone(), "class".to_string(), &states, Smoothing::Laplace)
        .unwrap();
    assert_eq!(classifier.get_number_of_edges(), N_FEATURES);
}

#[test]
fn tan_produces_2n_minus_1_edges() {
    let (x, y, features, states) = synthetic(N_FEATURES, N_SAMPLES);
    let mut classifier = Classifier::new(Box::new(Tan::default()));
    classifier
        .fit_xy(&x, &y, features.clone(), "class".to_string(), &states, Smoothing::Laplace)
        .unwrap();
    assert_eq!(classifier.get_number_of_edges(), 2 * N_FEATURES - 1);
}

#[test]
fn kdb_with_k_zero_produces_only_class_edges() {
    let (x, y, features, states) = synthetic(N_FEATURES, N_SAMPLES);
    let mut classifier = Classifier::new(Box::new(Kdb::new(0, 0.0)));
    classifier
        .fit_xy(&x, &y, features.clone(), "class".to_string(), &states, Smoothing::Laplace)
        .unwrap();
    assert_eq!(classifier.get_number_of_edges(), N_FEATURES);
}

#[test]
fn spode_produces_2n_minus_1_edges() {
    let (x, y, features, states) = synthetic(N_FEATURES, N_SAMPLES);
    let mut classifier = Classifier::new(Box::new(Spode::new(0)));
    classifier
        .fit_xy(&x, &y, features.clone(), "class".to_string(), &states, Smoothing::Laplace)
        .unwrap();
    assert_eq!(classifier.get_number_of_edges(), 2 * N_FEATURES - 1);
}

#[test]
fn aode_produces_n_spode_submodels() {
    let (x, y, features, states) = synthetic(N_FEATURES, N_SAMPLES);
    let dataset = bayesnet_rs::Dataset::from_x_y(&x, &y, features.clone(), "class".to_string()).unwrap();
    let weights = dataset.uniform_weights();

    let mut aode = Aode::new(false);
    aode.fit(&dataset, &states, &weights, Smoothing::Laplace).unwrap();
    assert_eq!(aode.n_models(), N_FEATURES);
}
