//! Spec §8 "Concrete scenarios" #6: a three-node chain plus common child
//! (`C -> X`, `C -> Y`, `C -> Z`, `Y -> Z`) exercised under all four
//! smoothing kinds, with hand-ground-truthed `predict_proba` outputs.
//!
//! Data and expected outputs are grounded on
//! `original_source/tests/TestBayesNetwork.cc`'s "Test Smoothing B" case.

use approx::assert_relative_eq;
use ndarray::{array, Array2};

use bayesnet_rs::dataset::{Dataset, Smoothing, States};
use bayesnet_rs::network::Network;

fn chain_network() -> (Network, Dataset, States) {
    let mut net = Network::new("C");
    net.add_node("X").unwrap();
    net.add_node("Y").unwrap();
    net.add_node("Z").unwrap();
    net.add_node("C").unwrap();
    net.add_edge("C", "X").unwrap();
    net.add_edge("C", "Y").unwrap();
    net.add_edge("C", "Z").unwrap();
    net.add_edge("Y", "Z").unwrap();

    let x = array![
        [0, 0, 1, 1, 0, 1, 0, 1, 0, 1, 0, 0, 0, 1, 0, 1, 0, 0],
        [1, 2, 0, 2, 2, 2, 1, 0, 0, 1, 1, 1, 0, 1, 2, 1, 0, 2],
        [2, 1, 3, 3, 2, 0, 0, 1, 3, 2, 1, 2, 2, 3, 0, 0, 1, 2],
    ];
    let y = vec![0, 1, 0, 1, 1, 1, 0, 0, 0, 1, 1, 1, 0, 0, 0, 1, 1, 1];
    let dataset = Dataset::from_x_y(
        &x,
        &y,
        vec!["X".to_string(), "Y".to_string(), "Z".to_string()],
        "C".to_string(),
    )
    .unwrap();

    let mut states = States::new();
    states.insert("X".to_string(), vec![0, 1]);
    states.insert("Y".to_string(), vec![0, 1, 2]);
    states.insert("Z".to_string(), vec![0, 1, 2, 3]);
    states.insert("C".to_string(), vec![0, 1]);
    (net, dataset, states)
}

fn query() -> Array2<i32> {
    array![[0], [1], [2]]
}

#[test]
fn laplace_smoothing_matches_reference_posterior() {
    let (mut net, dataset, states) = chain_network();
    let weights = vec![1.0; dataset.n_samples()];
    net.fit(&dataset, &states, &weights, Smoothing::Laplace).unwrap();
    let proba = net.predict_proba(&query()).unwrap();
    assert_relative_eq!(proba[0][0], 0.377418, epsilon = 1e-4);
    assert_relative_eq!(proba[0][1], 0.622582, epsilon = 1e-4);
}

#[test]
fn original_smoothing_matches_reference_posterior() {
    let (mut net, dataset, states) = chain_network();
    let weights = vec![1.0; dataset.n_samples()];
    net.fit(&dataset, &states, &weights, Smoothing::Original).unwrap();
    let proba = net.predict_proba(&query()).unwrap();
    assert_relative_eq!(proba[0][0], 0.344769, epsilon = 1e-4);
    assert_relative_eq!(proba[0][1], 0.655231, epsilon = 1e-4);
}

#[test]
fn cestnik_smoothing_matches_reference_posterior() {
    let (mut net, dataset, states) = chain_network();
    let weights = vec![1.0; dataset.n_samples()];
    net.fit(&dataset, &states, &weights, Smoothing::Cestnik).unwrap();
    let proba = net.predict_proba(&query()).unwrap();
    assert_relative_eq!(proba[0][0], 0.353422, epsilon = 1e-4);
    assert_relative_eq!(proba[0][1], 0.646578, epsilon = 1e-4);
}

#[test]
fn none_smoothing_matches_reference_posterior() {
    let (mut net, dataset, states) = chain_network();
    let weights = vec![1.0; dataset.n_samples()];
    net.fit(&dataset, &states, &weights, Smoothing::None).unwrap();
    let proba = net.predict_proba(&query()).unwrap();
    assert_relative_eq!(proba[0][0], 0.342465753, epsilon = 1e-4);
    assert_relative_eq!(proba[0][1], 0.65753424, epsilon = 1e-4);
}
