use super::*;

fn line_training() -> Vec<LabeledInstance<&'static str>> {
    vec![
        instance(&[1.0], "A"),
        instance(&[2.0], "A"),
        instance(&[4.0], "B"),
        instance(&[10.0], "C"),
    ]
}

#[test]
fn test_knn_fit() {
    let labels = LabelSet::new(vec!["A", "B", "C"]).unwrap();
    let knn = KNN::fit(3, &line_training(), labels.clone()).unwrap();

    assert_eq!(knn.get_k(), 3);
    assert_eq!(knn.label_set(), &labels);
    assert_eq!(knn.get_index().len(), 4);
    assert!(knn.get_index().is_optimized());
    assert_eq!(knn.get_lookup().get(&fv(&[4.0])), Some(&"B"));
}

// neighbours at distances 1, 2 and 4 labeled A, A and B
#[test]
fn test_knn_inverse_distance_vote() {
    let labels = LabelSet::new(vec!["A", "B", "C"]).unwrap();
    let knn = KNN::fit(3, &line_training(), labels).unwrap();
    let query = fv(&[0.0]);

    let weights = knn.label_weights(&query).unwrap();
    assert_abs_diff_eq!(weights[0], 1.5, epsilon = 1e-12);
    assert_abs_diff_eq!(weights[1], 0.25, epsilon = 1e-12);
    assert_eq!(weights[2], 0.0);

    assert_eq!(knn.classify(&query).unwrap(), "A");
}

#[test]
fn test_knn_weight_beats_majority() {
    // one close B outweighs two distant A
    let training = vec![
        instance(&[0.1], "B"),
        instance(&[3.0], "A"),
        instance(&[3.5], "A"),
    ];
    let labels = LabelSet::new(vec!["A", "B"]).unwrap();
    let knn = KNN::fit(3, &training, labels).unwrap();
    assert_eq!(knn.classify(&fv(&[0.0])).unwrap(), "B");
}

#[test]
fn test_knn_tie_goes_to_first_label() {
    let training = vec![instance(&[1.0], "A"), instance(&[-1.0], "B")];

    let knn = KNN::fit(2, &training, LabelSet::new(vec!["A", "B"]).unwrap()).unwrap();
    assert_eq!(knn.classify(&fv(&[0.0])).unwrap(), "A");

    let knn = KNN::fit(2, &training, LabelSet::new(vec!["B", "A"]).unwrap()).unwrap();
    assert_eq!(knn.classify(&fv(&[0.0])).unwrap(), "B");
}

#[test]
fn test_knn_zero_distance_wins() {
    let training = vec![
        instance(&[0.1, 0.0], "A"),
        instance(&[-0.1, 0.0], "A"),
        instance(&[0.0, 0.1], "A"),
        instance(&[0.0, 0.0], "B"),
    ];
    let labels = LabelSet::new(vec!["A", "B"]).unwrap();
    let knn = KNN::fit(4, &training, labels).unwrap();
    let query = fv(&[0.0, 0.0]);

    assert_eq!(knn.classify(&query).unwrap(), "B");

    let weights = knn.label_weights(&query).unwrap();
    assert_eq!(weights[0], 0.0);
    assert!(weights[1].is_infinite());
}

#[test]
fn test_knn_negative_zero_is_a_duplicate() {
    let training = vec![instance(&[0.0, 1.0], 1), instance(&[5.0, 5.0], 2)];
    let labels = LabelSet::new(vec![1, 2]).unwrap();
    let knn = KNN::fit(2, &training, labels).unwrap();
    assert_eq!(knn.classify(&fv(&[-0.0, 1.0])).unwrap(), 1);
}

#[test]
fn test_knn_invalid_k() {
    let labels = LabelSet::new(vec!["A", "B", "C"]).unwrap();
    assert!(matches!(
        KNN::fit(0, &line_training(), labels.clone()),
        Err(ModelError::InputValidationError(_))
    ));
    assert!(matches!(
        KNN::fit(5, &line_training(), labels),
        Err(ModelError::InputValidationError(_))
    ));
}

#[test]
fn test_knn_empty_training_set() {
    let labels = LabelSet::new(vec!["A"]).unwrap();
    let training: Vec<LabeledInstance<&str>> = Vec::new();
    assert!(matches!(
        KNN::fit(1, &training, labels),
        Err(ModelError::InputValidationError(_))
    ));
}

#[test]
fn test_knn_label_outside_label_set() {
    let labels = LabelSet::new(vec!["A", "B"]).unwrap();
    assert!(matches!(
        KNN::fit(1, &line_training(), labels),
        Err(ModelError::UnknownLabel(_))
    ));
}

#[test]
fn test_knn_conflicting_duplicate_point() {
    let training = vec![instance(&[1.0], "A"), instance(&[1.0], "B")];
    let labels = LabelSet::new(vec!["A", "B"]).unwrap();
    assert!(matches!(
        KNN::fit(1, &training, labels),
        Err(ModelError::InputValidationError(_))
    ));
}

#[test]
fn test_knn_query_dimension_mismatch() {
    let labels = LabelSet::new(vec!["A", "B", "C"]).unwrap();
    let knn = KNN::fit(1, &line_training(), labels).unwrap();
    assert!(matches!(
        knn.classify(&fv(&[1.0, 2.0])),
        Err(ModelError::InputValidationError(_))
    ));
}

#[test]
fn test_knn_missing_lookup_entry() {
    let tree = KdTree::build(vec![fv(&[0.0]), fv(&[1.0])]).unwrap();
    let mut lookup = LabelLookup::new();
    lookup.insert(fv(&[0.0]), "A").unwrap();
    let knn = KNN::new(2, tree, lookup, LabelSet::new(vec!["A"]).unwrap()).unwrap();

    assert!(matches!(
        knn.classify(&fv(&[0.4])),
        Err(ModelError::UnknownLabel(_))
    ));
}

#[test]
fn test_knn_new_optimizes_index() {
    let mut tree = KdTree::new();
    let mut lookup = LabelLookup::new();
    for (x, label) in [(3.0, 'x'), (1.0, 'y'), (2.0, 'x')] {
        tree.add(fv(&[x])).unwrap();
        lookup.insert(fv(&[x]), label).unwrap();
    }
    assert!(!tree.is_optimized());

    let knn = KNN::new(1, tree, lookup, LabelSet::new(vec!['x', 'y']).unwrap()).unwrap();
    assert!(knn.get_index().is_optimized());
    assert_eq!(knn.classify(&fv(&[1.2])).unwrap(), 'y');
}

#[test]
fn test_knn_deterministic() {
    let mut rng = StdRng::seed_from_u64(3);
    let training: Vec<LabeledInstance<u8>> = (0..200)
        .map(|_| {
            let x: f64 = rng.random_range(0.0..1.0);
            let y: f64 = rng.random_range(0.0..1.0);
            instance(&[x, y], if x + y > 1.0 { 1 } else { 0 })
        })
        .collect();
    let knn = KNN::fit(7, &training, LabelSet::new(vec![0u8, 1]).unwrap()).unwrap();

    let query = fv(&[0.45, 0.52]);
    let first = knn.classify(&query).unwrap();
    for _ in 0..10 {
        assert_eq!(knn.classify(&query).unwrap(), first);
    }
}

#[test]
fn test_knn_classify_batch_preserves_order() {
    let mut rng = StdRng::seed_from_u64(11);
    let make = |rng: &mut StdRng, n: usize| -> Vec<LabeledInstance<u8>> {
        (0..n)
            .map(|_| {
                let x: f64 = rng.random_range(-1.0..1.0);
                let y: f64 = rng.random_range(-1.0..1.0);
                instance(&[x, y], if x > 0.0 { 1 } else { 0 })
            })
            .collect()
    };
    let training = make(&mut rng, 500);
    let validation = make(&mut rng, 600);
    let knn = KNN::fit(5, &training, LabelSet::new(vec![0u8, 1]).unwrap()).unwrap();

    let results = knn.classify_batch(&validation).unwrap();
    assert_eq!(results.len(), validation.len());
    for (result, instance) in results.iter().zip(&validation) {
        assert_eq!(result.actual, instance.label);
        assert_eq!(result.predicted, knn.classify(&instance.features).unwrap());
    }

    let correct = results.iter().filter(|r| r.is_correct()).count();
    assert!(correct as f64 / results.len() as f64 > 0.9);
}
