use super::*;
use std::collections::BTreeMap;

fn categorical(pairs: &[(i64, f64)]) -> AttributeDistribution {
    AttributeDistribution::Categorical {
        probabilities: pairs.iter().copied().collect(),
    }
}

fn probabilities(distribution: &AttributeDistribution) -> &BTreeMap<i64, f64> {
    match distribution {
        AttributeDistribution::Categorical { probabilities } => probabilities,
        other => panic!("expected a categorical distribution, got {:?}", other),
    }
}

#[test]
fn test_attribute_schema() {
    let schema = AttributeSchema::with_categorical(3, &[(2, 5)]).unwrap();
    assert_eq!(schema.len(), 3);
    assert_eq!(schema.kind(0), Some(AttributeKind::Continuous));
    assert_eq!(
        schema.kind(2),
        Some(AttributeKind::Categorical { cardinality: 5 })
    );
    assert_eq!(schema.kind(3), None);

    assert!(AttributeSchema::continuous(0).is_err());
    assert!(AttributeSchema::with_categorical(3, &[(3, 2)]).is_err());
    assert!(AttributeSchema::with_categorical(3, &[(0, 0)]).is_err());
}

#[test]
fn test_fit_gaussian_uses_sample_variance() {
    match AttributeDistribution::fit_gaussian(&[1.0, 2.0, 3.0, 4.0]) {
        AttributeDistribution::Gaussian { mean, variance } => {
            assert_abs_diff_eq!(mean, 2.5, epsilon = 1e-12);
            assert_abs_diff_eq!(variance, 5.0 / 3.0, epsilon = 1e-12);
        }
        other => panic!("expected a gaussian, got {:?}", other),
    }
}

#[test]
fn test_fit_gaussian_single_value_is_point_mass() {
    let distribution = AttributeDistribution::fit_gaussian(&[4.2]);
    assert_eq!(
        distribution,
        AttributeDistribution::Gaussian {
            mean: 4.2,
            variance: 0.0
        }
    );
    assert_eq!(distribution.density(4.2), Some(1.0));
    assert_eq!(distribution.density(4.3), Some(0.0));
}

#[test]
fn test_gaussian_density_standard_normal() {
    let distribution = AttributeDistribution::Gaussian {
        mean: 0.0,
        variance: 1.0,
    };
    assert_abs_diff_eq!(
        distribution.density(0.0).unwrap(),
        0.3989422804014327,
        epsilon = 1e-12
    );
}

#[test]
fn test_fit_categorical_raw_frequencies() {
    let distribution = AttributeDistribution::fit_categorical(&[0.0, 1.0, 1.0, 2.0], 3).unwrap();
    let p = probabilities(&distribution);
    assert_eq!(p.len(), 3);
    assert_abs_diff_eq!(p[&0], 0.25, epsilon = 1e-12);
    assert_abs_diff_eq!(p[&1], 0.5, epsilon = 1e-12);
    assert_abs_diff_eq!(p[&2], 0.25, epsilon = 1e-12);
}

// two observed values out of a domain of four
#[test]
fn test_fit_categorical_m_estimate_for_unobserved_values() {
    let values = [0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0, 0.0];
    let distribution = AttributeDistribution::fit_categorical(&values, 4).unwrap();
    let p = probabilities(&distribution);

    assert_eq!(p[&2], 0.125);
    assert_eq!(p[&3], 0.125);
    assert_abs_diff_eq!(p[&0], 0.375, epsilon = 1e-12);
    assert_abs_diff_eq!(p[&1], 0.375, epsilon = 1e-12);
}

#[test]
fn test_fit_categorical_sums_to_one() {
    let mut rng = StdRng::seed_from_u64(5);
    for cardinality in [1usize, 2, 4, 7, 40] {
        for n in [1usize, 3, 10, 100] {
            let values: Vec<f64> = (0..n)
                .map(|_| rng.random_range(0..cardinality) as f64)
                .collect();
            let distribution =
                AttributeDistribution::fit_categorical(&values, cardinality).unwrap();
            let p = probabilities(&distribution);
            assert_eq!(p.len(), cardinality);
            assert!(p.values().all(|&v| v > 0.0));
            assert_abs_diff_eq!(p.values().sum::<f64>(), 1.0, epsilon = 1e-9);
        }
    }
}

#[test]
fn test_fit_categorical_rejects_values_outside_domain() {
    assert!(AttributeDistribution::fit_categorical(&[0.0, 3.0], 3).is_err());
    assert!(AttributeDistribution::fit_categorical(&[0.5], 3).is_err());
    assert!(AttributeDistribution::fit_categorical(&[-1.0], 3).is_err());
    assert!(AttributeDistribution::fit_categorical(&[], 3).is_err());
}

#[test]
fn test_categorical_density_lookup() {
    let distribution = categorical(&[(0, 0.2), (1, 0.8)]);
    assert_eq!(distribution.density(1.0), Some(0.8));
    assert_eq!(distribution.density(2.0), None);
    assert_eq!(distribution.density(0.5), None);
}

#[test]
fn test_from_tagged() {
    let gaussian = AttributeDistribution::from_tagged(
        "gaussian",
        serde_json::json!({ "mean": 1.0, "variance": 2.0 }),
    )
    .unwrap();
    assert_eq!(
        gaussian,
        AttributeDistribution::Gaussian {
            mean: 1.0,
            variance: 2.0
        }
    );

    let table = AttributeDistribution::from_tagged(
        "categorical",
        serde_json::json!({ "0": 0.5, "1": 0.5 }),
    )
    .unwrap();
    assert_eq!(table, categorical(&[(0, 0.5), (1, 0.5)]));

    assert_eq!(
        AttributeDistribution::from_tagged("poisson", serde_json::json!({ "lambda": 1.0 })),
        Err(ModelError::UnknownDistribution("poisson".to_string()))
    );

    assert!(matches!(
        AttributeDistribution::from_tagged("categorical", serde_json::json!({ "0": 0.5 })),
        Err(ModelError::InputValidationError(_))
    ));
    assert!(matches!(
        AttributeDistribution::from_tagged(
            "gaussian",
            serde_json::json!({ "mean": 0.0, "variance": -1.0 })
        ),
        Err(ModelError::InputValidationError(_))
    ));
}

#[test]
fn test_distribution_serde_shape() {
    let json = serde_json::to_value(categorical(&[(0, 0.25), (1, 0.75)])).unwrap();
    assert_eq!(
        json,
        serde_json::json!({ "type": "categorical", "parameters": { "0": 0.25, "1": 0.75 } })
    );

    let json = r#"{"type": "gaussian", "parameters": {"mean": 3.0, "variance": 0.5}}"#;
    let parsed: AttributeDistribution = serde_json::from_str(json).unwrap();
    assert_eq!(
        parsed,
        AttributeDistribution::Gaussian {
            mean: 3.0,
            variance: 0.5
        }
    );

    let unknown = serde_json::from_str::<AttributeDistribution>(
        r#"{"type": "beta", "parameters": {}}"#,
    );
    assert!(unknown.is_err());
}

#[test]
fn test_class_model_score() {
    let model = ClassModel::new(
        "a",
        0.5,
        vec![
            AttributeDistribution::Gaussian {
                mean: 0.0,
                variance: 1.0,
            },
            categorical(&[(0, 0.25), (1, 0.75)]),
        ],
    )
    .unwrap();

    let score = model.score(&fv(&[0.0, 1.0])).unwrap();
    assert_abs_diff_eq!(score, 0.5 * 0.3989422804014327 * 0.75, epsilon = 1e-12);
}

#[test]
fn test_class_model_missing_categorical_value() {
    let model = ClassModel::new("a", 1.0, vec![categorical(&[(0, 0.5), (1, 0.5)])]).unwrap();
    assert_eq!(
        model.score(&fv(&[2.0])),
        Err(ModelError::MissingCategoricalValue {
            class: "a".to_string(),
            attribute: 0,
            value: 2.0
        })
    );
}

#[test]
fn test_class_model_rejects_invalid_prior() {
    let gaussian = AttributeDistribution::Gaussian {
        mean: 0.0,
        variance: 1.0,
    };
    assert!(ClassModel::new("a", 1.5, vec![gaussian.clone()]).is_err());
    assert!(ClassModel::new("a", -0.1, vec![gaussian]).is_err());
    assert!(ClassModel::new("a", 0.5, Vec::new()).is_err());
}

#[test]
fn test_naive_bayes_fit() {
    let training = vec![
        instance(&[1.0, 0.0], "x"),
        instance(&[2.0, 0.0], "x"),
        instance(&[3.0, 1.0], "x"),
        instance(&[10.0, 1.0], "y"),
    ];
    let schema = AttributeSchema::with_categorical(2, &[(1, 2)]).unwrap();
    let nb = NaiveBayes::fit(&training, LabelSet::new(vec!["x", "y"]).unwrap(), &schema).unwrap();

    let models = nb.get_models();
    assert_eq!(models.len(), 2);
    assert_eq!(models[0].get_label(), &"x");
    assert_abs_diff_eq!(models[0].get_prior(), 0.75, epsilon = 1e-12);
    assert_abs_diff_eq!(models[1].get_prior(), 0.25, epsilon = 1e-12);

    match models[0].get_distributions()[0] {
        AttributeDistribution::Gaussian { mean, variance } => {
            assert_abs_diff_eq!(mean, 2.0, epsilon = 1e-12);
            assert_abs_diff_eq!(variance, 1.0, epsilon = 1e-12);
        }
        ref other => panic!("expected a gaussian, got {:?}", other),
    }
    let p = probabilities(&models[0].get_distributions()[1]);
    assert_abs_diff_eq!(p[&0], 2.0 / 3.0, epsilon = 1e-12);

    // class y never has value 0: m-estimated
    let p = probabilities(&models[1].get_distributions()[1]);
    assert_abs_diff_eq!(p[&0], 0.25, epsilon = 1e-12);
    assert_abs_diff_eq!(p[&1], 0.75, epsilon = 1e-12);

    assert_eq!(nb.classify(&fv(&[2.5, 0.0])).unwrap(), "x");
}

#[test]
fn test_naive_bayes_fit_errors() {
    let schema = AttributeSchema::continuous(1).unwrap();
    let training = vec![instance(&[1.0], "x"), instance(&[2.0], "x")];

    assert!(matches!(
        NaiveBayes::fit(&training, LabelSet::new(vec!["x", "y"]).unwrap(), &schema),
        Err(ModelError::InputValidationError(_))
    ));
    assert!(matches!(
        NaiveBayes::fit(&training, LabelSet::new(vec!["z"]).unwrap(), &schema),
        Err(ModelError::UnknownLabel(_))
    ));
    assert!(matches!(
        NaiveBayes::fit(
            &training,
            LabelSet::new(vec!["x"]).unwrap(),
            &AttributeSchema::continuous(2).unwrap()
        ),
        Err(ModelError::InputValidationError(_))
    ));
}

#[test]
fn test_naive_bayes_all_zero_scores_pick_first_class() {
    let point_mass = |mean: f64| AttributeDistribution::Gaussian {
        mean,
        variance: 0.0,
    };
    let nb = NaiveBayes::from_models(vec![
        ClassModel::new("first", 0.5, vec![point_mass(1.0)]).unwrap(),
        ClassModel::new("second", 0.5, vec![point_mass(2.0)]).unwrap(),
    ])
    .unwrap();

    assert_eq!(nb.scores(&fv(&[3.0])).unwrap(), vec![0.0, 0.0]);
    assert_eq!(nb.classify(&fv(&[3.0])).unwrap(), "first");
    assert_eq!(nb.classify(&fv(&[2.0])).unwrap(), "second");
}

#[test]
fn test_naive_bayes_tie_picks_first_class() {
    let table = categorical(&[(0, 0.5), (1, 0.5)]);
    let nb = NaiveBayes::from_models(vec![
        ClassModel::new(2, 0.5, vec![table.clone()]).unwrap(),
        ClassModel::new(1, 0.5, vec![table]).unwrap(),
    ])
    .unwrap();
    assert_eq!(nb.classify(&fv(&[1.0])).unwrap(), 2);
}

#[test]
fn test_naive_bayes_from_models_validation() {
    let gaussian = AttributeDistribution::Gaussian {
        mean: 0.0,
        variance: 1.0,
    };
    let table = categorical(&[(0, 1.0)]);

    assert!(NaiveBayes::<&str>::from_models(Vec::new()).is_err());
    assert!(
        NaiveBayes::from_models(vec![
            ClassModel::new("a", 0.5, vec![gaussian.clone()]).unwrap(),
            ClassModel::new("a", 0.5, vec![gaussian.clone()]).unwrap(),
        ])
        .is_err()
    );
    assert!(
        NaiveBayes::from_models(vec![
            ClassModel::new("a", 0.5, vec![gaussian.clone()]).unwrap(),
            ClassModel::new("b", 0.5, vec![gaussian.clone(), gaussian.clone()]).unwrap(),
        ])
        .is_err()
    );
    assert!(
        NaiveBayes::from_models(vec![
            ClassModel::new("a", 0.5, vec![gaussian]).unwrap(),
            ClassModel::new("b", 0.5, vec![table]).unwrap(),
        ])
        .is_err()
    );
}

#[test]
fn test_naive_bayes_classify_missing_categorical_value() {
    let nb = NaiveBayes::from_models(vec![
        ClassModel::new("a", 0.5, vec![categorical(&[(0, 1.0)])]).unwrap(),
        ClassModel::new("b", 0.5, vec![categorical(&[(0, 0.5), (1, 0.5)])]).unwrap(),
    ])
    .unwrap();

    assert!(matches!(
        nb.classify(&fv(&[1.0])),
        Err(ModelError::MissingCategoricalValue { attribute: 0, .. })
    ));
}

#[test]
fn test_naive_bayes_save_and_load_models() {
    let training = vec![
        instance(&[1.0, 0.0], "x".to_string()),
        instance(&[1.5, 1.0], "x".to_string()),
        instance(&[9.0, 2.0], "y".to_string()),
        instance(&[9.5, 2.0], "y".to_string()),
    ];
    let labels = LabelSet::new(vec!["x".to_string(), "y".to_string()]).unwrap();
    let schema = AttributeSchema::with_categorical(2, &[(1, 3)]).unwrap();
    let nb = NaiveBayes::fit(&training, labels, &schema).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("models.json");
    let path = path.to_str().unwrap();

    nb.save_models(path).unwrap();
    let loaded: NaiveBayes<String> = NaiveBayes::load_models(path).unwrap();

    assert_eq!(loaded.get_models(), nb.get_models());
    assert_eq!(loaded.label_set(), nb.label_set());
    assert_eq!(loaded.classify(&fv(&[9.2, 2.0])).unwrap(), "y");
}

#[test]
fn test_naive_bayes_load_unknown_distribution() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("models.json");
    std::fs::write(
        &path,
        r#"[{"label": "a", "prior": 1.0,
            "distributions": [{"type": "laplace", "parameters": {}}]}]"#,
    )
    .unwrap();

    let result = NaiveBayes::<String>::load_models(path.to_str().unwrap());
    match result {
        Err(IoError::ModelError(ModelError::UnknownDistribution(tag))) => {
            assert_eq!(tag, "laplace")
        }
        other => panic!("expected an unknown distribution error, got {:?}", other),
    }
}
