use super::helper_functions::{preliminary_check, validate_prior};
use crate::dataset::{FeatureVector, Label, LabelSet, LabeledInstance};
use crate::error::{IoError, ModelError};
use crate::math::{gaussian_density, mean, sample_variance};
use crate::traits::Classifier;
use crate::utility::{load_json, save_json};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;

/// Categorical probabilities of one attribute must sum to 1 within this tolerance.
const PROBABILITY_SUM_TOLERANCE: f64 = 1e-9;

/// How an attribute is modelled inside a class.
///
/// # Variants
///
/// - `Continuous` - Real-valued, modelled by a Gaussian
/// - `Categorical` - Integer codes `0..cardinality`, modelled by a smoothed frequency table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttributeKind {
    Continuous,
    Categorical { cardinality: usize },
}

/// Declares the kind of every attribute position of a data set.
///
/// # Examples
/// ```rust
/// use classeval::machine_learning::{AttributeKind, AttributeSchema};
///
/// let schema = AttributeSchema::with_categorical(4, &[(1, 3)]).unwrap();
/// assert_eq!(schema.kind(0), Some(AttributeKind::Continuous));
/// assert_eq!(schema.kind(1), Some(AttributeKind::Categorical { cardinality: 3 }));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSchema {
    kinds: Vec<AttributeKind>,
}

impl AttributeSchema {
    /// Creates a schema from explicit attribute kinds.
    ///
    /// # Returns
    ///
    /// - `Ok(AttributeSchema)` - The schema
    /// - `Err(ModelError::InputValidationError)` - If `kinds` is empty or a categorical attribute has cardinality 0
    pub fn new(kinds: Vec<AttributeKind>) -> Result<Self, ModelError> {
        if kinds.is_empty() {
            return Err(ModelError::InputValidationError(
                "Attribute schema must declare at least one attribute".to_string(),
            ));
        }

        if let Some(i) = kinds
            .iter()
            .position(|k| matches!(k, AttributeKind::Categorical { cardinality: 0 }))
        {
            return Err(ModelError::InputValidationError(format!(
                "Categorical attribute {} must have a cardinality greater than 0",
                i
            )));
        }

        Ok(AttributeSchema { kinds })
    }

    /// Schema of `n_attributes` continuous attributes.
    pub fn continuous(n_attributes: usize) -> Result<Self, ModelError> {
        AttributeSchema::new(vec![AttributeKind::Continuous; n_attributes])
    }

    /// Schema of `n_attributes` attributes, continuous except for the listed
    /// `(index, cardinality)` pairs.
    pub fn with_categorical(
        n_attributes: usize,
        categorical: &[(usize, usize)],
    ) -> Result<Self, ModelError> {
        let mut kinds = vec![AttributeKind::Continuous; n_attributes];
        for &(index, cardinality) in categorical {
            let kind = kinds.get_mut(index).ok_or_else(|| {
                ModelError::InputValidationError(format!(
                    "Categorical attribute index {} is out of range for {} attributes",
                    index, n_attributes
                ))
            })?;
            *kind = AttributeKind::Categorical { cardinality };
        }
        AttributeSchema::new(kinds)
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn kind(&self, index: usize) -> Option<AttributeKind> {
        self.kinds.get(index).copied()
    }

    pub fn kinds(&self) -> &[AttributeKind] {
        &self.kinds
    }
}

/// Wire form of a distribution: a type tag and its parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawDistribution {
    #[serde(rename = "type")]
    kind: String,
    parameters: Value,
}

#[derive(Debug, Deserialize)]
struct GaussianParameters {
    mean: f64,
    variance: f64,
}

/// Distribution of one attribute within one class.
///
/// Serialized as `{"type": "gaussian" | "categorical", "parameters": {...}}`.
///
/// # Variants
///
/// - `Gaussian` - Normal distribution with the given mean and variance
/// - `Categorical` - Probability of every integer code in the attribute's domain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDistribution", into = "RawDistribution")]
pub enum AttributeDistribution {
    Gaussian { mean: f64, variance: f64 },
    Categorical { probabilities: BTreeMap<i64, f64> },
}

impl AttributeDistribution {
    /// Builds a distribution from a type tag and its JSON parameters.
    ///
    /// # Returns
    ///
    /// - `Ok(AttributeDistribution)` - The validated distribution
    /// - `Err(ModelError::UnknownDistribution)` - If `kind` is neither `gaussian` nor `categorical`
    /// - `Err(ModelError::InputValidationError)` - If the parameters are malformed
    pub fn from_tagged(kind: &str, parameters: Value) -> Result<Self, ModelError> {
        let distribution = match kind {
            "gaussian" => {
                let p: GaussianParameters = serde_json::from_value(parameters).map_err(|e| {
                    ModelError::InputValidationError(format!("Invalid gaussian parameters: {}", e))
                })?;
                AttributeDistribution::Gaussian {
                    mean: p.mean,
                    variance: p.variance,
                }
            }
            "categorical" => {
                let probabilities: BTreeMap<i64, f64> = serde_json::from_value(parameters)
                    .map_err(|e| {
                        ModelError::InputValidationError(format!(
                            "Invalid categorical parameters: {}",
                            e
                        ))
                    })?;
                AttributeDistribution::Categorical { probabilities }
            }
            other => return Err(ModelError::UnknownDistribution(other.to_string())),
        };

        distribution.validate()?;
        Ok(distribution)
    }

    /// Fits a Gaussian with the sample mean and sample variance of `values`.
    ///
    /// With fewer than two values the variance is 0 and the distribution is a point mass.
    pub fn fit_gaussian(values: &[f64]) -> Self {
        AttributeDistribution::Gaussian {
            mean: mean(values),
            variance: sample_variance(values),
        }
    }

    /// Fits a frequency table over the domain `0..cardinality`.
    ///
    /// Raw frequencies are used when every domain value occurs in `values`. Otherwise the
    /// whole table is m-estimated with equivalent sample size `n` and uniform prior
    /// `1 / cardinality`: `(count + n / cardinality) / (n + n)`. An unobserved value
    /// therefore gets `1 / (2 * cardinality)` and the table still sums to 1.
    ///
    /// # Returns
    ///
    /// - `Ok(AttributeDistribution::Categorical)` - The table
    /// - `Err(ModelError::InputValidationError)` - If `values` is empty, `cardinality` is 0, or a value is not a code of the domain
    pub fn fit_categorical(values: &[f64], cardinality: usize) -> Result<Self, ModelError> {
        if values.is_empty() || cardinality == 0 {
            return Err(ModelError::InputValidationError(
                "Categorical fitting needs at least one value and a non-empty domain".to_string(),
            ));
        }

        let mut counts = vec![0usize; cardinality];
        for &value in values {
            let code = categorical_code(value)
                .and_then(|c| usize::try_from(c).ok())
                .filter(|&c| c < cardinality)
                .ok_or_else(|| {
                    ModelError::InputValidationError(format!(
                        "Value {} is not a code of the domain 0..{}",
                        value, cardinality
                    ))
                })?;
            counts[code] += 1;
        }

        let n = values.len() as f64;
        let smoothed = counts.contains(&0);
        let sample_size = n;
        let prior_estimate = 1.0 / cardinality as f64;

        let probabilities = counts
            .iter()
            .enumerate()
            .map(|(code, &count)| {
                let count = count as f64;
                let probability = if smoothed {
                    (count + sample_size * prior_estimate) / (sample_size + n)
                } else {
                    count / n
                };
                (code as i64, probability)
            })
            .collect();

        Ok(AttributeDistribution::Categorical { probabilities })
    }

    /// Type tag used in the serialized form.
    pub fn kind_name(&self) -> &'static str {
        match self {
            AttributeDistribution::Gaussian { .. } => "gaussian",
            AttributeDistribution::Categorical { .. } => "categorical",
        }
    }

    /// Density (Gaussian) or probability (categorical) of `value`.
    ///
    /// Returns `None` when `value` is not a code present in a categorical domain.
    pub fn density(&self, value: f64) -> Option<f64> {
        match self {
            AttributeDistribution::Gaussian { mean, variance } => {
                Some(gaussian_density(*mean, *variance, value))
            }
            AttributeDistribution::Categorical { probabilities } => {
                categorical_code(value).and_then(|code| probabilities.get(&code).copied())
            }
        }
    }

    fn validate(&self) -> Result<(), ModelError> {
        match self {
            AttributeDistribution::Gaussian { mean, variance } => {
                if !mean.is_finite() || !variance.is_finite() || *variance < 0.0 {
                    return Err(ModelError::InputValidationError(format!(
                        "Gaussian needs a finite mean and non-negative variance, got {} and {}",
                        mean, variance
                    )));
                }
            }
            AttributeDistribution::Categorical { probabilities } => {
                if probabilities.is_empty() {
                    return Err(ModelError::InputValidationError(
                        "Categorical distribution has an empty domain".to_string(),
                    ));
                }
                if let Some((code, p)) = probabilities
                    .iter()
                    .find(|&(_, p)| !(0.0..=1.0).contains(p))
                {
                    return Err(ModelError::InputValidationError(format!(
                        "Probability of value {} is {}, expected a value within [0, 1]",
                        code, p
                    )));
                }
                let sum: f64 = probabilities.values().sum();
                if (sum - 1.0).abs() > PROBABILITY_SUM_TOLERANCE {
                    return Err(ModelError::InputValidationError(format!(
                        "Categorical probabilities sum to {}, expected 1",
                        sum
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Integer code of a categorical value, `None` for non-integral values.
fn categorical_code(value: f64) -> Option<i64> {
    if value.is_finite() && value.fract() == 0.0 {
        Some(value as i64)
    } else {
        None
    }
}

impl TryFrom<RawDistribution> for AttributeDistribution {
    type Error = ModelError;

    fn try_from(raw: RawDistribution) -> Result<Self, Self::Error> {
        AttributeDistribution::from_tagged(&raw.kind, raw.parameters)
    }
}

impl From<AttributeDistribution> for RawDistribution {
    fn from(distribution: AttributeDistribution) -> Self {
        let kind = distribution.kind_name().to_string();
        let parameters = match distribution {
            AttributeDistribution::Gaussian { mean, variance } => {
                json!({ "mean": mean, "variance": variance })
            }
            AttributeDistribution::Categorical { probabilities } => Value::Object(
                probabilities
                    .into_iter()
                    .map(|(code, p)| (code.to_string(), json!(p)))
                    .collect(),
            ),
        };
        RawDistribution { kind, parameters }
    }
}

/// Per-class Naive Bayes model: prior and one distribution per attribute position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassModel<L> {
    label: L,
    prior: f64,
    distributions: Vec<AttributeDistribution>,
}

/// Serialized `ClassModel` with its distributions still in wire form, so that a bad
/// distribution tag surfaces as a typed error instead of a JSON error.
#[derive(Debug, Deserialize)]
struct ClassModelRecord<L> {
    label: L,
    prior: f64,
    distributions: Vec<RawDistribution>,
}

impl<L: Label> ClassModel<L> {
    /// Creates a class model from known parameters.
    ///
    /// # Returns
    ///
    /// - `Ok(ClassModel)` - The model
    /// - `Err(ModelError::InputValidationError)` - If the prior is outside `[0, 1]`, no distribution is given, or a distribution is malformed
    pub fn new(
        label: L,
        prior: f64,
        distributions: Vec<AttributeDistribution>,
    ) -> Result<Self, ModelError> {
        validate_prior(prior)?;
        if distributions.is_empty() {
            return Err(ModelError::InputValidationError(format!(
                "Class {} has no attribute distributions",
                label
            )));
        }
        for distribution in &distributions {
            distribution.validate()?;
        }

        Ok(ClassModel {
            label,
            prior,
            distributions,
        })
    }

    /// Fits one distribution per attribute from the instances of a single class.
    ///
    /// # Parameters
    ///
    /// - `label` - The class
    /// - `instances` - Feature vectors of the class's training instances
    /// - `schema` - Kind of every attribute
    /// - `prior` - Prior probability of the class
    ///
    /// # Returns
    ///
    /// - `Ok(ClassModel)` - The fitted model
    /// - `Err(ModelError::InputValidationError)` - If the class has no instances, an instance does not match the schema, or the prior is invalid
    pub fn fit(
        label: L,
        instances: &[&FeatureVector],
        schema: &AttributeSchema,
        prior: f64,
    ) -> Result<Self, ModelError> {
        if instances.is_empty() {
            return Err(ModelError::InputValidationError(format!(
                "Class {} has no training instances",
                label
            )));
        }

        if let Some(bad) = instances.iter().find(|f| f.dimension() != schema.len()) {
            return Err(ModelError::InputValidationError(format!(
                "Class {} has an instance with {} attributes, schema declares {}",
                label,
                bad.dimension(),
                schema.len()
            )));
        }

        let distributions = schema
            .kinds()
            .iter()
            .enumerate()
            .map(|(attribute, kind)| {
                let column: Vec<f64> = instances
                    .iter()
                    .filter_map(|f| f.get(attribute))
                    .collect();
                match kind {
                    AttributeKind::Continuous => Ok(AttributeDistribution::fit_gaussian(&column)),
                    AttributeKind::Categorical { cardinality } => {
                        AttributeDistribution::fit_categorical(&column, *cardinality).map_err(
                            |e| {
                                ModelError::InputValidationError(format!(
                                    "Class {}, attribute {}: {}",
                                    label, attribute, e
                                ))
                            },
                        )
                    }
                }
            })
            .collect::<Result<Vec<_>, ModelError>>()?;

        ClassModel::new(label, prior, distributions)
    }

    get_field_as_ref!(get_label, label, &L);
    get_field!(get_prior, prior, f64);
    get_field_as_ref!(get_distributions, distributions, &[AttributeDistribution]);

    /// Comparative score `prior * product of attribute densities` of `instance`.
    ///
    /// # Returns
    ///
    /// - `Ok(f64)` - The score
    /// - `Err(ModelError::InputValidationError)` - If the instance's dimension differs from the model's
    /// - `Err(ModelError::MissingCategoricalValue)` - If a categorical value is not in its domain
    pub fn score(&self, instance: &FeatureVector) -> Result<f64, ModelError> {
        if instance.dimension() != self.distributions.len() {
            return Err(ModelError::InputValidationError(format!(
                "Instance has {} attributes, model of class {} expects {}",
                instance.dimension(),
                self.label,
                self.distributions.len()
            )));
        }

        self.distributions
            .iter()
            .zip(instance.iter())
            .enumerate()
            .try_fold(self.prior, |score, (attribute, (distribution, &value))| {
                distribution
                    .density(value)
                    .map(|density| score * density)
                    .ok_or_else(|| ModelError::MissingCategoricalValue {
                        class: self.label.to_string(),
                        attribute,
                        value,
                    })
            })
    }
}

/// Naive Bayes classifier over per-class attribute distributions
///
/// Scores every class with `prior * product of attribute densities` and predicts the class
/// with the strictly highest score. The running maximum starts at -1 and the running choice
/// at the first class, so an all-zero score vector predicts the first class, and ties go to
/// the class that comes first.
///
/// # Examples
/// ```rust
/// use classeval::dataset::{FeatureVector, LabelSet, LabeledInstance};
/// use classeval::machine_learning::{AttributeSchema, NaiveBayes};
/// use classeval::traits::Classifier;
///
/// let row = |x: f64, c: f64| FeatureVector::new(vec![x, c]).unwrap();
/// let training = vec![
///     LabeledInstance::new(row(1.0, 0.0), "low"),
///     LabeledInstance::new(row(1.4, 0.0), "low"),
///     LabeledInstance::new(row(1.2, 1.0), "low"),
///     LabeledInstance::new(row(8.8, 1.0), "high"),
///     LabeledInstance::new(row(9.1, 1.0), "high"),
///     LabeledInstance::new(row(9.4, 1.0), "high"),
/// ];
/// let labels = LabelSet::new(vec!["low", "high"]).unwrap();
/// let schema = AttributeSchema::with_categorical(2, &[(1, 2)]).unwrap();
///
/// let nb = NaiveBayes::fit(&training, labels, &schema).unwrap();
/// assert_eq!(nb.classify(&row(1.1, 1.0)).unwrap(), "low");
/// assert_eq!(nb.classify(&row(9.0, 1.0)).unwrap(), "high");
/// ```
#[derive(Debug, Clone)]
pub struct NaiveBayes<L: Label> {
    models: Vec<ClassModel<L>>,
    labels: LabelSet<L>,
}

impl<L: Label> NaiveBayes<L> {
    /// Creates a classifier from per-class models, one per label, in tie-break order.
    ///
    /// # Returns
    ///
    /// - `Ok(NaiveBayes)` - The classifier
    /// - `Err(ModelError::InputValidationError)` - If `models` is empty, holds two models for one class, models disagree on the attribute count or kinds, or a prior or distribution is malformed
    pub fn from_models(models: Vec<ClassModel<L>>) -> Result<Self, ModelError> {
        let labels = LabelSet::new(models.iter().map(|m| m.label.clone()).collect())?;

        let reference = &models[0];
        for model in &models {
            validate_prior(model.prior)?;

            if model.distributions.len() != reference.distributions.len() {
                return Err(ModelError::InputValidationError(format!(
                    "Class {} has {} attribute distributions, class {} has {}",
                    model.label,
                    model.distributions.len(),
                    reference.label,
                    reference.distributions.len()
                )));
            }

            for (attribute, (distribution, expected)) in model
                .distributions
                .iter()
                .zip(&reference.distributions)
                .enumerate()
            {
                distribution.validate()?;
                if distribution.kind_name() != expected.kind_name() {
                    return Err(ModelError::InputValidationError(format!(
                        "Attribute {} is {} for class {} but {} for class {}",
                        attribute,
                        distribution.kind_name(),
                        model.label,
                        expected.kind_name(),
                        reference.label
                    )));
                }
            }
        }

        Ok(NaiveBayes { models, labels })
    }

    /// Fits the classifier from a labeled training set.
    ///
    /// Priors are the class frequencies in `training`. One [`ClassModel`] is fitted per label,
    /// in `labels` order.
    ///
    /// # Returns
    ///
    /// - `Ok(NaiveBayes)` - The fitted classifier
    /// - `Err(ModelError::InputValidationError)` - If `training` is empty, does not match `schema`, or a label has no training instance
    /// - `Err(ModelError::UnknownLabel)` - If a training label is not in `labels`
    pub fn fit(
        training: &[LabeledInstance<L>],
        labels: LabelSet<L>,
        schema: &AttributeSchema,
    ) -> Result<Self, ModelError> {
        let dimension = preliminary_check(training)?;
        if dimension != schema.len() {
            return Err(ModelError::InputValidationError(format!(
                "Training instances have {} attributes, schema declares {}",
                dimension,
                schema.len()
            )));
        }

        let mut grouped: Vec<Vec<&FeatureVector>> = vec![Vec::new(); labels.len()];
        for instance in training {
            grouped[labels.require_index(&instance.label)?].push(&instance.features);
        }

        let n = training.len() as f64;
        let models = labels
            .iter()
            .zip(&grouped)
            .map(|(label, instances)| {
                ClassModel::fit(
                    label.clone(),
                    instances,
                    schema,
                    instances.len() as f64 / n,
                )
            })
            .collect::<Result<Vec<_>, ModelError>>()?;

        Ok(NaiveBayes { models, labels })
    }

    get_field_as_ref!(get_models, models, &[ClassModel<L>]);

    /// Score of every class for `instance`, in label-set order.
    pub fn scores(&self, instance: &FeatureVector) -> Result<Vec<f64>, ModelError> {
        self.models.iter().map(|m| m.score(instance)).collect()
    }

    /// Writes the class models to a JSON file.
    pub fn save_models(&self, path: &str) -> Result<(), IoError>
    where
        L: Serialize,
    {
        save_json(&self.models, path)
    }

    /// Reads class models written by [`save_models`](Self::save_models).
    ///
    /// # Returns
    ///
    /// - `Ok(NaiveBayes)` - The classifier
    /// - `Err(IoError::ModelError(ModelError::UnknownDistribution))` - If a distribution carries an unknown type tag
    /// - `Err(IoError)` - If the file cannot be read or parsed, or the models are invalid
    pub fn load_models(path: &str) -> Result<Self, IoError>
    where
        L: DeserializeOwned,
    {
        let records: Vec<ClassModelRecord<L>> = load_json(path)?;

        let models = records
            .into_iter()
            .map(|record| {
                let distributions = record
                    .distributions
                    .into_iter()
                    .map(AttributeDistribution::try_from)
                    .collect::<Result<Vec<_>, ModelError>>()?;
                ClassModel::new(record.label, record.prior, distributions)
            })
            .collect::<Result<Vec<_>, ModelError>>()?;

        Ok(NaiveBayes::from_models(models)?)
    }
}

impl<L: Label> Classifier<L> for NaiveBayes<L> {
    fn label_set(&self) -> &LabelSet<L> {
        &self.labels
    }

    fn classify(&self, instance: &FeatureVector) -> Result<L, ModelError> {
        let mut max_score = -1.0;
        let mut max_index = 0;
        for (i, model) in self.models.iter().enumerate() {
            let score = model.score(instance)?;
            if score > max_score {
                max_score = score;
                max_index = i;
            }
        }

        self.labels
            .get(max_index)
            .cloned()
            .ok_or_else(|| ModelError::ProcessingError("no class models".to_string()))
    }
}
