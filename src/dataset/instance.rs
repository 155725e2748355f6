use super::{FeatureVector, Label};
use serde::{Deserialize, Serialize};

/// A feature vector together with the label it truly belongs to.
///
/// Used for training and validation. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledInstance<L> {
    pub features: FeatureVector,
    pub label: L,
}

impl<L: Label> LabeledInstance<L> {
    pub fn new(features: FeatureVector, label: L) -> Self {
        LabeledInstance { features, label }
    }
}

/// Outcome of classifying one validation instance: its true label and the predicted one.
///
/// The sole input unit of the evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult<L> {
    pub actual: L,
    pub predicted: L,
}

impl<L: Label> ClassificationResult<L> {
    pub fn new(actual: L, predicted: L) -> Self {
        ClassificationResult { actual, predicted }
    }

    pub fn is_correct(&self) -> bool {
        self.actual == self.predicted
    }
}
