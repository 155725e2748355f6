pub use crate::dataset::{
    ClassificationResult, FeatureVector, Label, LabelLookup, LabelSet, LabeledInstance,
    collapse_one_hot, load_labeled_csv, parse_labeled_csv,
};
pub use crate::error::{IoError, ModelError};
pub use crate::machine_learning::{
    AttributeDistribution, AttributeKind, AttributeSchema, ClassModel, KNN, KdTree, NaiveBayes,
};
pub use crate::metric::{
    AggregateMetrics, ClassMetrics, ConfusionMatrix, EvaluationReport, evaluate,
};
pub use crate::traits::{Classifier, Neighbor, SpatialIndex};
pub use crate::utility::{load_json, min_max_scale, save_json, train_validation_split};
