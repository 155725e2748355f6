//! Supervised classification and evaluation.
//!
//! Two classifiers share one [`Classifier`](traits::Classifier) interface:
//! - [`KNN`](machine_learning::KNN) - distance-weighted k-nearest neighbours over a
//!   [`KdTree`](machine_learning::KdTree)
//! - [`NaiveBayes`](machine_learning::NaiveBayes) - per-class Gaussian and smoothed categorical
//!   attribute distributions
//!
//! Their predictions are scored by [`evaluate`](metric::evaluate), which builds a multi-class
//! confusion matrix with per-class, macro and micro precision, recall, fall-out and F-measure.
//!
//! # Examples
//! ```rust
//! use classeval::prelude::*;
//!
//! let row = |x: f64, y: f64| FeatureVector::new(vec![x, y]).unwrap();
//! let training = vec![
//!     LabeledInstance::new(row(0.0, 0.0), "a"),
//!     LabeledInstance::new(row(0.1, 0.2), "a"),
//!     LabeledInstance::new(row(0.9, 1.0), "b"),
//!     LabeledInstance::new(row(1.0, 0.8), "b"),
//! ];
//! let validation = vec![
//!     LabeledInstance::new(row(0.2, 0.1), "a"),
//!     LabeledInstance::new(row(0.8, 0.9), "b"),
//! ];
//! let labels = LabelSet::new(vec!["a", "b"]).unwrap();
//!
//! let knn = KNN::fit(3, &training, labels.clone()).unwrap();
//! let results = knn.classify_batch(&validation).unwrap();
//! let report = evaluate(&results, &labels).unwrap();
//! assert_eq!(report.macro_average().f_measure, 1.0);
//! ```

/// A macro that generates a getter method for any field.
///
/// This macro creates a public getter method that returns the value of the specified
/// field. The field type must be `Copy`.
///
/// # Parameters
///
/// - `$method_name` - The name of the getter method (e.g., get_k)
/// - `$field_name` - The name of the field to access (e.g., k)
/// - `$return_type` - The return type of the getter method
macro_rules! get_field {
    ($method_name:ident, $field_name:ident, $return_type:ty) => {
        #[doc = concat!("Gets the `", stringify!($field_name), "` field.\n\n")]
        #[doc = "# Returns\n\n"]
        #[doc = concat!("* `", stringify!($return_type), "` - The value of the `", stringify!($field_name), "` field")]
        pub fn $method_name(&self) -> $return_type {
            self.$field_name
        }
    };
}

/// A macro that generates a public getter method returning a reference to a field.
///
/// # Parameters
///
/// - `$method_name` - The identifier for the generated getter method name
/// - `$field_name` - The identifier of the struct field to access
/// - `$return_type` - The reference type returned, the field must deref-coerce into it
macro_rules! get_field_as_ref {
    ($method_name:ident, $field_name:ident, $return_type:ty) => {
        #[doc = concat!("Gets the `", stringify!($field_name), "` field.\n\n")]
        #[doc = "# Returns\n\n"]
        #[doc = concat!("* `", stringify!($return_type), "` - The value of the `", stringify!($field_name), "` field as a reference")]
        pub fn $method_name(&self) -> $return_type {
            &self.$field_name
        }
    };
}

/// Error types for contract violations and I/O failures
pub mod error;

/// Module `math` contains the numeric kernels of the classifiers.
///
/// - `squared_euclidean_distance_row` / `euclidean_distance_row` - distances between feature rows
/// - `gaussian_density` - normal probability density, a point mass for zero variance
/// - `mean` / `sample_variance` - parameter estimates for Gaussian attributes
pub mod math;

/// Feature vectors, labels, labeled instances and the comma-separated data loader.
///
/// # Examples
/// ```rust
/// use classeval::dataset::{FeatureVector, LabelLookup};
///
/// let mut lookup = LabelLookup::new();
/// lookup.insert(FeatureVector::new(vec![1.0, 2.0]).unwrap(), "a").unwrap();
/// assert_eq!(lookup.get(&FeatureVector::new(vec![1.0, 2.0]).unwrap()), Some(&"a"));
/// ```
pub mod dataset;

/// The `SpatialIndex` and `Classifier` traits
pub mod traits;

/// Classifiers and the spatial index they search.
///
/// # Classification
/// - **KNN**: Distance-weighted k-nearest neighbours, each neighbour votes with `1 / distance`
/// - **NaiveBayes**: Prior times the product of per-attribute densities
///
/// # Spatial Index
/// - **KdTree**: Balanced k-d tree with exact, deterministically ordered k-nearest-neighbour search
pub mod machine_learning;

/// Evaluation of classification results.
///
/// - **ConfusionMatrix**: Multi-class counts indexed predicted label first, true label second
/// - **ClassMetrics**: One-vs-rest TP, FP, FN, TN, precision, recall, fall-out and F-measure
/// - **AggregateMetrics**: Macro (unweighted) and micro (weighted by true-class size) averages
/// - **evaluate**: Builds an `EvaluationReport` from (true, predicted) pairs
pub mod metric;

/// Data preparation and persistence.
///
/// - **min_max_scale**: Per-attribute rescaling to `[0, 1]`
/// - **train_validation_split**: Seeded shuffle and split
/// - **save_json** / **load_json**: JSON persistence helpers
pub mod utility;

/// Command-line interface of the `classeval` binary
pub mod cli;

/// A convenience module that re-exports the most commonly used types and traits from this crate.
///
/// # Examples
/// ```rust
/// use classeval::prelude::*;
///
/// let labels = LabelSet::new(vec![1, 2, 3]).unwrap();
/// assert_eq!(labels.len(), 3);
/// ```
pub mod prelude;
