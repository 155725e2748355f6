use super::KdTree;
use super::helper_functions::{preliminary_check, validate_k};
use crate::dataset::{FeatureVector, Label, LabelLookup, LabelSet, LabeledInstance};
use crate::error::ModelError;
use crate::traits::{Classifier, SpatialIndex};

/// Distance-weighted k-Nearest Neighbours classifier
///
/// Classifies a query by retrieving its `k` nearest stored points from a [`SpatialIndex`]
/// and letting each neighbour vote for its label with weight `1 / distance`. The label with
/// the strictly largest accumulated weight wins; ties go to the label that comes first in the
/// [`LabelSet`].
///
/// A neighbour at distance exactly 0 (the query duplicates a stored point) decides the vote
/// on its own: its label is returned immediately.
///
/// # Type Parameters
///
/// - `L` - The label type
/// - `I` - The spatial index, [`KdTree`] by default
///
/// # Fields
///
/// - `k` - Number of neighbours to consider, `1 <= k <= index.len()`
/// - `index` - Spatial index over the stored feature vectors, optimized on construction
/// - `lookup` - Label of every stored feature vector
/// - `labels` - The ordered label set
///
/// # Examples
/// ```rust
/// use classeval::dataset::{FeatureVector, LabelSet, LabeledInstance};
/// use classeval::machine_learning::KNN;
/// use classeval::traits::Classifier;
///
/// let point = |x: f64, y: f64| FeatureVector::new(vec![x, y]).unwrap();
/// let training = vec![
///     LabeledInstance::new(point(1.0, 1.0), "A"),
///     LabeledInstance::new(point(1.0, 2.0), "A"),
///     LabeledInstance::new(point(8.0, 8.0), "B"),
///     LabeledInstance::new(point(9.0, 8.0), "B"),
/// ];
/// let labels = LabelSet::new(vec!["A", "B"]).unwrap();
///
/// let knn = KNN::fit(3, &training, labels).unwrap();
/// assert_eq!(knn.classify(&point(2.0, 2.0)).unwrap(), "A");
/// assert_eq!(knn.classify(&point(7.5, 8.5)).unwrap(), "B");
/// ```
#[derive(Debug, Clone)]
pub struct KNN<L: Label, I: SpatialIndex = KdTree> {
    k: usize,
    index: I,
    lookup: LabelLookup<L>,
    labels: LabelSet<L>,
}

impl<L: Label> KNN<L, KdTree> {
    /// Builds a k-d tree and label lookup from labeled training instances.
    ///
    /// # Parameters
    ///
    /// - `k` - Number of neighbours to use for classification
    /// - `training` - The stored points with their labels
    /// - `labels` - The label set; every training label must be a member
    ///
    /// # Returns
    ///
    /// - `Ok(KNN)` - The classifier, ready for queries
    /// - `Err(ModelError::InputValidationError)` - If `training` is empty, dimensions differ, a vector carries two labels, or `k` is out of range
    /// - `Err(ModelError::UnknownLabel)` - If a training label is not in `labels`
    pub fn fit(
        k: usize,
        training: &[LabeledInstance<L>],
        labels: LabelSet<L>,
    ) -> Result<Self, ModelError> {
        preliminary_check(training)?;

        let tree = KdTree::build(training.iter().map(|i| i.features.clone()).collect())?;
        let lookup = LabelLookup::from_pairs(
            training
                .iter()
                .map(|i| (i.features.clone(), i.label.clone())),
        )?;

        KNN::new(k, tree, lookup, labels)
    }
}

impl<L: Label, I: SpatialIndex> KNN<L, I> {
    /// Creates a classifier over an existing spatial index.
    ///
    /// The index is optimized for querying before it is stored.
    ///
    /// # Parameters
    ///
    /// - `k` - Number of neighbours to use for classification
    /// - `index` - Spatial index holding the stored feature vectors
    /// - `lookup` - Label of every feature vector stored in `index`
    /// - `labels` - The ordered label set
    ///
    /// # Returns
    ///
    /// - `Ok(KNN)` - The classifier
    /// - `Err(ModelError::InputValidationError)` - If `k` is 0 or exceeds the number of indexed points
    /// - `Err(ModelError::UnknownLabel)` - If `lookup` holds a label outside `labels`
    pub fn new(
        k: usize,
        mut index: I,
        lookup: LabelLookup<L>,
        labels: LabelSet<L>,
    ) -> Result<Self, ModelError> {
        validate_k(k, index.len())?;
        lookup.validate_against(&labels)?;

        index.optimize();

        Ok(KNN {
            k,
            index,
            lookup,
            labels,
        })
    }

    get_field!(get_k, k, usize);
    get_field_as_ref!(get_index, index, &I);
    get_field_as_ref!(get_lookup, lookup, &LabelLookup<L>);

    /// Accumulated inverse-distance weight per label, in label-set order.
    ///
    /// # Returns
    ///
    /// - `Ok(Ok(weights))` - The weights when no neighbour coincides with the query
    /// - `Ok(Err(label))` - The label of a neighbour at distance 0, which decides the vote
    /// - `Err(ModelError)` - If the query is invalid or a neighbour has no label
    fn vote(&self, instance: &FeatureVector) -> Result<Result<Vec<f64>, L>, ModelError> {
        let neighbours = self.index.nearest(instance, self.k)?;
        let mut weights = vec![0.0; self.labels.len()];

        for neighbour in neighbours {
            let label = self.lookup.get(neighbour.point).ok_or_else(|| {
                ModelError::UnknownLabel(format!(
                    "indexed point {} has no entry in the label lookup",
                    neighbour.index
                ))
            })?;
            let position = self.labels.require_index(label)?;

            if neighbour.distance == 0.0 {
                return Ok(Err(label.clone()));
            }
            weights[position] += 1.0 / neighbour.distance;
        }

        Ok(Ok(weights))
    }

    /// Inverse-distance weight accumulated by each label for `instance`.
    ///
    /// A neighbour at distance 0 is reported as an infinite weight for its label, all
    /// other labels get 0.
    pub fn label_weights(&self, instance: &FeatureVector) -> Result<Vec<f64>, ModelError> {
        match self.vote(instance)? {
            Ok(weights) => Ok(weights),
            Err(label) => {
                let mut weights = vec![0.0; self.labels.len()];
                weights[self.labels.require_index(&label)?] = f64::INFINITY;
                Ok(weights)
            }
        }
    }
}

impl<L: Label, I: SpatialIndex + Sync> Classifier<L> for KNN<L, I> {
    fn label_set(&self) -> &LabelSet<L> {
        &self.labels
    }

    fn classify(&self, instance: &FeatureVector) -> Result<L, ModelError> {
        let weights = match self.vote(instance)? {
            Ok(weights) => weights,
            Err(label) => return Ok(label),
        };

        let mut best: Option<(usize, f64)> = None;
        for (position, &weight) in weights.iter().enumerate() {
            match best {
                Some((_, best_weight)) if weight <= best_weight => {}
                _ => best = Some((position, weight)),
            }
        }

        best.and_then(|(position, _)| self.labels.get(position).cloned())
            .ok_or_else(|| ModelError::ProcessingError("label set is empty".to_string()))
    }
}
