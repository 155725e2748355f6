use crate::dataset::{ClassificationResult, FeatureVector, Label, LabelSet, LabeledInstance};
use crate::error::ModelError;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

/// Batches at least this large are classified on the rayon pool.
const CLASSIFY_PARALLEL_THRESHOLD: usize = 256;

/// One result of a nearest-neighbour query.
///
/// # Fields
///
/// - `point` - The stored feature vector
/// - `distance` - Euclidean distance from the query to `point`
/// - `index` - Insertion index of `point` in the index; used as the tie-break between equal distances
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor<'a> {
    pub point: &'a FeatureVector,
    pub distance: f64,
    pub index: usize,
}

/// Multi-dimensional point index answering exact k-nearest-neighbour queries.
///
/// The index is static while queries run: callers invoke [`optimize`](SpatialIndex::optimize)
/// once before a batch of lookups, after which the index is only read and may be shared
/// between threads.
pub trait SpatialIndex {
    /// Number of stored points.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dimension of the stored points, `None` while the index is empty.
    fn dimension(&self) -> Option<usize>;

    /// Rebalances the index so that queries run in near-logarithmic time.
    fn optimize(&mut self);

    /// Finds the `k` stored points closest to `query`.
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<Neighbor>)` - Exactly `k` neighbours, ascending by distance; equal distances are ordered by insertion index
    /// - `Err(ModelError::InputValidationError)` - If `k` is 0, `k` exceeds [`len`](SpatialIndex::len), or the query dimension differs from the stored points
    fn nearest(&self, query: &FeatureVector, k: usize) -> Result<Vec<Neighbor<'_>>, ModelError>;
}

/// A trained classifier mapping feature vectors to labels of a fixed label set.
pub trait Classifier<L: Label>: Sync {
    /// The labels this classifier can predict, in tie-break order.
    fn label_set(&self) -> &LabelSet<L>;

    /// Predicts the label of a single instance.
    fn classify(&self, instance: &FeatureVector) -> Result<L, ModelError>;

    /// Classifies every instance and pairs the prediction with the instance's true label.
    ///
    /// Large batches are processed in parallel; the output order always follows the input order.
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<ClassificationResult<L>>)` - One result per instance
    /// - `Err(ModelError)` - The first contract violation raised while classifying
    fn classify_batch(
        &self,
        instances: &[LabeledInstance<L>],
    ) -> Result<Vec<ClassificationResult<L>>, ModelError> {
        let progress_bar = ProgressBar::new(instances.len() as u64);
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} | {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );
        progress_bar.set_message("classifying");

        let classify_one =
            |instance: &LabeledInstance<L>| -> Result<ClassificationResult<L>, ModelError> {
                let predicted = self.classify(&instance.features)?;
                progress_bar.inc(1);
                Ok(ClassificationResult::new(instance.label.clone(), predicted))
            };

        let results: Result<Vec<ClassificationResult<L>>, ModelError> =
            if instances.len() >= CLASSIFY_PARALLEL_THRESHOLD {
                instances.par_iter().map(classify_one).collect()
            } else {
                instances.iter().map(classify_one).collect()
            };

        match &results {
            Ok(r) => progress_bar.finish_with_message(format!("{} instances classified", r.len())),
            Err(_) => progress_bar.abandon_with_message("classification aborted"),
        }

        results
    }
}
