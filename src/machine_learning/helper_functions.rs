use crate::dataset::{Label, LabeledInstance};
use crate::error::ModelError;

/// Performs validation checks on a training set.
///
/// This function validates that:
/// - The training set is not empty
/// - Every instance has the same number of attributes as the first one
///
/// Non-finite values cannot occur, [`FeatureVector`](crate::dataset::FeatureVector) rejects
/// them on construction.
///
/// # Parameters
///
/// - `training` - The labeled training instances
///
/// # Returns
///
/// - `Ok(usize)` - The shared attribute count
/// - `Err(ModelError::InputValidationError)` - If any validation check fails
pub fn preliminary_check<L: Label>(training: &[LabeledInstance<L>]) -> Result<usize, ModelError> {
    let first = training.first().ok_or_else(|| {
        ModelError::InputValidationError("Training set is empty".to_string())
    })?;

    let dimension = first.features.dimension();
    for (i, instance) in training.iter().enumerate() {
        if instance.features.dimension() != dimension {
            return Err(ModelError::InputValidationError(format!(
                "Training instance {} has {} attributes, expected {}",
                i,
                instance.features.dimension(),
                dimension
            )));
        }
    }

    Ok(dimension)
}

/// Validates the neighbour count of a KNN classifier.
///
/// # Parameters
///
/// * `k` - Number of neighbours
/// * `n_points` - Number of points available in the spatial index
///
/// # Returns
///
/// - `Ok(())` - If `1 <= k <= n_points`
/// - `Err(ModelError::InputValidationError)` - Otherwise
pub fn validate_k(k: usize, n_points: usize) -> Result<(), ModelError> {
    if k == 0 {
        return Err(ModelError::InputValidationError(
            "k must be greater than 0".to_string(),
        ));
    }

    if k > n_points {
        return Err(ModelError::InputValidationError(format!(
            "k ({}) cannot be larger than the number of stored points ({})",
            k, n_points
        )));
    }

    Ok(())
}

/// Validates a class prior probability.
///
/// # Returns
///
/// - `Ok(())` - If `prior` is finite and within `[0, 1]`
/// - `Err(ModelError::InputValidationError)` - Otherwise
pub fn validate_prior(prior: f64) -> Result<(), ModelError> {
    if !prior.is_finite() || !(0.0..=1.0).contains(&prior) {
        return Err(ModelError::InputValidationError(format!(
            "Prior probability must be within [0, 1], got {}",
            prior
        )));
    }
    Ok(())
}
