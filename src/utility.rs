use crate::dataset::{FeatureVector, Label, LabeledInstance};
use crate::error::ModelError;
use ndarray::{Array2, Axis};

/// Rescales every attribute to `[0, 1]` with min-max normalization
///
/// Each attribute value `x` becomes `(x - min) / (max - min)`, where `min` and `max` are taken
/// over the given instances. Attributes with `max == min` are left unchanged. Labels are kept.
///
/// # Parameters
///
/// * `instances` - The instances to rescale; all must share one dimension
///
/// # Returns
///
/// - `Ok(Vec<LabeledInstance<L>>)` - Rescaled copies, in input order
/// - `Err(ModelError::InputValidationError)` - If `instances` is empty or dimensions differ
///
/// # Examples
/// ```rust
/// use classeval::dataset::{FeatureVector, LabeledInstance};
/// use classeval::utility::min_max_scale;
///
/// let instances = vec![
///     LabeledInstance::new(FeatureVector::new(vec![0.0, 5.0]).unwrap(), 'a'),
///     LabeledInstance::new(FeatureVector::new(vec![10.0, 5.0]).unwrap(), 'b'),
///     LabeledInstance::new(FeatureVector::new(vec![2.5, 5.0]).unwrap(), 'a'),
/// ];
/// let scaled = min_max_scale(&instances).unwrap();
/// assert_eq!(scaled[2].features.to_vec(), vec![0.25, 5.0]);
/// ```
pub fn min_max_scale<L: Label>(
    instances: &[LabeledInstance<L>],
) -> Result<Vec<LabeledInstance<L>>, ModelError> {
    use rayon::prelude::*;

    let first = instances.first().ok_or_else(|| {
        ModelError::InputValidationError("Cannot rescale an empty data set".to_string())
    })?;
    let n_features = first.features.dimension();

    let mut x = Array2::<f64>::zeros((instances.len(), n_features));
    for (mut row, instance) in x.axis_iter_mut(Axis(0)).zip(instances) {
        if instance.features.dimension() != n_features {
            return Err(ModelError::InputValidationError(format!(
                "Feature dimension mismatch: expected {}, got {}",
                n_features,
                instance.features.dimension()
            )));
        }
        row.assign(&instance.features.view());
    }

    // (min, max) per column
    let bounds: Vec<(f64, f64)> = (0..n_features)
        .into_par_iter()
        .map(|j| {
            x.column(j)
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                    (lo.min(v), hi.max(v))
                })
        })
        .collect();

    for (mut column, &(min, max)) in x.axis_iter_mut(Axis(1)).zip(&bounds) {
        if max != min {
            column.mapv_inplace(|v| (v - min) / (max - min));
        }
    }

    x.axis_iter(Axis(0))
        .zip(instances)
        .map(|(row, instance)| {
            Ok(LabeledInstance::new(
                FeatureVector::new(row.to_vec())?,
                instance.label.clone(),
            ))
        })
        .collect()
}

/// JSON persistence of models and data sets
pub mod persistence;
/// Seeded shuffling split into training and validation sets
pub mod train_test_split;

pub use persistence::*;
pub use train_test_split::*;
