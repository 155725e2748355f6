use crate::error::ModelError;
use rand::{SeedableRng, rng, rngs::StdRng, seq::SliceRandom};

/// Splits a data set into training and validation sets
///
/// The instances are shuffled, then the first `floor(n - n * training_proportion)` of them
/// form the validation set and the rest the training set.
///
/// # Parameters
///
/// - `instances` - The data set
/// - `training_proportion` - Share of instances used for training, within (0, 1]
/// - `random_state` - Random seed; `None` shuffles with the thread-local generator
///
/// # Returns
///
/// - `Result<(Vec<T>, Vec<T>), ModelError>` - Returns a tuple `(training, validation)` if processing successfully
///
/// # Errors
///
/// - Returns `ModelError::InputValidationError` if the data set is empty or `training_proportion` is outside (0, 1].
///
/// # Example
/// ```rust
/// use classeval::utility::train_validation_split;
///
/// let data: Vec<u32> = (0..10).collect();
/// let (training, validation) = train_validation_split(&data, 0.8, Some(42)).unwrap();
/// assert_eq!(training.len(), 8);
/// assert_eq!(validation.len(), 2);
/// ```
pub fn train_validation_split<T: Clone>(
    instances: &[T],
    training_proportion: f64,
    random_state: Option<u64>,
) -> Result<(Vec<T>, Vec<T>), ModelError> {
    let n_samples = instances.len();

    if n_samples == 0 {
        return Err(ModelError::InputValidationError(
            "Cannot split empty dataset".to_string(),
        ));
    }

    if !(training_proportion > 0.0 && training_proportion <= 1.0) {
        return Err(ModelError::InputValidationError(format!(
            "training_proportion must be within (0, 1], got {}",
            training_proportion
        )));
    }

    let n = n_samples as f64;
    let n_validation = (n - n * training_proportion) as usize;

    let mut shuffled = instances.to_vec();
    match random_state {
        Some(seed) => {
            let mut rng = StdRng::seed_from_u64(seed);
            shuffled.shuffle(&mut rng);
        }
        None => {
            let mut rng = rng();
            shuffled.shuffle(&mut rng);
        }
    }

    let training = shuffled.split_off(n_validation);
    Ok((training, shuffled))
}
