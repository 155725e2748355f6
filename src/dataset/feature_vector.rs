use crate::error::ModelError;
use crate::math::euclidean_distance_row;
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// An ordered, fixed-length tuple of numeric attribute values.
///
/// Values are either continuous measurements or integer-coded categorical values.
/// A `FeatureVector` is immutable once constructed and compares and hashes componentwise,
/// so it can be used directly as a map key (see [`LabelLookup`](super::LabelLookup)).
/// `-0.0` and `0.0` are treated as the same component.
///
/// # Examples
/// ```rust
/// use classeval::dataset::FeatureVector;
///
/// let a = FeatureVector::new(vec![0.0, 3.0]).unwrap();
/// let b = FeatureVector::new(vec![4.0, 0.0]).unwrap();
/// assert_eq!(a.dimension(), 2);
/// assert!((a.distance(&b).unwrap() - 5.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct FeatureVector {
    values: Array1<f64>,
}

impl FeatureVector {
    /// Creates a feature vector from its components.
    ///
    /// # Parameters
    ///
    /// * `values` - Attribute values in attribute order
    ///
    /// # Returns
    ///
    /// - `Ok(FeatureVector)` - The immutable vector
    /// - `Err(ModelError::InputValidationError)` - If `values` is empty or contains NaN / infinite values
    pub fn new(values: Vec<f64>) -> Result<Self, ModelError> {
        if values.is_empty() {
            return Err(ModelError::InputValidationError(
                "Feature vector must have at least one attribute".to_string(),
            ));
        }

        if let Some(position) = values.iter().position(|v| !v.is_finite()) {
            return Err(ModelError::InputValidationError(format!(
                "Feature vector contains NaN or infinite value at attribute {}",
                position
            )));
        }

        Ok(FeatureVector {
            values: Array1::from(values),
        })
    }

    /// Number of attributes.
    pub fn dimension(&self) -> usize {
        self.values.len()
    }

    /// Value of attribute `index`, or `None` when out of range.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.values.iter()
    }

    pub fn view(&self) -> ArrayView1<'_, f64> {
        self.values.view()
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.values.to_vec()
    }

    /// Euclidean distance to `other`.
    ///
    /// # Returns
    ///
    /// - `Ok(f64)` - The distance
    /// - `Err(ModelError::InputValidationError)` - If the two vectors differ in dimension
    pub fn distance(&self, other: &FeatureVector) -> Result<f64, ModelError> {
        if self.dimension() != other.dimension() {
            return Err(ModelError::InputValidationError(format!(
                "Feature dimension mismatch: expected {}, got {}",
                self.dimension(),
                other.dimension()
            )));
        }
        Ok(euclidean_distance_row(&self.values, &other.values))
    }
}

// -0.0 and 0.0 must hash and compare identically
#[inline]
fn canonical_bits(value: f64) -> u64 {
    if value == 0.0 {
        0.0f64.to_bits()
    } else {
        value.to_bits()
    }
}

impl PartialEq for FeatureVector {
    fn eq(&self, other: &Self) -> bool {
        self.values.len() == other.values.len()
            && self
                .values
                .iter()
                .zip(other.values.iter())
                .all(|(&a, &b)| canonical_bits(a) == canonical_bits(b))
    }
}

impl Eq for FeatureVector {}

impl Hash for FeatureVector {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.values.len().hash(state);
        for &value in self.values.iter() {
            canonical_bits(value).hash(state);
        }
    }
}

impl TryFrom<Vec<f64>> for FeatureVector {
    type Error = ModelError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        FeatureVector::new(values)
    }
}

impl From<FeatureVector> for Vec<f64> {
    fn from(vector: FeatureVector) -> Self {
        vector.values.to_vec()
    }
}
