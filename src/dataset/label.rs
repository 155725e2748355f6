use super::FeatureVector;
use crate::error::ModelError;
use ahash::AHashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Opaque, comparable class identifier.
///
/// Implemented for every type that can be hashed, compared, printed and shared between
/// worker threads, e.g. `i32`, `usize` or `String`.
pub trait Label: Clone + Eq + Hash + Debug + Display + Send + Sync {}

impl<T> Label for T where T: Clone + Eq + Hash + Debug + Display + Send + Sync {}

/// The fixed, finite, ordered set of labels known before classification starts.
///
/// The iteration order is the order given on construction. It drives every deterministic
/// tie-break in the classifiers and the layout of the evaluation report.
///
/// # Examples
/// ```rust
/// use classeval::dataset::LabelSet;
///
/// let labels = LabelSet::new(vec!["setosa", "versicolor", "virginica"]).unwrap();
/// assert_eq!(labels.len(), 3);
/// assert_eq!(labels.index_of(&"versicolor"), Some(1));
/// assert!(!labels.contains(&"rose"));
/// ```
#[derive(Debug, Clone)]
pub struct LabelSet<L: Label> {
    labels: Vec<L>,
    positions: AHashMap<L, usize>,
}

impl<L: Label> LabelSet<L> {
    /// Creates a label set.
    ///
    /// # Returns
    ///
    /// - `Ok(LabelSet)` - The ordered label set
    /// - `Err(ModelError::InputValidationError)` - If `labels` is empty or contains a duplicate
    pub fn new(labels: Vec<L>) -> Result<Self, ModelError> {
        if labels.is_empty() {
            return Err(ModelError::InputValidationError(
                "Label set must not be empty".to_string(),
            ));
        }

        let mut positions = AHashMap::with_capacity(labels.len());
        for (i, label) in labels.iter().enumerate() {
            if positions.insert(label.clone(), i).is_some() {
                return Err(ModelError::InputValidationError(format!(
                    "Label set contains duplicate label {}",
                    label
                )));
            }
        }

        Ok(LabelSet { labels, positions })
    }

    /// Collects the distinct labels in order of first appearance.
    pub fn from_observed<'a, I>(labels: I) -> Result<Self, ModelError>
    where
        I: IntoIterator<Item = &'a L>,
        L: 'a,
    {
        let mut seen = AHashMap::new();
        let mut ordered = Vec::new();
        for label in labels {
            if !seen.contains_key(label) {
                seen.insert(label.clone(), ordered.len());
                ordered.push(label.clone());
            }
        }
        LabelSet::new(ordered)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Always `false`: a label set is never empty.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn contains(&self, label: &L) -> bool {
        self.positions.contains_key(label)
    }

    /// Position of `label` in the set's iteration order.
    pub fn index_of(&self, label: &L) -> Option<usize> {
        self.positions.get(label).copied()
    }

    /// Like [`index_of`](Self::index_of) but reports a missing label as a contract violation.
    pub fn require_index(&self, label: &L) -> Result<usize, ModelError> {
        self.index_of(label).ok_or_else(|| {
            ModelError::UnknownLabel(format!("{} is not a member of the label set", label))
        })
    }

    pub fn get(&self, index: usize) -> Option<&L> {
        self.labels.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, L> {
        self.labels.iter()
    }

    pub fn as_slice(&self) -> &[L] {
        &self.labels
    }
}

impl<L: Label> PartialEq for LabelSet<L> {
    fn eq(&self, other: &Self) -> bool {
        self.labels == other.labels
    }
}

impl<'a, L: Label> IntoIterator for &'a LabelSet<L> {
    type Item = &'a L;
    type IntoIter = std::slice::Iter<'a, L>;

    fn into_iter(self) -> Self::IntoIter {
        self.labels.iter()
    }
}

/// Mapping from a stored feature vector to the label it belongs to.
///
/// Keys are unique. Inserting the same vector twice with the same label is accepted and
/// stored once; inserting it with a different label is rejected, since the neighbour vote
/// could not tell which label the point carries.
#[derive(Debug, Clone)]
pub struct LabelLookup<L: Label> {
    entries: AHashMap<FeatureVector, L>,
}

impl<L: Label> Default for LabelLookup<L> {
    fn default() -> Self {
        LabelLookup {
            entries: AHashMap::new(),
        }
    }
}

impl<L: Label> LabelLookup<L> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a lookup from `(vector, label)` pairs.
    ///
    /// # Returns
    ///
    /// - `Ok(LabelLookup)` - The lookup
    /// - `Err(ModelError::InputValidationError)` - If a vector appears with two different labels
    pub fn from_pairs<I>(pairs: I) -> Result<Self, ModelError>
    where
        I: IntoIterator<Item = (FeatureVector, L)>,
    {
        let mut lookup = LabelLookup::new();
        for (vector, label) in pairs {
            lookup.insert(vector, label)?;
        }
        Ok(lookup)
    }

    /// Associates `vector` with `label`.
    pub fn insert(&mut self, vector: FeatureVector, label: L) -> Result<(), ModelError> {
        match self.entries.get(&vector) {
            Some(existing) if *existing != label => Err(ModelError::InputValidationError(format!(
                "Feature vector {:?} is labeled both {} and {}",
                vector.to_vec(),
                existing,
                label
            ))),
            Some(_) => Ok(()),
            None => {
                self.entries.insert(vector, label);
                Ok(())
            }
        }
    }

    pub fn get(&self, vector: &FeatureVector) -> Option<&L> {
        self.entries.get(vector)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &L> {
        self.entries.values()
    }

    /// Checks that every stored label is a member of `labels`.
    pub fn validate_against(&self, labels: &LabelSet<L>) -> Result<(), ModelError> {
        for label in self.entries.values() {
            if !labels.contains(label) {
                return Err(ModelError::UnknownLabel(format!(
                    "{} is stored in the label lookup but is not a member of the label set",
                    label
                )));
            }
        }
        Ok(())
    }
}
