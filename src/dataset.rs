/// Immutable numeric feature vectors with structural equality and hashing
pub mod feature_vector;
/// Labeled instances and (true, predicted) classification results
pub mod instance;
/// Ordered label sets and the feature-vector to label lookup
pub mod label;
/// Parsing of comma-separated data files into labeled instances
pub mod parser;

pub use feature_vector::*;
pub use instance::*;
pub use label::*;
pub use parser::*;
