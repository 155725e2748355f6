/// This module provides helper functions for machine learning models
mod helper_functions;
/// k-d tree spatial index answering exact k-nearest-neighbour queries
pub mod kd_tree;
/// Distance-weighted k-Nearest Neighbours classifier
pub mod knn;
/// Naive Bayes classifier with Gaussian and categorical attribute distributions
pub mod naive_bayes;

pub use kd_tree::*;
pub use knn::*;
pub use naive_bayes::*;
