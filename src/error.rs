use std::fs::File;
use std::io::BufReader;

/// Error types that can occur during classification and evaluation
///
/// Every variant is a contract violation: the offending call is aborted and the
/// error is surfaced to the caller, never replaced by a default.
///
/// # Variants
///
/// - `InputValidationError` - the input does not meet the expected format or validation rules (malformed k, empty sets, dimension mismatch, non-finite values)
/// - `UnknownLabel` - a label that is not a member of the label set, or a stored point without a label entry
/// - `UnknownDistribution` - a distribution-type tag that is neither `gaussian` nor `categorical`
/// - `MissingCategoricalValue` - a categorical attribute value absent from its distribution's domain
/// - `ProcessingError` - something went wrong while processing
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    InputValidationError(String),
    UnknownLabel(String),
    UnknownDistribution(String),
    MissingCategoricalValue {
        class: String,
        attribute: usize,
        value: f64,
    },
    ProcessingError(String),
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::InputValidationError(msg) => write!(f, "Input validation error: {}", msg),
            ModelError::UnknownLabel(msg) => write!(f, "Unknown label: {}", msg),
            ModelError::UnknownDistribution(tag) => write!(
                f,
                "Unknown distribution type '{}', expected 'gaussian' or 'categorical'",
                tag
            ),
            ModelError::MissingCategoricalValue {
                class,
                attribute,
                value,
            } => write!(
                f,
                "Value {} of categorical attribute {} is not in the domain of class {}",
                value, attribute, class
            ),
            ModelError::ProcessingError(msg) => write!(f, "Processing error: {}", msg),
        }
    }
}

impl std::error::Error for ModelError {}

/// Input/Output error types that can occur while loading data sets and persisting models
///
/// # Variants
///
/// - `StdIoError` - Wraps standard I/O errors from file system operations (reading, writing, file access)
/// - `JsonError` - Wraps JSON serialization/deserialization errors
/// - `ParseError` - A data file line could not be parsed; carries the 1-based line number
/// - `ModelError` - A contract violation raised while building a model from loaded data
#[derive(Debug)]
pub enum IoError {
    StdIoError(std::io::Error),
    JsonError(serde_json::Error),
    ParseError { line: usize, message: String },
    ModelError(ModelError),
}

impl IoError {
    pub fn load_in_buf_reader(path: &str) -> Result<BufReader<File>, IoError> {
        let file = File::open(path).map_err(IoError::StdIoError)?;
        Ok(BufReader::new(file))
    }
}

impl std::fmt::Display for IoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IoError::StdIoError(e) => write!(f, "IO error: {}", e),
            IoError::JsonError(e) => write!(f, "JSON error: {}", e),
            IoError::ParseError { line, message } => {
                write!(f, "Parse error on line {}: {}", line, message)
            }
            IoError::ModelError(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IoError::StdIoError(e) => Some(e),
            IoError::JsonError(e) => Some(e),
            IoError::ParseError { .. } => None,
            IoError::ModelError(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        IoError::StdIoError(e)
    }
}

impl From<serde_json::Error> for IoError {
    fn from(e: serde_json::Error) -> Self {
        IoError::JsonError(e)
    }
}

impl From<ModelError> for IoError {
    fn from(e: ModelError) -> Self {
        IoError::ModelError(e)
    }
}
