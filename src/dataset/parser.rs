use super::{FeatureVector, LabeledInstance};
use crate::error::{IoError, ModelError};
use std::io::Read;

/// Parses comma-separated rows into labeled instances.
///
/// The last column of each row is the label (surrounding whitespace trimmed); every
/// other column must parse as a number. Blank lines are skipped.
///
/// # Parameters
///
/// * `text` - The file content
///
/// # Returns
///
/// - `Ok(Vec<LabeledInstance<String>>)` - The instances in file order
/// - `Err(IoError::ParseError)` - If a row has no attribute columns, a value is not numeric, or rows differ in width
///
/// # Examples
/// ```rust
/// use classeval::dataset::parse_labeled_csv;
///
/// let data = "5.1,3.5,1.4,0.2,Iris-setosa\n7.0,3.2,4.7,1.4,Iris-versicolor\n";
/// let instances = parse_labeled_csv(data).unwrap();
/// assert_eq!(instances.len(), 2);
/// assert_eq!(instances[1].label, "Iris-versicolor");
/// assert_eq!(instances[0].features.dimension(), 4);
/// ```
pub fn parse_labeled_csv(text: &str) -> Result<Vec<LabeledInstance<String>>, IoError> {
    let mut instances = Vec::new();
    let mut width: Option<usize> = None;

    for (i, line) in text.lines().enumerate() {
        let line_number = i + 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let tokens: Vec<&str> = line.split(',').map(str::trim).collect();
        if tokens.len() < 2 {
            return Err(IoError::ParseError {
                line: line_number,
                message: "expected at least one attribute followed by a label".to_string(),
            });
        }

        match width {
            Some(w) if w != tokens.len() => {
                return Err(IoError::ParseError {
                    line: line_number,
                    message: format!("expected {} columns, found {}", w, tokens.len()),
                });
            }
            None => width = Some(tokens.len()),
            _ => {}
        }

        let (attributes, label) = tokens.split_at(tokens.len() - 1);
        let mut values = Vec::with_capacity(attributes.len());
        for (column, token) in attributes.iter().enumerate() {
            let value = token.parse::<f64>().map_err(|e| IoError::ParseError {
                line: line_number,
                message: format!("column {}: '{}' is not a number ({})", column, token, e),
            })?;
            values.push(value);
        }

        let features = FeatureVector::new(values).map_err(|e| IoError::ParseError {
            line: line_number,
            message: e.to_string(),
        })?;
        instances.push(LabeledInstance::new(features, label[0].to_string()));
    }

    Ok(instances)
}

/// Reads and parses a comma-separated data file, see [`parse_labeled_csv`].
pub fn load_labeled_csv(path: &str) -> Result<Vec<LabeledInstance<String>>, IoError> {
    let mut reader = IoError::load_in_buf_reader(path)?;
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    parse_labeled_csv(&text)
}

/// Replaces a one-hot encoded block of attributes by the index of its set column.
///
/// The block `values[start..start + width]` collapses into a single integer-coded
/// categorical attribute placed at position `start`; the attributes after the block shift
/// left by `width - 1`.
///
/// # Returns
///
/// - `Ok(Vec<f64>)` - The collapsed attribute values
/// - `Err(ModelError::InputValidationError)` - If the block is empty, out of range, or has no column equal to `1`
///
/// # Examples
/// ```rust
/// use classeval::dataset::collapse_one_hot;
///
/// let collapsed = collapse_one_hot(&[2.5, 0.0, 0.0, 1.0, 0.0, 7.0], 1, 4).unwrap();
/// assert_eq!(collapsed, vec![2.5, 2.0, 7.0]);
/// ```
pub fn collapse_one_hot(
    values: &[f64],
    start: usize,
    width: usize,
) -> Result<Vec<f64>, ModelError> {
    if width == 0 {
        return Err(ModelError::InputValidationError(
            "One-hot block width must be greater than 0".to_string(),
        ));
    }

    let end = start
        .checked_add(width)
        .filter(|&end| end <= values.len())
        .ok_or_else(|| {
            ModelError::InputValidationError(format!(
                "One-hot block of width {} at {} exceeds the {} available attributes",
                width,
                start,
                values.len()
            ))
        })?;

    let hot = values[start..end]
        .iter()
        .position(|&v| v == 1.0)
        .ok_or_else(|| {
            ModelError::InputValidationError(format!(
                "One-hot block {}..{} has no column set to 1",
                start, end
            ))
        })?;

    let mut collapsed = Vec::with_capacity(values.len() - width + 1);
    collapsed.extend_from_slice(&values[..start]);
    collapsed.push(hot as f64);
    collapsed.extend_from_slice(&values[end..]);
    Ok(collapsed)
}
