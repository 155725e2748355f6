use crate::dataset::{ClassificationResult, Label, LabelSet};
use crate::error::{IoError, ModelError};
use ndarray::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};

/// Result lists at least this long are tallied in parallel chunks.
const CONFUSION_PARALLEL_THRESHOLD: usize = 10_000;

/// Chunk size of the parallel tally; every chunk yields one partial matrix.
const CONFUSION_CHUNK_SIZE: usize = 2_048;

/// Column width of the plain-text report.
const REPORT_COLUMN_WIDTH: usize = 16;

/// Multi-class confusion matrix indexed predicted label first, true label second.
///
/// `counts[[p, t]]` is the number of results with predicted label `labels[p]` and true label
/// `labels[t]`. Built once per evaluation run and not mutated afterwards, except by
/// [`merge`](ConfusionMatrix::merge) of partial matrices.
///
/// # Examples
/// ```rust
/// use classeval::dataset::{ClassificationResult, LabelSet};
/// use classeval::metric::ConfusionMatrix;
///
/// let labels = LabelSet::new(vec![0, 1]).unwrap();
/// let results = vec![
///     ClassificationResult::new(0, 0),
///     ClassificationResult::new(0, 0),
///     ClassificationResult::new(1, 1),
///     ClassificationResult::new(1, 0),
/// ];
/// let cm = ConfusionMatrix::from_results(&results, &labels).unwrap();
///
/// assert_eq!(cm.get(&0, &1).unwrap(), 1);
/// assert_eq!(cm.total(), 4);
/// assert_eq!(cm.class_counts(&0).unwrap(), (2, 1, 0, 1));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ConfusionMatrix<L: Label> {
    labels: LabelSet<L>,
    counts: Array2<usize>,
}

impl<L: Label> ConfusionMatrix<L> {
    /// Create an empty confusion matrix over `labels`.
    pub fn new(labels: LabelSet<L>) -> Self {
        let n = labels.len();
        ConfusionMatrix {
            labels,
            counts: Array2::zeros((n, n)),
        }
    }

    /// Tally classification results into a confusion matrix.
    ///
    /// Large result lists are tallied as partial matrices on the rayon pool and summed
    /// elementwise, which yields exactly the sequential counts.
    ///
    /// # Parameters
    ///
    /// - `results` - (true, predicted) label pairs
    /// - `labels` - The label set; fixes the row and column order
    ///
    /// # Returns
    ///
    /// - `Ok(ConfusionMatrix)` - The populated matrix
    /// - `Err(ModelError::InputValidationError)` - If `results` is empty
    /// - `Err(ModelError::UnknownLabel)` - If a result carries a label outside `labels`
    pub fn from_results(
        results: &[ClassificationResult<L>],
        labels: &LabelSet<L>,
    ) -> Result<Self, ModelError> {
        if results.is_empty() {
            return Err(ModelError::InputValidationError(
                "Cannot build a confusion matrix from an empty result list".to_string(),
            ));
        }

        let mut matrix = ConfusionMatrix::new(labels.clone());

        if results.len() >= CONFUSION_PARALLEL_THRESHOLD {
            let partials = results
                .par_chunks(CONFUSION_CHUNK_SIZE)
                .map(|chunk| {
                    let mut partial = ConfusionMatrix::new(labels.clone());
                    partial.tally(chunk)?;
                    Ok(partial)
                })
                .collect::<Result<Vec<_>, ModelError>>()?;

            for partial in &partials {
                matrix.merge(partial)?;
            }
        } else {
            matrix.tally(results)?;
        }

        Ok(matrix)
    }

    fn tally(&mut self, results: &[ClassificationResult<L>]) -> Result<(), ModelError> {
        for result in results {
            let predicted = self.labels.require_index(&result.predicted)?;
            let actual = self.labels.require_index(&result.actual)?;
            self.counts[[predicted, actual]] += 1;
        }
        Ok(())
    }

    /// Adds the counts of `other` elementwise.
    ///
    /// # Returns
    ///
    /// - `Ok(())` - If both matrices share the same label set
    /// - `Err(ModelError::InputValidationError)` - Otherwise
    pub fn merge(&mut self, other: &ConfusionMatrix<L>) -> Result<(), ModelError> {
        if self.labels != other.labels {
            return Err(ModelError::InputValidationError(
                "Cannot merge confusion matrices over different label sets".to_string(),
            ));
        }
        self.counts += &other.counts;
        Ok(())
    }

    pub fn labels(&self) -> &LabelSet<L> {
        &self.labels
    }

    /// Raw counts, rows are predicted labels and columns true labels.
    pub fn counts(&self) -> ArrayView2<'_, usize> {
        self.counts.view()
    }

    /// Number of results predicted as `predicted` whose true label is `actual`.
    pub fn get(&self, predicted: &L, actual: &L) -> Result<usize, ModelError> {
        let p = self.labels.require_index(predicted)?;
        let t = self.labels.require_index(actual)?;
        Ok(self.counts[[p, t]])
    }

    /// Total number of tallied results.
    pub fn total(&self) -> usize {
        self.counts.sum()
    }

    /// Proportion of results on the diagonal, 0.0 for an empty matrix.
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.counts.diag().sum() as f64 / total as f64
    }

    /// One-vs-rest counts of `class`.
    ///
    /// # Returns
    ///
    /// - `Ok((usize, usize, usize, usize))` - Tuple of (tp, fp, fn, tn) counts
    /// - `Err(ModelError::UnknownLabel)` - If `class` is not in the label set
    pub fn class_counts(&self, class: &L) -> Result<(usize, usize, usize, usize), ModelError> {
        let c = self.labels.require_index(class)?;
        Ok(self.counts_at(c))
    }

    fn counts_at(&self, c: usize) -> (usize, usize, usize, usize) {
        let tp = self.counts[[c, c]];
        let fp = self.counts.row(c).sum() - tp;
        let fn_ = self.counts.column(c).sum() - tp;
        let tn = self.total() - tp - fp - fn_;
        (tp, fp, fn_, tn)
    }
}

/// One-vs-rest counts and metrics of a single class.
///
/// Every ratio is guarded: precision and recall are 0.0 without true positives, fall-out is
/// 0.0 without false positives, and the F-measure is 0.0 when precision or recall is 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub tp: usize,
    pub fp: usize,
    pub fn_: usize,
    pub tn: usize,
    pub precision: f64,
    pub recall: f64,
    pub fall_out: f64,
    pub f_measure: f64,
}

impl ClassMetrics {
    /// Derives the four metrics from one-vs-rest counts.
    pub fn from_counts(tp: usize, fp: usize, fn_: usize, tn: usize) -> Self {
        let precision = if tp == 0 {
            0.0
        } else {
            tp as f64 / (tp + fp) as f64
        };

        let recall = if tp == 0 {
            0.0
        } else {
            tp as f64 / (tp + fn_) as f64
        };

        let fall_out = if fp == 0 {
            0.0
        } else {
            fp as f64 / (fp + tn) as f64
        };

        // harmonic mean
        let f_measure = if precision == 0.0 || recall == 0.0 {
            0.0
        } else {
            1.0 / (0.5 / precision + 0.5 / recall)
        };

        ClassMetrics {
            tp,
            fp,
            fn_,
            tn,
            precision,
            recall,
            fall_out,
            f_measure,
        }
    }
}

/// Macro or micro average of the four per-class ratios.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AggregateMetrics {
    pub precision: f64,
    pub recall: f64,
    pub fall_out: f64,
    pub f_measure: f64,
}

impl AggregateMetrics {
    fn accumulate(&mut self, metrics: &ClassMetrics, weight: f64) {
        self.precision += weight * metrics.precision;
        self.recall += weight * metrics.recall;
        self.fall_out += weight * metrics.fall_out;
        self.f_measure += weight * metrics.f_measure;
    }

    fn scaled(self, divisor: f64) -> Self {
        AggregateMetrics {
            precision: self.precision / divisor,
            recall: self.recall / divisor,
            fall_out: self.fall_out / divisor,
            f_measure: self.f_measure / divisor,
        }
    }
}

/// Evaluation of one classification run.
///
/// # Fields
///
/// - `confusion_matrix` - Predicted-by-true counts
/// - `per_class` - Metrics of every class, in label-set order
/// - `instances_per_class` - Number of results truly belonging to each class, in label-set order
/// - `macro_average` - Unweighted mean of the per-class metrics
/// - `micro_average` - Per-class metrics weighted by `instances_per_class`, divided by the number of results
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationReport<L: Label> {
    confusion_matrix: ConfusionMatrix<L>,
    per_class: Vec<ClassMetrics>,
    instances_per_class: Vec<usize>,
    macro_average: AggregateMetrics,
    micro_average: AggregateMetrics,
}

/// Scores classification results against their true labels.
///
/// # Parameters
///
/// - `results` - One (true, predicted) pair per validation instance
/// - `labels` - The label set; fixes the order of every per-class field
///
/// # Returns
///
/// - `Ok(EvaluationReport)` - The confusion matrix with per-class, macro and micro metrics
/// - `Err(ModelError::InputValidationError)` - If `results` is empty
/// - `Err(ModelError::UnknownLabel)` - If a result carries a label outside `labels`
///
/// # Examples
/// ```rust
/// use classeval::dataset::{ClassificationResult, LabelSet};
/// use classeval::metric::evaluate;
///
/// let labels = LabelSet::new(vec!["cat", "dog"]).unwrap();
/// let results = vec![
///     ClassificationResult::new("cat", "cat"),
///     ClassificationResult::new("dog", "dog"),
///     ClassificationResult::new("dog", "cat"),
/// ];
/// let report = evaluate(&results, &labels).unwrap();
///
/// let dog = report.metrics_for(&"dog").unwrap();
/// assert_eq!(dog.precision, 1.0);
/// assert_eq!(dog.recall, 0.5);
/// println!("{}", report.summary());
/// ```
pub fn evaluate<L: Label>(
    results: &[ClassificationResult<L>],
    labels: &LabelSet<L>,
) -> Result<EvaluationReport<L>, ModelError> {
    let confusion_matrix = ConfusionMatrix::from_results(results, labels)?;

    let mut instances_per_class = vec![0usize; labels.len()];
    for result in results {
        instances_per_class[labels.require_index(&result.actual)?] += 1;
    }

    let per_class: Vec<ClassMetrics> = (0..labels.len())
        .map(|c| {
            let (tp, fp, fn_, tn) = confusion_matrix.counts_at(c);
            ClassMetrics::from_counts(tp, fp, fn_, tn)
        })
        .collect();

    let mut macro_sum = AggregateMetrics::default();
    let mut micro_sum = AggregateMetrics::default();
    for (metrics, &instances) in per_class.iter().zip(&instances_per_class) {
        macro_sum.accumulate(metrics, 1.0);
        micro_sum.accumulate(metrics, instances as f64);
    }

    Ok(EvaluationReport {
        confusion_matrix,
        per_class,
        instances_per_class,
        macro_average: macro_sum.scaled(labels.len() as f64),
        micro_average: micro_sum.scaled(results.len() as f64),
    })
}

impl<L: Label> EvaluationReport<L> {
    pub fn labels(&self) -> &LabelSet<L> {
        self.confusion_matrix.labels()
    }

    pub fn confusion_matrix(&self) -> &ConfusionMatrix<L> {
        &self.confusion_matrix
    }

    pub fn per_class(&self) -> &[ClassMetrics] {
        &self.per_class
    }

    pub fn instances_per_class(&self) -> &[usize] {
        &self.instances_per_class
    }

    pub fn macro_average(&self) -> AggregateMetrics {
        self.macro_average
    }

    pub fn micro_average(&self) -> AggregateMetrics {
        self.micro_average
    }

    /// Metrics of `class`, `None` if it is not in the label set.
    pub fn metrics_for(&self, class: &L) -> Option<&ClassMetrics> {
        self.labels()
            .index_of(class)
            .and_then(|c| self.per_class.get(c))
    }

    /// Plain-text rendering of the report.
    ///
    /// The confusion matrix comes first, with true labels across and predicted labels down,
    /// followed by the bare counts. Then the eight metrics of every class, one per line,
    /// and finally the macro and micro averages.
    pub fn summary(&self) -> String {
        let w = REPORT_COLUMN_WIDTH;
        let labels: Vec<String> = self.labels().iter().map(|l| l.to_string()).collect();
        let counts = self.confusion_matrix.counts();
        let mut out = String::new();

        out.push_str("Confusion Matrix\n");
        out.push_str(&format!("{}Actual class\n", " ".repeat(w + 4)));
        out.push_str(&" ".repeat(w));
        for label in &labels {
            out.push_str(&format!("{:>w$}", label));
        }
        out.push('\n');
        for (label, row) in labels.iter().zip(counts.rows()) {
            out.push_str(&format!("{:>w$}", label));
            for count in row {
                out.push_str(&format!("{:>w$}", count));
            }
            out.push('\n');
        }

        out.push('\n');
        for row in counts.rows() {
            for count in row {
                out.push_str(&format!("{:>w$}", count));
            }
            out.push('\n');
        }
        out.push('\n');

        out.push_str("Metrics for a given class\n");
        for name in [
            "True Positives",
            "False Positives",
            "False Negatives",
            "True Negatives",
            "Precision",
            "Recall",
            "Fall-out",
            "F-Measure",
        ] {
            out.push_str(name);
            out.push('\n');
        }
        out.push('\n');

        for (label, m) in labels.iter().zip(&self.per_class) {
            out.push_str(&format!("Metrics for class {} classification\n", label));
            out.push_str(&format!("{}\n{}\n{}\n{}\n", m.tp, m.fp, m.fn_, m.tn));
            out.push_str(&format!(
                "{:?}\n{:?}\n{:?}\n{}\n",
                m.precision,
                m.recall,
                m.fall_out,
                class_f_measure_text(m.f_measure)
            ));
            out.push_str("\n\n");
        }

        for (title, aggregate, trailer) in [
            ("Macro measures", &self.macro_average, "\n\n"),
            ("Micro measures", &self.micro_average, "\n"),
        ] {
            out.push_str(title);
            out.push_str("\nPrecision\nRecall\nFall-out\nF-Measure\n");
            out.push_str(&format!(
                "{:?}\n{:?}\n{:?}\n{:?}\n",
                aggregate.precision, aggregate.recall, aggregate.fall_out, aggregate.f_measure
            ));
            out.push_str(trailer);
        }

        out
    }

    /// Writes [`summary`](Self::summary) to a file, replacing its content.
    pub fn write_to(&self, path: &str) -> Result<(), IoError> {
        let file = File::create(path).map_err(IoError::StdIoError)?;
        let mut writer = BufWriter::new(file);

        writer
            .write_all(self.summary().as_bytes())
            .map_err(IoError::StdIoError)?;
        writer.flush().map_err(IoError::StdIoError)?;

        Ok(())
    }
}

/// A class with no true positives reports a bare `0` F-measure, unlike the
/// averaged rows which always print as floats.
fn class_f_measure_text(f_measure: f64) -> String {
    if f_measure == 0.0 {
        "0".to_string()
    } else {
        format!("{:?}", f_measure)
    }
}
