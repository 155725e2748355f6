//! Command-line driver: load a data set, train a classifier, evaluate it on a held-out split.
//!
//! ```bash
//! classeval knn iris.data --k 5
//! classeval nb covtype.data --one-hot 14:40 --one-hot 10:4 --categorical 10:4 --categorical 11:40
//! classeval nb covtype.data --load-model models.json --output report.txt
//! ```

use crate::dataset::{
    FeatureVector, LabelSet, LabeledInstance, collapse_one_hot, load_labeled_csv,
};
use crate::error::{IoError, ModelError};
use crate::machine_learning::{AttributeSchema, KNN, NaiveBayes};
use crate::metric::{EvaluationReport, evaluate};
use crate::traits::Classifier;
use crate::utility::{min_max_scale, train_validation_split};
use ahash::AHashMap;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// classeval: KNN and Naive Bayes classification with confusion-matrix evaluation
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "classeval")]
#[command(version)]
#[command(about = "Classify a labeled data set with KNN or Naive Bayes and evaluate it")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Distance-weighted k-nearest neighbours over min-max rescaled attributes
    Knn(KnnArgs),

    /// Naive Bayes with Gaussian and categorical attributes
    Nb(NbArgs),
}

/// Arguments shared by every classifier
#[derive(Args, Debug, Clone, PartialEq)]
pub struct DataArgs {
    /// Comma-separated data file, label in the last column
    pub data: PathBuf,

    /// Share of the data set used for training, within (0, 1]
    #[arg(long, default_value_t = 0.8)]
    pub training_proportion: f64,

    /// Seed of the train/validation shuffle
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write the evaluation report to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the knn command
#[derive(Args, Debug, Clone, PartialEq)]
pub struct KnnArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Number of neighbours
    #[arg(short, long, default_value_t = 3)]
    pub k: usize,
}

/// Arguments for the nb command
#[derive(Args, Debug, Clone, PartialEq)]
pub struct NbArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Categorical attribute as INDEX:CARDINALITY, position after one-hot collapsing
    #[arg(long = "categorical", value_parser = parse_pair)]
    pub categorical: Vec<(usize, usize)>,

    /// One-hot block as START:WIDTH, collapsed into one integer-coded attribute
    #[arg(long = "one-hot", value_parser = parse_pair)]
    pub one_hot: Vec<(usize, usize)>,

    /// Save the fitted class models as JSON
    #[arg(long)]
    pub save_model: Option<PathBuf>,

    /// Use class models from a JSON file instead of fitting them
    #[arg(long, conflicts_with = "save_model")]
    pub load_model: Option<PathBuf>,
}

/// Parses `A:B` into a pair of non-negative integers.
fn parse_pair(s: &str) -> Result<(usize, usize), String> {
    let (a, b) = s
        .split_once(':')
        .ok_or_else(|| format!("expected INDEX:VALUE, got '{}'", s))?;
    let a = a
        .trim()
        .parse::<usize>()
        .map_err(|e| format!("'{}': {}", a, e))?;
    let b = b
        .trim()
        .parse::<usize>()
        .map_err(|e| format!("'{}': {}", b, e))?;
    Ok((a, b))
}

/// Parse command line arguments
pub fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}

/// Execute a parsed command
pub fn run_command(cli: Cli) -> Result<(), IoError> {
    match cli.command {
        Command::Knn(args) => run_knn(&args),
        Command::Nb(args) => run_nb(&args),
    }
}

fn path_str(path: &std::path::Path) -> &str {
    path.to_str().unwrap_or_default()
}

fn load(data: &DataArgs) -> Result<(Vec<LabeledInstance<String>>, LabelSet<String>), IoError> {
    let instances = load_labeled_csv(path_str(&data.data))?;
    let labels = LabelSet::from_observed(instances.iter().map(|i| &i.label))?;
    println!(
        "Loaded {} instances of {} classes from {}",
        instances.len(),
        labels.len(),
        data.data.display()
    );
    Ok((instances, labels))
}

fn split(
    data: &DataArgs,
    instances: &[LabeledInstance<String>],
) -> Result<(Vec<LabeledInstance<String>>, Vec<LabeledInstance<String>>), IoError> {
    let (training, validation) =
        train_validation_split(instances, data.training_proportion, data.seed)?;
    println!(
        "Training on {} instances, validating on {}",
        training.len(),
        validation.len()
    );
    Ok((training, validation))
}

fn report(data: &DataArgs, evaluation: &EvaluationReport<String>) -> Result<(), IoError> {
    println!("Accuracy: {:.4}", evaluation.confusion_matrix().accuracy());
    match &data.output {
        Some(path) => {
            evaluation.write_to(path_str(path))?;
            println!("Report written to {}", path.display());
        }
        None => print!("{}", evaluation.summary()),
    }
    Ok(())
}

/// Rejects two rows with the same attributes but different labels, naming both
/// by their 1-based position among the data rows.
fn check_conflicting_rows(instances: &[LabeledInstance<String>]) -> Result<(), IoError> {
    let mut first_seen: AHashMap<&FeatureVector, usize> = AHashMap::new();
    for (row, instance) in instances.iter().enumerate() {
        match first_seen.get(&instance.features) {
            Some(&earlier) if instances[earlier].label != instance.label => {
                return Err(IoError::ModelError(ModelError::InputValidationError(format!(
                    "data rows {} and {} have identical attributes but labels {} and {}",
                    earlier + 1,
                    row + 1,
                    instances[earlier].label,
                    instance.label
                ))));
            }
            Some(_) => {}
            None => {
                first_seen.insert(&instance.features, row);
            }
        }
    }
    Ok(())
}

fn run_knn(args: &KnnArgs) -> Result<(), IoError> {
    let (instances, labels) = load(&args.data)?;
    let scaled = min_max_scale(&instances)?;
    check_conflicting_rows(&scaled)?;
    let (training, validation) = split(&args.data, &scaled)?;

    println!("KNN with k = {}", args.k);
    let knn = KNN::fit(args.k, &training, labels.clone())?;
    let results = knn.classify_batch(&validation)?;

    report(&args.data, &evaluate(&results, &labels)?)
}

fn run_nb(args: &NbArgs) -> Result<(), IoError> {
    let (mut instances, labels) = load(&args.data)?;

    if !args.one_hot.is_empty() {
        let mut blocks = args.one_hot.clone();
        // later blocks first, so earlier start positions stay valid
        blocks.sort_by(|a, b| b.0.cmp(&a.0));
        for instance in &mut instances {
            let mut values = instance.features.to_vec();
            for &(start, width) in &blocks {
                values = collapse_one_hot(&values, start, width)?;
            }
            instance.features = FeatureVector::new(values)?;
        }
    }

    let (training, validation) = split(&args.data, &instances)?;

    let nb = match &args.load_model {
        Some(path) => {
            println!("Naive Bayes with class models from {}", path.display());
            NaiveBayes::load_models(path_str(path))?
        }
        None => {
            let n_attributes = training
                .first()
                .map(|i| i.features.dimension())
                .unwrap_or_default();
            let schema = AttributeSchema::with_categorical(n_attributes, &args.categorical)?;
            println!(
                "Naive Bayes with {} categorical attributes out of {}",
                args.categorical.len(),
                n_attributes
            );
            NaiveBayes::fit(&training, labels.clone(), &schema)?
        }
    };

    if let Some(path) = &args.save_model {
        nb.save_models(path_str(path))?;
        println!("Class models saved to {}", path.display());
    }

    let results = nb.classify_batch(&validation)?;
    report(&args.data, &evaluate(&results, nb.label_set())?)
}
