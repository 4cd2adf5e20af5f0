use std::cell::RefCell;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use grove_iforest::{IsolationForest, IsolationForestConfig};
use grove_io::{DatasetReader, LabeledDataset, ReportWriter};
use grove_rf::{
    CrossValidation, MaxFeatures, Metrics, Outcome, RandomForest, RandomForestConfig, Scalar,
    evaluate_metrics,
};

#[derive(Parser)]
#[command(name = "grove")]
#[command(about = "Random forest classification and isolation forest anomaly detection")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for reproducibility
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for batch prediction (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// Random forest hyperparameters shared by the classification commands.
#[derive(Args, Debug, Clone)]
struct ForestArgs {
    /// Number of trees in the forest
    #[arg(long, default_value_t = 100)]
    n_trees: usize,

    /// Maximum tree depth (root is depth 1)
    #[arg(long, default_value_t = 10)]
    max_depth: usize,

    /// Minimum rows a node needs before it is split
    #[arg(long, default_value_t = 2)]
    min_samples_split: usize,

    /// Features tried per split: "sqrt", "log2", "all", or a count
    #[arg(long, default_value = "sqrt")]
    max_features: String,
}

/// Where reports go.
#[derive(Args, Debug, Clone)]
struct OutputArgs {
    /// Run name used as the report file prefix
    #[arg(long, default_value = "grove")]
    name: String,

    /// Output directory for report files
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    /// Train a random forest and predict labels for new rows
    Classify {
        /// Labeled training CSV
        #[arg(long)]
        train: PathBuf,

        /// Name of the label column in the training CSV
        #[arg(long)]
        label: String,

        /// CSV of rows to predict, with the training feature columns in any order
        #[arg(long)]
        predict: PathBuf,

        #[command(flatten)]
        forest: ForestArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Estimate random forest accuracy with shuffled k-fold cross-validation
    CrossValidate {
        /// Labeled CSV
        #[arg(long)]
        data: PathBuf,

        /// Name of the label column
        #[arg(long)]
        label: String,

        /// Number of folds
        #[arg(long, default_value_t = 5)]
        folds: usize,

        /// Label treated as the positive class for precision and recall
        #[arg(long)]
        positive: String,

        #[command(flatten)]
        forest: ForestArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Score rows for anomalies with an isolation forest
    Detect {
        /// Numeric CSV of normal rows to train on
        #[arg(long)]
        train: PathBuf,

        /// Numeric CSV of rows to score, with the training columns in any order
        #[arg(long)]
        score: PathBuf,

        /// Optional label column in the scored CSV; enables metrics
        #[arg(long)]
        label: Option<String>,

        /// Label of the anomalous class, compared with rounded scores
        #[arg(long, default_value = "1")]
        positive: String,

        /// Number of isolation trees
        #[arg(long, default_value_t = 100)]
        n_trees: usize,

        /// Rows drawn per tree
        #[arg(long, default_value_t = 256)]
        subsample_size: usize,

        /// Maximum tree depth (defaults to ceil(log2(subsample)))
        #[arg(long)]
        max_depth: Option<usize>,

        #[command(flatten)]
        output: OutputArgs,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct ClassifyOutput {
    name: String,
    n_train: usize,
    n_predicted: usize,
    n_trees: usize,
    n_features: usize,
    report: PathBuf,
}

#[derive(Serialize)]
struct CrossValidateOutput {
    name: String,
    n_samples: usize,
    n_folds: usize,
    n_evaluated: usize,
    metrics: Metrics,
    report: PathBuf,
}

#[derive(Serialize)]
struct DetectOutput {
    name: String,
    n_train: usize,
    n_scored: usize,
    subsample_size: usize,
    mean_score: f64,
    metrics: Option<Metrics>,
    report: PathBuf,
}

fn parse_max_features(s: &str) -> Result<MaxFeatures> {
    match s {
        "sqrt" => Ok(MaxFeatures::Sqrt),
        "log2" => Ok(MaxFeatures::Log2),
        "all" => Ok(MaxFeatures::All),
        other => other
            .parse::<usize>()
            .map(MaxFeatures::Fixed)
            .with_context(|| {
                format!("unknown max features: {other} (expected sqrt, log2, all, or a count)")
            }),
    }
}

fn forest_config(args: &ForestArgs, seed: u64) -> Result<RandomForestConfig> {
    Ok(RandomForestConfig::new(args.n_trees)?
        .with_max_depth(args.max_depth)
        .with_min_samples_split(args.min_samples_split)
        .with_max_features(parse_max_features(&args.max_features)?)
        .with_seed(Some(seed)))
}

fn read_labeled(path: &Path, label: &str) -> Result<(LabeledDataset, Vec<Scalar>)> {
    let dataset = DatasetReader::new(path)
        .with_label_column(label)
        .read()
        .with_context(|| format!("failed to read {}", path.display()))?;
    let labels = dataset
        .labels()
        .map(<[Scalar]>::to_vec)
        .context("label column produced no labels")?;
    Ok((dataset, labels))
}

fn print_json<T: Serialize>(output: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(output).context("failed to encode summary")?
    );
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Classify {
            train,
            label,
            predict,
            forest,
            output,
        } => {
            let (train_set, labels) = read_labeled(&train, &label)?;

            let mut model = RandomForest::new(forest_config(&forest, cli.seed)?);
            model
                .fit(train_set.features(), &labels)
                .context("random forest training failed")?;

            let predict_set = DatasetReader::new(&predict)
                .read()
                .context("failed to read prediction CSV")?
                .aligned_to(train_set.feature_names())
                .context("prediction CSV columns do not match the training CSV")?;
            let predictions = model
                .predict_batch(predict_set.features())
                .context("prediction failed")?;
            info!(n_predicted = predictions.len(), "prediction complete");

            let writer = ReportWriter::new(&output.output_dir, &output.name)?;
            let report = writer.write_predictions(&predictions)?;

            print_json(&ClassifyOutput {
                name: output.name,
                n_train: train_set.n_samples(),
                n_predicted: predictions.len(),
                n_trees: model.n_trees(),
                n_features: model.n_features(),
                report,
            })?;
        }

        Command::CrossValidate {
            data,
            label,
            folds,
            positive,
            forest,
            output,
        } => {
            let (dataset, labels) = read_labeled(&data, &label)?;
            let positive = Scalar::parse(&positive);

            let cv = CrossValidation::new(folds)?.with_seed(Some(cli.seed));

            // Each fold refits before predicting, so the closures share the model.
            let model = RefCell::new(RandomForest::new(forest_config(&forest, cli.seed)?));
            let result = cv
                .evaluate(
                    dataset.features(),
                    &labels,
                    &positive,
                    |x, y| model.borrow_mut().fit(x, y),
                    |x| model.borrow().predict(x).map(|p| p.label),
                )
                .context("cross-validation failed")?;

            let writer = ReportWriter::new(&output.output_dir, &output.name)?;
            let report = writer.write_cv(&positive, &result)?;

            print_json(&CrossValidateOutput {
                name: output.name,
                n_samples: dataset.n_samples(),
                n_folds: result.n_folds,
                n_evaluated: result.n_evaluated,
                metrics: result.metrics,
                report,
            })?;
        }

        Command::Detect {
            train,
            score,
            label,
            positive,
            n_trees,
            subsample_size,
            max_depth,
            output,
        } => {
            let train_set = DatasetReader::new(&train)
                .read()
                .context("failed to read training CSV")?;
            let train_features = train_set
                .numeric_features()
                .context("isolation forest needs numeric training data")?;

            let config = IsolationForestConfig::new(n_trees)?
                .with_subsample_size(subsample_size)
                .with_max_depth(max_depth)
                .with_seed(Some(cli.seed));
            let mut model = IsolationForest::new(config);
            model
                .fit(&train_features)
                .context("isolation forest training failed")?;

            let reader = match &label {
                Some(label) => DatasetReader::new(&score).with_label_column(label),
                None => DatasetReader::new(&score),
            };
            let score_set = reader
                .read()
                .context("failed to read scoring CSV")?
                .aligned_to(train_set.feature_names())
                .context("scoring CSV columns do not match the training CSV")?;
            let score_features = score_set
                .numeric_features()
                .context("isolation forest needs numeric scoring data")?;
            let scores = model
                .predict_batch(&score_features)
                .context("scoring failed")?;

            // Rounding maps scores above 0.5 to the anomalous class.
            let metrics = score_set.labels().map(|expected| {
                let outcomes: Vec<Outcome<Scalar>> = scores
                    .iter()
                    .zip(expected)
                    .map(|(s, y)| Outcome::new(Scalar::from(s.round()), y.clone()))
                    .collect();
                evaluate_metrics(&outcomes, &Scalar::parse(&positive))
            });
            if let Some(m) = &metrics {
                info!(
                    accuracy = m.accuracy,
                    precision = m.precision,
                    recall = m.recall,
                    f1_score = m.f1_score,
                    "anomaly detection metrics"
                );
            }

            let writer = ReportWriter::new(&output.output_dir, &output.name)?;
            let report = writer.write_scores(&scores, metrics.as_ref())?;

            let mean_score = if scores.is_empty() {
                0.0
            } else {
                scores.iter().sum::<f64>() / scores.len() as f64
            };

            print_json(&DetectOutput {
                name: output.name,
                n_train: train_set.n_samples(),
                n_scored: scores.len(),
                subsample_size: model.subsample_size(),
                mean_score,
                metrics,
                report,
            })?;
        }
    }

    Ok(())
}
