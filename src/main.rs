//! Cardiolens: cardiovascular dataset analysis
//!
//! Main entry point for the command-line tool.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cardiolens::adapters::{CsvDatasetStore, TerminalBarChart};
use cardiolens::application::{
    count_chart_groups, status_chart_group, synthetic, AnalyticsService, TrainingService,
};
use cardiolens::config::{parse_delimiter, DatasetConfig, TrainingConfig};
use cardiolens::domain::{CountKey, Normalization, PatientCheck};
use cardiolens::ports::ChartRenderer;

#[derive(Debug, Parser)]
#[command(
    name = "cardiolens",
    version,
    about = "Exploratory analysis and risk modelling for the cardiovascular disease dataset",
    long_about = "cardiolens classifies patients of the cardiovascular disease dataset by age,\n\
        BMI and blood pressure, counts diagnoses per category and fits a logistic\n\
        regression risk model.\n\n\
        EXAMPLES:\n\
        \n  cardiolens summary cardio_train.csv\n\
        \n  cardiolens counts cardio_train.csv --by age-group --valid-only --chart\n\
        \n  cardiolens filter cardio_train.csv --drop hypertensive -o normotensive.csv\n\
        \n  cardiolens train cardio_train.csv --epochs 200 --save model.json"
)]
struct Cli {
    /// CSV field delimiter (sniffed from the header when omitted)
    #[arg(long, global = true, value_name = "CHAR")]
    delimiter: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Row, validity and health counts
    Summary {
        /// Input dataset
        input: PathBuf,
    },

    /// Drop rows matching a check and write the rest
    Filter {
        input: PathBuf,

        /// Check whose matching rows are removed
        #[arg(long, value_enum)]
        drop: CheckArg,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Totals and cardio-positive counts per category
    Counts(CountsArgs),

    /// Patients matching a check versus the rest
    Status {
        input: PathBuf,

        #[arg(long, value_enum)]
        check: CheckArg,

        /// Only consider valid patients
        #[arg(long)]
        valid_only: bool,

        /// Render a bar chart
        #[arg(long)]
        chart: bool,
    },

    /// Write the dataset with categorical flags as booleans
    Booleanize {
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Fit the cardio risk model on valid patients
    Train(TrainArgs),

    /// Apply a saved model to every valid row
    Predict {
        input: PathBuf,

        /// Model written by `train --save`
        #[arg(long)]
        model: PathBuf,

        /// Print probabilities instead of labels
        #[arg(long)]
        proba: bool,
    },

    /// Fit on a two-moons synthetic dataset and print the accuracy
    Moons {
        #[arg(long, default_value_t = 100)]
        samples: usize,

        #[arg(long, default_value_t = 0.24)]
        noise: f64,

        #[arg(long, default_value_t = 0)]
        seed: u64,

        #[command(flatten)]
        hyper: HyperArgs,
    },
}

#[derive(Debug, Args)]
struct CountsArgs {
    input: PathBuf,

    /// Grouping attribute
    #[arg(long, value_enum)]
    by: KeyArg,

    /// Only count valid patients
    #[arg(long)]
    valid_only: bool,

    /// Print JSON instead of a table
    #[arg(long, conflicts_with = "chart")]
    json: bool,

    /// Render a bar chart
    #[arg(long)]
    chart: bool,
}

#[derive(Debug, Args)]
struct TrainArgs {
    input: PathBuf,

    #[command(flatten)]
    hyper: HyperArgs,

    /// Write the fitted model as JSON
    #[arg(long, value_name = "FILE")]
    save: Option<PathBuf>,
}

/// Overrides for [`TrainingConfig`].
#[derive(Debug, Args)]
struct HyperArgs {
    #[arg(long)]
    epochs: Option<usize>,

    #[arg(long)]
    batch_size: Option<usize>,

    #[arg(long)]
    learning_rate: Option<f64>,

    #[arg(long)]
    threshold: Option<f64>,

    /// Use the iterated `x - mean / std` scaling
    #[arg(long)]
    legacy_normalization: bool,
}

impl HyperArgs {
    fn apply(&self, mut config: TrainingConfig) -> TrainingConfig {
        if let Some(epochs) = self.epochs {
            config.epochs = epochs;
        }
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        if let Some(learning_rate) = self.learning_rate {
            config.learning_rate = learning_rate;
        }
        if let Some(threshold) = self.threshold {
            config.threshold = threshold;
        }
        if self.legacy_normalization {
            config.normalization = Normalization::Legacy;
        }
        config
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CheckArg {
    Valid,
    Healthy,
    Hypertensive,
    Overweight,
    Underweight,
    Cardio,
}

impl From<CheckArg> for PatientCheck {
    fn from(arg: CheckArg) -> Self {
        match arg {
            CheckArg::Valid => Self::Valid,
            CheckArg::Healthy => Self::Healthy,
            CheckArg::Hypertensive => Self::Hypertensive,
            CheckArg::Overweight => Self::Overweight,
            CheckArg::Underweight => Self::Underweight,
            CheckArg::Cardio => Self::Cardio,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum KeyArg {
    AgeGroup,
    BroaderAgeGroup,
    Bmi,
    Systolic,
    Diastolic,
    Cholesterol,
    Glucose,
    Gender,
}

impl From<KeyArg> for CountKey {
    fn from(arg: KeyArg) -> Self {
        match arg {
            KeyArg::AgeGroup => Self::AgeGroup,
            KeyArg::BroaderAgeGroup => Self::BroaderAgeGroup,
            KeyArg::Bmi => Self::Bmi,
            KeyArg::Systolic => Self::Systolic,
            KeyArg::Diastolic => Self::Diastolic,
            KeyArg::Cholesterol => Self::Cholesterol,
            KeyArg::Glucose => Self::Glucose,
            KeyArg::Gender => Self::Gender,
        }
    }
}

fn main() -> Result<()> {
    // Results go to stdout; logs default to stderr so they can be piped apart.
    let log_mode = std::env::var("CARDIOLENS_LOG_MODE").unwrap_or_else(|_| "stderr".to_string());

    let (writer, _guard) = if log_mode == "file" {
        let log_file = std::env::var("CARDIOLENS_LOG_FILE")
            .unwrap_or_else(|_| "cardiolens.log".to_string());

        if let Some(parent) = Path::new(&log_file).parent() {
            // Best-effort: don't fail startup just because the directory is missing.
            let _ = std::fs::create_dir_all(parent);
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .with_context(|| format!("opening log file {log_file}"))?;
        tracing_appender::non_blocking(file)
    } else {
        tracing_appender::non_blocking(std::io::stderr())
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(writer))
        .init();

    let cli = Cli::parse();
    run(cli)
}

fn run(cli: Cli) -> Result<()> {
    let mut dataset_config = DatasetConfig::from_env_or_default();
    if let Some(raw) = &cli.delimiter {
        dataset_config.delimiter =
            Some(parse_delimiter(raw).with_context(|| format!("invalid delimiter `{raw}`"))?);
    }
    let analytics = AnalyticsService::new(Arc::new(CsvDatasetStore::new(dataset_config)));

    match cli.command {
        Command::Summary { input } => {
            let dataset = analytics.load(&input)?;
            let summary = analytics.summary(&dataset)?;
            println!("rows          {}", summary.rows);
            println!("valid         {}", summary.valid);
            println!("invalid       {}", summary.invalid);
            println!("healthy       {}", summary.healthy);
            println!("hypertensive  {}", summary.hypertensive);
            println!("overweight    {}", summary.overweight);
            println!("underweight   {}", summary.underweight);
            println!("cardio        {}", summary.cardio);
        }

        Command::Filter {
            input,
            drop,
            output,
        } => {
            let report = analytics.export_filtered(&input, drop.into(), &output)?;
            println!(
                "kept {} rows, dropped {} -> {}",
                report.kept,
                report.dropped,
                output.display()
            );
        }

        Command::Counts(args) => {
            let key = CountKey::from(args.by);
            let dataset = analytics.load(&args.input)?;
            let rows = analytics.counts(&dataset, key, args.valid_only)?;

            if args.json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else if args.chart {
                let title = format!("Patients by {}", key.name());
                println!(
                    "{}",
                    TerminalBarChart::default().render(&title, &count_chart_groups(&rows))
                );
            } else {
                println!("{:<22} {:>8} {:>8} {:>10}", "category", "total", "cardio", "prevalence");
                for row in rows {
                    let prevalence = row
                        .prevalence
                        .map_or_else(|| "-".to_string(), |p| format!("{:.1}%", p * 100.0));
                    println!(
                        "{:<22} {:>8} {:>8} {:>10}",
                        row.category, row.total, row.cardio, prevalence
                    );
                }
            }
        }

        Command::Status {
            input,
            check,
            valid_only,
            chart,
        } => {
            let dataset = analytics.load(&input)?;
            let status = analytics.status(&dataset, check.into(), valid_only)?;
            if chart {
                println!(
                    "{}",
                    TerminalBarChart::default()
                        .render("Patients by status", &[status_chart_group(&status)])
                );
            } else {
                for (label, count) in status.labelled() {
                    println!("{label:<22} {count:>8}");
                }
            }
        }

        Command::Booleanize { input, output } => {
            let written = analytics.export_booleanized(&input, &output)?;
            println!("wrote {written} rows -> {}", output.display());
        }

        Command::Train(args) => {
            let config = args.hyper.apply(TrainingConfig::from_env_or_default());
            let training = TrainingService::new(config)?;
            let dataset = analytics.load(&args.input)?;
            let (model, report) = training.train(&dataset)?;

            println!("rows      {} ({} invalid skipped)", report.rows, report.skipped);
            println!(
                "epochs    {} x {} batches",
                report.summary.epochs, report.summary.batches_per_epoch
            );
            if let Some(loss) = report.summary.final_loss {
                println!("loss      {loss:.6}");
            }
            println!("accuracy  {:.4}", report.accuracy);

            if let Some(path) = args.save {
                TrainingService::save_model(&model, &path)?;
                println!("model     {}", path.display());
            }
        }

        Command::Predict {
            input,
            model,
            proba,
        } => {
            let loaded = TrainingService::load_model(&model)?;
            let dataset = analytics.load(&input)?;

            println!("id,{}", if proba { "probability" } else { "cardio" });
            for prediction in TrainingService::predict(&loaded, &dataset)? {
                if proba {
                    println!("{},{:.6}", prediction.id, prediction.probability);
                } else {
                    println!("{},{}", prediction.id, prediction.label);
                }
            }
        }

        Command::Moons {
            samples,
            noise,
            seed,
            hyper,
        } => {
            let config = hyper.apply(TrainingConfig::from_env_or_default());
            let training = TrainingService::new(config)?;
            let data = synthetic::make_moons(samples, noise, seed)?;
            let (_, summary, accuracy) = training.fit(&data.features, &data.targets)?;

            if let Some(loss) = summary.final_loss {
                println!("loss      {loss:.6}");
            }
            println!("accuracy  {accuracy:.4}");
        }
    }

    Ok(())
}
