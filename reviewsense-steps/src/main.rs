mod analysis_step;
mod prediction_step;
mod preprocessing_step;
mod progress;
mod training_step;
mod utils;

use {
    std::path::PathBuf,
    tracing::{info, warn},
    clap::{Parser, Subcommand},
    reviewsense_core::config::Config,
    crate::{
        analysis_step::run_analysis_step,
        prediction_step::run_prediction_step,
        preprocessing_step::run_preprocessing_step,
        training_step::run_training_step,
        utils::init_logging,
    },
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    step: Step,
}

#[derive(Subcommand)]
enum Step {
    /// Clean the raw labeled dataset and write the processed csv
    Preprocess {
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Train a model on the raw labeled dataset and save it
    Train {
        #[arg(long)]
        dataset: Option<PathBuf>,
        #[arg(long)]
        model: Option<PathBuf>,
    },

    /// Predict the sentiment of reviews given as arguments, or one per line on stdin
    Predict {
        #[arg(long)]
        model: Option<PathBuf>,
        text: Vec<String>,
    },

    /// Label every review of a product csv and print the reputation report
    Analyze {
        input: PathBuf,
        #[arg(long)]
        model: Option<PathBuf>,
        /// Only report this product
        #[arg(long)]
        product: Option<String>,
        /// Write the labeled reviews to this csv
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let (config, config_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(err) => (Config::default(), Some(err)),
    };

    init_logging(config.logging.json);
    if let Some(err) = config_error {
        warn!("failed to read config, using defaults: {}", err);
    }

    info!("reviewsense");

    match args.step {
        Step::Preprocess { input, output } => run_preprocessing_step(&config, input, output),
        Step::Train { dataset, model } => run_training_step(&config, dataset, model),
        Step::Predict { model, text } => run_prediction_step(&config, model, text),
        Step::Analyze { input, model, product, output } => run_analysis_step(&config, input, model, product, output),
    }
}
