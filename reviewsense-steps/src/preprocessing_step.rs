use {
    std::path::PathBuf,
    tracing::{info, warn},
    anyhow::Context,
    reviewsense_core::{
        config::Config,
        dataset::{load_training_reviews, write_processed_reviews, ProcessedRow},
        preprocessing::PreprocessingPipeline,
    },
    crate::progress::Progress,
};

const CHUNK_SIZE: usize = 4096;

pub fn run_preprocessing_step(config: &Config, input: Option<PathBuf>, output: Option<PathBuf>) -> anyhow::Result<()> {
    let paths = config.paths();
    let input = input.unwrap_or_else(|| paths.raw_dataset());
    let output = output.unwrap_or_else(|| paths.processed_dataset());

    let reviews = load_training_reviews(&input)
        .with_context(|| format!("failed to load dataset from {}", input.display()))?;

    let pipeline = PreprocessingPipeline::indonesian(config.preprocessing.stemmer);
    let mut progress = Progress::new("cleaning reviews".to_owned());
    let mut cleaned = Vec::with_capacity(reviews.len());

    for chunk in reviews.chunks(CHUNK_SIZE) {
        let texts: Vec<&str> = chunk.iter().map(|v| v.review_text.as_str()).collect();
        cleaned.extend(pipeline.preprocess_batch(&texts));
        progress.update(chunk.len() as u64);
    }
    progress.finish();

    let empty = cleaned.iter().filter(|v| v.is_empty()).count();
    if empty > 0 {
        warn!("{} reviews are empty after cleaning", empty);
    }

    let rows: Vec<ProcessedRow<'_>> = cleaned.iter()
        .zip(&reviews)
        .map(|(clean_review, review)| ProcessedRow {
            clean_review,
            sentiment_label: review.label,
        })
        .collect();

    write_processed_reviews(&output, &rows)
        .with_context(|| format!("failed to write processed dataset to {}", output.display()))?;

    info!("preprocessing done");
    Ok(())
}
