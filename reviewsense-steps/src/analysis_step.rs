use {
    std::path::PathBuf,
    tracing::info,
    anyhow::{anyhow, Context},
    indicatif::ProgressBar,
    reviewsense_core::{
        config::Config,
        dataset::{load_product_reviews, write_predictions, PredictionRow},
        inference::InferenceService,
        report::ReputationReport,
    },
};

const CHUNK_SIZE: usize = 1024;

pub fn run_analysis_step(
    config: &Config,
    input: PathBuf,
    model: Option<PathBuf>,
    product: Option<String>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let model = model.unwrap_or_else(|| config.paths().model());
    let service = InferenceService::load(&model)
        .with_context(|| format!("failed to load model from {}", model.display()))?;

    let reviews = load_product_reviews(&input)
        .with_context(|| format!("failed to load reviews from {}", input.display()))?;

    let pb = ProgressBar::new(reviews.len() as u64);
    let mut labels = Vec::with_capacity(reviews.len());
    for chunk in reviews.chunks(CHUNK_SIZE) {
        let texts: Vec<&str> = chunk.iter().map(|v| v.review_text.as_str()).collect();
        labels.extend(service.predict_batch(&texts));
        pb.inc(chunk.len() as u64);
    }
    pb.finish();

    let report = ReputationReport::build(&reviews, &labels)?;
    let summary = report.summary(product.as_deref())
        .ok_or_else(|| anyhow!("no reviews for product {:?}", product.as_deref().unwrap_or_default()))?;

    println!("{}", product.as_deref().unwrap_or("all products"));
    println!("{}", summary);

    if product.is_none() && report.products.len() > 1 {
        println!();
        for (name, summary) in &report.products {
            println!("{}: {} reviews, health score {:.1}%", name, summary.counts.total(), summary.health_score);
        }
    }

    if let Some(output) = output {
        let rows: Vec<PredictionRow<'_>> = reviews.iter()
            .zip(&labels)
            .map(|(review, sentiment)| PredictionRow {
                product_name: &review.product_name,
                review_text: &review.review_text,
                sentiment: *sentiment,
            })
            .collect();

        write_predictions(&output, &rows)
            .with_context(|| format!("failed to write labeled reviews to {}", output.display()))?;
    }

    info!("analysis done: {} reviews", reviews.len());
    Ok(())
}
