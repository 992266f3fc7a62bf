use {
    std::{io::{self, BufRead}, path::PathBuf},
    anyhow::Context,
    reviewsense_core::{
        config::Config,
        inference::InferenceService,
    },
};

pub fn run_prediction_step(config: &Config, model: Option<PathBuf>, texts: Vec<String>) -> anyhow::Result<()> {
    let model = model.unwrap_or_else(|| config.paths().model());
    let service = InferenceService::load(&model)
        .with_context(|| format!("failed to load model from {}", model.display()))?;

    let texts = if texts.is_empty() {
        io::stdin().lock().lines().collect::<io::Result<Vec<_>>>().context("failed to read reviews from stdin")?
    } else {
        texts
    };

    for (text, label) in texts.iter().zip(service.predict_batch(&texts)) {
        println!("{}\t{}", label, text);
    }

    Ok(())
}
