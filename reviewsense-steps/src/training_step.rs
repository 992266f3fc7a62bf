use {
    std::path::PathBuf,
    tracing::info,
    anyhow::Context,
    reviewsense_core::{
        config::Config,
        training::TrainingOrchestrator,
    },
};

pub fn run_training_step(config: &Config, dataset: Option<PathBuf>, model: Option<PathBuf>) -> anyhow::Result<()> {
    let paths = config.paths();
    let dataset = dataset.unwrap_or_else(|| paths.raw_dataset());
    let model = model.unwrap_or_else(|| paths.model());

    let orchestrator = TrainingOrchestrator::new(config.training_params());
    let outcome = orchestrator.run(&dataset, &model)
        .with_context(|| format!("training on {} failed, no model was saved", dataset.display()))?;

    match &outcome.baseline {
        Some(baseline) => info!(
            "accuracy {:.4} (macro f1 {:.4}), naive bayes baseline {:.4} (macro f1 {:.4})",
            outcome.model.metrics.accuracy,
            outcome.model.metrics.macro_f1(),
            baseline.accuracy,
            baseline.macro_f1(),
        ),
        None => info!(
            "accuracy {:.4} (macro f1 {:.4})",
            outcome.model.metrics.accuracy,
            outcome.model.metrics.macro_f1(),
        ),
    }

    info!("training done, model saved to {}", model.display());
    Ok(())
}
