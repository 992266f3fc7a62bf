use {
    std::{path::Path, sync::Arc},
    rayon::prelude::*,
    crate::{
        classifier::Classifier,
        entity::SentimentLabel,
        error::Result,
        model::TrainedModel,
        preprocessing::PreprocessingPipeline,
    },
};

/// Read-only predictor over a loaded model. Cloning shares the model.
#[derive(Clone)]
pub struct InferenceService {
    model: Arc<TrainedModel>,
    pipeline: Arc<PreprocessingPipeline>,
}

impl InferenceService {
    /// Rebuilds the same cleaning pipeline the model was trained with.
    pub fn load(path: &Path) -> Result<Self> {
        Ok(Self::new(TrainedModel::load(path)?))
    }

    pub fn new(model: TrainedModel) -> Self {
        let pipeline = PreprocessingPipeline::indonesian(model.preprocessing.stemmer);
        Self::with_pipeline(model, pipeline)
    }

    pub fn with_pipeline(model: TrainedModel, pipeline: PreprocessingPipeline) -> Self {
        Self {
            model: Arc::new(model),
            pipeline: Arc::new(pipeline),
        }
    }

    pub fn model(&self) -> &TrainedModel {
        &self.model
    }

    pub fn predict(&self, text: &str) -> SentimentLabel {
        let cleaned = self.pipeline.preprocess(text);
        let features = self.model.vectorizer.transform(&cleaned);
        self.model.classifier.predict(features.view())
    }

    /// Same result as calling `predict` per row, in input order.
    pub fn predict_batch<S: AsRef<str> + Sync>(&self, texts: &[S]) -> Vec<SentimentLabel> {
        texts.par_iter()
            .map(|text| self.predict(text.as_ref()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            classifier::{ClassifierKind, FittedClassifier, LinearSvmParams, NaiveBayesParams},
            metrics::Metrics,
            stemmer::StemmerKind,
            vectorizer::{TfidfParams, TfidfVectorizer},
        },
    };

    use SentimentLabel::{Negative, Positive};

    fn service() -> InferenceService {
        let pipeline = PreprocessingPipeline::indonesian(StemmerKind::Indonesian);
        let texts = [
            "Barang bagus, mantap!",
            "Mantap sekali, puas",
            "Barang rusak, kecewa",
            "Rusak parah, kecewa berat",
        ];
        let labels = [Positive, Positive, Negative, Negative];

        let cleaned = pipeline.preprocess_batch(&texts);
        let vectorizer = TfidfVectorizer::new(TfidfParams::default()).fit(&cleaned).unwrap();
        let features = vectorizer.transform_batch(&cleaned);
        let classifier = FittedClassifier::fit(
            ClassifierKind::LinearSvm,
            &LinearSvmParams::default(),
            &NaiveBayesParams::default(),
            &features,
            &labels,
        ).unwrap();

        InferenceService::new(TrainedModel::new(
            StemmerKind::Indonesian,
            vectorizer,
            classifier,
            Metrics::from_predictions(&labels, &labels),
        ))
    }

    #[test]
    fn predictions_follow_training_data() {
        let service = service();

        assert_eq!(service.predict("MANTAP, puas bgt"), Positive);
        assert_eq!(service.predict("rusak & kecewa!!"), Negative);
    }

    #[test]
    fn unknown_or_empty_text_still_predicts() {
        let service = service();

        let label = service.predict("");
        assert!(label == Positive || label == Negative);
        assert_eq!(service.predict("zzz qqq"), label);
    }

    #[test]
    fn batch_matches_single_predictions() {
        let service = service();
        let texts = vec!["mantap puas", "rusak kecewa", "", "barang mantap", "kecewa berat"];

        let expected: Vec<SentimentLabel> = texts.iter().map(|v| service.predict(v)).collect();
        assert_eq!(service.predict_batch(&texts), expected);
    }
}
