use {
    std::{collections::BTreeMap, fmt, path::Path},
    tracing::info,
    typed_builder::TypedBuilder,
    ndarray::{Array2, Axis},
    crate::{
        balancer::{class_counts, Smote, SmoteParams},
        classifier::{evaluate, ClassifierKind, FittedClassifier, LinearSvmParams, NaiveBayesParams},
        dataset::load_training_reviews,
        entity::{LabeledReview, SentimentLabel},
        error::{Result, ReviewSenseError},
        metrics::Metrics,
        model::TrainedModel,
        preprocessing::PreprocessingPipeline,
        split::stratified_split,
        stemmer::StemmerKind,
        vectorizer::{TfidfParams, TfidfVectorizer},
    },
};

#[derive(TypedBuilder, Clone, Debug, PartialEq)]
pub struct TrainingParams {
    #[builder(default)]
    pub stemmer: StemmerKind,
    #[builder(default)]
    pub vectorizer: TfidfParams,
    /// `None` trains on the split as is.
    #[builder(default = Some(SmoteParams::default()))]
    pub balancer: Option<SmoteParams>,
    #[builder(default)]
    pub classifier_kind: ClassifierKind,
    #[builder(default)]
    pub svm: LinearSvmParams,
    #[builder(default)]
    pub naive_bayes: NaiveBayesParams,
    #[builder(default = true)]
    pub compare_baseline: bool,
    #[builder(default = 0.2)]
    pub test_size: f64,
    #[builder(default = 42)]
    pub seed: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrainingStage {
    Load,
    Clean,
    Split,
    FitVectorizer,
    Balance,
    FitClassifier,
    Evaluate,
    Persist,
}

impl fmt::Display for TrainingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TrainingStage::Load => "load",
            TrainingStage::Clean => "clean",
            TrainingStage::Split => "split",
            TrainingStage::FitVectorizer => "fit_vectorizer",
            TrainingStage::Balance => "balance",
            TrainingStage::FitClassifier => "fit_classifier",
            TrainingStage::Evaluate => "evaluate",
            TrainingStage::Persist => "persist",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug)]
pub struct TrainingOutcome {
    pub model: TrainedModel,
    pub baseline: Option<Metrics>,
    pub train_counts: BTreeMap<SentimentLabel, usize>,
    pub balanced_counts: BTreeMap<SentimentLabel, usize>,
    pub test_counts: BTreeMap<SentimentLabel, usize>,
}

/// Load, clean, split, fit vectorizer, balance, fit classifier, evaluate, persist. Any
/// failure aborts the run before anything is written.
pub struct TrainingOrchestrator {
    params: TrainingParams,
    pipeline: PreprocessingPipeline,
}

impl TrainingOrchestrator {
    pub fn new(params: TrainingParams) -> Self {
        let pipeline = PreprocessingPipeline::indonesian(params.stemmer);

        Self {
            params,
            pipeline,
        }
    }

    pub fn run(&self, dataset: &Path, model_path: &Path) -> Result<TrainingOutcome> {
        info!("[{}] reading {}", TrainingStage::Load, dataset.display());
        let reviews = load_training_reviews(dataset)?;

        let outcome = self.train(&reviews)?;

        info!("[{}] writing model to {}", TrainingStage::Persist, model_path.display());
        outcome.model.save(model_path)?;

        Ok(outcome)
    }

    /// Everything up to and including evaluation. Nothing is persisted.
    pub fn train(&self, reviews: &[LabeledReview]) -> Result<TrainingOutcome> {
        let texts: Vec<&str> = reviews.iter().map(|v| v.review_text.as_str()).collect();
        let labels: Vec<SentimentLabel> = reviews.iter().map(|v| v.label).collect();

        let cleaned = self.pipeline.preprocess_batch(&texts);
        let empty = cleaned.iter().filter(|v| v.is_empty()).count();
        info!("[{}] cleaned {} reviews, {} empty after cleaning", TrainingStage::Clean, cleaned.len(), empty);
        if empty == cleaned.len() {
            return Err(ReviewSenseError::EmptyCorpus);
        }

        let split = stratified_split(&labels, self.params.test_size, self.params.seed)?;
        let train_texts: Vec<&str> = split.train.iter().map(|i| cleaned[*i].as_str()).collect();
        let test_texts: Vec<&str> = split.test.iter().map(|i| cleaned[*i].as_str()).collect();
        let train_labels: Vec<SentimentLabel> = split.train.iter().map(|i| labels[*i]).collect();
        let test_labels: Vec<SentimentLabel> = split.test.iter().map(|i| labels[*i]).collect();
        info!("[{}] {} train rows, {} test rows", TrainingStage::Split, train_texts.len(), test_texts.len());

        let vectorizer = TfidfVectorizer::new(self.params.vectorizer.clone()).fit(&train_texts)?;
        let train_features = vectorizer.transform_batch(&train_texts);
        let test_features = vectorizer.transform_batch(&test_texts);
        info!("[{}] vocabulary size {}", TrainingStage::FitVectorizer, vectorizer.dimension());

        let train_counts = class_counts(&train_labels);
        let (balanced_features, balanced_labels) = self.balance(train_features, train_labels)?;
        let balanced_counts = class_counts(&balanced_labels);
        info!("[{}] {:?} -> {:?}", TrainingStage::Balance, train_counts, balanced_counts);

        let classifier = FittedClassifier::fit(
            self.params.classifier_kind,
            &self.params.svm,
            &self.params.naive_bayes,
            &balanced_features,
            &balanced_labels,
        )?;
        info!("[{}] fitted {:?} on {} rows", TrainingStage::FitClassifier, classifier.kind(), balanced_features.len_of(Axis(0)));

        let metrics = evaluate(&classifier, &test_features, &test_labels);
        info!("[{}] {:?} on {} test rows\n{}", TrainingStage::Evaluate, classifier.kind(), test_labels.len(), metrics);

        let baseline = if self.params.compare_baseline && self.params.classifier_kind != ClassifierKind::NaiveBayes {
            let baseline = self.params.naive_bayes.fit(&balanced_features, &balanced_labels)?;
            let baseline_metrics = evaluate(&baseline, &test_features, &test_labels);
            info!("[{}] naive bayes baseline\n{}", TrainingStage::Evaluate, baseline_metrics);
            Some(baseline_metrics)
        } else {
            None
        };

        Ok(TrainingOutcome {
            model: TrainedModel::new(self.params.stemmer, vectorizer, classifier, metrics),
            baseline,
            train_counts,
            balanced_counts,
            test_counts: class_counts(&test_labels),
        })
    }

    fn balance(&self, features: Array2<f64>, labels: Vec<SentimentLabel>) -> Result<(Array2<f64>, Vec<SentimentLabel>)> {
        match &self.params.balancer {
            Some(params) => Smote::new(params.clone()).balance(&features, &labels),
            None => Ok((features, labels)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use SentimentLabel::{Negative, Neutral, Positive};

    fn review(text: &str, label: SentimentLabel) -> LabeledReview {
        LabeledReview::builder().review_text(text).label(label).build()
    }

    fn reviews() -> Vec<LabeledReview> {
        let mut reviews = Vec::new();
        for i in 0..12 {
            reviews.push(review(&format!("barang bagus mantap original {}", "puas ".repeat(i % 3 + 1)), Positive));
        }
        for i in 0..6 {
            reviews.push(review(&format!("barang rusak parah kecewa {}", "retur ".repeat(i % 2 + 1)), Negative));
        }
        for _ in 0..4 {
            reviews.push(review("kualitas standar sesuai harga", Neutral));
        }
        reviews
    }

    fn params() -> TrainingParams {
        TrainingParams::builder()
            .balancer(Some(SmoteParams::builder().k_neighbors(1).build()))
            .build()
    }

    #[test]
    fn training_balances_only_the_train_split() {
        let outcome = TrainingOrchestrator::new(params()).train(&reviews()).unwrap();

        assert_eq!(outcome.test_counts[&Positive], 2);
        assert_eq!(outcome.test_counts[&Negative], 1);
        assert_eq!(outcome.test_counts[&Neutral], 1);

        assert_eq!(outcome.train_counts[&Positive], 10);
        assert!(outcome.balanced_counts.values().all(|count| *count == 10));
        assert_eq!(outcome.model.metrics.support, 4);
    }

    #[test]
    fn baseline_is_reported_when_requested() {
        let outcome = TrainingOrchestrator::new(params()).train(&reviews()).unwrap();
        assert!(outcome.baseline.is_some());

        let params = TrainingParams::builder()
            .balancer(None)
            .compare_baseline(false)
            .build();
        let outcome = TrainingOrchestrator::new(params).train(&reviews()).unwrap();
        assert!(outcome.baseline.is_none());
        assert_eq!(outcome.train_counts, outcome.balanced_counts);
    }

    #[test]
    fn empty_corpus_aborts_training() {
        let reviews = vec![
            review("yang dan di", Positive),
            review("123 !!!", Positive),
            review("ini itu", Negative),
            review("😡😡", Negative),
        ];

        assert!(matches!(
            TrainingOrchestrator::new(params()).train(&reviews),
            Err(ReviewSenseError::EmptyCorpus)
        ));
    }

    #[test]
    fn singleton_class_aborts_training() {
        let mut reviews = reviews();
        reviews.retain(|v| v.label != Neutral);
        reviews.push(review("biasa saja", Neutral));

        assert!(matches!(
            TrainingOrchestrator::new(params()).train(&reviews),
            Err(ReviewSenseError::UnstratifiableSplit { label: Neutral, count: 1 })
        ));
    }

    #[test]
    fn small_minority_aborts_training() {
        let params = TrainingParams::builder().build();

        assert!(matches!(
            TrainingOrchestrator::new(params).train(&reviews()),
            Err(ReviewSenseError::InsufficientMinority { .. })
        ));
    }

    #[test]
    fn failed_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = dir.path().join("reviews.csv");
        let model = dir.path().join("model.json");
        std::fs::write(&dataset, "review_text,sentiment_label\nbagus,positive\nbagus sekali,positive\njelek,negative\n").unwrap();

        assert!(TrainingOrchestrator::new(params()).run(&dataset, &model).is_err());
        assert!(!model.exists());
    }
}
