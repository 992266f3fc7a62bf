use {
    std::collections::BTreeSet,
    tracing::{debug, warn},
    serde::{Serialize, Deserialize},
    typed_builder::TypedBuilder,
    ndarray::{Array1, Array2, ArrayView1, Axis},
    rand::{seq::SliceRandom, SeedableRng},
    rand_xoshiro::Xoshiro256PlusPlus,
    crate::{
        balancer::class_counts,
        entity::SentimentLabel,
        error::{Result, ReviewSenseError},
        metrics::Metrics,
    },
};

pub trait Classifier {
    /// Classes seen at fit time, sorted. Nothing outside this list is ever predicted.
    fn classes(&self) -> &[SentimentLabel];

    fn dimension(&self) -> usize;

    /// One score per entry of `classes()`.
    fn decision_function(&self, features: ArrayView1<f64>) -> Array1<f64>;

    fn predict(&self, features: ArrayView1<f64>) -> SentimentLabel {
        let scores = self.decision_function(features);

        let mut best = 0;
        for (index, score) in scores.iter().enumerate() {
            if *score > scores[best] {
                best = index;
            }
        }

        self.classes()[best]
    }

    fn predict_batch(&self, features: &Array2<f64>) -> Vec<SentimentLabel> {
        features.rows()
            .into_iter()
            .map(|row| self.predict(row))
            .collect()
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierKind {
    #[default]
    LinearSvm,
    NaiveBayes,
}

#[derive(TypedBuilder, Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LinearSvmParams {
    #[builder(default = 1.0)]
    pub c: f64,
    #[builder(default = 1000)]
    pub max_iter: usize,
    #[builder(default = 0.1)]
    pub tolerance: f64,
    #[builder(default = true)]
    pub class_weight_balanced: bool,
    #[builder(default = 42)]
    pub seed: u64,
}

/// One-vs-rest linear SVM, squared hinge loss with L2 regularisation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LinearSvm {
    classes: Vec<SentimentLabel>,
    weights: Array2<f64>,
    intercepts: Array1<f64>,
}

#[derive(TypedBuilder, Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct NaiveBayesParams {
    #[builder(default = 1.0)]
    pub alpha: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MultinomialNaiveBayes {
    classes: Vec<SentimentLabel>,
    class_log_prior: Array1<f64>,
    feature_log_prob: Array2<f64>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FittedClassifier {
    LinearSvm(LinearSvm),
    NaiveBayes(MultinomialNaiveBayes),
}

impl Default for LinearSvmParams {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Default for NaiveBayesParams {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl LinearSvmParams {
    pub fn fit(&self, features: &Array2<f64>, labels: &[SentimentLabel]) -> Result<LinearSvm> {
        let classes = check_training_data(features, labels)?;
        if self.c <= 0.0 {
            return Err(ReviewSenseError::validation(format!("svm cost must be positive, got {}", self.c)));
        }

        let costs = self.sample_costs(labels, classes.len());
        let squared_norms: Vec<f64> = features.axis_iter(Axis(0))
            .map(|row| row.dot(&row) + 1.0)
            .collect();

        let mut weights: Array2<f64> = Array2::zeros((classes.len(), features.ncols()));
        let mut intercepts: Array1<f64> = Array1::zeros(classes.len());

        // one binary problem per class, each needs a full pass over the data
        for (class_index, class) in classes.iter().enumerate() {
            let targets: Vec<f64> = labels.iter()
                .map(|label| if label == class { 1.0 } else { -1.0 })
                .collect();

            let (w, b) = self.fit_binary(features, &targets, &costs, &squared_norms, class_index as u64);
            weights.row_mut(class_index).assign(&w);
            intercepts[class_index] = b;
        }

        Ok(LinearSvm {
            classes,
            weights,
            intercepts,
        })
    }

    // dual coordinate descent for the squared hinge loss, bias as an extra constant feature
    fn fit_binary(
        &self,
        features: &Array2<f64>,
        targets: &[f64],
        costs: &[f64],
        squared_norms: &[f64],
        stream: u64,
    ) -> (Array1<f64>, f64) {
        let samples = features.nrows();
        let diagonal: Vec<f64> = costs.iter().map(|c| 0.5 / c).collect();

        let mut w: Array1<f64> = Array1::zeros(features.ncols());
        let mut b = 0.0;
        let mut alpha = vec![0.0; samples];
        let mut order: Vec<usize> = (0..samples).collect();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.seed.wrapping_add(stream));

        for iteration in 0..self.max_iter {
            order.shuffle(&mut rng);
            let mut max_violation: f64 = 0.0;

            for &i in &order {
                let row = features.row(i);
                let y = targets[i];

                let gradient = y * (w.dot(&row) + b) - 1.0 + diagonal[i] * alpha[i];
                let projected = if alpha[i] == 0.0 { gradient.min(0.0) } else { gradient };
                max_violation = max_violation.max(projected.abs());

                if projected.abs() > 1e-12 {
                    let previous = alpha[i];
                    alpha[i] = (alpha[i] - gradient / (squared_norms[i] + diagonal[i])).max(0.0);

                    let step = (alpha[i] - previous) * y;
                    w.scaled_add(step, &row);
                    b += step;
                }
            }

            if max_violation < self.tolerance {
                debug!("svm converged after {} iterations", iteration + 1);
                return (w, b);
            }
        }

        warn!("svm reached max_iter ({}) without converging", self.max_iter);
        (w, b)
    }

    fn sample_costs(&self, labels: &[SentimentLabel], total_classes: usize) -> Vec<f64> {
        if !self.class_weight_balanced {
            return vec![self.c; labels.len()];
        }

        let counts = class_counts(labels);
        labels.iter()
            .map(|label| {
                let count = counts.get(label).copied().unwrap_or(1) as f64;
                self.c * labels.len() as f64 / (total_classes as f64 * count)
            })
            .collect()
    }
}

impl Classifier for LinearSvm {
    fn classes(&self) -> &[SentimentLabel] {
        &self.classes
    }

    fn dimension(&self) -> usize {
        self.weights.ncols()
    }

    fn decision_function(&self, features: ArrayView1<f64>) -> Array1<f64> {
        self.weights.dot(&features) + &self.intercepts
    }
}

impl NaiveBayesParams {
    pub fn fit(&self, features: &Array2<f64>, labels: &[SentimentLabel]) -> Result<MultinomialNaiveBayes> {
        let classes = check_training_data(features, labels)?;
        if self.alpha <= 0.0 {
            return Err(ReviewSenseError::validation(format!("naive bayes alpha must be positive, got {}", self.alpha)));
        }
        if features.iter().any(|v| *v < 0.0) {
            return Err(ReviewSenseError::validation("naive bayes needs non-negative features"));
        }

        let total = labels.len() as f64;
        let mut class_log_prior: Array1<f64> = Array1::zeros(classes.len());
        let mut feature_log_prob: Array2<f64> = Array2::zeros((classes.len(), features.ncols()));

        for (class_index, class) in classes.iter().enumerate() {
            let rows: Vec<usize> = labels.iter()
                .enumerate()
                .filter(|(_, label)| *label == class)
                .map(|(index, _)| index)
                .collect();

            class_log_prior[class_index] = (rows.len() as f64 / total).ln();

            let smoothed = features.select(Axis(0), &rows).sum_axis(Axis(0)) + self.alpha;
            let normalizer = smoothed.sum();
            feature_log_prob.row_mut(class_index).assign(&smoothed.mapv(|v| (v / normalizer).ln()));
        }

        Ok(MultinomialNaiveBayes {
            classes,
            class_log_prior,
            feature_log_prob,
        })
    }
}

impl Classifier for MultinomialNaiveBayes {
    fn classes(&self) -> &[SentimentLabel] {
        &self.classes
    }

    fn dimension(&self) -> usize {
        self.feature_log_prob.ncols()
    }

    fn decision_function(&self, features: ArrayView1<f64>) -> Array1<f64> {
        self.feature_log_prob.dot(&features) + &self.class_log_prior
    }
}

impl FittedClassifier {
    pub fn fit(kind: ClassifierKind, svm: &LinearSvmParams, naive_bayes: &NaiveBayesParams, features: &Array2<f64>, labels: &[SentimentLabel]) -> Result<Self> {
        Ok(match kind {
            ClassifierKind::LinearSvm => FittedClassifier::LinearSvm(svm.fit(features, labels)?),
            ClassifierKind::NaiveBayes => FittedClassifier::NaiveBayes(naive_bayes.fit(features, labels)?),
        })
    }

    pub fn kind(&self) -> ClassifierKind {
        match self {
            FittedClassifier::LinearSvm(_) => ClassifierKind::LinearSvm,
            FittedClassifier::NaiveBayes(_) => ClassifierKind::NaiveBayes,
        }
    }

    fn inner(&self) -> &dyn Classifier {
        match self {
            FittedClassifier::LinearSvm(model) => model,
            FittedClassifier::NaiveBayes(model) => model,
        }
    }

    pub(crate) fn is_consistent(&self) -> bool {
        let (rows, scores) = match self {
            FittedClassifier::LinearSvm(model) => (model.weights.nrows(), model.intercepts.len()),
            FittedClassifier::NaiveBayes(model) => (model.feature_log_prob.nrows(), model.class_log_prior.len()),
        };
        let classes = self.classes();

        !classes.is_empty()
            && rows == classes.len()
            && scores == classes.len()
            && classes.windows(2).all(|pair| pair[0] < pair[1])
    }
}

impl Classifier for FittedClassifier {
    fn classes(&self) -> &[SentimentLabel] {
        self.inner().classes()
    }

    fn dimension(&self) -> usize {
        self.inner().dimension()
    }

    fn decision_function(&self, features: ArrayView1<f64>) -> Array1<f64> {
        self.inner().decision_function(features)
    }
}

/// Scores a fitted classifier on held-out rows. Training-time only.
pub fn evaluate<C: Classifier>(classifier: &C, features: &Array2<f64>, labels: &[SentimentLabel]) -> Metrics {
    let predicted = classifier.predict_batch(features);
    Metrics::from_predictions(labels, &predicted)
}

fn check_training_data(features: &Array2<f64>, labels: &[SentimentLabel]) -> Result<Vec<SentimentLabel>> {
    if features.nrows() != labels.len() {
        return Err(ReviewSenseError::validation(format!(
            "{} feature rows but {} labels", features.nrows(), labels.len()
        )));
    }

    let classes: Vec<SentimentLabel> = labels.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
    if classes.len() < 2 {
        return Err(ReviewSenseError::validation(format!(
            "training needs at least two classes, found {}", classes.len()
        )));
    }

    Ok(classes)
}

#[cfg(test)]
mod tests {
    use {
        ndarray::array,
        super::*,
    };

    use SentimentLabel::{Negative, Neutral, Positive};

    fn separable() -> (Array2<f64>, Vec<SentimentLabel>) {
        let features = array![
            [1.0, 0.0, 0.0],
            [0.9, 0.1, 0.0],
            [0.8, 0.0, 0.2],
            [0.0, 1.0, 0.0],
            [0.1, 0.9, 0.0],
            [0.0, 0.8, 0.2],
            [0.0, 0.0, 1.0],
            [0.2, 0.0, 0.8],
            [0.0, 0.1, 0.9],
        ];
        let labels = vec![Positive, Positive, Positive, Negative, Negative, Negative, Neutral, Neutral, Neutral];
        (features, labels)
    }

    #[test]
    fn svm_separates_classes() {
        let (features, labels) = separable();
        let model = LinearSvmParams::default().fit(&features, &labels).unwrap();

        assert_eq!(model.classes(), &[Negative, Neutral, Positive]);
        assert_eq!(model.predict_batch(&features), labels);
        assert_eq!(model.predict(array![0.95, 0.05, 0.0].view()), Positive);
    }

    #[test]
    fn naive_bayes_separates_classes() {
        let (features, labels) = separable();
        let model = NaiveBayesParams::default().fit(&features, &labels).unwrap();

        assert_eq!(model.predict_batch(&features), labels);
        assert_eq!(model.dimension(), 3);
    }

    #[test]
    fn binary_model_never_predicts_unseen_class() {
        let features = array![[1.0, 0.0], [0.8, 0.2], [0.0, 1.0], [0.3, 0.7]];
        let labels = vec![Positive, Positive, Negative, Negative];
        let model = FittedClassifier::fit(
            ClassifierKind::LinearSvm,
            &LinearSvmParams::default(),
            &NaiveBayesParams::default(),
            &features,
            &labels,
        ).unwrap();

        for probe in [array![0.0, 0.0], array![0.5, 0.5], array![10.0, -3.0], array![-1.0, -1.0]] {
            assert_ne!(model.predict(probe.view()), Neutral);
        }
    }

    #[test]
    fn predictions_are_deterministic() {
        let (features, labels) = separable();
        let first = LinearSvmParams::default().fit(&features, &labels).unwrap();
        let second = LinearSvmParams::default().fit(&features, &labels).unwrap();

        assert_eq!(first, second);
        let probe = array![0.3, 0.3, 0.4];
        assert_eq!(first.predict(probe.view()), second.predict(probe.view()));
    }

    #[test]
    fn single_class_is_rejected() {
        let features = array![[1.0], [0.5]];
        let labels = vec![Positive, Positive];

        assert!(matches!(LinearSvmParams::default().fit(&features, &labels), Err(ReviewSenseError::Validation(_))));
        assert!(matches!(NaiveBayesParams::default().fit(&features, &labels), Err(ReviewSenseError::Validation(_))));
    }

    #[test]
    fn mismatched_rows_are_rejected() {
        let features = array![[1.0], [0.5]];
        assert!(LinearSvmParams::default().fit(&features, &[Positive]).is_err());
    }

    #[test]
    fn class_weights_favour_rare_class() {
        let svm = LinearSvmParams::default();
        let labels = vec![Positive, Positive, Positive, Negative];

        let costs = svm.sample_costs(&labels, 2);
        assert!((costs[0] - 4.0 / 6.0).abs() < 1e-12);
        assert!((costs[3] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn evaluate_scores_held_out_rows() {
        let (features, labels) = separable();
        let model = NaiveBayesParams::default().fit(&features, &labels).unwrap();

        let metrics = evaluate(&model, &features, &labels);
        assert_eq!(metrics.accuracy, 1.0);
        assert_eq!(metrics.per_class.len(), 3);
    }

    #[test]
    fn fitted_classifier_roundtrips_through_json() {
        let (features, labels) = separable();
        let model = FittedClassifier::LinearSvm(LinearSvmParams::default().fit(&features, &labels).unwrap());

        let json = serde_json::to_string(&model).unwrap();
        assert!(json.contains("\"kind\":\"linear_svm\""));

        let restored: FittedClassifier = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, model);
        assert!(restored.is_consistent());
    }
}
