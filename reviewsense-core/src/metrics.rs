use {
    std::{collections::{BTreeMap, BTreeSet}, fmt},
    serde::{Serialize, Deserialize},
    crate::entity::SentimentLabel,
};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Metrics {
    pub accuracy: f64,
    pub per_class: BTreeMap<SentimentLabel, ClassMetrics>,
    pub support: usize,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

impl Metrics {
    /// Classes reported are the union of the true and predicted labels.
    pub fn from_predictions(truth: &[SentimentLabel], predicted: &[SentimentLabel]) -> Self {
        let support = truth.len().min(predicted.len());
        let pairs: Vec<(SentimentLabel, SentimentLabel)> = truth.iter().copied().zip(predicted.iter().copied()).collect();

        let correct = pairs.iter().filter(|(t, p)| t == p).count();
        let accuracy = if support == 0 { 0.0 } else { correct as f64 / support as f64 };

        let classes: BTreeSet<SentimentLabel> = pairs.iter().flat_map(|(t, p)| [*t, *p]).collect();
        let per_class = classes.into_iter()
            .map(|class| {
                let true_positives = pairs.iter().filter(|(t, p)| *t == class && *p == class).count();
                let predicted_positives = pairs.iter().filter(|(_, p)| *p == class).count();
                let actual_positives = pairs.iter().filter(|(t, _)| *t == class).count();

                let precision = ratio(true_positives, predicted_positives);
                let recall = ratio(true_positives, actual_positives);
                let f1 = if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else {
                    0.0
                };

                (class, ClassMetrics {
                    precision,
                    recall,
                    f1,
                    support: actual_positives,
                })
            })
            .collect();

        Self {
            accuracy,
            per_class,
            support,
        }
    }

    pub fn macro_f1(&self) -> f64 {
        if self.per_class.is_empty() {
            return 0.0;
        }

        self.per_class.values().map(|v| v.f1).sum::<f64>() / self.per_class.len() as f64
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>12} {:>10} {:>10} {:>10} {:>10}", "", "precision", "recall", "f1-score", "support")?;
        for (label, metrics) in &self.per_class {
            writeln!(
                f,
                "{:>12} {:>10.2} {:>10.2} {:>10.2} {:>10}",
                label.as_str(), metrics.precision, metrics.recall, metrics.f1, metrics.support
            )?;
        }
        writeln!(f)?;
        writeln!(f, "{:>12} {:>10} {:>10} {:>10.2} {:>10}", "accuracy", "", "", self.accuracy, self.support)?;
        write!(f, "{:>12} {:>10} {:>10} {:>10.2} {:>10}", "macro f1", "", "", self.macro_f1(), self.support)
    }
}
