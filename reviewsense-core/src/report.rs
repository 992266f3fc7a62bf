use {
    std::{collections::{BTreeMap, HashMap}, fmt},
    serde::Serialize,
    crate::{
        entity::{RawReview, SentimentLabel},
        error::{Result, ReviewSenseError},
    },
};

pub const TOP_NEGATIVE_WORDS: usize = 5;

#[derive(Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SentimentCounts {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ReputationSummary {
    pub counts: SentimentCounts,
    pub health_score: f64,
    pub top_negative_words: Vec<(String, usize)>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ReputationReport {
    pub overall: ReputationSummary,
    pub products: BTreeMap<String, ReputationSummary>,
}

impl SentimentCounts {
    pub fn add(&mut self, label: SentimentLabel) {
        match label {
            SentimentLabel::Positive => self.positive += 1,
            SentimentLabel::Neutral => self.neutral += 1,
            SentimentLabel::Negative => self.negative += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.positive + self.neutral + self.negative
    }

    /// Share of positive reviews in percent, rounded to one decimal. Zero without reviews.
    pub fn health_score(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }

        (self.positive as f64 / total as f64 * 1000.0).round() / 10.0
    }
}

impl ReputationSummary {
    fn from_rows<'a>(rows: impl Iterator<Item = (&'a RawReview, SentimentLabel)> + Clone) -> Self {
        let mut counts = SentimentCounts::default();
        for (_, label) in rows.clone() {
            counts.add(label);
        }

        let negative_texts = rows
            .filter(|(_, label)| *label == SentimentLabel::Negative)
            .map(|(review, _)| review.review_text.as_str());

        Self {
            counts,
            health_score: counts.health_score(),
            top_negative_words: most_common_words(negative_texts, TOP_NEGATIVE_WORDS),
        }
    }
}

impl ReputationReport {
    /// `labels[i]` is the predicted sentiment of `reviews[i]`.
    pub fn build(reviews: &[RawReview], labels: &[SentimentLabel]) -> Result<Self> {
        if reviews.len() != labels.len() {
            return Err(ReviewSenseError::validation(format!(
                "{} reviews but {} predicted labels", reviews.len(), labels.len()
            )));
        }

        let rows = reviews.iter().zip(labels.iter().copied());

        let mut by_product: BTreeMap<&str, Vec<(&RawReview, SentimentLabel)>> = BTreeMap::new();
        for (review, label) in rows.clone() {
            by_product.entry(review.product_name.as_str()).or_default().push((review, label));
        }

        let products = by_product.into_iter()
            .map(|(product, rows)| (product.to_owned(), ReputationSummary::from_rows(rows.into_iter())))
            .collect();

        Ok(Self {
            overall: ReputationSummary::from_rows(rows),
            products,
        })
    }

    /// `None` selects every product.
    pub fn summary(&self, product: Option<&str>) -> Option<&ReputationSummary> {
        match product {
            Some(product) => self.products.get(product),
            None => Some(&self.overall),
        }
    }
}

/// Lowercased whitespace tokens by frequency. Ties keep the order of first occurrence.
pub fn most_common_words<'a>(texts: impl Iterator<Item = &'a str>, limit: usize) -> Vec<(String, usize)> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();

    for text in texts {
        for word in text.to_lowercase().split_whitespace() {
            match positions.get(word) {
                Some(&position) => counts[position].1 += 1,
                None => {
                    positions.insert(word.to_owned(), counts.len());
                    counts.push((word.to_owned(), 1));
                }
            }
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(limit);
    counts
}

impl fmt::Display for ReputationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "total reviews: {}", self.counts.total())?;
        writeln!(f, "positive: {}", self.counts.positive)?;
        writeln!(f, "neutral: {}", self.counts.neutral)?;
        writeln!(f, "negative: {}", self.counts.negative)?;
        writeln!(f, "health score: {:.1}%", self.health_score)?;

        if self.top_negative_words.is_empty() {
            write!(f, "top negative words: -")
        } else {
            let words: Vec<String> = self.top_negative_words.iter()
                .map(|(word, count)| format!("{} ({})", word, count))
                .collect();
            write!(f, "top negative words: {}", words.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use SentimentLabel::{Negative, Neutral, Positive};

    fn review(product: &str, text: &str) -> RawReview {
        RawReview::builder().product_name(product).review_text(text).build()
    }

    #[test]
    fn health_score_is_rounded_share_of_positives() {
        let counts = SentimentCounts { positive: 2, neutral: 0, negative: 1 };
        assert_eq!(counts.health_score(), 66.7);

        let counts = SentimentCounts { positive: 1, neutral: 1, negative: 1 };
        assert_eq!(counts.health_score(), 33.3);

        assert_eq!(SentimentCounts::default().health_score(), 0.0);
    }

    #[test]
    fn most_common_words_break_ties_by_first_occurrence() {
        let texts = vec!["Rusak parah", "kecewa RUSAK", "parah lambat kecewa", "zzz yyy"];
        let words = most_common_words(texts.into_iter(), 4);

        assert_eq!(words, vec![
            ("rusak".to_owned(), 2),
            ("parah".to_owned(), 2),
            ("kecewa".to_owned(), 2),
            ("lambat".to_owned(), 1),
        ]);
    }

    #[test]
    fn report_groups_by_product() {
        let reviews = vec![
            review("Sepatu", "Mantap"),
            review("Sepatu", "Jahitan lepas, kecewa"),
            review("Tas", "Biasa saja"),
            review("Tas", "Mantap jiwa"),
        ];
        let labels = vec![Positive, Negative, Neutral, Positive];

        let report = ReputationReport::build(&reviews, &labels).unwrap();

        let all = report.summary(None).unwrap();
        assert_eq!(all.counts, SentimentCounts { positive: 2, neutral: 1, negative: 1 });
        assert_eq!(all.health_score, 50.0);
        assert_eq!(all.top_negative_words[0], ("jahitan".to_owned(), 1));

        let shoes = report.summary(Some("Sepatu")).unwrap();
        assert_eq!(shoes.counts.total(), 2);
        assert_eq!(shoes.health_score, 50.0);

        let bags = report.summary(Some("Tas")).unwrap();
        assert!(bags.top_negative_words.is_empty());
        assert!(report.summary(Some("Topi")).is_none());
    }

    #[test]
    fn empty_report_has_zero_health() {
        let report = ReputationReport::build(&[], &[]).unwrap();

        assert_eq!(report.overall.health_score, 0.0);
        assert!(report.products.is_empty());
    }

    #[test]
    fn label_count_must_match() {
        assert!(ReputationReport::build(&[review("Tas", "ok")], &[]).is_err());
    }
}
