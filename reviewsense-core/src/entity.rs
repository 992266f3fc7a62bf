use {
    std::{fmt, str::FromStr},
    serde::{Serialize, Deserialize},
    typed_builder::TypedBuilder,
};

// declaration order is also the sorted class order used by the classifiers
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Negative,
    Neutral,
    Positive,
}

#[derive(Deserialize, Serialize, TypedBuilder, Clone, Debug, PartialEq)]
pub struct RawReview {
    #[builder(setter(into))]
    pub product_name: String,
    #[builder(setter(into))]
    pub review_text: String,
}

#[derive(TypedBuilder, Clone, Debug, PartialEq)]
pub struct LabeledReview {
    #[builder(setter(into))]
    pub review_text: String,
    pub label: SentimentLabel,
}

impl SentimentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Positive => "positive",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SentimentLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "negative" => Ok(SentimentLabel::Negative),
            "neutral" => Ok(SentimentLabel::Neutral),
            "positive" => Ok(SentimentLabel::Positive),
            other => Err(format!("unexpected sentiment label: {:?}", other)),
        }
    }
}
