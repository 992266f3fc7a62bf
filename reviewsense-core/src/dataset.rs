use {
    std::{fs::{self, File}, io::{Read, Write}, path::Path},
    tracing::{info, warn},
    serde::{Serialize, Deserialize},
    crate::{
        entity::{LabeledReview, RawReview, SentimentLabel},
        error::{Result, ReviewSenseError},
    },
};

pub const REVIEW_TEXT_COLUMN: &str = "review_text";
pub const SENTIMENT_LABEL_COLUMN: &str = "sentiment_label";
pub const PRODUCT_NAME_COLUMN: &str = "product_name";

#[derive(Deserialize, Debug)]
struct TrainingRow {
    review_text: Option<String>,
    sentiment_label: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ProductRow {
    product_name: Option<String>,
    review_text: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct ProcessedRow<'a> {
    pub clean_review: &'a str,
    pub sentiment_label: SentimentLabel,
}

#[derive(Serialize, Debug)]
pub struct PredictionRow<'a> {
    pub product_name: &'a str,
    pub review_text: &'a str,
    pub sentiment: SentimentLabel,
}

pub fn load_training_reviews(path: &Path) -> Result<Vec<LabeledReview>> {
    info!("loading training dataset from {}", path.display());
    read_training_reviews(File::open(path)?)
}

/// Rows with a blank text or label are dropped. A label that is present but not one of
/// the known sentiments fails the whole load.
pub fn read_training_reviews<R: Read>(source: R) -> Result<Vec<LabeledReview>> {
    let mut reader = csv_reader(source);
    require_columns(&mut reader, &[REVIEW_TEXT_COLUMN, SENTIMENT_LABEL_COLUMN])?;

    let mut reviews = Vec::new();
    let mut dropped = 0;

    for (index, row) in reader.deserialize::<TrainingRow>().enumerate() {
        let row = row?;
        let (text, label) = match (non_blank(row.review_text), non_blank(row.sentiment_label)) {
            (Some(text), Some(label)) => (text, label),
            _ => {
                dropped += 1;
                continue;
            }
        };

        let label = label.parse::<SentimentLabel>()
            .map_err(|_| ReviewSenseError::UnrecognizedLabel {
                row: index + 2,
                value: label.clone(),
            })?;

        reviews.push(LabeledReview::builder().review_text(text).label(label).build());
    }

    if dropped > 0 {
        warn!("dropped {} rows with missing review text or sentiment label", dropped);
    }
    info!("loaded {} labeled reviews", reviews.len());

    Ok(reviews)
}

pub fn load_product_reviews(path: &Path) -> Result<Vec<RawReview>> {
    info!("loading product reviews from {}", path.display());
    read_product_reviews(File::open(path)?)
}

/// Missing cells become empty strings; only a missing column is an error.
pub fn read_product_reviews<R: Read>(source: R) -> Result<Vec<RawReview>> {
    let mut reader = csv_reader(source);
    require_columns(&mut reader, &[PRODUCT_NAME_COLUMN, REVIEW_TEXT_COLUMN])?;

    let mut reviews = Vec::new();
    for row in reader.deserialize::<ProductRow>() {
        let row = row?;
        reviews.push(RawReview::builder()
            .product_name(row.product_name.unwrap_or_default())
            .review_text(row.review_text.unwrap_or_default())
            .build());
    }

    Ok(reviews)
}

pub fn write_processed_reviews(path: &Path, rows: &[ProcessedRow<'_>]) -> Result<()> {
    write_rows(path, rows)
}

pub fn write_predictions(path: &Path, rows: &[PredictionRow<'_>]) -> Result<()> {
    write_rows(path, rows)
}

fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|v| !v.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    write_csv(File::create(path)?, rows)?;
    info!("wrote {} rows to {}", rows.len(), path.display());

    Ok(())
}

pub fn write_csv<W: Write, T: Serialize>(target: W, rows: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(target);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

// header names are matched after trimming, both here and when deserializing rows
fn csv_reader<R: Read>(source: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(source)
}

fn require_columns<R: Read>(reader: &mut csv::Reader<R>, columns: &[&str]) -> Result<()> {
    let headers = reader.headers()?;

    for column in columns {
        if !headers.iter().any(|header| header == *column) {
            return Err(ReviewSenseError::validation(format!("missing required column `{}`", column)));
        }
    }

    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
