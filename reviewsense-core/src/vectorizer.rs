use {
    std::collections::{BTreeMap, HashMap, HashSet},
    tracing::debug,
    serde::{Serialize, Deserialize},
    typed_builder::TypedBuilder,
    ndarray::{Array1, Array2},
    rayon::prelude::*,
    crate::error::{Result, ReviewSenseError},
};

#[derive(TypedBuilder, Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TfidfParams {
    #[builder(default = 5000)]
    pub max_features: usize,
    #[builder(default = (1, 2))]
    pub ngram_range: (usize, usize),
}

/// Unfitted TF-IDF vectorizer. `fit` is the only way to get something that can transform.
#[derive(Clone, Debug)]
pub struct TfidfVectorizer {
    params: TfidfParams,
}

/// Vocabulary and idf weights learned from the training split. Never refitted.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FittedVectorizer {
    params: TfidfParams,
    vocabulary: BTreeMap<String, usize>,
    idf: Array1<f64>,
}

impl Default for TfidfParams {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl TfidfVectorizer {
    pub fn new(params: TfidfParams) -> Self {
        Self {
            params,
        }
    }

    pub fn fit<S: AsRef<str>>(&self, corpus: &[S]) -> Result<FittedVectorizer> {
        let (min_n, max_n) = self.params.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(ReviewSenseError::validation(format!("invalid ngram range: ({}, {})", min_n, max_n)));
        }
        if self.params.max_features == 0 {
            return Err(ReviewSenseError::validation("max_features must be positive"));
        }

        let mut term_counts: HashMap<String, usize> = HashMap::new();
        let mut document_frequency: HashMap<String, usize> = HashMap::new();

        for document in corpus {
            let ngrams = extract_ngrams(document.as_ref(), self.params.ngram_range);
            let unique: HashSet<&String> = ngrams.iter().collect();
            for ngram in unique {
                *document_frequency.entry(ngram.clone()).or_insert(0) += 1;
            }
            for ngram in ngrams {
                *term_counts.entry(ngram).or_insert(0) += 1;
            }
        }

        if term_counts.is_empty() {
            return Err(ReviewSenseError::EmptyCorpus);
        }

        let mut terms: Vec<(String, usize)> = term_counts.into_iter().collect();
        if terms.len() > self.params.max_features {
            terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            terms.truncate(self.params.max_features);
        }
        terms.sort_by(|a, b| a.0.cmp(&b.0));

        let total_documents = corpus.len() as f64;
        let idf: Array1<f64> = terms.iter()
            .map(|(term, _)| {
                let df = document_frequency.get(term).copied().unwrap_or(0) as f64;
                ((1.0 + total_documents) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        let vocabulary: BTreeMap<String, usize> = terms.into_iter()
            .enumerate()
            .map(|(index, (term, _))| (term, index))
            .collect();

        debug!("fitted vectorizer on {} documents, vocabulary size {}", corpus.len(), vocabulary.len());

        Ok(FittedVectorizer {
            params: self.params.clone(),
            vocabulary,
            idf,
        })
    }
}

impl FittedVectorizer {
    pub fn dimension(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn vocabulary(&self) -> &BTreeMap<String, usize> {
        &self.vocabulary
    }

    pub fn idf(&self) -> &Array1<f64> {
        &self.idf
    }

    /// L2-normalised tf-idf vector. N-grams outside the vocabulary are ignored.
    pub fn transform(&self, text: &str) -> Array1<f64> {
        let mut vector = Array1::zeros(self.dimension());

        for ngram in extract_ngrams(text, self.params.ngram_range) {
            if let Some(&index) = self.vocabulary.get(&ngram) {
                vector[index] += 1.0;
            }
        }

        vector *= &self.idf;

        let norm = vector.dot(&vector).sqrt();
        if norm > 0.0 {
            vector /= norm;
        }

        vector
    }

    pub fn transform_batch<S: AsRef<str> + Sync>(&self, texts: &[S]) -> Array2<f64> {
        let rows: Vec<Array1<f64>> = texts.par_iter()
            .map(|text| self.transform(text.as_ref()))
            .collect();

        let mut matrix = Array2::zeros((rows.len(), self.dimension()));
        for (mut target, row) in matrix.rows_mut().into_iter().zip(rows) {
            target.assign(&row);
        }

        matrix
    }

    pub(crate) fn is_consistent(&self) -> bool {
        self.idf.len() == self.vocabulary.len()
            && self.vocabulary.values().all(|&index| index < self.idf.len())
    }
}

// single-character tokens are not features
fn extract_ngrams(text: &str, (min_n, max_n): (usize, usize)) -> Vec<String> {
    let tokens: Vec<&str> = text.split_whitespace()
        .filter(|token| token.chars().count() >= 2)
        .collect();

    let mut ngrams = Vec::new();
    for n in min_n..=max_n {
        if n == 0 || n > tokens.len() {
            continue;
        }
        ngrams.extend(tokens.windows(n).map(|window| window.join(" ")));
    }

    ngrams
}
