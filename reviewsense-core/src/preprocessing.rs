use {
    rayon::prelude::*,
    crate::{
        normalizer::normalize,
        slang::{self, SlangTable},
        stemmer::{Stemmer, StemmerKind},
        stopwords::{self, StopwordSet},
    },
};

/// Raw review text to cleaned text. Training and inference must go through the same
/// pipeline, otherwise the fitted vocabulary no longer matches what is being vectorized.
pub struct PreprocessingPipeline {
    slang: &'static SlangTable,
    stopwords: &'static StopwordSet,
    stemmer: Box<dyn Stemmer>,
}

impl PreprocessingPipeline {
    pub fn new(slang: &'static SlangTable, stopwords: &'static StopwordSet, stemmer: Box<dyn Stemmer>) -> Self {
        Self {
            slang,
            stopwords,
            stemmer,
        }
    }

    pub fn indonesian(stemmer: StemmerKind) -> Self {
        Self::new(SlangTable::indonesian(), StopwordSet::indonesian(), stemmer.build())
    }

    pub fn preprocess(&self, text: &str) -> String {
        let text = normalize(text);
        let text = slang::rewrite(&text, self.slang);
        let text = stopwords::filter(&text, self.stopwords);

        text.split_whitespace()
            .map(|token| self.stemmer.stem(token))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Rows are independent, so the batch is cleaned in parallel. Output order matches input order.
    pub fn preprocess_batch<S: AsRef<str> + Sync>(&self, texts: &[S]) -> Vec<String> {
        texts.par_iter()
            .map(|text| self.preprocess(text.as_ref()))
            .collect()
    }
}
