use {
    std::collections::HashSet,
    once_cell::sync::Lazy,
};

static INDONESIAN: Lazy<StopwordSet> = Lazy::new(|| {
    let words = include_str!("../data/stopwords_id.txt")
        .lines()
        .map(str::trim)
        .filter(|v| !v.is_empty());

    StopwordSet::from_words(words)
});

#[derive(Debug, Clone, Default)]
pub struct StopwordSet {
    words: HashSet<String>,
}

impl StopwordSet {
    pub fn indonesian() -> &'static StopwordSet {
        &INDONESIAN
    }

    pub fn from_words<'a>(words: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            words: words.into_iter().map(|v| v.to_owned()).collect(),
        }
    }

    pub fn contains(&self, token: &str) -> bool {
        self.words.contains(token)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Drops every token found in `stop`. May return an empty string.
pub fn filter(text: &str, stop: &StopwordSet) -> String {
    text.split_whitespace()
        .filter(|token| !stop.contains(token))
        .collect::<Vec<_>>()
        .join(" ")
}
