use {
    std::collections::HashMap,
    once_cell::sync::Lazy,
};

const INDONESIAN_SLANG: &[(&str, &str)] = &[
    ("gk", "tidak"),
    ("ga", "tidak"),
    ("nggak", "tidak"),
    ("bgt", "banget"),
    ("bgs", "bagus"),
    ("brg", "barang"),
    ("tp", "tapi"),
    ("udh", "sudah"),
    ("blm", "belum"),
    ("pdhl", "padahal"),
    ("aja", "saja"),
    ("cepet", "cepat"),
];

static INDONESIAN: Lazy<SlangTable> = Lazy::new(|| SlangTable::from_pairs(INDONESIAN_SLANG.iter().copied()));

/// Informal token to canonical token mapping.
#[derive(Debug, Clone, Default)]
pub struct SlangTable {
    entries: HashMap<String, String>,
}

impl SlangTable {
    pub fn indonesian() -> &'static SlangTable {
        &INDONESIAN
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            entries: pairs.into_iter()
                .map(|(slang, canonical)| (slang.to_owned(), canonical.to_owned()))
                .collect(),
        }
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.entries.get(token).map(|v| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Exact-match, token-by-token substitution. Unknown tokens pass through unchanged.
pub fn rewrite(text: &str, table: &SlangTable) -> String {
    text.split_whitespace()
        .map(|token| table.get(token).unwrap_or(token))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slang_tokens_are_replaced() {
        let table = SlangTable::from_pairs([("bgt", "banget")]);
        assert_eq!(rewrite("barangnya bagus bgt", &table), "barangnya bagus banget");
    }

    #[test]
    fn lookup_is_exact_match() {
        let table = SlangTable::from_pairs([("bgt", "banget")]);
        assert_eq!(rewrite("bgtt xbgt bgt", &table), "bgtt xbgt banget");
    }

    #[test]
    fn replacement_can_span_tokens_and_order_is_kept() {
        let table = SlangTable::from_pairs([("otw", "on the way"), ("gk", "tidak")]);
        assert_eq!(rewrite("kurir otw gk telat", &table), "kurir on the way tidak telat");
    }

    #[test]
    fn builtin_table_is_loaded() {
        let table = SlangTable::indonesian();
        assert_eq!(table.len(), 12);
        assert_eq!(table.get("udh"), Some("sudah"));
        assert_eq!(table.get("sudah"), None);
    }

    #[test]
    fn empty_text_stays_empty() {
        assert_eq!(rewrite("", SlangTable::indonesian()), "");
    }
}
