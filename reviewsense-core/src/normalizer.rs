use {
    once_cell::sync::Lazy,
    regex::Regex,
};

// a scheme-like prefix ending in "://" (or a bare www.) and everything up to the next whitespace
static URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:[a-z][a-z0-9+.\-]*://|www\.)\S+").unwrap()
});
static WHITESPACE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Case folding, URL removal, letter-only filtering and whitespace collapsing, in that order.
///
/// Characters outside `a-z` are deleted without leaving a boundary behind, so
/// `"kualitas5bintang"` becomes `"kualitasbintang"`.
pub fn normalize(text: &str) -> String {
    let text = text.to_lowercase();
    let text = URL_REGEX.replace_all(&text, "");

    let text: String = text.chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_whitespace())
        .collect();

    WHITESPACE_REGEX.replace_all(&text, " ").trim().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn review_is_cleaned() {
        assert_eq!(normalize("Barangnya BAGUS bgt!! http://x.co 123"), "barangnya bagus bgt");
    }

    #[test]
    fn symbols_are_deleted_without_boundary() {
        assert_eq!(normalize("kualitas5bintang"), "kualitasbintang");
        assert_eq!(normalize("mantap👍👍 sekali!!!"), "mantap sekali");
    }

    #[test]
    fn urls_are_removed() {
        assert_eq!(normalize("cek https://tokopedia.com/item?id=1 ya"), "cek ya");
        assert_eq!(normalize("lihat www.shop.id/abc"), "lihat");
        assert_eq!(normalize("HTTPS://EXAMPLE.COM"), "");
    }

    #[test]
    fn whitespace_is_collapsed() {
        assert_eq!(normalize("  pengiriman \t\n cepat   "), "pengiriman cepat");
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("123 !!! 456"), "");
    }

    #[test]
    fn normalize_is_idempotent() {
        let inputs = [
            "Barangnya BAGUS bgt!! http://x.co 123",
            "h.ttp://a.b rusak",
            "Ñoño ÇA   va?",
            "www.x.y www. z",
            "İstanbul ǅ ß",
            "",
        ];

        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "input: {:?}", input);
        }
    }
}
