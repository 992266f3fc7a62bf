use serde::{Serialize, Deserialize};

pub trait Stemmer: Send + Sync {
    fn stem(&self, token: &str) -> String;
}

/// Which stemmer a pipeline was built with. Stored in the model bundle so inference
/// rebuilds the training-time pipeline.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StemmerKind {
    None,
    #[default]
    Indonesian,
}

pub struct NoopStemmer;

/// Dictionary-free affix stripping for Indonesian. Best effort: without a root word
/// dictionary, ambiguous nasal prefixes are recoded with their most common root letter.
pub struct IndonesianStemmer;

const MIN_INFLECTIONAL_ROOT: usize = 3;
const MIN_DERIVATIONAL_ROOT: usize = 4;
const MAX_PREFIXES: usize = 2;

const PARTICLES: &[&str] = &["lah", "kah", "tah", "pun"];
const POSSESSIVES: &[&str] = &["nya", "ku", "mu"];
const DERIVATIONAL_SUFFIXES: &[&str] = &["kan", "an"];

impl StemmerKind {
    pub fn build(&self) -> Box<dyn Stemmer> {
        match self {
            StemmerKind::None => Box::new(NoopStemmer),
            StemmerKind::Indonesian => Box::new(IndonesianStemmer),
        }
    }
}

impl Stemmer for NoopStemmer {
    fn stem(&self, token: &str) -> String {
        token.to_owned()
    }
}

impl Stemmer for IndonesianStemmer {
    fn stem(&self, token: &str) -> String {
        let word = strip_any_suffix(token, PARTICLES, MIN_INFLECTIONAL_ROOT);
        let word = strip_any_suffix(&word, POSSESSIVES, MIN_INFLECTIONAL_ROOT);

        let mut word = word;
        for _ in 0..MAX_PREFIXES {
            match strip_prefix(&word) {
                Some(stripped) => word = stripped,
                None => break,
            }
        }

        strip_any_suffix(&word, DERIVATIONAL_SUFFIXES, MIN_DERIVATIONAL_ROOT)
    }
}

fn strip_any_suffix(word: &str, suffixes: &[&str], min_root: usize) -> String {
    for suffix in suffixes {
        if let Some(root) = word.strip_suffix(suffix) {
            if root.chars().count() >= min_root {
                return root.to_owned();
            }
        }
    }

    word.to_owned()
}

fn strip_prefix(word: &str) -> Option<String> {
    let root = recode_prefix(word)?;
    if root.chars().count() >= MIN_DERIVATIONAL_ROOT {
        Some(root)
    } else {
        None
    }
}

fn recode_prefix(word: &str) -> Option<String> {
    for prefix in ["memper", "diper", "di", "ke", "se", "ber", "ter", "per"] {
        if let Some(rest) = word.strip_prefix(prefix) {
            return Some(rest.to_owned());
        }
    }

    // nasal prefixes, longest first
    for (long, short) in [("meny", "peny"), ("meng", "peng"), ("mem", "pem"), ("men", "pen"), ("me", "pe")] {
        let rest = match word.strip_prefix(long).or_else(|| word.strip_prefix(short)) {
            Some(v) => v,
            None => continue,
        };
        let next = rest.chars().next()?;
        let vowel = is_vowel(next);

        let root = match long {
            "meny" if vowel => format!("s{}", rest),
            "meng" if vowel => format!("k{}", rest),
            "meng" if matches!(next, 'g' | 'h' | 'k') => rest.to_owned(),
            "mem" if vowel => format!("p{}", rest),
            "mem" if matches!(next, 'b' | 'f' | 'v') => rest.to_owned(),
            "men" if vowel => format!("t{}", rest),
            "men" if matches!(next, 'c' | 'd' | 'j' | 'z') => rest.to_owned(),
            "me" if matches!(next, 'l' | 'r' | 'w' | 'y' | 'm' | 'n') => rest.to_owned(),
            _ => continue,
        };

        return Some(root);
    }

    None
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}
