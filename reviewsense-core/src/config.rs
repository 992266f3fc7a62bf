use {
    std::{fs::read_to_string, path::PathBuf},
    serde::Deserialize,
    crate::{
        balancer::SmoteParams,
        classifier::{ClassifierKind, LinearSvmParams, NaiveBayesParams},
        stemmer::StemmerKind,
        training::TrainingParams,
        vectorizer::TfidfParams,
    },
};

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    paths: Option<PathsConfig>,
    #[serde(default)]
    pub preprocessing: PreprocessingConfig,
    #[serde(default)]
    pub vectorizer: VectorizerConfig,
    #[serde(default)]
    pub balancer: BalancerConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub training: TrainingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Deserialize, Clone, Debug)]
pub struct PathsConfig {
    raw_dataset: Option<PathBuf>,
    processed_dataset: Option<PathBuf>,
    model: Option<PathBuf>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct PreprocessingConfig {
    #[serde(default)]
    pub stemmer: StemmerKind,
}

#[derive(Deserialize, Clone, Debug)]
pub struct VectorizerConfig {
    max_features: Option<usize>,
    ngram_range: Option<(usize, usize)>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct BalancerConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    k_neighbors: Option<usize>,
    seed: Option<u64>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub kind: ClassifierKind,
    c: Option<f64>,
    max_iter: Option<usize>,
    tolerance: Option<f64>,
    class_weight_balanced: Option<bool>,
    alpha: Option<f64>,
    #[serde(default = "default_compare_baseline")]
    pub compare_baseline: bool,
    seed: Option<u64>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct TrainingConfig {
    test_size: Option<f64>,
    seed: Option<u64>,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub json: bool,
}

fn default_enabled() -> bool {
    true
}

fn default_compare_baseline() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: None,
            preprocessing: PreprocessingConfig::default(),
            vectorizer: VectorizerConfig::default(),
            balancer: BalancerConfig::default(),
            classifier: ClassifierConfig::default(),
            training: TrainingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            raw_dataset: None,
            processed_dataset: None,
            model: None,
        }
    }
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            stemmer: StemmerKind::default(),
        }
    }
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            max_features: None,
            ngram_range: None,
        }
    }
}

impl Default for BalancerConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            k_neighbors: None,
            seed: None,
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            kind: ClassifierKind::default(),
            c: None,
            max_iter: None,
            tolerance: None,
            class_weight_balanced: None,
            alpha: None,
            compare_baseline: default_compare_baseline(),
            seed: None,
        }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_size: None,
            seed: None,
        }
    }
}

impl Config {
    /// Reads `./config.toml`, then `/config/config.toml`.
    pub fn load() -> Result<Self, String> {
        read_to_string("./config.toml")
            .or_else(|_| read_to_string("/config/config.toml"))
            .map_err(|err| err.to_string())
            .and_then(|v| Self::from_toml(&v))
    }

    pub fn from_toml(source: &str) -> Result<Self, String> {
        toml::from_str(source).map_err(|err| err.to_string())
    }

    pub fn paths(&self) -> PathsConfig {
        self.paths.as_ref().cloned().unwrap_or_default()
    }

    pub fn training_params(&self) -> TrainingParams {
        TrainingParams::builder()
            .stemmer(self.preprocessing.stemmer)
            .vectorizer(self.vectorizer.params())
            .balancer(if self.balancer.enabled { Some(self.balancer.params()) } else { None })
            .classifier_kind(self.classifier.kind)
            .svm(self.classifier.svm_params())
            .naive_bayes(self.classifier.naive_bayes_params())
            .compare_baseline(self.classifier.compare_baseline)
            .test_size(self.training.test_size())
            .seed(self.training.seed())
            .build()
    }
}

impl PathsConfig {
    pub fn raw_dataset(&self) -> PathBuf {
        self.raw_dataset.as_ref().cloned().unwrap_or_else(|| PathBuf::from("data/raw/tokopedia_product_reviews_2025.csv"))
    }

    pub fn processed_dataset(&self) -> PathBuf {
        self.processed_dataset.as_ref().cloned().unwrap_or_else(|| PathBuf::from("data/processed/reviews_clean.csv"))
    }

    pub fn model(&self) -> PathBuf {
        self.model.as_ref().cloned().unwrap_or_else(|| PathBuf::from("model/sentiment_model.json"))
    }
}

impl VectorizerConfig {
    pub fn params(&self) -> TfidfParams {
        let defaults = TfidfParams::default();

        TfidfParams::builder()
            .max_features(self.max_features.unwrap_or(defaults.max_features))
            .ngram_range(self.ngram_range.unwrap_or(defaults.ngram_range))
            .build()
    }
}

impl BalancerConfig {
    pub fn params(&self) -> SmoteParams {
        let defaults = SmoteParams::default();

        SmoteParams::builder()
            .k_neighbors(self.k_neighbors.unwrap_or(defaults.k_neighbors))
            .seed(self.seed.unwrap_or(defaults.seed))
            .build()
    }
}

impl ClassifierConfig {
    pub fn svm_params(&self) -> LinearSvmParams {
        let defaults = LinearSvmParams::default();

        LinearSvmParams::builder()
            .c(self.c.unwrap_or(defaults.c))
            .max_iter(self.max_iter.unwrap_or(defaults.max_iter))
            .tolerance(self.tolerance.unwrap_or(defaults.tolerance))
            .class_weight_balanced(self.class_weight_balanced.unwrap_or(defaults.class_weight_balanced))
            .seed(self.seed.unwrap_or(defaults.seed))
            .build()
    }

    pub fn naive_bayes_params(&self) -> NaiveBayesParams {
        NaiveBayesParams::builder()
            .alpha(self.alpha.unwrap_or(NaiveBayesParams::default().alpha))
            .build()
    }
}

impl TrainingConfig {
    pub fn test_size(&self) -> f64 {
        self.test_size.unwrap_or(0.2)
    }

    pub fn seed(&self) -> u64 {
        self.seed.unwrap_or(42)
    }
}
