use {
    std::{fs, io::{self, BufWriter, Write}, path::{Path, PathBuf}},
    tracing::info,
    serde::{Serialize, Deserialize},
    chrono::{DateTime, Utc},
    crate::{
        classifier::{Classifier, FittedClassifier},
        error::{Result, ReviewSenseError},
        metrics::Metrics,
        stemmer::StemmerKind,
        vectorizer::FittedVectorizer,
    },
};

pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct PreprocessingSettings {
    pub stemmer: StemmerKind,
}

/// Fitted vectorizer and classifier, persisted together as one document so that one can
/// never be loaded without the other.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TrainedModel {
    pub format_version: u32,
    pub trained_at: DateTime<Utc>,
    pub preprocessing: PreprocessingSettings,
    pub vectorizer: FittedVectorizer,
    pub classifier: FittedClassifier,
    pub metrics: Metrics,
}

impl TrainedModel {
    pub fn new(stemmer: StemmerKind, vectorizer: FittedVectorizer, classifier: FittedClassifier, metrics: Metrics) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            trained_at: Utc::now(),
            preprocessing: PreprocessingSettings {
                stemmer,
            },
            vectorizer,
            classifier,
            metrics,
        }
    }

    /// Writes to a temporary file next to `path` and renames it into place.
    pub fn save(&self, path: &Path) -> Result<()> {
        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&directory)?;

        let file_name = path.file_name()
            .ok_or_else(|| ReviewSenseError::validation(format!("model path {} has no file name", path.display())))?;
        let temp_path = directory.join(format!(".{}.tmp", file_name.to_string_lossy()));

        let result = self.write_to(&temp_path).and_then(|_| fs::rename(&temp_path, path));
        if let Err(err) = result {
            let _ = fs::remove_file(&temp_path);
            return Err(err.into());
        }

        info!("saved model to {} ({} features, classes: {:?})", path.display(), self.vectorizer.dimension(), self.classifier.classes());
        Ok(())
    }

    fn write_to(&self, path: &Path) -> io::Result<()> {
        let mut writer = BufWriter::new(fs::File::create(path)?);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush()?;
        writer.get_ref().sync_all()
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read(path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(ReviewSenseError::ArtifactNotFound {
                    path: path.to_path_buf(),
                });
            },
            Err(err) => return Err(err.into()),
        };

        let corrupt = |reason: String| ReviewSenseError::ArtifactCorrupt {
            path: path.to_path_buf(),
            reason,
        };

        let model: TrainedModel = serde_json::from_slice(&content).map_err(|err| corrupt(err.to_string()))?;

        if model.format_version != FORMAT_VERSION {
            return Err(corrupt(format!("unsupported format version {}, expected {}", model.format_version, FORMAT_VERSION)));
        }
        if !model.vectorizer.is_consistent() {
            return Err(corrupt("vectorizer vocabulary and idf weights disagree".to_owned()));
        }
        if !model.classifier.is_consistent() {
            return Err(corrupt("classifier parameters do not match its classes".to_owned()));
        }
        if model.vectorizer.dimension() != model.classifier.dimension() {
            return Err(corrupt(format!(
                "vectorizer produces {} features but classifier expects {}",
                model.vectorizer.dimension(),
                model.classifier.dimension()
            )));
        }

        info!("loaded model from {} trained at {}", path.display(), model.trained_at);
        Ok(model)
    }
}
