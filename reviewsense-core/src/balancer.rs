use {
    std::collections::BTreeMap,
    tracing::debug,
    serde::{Serialize, Deserialize},
    typed_builder::TypedBuilder,
    ndarray::{Array1, Array2, ArrayView1, Axis},
    rand::{Rng, SeedableRng},
    rand_xoshiro::Xoshiro256PlusPlus,
    crate::{
        entity::SentimentLabel,
        error::{Result, ReviewSenseError},
    },
};

#[derive(TypedBuilder, Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SmoteParams {
    /// With `0` no neighbours are used and minority rows are duplicated.
    #[builder(default = 5)]
    pub k_neighbors: usize,
    #[builder(default = 42)]
    pub seed: u64,
}

/// Synthetic minority oversampling. Only ever applied to the training split.
pub struct Smote {
    params: SmoteParams,
}

impl Default for SmoteParams {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Smote {
    pub fn new(params: SmoteParams) -> Self {
        Self {
            params,
        }
    }

    /// Returns the original rows followed by synthetic rows, so that every class
    /// reaches the size of the largest one.
    pub fn balance(&self, features: &Array2<f64>, labels: &[SentimentLabel]) -> Result<(Array2<f64>, Vec<SentimentLabel>)> {
        if features.nrows() != labels.len() {
            return Err(ReviewSenseError::validation(format!(
                "{} feature rows but {} labels", features.nrows(), labels.len()
            )));
        }

        let class_rows = rows_by_class(labels);
        let majority = class_rows.values().map(|rows| rows.len()).max().unwrap_or(0);
        let required = self.params.k_neighbors + 1;

        for (label, rows) in &class_rows {
            if rows.len() < majority && rows.len() < required {
                return Err(ReviewSenseError::InsufficientMinority {
                    label: *label,
                    count: rows.len(),
                    required,
                });
            }
        }

        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.params.seed);
        let mut synthetic_rows: Vec<Array1<f64>> = Vec::new();
        let mut synthetic_labels = Vec::new();

        for (label, rows) in &class_rows {
            let missing = majority - rows.len();
            if missing == 0 {
                continue;
            }

            let neighbors = nearest_neighbors(features, rows, self.params.k_neighbors);

            for _ in 0..missing {
                let sample = rng.gen_range(0..rows.len());
                let origin = features.row(rows[sample]);

                let row = if neighbors[sample].is_empty() {
                    origin.to_owned()
                } else {
                    let neighbor = features.row(neighbors[sample][rng.gen_range(0..neighbors[sample].len())]);
                    let gap: f64 = rng.gen();
                    &origin + &((&neighbor - &origin) * gap)
                };

                synthetic_rows.push(row);
                synthetic_labels.push(*label);
            }

            debug!("oversampled class {}: {} -> {} rows", label, rows.len(), majority);
        }

        let mut balanced = features.clone();
        for row in &synthetic_rows {
            balanced.push_row(row.view())
                .map_err(|err| ReviewSenseError::validation(format!("failed to append synthetic row: {}", err)))?;
        }

        let mut balanced_labels = labels.to_vec();
        balanced_labels.extend(synthetic_labels);

        Ok((balanced, balanced_labels))
    }
}

pub fn class_counts(labels: &[SentimentLabel]) -> BTreeMap<SentimentLabel, usize> {
    let mut counts = BTreeMap::new();
    for label in labels {
        *counts.entry(*label).or_insert(0) += 1;
    }
    counts
}

fn rows_by_class(labels: &[SentimentLabel]) -> BTreeMap<SentimentLabel, Vec<usize>> {
    let mut rows: BTreeMap<SentimentLabel, Vec<usize>> = BTreeMap::new();
    for (index, label) in labels.iter().enumerate() {
        rows.entry(*label).or_default().push(index);
    }
    rows
}

// for every row of the class: indices (into `features`) of its k closest same-class rows
fn nearest_neighbors(features: &Array2<f64>, rows: &[usize], k: usize) -> Vec<Vec<usize>> {
    let class_features = features.select(Axis(0), rows);

    rows.iter()
        .enumerate()
        .map(|(position, _)| {
            let origin = class_features.row(position);
            let mut distances: Vec<(f64, usize)> = rows.iter()
                .enumerate()
                .filter(|(other, _)| *other != position)
                .map(|(other, &row)| (squared_distance(origin, class_features.row(other)), row))
                .collect();

            distances.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
            distances.into_iter().take(k).map(|(_, row)| row).collect()
        })
        .collect()
}

fn squared_distance(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[cfg(test)]
mod tests {
    use {
        std::sync::{Arc, Mutex},
        ndarray::array,
        tracing::Level,
        tracing_subscriber::layer::{Context, Layer, SubscriberExt},
        super::*,
    };

    use SentimentLabel::{Negative, Neutral, Positive};

    #[test]
    fn minority_is_duplicated_without_neighbors() {
        let features = array![[1.0, 0.0], [0.9, 0.1], [0.8, 0.2], [0.0, 1.0]];
        let labels = vec![Positive, Positive, Positive, Negative];

        let smote = Smote::new(SmoteParams::builder().k_neighbors(0).build());
        let (balanced, balanced_labels) = smote.balance(&features, &labels).unwrap();

        assert_eq!(balanced.nrows(), 6);
        let counts = class_counts(&balanced_labels);
        assert_eq!(counts[&Positive], 3);
        assert_eq!(counts[&Negative], 3);

        for row in 4..6 {
            assert_eq!(balanced.row(row), features.row(3));
        }
    }

    #[test]
    fn synthetic_rows_lie_between_class_members() {
        let features = array![
            [1.0, 0.0, 0.0],
            [0.9, 0.1, 0.0],
            [0.8, 0.2, 0.0],
            [0.7, 0.3, 0.0],
            [0.0, 0.0, 1.0],
            [0.0, 0.5, 0.5],
        ];
        let labels = vec![Positive, Positive, Positive, Positive, Negative, Negative];

        let smote = Smote::new(SmoteParams::builder().k_neighbors(1).build());
        let (balanced, balanced_labels) = smote.balance(&features, &labels).unwrap();

        assert_eq!(balanced_labels, vec![Positive, Positive, Positive, Positive, Negative, Negative, Negative, Negative]);
        for row in balanced.rows().into_iter().skip(6) {
            // every synthetic row is on the segment between the two negative rows
            assert!((row[0] - 0.0).abs() < 1e-12);
            assert!((row[1] + row[2] - 1.0).abs() < 1e-12);
            assert!(row[1] >= 0.0 && row[1] <= 0.5);
        }
    }

    #[test]
    fn all_classes_reach_majority_size() {
        let features = Array2::from_shape_fn((9, 4), |(i, j)| ((i * 7 + j * 3) % 5) as f64 / 5.0);
        let labels = vec![Positive, Positive, Positive, Positive, Positive, Neutral, Neutral, Negative, Negative];

        let smote = Smote::new(SmoteParams::builder().k_neighbors(1).build());
        let (balanced, balanced_labels) = smote.balance(&features, &labels).unwrap();

        assert_eq!(balanced.nrows(), 15);
        assert!(class_counts(&balanced_labels).values().all(|count| *count == 5));
        // original rows are kept untouched and in order
        assert_eq!(balanced.slice(ndarray::s![0..9, ..]), features);
    }

    #[test]
    fn balancing_is_deterministic_for_a_seed() {
        let features = Array2::from_shape_fn((8, 3), |(i, j)| (i + j) as f64 / 10.0);
        let labels = vec![Positive, Positive, Positive, Positive, Positive, Negative, Negative, Negative];

        let smote = Smote::new(SmoteParams::builder().k_neighbors(2).seed(7).build());
        assert_eq!(smote.balance(&features, &labels).unwrap(), smote.balance(&features, &labels).unwrap());
    }

    #[test]
    fn small_minority_is_rejected() {
        let features = array![[1.0], [0.9], [0.8], [0.0], [0.1]];
        let labels = vec![Positive, Positive, Positive, Negative, Negative];

        let smote = Smote::new(SmoteParams::default());
        match smote.balance(&features, &labels) {
            Err(ReviewSenseError::InsufficientMinority { label, count, required }) => {
                assert_eq!(label, Negative);
                assert_eq!(count, 2);
                assert_eq!(required, 6);
            },
            other => panic!("expected insufficient minority error, got {:?}", other.map(|v| v.1)),
        }
    }

    struct LevelRecorder(Arc<Mutex<Vec<Level>>>);

    impl<S: tracing::Subscriber> Layer<S> for LevelRecorder {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            self.0.lock().unwrap().push(*event.metadata().level());
        }
    }

    #[test]
    fn oversampling_is_reported_per_class_at_debug() {
        let features = Array2::from_shape_fn((9, 4), |(i, j)| ((i * 7 + j * 3) % 5) as f64 / 5.0);
        let labels = vec![Positive, Positive, Positive, Positive, Positive, Neutral, Neutral, Negative, Negative];

        let levels = Arc::new(Mutex::new(Vec::new()));
        let subscriber = tracing_subscriber::registry().with(LevelRecorder(levels.clone()));
        let smote = Smote::new(SmoteParams::builder().k_neighbors(1).build());
        tracing::subscriber::with_default(subscriber, || smote.balance(&features, &labels)).unwrap();

        // one event for each of the two minority classes
        assert_eq!(*levels.lock().unwrap(), vec![Level::DEBUG, Level::DEBUG]);
    }

    #[test]
    fn balanced_input_is_unchanged() {
        let features = array![[1.0], [0.0]];
        let labels = vec![Positive, Negative];

        let (balanced, balanced_labels) = Smote::new(SmoteParams::default()).balance(&features, &labels).unwrap();
        assert_eq!(balanced, features);
        assert_eq!(balanced_labels, labels);
    }
}
