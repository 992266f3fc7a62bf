use {
    std::collections::BTreeMap,
    rand::{seq::SliceRandom, SeedableRng},
    rand_xoshiro::Xoshiro256PlusPlus,
    crate::{
        entity::SentimentLabel,
        error::{Result, ReviewSenseError},
    },
};

#[derive(Debug, Clone, PartialEq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Per-class shuffled split. Every class keeps at least one row on each side, so a class
/// with fewer than two rows cannot be split.
pub fn stratified_split(labels: &[SentimentLabel], test_size: f64, seed: u64) -> Result<SplitIndices> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(ReviewSenseError::validation(format!("test size must be in (0, 1), got {}", test_size)));
    }

    let mut by_class: BTreeMap<SentimentLabel, Vec<usize>> = BTreeMap::new();
    for (index, label) in labels.iter().enumerate() {
        by_class.entry(*label).or_default().push(index);
    }

    if let Some((label, rows)) = by_class.iter().find(|(_, rows)| rows.len() < 2) {
        return Err(ReviewSenseError::UnstratifiableSplit {
            label: *label,
            count: rows.len(),
        });
    }

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();

    for rows in by_class.values_mut() {
        rows.shuffle(&mut rng);

        let test_rows = ((rows.len() as f64) * test_size).round() as usize;
        let test_rows = test_rows.clamp(1, rows.len() - 1);

        test.extend_from_slice(&rows[..test_rows]);
        train.extend_from_slice(&rows[test_rows..]);
    }

    train.sort_unstable();
    test.sort_unstable();

    Ok(SplitIndices {
        train,
        test,
    })
}
