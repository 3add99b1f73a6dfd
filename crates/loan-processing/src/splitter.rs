//! Train/test partitioning.

use crate::error::{PreprocessingError, Result, ResultExt};
use polars::prelude::*;
use rand::prelude::*;
use tracing::{debug, info};

/// Two disjoint tables whose rows partition the input.
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub train: DataFrame,
    pub test: DataFrame,
}

/// Number of rows placed in the test split.
///
/// `round(fraction * rows)`, clamped to `[1, rows - 1]` so that neither side is
/// empty. Tables with fewer than two rows go entirely to training.
pub fn test_size(rows: usize, fraction: f64) -> usize {
    if rows < 2 {
        return 0;
    }
    let size = (fraction * rows as f64).round() as usize;
    size.clamp(1, rows - 1)
}

/// Shuffle row indices and split them into train and test.
///
/// With a seed the split is reproducible; without one the shuffle is drawn from
/// OS entropy. Both sides keep the original relative row order.
pub fn train_test_split(
    df: &DataFrame,
    test_fraction: f64,
    seed: Option<u64>,
) -> Result<TrainTestSplit> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(PreprocessingError::InvalidConfig(format!(
            "test fraction must be strictly between 0.0 and 1.0, got {}",
            test_fraction
        )));
    }

    let rows = df.height();
    let n_test = test_size(rows, test_fraction);

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut indices: Vec<IdxSize> = (0..rows as IdxSize).collect();
    indices.shuffle(&mut rng);

    let (test_part, train_part) = indices.split_at(n_test);
    let mut test_idx = test_part.to_vec();
    let mut train_idx = train_part.to_vec();
    test_idx.sort_unstable();
    train_idx.sort_unstable();
    debug!("Split indices: {} train, {} test", train_idx.len(), test_idx.len());

    let train = df
        .take(&IdxCa::from_vec("train_idx".into(), train_idx))
        .context("Failed to build training split")?;
    let test = df
        .take(&IdxCa::from_vec("test_idx".into(), test_idx))
        .context("Failed to build test split")?;

    info!(
        "Split {} rows into {} train / {} test (fraction {})",
        rows,
        train.height(),
        test.height(),
        test_fraction
    );

    Ok(TrainTestSplit { train, test })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn numbered(rows: i64) -> DataFrame {
        df!["id" => (0..rows).collect::<Vec<i64>>()].unwrap()
    }

    fn ids(df: &DataFrame) -> Vec<i64> {
        df.column("id")
            .unwrap()
            .i64()
            .unwrap()
            .into_no_null_iter()
            .collect()
    }

    #[test]
    fn test_test_size() {
        assert_eq!(test_size(20, 0.15), 3);
        assert_eq!(test_size(100, 0.15), 15);
        assert_eq!(test_size(4, 0.15), 1);
        assert_eq!(test_size(2, 0.99), 1);
        assert_eq!(test_size(1, 0.5), 0);
        assert_eq!(test_size(0, 0.5), 0);
    }

    #[test]
    fn test_split_is_complete_and_disjoint() {
        let df = numbered(100);
        let split = train_test_split(&df, 0.15, Some(42)).unwrap();

        assert_eq!(split.train.height() + split.test.height(), 100);
        assert_eq!(split.test.height(), 15);

        let train: HashSet<i64> = ids(&split.train).into_iter().collect();
        let test: HashSet<i64> = ids(&split.test).into_iter().collect();
        assert!(train.is_disjoint(&test));
        assert_eq!(train.union(&test).count(), 100);
    }

    #[test]
    fn test_split_preserves_row_order() {
        let df = numbered(50);
        let split = train_test_split(&df, 0.3, Some(7)).unwrap();

        for side in [ids(&split.train), ids(&split.test)] {
            assert!(side.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_seeded_split_is_reproducible() {
        let df = numbered(40);
        let a = train_test_split(&df, 0.25, Some(123)).unwrap();
        let b = train_test_split(&df, 0.25, Some(123)).unwrap();

        assert_eq!(ids(&a.test), ids(&b.test));
    }

    #[test]
    fn test_single_row_goes_to_train() {
        let df = numbered(1);
        let split = train_test_split(&df, 0.15, None).unwrap();

        assert_eq!(split.train.height(), 1);
        assert_eq!(split.test.height(), 0);
    }

    #[test]
    fn test_invalid_fraction() {
        let df = numbered(10);
        for fraction in [0.0, 1.0, -0.5, f64::NAN] {
            let err = train_test_split(&df, fraction, Some(1)).unwrap_err();
            assert!(err.is_configuration_error());
        }
    }
}
