//! Data Partitioning
//!
//! Seeded train/held-out split and contiguous k-fold partitions.

use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use crate::error::{RecoveryError, RecoveryResult};

/// Row indices of each partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..n` and hold out `ceil(n * test_ratio)` rows
///
/// Both partitions are guaranteed non-empty.
pub fn train_test_split(n: usize, test_ratio: f64, rng: &mut ChaCha8Rng) -> RecoveryResult<Partition> {
    if n < 2 {
        return Err(RecoveryError::EmptyDataset(format!(
            "need at least 2 samples to hold out a test set, got {}",
            n
        )));
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(rng);

    let test_len = ((n as f64 * test_ratio).ceil() as usize).clamp(1, n - 1);
    let train = order.split_off(test_len);

    Ok(Partition { train, test: order })
}

/// Contiguous folds over `0..n`; the first `n % k` folds get one extra row
pub fn kfold(n: usize, k: usize) -> Vec<Partition> {
    if k == 0 || n < k {
        return Vec::new();
    }

    let base = n / k;
    let extra = n % k;
    let mut folds = Vec::with_capacity(k);
    let mut start = 0;

    for fold in 0..k {
        let len = base + usize::from(fold < extra);
        let end = start + len;
        folds.push(Partition {
            train: (0..start).chain(end..n).collect(),
            test: (start..end).collect(),
        });
        start = end;
    }

    folds
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_split_sizes_and_disjointness() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let p = train_test_split(150, 0.2, &mut rng).unwrap();
        assert_eq!(p.test.len(), 30);
        assert_eq!(p.train.len(), 120);

        let mut all: Vec<usize> = p.train.iter().chain(&p.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..150).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_rounds_test_size_up() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(train_test_split(11, 0.2, &mut rng).unwrap().test.len(), 3);
    }

    #[test]
    fn test_split_is_reproducible() {
        let a = train_test_split(50, 0.2, &mut ChaCha8Rng::seed_from_u64(7)).unwrap();
        let b = train_test_split(50, 0.2, &mut ChaCha8Rng::seed_from_u64(7)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_split_rejects_tiny_input() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(train_test_split(1, 0.2, &mut rng).is_err());
    }

    #[test]
    fn test_kfold_covers_every_row_once() {
        let folds = kfold(12, 5);
        assert_eq!(folds.len(), 5);
        let sizes: Vec<usize> = folds.iter().map(|f| f.test.len()).collect();
        assert_eq!(sizes, vec![3, 3, 2, 2, 2]);

        let mut seen: Vec<usize> = folds.iter().flat_map(|f| f.test.clone()).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..12).collect::<Vec<_>>());
        for f in &folds {
            assert_eq!(f.train.len() + f.test.len(), 12);
        }
    }

    #[test]
    fn test_kfold_too_few_rows() {
        assert!(kfold(3, 5).is_empty());
    }
}
