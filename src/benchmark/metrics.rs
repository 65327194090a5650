//! Retrieval quality metrics.
//!
//! - Recall@k: fraction of true neighbors found
//! - Top-1 accuracy: fraction of queries whose best hit is the true nearest

use std::collections::HashSet;

/// recall@k = |retrieved ∩ ground_truth| / k, over the first `k` of each list.
pub fn recall_at_k(ground_truth: &[u32], retrieved: &[u32], k: usize) -> f32 {
    if k == 0 || ground_truth.is_empty() {
        return 0.0;
    }

    let gt_set: HashSet<u32> = ground_truth.iter().take(k).copied().collect();
    let retrieved_set: HashSet<u32> = retrieved.iter().take(k).copied().collect();
    let hits = gt_set.intersection(&retrieved_set).count();
    hits as f32 / k.min(gt_set.len()) as f32
}

/// Mean recall@k across queries.
pub fn mean_recall(ground_truths: &[Vec<u32>], retrievals: &[Vec<u32>], k: usize) -> f32 {
    if ground_truths.is_empty() {
        return 0.0;
    }

    let total: f32 = ground_truths
        .iter()
        .zip(retrievals)
        .map(|(gt, ret)| recall_at_k(gt, ret, k))
        .sum();

    total / ground_truths.len() as f32
}

/// Fraction of queries whose first retrieved id equals the first true id.
pub fn top1_accuracy(ground_truths: &[Vec<u32>], retrievals: &[Vec<u32>]) -> f32 {
    if ground_truths.is_empty() {
        return 0.0;
    }
    let correct = ground_truths
        .iter()
        .zip(retrievals)
        .filter(|(gt, ret)| gt.first().is_some() && gt.first() == ret.first())
        .count();
    correct as f32 / ground_truths.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recall_at_k() {
        let gt = vec![1, 2, 3, 4, 5];
        let retrieved = vec![1, 2, 3, 6, 7];
        assert!((recall_at_k(&gt, &retrieved, 5) - 0.6).abs() < 0.001);

        let perfect = vec![5, 4, 3, 2, 1];
        assert!((recall_at_k(&gt, &perfect, 5) - 1.0).abs() < 0.001);

        let miss = vec![6, 7, 8, 9, 10];
        assert_eq!(recall_at_k(&gt, &miss, 5), 0.0);
    }

    #[test]
    fn recall_with_short_ground_truth() {
        // Only two database rows exist, so both found is full recall.
        assert_eq!(recall_at_k(&[0, 1], &[1, 0], 10), 1.0);
    }

    #[test]
    fn test_mean_recall_and_top1() {
        let gt = vec![vec![1, 2], vec![3, 4]];
        let ret = vec![vec![1, 9], vec![4, 3]];
        assert!((mean_recall(&gt, &ret, 2) - 0.75).abs() < 0.001);
        assert!((top1_accuracy(&gt, &ret) - 0.5).abs() < 0.001);
    }
}
