//! Classification metrics.

/// Fraction of labels matched by thresholding probabilities at 0.5.
pub fn accuracy(labels: &[i32], probabilities: &[f32]) -> f64 {
    assert_eq!(
        labels.len(),
        probabilities.len(),
        "labels and probabilities must have equal lengths"
    );
    if labels.is_empty() {
        return 0.0;
    }
    let correct = labels
        .iter()
        .zip(probabilities.iter())
        .filter(|(&label, &p)| (p >= 0.5) == (label == 1))
        .count();
    correct as f64 / labels.len() as f64
}

/// Area under the ROC curve from predicted scores, computed as the
/// Mann-Whitney rank statistic with tie-averaged ranks.
///
/// Returns 0.5 (no discrimination) when only one class is present.
pub fn roc_auc(labels: &[i32], scores: &[f32]) -> f64 {
    assert_eq!(
        labels.len(),
        scores.len(),
        "labels and scores must have equal lengths"
    );

    let n = labels.len();
    let n_pos = labels.iter().filter(|&&y| y == 1).count();
    let n_neg = n - n_pos;
    if n_pos == 0 || n_neg == 0 {
        log::warn!("roc_auc: only one class present, returning 0.5");
        return 0.5;
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_unstable_by(|&a, &b| {
        scores[a]
            .partial_cmp(&scores[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    // Ascending 1-based ranks; tied scores share the average of their ranks.
    let mut ranks = vec![0.0f64; n];
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j + 1 < n && scores[order[j + 1]] == scores[order[i]] {
            j += 1;
        }
        let avg_rank = (i + j) as f64 / 2.0 + 1.0;
        for k in i..=j {
            ranks[order[k]] = avg_rank;
        }
        i = j + 1;
    }

    let positive_rank_sum: f64 = labels
        .iter()
        .zip(ranks.iter())
        .filter(|(&y, _)| y == 1)
        .map(|(_, &r)| r)
        .sum();

    let n_pos = n_pos as f64;
    let n_neg = n_neg as f64;
    (positive_rank_sum - n_pos * (n_pos + 1.0) / 2.0) / (n_pos * n_neg)
}
