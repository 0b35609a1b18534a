/// Choose a bounded, evenly spaced subset of x-axis indices to label.
///
/// Short series label every point. Longer series get `max_labels` indices
/// anchored at both ends; spacing is rounded, which keeps the result
/// strictly ascending whenever `count >= max_labels`.
pub fn select_label_indices(count: usize, max_labels: usize) -> Vec<usize> {
    if count == 0 || max_labels == 0 {
        return Vec::new();
    }
    if count <= max_labels {
        return (0..count).collect();
    }
    if max_labels == 1 {
        return vec![0];
    }
    (0..max_labels)
        .map(|i| {
            ((i * (count - 1)) as f64 / (max_labels - 1) as f64).round() as usize
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_series_label_every_point() {
        assert_eq!(select_label_indices(3, 5), vec![0, 1, 2]);
        assert_eq!(select_label_indices(5, 5), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn long_series_get_bounded_anchored_labels() {
        let indices = select_label_indices(20, 5);
        assert_eq!(indices.len(), 5);
        assert_eq!(indices[0], 0);
        assert_eq!(indices[4], 19);
        assert!(indices.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn no_duplicates_at_the_tightest_fit() {
        let indices = select_label_indices(6, 5);
        assert!(indices.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(indices.first(), Some(&0));
        assert_eq!(indices.last(), Some(&5));
    }

    #[test]
    fn degenerate_inputs() {
        assert!(select_label_indices(0, 5).is_empty());
        assert!(select_label_indices(5, 0).is_empty());
        assert_eq!(select_label_indices(9, 1), vec![0]);
    }
}
