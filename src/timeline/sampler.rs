//! Date sampling

use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Down-sample activity dates to roughly `target` evenly strided points.
///
/// The stride is `ceil(total / target)`, never below one, and the final date
/// is always included. The result holds at most `target + 1` dates.
pub fn sample_dates(dates: &BTreeSet<NaiveDate>, target: usize) -> Vec<NaiveDate> {
    let all: Vec<NaiveDate> = dates.iter().copied().collect();
    let Some(&last) = all.last() else {
        return Vec::new();
    };

    let stride = all.len().div_ceil(target.max(1)).max(1);
    let mut sampled: Vec<NaiveDate> = all.iter().copied().step_by(stride).collect();
    if sampled.last() != Some(&last) {
        sampled.push(last);
    }
    sampled
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn dates(n: usize) -> BTreeSet<NaiveDate> {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default();
        (0..n).map(|i| start + Duration::days(i as i64)).collect()
    }

    #[test]
    fn test_empty_input() {
        assert!(sample_dates(&BTreeSet::new(), 100).is_empty());
    }

    #[test]
    fn test_fewer_dates_than_target_keeps_all() {
        let input = dates(7);
        assert_eq!(sample_dates(&input, 100).len(), 7);
    }

    #[test]
    fn test_bound_and_final_date() {
        for total in [1, 2, 99, 100, 101, 150, 199, 250, 1000, 1234] {
            for target in [1, 3, 10, 100] {
                let input = dates(total);
                let sampled = sample_dates(&input, target);
                assert!(sampled.len() <= target + 1, "{total}/{target} -> {}", sampled.len());
                assert_eq!(sampled.last(), input.iter().next_back());
                assert!(sampled.windows(2).all(|w| w[0] < w[1]));
            }
        }
    }

    #[test]
    fn test_zero_target_treated_as_one() {
        let sampled = sample_dates(&dates(5), 0);
        assert_eq!(sampled.len(), 2);
    }
}
