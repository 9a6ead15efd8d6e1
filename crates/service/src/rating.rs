//! Display rating derived from individual review scores.

/// Mean of `ratings` rounded half-up to one decimal, or `None` when there
/// are no reviews. Computed in integer tenths so the result is exact.
///
/// # Examples
/// ```
/// use service::rating::aggregate;
/// assert_eq!(aggregate(&[]), None);
/// assert_eq!(aggregate(&[4, 5, 3]), Some(4.0));
/// assert_eq!(aggregate(&[1, 2, 2]), Some(1.7));
/// ```
pub fn aggregate(ratings: &[i32]) -> Option<f64> {
    if ratings.is_empty() {
        return None;
    }
    let count = ratings.len() as i64;
    let sum: i64 = ratings.iter().map(|&r| i64::from(r)).sum();
    let tenths = (20 * sum + count).div_euclid(2 * count);
    Some(tenths as f64 / 10.0)
}

pub fn format_rating(rating: Option<f64>) -> String {
    match rating {
        Some(r) => format!("{:.1}", r),
        None => "No ratings yet".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_review_is_its_own_mean() {
        assert_eq!(aggregate(&[3]), Some(3.0));
    }

    #[test]
    fn rounds_half_up_to_one_decimal() {
        // 4.25 -> 4.3
        assert_eq!(aggregate(&[4, 4, 4, 5]), Some(4.3));
        // 4.666.. -> 4.7
        assert_eq!(aggregate(&[5, 5, 4]), Some(4.7));
        // 1.333.. -> 1.3
        assert_eq!(aggregate(&[1, 1, 2]), Some(1.3));
        assert_eq!(aggregate(&[1, 2]), Some(1.5));
    }

    #[test]
    fn order_does_not_matter() {
        let a = [5, 1, 3, 4, 4, 2];
        let mut b = a;
        b.reverse();
        assert_eq!(aggregate(&a), aggregate(&b));
    }

    #[test]
    fn result_stays_within_rating_bounds() {
        assert_eq!(aggregate(&[5; 1000]), Some(5.0));
        assert_eq!(aggregate(&[1; 7]), Some(1.0));
    }

    #[test]
    fn formatting() {
        assert_eq!(format_rating(Some(4.0)), "4.0");
        assert_eq!(format_rating(aggregate(&[1, 2, 2])), "1.7");
        assert_eq!(format_rating(None), "No ratings yet");
    }
}
