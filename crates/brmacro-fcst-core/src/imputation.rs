//! Missing value imputation.

/// Fill gaps by linear interpolation between the nearest known neighbours,
/// by position.
///
/// Gaps before the first known value take the first value; gaps after the
/// last known value take the last value. An input with no known value comes
/// back as all-NaN.
pub fn interpolate_gaps(values: &[Option<f64>]) -> Vec<f64> {
    let mut result = vec![f64::NAN; values.len()];

    let (first, last) = match (
        values.iter().position(Option::is_some),
        values.iter().rposition(Option::is_some),
    ) {
        (Some(f), Some(l)) => (f, l),
        _ => return result,
    };

    let mut prev: Option<(usize, f64)> = None;
    for (i, v) in values.iter().enumerate().take(last + 1).skip(first) {
        let Some(v) = *v else { continue };
        if let Some((p_idx, p_val)) = prev {
            let gap = i - p_idx;
            let slope = (v - p_val) / gap as f64;
            for j in 1..gap {
                result[p_idx + j] = p_val + slope * j as f64;
            }
        }
        result[i] = v;
        prev = Some((i, v));
    }

    let head = result[first];
    result[..first].fill(head);
    let tail = result[last];
    result[last + 1..].fill(tail);

    result
}
