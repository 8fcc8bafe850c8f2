//! Small numeric helpers shared by the filter and suppression stages.

use std::cmp::Ordering;

/// Returns the index and value of the largest element.
///
/// The first index wins on ties. Returns `None` for an empty slice or when
/// every element is NaN.
pub(crate) fn argmax(values: &[f32]) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (idx, &value) in values.iter().enumerate() {
        if value.is_nan() {
            continue;
        }
        match best {
            Some((_, current)) if value <= current => {}
            _ => best = Some((idx, value)),
        }
    }
    best
}

/// Descending score order with the lower index first on ties.
pub(crate) fn score_cmp_desc(a: (usize, f32), b: (usize, f32)) -> Ordering {
    b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0))
}

/// Strict threshold test; NaN never passes.
#[inline]
pub(crate) fn above(value: f32, threshold: f32) -> bool {
    value > threshold
}
