//! Greedy IOU non-maximum suppression.

use crate::geometry::CornerBox;
use crate::trace::{trace_event, trace_span};
use crate::util::math::{above, score_cmp_desc};
use crate::util::{DetPipeError, DetPipeResult};

/// Applies greedy non-maximum suppression and returns the indices to keep.
///
/// Boxes with `score <= conf_threshold` are ignored. The rest are visited in
/// descending score order (lower index first on ties); each visited box is
/// kept and every later box whose IOU with it exceeds `iou_threshold` is
/// dropped. Kept indices are returned in the order they were selected.
pub fn suppress(
    boxes: &[CornerBox],
    scores: &[f32],
    conf_threshold: f32,
    iou_threshold: f32,
) -> DetPipeResult<Vec<usize>> {
    if boxes.len() != scores.len() {
        return Err(DetPipeError::InvalidShape {
            expected: boxes.len(),
            got: scores.len(),
            context: "scores length",
        });
    }

    let _span = trace_span!("suppress", boxes = boxes.len()).entered();

    let mut order: Vec<(usize, f32)> = scores
        .iter()
        .copied()
        .enumerate()
        .filter(|&(_, score)| above(score, conf_threshold))
        .collect();
    if order.is_empty() {
        return Ok(Vec::new());
    }
    order.sort_by(|&a, &b| score_cmp_desc(a, b));

    let mut kept: Vec<usize> = Vec::new();
    'outer: for (idx, _) in order {
        for &kept_idx in &kept {
            if boxes[idx].iou(&boxes[kept_idx]) > iou_threshold {
                continue 'outer;
            }
        }
        kept.push(idx);
    }

    trace_event!("suppressed", kept = kept.len());
    Ok(kept)
}
