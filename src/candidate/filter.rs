//! Two-stage confidence filtering of raw detector rows.

use crate::geometry::CenterBox;
use crate::tensor::{RawOutputTensor, BOX_COLUMNS, OBJECTNESS_COLUMN};
use crate::trace::trace_debug;
use crate::util::math::{above, argmax};

/// A raw row that passed both confidence stages.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    /// Row index in the raw tensor.
    pub index: usize,
    /// Box in model input pixels.
    pub bbox: CenterBox,
    /// Index of the best combined class score.
    pub class_id: usize,
    /// `objectness * class_score` for `class_id`.
    pub score: f32,
}

/// Filters raw rows by objectness, then by combined class confidence.
///
/// A row survives when `objectness > conf_threshold` and its best
/// `objectness * class_score` is also `> conf_threshold`. Surviving rows keep
/// their raw order. An empty result is a normal outcome.
///
/// Rows whose width or height is negative or not finite are dropped, so every
/// candidate has a non-negative extent.
pub fn filter_candidates(raw: RawOutputTensor<'_>, conf_threshold: f32) -> Vec<Candidate> {
    let mut out = Vec::new();
    let mut combined = vec![0.0f32; raw.num_classes()];

    for (index, row) in raw.rows().enumerate() {
        let objectness = row[OBJECTNESS_COLUMN];
        if !above(objectness, conf_threshold) {
            continue;
        }

        for (dst, &class_score) in combined.iter_mut().zip(&row[BOX_COLUMNS..]) {
            *dst = objectness * class_score;
        }
        let Some((class_id, score)) = argmax(&combined) else {
            continue;
        };
        if !above(score, conf_threshold) {
            continue;
        }
        if !valid_extent(row[2]) || !valid_extent(row[3]) {
            trace_debug!("bad_extent", index = index, w = row[2], h = row[3]);
            continue;
        }

        trace_debug!("candidate", index = index, class_id = class_id, score = score);
        out.push(Candidate {
            index,
            bbox: CenterBox::new(row[0], row[1], row[2], row[3]),
            class_id,
            score,
        });
    }

    out
}

#[inline]
fn valid_extent(v: f32) -> bool {
    v.is_finite() && v >= 0.0
}
