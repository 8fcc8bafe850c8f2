//! Detection pipeline: raw tensor in, image-space detections out.
//!
//! `DetectionPipeline` owns a validated `DetectConfig` and runs
//! filter → rescale → corner conversion → suppression for one frame at a
//! time. It holds no per-frame state, so one instance can serve many threads.

use crate::candidate::filter::{filter_candidates, Candidate};
use crate::candidate::nms::suppress;
use crate::classes::ClassNames;
use crate::geometry::{center_to_corner, to_image_space, CornerBox};
use crate::tensor::{RawOutputTensor, BOX_COLUMNS};
use crate::trace::{trace_event, trace_span};
use crate::util::{DetPipeError, DetPipeResult};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Order of the detections returned by `infer`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DetectionOrder {
    /// Order in which suppression selected them (descending score).
    #[default]
    Suppression,
    /// Raw tensor row order.
    Candidate,
}

/// Pipeline configuration, fixed for the lifetime of a pipeline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetectConfig {
    /// Minimum objectness and combined score (exclusive), in `[0, 1]`.
    pub conf_threshold: f32,
    /// IOU above which a lower-scored box is suppressed, in `[0, 1]`.
    pub iou_threshold: f32,
    /// Model input width in pixels.
    pub input_width: u32,
    /// Model input height in pixels.
    pub input_height: u32,
    /// Number of class score columns per row.
    pub num_classes: usize,
    /// Output ordering.
    pub order: DetectionOrder,
}

impl Default for DetectConfig {
    fn default() -> Self {
        Self {
            conf_threshold: 0.7,
            iou_threshold: 0.5,
            input_width: 640,
            input_height: 480,
            num_classes: 80,
            order: DetectionOrder::Suppression,
        }
    }
}

impl DetectConfig {
    /// Checks ranges; NaN thresholds are rejected.
    pub fn validate(&self) -> DetPipeResult<()> {
        if !(0.0..=1.0).contains(&self.conf_threshold) {
            return Err(DetPipeError::InvalidConfig {
                reason: "conf_threshold must be within [0, 1]",
            });
        }
        if !(0.0..=1.0).contains(&self.iou_threshold) {
            return Err(DetPipeError::InvalidConfig {
                reason: "iou_threshold must be within [0, 1]",
            });
        }
        if self.input_width == 0 || self.input_height == 0 {
            return Err(DetPipeError::InvalidConfig {
                reason: "input dimensions must be positive",
            });
        }
        if self.num_classes == 0 {
            return Err(DetPipeError::InvalidConfig {
                reason: "num_classes must be positive",
            });
        }
        Ok(())
    }

    /// Expected elements per raw row.
    pub fn row_width(&self) -> usize {
        BOX_COLUMNS + self.num_classes
    }
}

/// One detected object in original image pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Detection {
    /// Top-left corner box; may extend past the frame.
    pub bbox: CornerBox,
    /// Combined confidence in `(conf_threshold, 1]`.
    pub score: f32,
    /// Index into the class name table.
    pub class_id: usize,
}

impl Detection {
    /// Overlay label such as `"person 87%"`.
    ///
    /// The percentage is truncated, not rounded. Unknown ids render as
    /// `"class {id}"`.
    pub fn label(&self, names: &ClassNames) -> String {
        let percent = (self.score * 100.0) as i32;
        match names.name(self.class_id) {
            Some(name) => format!("{name} {percent}%"),
            None => format!("class {} {percent}%", self.class_id),
        }
    }
}

/// One frame's raw output paired with the size of the original image.
#[derive(Clone, Copy, Debug)]
pub struct FrameOutput<'a> {
    pub raw: RawOutputTensor<'a>,
    pub width: u32,
    pub height: u32,
}

/// Stateless post-processing pipeline.
#[derive(Clone, Debug)]
pub struct DetectionPipeline {
    cfg: DetectConfig,
}

impl DetectionPipeline {
    /// Creates a pipeline after validating `cfg`.
    pub fn new(cfg: DetectConfig) -> DetPipeResult<Self> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &DetectConfig {
        &self.cfg
    }

    /// Runs the full post-processing chain for one frame.
    ///
    /// `orig_width` and `orig_height` are the dimensions of the frame the
    /// model input was resized from.
    pub fn infer(
        &self,
        raw: RawOutputTensor<'_>,
        orig_width: u32,
        orig_height: u32,
    ) -> DetPipeResult<Vec<Detection>> {
        if raw.row_width() != self.cfg.row_width() {
            return Err(DetPipeError::InvalidShape {
                expected: self.cfg.row_width(),
                got: raw.row_width(),
                context: "row width",
            });
        }
        if orig_width == 0 || orig_height == 0 {
            return Err(DetPipeError::InvalidDimensions {
                width: orig_width,
                height: orig_height,
            });
        }

        let _span = trace_span!("infer", rows = raw.num_candidates()).entered();

        let candidates = filter_candidates(raw, self.cfg.conf_threshold);
        trace_event!("filtered_candidates", count = candidates.len());
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let boxes: Vec<CornerBox> = candidates
            .iter()
            .map(|c| self.to_corner_box(c, orig_width, orig_height))
            .collect();
        let scores: Vec<f32> = candidates.iter().map(|c| c.score).collect();

        let mut kept = suppress(
            &boxes,
            &scores,
            self.cfg.conf_threshold,
            self.cfg.iou_threshold,
        )?;
        if self.cfg.order == DetectionOrder::Candidate {
            kept.sort_unstable();
        }

        let mut out = Vec::with_capacity(kept.len());
        for idx in kept {
            let candidate = &candidates[idx];
            if candidate.class_id >= self.cfg.num_classes {
                return Err(DetPipeError::InvariantViolation {
                    class_id: candidate.class_id,
                    num_classes: self.cfg.num_classes,
                });
            }
            out.push(Detection {
                bbox: boxes[idx],
                score: candidate.score,
                class_id: candidate.class_id,
            });
        }

        trace_event!("kept_detections", count = out.len());
        Ok(out)
    }

    /// Runs `infer` on each frame in order.
    pub fn infer_batch(&self, frames: &[FrameOutput<'_>]) -> DetPipeResult<Vec<Vec<Detection>>> {
        frames
            .iter()
            .map(|f| self.infer(f.raw, f.width, f.height))
            .collect()
    }

    /// Runs `infer` on independent frames in parallel.
    ///
    /// Results are in frame order and identical to `infer_batch`.
    #[cfg(feature = "rayon")]
    pub fn infer_batch_par(
        &self,
        frames: &[FrameOutput<'_>],
    ) -> DetPipeResult<Vec<Vec<Detection>>> {
        frames
            .par_iter()
            .map(|f| self.infer(f.raw, f.width, f.height))
            .collect()
    }

    fn to_corner_box(&self, candidate: &Candidate, img_w: u32, img_h: u32) -> CornerBox {
        let scaled = to_image_space(
            candidate.bbox,
            self.cfg.input_width,
            self.cfg.input_height,
            img_w,
            img_h,
        );
        center_to_corner(scaled)
    }
}
