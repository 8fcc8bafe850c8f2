//! detpipe turns raw single-shot detector output into image-space detections.
//!
//! Each frame's `[candidates, 5 + classes]` tensor is filtered by objectness
//! and combined class confidence, rescaled from model input pixels to the
//! original image, converted to corner boxes, and de-duplicated with greedy
//! IOU suppression. The model itself stays behind the `Backend` trait.
//! Parallel batch inference is available via the `rayon` feature and image
//! preprocessing via `image-io`.

pub mod backend;
mod candidate;
pub mod classes;
pub mod geometry;
pub mod lowlevel;
pub mod pipeline;
#[cfg(feature = "image-io")]
pub mod preprocess;
pub mod tensor;
mod trace;
pub mod util;

pub use backend::{Backend, Detector};
pub use classes::{class_color, ClassNames};
pub use geometry::{CenterBox, CornerBox};
pub use pipeline::{DetectConfig, Detection, DetectionOrder, DetectionPipeline, FrameOutput};
pub use tensor::{InputTensor, RawOutput, RawOutputTensor};
pub use util::{DetPipeError, DetPipeResult};

pub use candidate::nms::suppress;
