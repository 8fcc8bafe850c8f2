//! Individual pipeline stages for callers assembling their own flow.
//!
//! Most users should prefer `DetectionPipeline::infer`, which applies these
//! stages in the required order.

pub use crate::candidate::filter::{filter_candidates, Candidate};
pub use crate::candidate::nms::suppress;
pub use crate::geometry::{center_to_corner, to_image_space};
pub use crate::tensor::{BOX_COLUMNS, OBJECTNESS_COLUMN};
