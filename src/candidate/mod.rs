//! Candidate selection and pruning.
//!
//! Includes two-stage confidence filtering of raw rows and greedy IOU-based
//! non-maximum suppression.

pub(crate) mod filter;
pub(crate) mod nms;
