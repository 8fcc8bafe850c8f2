//! Raw detector output tensors.
//!
//! `RawOutputTensor` is a borrowed `[candidates, 5 + classes]` view into a
//! flat `f32` buffer. Each row holds `[cx, cy, w, h, objectness, class
//! scores...]` in pixels of the model input resolution. A leading batch axis
//! of size one is accepted and squeezed away.

use crate::util::{DetPipeError, DetPipeResult};

/// Number of leading box + objectness columns in every row.
pub const BOX_COLUMNS: usize = 5;
/// Column holding the objectness score.
pub const OBJECTNESS_COLUMN: usize = 4;

/// Borrowed row-major view of raw detector output.
#[derive(Copy, Clone, Debug)]
pub struct RawOutputTensor<'a> {
    data: &'a [f32],
    num_candidates: usize,
    row_width: usize,
}

impl<'a> RawOutputTensor<'a> {
    /// Creates a view for a model with `num_classes` class columns.
    pub fn from_slice(data: &'a [f32], num_classes: usize) -> DetPipeResult<Self> {
        if num_classes == 0 {
            return Err(DetPipeError::InvalidConfig {
                reason: "num_classes must be positive",
            });
        }
        let row_width = BOX_COLUMNS + num_classes;
        if data.len() % row_width != 0 {
            return Err(DetPipeError::InvalidShape {
                expected: data.len().div_ceil(row_width) * row_width,
                got: data.len(),
                context: "tensor length",
            });
        }
        Ok(Self {
            data,
            num_candidates: data.len() / row_width,
            row_width,
        })
    }

    /// Creates a view from an explicit shape `[N, 5 + C]` or `[1, N, 5 + C]`.
    pub fn with_shape(data: &'a [f32], shape: &[usize]) -> DetPipeResult<Self> {
        let (num_candidates, row_width) = match *shape {
            [n, w] => (n, w),
            [batch, n, w] => {
                if batch != 1 {
                    return Err(DetPipeError::UnsupportedBatch { batch });
                }
                (n, w)
            }
            _ => return Err(DetPipeError::InvalidTensorRank { rank: shape.len() }),
        };
        if row_width <= BOX_COLUMNS {
            return Err(DetPipeError::InvalidShape {
                expected: BOX_COLUMNS + 1,
                got: row_width,
                context: "row width",
            });
        }
        let needed = num_candidates
            .checked_mul(row_width)
            .ok_or(DetPipeError::InvalidShape {
                expected: usize::MAX,
                got: data.len(),
                context: "tensor length",
            })?;
        if data.len() != needed {
            return Err(DetPipeError::InvalidShape {
                expected: needed,
                got: data.len(),
                context: "tensor length",
            });
        }
        Ok(Self {
            data,
            num_candidates,
            row_width,
        })
    }

    /// Number of candidate rows.
    pub fn num_candidates(&self) -> usize {
        self.num_candidates
    }

    /// Number of class score columns.
    pub fn num_classes(&self) -> usize {
        self.row_width - BOX_COLUMNS
    }

    /// Elements per row, `5 + num_classes`.
    pub fn row_width(&self) -> usize {
        self.row_width
    }

    pub fn is_empty(&self) -> bool {
        self.num_candidates == 0
    }

    /// Returns the backing slice.
    pub fn as_slice(&self) -> &'a [f32] {
        self.data
    }

    /// Returns row `idx` if it exists.
    pub fn row(&self, idx: usize) -> Option<&'a [f32]> {
        if idx >= self.num_candidates {
            return None;
        }
        let start = idx * self.row_width;
        self.data.get(start..start + self.row_width)
    }

    /// Iterates over all rows in order.
    pub fn rows(&self) -> std::slice::ChunksExact<'a, f32> {
        self.data.chunks_exact(self.row_width)
    }
}

/// Owned raw output, as produced by an inference backend.
#[derive(Clone, Debug, PartialEq)]
pub struct RawOutput {
    data: Vec<f32>,
    shape: Vec<usize>,
}

impl RawOutput {
    /// Wraps a buffer after checking it against `shape`.
    pub fn new(data: Vec<f32>, shape: Vec<usize>) -> DetPipeResult<Self> {
        RawOutputTensor::with_shape(&data, &shape)?;
        Ok(Self { data, shape })
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Borrows the output as a tensor view.
    pub fn view(&self) -> DetPipeResult<RawOutputTensor<'_>> {
        RawOutputTensor::with_shape(&self.data, &self.shape)
    }
}

/// Preprocessed model input in NCHW layout.
#[derive(Clone, Debug, PartialEq)]
pub struct InputTensor {
    data: Vec<f32>,
    width: u32,
    height: u32,
    channels: u32,
}

impl InputTensor {
    /// Wraps an NCHW buffer of `channels * height * width` values.
    pub fn new(data: Vec<f32>, width: u32, height: u32, channels: u32) -> DetPipeResult<Self> {
        if width == 0 || height == 0 {
            return Err(DetPipeError::InvalidDimensions { width, height });
        }
        let expected = channels as usize * height as usize * width as usize;
        if data.len() != expected {
            return Err(DetPipeError::InvalidShape {
                expected,
                got: data.len(),
                context: "input tensor length",
            });
        }
        Ok(Self {
            data,
            width,
            height,
            channels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u32 {
        self.channels
    }

    /// NCHW shape with a batch of one.
    pub fn shape(&self) -> [usize; 4] {
        [
            1,
            self.channels as usize,
            self.height as usize,
            self.width as usize,
        ]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}
