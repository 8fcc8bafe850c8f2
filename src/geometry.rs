//! Box representations and coordinate transforms.
//!
//! Detector rows carry center-size boxes in model input pixels. The pipeline
//! rescales them to the original image while still in center form, then
//! converts to top-left corner form for suppression and output. Nothing here
//! rounds or clips; both are left to the consumer.

/// Center-size box `(cx, cy, w, h)`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CenterBox {
    pub cx: f32,
    pub cy: f32,
    pub w: f32,
    pub h: f32,
}

/// Corner-size box: `(x, y)` is the top-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CornerBox {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl CenterBox {
    pub fn new(cx: f32, cy: f32, w: f32, h: f32) -> Self {
        Self { cx, cy, w, h }
    }
}

impl CornerBox {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Builds a box from `[x_min, y_min, x_max, y_max]` corners.
    pub fn from_xyxy(x_min: f32, y_min: f32, x_max: f32, y_max: f32) -> Self {
        Self {
            x: x_min,
            y: y_min,
            w: x_max - x_min,
            h: y_max - y_min,
        }
    }

    /// Returns `[x_min, y_min, x_max, y_max]`.
    pub fn to_xyxy(&self) -> [f32; 4] {
        [self.x, self.y, self.x + self.w, self.y + self.h]
    }

    /// Box area; negative extents count as zero.
    pub fn area(&self) -> f32 {
        self.w.max(0.0) * self.h.max(0.0)
    }

    /// Area of the overlap with `other`.
    pub fn intersection_area(&self, other: &CornerBox) -> f32 {
        let [ax0, ay0, ax1, ay1] = self.to_xyxy();
        let [bx0, by0, bx1, by1] = other.to_xyxy();
        let iw = (ax1.min(bx1) - ax0.max(bx0)).max(0.0);
        let ih = (ay1.min(by1) - ay0.max(by0)).max(0.0);
        iw * ih
    }

    /// Intersection over union in `[0, 1]`.
    ///
    /// Returns `0.0` when the union is not positive, which covers two
    /// zero-area boxes.
    pub fn iou(&self, other: &CornerBox) -> f32 {
        let inter = self.intersection_area(other);
        let union = self.area() + other.area() - inter;
        if union.is_nan() || union <= 0.0 {
            return 0.0;
        }
        (inter / union).clamp(0.0, 1.0)
    }

    /// Returns the box clipped to `[0, width] x [0, height]`.
    ///
    /// The pipeline never calls this; boxes may legitimately extend past the
    /// frame and consumers decide whether to clip.
    pub fn clip_to(&self, width: u32, height: u32) -> CornerBox {
        let [x0, y0, x1, y1] = self.to_xyxy();
        let (fw, fh) = (width as f32, height as f32);
        let x0 = x0.clamp(0.0, fw);
        let y0 = y0.clamp(0.0, fh);
        let x1 = x1.clamp(0.0, fw).max(x0);
        let y1 = y1.clamp(0.0, fh).max(y0);
        CornerBox::from_xyxy(x0, y0, x1, y1)
    }

    /// Truncates to integer pixels `(x, y, w, h)` for drawing.
    pub fn to_pixels(&self) -> (i32, i32, i32, i32) {
        (self.x as i32, self.y as i32, self.w as i32, self.h as i32)
    }
}

/// Scales a box from model input pixels to original image pixels.
///
/// `x' = x / model_w * img_w`, and the same for `w`; `y` and `h` use the
/// heights. Box format does not matter for this step.
///
/// An axis whose image size equals its model size is returned bit for bit.
pub fn to_image_space(
    b: CenterBox,
    model_w: u32,
    model_h: u32,
    img_w: u32,
    img_h: u32,
) -> CenterBox {
    let (cx, w) = scale_axis(b.cx, b.w, model_w, img_w);
    let (cy, h) = scale_axis(b.cy, b.h, model_h, img_h);
    CenterBox { cx, cy, w, h }
}

#[inline]
fn scale_axis(pos: f32, extent: f32, model: u32, img: u32) -> (f32, f32) {
    if model == img {
        return (pos, extent);
    }
    let (m, i) = (model as f32, img as f32);
    (pos / m * i, extent / m * i)
}

/// Converts center-size to corner-size, keeping `w` and `h`.
pub fn center_to_corner(b: CenterBox) -> CornerBox {
    CornerBox {
        x: b.cx - b.w * 0.5,
        y: b.cy - b.h * 0.5,
        w: b.w,
        h: b.h,
    }
}
