//! Inference backend seam and the detector that drives it.
//!
//! The pipeline never looks inside the network. A `Backend` maps a
//! preprocessed input tensor to raw output; `Detector` pairs one backend with
//! a `DetectionPipeline` configured for that model's geometry.

use crate::pipeline::{DetectConfig, Detection, DetectionPipeline};
use crate::tensor::{InputTensor, RawOutput};
use crate::util::{DetPipeError, DetPipeResult};

/// A loaded model that turns an input tensor into raw detector output.
pub trait Backend {
    /// Backend identifier for logs.
    fn name(&self) -> &'static str;

    /// Runs one forward pass.
    fn run(&mut self, input: &InputTensor) -> DetPipeResult<RawOutput>;

    /// Optional warm-up pass; [`Detector::new`] calls it once before the
    /// first frame.
    fn warm_up(&mut self) -> DetPipeResult<()> {
        Ok(())
    }
}

impl<B: Backend + ?Sized> Backend for Box<B> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn run(&mut self, input: &InputTensor) -> DetPipeResult<RawOutput> {
        (**self).run(input)
    }

    fn warm_up(&mut self) -> DetPipeResult<()> {
        (**self).warm_up()
    }
}

/// Backend plus post-processing for one model.
pub struct Detector<B> {
    backend: B,
    pipeline: DetectionPipeline,
}

impl<B: Backend> Detector<B> {
    /// Builds a detector and warms the backend up once.
    ///
    /// Fails if `cfg` is invalid or the warm-up pass fails.
    pub fn new(mut backend: B, cfg: DetectConfig) -> DetPipeResult<Self> {
        let pipeline = DetectionPipeline::new(cfg)?;
        backend.warm_up()?;
        Ok(Self { backend, pipeline })
    }

    pub fn pipeline(&self) -> &DetectionPipeline {
        &self.pipeline
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Runs the backend on an already preprocessed tensor and post-processes
    /// the result into `orig_width x orig_height` image coordinates.
    pub fn detect(
        &mut self,
        input: &InputTensor,
        orig_width: u32,
        orig_height: u32,
    ) -> DetPipeResult<Vec<Detection>> {
        let cfg = self.pipeline.config();
        if input.width() != cfg.input_width || input.height() != cfg.input_height {
            return Err(DetPipeError::InvalidShape {
                expected: cfg.input_width as usize * cfg.input_height as usize,
                got: input.width() as usize * input.height() as usize,
                context: "input resolution",
            });
        }
        let raw = self.backend.run(input)?;
        self.pipeline.infer(raw.view()?, orig_width, orig_height)
    }

    /// Resizes `image` to the model input, runs the backend, and maps the
    /// detections back to the image's own size.
    #[cfg(feature = "image-io")]
    pub fn detect_image(&mut self, image: &image::DynamicImage) -> DetPipeResult<Vec<Detection>> {
        let cfg = self.pipeline.config();
        let input = crate::preprocess::prepare_input(image, cfg.input_width, cfg.input_height)?;
        self.detect(&input, image.width(), image.height())
    }
}
