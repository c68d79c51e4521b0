use std::sync::Arc;

use ndarray::prelude::*;

use crate::color_map::{argmax_classes, colorize};
use crate::errors::Result;
use crate::preprocess::{encode_png, preprocess, tensor_to_image};
use crate::traits::SegmentationModel;

/// Orchestrates the two request pipelines around the injected model handle.
///
/// Both pipelines are stateless: every intermediate value is request-local
/// and the model handle is read-only after startup.
pub struct InferenceService {
    model: Arc<dyn SegmentationModel>,
}

impl InferenceService {
    pub fn new(model: Arc<dyn SegmentationModel>) -> Self {
        Self { model }
    }

    /// Preprocess-only pipeline: validate/crop/normalize the upload, then
    /// scale back to bytes and encode as PNG.
    pub fn preprocess_png(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        let tensor = preprocess(bytes)?;
        let img = tensor_to_image(tensor.view())?;
        encode_png(&img)
    }

    /// Full pipeline: preprocess, run the model, reduce the per-class
    /// probabilities to a class mask, paint it, encode as PNG.
    ///
    /// The input runs through the same validation and crop as
    /// `preprocess_png`; an image that already went through `/preprocess/`
    /// is 480x480 and passes unchanged.
    pub fn segment_png(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        let tensor = preprocess(bytes)?;
        let batch = tensor.insert_axis(Axis(0));
        let probs = self.model.predict(batch.view())?;
        let mask = argmax_classes(probs.slice(s![0, .., .., ..]));
        let img = colorize(mask.view());
        encode_png(&img)
    }
}
