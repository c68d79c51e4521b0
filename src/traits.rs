use crate::errors::Result;
use ndarray::prelude::*;

/// Capability boundary around the trained classifier.
///
/// The service depends on this trait rather than on the ONNX-backed `Model`
/// so tests can substitute a deterministic stub. Input is a channels-last
/// batch tensor `(1, 480, 480, 3)` with values in `[0.0, 1.0]`; output is a
/// per-pixel class-probability tensor `(1, 480, 480, K)`.
pub trait SegmentationModel: Send + Sync {
    fn predict(&self, tensor: ArrayView4<f32>) -> Result<Array4<f32>>;
}
