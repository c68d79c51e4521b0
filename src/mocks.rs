use crate::color_map::NUM_CLASSES;
use crate::errors::Result;
use crate::traits::SegmentationModel;
use ndarray::prelude::*;

/// Deterministic stand-in for the trained model: every pixel gets all of
/// its probability mass on `favored_class`.
#[derive(Debug, Clone)]
pub struct MockSegmentationModel {
    pub num_classes: usize,
    pub favored_class: usize,
}

impl MockSegmentationModel {
    pub const fn new(favored_class: usize) -> Self {
        Self {
            num_classes: NUM_CLASSES,
            favored_class,
        }
    }
}

impl SegmentationModel for MockSegmentationModel {
    fn predict(&self, tensor: ArrayView4<f32>) -> Result<Array4<f32>> {
        let (batch, height, width, _) = tensor.dim();
        let mut probs = Array4::<f32>::zeros((batch, height, width, self.num_classes));
        probs
            .slice_mut(s![.., .., .., self.favored_class])
            .fill(1.0);
        Ok(probs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_model_output_shape() -> Result<()> {
        let mock = MockSegmentationModel::new(0);
        let input = Array4::<f32>::zeros((1, 480, 480, 3));

        let probs = mock.predict(input.view())?;
        assert_eq!(probs.shape(), &[1, 480, 480, NUM_CLASSES]);
        Ok(())
    }

    #[test]
    fn test_mock_model_favors_requested_class() -> Result<()> {
        let mock = MockSegmentationModel::new(3);
        let input = Array4::<f32>::zeros((1, 4, 4, 3));

        let probs = mock.predict(input.view())?;
        assert_eq!(probs[[0, 0, 0, 3]], 1.0);
        assert_eq!(probs[[0, 0, 0, 0]], 0.0);
        Ok(())
    }
}
