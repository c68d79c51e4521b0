use std::path::Path;

use ndarray::prelude::*;
use ort::value::TensorRef;
use ort::{
    execution_providers::{CUDAExecutionProvider, TensorRTExecutionProvider},
    session::{builder::SessionBuilder, Session},
};
use parking_lot::Mutex;

use crate::color_map::NUM_CLASSES;
use crate::errors::{LunarSegError, Result};
use crate::preprocess::IMAGE_SIZE;
use crate::traits::SegmentationModel;

/// ONNX Runtime backed segmentation model.
///
/// The session is loaded once at startup and shared across requests; `run`
/// takes `&mut self`, so inference is serialized behind a mutex. The model
/// is channels-last: `(1, 480, 480, 3)` in, `(1, 480, 480, 4)` out.
pub struct Model {
    session: Mutex<Session>,
}

impl Model {
    pub fn new(model_path: &Path, device_id: i32) -> Result<Self> {
        let mut session = SessionBuilder::new()
            .map_err(|e| LunarSegError::Model {
                operation: "session builder initialization".to_string(),
                source: Box::new(e),
            })?
            .with_execution_providers([
                TensorRTExecutionProvider::default()
                    .with_device_id(device_id)
                    .build(),
                CUDAExecutionProvider::default()
                    .with_device_id(device_id)
                    .build(),
            ])
            .map_err(|e| LunarSegError::Model {
                operation: "execution provider setup".to_string(),
                source: Box::new(e),
            })?
            .with_memory_pattern(true)
            .map_err(|e| LunarSegError::Model {
                operation: "memory pattern setup".to_string(),
                source: Box::new(e),
            })?
            .commit_from_file(model_path)
            .map_err(|e| LunarSegError::Model {
                operation: format!("model file loading: {}", model_path.display()),
                source: Box::new(e),
            })?;

        // Warmup run so provider initialization cost is paid at startup,
        // not on the first request.
        let zeros =
            Array4::<f32>::zeros((1, IMAGE_SIZE as usize, IMAGE_SIZE as usize, 3));
        let warmup = TensorRef::from_array_view(&zeros).map_err(|e| LunarSegError::Model {
            operation: "warmup tensor creation".to_string(),
            source: Box::new(e),
        })?;
        session
            .run(ort::inputs![warmup])
            .map_err(|e| LunarSegError::Model {
                operation: "model warmup run".to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            session: Mutex::new(session),
        })
    }
}

impl SegmentationModel for Model {
    fn predict(&self, tensor: ArrayView4<f32>) -> Result<Array4<f32>> {
        let mut session = self.session.lock();
        let outputs = session.run(
            ort::inputs![TensorRef::from_array_view(&tensor.as_standard_layout())?],
        )?;
        let probs = outputs[0]
            .try_extract_array::<f32>()?
            .into_dimensionality::<Ix4>()?
            .to_owned();

        let classes = probs.dim().3;
        if classes != NUM_CLASSES {
            return Err(LunarSegError::Model {
                operation: "output shape validation".to_string(),
                source: Box::new(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("expected {} classes, model produced {}", NUM_CLASSES, classes),
                )),
            });
        }
        Ok(probs)
    }
}
