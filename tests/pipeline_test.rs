use std::io::Cursor;
use std::sync::Arc;

use image::{DynamicImage, Rgb, RgbImage};
use ndarray::prelude::*;

use lunar_seg_rs::mocks::MockSegmentationModel;
use lunar_seg_rs::{InferenceService, SegmentationModel};

// Test model with a fixed per-pixel probability vector, defined locally so
// scenarios can pin exact class scores.
struct FixedProbsModel {
    probs: [f32; 4],
}

impl SegmentationModel for FixedProbsModel {
    fn predict(&self, tensor: ArrayView4<f32>) -> lunar_seg_rs::Result<Array4<f32>> {
        let (batch, height, width, _) = tensor.dim();
        let mut out = Array4::<f32>::zeros((batch, height, width, 4));
        for (class, &p) in self.probs.iter().enumerate() {
            out.slice_mut(s![.., .., .., class]).fill(p);
        }
        Ok(out)
    }
}

fn png_fixture(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
    buf.into_inner()
}

#[test]
fn test_preprocess_crops_oversized_white_image_to_white_png() {
    let service = InferenceService::new(Arc::new(MockSegmentationModel::new(0)));
    let png = service
        .preprocess_png(&png_fixture(600, 500, [255, 255, 255]))
        .unwrap();

    let img = image::load_from_memory(&png).unwrap().to_rgb8();
    assert_eq!(img.dimensions(), (480, 480));
    assert!(img.pixels().all(|p| p.0 == [255, 255, 255]));
}

#[test]
fn test_preprocess_output_round_trips_input_bytes() {
    // The pipeline is normalize -> denormalize -> lossless PNG, so every
    // pixel of a conformant upload must come back byte-identical.
    let src = RgbImage::from_fn(480, 480, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x * y) % 256) as u8])
    });
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(src.clone())
        .write_to(&mut buf, image::ImageFormat::Png)
        .unwrap();

    let service = InferenceService::new(Arc::new(MockSegmentationModel::new(0)));
    let png = service.preprocess_png(&buf.into_inner()).unwrap();
    let out = image::load_from_memory(&png).unwrap().to_rgb8();
    assert_eq!(out, src);
}

#[test]
fn test_segment_maps_dominant_class_to_green() {
    // Probabilities [0.1, 0.2, 0.6, 0.1] -> class 2 -> (0, 255, 0).
    let service = InferenceService::new(Arc::new(FixedProbsModel {
        probs: [0.1, 0.2, 0.6, 0.1],
    }));
    let png = service
        .segment_png(&png_fixture(480, 480, [90, 90, 90]))
        .unwrap();

    let img = image::load_from_memory(&png).unwrap().to_rgb8();
    assert_eq!(img.dimensions(), (480, 480));
    assert!(img.pixels().all(|p| p.0 == [0, 255, 0]));
}

#[test]
fn test_segment_tie_resolves_to_lower_class() {
    let service = InferenceService::new(Arc::new(FixedProbsModel {
        probs: [0.3, 0.3, 0.2, 0.2],
    }));
    let png = service
        .segment_png(&png_fixture(480, 480, [90, 90, 90]))
        .unwrap();

    let img = image::load_from_memory(&png).unwrap().to_rgb8();
    assert!(img.pixels().all(|p| p.0 == [0, 0, 0]));
}

#[test]
fn test_model_failure_surfaces_as_model_error() {
    struct FailingModel;
    impl SegmentationModel for FailingModel {
        fn predict(&self, _: ArrayView4<f32>) -> lunar_seg_rs::Result<Array4<f32>> {
            Err(lunar_seg_rs::LunarSegError::Model {
                operation: "inference".to_string(),
                source: Box::new(std::io::Error::other("runtime exploded")),
            })
        }
    }

    let service = InferenceService::new(Arc::new(FailingModel));
    let err = service
        .segment_png(&png_fixture(480, 480, [0, 0, 0]))
        .unwrap_err();
    assert!(matches!(err, lunar_seg_rs::LunarSegError::Model { .. }));
}
