use image::{Rgb, RgbImage};
use ndarray::prelude::*;

/// Number of terrain classes the model predicts.
pub const NUM_CLASSES: usize = 4;

/// Class index to display color. Order and values are a compatibility
/// contract with existing consumers; do not reorder or recolor.
pub const COLOR_MAP: [[u8; 3]; NUM_CLASSES] = [
    [0, 0, 0],     // class 0: lunar soil / background
    [255, 0, 0],   // class 1: large rocks
    [0, 255, 0],   // class 2: sky
    [0, 0, 255],   // class 3: small rocks
];

/// Reduce a (height, width, class) probability tensor to a per-pixel class
/// mask. Ties break toward the lowest index, standard argmax semantics.
pub fn argmax_classes(probs: ArrayView3<f32>) -> Array2<usize> {
    let (height, width, _) = probs.dim();
    Array2::from_shape_fn((height, width), |(y, x)| {
        let mut best = 0;
        let mut best_prob = f32::NEG_INFINITY;
        for (class, &prob) in probs.slice(s![y, x, ..]).iter().enumerate() {
            if prob > best_prob {
                best_prob = prob;
                best = class;
            }
        }
        best
    })
}

/// Paint a class mask with the fixed color table. Pure and total for masks
/// produced by `argmax_classes`, whose indices are always in range.
pub fn colorize(mask: ArrayView2<usize>) -> RgbImage {
    let (height, width) = mask.dim();
    let mut img = RgbImage::new(width as u32, height as u32);
    for ((y, x), &class) in mask.indexed_iter() {
        img.put_pixel(x as u32, y as u32, Rgb(COLOR_MAP[class]));
    }
    img
}
