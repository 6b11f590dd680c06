//! Connected-component clustering over a pixel predicate
//!
//! One utility serves all three marker colors: build a match mask with the
//! predicate, then flood fill 8-connected regions and accumulate centroids.

use image::RgbaImage;

use crate::domain::ScreenPoint;

/// One 8-connected cluster of matching pixels
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Component {
    pub pixel_count: u32,
    sum_x: f64,
    sum_y: f64,
}

impl Component {
    /// Mean pixel position in image-local coordinates
    pub fn centroid(&self) -> ScreenPoint {
        let n = self.pixel_count.max(1) as f64;
        ScreenPoint::new(self.sum_x / n, self.sum_y / n)
    }
}

/// Label all 8-connected regions where `matches(x, y)` holds
///
/// Components come back in scan order of their first pixel.
pub fn connected_components(
    width: u32,
    height: u32,
    mut matches: impl FnMut(u32, u32) -> bool,
) -> Vec<Component> {
    let (w, h) = (width as usize, height as usize);
    let mut mask = vec![false; w * h];
    for y in 0..h {
        for x in 0..w {
            mask[y * w + x] = matches(x as u32, y as u32);
        }
    }

    let mut components = Vec::new();
    let mut stack = Vec::new();
    for seed in 0..mask.len() {
        if !mask[seed] {
            continue;
        }
        mask[seed] = false;
        stack.push(seed);

        let mut component = Component {
            pixel_count: 0,
            sum_x: 0.0,
            sum_y: 0.0,
        };
        while let Some(idx) = stack.pop() {
            let (x, y) = (idx % w, idx / w);
            component.pixel_count += 1;
            component.sum_x += x as f64;
            component.sum_y += y as f64;

            for ny in y.saturating_sub(1)..=(y + 1).min(h - 1) {
                for nx in x.saturating_sub(1)..=(x + 1).min(w - 1) {
                    let n = ny * w + nx;
                    if mask[n] {
                        mask[n] = false;
                        stack.push(n);
                    }
                }
            }
        }
        components.push(component);
    }
    components
}

/// Squared RGB distance; no square roots in the per-pixel path
#[inline]
pub fn color_distance_sq(pixel: [u8; 3], target: [u8; 3]) -> u32 {
    let dr = pixel[0] as i32 - target[0] as i32;
    let dg = pixel[1] as i32 - target[1] as i32;
    let db = pixel[2] as i32 - target[2] as i32;
    (dr * dr + dg * dg + db * db) as u32
}

/// Clusters of opaque pixels within `max_distance` of `target`
pub fn color_components(image: &RgbaImage, target: [u8; 3], max_distance: u32) -> Vec<Component> {
    let max_dist_sq = max_distance * max_distance;
    connected_components(image.width(), image.height(), |x, y| {
        let [r, g, b, a] = image.get_pixel(x, y).0;
        a > 0 && color_distance_sq([r, g, b], target) <= max_dist_sq
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn blob(img: &mut RgbaImage, cx: u32, cy: u32, half: u32, color: [u8; 3]) {
        for y in cy - half..=cy + half {
            for x in cx - half..=cx + half {
                img.put_pixel(x, y, Rgba([color[0], color[1], color[2], 255]));
            }
        }
    }

    #[test]
    fn test_single_blob_centroid() {
        let mut img = RgbaImage::from_pixel(40, 40, Rgba([255, 255, 255, 255]));
        blob(&mut img, 20, 15, 2, [0, 0, 0]);
        let comps = color_components(&img, [0, 0, 0], 10);
        assert_eq!(comps.len(), 1);
        assert_eq!(comps[0].pixel_count, 25);
        assert_eq!(comps[0].centroid(), ScreenPoint::new(20.0, 15.0));
    }

    #[test]
    fn test_diagonal_pixels_are_connected() {
        let comps = connected_components(4, 4, |x, y| x == y);
        assert_eq!(comps.len(), 1);
        assert_eq!(comps[0].pixel_count, 4);
        assert_eq!(comps[0].centroid(), ScreenPoint::new(1.5, 1.5));
    }

    #[test]
    fn test_separate_blobs_stay_separate() {
        let mut img = RgbaImage::from_pixel(50, 20, Rgba([255, 255, 255, 255]));
        blob(&mut img, 5, 5, 1, [10, 20, 30]);
        blob(&mut img, 40, 12, 2, [12, 18, 30]);
        let comps = color_components(&img, [10, 20, 30], 8);
        assert_eq!(comps.len(), 2);
        assert_eq!(comps[0].centroid(), ScreenPoint::new(5.0, 5.0));
        assert_eq!(comps[1].centroid(), ScreenPoint::new(40.0, 12.0));
    }

    #[test]
    fn test_threshold_excludes_far_colors() {
        let mut img = RgbaImage::from_pixel(10, 10, Rgba([255, 255, 255, 255]));
        blob(&mut img, 5, 5, 1, [100, 100, 100]);
        assert!(color_components(&img, [0, 0, 0], 30).is_empty());
    }

    #[test]
    fn test_empty_image() {
        assert!(connected_components(0, 0, |_, _| true).is_empty());
    }
}
