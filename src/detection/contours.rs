use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::morphology::dilate;
use imageproc::region_labelling::{Connectivity, connected_components};
use std::collections::HashMap;

use crate::models::Contour;

/// Group edge pixels into 8-connected contours.
///
/// With `close_radius > 0` the edge map is dilated before grouping so small
/// gaps (typically at corners) do not split one outline into several; the
/// boxes and `pixel_count` still come from the undilated edge pixels.
/// Contours with fewer than `min_pixels` edge pixels are dropped. Output is
/// ordered by label, i.e. raster order of each contour's first pixel.
pub fn find_contours(edges: &GrayImage, min_pixels: u32, close_radius: u8) -> Vec<Contour> {
    let labeled = if close_radius > 0 {
        connected_components(&dilate(edges, Norm::LInf, close_radius), Connectivity::Eight, Luma([0u8]))
    } else {
        connected_components(edges, Connectivity::Eight, Luma([0u8]))
    };

    let mut regions: HashMap<u32, Contour> = HashMap::new();
    for (x, y, label) in labeled.enumerate_pixels() {
        let label = label[0];
        if label == 0 || edges.get_pixel(x, y)[0] == 0 {
            continue;
        }

        regions
            .entry(label)
            .and_modify(|c| {
                c.min_x = c.min_x.min(x);
                c.min_y = c.min_y.min(y);
                c.max_x = c.max_x.max(x);
                c.max_y = c.max_y.max(y);
                c.pixel_count += 1;
            })
            .or_insert(Contour {
                label,
                min_x: x,
                min_y: y,
                max_x: x,
                max_y: y,
                pixel_count: 1,
            });
    }

    let mut contours: Vec<Contour> = regions
        .into_values()
        .filter(|c| c.pixel_count >= min_pixels)
        .collect();
    contours.sort_by_key(|c| c.label);
    contours
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separate_outlines_become_separate_contours() {
        let mut edges = GrayImage::new(40, 20);
        for i in 2..10 {
            edges.put_pixel(i, 2, Luma([255]));
            edges.put_pixel(i + 20, 5, Luma([255]));
        }
        edges.put_pixel(35, 15, Luma([255]));

        let contours = find_contours(&edges, 2, 0);
        assert_eq!(contours.len(), 2);
        assert_eq!((contours[0].min_x, contours[0].max_x), (2, 9));
        assert_eq!(contours[0].pixel_count, 8);
        assert_eq!((contours[1].min_x, contours[1].min_y), (22, 5));
    }

    #[test]
    fn closing_bridges_small_gaps() {
        let mut edges = GrayImage::new(30, 10);
        for x in (2..8).chain(10..16) {
            edges.put_pixel(x, 4, Luma([255]));
        }

        assert_eq!(find_contours(&edges, 1, 0).len(), 2);

        let closed = find_contours(&edges, 1, 1);
        assert_eq!(closed.len(), 1);
        // box and count come from real edge pixels, not the dilation
        assert_eq!((closed[0].min_x, closed[0].max_x), (2, 15));
        assert_eq!((closed[0].min_y, closed[0].max_y), (4, 4));
        assert_eq!(closed[0].pixel_count, 12);
    }
}
