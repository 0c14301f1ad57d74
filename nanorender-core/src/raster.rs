/// Depth-tested triangle fill and wireframe lines
use rayon::prelude::*;

use crate::buffer::{FrameBuffers, Rgba};
use crate::projection::ScreenPoint;
use crate::vector::Vec3d;

/// Bounding boxes with at least this many pixels are filled row-parallel
pub const PARALLEL_MIN_PIXELS: usize = 64 * 64;

/// Signed area of the screen triangle `abc`; positive when counter-clockwise.
///
/// Computed in `f64` so products of large `i32` coordinates stay exact.
pub fn signed_area(a: ScreenPoint, b: ScreenPoint, c: ScreenPoint) -> f64 {
    let (ax, ay) = (a.x as f64, a.y as f64);
    let (bx, by) = (b.x as f64, b.y as f64);
    let (cx, cy) = (c.x as f64, c.y as f64);
    ((bx - ax) * (cy - ay) - (cx - ax) * (by - ay)) / 2.0
}

/// Barycentric weights of `p` with respect to `abc`, `None` for a zero-area
/// triangle.
pub fn barycentric(
    a: ScreenPoint,
    b: ScreenPoint,
    c: ScreenPoint,
    p: ScreenPoint,
) -> Option<Vec3d> {
    let total = signed_area(a, b, c);
    if total == 0.0 {
        return None;
    }
    Some(Vec3d::new(
        signed_area(p, b, c) / total,
        signed_area(a, p, c) / total,
        signed_area(a, b, p) / total,
    ))
}

// Clipped bounding box of one triangle plus what every pixel test needs.
struct Coverage {
    vertices: [ScreenPoint; 3],
    x_min: usize,
    x_max: usize,
    color: Rgba,
}

impl Coverage {
    fn fill_row(&self, y: usize, colors: &mut [Rgba], depths: &mut [f32]) -> usize {
        let [a, b, c] = self.vertices;
        let mut won = 0;
        for x in self.x_min..=self.x_max {
            let p = ScreenPoint::new(x as i32, y as i32, 0);
            let Some(weights) = barycentric(a, b, c, p) else {
                return 0;
            };
            if weights.x() < 0.0 || weights.y() < 0.0 || weights.z() < 0.0 {
                continue;
            }
            let depth = (weights.x() * a.depth as f64
                + weights.y() * b.depth as f64
                + weights.z() * c.depth as f64) as f32;
            if depth > depths[x] {
                depths[x] = depth;
                colors[x] = self.color;
                won += 1;
            }
        }
        won
    }
}

/// Fill a flat-colored triangle into `frame`, returning the pixels won.
///
/// Pixels are sampled at integer coordinates and edges are inclusive. A
/// pixel is only written when the interpolated depth is strictly greater
/// than the stored one, so ties keep what is already there. Triangles
/// smaller than one pixel of area, or entirely off the image, draw nothing.
pub fn fill_triangle(frame: &mut FrameBuffers, vertices: [ScreenPoint; 3], color: Rgba) -> usize {
    let [a, b, c] = vertices;
    if signed_area(a, b, c).abs() < 1.0 {
        return 0;
    }

    let (width, height) = (frame.width() as i64, frame.height() as i64);
    if width == 0 || height == 0 {
        return 0;
    }
    let min_x = a.x.min(b.x).min(c.x) as i64;
    let max_x = a.x.max(b.x).max(c.x) as i64;
    let min_y = a.y.min(b.y).min(c.y) as i64;
    let max_y = a.y.max(b.y).max(c.y) as i64;
    if max_x < 0 || max_y < 0 || min_x >= width || min_y >= height {
        return 0;
    }

    let coverage = Coverage {
        vertices,
        x_min: min_x.max(0) as usize,
        x_max: max_x.min(width - 1) as usize,
        color,
    };
    let (y_min, y_max) = (min_y.max(0) as usize, max_y.min(height - 1) as usize);
    let pixels = (coverage.x_max - coverage.x_min + 1) * (y_max - y_min + 1);

    let row_len = frame.width();
    let (colors, depths) = frame.rows_mut(y_min, y_max);
    if pixels >= PARALLEL_MIN_PIXELS {
        colors
            .par_chunks_mut(row_len)
            .zip(depths.par_chunks_mut(row_len))
            .enumerate()
            .map(|(i, (color_row, depth_row))| coverage.fill_row(y_min + i, color_row, depth_row))
            .sum()
    } else {
        colors
            .chunks_mut(row_len)
            .zip(depths.chunks_mut(row_len))
            .enumerate()
            .map(|(i, (color_row, depth_row))| coverage.fill_row(y_min + i, color_row, depth_row))
            .sum()
    }
}

/// Draw a one-pixel-wide line without depth testing, returning the pixels
/// written. Parts of the line outside the image are skipped.
pub fn draw_line(
    frame: &mut FrameBuffers,
    from: ScreenPoint,
    to: ScreenPoint,
    color: Rgba,
) -> usize {
    let (dx, dy) = (to.x as i64 - from.x as i64, to.y as i64 - from.y as i64);
    let steep = dy.abs() > dx.abs();

    // (major, minor) endpoints
    let (mut start, mut end) = if steep {
        ((from.y as i64, from.x as i64), (to.y as i64, to.x as i64))
    } else {
        ((from.x as i64, from.y as i64), (to.x as i64, to.y as i64))
    };
    if start.0 > end.0 {
        std::mem::swap(&mut start, &mut end);
    }

    let major_len = end.0 - start.0;
    let major_limit = if steep { frame.height() } else { frame.width() } as i64;
    let mut written = 0;
    for major in start.0.max(0)..=end.0.min(major_limit - 1) {
        let minor = if major_len == 0 {
            start.1
        } else {
            let t = (major - start.0) as f64 / major_len as f64;
            (start.1 as f64 + (end.1 - start.1) as f64 * t).round() as i64
        };
        let (x, y) = if steep { (minor, major) } else { (major, minor) };
        let (Ok(x), Ok(y)) = (i32::try_from(x), i32::try_from(y)) else {
            continue;
        };
        if frame.color_mut().set(x, y, color) {
            written += 1;
        }
    }
    written
}
