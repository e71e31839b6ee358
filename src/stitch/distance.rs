//! Distance and overlap calculations for via placement
//!
//! Point, segment and disk tests on integer board coordinates. Distances are
//! returned as `f64` nanometres; coordinates are never rounded here.

use crate::board::{Coord, Point};
use super::types::COORD_TOLERANCE;

/// Two points are within `tolerance` of each other (Euclidean)
pub fn coords_match(a: Point, b: Point, tolerance: Coord) -> bool {
    let dx = (a.x - b.x).abs();
    let dy = (a.y - b.y).abs();
    if dx > tolerance || dy > tolerance {
        return false;
    }
    dx * dx + dy * dy <= tolerance * tolerance
}

/// Same connection point under the board tolerance
pub fn points_match(a: Point, b: Point) -> bool {
    coords_match(a, b, COORD_TOLERANCE)
}

pub fn point_distance(a: Point, b: Point) -> f64 {
    let dx = (b.x - a.x) as f64;
    let dy = (b.y - a.y) as f64;
    (dx * dx + dy * dy).sqrt()
}

/// Point-to-segment minimum distance
pub fn point_segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let (px, py) = (p.x as f64, p.y as f64);
    let (ax, ay) = (a.x as f64, a.y as f64);
    let ab = [b.x as f64 - ax, b.y as f64 - ay];
    let ap = [px - ax, py - ay];
    let ab_len2 = ab[0] * ab[0] + ab[1] * ab[1];

    if ab_len2 == 0.0 {
        // Degenerate segment
        return (ap[0] * ap[0] + ap[1] * ap[1]).sqrt();
    }

    let t = ((ap[0] * ab[0] + ap[1] * ab[1]) / ab_len2).clamp(0.0, 1.0);
    let closest = [ax + t * ab[0], ay + t * ab[1]];
    ((px - closest[0]).powi(2) + (py - closest[1]).powi(2)).sqrt()
}

/// Unit direction from `from` to `to`, or `None` for runs shorter than 1 nm
pub fn direction(from: Point, to: Point) -> Option<[f64; 2]> {
    let length = point_distance(from, to);
    if length < 1.0 {
        return None;
    }
    Some([(to.x - from.x) as f64 / length, (to.y - from.y) as f64 / length])
}

/// Direction rotated 90 degrees counter-clockwise
pub fn perpendicular(dir: [f64; 2]) -> [f64; 2] {
    [-dir[1], dir[0]]
}

/// Even-odd point-in-polygon test; the outline is implicitly closed
pub fn point_in_polygon(p: Point, polygon: &[Point]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let (px, py) = (p.x as f64, p.y as f64);
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (xi, yi) = (polygon[i].x as f64, polygon[i].y as f64);
        let (xj, yj) = (polygon[j].x as f64, polygon[j].y as f64);
        if (yi > py) != (yj > py) && px < (xj - xi) * (py - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Disk overlaps a closed polygon: center inside, or an edge closer than `radius`
pub fn disk_overlaps_polygon(center: Point, radius: Coord, polygon: &[Point]) -> bool {
    if polygon.is_empty() {
        return false;
    }
    if point_in_polygon(center, polygon) {
        return true;
    }
    let r = radius as f64;
    let n = polygon.len();
    (0..n).any(|i| point_segment_distance(center, polygon[i], polygon[(i + 1) % n]) < r)
}

/// Disk overlaps an axis-aligned rectangle given by two corners
pub fn disk_overlaps_rect(center: Point, radius: Coord, a: Point, b: Point) -> bool {
    let (min_x, max_x) = (a.x.min(b.x), a.x.max(b.x));
    let (min_y, max_y) = (a.y.min(b.y), a.y.max(b.y));
    let closest = Point::new(center.x.clamp(min_x, max_x), center.y.clamp(min_y, max_y));
    if closest == center {
        return true;
    }
    point_distance(center, closest) < radius as f64
}

pub fn disk_overlaps_circle(center: Point, radius: Coord, other: Point, other_radius: Coord) -> bool {
    point_distance(center, other) < (radius + other_radius) as f64
}
