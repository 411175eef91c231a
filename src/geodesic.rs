//! Great-circle and local-plane math.
//!
//! Shared by snapping, edge weighting and proximity-circle generation.
//! Every distance in this crate is in meters.

use crate::geometry::{Coordinate, Geometry, close_ring};

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle (haversine) distance between two points, in meters.
pub fn distance_meters(a: Coordinate, b: Coordinate) -> f64 {
    let lat1_rad = a.lat.to_radians();
    let lat2_rad = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().asin();

    EARTH_RADIUS_M * c
}

/// Project a coordinate onto a local plane centered on `ref_lat_deg`.
///
/// Equirectangular: x is longitude scaled by the cosine of the reference
/// latitude, y is latitude. Output is in meters. Accurate only over short
/// ranges, which is all the point-to-segment math needs.
pub fn project_local(coord: Coordinate, ref_lat_deg: f64) -> (f64, f64) {
    let x = coord.lng.to_radians() * ref_lat_deg.to_radians().cos() * EARTH_RADIUS_M;
    let y = coord.lat.to_radians() * EARTH_RADIUS_M;
    (x, y)
}

/// Inverse of [`project_local`].
pub fn unproject_local(xy: (f64, f64), ref_lat_deg: f64) -> Coordinate {
    let lng = (xy.0 / (ref_lat_deg.to_radians().cos() * EARTH_RADIUS_M)).to_degrees();
    let lat = (xy.1 / EARTH_RADIUS_M).to_degrees();
    Coordinate::new(lat, lng)
}

/// Result of projecting a point onto a segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentProjection {
    /// Closest point on the segment.
    pub point: Coordinate,
    /// Distance from the query point to `point`, in meters.
    pub distance_meters: f64,
    /// Parametric position along the segment, clamped to [0, 1].
    pub t: f64,
}

/// Project `p` onto the segment `a`-`b`, clamping to the segment ends.
pub fn point_to_segment(p: Coordinate, a: Coordinate, b: Coordinate) -> SegmentProjection {
    let ref_lat = (a.lat + b.lat) / 2.0;
    let (px, py) = project_local(p, ref_lat);
    let (ax, ay) = project_local(a, ref_lat);
    let (bx, by) = project_local(b, ref_lat);

    let dx = bx - ax;
    let dy = by - ay;
    let len2 = dx * dx + dy * dy;

    let t = if len2 == 0.0 {
        0.0
    } else {
        (((px - ax) * dx + (py - ay) * dy) / len2).clamp(0.0, 1.0)
    };

    let cx = ax + t * dx;
    let cy = ay + t * dy;
    let distance = ((px - cx).powi(2) + (py - cy).powi(2)).sqrt();

    SegmentProjection {
        point: unproject_local((cx, cy), ref_lat),
        distance_meters: distance,
        t,
    }
}

/// Vertex count for generated circles.
#[derive(Debug, Clone, Copy)]
pub struct CircleOptions {
    pub points: usize,
}

impl Default for CircleOptions {
    fn default() -> Self {
        Self { points: 64 }
    }
}

/// Approximate a circle of `radius_meters` around `center` as a closed
/// polygon ring.
///
/// Longitude extent is scaled by `1/cos(lat)` so the ring stays round away
/// from the equator. Counts below 3 are raised to 3.
pub fn circle_polygon(center: Coordinate, radius_meters: f64, options: CircleOptions) -> Geometry {
    let count = options.points.max(3);
    let radius_deg = (radius_meters / EARTH_RADIUS_M).to_degrees();
    let lng_scale = 1.0 / center.lat.to_radians().cos();

    let mut ring = Vec::with_capacity(count + 1);
    for i in 0..count {
        let angle = (i as f64 / count as f64) * std::f64::consts::TAU;
        ring.push(Coordinate::new(
            center.lat + radius_deg * angle.sin(),
            center.lng + radius_deg * lng_scale * angle.cos(),
        ));
    }

    Geometry::Polygon(vec![close_ring(ring)])
}
