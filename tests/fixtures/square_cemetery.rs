//! A small synthetic cemetery: a 20 m × 20 m road loop drawn as four
//! independent segments sharing corner endpoints, with one plot inside.

use cemetery_nav::geodesic::EARTH_RADIUS_M;
use cemetery_nav::geometry::{Coordinate, Geometry, encode};
use cemetery_nav::graph::{Road, RoadKind};
use cemetery_nav::store::{PlotRecord, RoadRecord};

pub const BASE_LAT: f64 = 47.37;
pub const BASE_LNG: f64 = 8.54;
pub const SIDE_METERS: f64 = 20.0;

pub const PLOT_ID: i64 = 100;

/// Degrees of latitude spanning one square side.
pub fn lat_step() -> f64 {
    (SIDE_METERS / EARTH_RADIUS_M).to_degrees()
}

/// Degrees of longitude spanning one square side at the base latitude.
pub fn lng_step() -> f64 {
    lat_step() / BASE_LAT.to_radians().cos()
}

/// Corners in drawing order: south-west, south-east, north-east,
/// north-west. The graph build visits them in this order, so their node
/// ids are 0..=3.
pub fn corners() -> [Coordinate; 4] {
    let sw = Coordinate::new(BASE_LAT, BASE_LNG);
    let se = Coordinate::new(BASE_LAT, BASE_LNG + lng_step());
    let ne = Coordinate::new(BASE_LAT + lat_step(), BASE_LNG + lng_step());
    let nw = Coordinate::new(BASE_LAT + lat_step(), BASE_LNG);
    [sw, se, ne, nw]
}

pub fn center() -> Coordinate {
    Coordinate::new(BASE_LAT + lat_step() / 2.0, BASE_LNG + lng_step() / 2.0)
}

fn segment(id: i64, name: &str, a: Coordinate, b: Coordinate) -> Road {
    Road {
        id,
        name: name.to_string(),
        geometry: vec![a, b],
        kind: RoadKind::Footpath,
    }
}

/// The four loop segments as already-decoded roads.
pub fn square_loop_roads() -> Vec<Road> {
    let [sw, se, ne, nw] = corners();
    vec![
        segment(1, "south walk", sw, se),
        segment(2, "east walk", se, ne),
        segment(3, "north walk", ne, nw),
        segment(4, "west walk", nw, sw),
    ]
}

/// The same roads as store records, geometry as shape text.
pub fn road_records() -> Vec<RoadRecord> {
    square_loop_roads()
        .into_iter()
        .map(|road| RoadRecord {
            id: road.id,
            name: road.name,
            geometry: encode(&Geometry::LineString(road.geometry)),
            kind: "footpath".to_string(),
        })
        .collect()
}

/// One plot record. Its marker sits just inside the north-east corner so
/// that snapping it is unambiguous.
pub fn plot_records() -> Vec<PlotRecord> {
    let [_, _, ne, _] = corners();
    let marker = Coordinate::new(ne.lat - lat_step() / 10.0, ne.lng - lng_step() / 10.0);
    let c = center();
    let half = lat_step() / 8.0;
    let boundary = vec![
        Coordinate::new(c.lat - half, c.lng - half),
        Coordinate::new(c.lat - half, c.lng + half),
        Coordinate::new(c.lat + half, c.lng + half),
        Coordinate::new(c.lat + half, c.lng - half),
        Coordinate::new(c.lat - half, c.lng - half),
    ];

    vec![PlotRecord {
        id: PLOT_ID,
        location: Some(encode(&Geometry::Point(marker))),
        boundary: encode(&Geometry::Polygon(vec![boundary])),
        status: "occupied".to_string(),
    }]
}
