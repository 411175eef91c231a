//! Shortest-path routing over the road graph.

use serde::{Deserialize, Serialize};

use crate::geometry::Coordinate;
use crate::graph::Graph;

/// An on-demand routing result, handed to the presentation layer as plain
/// data and never persisted.
///
/// An unreachable target is a value, not an error: empty sequences and an
/// infinite distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    pub node_ids: Vec<usize>,
    pub coords: Vec<Coordinate>,
    pub distance_meters: f64,
}

impl RouteResult {
    pub fn no_route() -> Self {
        Self {
            node_ids: Vec::new(),
            coords: Vec::new(),
            distance_meters: f64::INFINITY,
        }
    }

    pub fn is_reachable(&self) -> bool {
        self.distance_meters.is_finite()
    }
}

/// Dijkstra over the adjacency lists, without a priority queue.
///
/// The minimum-distance scan walks node ids in ascending order with strict
/// improvement, so ties settle on the lowest id and output is reproducible.
/// Quadratic node selection is fine at this graph scale; a heap would slot
/// into the selection step only.
pub fn shortest_path(graph: &Graph, start: usize, end: usize) -> RouteResult {
    let n = graph.node_count();
    if start >= n || end >= n {
        return RouteResult::no_route();
    }

    let mut dist = vec![f64::INFINITY; n];
    let mut prev: Vec<Option<usize>> = vec![None; n];
    let mut visited = vec![false; n];
    dist[start] = 0.0;

    loop {
        let mut current: Option<usize> = None;
        for id in 0..n {
            if visited[id] || dist[id].is_infinite() {
                continue;
            }
            match current {
                Some(c) if dist[id] >= dist[c] => {}
                _ => current = Some(id),
            }
        }
        let Some(current) = current else {
            break;
        };

        visited[current] = true;
        if current == end {
            break;
        }

        for edge in graph.neighbors(current) {
            let candidate = dist[current] + edge.weight_meters;
            if candidate < dist[edge.to] {
                dist[edge.to] = candidate;
                prev[edge.to] = Some(current);
            }
        }
    }

    if end != start && prev[end].is_none() {
        tracing::debug!(start, end, "target unreachable");
        return RouteResult::no_route();
    }

    let mut node_ids = Vec::new();
    let mut cursor = Some(end);
    while let Some(id) = cursor {
        node_ids.push(id);
        if id == start {
            break;
        }
        cursor = prev[id];
    }
    node_ids.reverse();
    if node_ids.first() != Some(&start) {
        return RouteResult::no_route();
    }

    let coords = node_ids
        .iter()
        .filter_map(|&id| graph.node(id))
        .map(|node| node.coord)
        .collect();

    RouteResult {
        node_ids,
        coords,
        distance_meters: dist[end],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geodesic::EARTH_RADIUS_M;
    use crate::geometry::Coordinate;
    use crate::graph::{Road, RoadKind};

    /// Degrees of latitude spanning `meters` at any longitude.
    fn lat_degrees(meters: f64) -> f64 {
        (meters / EARTH_RADIUS_M).to_degrees()
    }

    fn path_road(spacings_m: &[f64]) -> Road {
        let mut lat = 47.0;
        let mut geometry = vec![Coordinate::new(lat, 8.0)];
        for meters in spacings_m {
            lat += lat_degrees(*meters);
            geometry.push(Coordinate::new(lat, 8.0));
        }
        Road {
            id: 1,
            name: "path".to_string(),
            geometry,
            kind: RoadKind::Footpath,
        }
    }

    #[test]
    fn three_node_path_sums_weights() {
        // A - B - C at 10 m and 15 m.
        let graph = Graph::build(&[path_road(&[10.0, 15.0])]);

        let route = shortest_path(&graph, 0, 2);
        assert_eq!(route.node_ids, vec![0, 1, 2]);
        assert_eq!(route.coords.len(), 3);
        assert!((route.distance_meters - 25.0).abs() < 0.01, "distance = {}", route.distance_meters);
    }

    #[test]
    fn start_equals_end() {
        let graph = Graph::build(&[path_road(&[10.0])]);
        let route = shortest_path(&graph, 0, 0);
        assert_eq!(route.node_ids, vec![0]);
        assert_eq!(route.coords.len(), 1);
        assert_eq!(route.distance_meters, 0.0);
    }

    #[test]
    fn disconnected_components_yield_no_route() {
        let near = path_road(&[10.0]);
        let far = Road {
            id: 2,
            name: "far".to_string(),
            geometry: vec![Coordinate::new(48.0, 9.0), Coordinate::new(48.0001, 9.0)],
            kind: RoadKind::Footpath,
        };
        let graph = Graph::build(&[near, far]);

        let route = shortest_path(&graph, 0, 3);
        assert!(!route.is_reachable());
        assert!(route.node_ids.is_empty());
        assert!(route.coords.is_empty());
        assert!(route.distance_meters.is_infinite());
    }

    #[test]
    fn out_of_range_ids_yield_no_route() {
        let graph = Graph::build(&[path_road(&[10.0])]);
        assert!(!shortest_path(&graph, 0, 99).is_reachable());
        assert!(!shortest_path(&graph, 99, 0).is_reachable());
    }

    #[test]
    fn picks_the_shorter_of_two_alternatives() {
        let dlat_20 = lat_degrees(20.0);
        // Longitude degrees shrink by cos(lat); compensate to get ~20 m.
        let dlng_20 = dlat_20 / 47.0_f64.to_radians().cos();

        let a = Coordinate::new(47.0, 8.0);
        let b = Coordinate::new(47.0 + dlat_20, 8.0);
        let c = Coordinate::new(47.0 + 2.0 * dlat_20, 8.0);
        // Detour waypoint 20 m east of B: both its legs are ~28 m.
        let d = Coordinate::new(47.0 + dlat_20, 8.0 + dlng_20);

        let roads = vec![
            Road {
                id: 1,
                name: "straight".to_string(),
                geometry: vec![a, b, c],
                kind: RoadKind::Footpath,
            },
            Road {
                id: 2,
                name: "detour".to_string(),
                geometry: vec![a, d, c],
                kind: RoadKind::Footpath,
            },
        ];
        let graph = Graph::build(&roads);

        let route = shortest_path(&graph, 0, 2);
        assert_eq!(route.node_ids, vec![0, 1, 2]);
        assert!((route.distance_meters - 40.0).abs() < 0.1, "distance = {}", route.distance_meters);
    }
}
