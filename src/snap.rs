//! Nearest-target lookup.
//!
//! Linear haversine scans; road graphs here are tens to low hundreds of
//! nodes, so no spatial index is kept.

use crate::geodesic::distance_meters;
use crate::geometry::Coordinate;
use crate::graph::{Graph, GraphNode, GravePlot};

/// The graph node nearest to `coord`, or `None` for an empty graph.
pub fn nearest_node(graph: &Graph, coord: Coordinate) -> Option<&GraphNode> {
    let mut best: Option<(&GraphNode, f64)> = None;
    for node in graph.nodes() {
        let d = distance_meters(coord, node.coord);
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((node, d)),
        }
    }
    best.map(|(node, _)| node)
}

/// The plot whose anchor is nearest to `coord`. Plots without any anchor
/// (no marker and an empty boundary) are ignored.
pub fn nearest_plot(plots: &[GravePlot], coord: Coordinate) -> Option<&GravePlot> {
    let mut best: Option<(&GravePlot, f64)> = None;
    for plot in plots {
        let Some(anchor) = plot.anchor() else {
            continue;
        };
        let d = distance_meters(coord, anchor);
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((plot, d)),
        }
    }
    best.map(|(plot, _)| plot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{PlotStatus, Road, RoadKind};

    #[test]
    fn empty_graph_snaps_to_none() {
        let graph = Graph::default();
        assert!(nearest_node(&graph, Coordinate::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn picks_the_closest_node() {
        let roads = vec![Road {
            id: 1,
            name: "spine".to_string(),
            geometry: vec![
                Coordinate::new(47.0, 8.0),
                Coordinate::new(47.0005, 8.0),
                Coordinate::new(47.001, 8.0),
            ],
            kind: RoadKind::Footpath,
        }];
        let graph = Graph::build(&roads);

        let near_middle = Coordinate::new(47.00052, 8.00001);
        let node = nearest_node(&graph, near_middle).unwrap();
        assert_eq!(node.id, 1);
    }

    #[test]
    fn plots_without_anchor_are_ignored() {
        let plots = vec![
            GravePlot {
                id: 1,
                location: None,
                boundary: Vec::new(),
                status: PlotStatus::Unknown,
            },
            GravePlot {
                id: 2,
                location: Some(Coordinate::new(47.0, 8.0)),
                boundary: Vec::new(),
                status: PlotStatus::Occupied,
            },
        ];

        let found = nearest_plot(&plots, Coordinate::new(47.1, 8.1)).unwrap();
        assert_eq!(found.id, 2);
    }
}
