//! Road graph construction.
//!
//! Roads arrive as independently drawn line segments; the graph collapses
//! their endpoints into shared nodes via a quantized coordinate key and
//! connects consecutive coordinates with undirected, meter-weighted edges.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::geodesic::distance_meters;
use crate::geometry::Coordinate;

/// Coarse road classification from the record store. Does not affect edge
/// weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoadKind {
    Footpath,
    Service,
    Main,
    Other,
}

impl RoadKind {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "footpath" | "path" | "walkway" => RoadKind::Footpath,
            "service" => RoadKind::Service,
            "main" | "primary" => RoadKind::Main,
            _ => RoadKind::Other,
        }
    }
}

/// A drawn road segment, already decoded from shape text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Road {
    pub id: i64,
    pub name: String,
    pub geometry: Vec<Coordinate>,
    pub kind: RoadKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlotStatus {
    Available,
    Occupied,
    Reserved,
    Unknown,
}

impl PlotStatus {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "available" | "free" => PlotStatus::Available,
            "occupied" | "used" => PlotStatus::Occupied,
            "reserved" => PlotStatus::Reserved,
            _ => PlotStatus::Unknown,
        }
    }
}

/// A grave plot: a snap/circle target, never part of the routing graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GravePlot {
    pub id: i64,
    pub location: Option<Coordinate>,
    pub boundary: Vec<Vec<Coordinate>>,
    pub status: PlotStatus,
}

impl GravePlot {
    /// The point this plot snaps and measures from: its marker location, or
    /// the first boundary vertex when no marker is set.
    pub fn anchor(&self) -> Option<Coordinate> {
        self.location
            .or_else(|| self.boundary.first().and_then(|ring| ring.first().copied()))
    }
}

/// A deduplicated graph node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: usize,
    pub coord: Coordinate,
    /// Coordinate quantized to 5 decimals (~1.1 m); the dedup identity.
    pub key: String,
}

/// One adjacency entry; the owning node is the `from` side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub to: usize,
    pub weight_meters: f64,
}

/// An immutable routing graph snapshot.
///
/// Built wholesale from the full road set and never mutated afterwards;
/// when the roads change, callers build a new graph and swap it in. Node
/// ids are dense indexes and are not stable across rebuilds.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<GraphNode>,
    adjacency: Vec<Vec<GraphEdge>>,
    key_index: HashMap<String, usize>,
}

/// Quantize a coordinate to the node identity key.
pub fn quantized_key(coord: Coordinate) -> String {
    format!("{:.5},{:.5}", coord.lat, coord.lng)
}

impl Graph {
    /// Build a graph from the complete road set.
    ///
    /// Walks each road's consecutive coordinate pairs, deduplicating nodes
    /// by quantized key and skipping self-loops and duplicate edges. A road
    /// with a single coordinate yields an isolated node, which is valid and
    /// simply unreachable.
    pub fn build(roads: &[Road]) -> Graph {
        let mut graph = Graph::default();

        for road in roads {
            let mut prev: Option<usize> = None;
            for coord in &road.geometry {
                let id = graph.add_node(*coord);
                if let Some(from) = prev {
                    graph.add_edge(from, id);
                }
                prev = Some(id);
            }
        }

        tracing::debug!(
            roads = roads.len(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "road graph rebuilt"
        );

        graph
    }

    pub(crate) fn add_node(&mut self, coord: Coordinate) -> usize {
        let key = quantized_key(coord);
        if let Some(&id) = self.key_index.get(&key) {
            return id;
        }
        let id = self.nodes.len();
        self.nodes.push(GraphNode {
            id,
            coord,
            key: key.clone(),
        });
        self.adjacency.push(Vec::new());
        self.key_index.insert(key, id);
        id
    }

    pub(crate) fn add_edge(&mut self, from: usize, to: usize) {
        if from == to {
            return;
        }
        if self.adjacency[from].iter().any(|edge| edge.to == to) {
            return;
        }
        let weight = distance_meters(self.nodes[from].coord, self.nodes[to].coord);
        self.adjacency[from].push(GraphEdge {
            to,
            weight_meters: weight,
        });
        self.adjacency[to].push(GraphEdge {
            to: from,
            weight_meters: weight,
        });
    }

    pub fn node(&self, id: usize) -> Option<&GraphNode> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn neighbors(&self, id: usize) -> &[GraphEdge] {
        self.adjacency.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum::<usize>() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Flattened undirected edge list `(from, to, weight)` with `from < to`,
    /// for diagnostics and map display.
    pub fn edges(&self) -> Vec<(usize, usize, f64)> {
        let mut edges = Vec::with_capacity(self.edge_count());
        for (from, entries) in self.adjacency.iter().enumerate() {
            for edge in entries {
                if from < edge.to {
                    edges.push((from, edge.to, edge.weight_meters));
                }
            }
        }
        edges
    }
}
