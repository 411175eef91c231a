//! Navigation session: graph snapshot lifecycle and live routing.
//!
//! The session owns an immutable graph snapshot that is rebuilt wholesale
//! and swapped on reload, an explicit Idle/Loading reload state, and the
//! tracker plus its stream subscription. Snap and route calls read the
//! current snapshot; nothing mutates a graph in place.

use crate::geodesic::{CircleOptions, circle_polygon};
use crate::geometry::{AxisOrder, Coordinate, Geometry};
use crate::graph::{Graph, GravePlot};
use crate::router::{RouteResult, shortest_path};
use crate::snap::nearest_node;
use crate::store::{IngestReport, StoreError, ingest};
use crate::tracker::{
    LocationSample, PositionSourceError, SampleDisposition, Tracker, TrackerConfig, TrackerState,
};
use crate::traits::{PositionSubscription, RecordStore};

/// Reload progress. Modeled as a state machine so an overlapping reload
/// request has a defined answer instead of racing a flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadState {
    Idle,
    Loading,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadSummary {
    pub roads: usize,
    pub plots: usize,
    pub skipped: usize,
    pub nodes: usize,
    pub edges: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    Completed(ReloadSummary),
    /// A reload was already running; this request was not serviced.
    InProgress,
}

/// One visitor-facing navigation context.
pub struct NavSession {
    axis_order: AxisOrder,
    graph: Graph,
    plots: Vec<GravePlot>,
    reload_state: ReloadState,
    tracker: Tracker,
    subscription: Option<Box<dyn PositionSubscription>>,
    destination: Option<usize>,
    start_node: Option<usize>,
}

impl NavSession {
    pub fn new(axis_order: AxisOrder, tracker_config: TrackerConfig) -> Self {
        Self {
            axis_order,
            graph: Graph::default(),
            plots: Vec::new(),
            reload_state: ReloadState::Idle,
            tracker: Tracker::new(tracker_config),
            subscription: None,
            destination: None,
            start_node: None,
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn plots(&self) -> &[GravePlot] {
        &self.plots
    }

    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    pub fn reload_state(&self) -> ReloadState {
        self.reload_state
    }

    pub fn destination(&self) -> Option<usize> {
        self.destination
    }

    /// Fetch the full record sets and swap in a freshly built graph.
    ///
    /// Node ids are not stable across rebuilds, so the destination and the
    /// cached start node are cleared; callers re-set the destination after
    /// a reload.
    pub fn reload(&mut self, store: &dyn RecordStore) -> Result<ReloadOutcome, StoreError> {
        if self.reload_state == ReloadState::Loading {
            return Ok(ReloadOutcome::InProgress);
        }
        self.reload_state = ReloadState::Loading;
        let result = self.reload_inner(store);
        self.reload_state = ReloadState::Idle;
        result
    }

    fn reload_inner(&mut self, store: &dyn RecordStore) -> Result<ReloadOutcome, StoreError> {
        let road_records = store.fetch_roads()?;
        let plot_records = store.fetch_plots()?;

        let IngestReport {
            roads,
            plots,
            skipped,
        } = ingest(&road_records, &plot_records, self.axis_order);
        let graph = Graph::build(&roads);

        let summary = ReloadSummary {
            roads: roads.len(),
            plots: plots.len(),
            skipped,
            nodes: graph.node_count(),
            edges: graph.edge_count(),
        };
        tracing::info!(
            roads = summary.roads,
            plots = summary.plots,
            skipped = summary.skipped,
            nodes = summary.nodes,
            edges = summary.edges,
            "map data reloaded"
        );

        self.graph = graph;
        self.plots = plots;
        self.destination = None;
        self.start_node = None;

        Ok(ReloadOutcome::Completed(summary))
    }

    /// Snap a map click to the graph and make it the routing destination.
    pub fn set_destination_coord(&mut self, coord: Coordinate) -> Option<usize> {
        let node = nearest_node(&self.graph, coord).map(|node| node.id);
        self.destination = node;
        self.start_node = None;
        node
    }

    /// Make a plot the routing destination via its anchor point.
    pub fn set_destination_plot(&mut self, plot_id: i64) -> Option<usize> {
        let anchor = self
            .plots
            .iter()
            .find(|plot| plot.id == plot_id)
            .and_then(GravePlot::anchor)?;
        self.set_destination_coord(anchor)
    }

    pub fn clear_destination(&mut self) {
        self.destination = None;
        self.start_node = None;
    }

    /// One-shot route from an arbitrary position to the current
    /// destination.
    pub fn route_from(&self, from: Coordinate) -> RouteResult {
        let (Some(start), Some(destination)) = (nearest_node(&self.graph, from), self.destination)
        else {
            return RouteResult::no_route();
        };
        shortest_path(&self.graph, start.id, destination)
    }

    /// Begin consuming a position stream. Any previous stream is canceled
    /// first.
    pub fn start_tracking(&mut self, subscription: Box<dyn PositionSubscription>, now_ms: i64) {
        self.stop_tracking();
        self.tracker.start(now_ms);
        self.subscription = Some(subscription);
    }

    /// Cancel the stream (if any) and reset tracking state. Idempotent.
    pub fn stop_tracking(&mut self) {
        self.cancel_subscription();
        self.tracker.cancel();
        self.start_node = None;
    }

    /// Feed one incoming position sample through the tracker.
    ///
    /// Returns a new route only when the sample was accepted, a destination
    /// is set, and the snapped start node actually changed.
    pub fn handle_sample(&mut self, sample: LocationSample) -> Option<RouteResult> {
        match self.tracker.offer(sample) {
            SampleDisposition::Accepted => {}
            SampleDisposition::Expired => {
                self.cancel_subscription();
                self.start_node = None;
                return None;
            }
            SampleDisposition::Rejected | SampleDisposition::Idle => return None,
        }

        let destination = self.destination?;
        let start = nearest_node(&self.graph, sample.coord)?.id;
        if self.start_node == Some(start) {
            return None;
        }
        self.start_node = Some(start);

        tracing::debug!(start, destination, "start node moved, recomputing route");
        Some(shortest_path(&self.graph, start, destination))
    }

    /// Forward a source-level error; terminal errors tear tracking down.
    pub fn handle_source_error(&mut self, error: PositionSourceError) {
        if self.tracker.on_source_error(&error) == TrackerState::Idle {
            self.cancel_subscription();
            self.start_node = None;
        }
    }

    /// Proximity circle around a plot, for radius display on the map.
    pub fn plot_circle(
        &self,
        plot_id: i64,
        radius_meters: f64,
        options: CircleOptions,
    ) -> Option<Geometry> {
        let anchor = self
            .plots
            .iter()
            .find(|plot| plot.id == plot_id)
            .and_then(GravePlot::anchor)?;
        Some(circle_polygon(anchor, radius_meters, options))
    }

    fn cancel_subscription(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.cancel();
        }
    }
}
