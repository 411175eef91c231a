//! Collaborator seams for the navigation engine.
//!
//! These are intentionally minimal. The record store and the position
//! source live outside the engine; concrete hosts implement them for their
//! own backends, and tests substitute in-memory versions.

use crate::store::{PlotRecord, RoadRecord, StoreError};

/// Supplies the full road and plot record sets on demand.
///
/// The engine never writes back through this seam; it rebuilds its graph
/// from a fresh fetch whenever the host signals that the data changed.
pub trait RecordStore {
    fn fetch_roads(&self) -> Result<Vec<RoadRecord>, StoreError>;

    fn fetch_plots(&self) -> Result<Vec<PlotRecord>, StoreError>;
}

/// Handle to an active position stream.
///
/// The host pushes samples into the engine; the engine never polls. It only
/// holds this handle so it can stop the stream when tracking ends.
pub trait PositionSubscription {
    /// Stop the stream. Must be safe to call more than once.
    fn cancel(&mut self);
}
