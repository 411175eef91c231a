//! External record store adapter and geometry ingestion.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

use crate::geometry::{AxisOrder, Geometry, decode};
use crate::graph::{GravePlot, PlotStatus, Road, RoadKind};
use crate::traits::RecordStore;

/// A road row as the record store serves it: geometry still as shape text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadRecord {
    pub id: i64,
    pub name: String,
    pub geometry: String,
    pub kind: String,
}

/// A grave plot row as the record store serves it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotRecord {
    pub id: i64,
    pub location: Option<String>,
    pub boundary: String,
    pub status: String,
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug)]
pub enum StoreError {
    Http(reqwest::Error),
    /// Failure reported by a non-HTTP backend implementation.
    Backend(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::Http(err)
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Http(err) => write!(f, "record store request failed: {}", err),
            StoreError::Backend(reason) => write!(f, "record store backend error: {}", reason),
        }
    }
}

impl std::error::Error for StoreError {}

/// HTTP adapter for the record store.
///
/// Expects `GET {base_url}/roads` and `GET {base_url}/plots` to return JSON
/// arrays of [`RoadRecord`] and [`PlotRecord`].
#[derive(Debug, Clone)]
pub struct HttpRecordStore {
    config: StoreConfig,
    client: reqwest::blocking::Client,
}

impl HttpRecordStore {
    pub fn new(config: StoreConfig) -> Result<Self, StoreError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, StoreError> {
        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), path);
        let response = self.client.get(url).send()?.error_for_status()?;
        Ok(response.json::<T>()?)
    }
}

impl RecordStore for HttpRecordStore {
    fn fetch_roads(&self) -> Result<Vec<RoadRecord>, StoreError> {
        self.get_json("roads")
    }

    fn fetch_plots(&self) -> Result<Vec<PlotRecord>, StoreError> {
        self.get_json("plots")
    }
}

/// Outcome of decoding a record batch.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub roads: Vec<Road>,
    pub plots: Vec<GravePlot>,
    /// Records (or plot locations) whose geometry text was unusable.
    pub skipped: usize,
}

/// Decode record geometry text into domain values.
///
/// Malformed or wrong-shape geometry never fails the batch: the record is
/// skipped, logged, and counted. A plot with a bad marker location keeps
/// its boundary and loses the marker.
pub fn ingest(
    road_records: &[RoadRecord],
    plot_records: &[PlotRecord],
    order: AxisOrder,
) -> IngestReport {
    let mut report = IngestReport::default();

    for record in road_records {
        match decode(&record.geometry, order) {
            Ok(Some(Geometry::LineString(points))) => report.roads.push(Road {
                id: record.id,
                name: record.name.clone(),
                geometry: points,
                kind: RoadKind::from_label(&record.kind),
            }),
            Ok(_) => {
                tracing::warn!(road = record.id, "road geometry is not a line, skipping");
                report.skipped += 1;
            }
            Err(err) => {
                tracing::warn!(road = record.id, error = %err, "undecodable road geometry, skipping");
                report.skipped += 1;
            }
        }
    }

    for record in plot_records {
        let boundary = match decode(&record.boundary, order) {
            Ok(Some(Geometry::Polygon(rings))) => rings,
            Ok(_) => {
                tracing::warn!(plot = record.id, "plot boundary is not a polygon, skipping");
                report.skipped += 1;
                continue;
            }
            Err(err) => {
                tracing::warn!(plot = record.id, error = %err, "undecodable plot boundary, skipping");
                report.skipped += 1;
                continue;
            }
        };

        let location = match &record.location {
            None => None,
            Some(text) => match decode(text, order) {
                Ok(Some(Geometry::Point(coord))) => Some(coord),
                Ok(None) => None,
                Ok(_) => {
                    tracing::warn!(plot = record.id, "plot location is not a point, dropping it");
                    report.skipped += 1;
                    None
                }
                Err(err) => {
                    tracing::warn!(plot = record.id, error = %err, "undecodable plot location, dropping it");
                    report.skipped += 1;
                    None
                }
            },
        };

        report.plots.push(GravePlot {
            id: record.id,
            location,
            boundary,
            status: PlotStatus::from_label(&record.status),
        });
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Coordinate;

    fn road_record(id: i64, geometry: &str) -> RoadRecord {
        RoadRecord {
            id,
            name: format!("road-{}", id),
            geometry: geometry.to_string(),
            kind: "footpath".to_string(),
        }
    }

    #[test]
    fn decodes_well_formed_roads() {
        let records = vec![road_record(1, "LINESTRING(8.0 47.0, 8.001 47.0)")];
        let report = ingest(&records, &[], AxisOrder::LngLat);

        assert_eq!(report.skipped, 0);
        assert_eq!(report.roads.len(), 1);
        assert_eq!(report.roads[0].geometry[0], Coordinate::new(47.0, 8.0));
        assert_eq!(report.roads[0].kind, RoadKind::Footpath);
    }

    #[test]
    fn counts_undecodable_and_wrong_shape_roads() {
        let records = vec![
            road_record(1, "LINESTRING(8.0 47.0, 8.001 47.0)"),
            road_record(2, "LINESTRING(8.0 oops)"),
            road_record(3, "POINT(8.0 47.0)"),
        ];
        let report = ingest(&records, &[], AxisOrder::LngLat);

        assert_eq!(report.roads.len(), 1);
        assert_eq!(report.skipped, 2);
    }

    #[test]
    fn plot_with_bad_marker_keeps_its_boundary() {
        let records = vec![PlotRecord {
            id: 5,
            location: Some("POINT(broken)".to_string()),
            boundary: "POLYGON((8 47, 8.0001 47, 8.0001 47.0001))".to_string(),
            status: "occupied".to_string(),
        }];
        let report = ingest(&[], &records, AxisOrder::LngLat);

        assert_eq!(report.plots.len(), 1);
        assert_eq!(report.skipped, 1);
        let plot = &report.plots[0];
        assert!(plot.location.is_none());
        assert_eq!(plot.status, PlotStatus::Occupied);
        // Ring auto-closed during decode.
        assert_eq!(plot.boundary[0].first(), plot.boundary[0].last());
        assert!(plot.anchor().is_some());
    }

    #[test]
    fn plot_with_bad_boundary_is_skipped() {
        let records = vec![PlotRecord {
            id: 6,
            location: Some("POINT(8 47)".to_string()),
            boundary: "LINESTRING(8 47, 8.1 47)".to_string(),
            status: "available".to_string(),
        }];
        let report = ingest(&[], &records, AxisOrder::LngLat);

        assert!(report.plots.is_empty());
        assert_eq!(report.skipped, 1);
    }

    #[test]
    fn empty_location_text_is_absent_not_an_error() {
        let records = vec![PlotRecord {
            id: 7,
            location: Some("POINT EMPTY".to_string()),
            boundary: "POLYGON((8 47, 8.0001 47, 8.0001 47.0001))".to_string(),
            status: "available".to_string(),
        }];
        let report = ingest(&[], &records, AxisOrder::LngLat);

        assert_eq!(report.skipped, 0);
        assert!(report.plots[0].location.is_none());
    }
}
