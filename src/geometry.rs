//! Textual geometry codec.
//!
//! Decodes and encodes the keyword-and-parentheses shape text used by the
//! record store (`POINT(lng lat)`, `LINESTRING(...)`, `POLYGON((...))`).
//! Decoding always takes an explicit [`AxisOrder`]; the magnitude heuristic
//! for legacy inputs lives in [`infer_axis_order`] and is opt-in.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// A decoded shape.
///
/// Polygon rings are closed by the decoder before the geometry is handed
/// out; see [`close_ring`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Point(Coordinate),
    LineString(Vec<Coordinate>),
    Polygon(Vec<Vec<Coordinate>>),
}

/// Component order of a coordinate pair in shape text.
///
/// Spatial-database text conventionally puts longitude first, but inputs
/// drawn by hand tools show up in both orders. Callers that know their
/// source pass the order explicitly; [`infer_axis_order`] exists for the
/// rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisOrder {
    LngLat,
    LatLng,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// Leading keyword is not POINT, LINESTRING or POLYGON.
    UnknownKeyword(String),
    /// Missing or mismatched parentheses.
    Unbalanced(String),
    /// A coordinate pair does not have exactly two components.
    BadCoordinate(String),
    /// A component is not a number.
    MalformedNumber(String),
    /// Wrong number of coordinates for the shape.
    BadPointCount {
        keyword: &'static str,
        need: usize,
        got: usize,
    },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::UnknownKeyword(text) => write!(f, "unknown geometry keyword `{}`", text),
            DecodeError::Unbalanced(text) => write!(f, "unbalanced parentheses in `{}`", text),
            DecodeError::BadCoordinate(text) => {
                write!(f, "expected two components in coordinate `{}`", text)
            }
            DecodeError::MalformedNumber(token) => write!(f, "malformed number `{}`", token),
            DecodeError::BadPointCount { keyword, need, got } => {
                write!(f, "{} needs {} coordinate(s), got {}", keyword, need, got)
            }
        }
    }
}

impl std::error::Error for DecodeError {}

/// Decode shape text into a [`Geometry`].
///
/// Returns `Ok(None)` for blank input and for `<KEYWORD> EMPTY`, so an
/// absent geometry is a value, not an error.
pub fn decode(text: &str, order: AxisOrder) -> Result<Option<Geometry>, DecodeError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let keyword_end = trimmed
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(trimmed.len());
    let keyword = trimmed[..keyword_end].to_ascii_uppercase();
    let rest = trimmed[keyword_end..].trim();

    if rest.eq_ignore_ascii_case("EMPTY") {
        return Ok(None);
    }

    match keyword.as_str() {
        "POINT" => {
            let pairs = parse_pairs(strip_parens(rest)?, order)?;
            if pairs.len() != 1 {
                return Err(DecodeError::BadPointCount {
                    keyword: "POINT",
                    need: 1,
                    got: pairs.len(),
                });
            }
            Ok(Some(Geometry::Point(pairs[0])))
        }
        "LINESTRING" => {
            let pairs = parse_pairs(strip_parens(rest)?, order)?;
            if pairs.len() < 2 {
                return Err(DecodeError::BadPointCount {
                    keyword: "LINESTRING",
                    need: 2,
                    got: pairs.len(),
                });
            }
            Ok(Some(Geometry::LineString(pairs)))
        }
        "POLYGON" => {
            let inner = strip_parens(rest)?;
            let mut rings = Vec::new();
            for ring_text in split_rings(inner)? {
                let ring = parse_pairs(strip_parens(ring_text)?, order)?;
                let closed = ring.len() > 1 && ring.first() == ring.last();
                let distinct = if closed { ring.len() - 1 } else { ring.len() };
                if distinct < 3 {
                    return Err(DecodeError::BadPointCount {
                        keyword: "POLYGON",
                        need: 3,
                        got: distinct,
                    });
                }
                rings.push(close_ring(ring));
            }
            if rings.is_empty() {
                return Err(DecodeError::BadPointCount {
                    keyword: "POLYGON",
                    need: 1,
                    got: 0,
                });
            }
            Ok(Some(Geometry::Polygon(rings)))
        }
        _ => {
            let offending = if keyword.is_empty() {
                trimmed.chars().take(16).collect()
            } else {
                keyword
            };
            Err(DecodeError::UnknownKeyword(offending))
        }
    }
}

/// Encode a [`Geometry`] as shape text, longitude first.
///
/// Uses shortest round-trip float formatting, so `decode(encode(g))`
/// reproduces `g` exactly.
pub fn encode(geometry: &Geometry) -> String {
    match geometry {
        Geometry::Point(c) => format!("POINT({} {})", c.lng, c.lat),
        Geometry::LineString(points) => format!("LINESTRING({})", encode_pairs(points)),
        Geometry::Polygon(rings) => {
            let body = rings
                .iter()
                .map(|ring| format!("({})", encode_pairs(ring)))
                .collect::<Vec<_>>()
                .join(",");
            format!("POLYGON({})", body)
        }
    }
}

fn encode_pairs(points: &[Coordinate]) -> String {
    points
        .iter()
        .map(|c| format!("{} {}", c.lng, c.lat))
        .collect::<Vec<_>>()
        .join(",")
}

/// Close a polygon ring by appending its first point if needed.
///
/// Rings with fewer than three points are returned unchanged (they are
/// invalid and rejected upstream). Idempotent.
pub fn close_ring(mut ring: Vec<Coordinate>) -> Vec<Coordinate> {
    if ring.len() < 3 {
        return ring;
    }
    if ring.first() != ring.last() {
        let first = ring[0];
        ring.push(first);
    }
    ring
}

/// Guess the component order of shape text from coordinate magnitudes.
///
/// Valid latitude never exceeds 90, so a slot holding a value beyond that
/// must be longitude. The whole coordinate set is scanned and classified
/// once. Unreliable for data near (0, 0), where neither slot exceeds the
/// bound; such inputs fall back to longitude-first.
pub fn infer_axis_order(text: &str) -> AxisOrder {
    let mut first_exceeds = false;
    let mut second_exceeds = false;

    for chunk in text
        .split(|c| c == '(' || c == ')' || c == ',')
        .filter(|chunk| !chunk.trim().is_empty())
    {
        let mut components = chunk.split_whitespace().filter_map(|t| t.parse::<f64>().ok());
        if let (Some(a), Some(b)) = (components.next(), components.next()) {
            first_exceeds |= a.abs() > 90.0;
            second_exceeds |= b.abs() > 90.0;
        }
    }

    if first_exceeds {
        AxisOrder::LngLat
    } else if second_exceeds {
        AxisOrder::LatLng
    } else {
        AxisOrder::LngLat
    }
}

/// Strip one level of surrounding parentheses.
fn strip_parens(text: &str) -> Result<&str, DecodeError> {
    let trimmed = text.trim();
    if let Some(inner) = trimmed
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
    {
        Ok(inner)
    } else {
        Err(DecodeError::Unbalanced(trimmed.to_string()))
    }
}

/// Split the inside of a POLYGON body into its `(...)` ring chunks.
fn split_rings(inner: &str) -> Result<Vec<&str>, DecodeError> {
    let mut rings = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;

    for (i, c) in inner.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                if depth == 0 {
                    return Err(DecodeError::Unbalanced(inner.to_string()));
                }
                depth -= 1;
            }
            ',' if depth == 0 => {
                rings.push(&inner[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(DecodeError::Unbalanced(inner.to_string()));
    }
    rings.push(&inner[start..]);
    Ok(rings)
}

fn parse_pairs(inner: &str, order: AxisOrder) -> Result<Vec<Coordinate>, DecodeError> {
    let mut pairs = Vec::new();
    for chunk in inner.split(',') {
        let chunk = chunk.trim();
        if chunk.is_empty() {
            continue;
        }
        let components: Vec<&str> = chunk.split_whitespace().collect();
        if components.len() != 2 {
            return Err(DecodeError::BadCoordinate(chunk.to_string()));
        }
        let a = parse_number(components[0])?;
        let b = parse_number(components[1])?;
        let coordinate = match order {
            AxisOrder::LngLat => Coordinate::new(b, a),
            AxisOrder::LatLng => Coordinate::new(a, b),
        };
        pairs.push(coordinate);
    }
    Ok(pairs)
}

fn parse_number(token: &str) -> Result<f64, DecodeError> {
    token
        .parse::<f64>()
        .map_err(|_| DecodeError::MalformedNumber(token.to_string()))
}
