//! Search query types for the places indexer.
//!
//! This module defines a small typed query builder. A [`PlaceQuery`] describes
//! what the caller wants; [`PlaceQuery::to_body`] renders it into the
//! [`SearchBody`] that is sent to the engine's `_search` endpoint.

use serde::Serialize;

use crate::types::place_document::GeoPoint;

/// Name of the `geo_point` field in the index mapping.
pub const LOCATION_FIELD: &str = "location";

/// The queries issued against the places index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaceQuery {
    /// Every document, paginated, with an exact total hit count.
    MatchAll { from: usize, size: usize },

    /// The `size` documents closest to `origin`, nearest first.
    /// Documents without a location are never returned.
    GeoNearest { origin: GeoPoint, size: usize },
}

impl PlaceQuery {
    /// Paginated "match all" query.
    pub fn match_all(from: usize, size: usize) -> Self {
        Self::MatchAll { from, size }
    }

    /// Nearest-neighbor query around `origin`.
    pub fn geo_nearest(origin: GeoPoint, size: usize) -> Self {
        Self::GeoNearest { origin, size }
    }

    /// Render the query into a request body.
    ///
    /// # Example
    ///
    /// ```
    /// use places_indexer_shared::PlaceQuery;
    ///
    /// let body = PlaceQuery::match_all(20, 10).to_body();
    /// let json = serde_json::to_value(&body).unwrap();
    /// assert_eq!(json["from"], 20);
    /// assert_eq!(json["size"], 10);
    /// ```
    pub fn to_body(&self) -> SearchBody {
        match *self {
            PlaceQuery::MatchAll { from, size } => SearchBody {
                from: Some(from),
                size,
                query: QueryClause::MatchAll(MatchAllQuery {}),
                sort: Vec::new(),
                track_total_hits: Some(true),
            },
            PlaceQuery::GeoNearest { origin, size } => SearchBody {
                from: None,
                size,
                query: QueryClause::Exists(ExistsQuery {
                    field: LOCATION_FIELD.to_string(),
                }),
                sort: vec![SortClause::GeoDistance(GeoDistanceSort {
                    location: origin,
                    order: SortOrder::Asc,
                    unit: DistanceUnit::Kilometers,
                    distance_type: DistanceType::Arc,
                    ignore_unmapped: true,
                })],
                track_total_hits: None,
            },
        }
    }
}

/// A `_search` request body.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<usize>,
    pub size: usize,
    pub query: QueryClause,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<SortClause>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_total_hits: Option<bool>,
}

/// Query clauses supported by the builder.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum QueryClause {
    MatchAll(MatchAllQuery),
    Exists(ExistsQuery),
}

/// `{"match_all": {}}`
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct MatchAllQuery {}

/// `{"exists": {"field": ..}}`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExistsQuery {
    pub field: String,
}

/// Sort clauses supported by the builder.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub enum SortClause {
    #[serde(rename = "_geo_distance")]
    GeoDistance(GeoDistanceSort),
}

/// Sort by distance from a point. The `location` key doubles as the field name.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GeoDistanceSort {
    pub location: GeoPoint,
    pub order: SortOrder,
    pub unit: DistanceUnit,
    pub distance_type: DistanceType,
    pub ignore_unmapped: bool,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum DistanceUnit {
    #[serde(rename = "km")]
    Kilometers,
    #[serde(rename = "m")]
    Meters,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DistanceType {
    Arc,
    Plane,
}
