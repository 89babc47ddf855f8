//! Search result types for the places indexer.
//!
//! This module defines the response structures returned from search operations.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::place_document::{GeoPoint, PlaceDocument};

/// Decoded `_search` response. Only the parts the query layer reads are kept.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SearchResponse {
    #[serde(default)]
    pub took: u64,
    pub hits: SearchHits,
}

/// The `hits` envelope of a search response.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct SearchHits {
    /// Absent unless total hit tracking was requested.
    #[serde(default)]
    pub total: Option<TotalHits>,
    #[serde(default)]
    pub hits: Vec<SearchHit>,
}

/// `hits.total`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TotalHits {
    pub value: u64,
    #[serde(default)]
    pub relation: Option<String>,
}

/// A single hit, with its source left undecoded until it is needed.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SearchHit {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_source", default)]
    pub source: Option<Value>,
    /// Sort values, e.g. the distance in km for a geo sort.
    #[serde(default)]
    pub sort: Vec<Value>,
}

/// Source fields as stored; `location` may be missing on foreign documents.
#[derive(Debug, Deserialize)]
struct PlaceSource {
    #[serde(default)]
    name: String,
    #[serde(default)]
    address: String,
    #[serde(default)]
    phone: String,
    #[serde(default)]
    location: Option<GeoPoint>,
}

impl SearchHit {
    /// Decode the hit into a document, taking the id from `_id`.
    ///
    /// Returns `Ok(None)` when the hit has no source or no location.
    pub fn into_place(self) -> Result<Option<PlaceDocument>, serde_json::Error> {
        let Some(source) = self.source else {
            return Ok(None);
        };
        let source: PlaceSource = serde_json::from_value(source)?;

        Ok(source.location.map(|location| PlaceDocument {
            id: self.id,
            name: source.name,
            address: source.address,
            phone: source.phone,
            location,
        }))
    }
}

impl SearchResponse {
    /// Total number of matching documents, 0 when the engine did not report it.
    pub fn total(&self) -> u64 {
        self.hits.total.as_ref().map_or(0, |t| t.value)
    }

    /// Returns true if there are no hits.
    pub fn is_empty(&self) -> bool {
        self.hits.hits.is_empty()
    }

    /// Returns the number of hits in this response.
    pub fn len(&self) -> usize {
        self.hits.hits.len()
    }
}

/// One page of places plus the size of the whole corpus.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct PlacePage {
    pub places: Vec<PlaceDocument>,
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_search_response() {
        let body = json!({
            "took": 3,
            "hits": {
                "total": { "value": 42, "relation": "eq" },
                "hits": [{
                    "_index": "places",
                    "_id": "1",
                    "_source": {
                        "name": "Cafe X",
                        "address": "123 Main",
                        "phone": "555-1234",
                        "location": { "lon": -122.4, "lat": 37.7 }
                    },
                    "sort": [0.0]
                }]
            }
        });

        let response: SearchResponse = serde_json::from_value(body).unwrap();
        assert_eq!(response.total(), 42);
        assert_eq!(response.len(), 1);

        let hit = response.hits.hits.into_iter().next().unwrap();
        let place = hit.into_place().unwrap().unwrap();
        assert_eq!(place.id, "1");
        assert_eq!(place.name, "Cafe X");
        assert_eq!(place.location, GeoPoint::new(-122.4, 37.7));
    }

    #[test]
    fn test_missing_total_is_zero() {
        let response: SearchResponse = serde_json::from_value(json!({ "hits": { "hits": [] } })).unwrap();
        assert_eq!(response.total(), 0);
        assert!(response.is_empty());
    }

    #[test]
    fn test_hit_without_location_is_none() {
        let hit: SearchHit = serde_json::from_value(json!({
            "_id": "2",
            "_source": { "name": "Nowhere" }
        }))
        .unwrap();

        assert!(hit.into_place().unwrap().is_none());
    }

    #[test]
    fn test_malformed_location_is_error() {
        let hit: SearchHit = serde_json::from_value(json!({
            "_id": "3",
            "_source": { "name": "Bad", "location": "not a point" }
        }))
        .unwrap();

        assert!(hit.into_place().is_err());
    }
}
