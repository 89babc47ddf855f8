//! OpenSearch index configuration and mappings.
//!
//! This module defines the default mappings for the places index. Deployments
//! normally supply their own schema file; this one is used when none exists.

use serde_json::{json, Value};

/// The default name of the places index.
pub const INDEX_NAME: &str = "places";

/// Get the default settings and mappings for the places index.
///
/// The configuration includes:
/// - **text**: `name` and `address`, for full-text matching
/// - **keyword**: `phone`, stored for exact lookups
/// - **geo_point**: `location`, required for distance sorting
pub fn default_place_schema() -> Value {
    json!({
        "settings": {
            "number_of_shards": 1,
            "number_of_replicas": 0
        },
        "mappings": {
            "properties": {
                "name": {
                    "type": "text"
                },
                "address": {
                    "type": "text"
                },
                "phone": {
                    "type": "keyword"
                },
                "location": {
                    "type": "geo_point"
                }
            }
        }
    })
}
