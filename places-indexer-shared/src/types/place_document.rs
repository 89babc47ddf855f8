//! Place document types for the search index.
//!
//! This module defines the document structure that is indexed in the search engine.

use serde::{Deserialize, Serialize};

/// Mean earth radius in kilometers, as used by arc distance calculations.
const EARTH_RADIUS_KM: f64 = 6371.0088;

/// A geographic coordinate.
///
/// Serialized in the engine's `geo_point` object form: `{"lon": .., "lat": ..}`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    #[serde(rename = "lon")]
    pub longitude: f64,
    #[serde(rename = "lat")]
    pub latitude: f64,
}

impl GeoPoint {
    /// Create a new point. Note the argument order: longitude first, as in the input file.
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Whether the longitude is finite and within [-180, 180].
    pub fn has_valid_longitude(&self) -> bool {
        self.longitude.is_finite() && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Whether the latitude is finite and within [-90, 90].
    pub fn has_valid_latitude(&self) -> bool {
        self.latitude.is_finite() && (-90.0..=90.0).contains(&self.latitude)
    }

    /// Returns true if both coordinates are finite and within geographic range.
    pub fn is_valid(&self) -> bool {
        self.has_valid_longitude() && self.has_valid_latitude()
    }

    /// Great-circle (arc) distance to `other` in kilometers.
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        let (lat1, lat2) = (self.latitude.to_radians(), other.latitude.to_radians());
        let d_lat = lat2 - lat1;
        let d_lon = (other.longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
    }
}

/// Document representation for the search index.
///
/// The `id` is the engine document id (`_id`) and is not part of the indexed
/// source; it is filled back in from `_id` when a hit is decoded.
///
/// # Fields
///
/// - `id`: Unique key supplied by the caller
/// - `name`: Place display name
/// - `address`: Street address
/// - `phone`: Contact phone number
/// - `location`: Geographic position of the place
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaceDocument {
    #[serde(skip)]
    pub id: String,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub location: GeoPoint,
}

impl PlaceDocument {
    /// Create a new place document.
    ///
    /// # Example
    ///
    /// ```
    /// use places_indexer_shared::{GeoPoint, PlaceDocument};
    ///
    /// let doc = PlaceDocument::new(
    ///     "1",
    ///     "Cafe X",
    ///     "123 Main",
    ///     "555-1234",
    ///     GeoPoint::new(-122.4, 37.7),
    /// );
    /// assert_eq!(doc.document_id(), "1");
    /// ```
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        address: impl Into<String>,
        phone: impl Into<String>,
        location: GeoPoint,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            address: address.into(),
            phone: phone.into(),
            location,
        }
    }

    /// The document ID used in the search index.
    pub fn document_id(&self) -> &str {
        &self.id
    }

    /// Serialize the indexed source (everything except the id) to JSON.
    pub fn to_source(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cafe() -> PlaceDocument {
        PlaceDocument::new(
            "1",
            "Cafe X",
            "123 Main",
            "555-1234",
            GeoPoint::new(-122.4, 37.7),
        )
    }

    #[test]
    fn test_source_excludes_id() {
        let source: serde_json::Value = serde_json::from_str(&cafe().to_source().unwrap()).unwrap();

        assert_eq!(
            source,
            serde_json::json!({
                "name": "Cafe X",
                "address": "123 Main",
                "phone": "555-1234",
                "location": { "lon": -122.4, "lat": 37.7 }
            })
        );
    }

    #[test]
    fn test_deserialize_leaves_id_empty() {
        let json = r#"{"name":"Cafe X","address":"123 Main","phone":"555-1234","location":{"lat":37.7,"lon":-122.4}}"#;
        let doc: PlaceDocument = serde_json::from_str(json).unwrap();

        assert!(doc.id.is_empty());
        assert_eq!(doc.location, GeoPoint::new(-122.4, 37.7));
    }

    #[test]
    fn test_geo_point_validity() {
        assert!(GeoPoint::new(-122.4, 37.7).is_valid());
        assert!(GeoPoint::new(180.0, -90.0).is_valid());
        assert!(!GeoPoint::new(180.5, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, 91.0).is_valid());
        assert!(!GeoPoint::new(f64::NAN, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, f64::INFINITY).is_valid());
    }

    #[test]
    fn test_distance_km() {
        let origin = GeoPoint::new(-122.4, 37.7);
        assert_eq!(origin.distance_km(&origin), 0.0);

        // One degree of latitude is roughly 111 km.
        let north = GeoPoint::new(-122.4, 38.7);
        let d = origin.distance_km(&north);
        assert!((d - 111.2).abs() < 0.5, "unexpected distance {d}");
    }
}
