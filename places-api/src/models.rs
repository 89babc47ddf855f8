//! Request parameters and response bodies.

use places_indexer_shared::PlaceDocument;
use serde::{Deserialize, Serialize};

/// Query string of `GET /api/places`. Parsed by hand so bad values get a JSON error.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
}

/// Query string of `GET /api/recommend`.
#[derive(Debug, Default, Deserialize)]
pub struct RecommendParams {
    pub lat: Option<String>,
    pub lon: Option<String>,
}

/// A place as returned by the API: the indexed fields plus the id.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PlaceResponse {
    pub id: String,
    #[serde(flatten)]
    pub place: PlaceDocument,
}

impl From<PlaceDocument> for PlaceResponse {
    fn from(place: PlaceDocument) -> Self {
        Self {
            id: place.id.clone(),
            place,
        }
    }
}

/// Body of `GET /api/places`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PlacesPage {
    pub places: Vec<PlaceResponse>,
    pub prev_page: u64,
    pub next_page: u64,
    pub last_page: u64,
}

impl PlacesPage {
    /// Build page `page` (1-based) of a listing with `total` places.
    pub fn new(places: Vec<PlaceDocument>, page: u64, total: u64, page_size: usize) -> Self {
        Self {
            places: places.into_iter().map(PlaceResponse::from).collect(),
            prev_page: page.saturating_sub(1),
            next_page: page.saturating_add(1),
            last_page: total.div_ceil(page_size.max(1) as u64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use places_indexer_shared::GeoPoint;
    use serde_json::json;

    #[test]
    fn test_page_links() {
        let page = PlacesPage::new(Vec::new(), 1, 25, 10);
        assert_eq!((page.prev_page, page.next_page, page.last_page), (0, 2, 3));

        let page = PlacesPage::new(Vec::new(), 2, 20, 10);
        assert_eq!(page.last_page, 2);

        let page = PlacesPage::new(Vec::new(), 1, 0, 10);
        assert_eq!(page.last_page, 0);
    }

    #[test]
    fn test_page_links_saturate_at_the_last_page_number() {
        let page = PlacesPage::new(Vec::new(), u64::MAX, 3, 1);
        assert_eq!(page.prev_page, u64::MAX - 1);
        assert_eq!(page.next_page, u64::MAX);
    }

    #[test]
    fn test_place_response_includes_id() {
        let place = PlaceDocument::new("1", "Cafe X", "123 Main", "555-1234", GeoPoint::new(-122.4, 37.7));

        let value = serde_json::to_value(PlaceResponse::from(place)).unwrap();

        assert_eq!(
            value,
            json!({
                "id": "1",
                "name": "Cafe X",
                "address": "123 Main",
                "phone": "555-1234",
                "location": { "lon": -122.4, "lat": 37.7 }
            })
        );
    }
}
