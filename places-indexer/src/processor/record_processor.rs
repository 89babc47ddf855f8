//! Record processor implementation.
//!
//! Transforms raw tab-separated rows into `PlaceDocument` structures for indexing.

use csv::StringRecord;
use places_indexer_shared::{GeoPoint, PlaceDocument};

use crate::errors::IngestError;

/// Column layout of the input file.
pub const ID_COLUMN: usize = 0;
pub const NAME_COLUMN: usize = 1;
pub const ADDRESS_COLUMN: usize = 2;
pub const PHONE_COLUMN: usize = 3;
pub const LONGITUDE_COLUMN: usize = 4;
pub const LATITUDE_COLUMN: usize = 5;

/// Number of columns a row must have.
pub const RECORD_FIELDS: usize = 6;

/// Processor that validates raw rows and turns them into documents.
///
/// Only the coordinates are validated; every other column is passed through as-is.
#[derive(Debug, Default, Clone, Copy)]
pub struct RecordProcessor;

impl RecordProcessor {
    /// Create a new record processor.
    pub fn new() -> Self {
        Self
    }

    /// Process a single raw row.
    ///
    /// # Arguments
    ///
    /// * `line` - 1-based line of the row in the input file, used in errors
    /// * `record` - The raw fields `[id, name, address, phone, longitude, latitude]`
    ///
    /// # Returns
    ///
    /// * `Ok(PlaceDocument)` - The validated document
    /// * `Err(IngestError::ValidationError)` - If the row is short or a coordinate is invalid
    pub fn process_record(
        &self,
        line: u64,
        record: &StringRecord,
    ) -> Result<PlaceDocument, IngestError> {
        if record.len() < RECORD_FIELDS {
            return Err(IngestError::validation(
                line,
                format!(
                    "expected {} fields, found {}",
                    RECORD_FIELDS,
                    record.len()
                ),
            ));
        }

        let field = |column: usize| record.get(column).unwrap_or_default();

        let longitude = parse_coordinate(line, "longitude", field(LONGITUDE_COLUMN))?;
        let latitude = parse_coordinate(line, "latitude", field(LATITUDE_COLUMN))?;
        let location = GeoPoint::new(longitude, latitude);

        if !location.has_valid_longitude() {
            return Err(IngestError::validation(
                line,
                format!("longitude {} is outside [-180, 180]", longitude),
            ));
        }
        if !location.has_valid_latitude() {
            return Err(IngestError::validation(
                line,
                format!("latitude {} is outside [-90, 90]", latitude),
            ));
        }

        Ok(PlaceDocument::new(
            field(ID_COLUMN),
            field(NAME_COLUMN),
            field(ADDRESS_COLUMN),
            field(PHONE_COLUMN),
            location,
        ))
    }
}

fn parse_coordinate(line: u64, column: &str, raw: &str) -> Result<f64, IngestError> {
    let value: f64 = raw.trim().parse().map_err(|_| {
        IngestError::validation(line, format!("invalid {} value '{}'", column, raw))
    })?;

    if !value.is_finite() {
        return Err(IngestError::validation(
            line,
            format!("{} value '{}' is not finite", column, raw),
        ));
    }
    Ok(value)
}
