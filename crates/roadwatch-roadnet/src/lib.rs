//! Road mileage-marker reference index.
//!
//! Loads a CSV table of road markers (road id, mileage label, position)
//! once at startup and answers nearest-marker queries by great-circle
//! distance. The index is read-only after load and can be shared across
//! concurrent workers without locking.

use roadwatch_geo::GeoCoordinate;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::info;

/// A single mileage marker from the reference dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct RoadMarker {
    pub road_id: String,
    pub mileage_label: String,
    pub position: GeoCoordinate,
}

/// Raw CSV row; converted into a [`RoadMarker`] after coordinate validation.
#[derive(Debug, Deserialize)]
struct MarkerRow {
    road_id: String,
    mileage_label: String,
    latitude: f64,
    longitude: f64,
}

/// The marker nearest to a query coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct NearestMarker<'a> {
    pub marker: &'a RoadMarker,
    pub distance_meters: f64,
}

/// Immutable nearest-marker index over the reference dataset.
#[derive(Debug)]
pub struct RoadIndex {
    markers: Vec<RoadMarker>,
}

impl RoadIndex {
    /// Load the index from a CSV file on disk.
    pub fn from_csv_path(path: &Path) -> Result<Self, RoadIndexError> {
        let file = std::fs::File::open(path)
            .map_err(|e| RoadIndexError::Io(path.display().to_string(), e))?;
        let index = Self::from_csv_reader(file)?;
        info!(
            path = %path.display(),
            markers = index.len(),
            "Loaded road marker index"
        );
        Ok(index)
    }

    /// Load the index from any CSV reader with a
    /// `road_id,mileage_label,latitude,longitude` header.
    pub fn from_csv_reader(reader: impl Read) -> Result<Self, RoadIndexError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut markers = Vec::new();

        for (i, row) in csv_reader.deserialize::<MarkerRow>().enumerate() {
            // Header is line 1, first record line 2.
            let line = i + 2;
            let row = row.map_err(|e| RoadIndexError::Csv(line, Box::new(e)))?;
            let position = GeoCoordinate::new(row.latitude, row.longitude)
                .map_err(|e| RoadIndexError::BadCoordinate(line, e))?;
            markers.push(RoadMarker {
                road_id: row.road_id,
                mileage_label: row.mileage_label,
                position,
            });
        }

        Ok(Self { markers })
    }

    /// Number of markers in the index.
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Find the marker nearest to `query` by great-circle distance.
    ///
    /// Linear scan with a strict `<` comparison, so ties resolve to the
    /// first marker in source order.
    pub fn nearest(&self, query: &GeoCoordinate) -> Result<NearestMarker<'_>, RoadIndexError> {
        let mut best: Option<NearestMarker<'_>> = None;

        for marker in &self.markers {
            let distance_meters = query.distance_meters(&marker.position);
            let closer = match &best {
                Some(current) => distance_meters < current.distance_meters,
                None => true,
            };
            if closer {
                best = Some(NearestMarker {
                    marker,
                    distance_meters,
                });
            }
        }

        best.ok_or(RoadIndexError::EmptyIndex)
    }
}

/// Errors loading or querying the road marker index.
#[derive(Debug)]
pub enum RoadIndexError {
    /// The marker table contains no rows; no lookup can be answered.
    EmptyIndex,
    Io(String, std::io::Error),
    Csv(usize, Box<csv::Error>),
    BadCoordinate(usize, roadwatch_geo::InvalidCoordinate),
}

impl std::fmt::Display for RoadIndexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoadIndexError::EmptyIndex => write!(f, "Road marker index is empty"),
            RoadIndexError::Io(path, e) => write!(f, "Failed to read {}: {}", path, e),
            RoadIndexError::Csv(line, e) => write!(f, "Bad marker row at line {}: {}", line, e),
            RoadIndexError::BadCoordinate(line, e) => {
                write!(f, "Bad marker coordinate at line {}: {}", line, e)
            }
        }
    }
}

impl std::error::Error for RoadIndexError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RoadIndexError::Io(_, e) => Some(e),
            RoadIndexError::Csv(_, e) => Some(e.as_ref()),
            RoadIndexError::BadCoordinate(_, e) => Some(e),
            RoadIndexError::EmptyIndex => None,
        }
    }
}
