//! Great-circle distance model.
//!
//! All depots and demand points are mapped to dense node indices (depots
//! first, then demand points, both in input order) and every pairwise
//! haversine distance is computed once into a flat matrix.

use crate::error::SolverError;
use crate::instance::Location;
use std::collections::HashMap;

/// Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two locations in kilometers.
pub fn haversine_km(from: Location, to: Location) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let delta_lat = (to.lat - from.lat).to_radians();
    let delta_lng = (to.lng - from.lng).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Precomputed distances between every pair of locations.
#[derive(Debug, Clone, Default)]
pub struct DistanceMatrix {
    size: usize,
    data: Vec<f64>,
    index: HashMap<String, usize>,
}

impl DistanceMatrix {
    /// Build the matrix for `(id, location)` pairs. The node index of each
    /// entry is its position in `locations`.
    pub fn new(locations: &[(&str, Location)]) -> Result<Self, SolverError> {
        let size = locations.len();
        let mut index = HashMap::with_capacity(size);

        for (i, (id, location)) in locations.iter().enumerate() {
            if !location.is_valid() {
                return Err(SolverError::InvalidLocation {
                    id: id.to_string(),
                    lat: location.lat,
                    lng: location.lng,
                });
            }
            if id.is_empty() || index.insert(id.to_string(), i).is_some() {
                return Err(SolverError::DuplicateId(id.to_string()));
            }
        }

        let mut data = vec![0.0; size * size];
        for i in 0..size {
            for j in i + 1..size {
                let km = haversine_km(locations[i].1, locations[j].1);
                data[i * size + j] = km;
                data[j * size + i] = km;
            }
        }

        Ok(DistanceMatrix { size, data, index })
    }

    /// Number of locations in the model.
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Distance between two node indices.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.size + j]
    }

    /// Node index of a location identifier.
    pub fn node(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Distance between two locations by identifier.
    pub fn distance(&self, a: &str, b: &str) -> Result<f64, SolverError> {
        let i = self.node(a).ok_or_else(|| SolverError::UnknownLocation(a.to_string()))?;
        let j = self.node(b).ok_or_else(|| SolverError::UnknownLocation(b.to_string()))?;
        Ok(self.get(i, j))
    }
}
