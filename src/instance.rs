//! Module for loading and representing MDVRP instances.
//!
//! An instance is read from a JSON document holding three ordered
//! collections (depots, demand points, vehicles). It is validated at load
//! time and owns the precomputed distance matrix used by every later stage.

use crate::distance::DistanceMatrix;
use crate::error::SolverError;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Location {
    pub lat: f64,
    #[serde(alias = "lon")]
    pub lng: f64,
}

impl Location {
    pub fn new(lat: f64, lng: f64) -> Self {
        Location { lat, lng }
    }

    /// Finite and inside [-90, 90] x [-180, 180].
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// A depot (warehouse) vehicles start from and return to.
#[derive(Debug, Clone, Deserialize)]
pub struct Depot {
    pub id: String,
    pub location: Location,
}

impl Depot {
    pub fn new(id: &str, lat: f64, lng: f64) -> Self {
        Depot { id: id.to_string(), location: Location::new(lat, lng) }
    }
}

/// A demand point (store) that must be visited once.
#[derive(Debug, Clone, Deserialize)]
pub struct DemandPoint {
    pub id: String,
    pub location: Location,
    pub demand: f64,
}

impl DemandPoint {
    pub fn new(id: &str, lat: f64, lng: f64, demand: f64) -> Self {
        DemandPoint { id: id.to_string(), location: Location::new(lat, lng), demand }
    }
}

/// A vehicle (truck) anchored to a home depot.
#[derive(Debug, Clone, Deserialize)]
pub struct Vehicle {
    pub id: String,
    pub capacity: f64,
    #[serde(rename = "warehouseId", alias = "depotId")]
    pub depot_id: String,
    /// Travel speed in km/h.
    pub speed: f64,
}

impl Vehicle {
    pub fn new(id: &str, capacity: f64, depot_id: &str, speed: f64) -> Self {
        Vehicle { id: id.to_string(), capacity, depot_id: depot_id.to_string(), speed }
    }
}

/// Represents a complete, validated MDVRP instance.
///
/// The records are read-only once loaded: the distance matrix and vehicle
/// depot indices are derived from them.
#[derive(Debug, Clone, Deserialize)]
pub struct Instance {
    #[serde(rename = "warehouses", alias = "depots", default)]
    depots: Vec<Depot>,
    #[serde(rename = "stores", alias = "points", default)]
    points: Vec<DemandPoint>,
    #[serde(rename = "trucks", alias = "vehicles", default)]
    vehicles: Vec<Vehicle>,
    /// Precomputed distance matrix (depots first, then demand points)
    #[serde(skip)]
    distances: DistanceMatrix,
    /// Home depot index of each vehicle
    #[serde(skip)]
    vehicle_depots: Vec<usize>,
}

impl Instance {
    /// Build and validate an instance from already-typed records.
    pub fn new(
        depots: Vec<Depot>,
        points: Vec<DemandPoint>,
        vehicles: Vec<Vehicle>,
    ) -> Result<Self, SolverError> {
        let mut instance = Instance {
            depots,
            points,
            vehicles,
            distances: DistanceMatrix::default(),
            vehicle_depots: Vec::new(),
        };
        instance.prepare()?;
        Ok(instance)
    }

    /// Parse an instance from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, SolverError> {
        let mut instance: Instance = serde_json::from_str(json)?;
        instance.prepare()?;
        Ok(instance)
    }

    /// Parse an instance from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SolverError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| SolverError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Validate the records and compute the distance matrix.
    fn prepare(&mut self) -> Result<(), SolverError> {
        for point in &self.points {
            if !point.demand.is_finite() || point.demand < 0.0 {
                return Err(SolverError::InvalidDemand {
                    point: point.id.clone(),
                    demand: point.demand,
                });
            }
        }

        let mut vehicle_ids = HashSet::new();
        for vehicle in &self.vehicles {
            if vehicle.id.is_empty() || !vehicle_ids.insert(vehicle.id.as_str()) {
                return Err(SolverError::DuplicateId(vehicle.id.clone()));
            }
            if !vehicle.capacity.is_finite() || vehicle.capacity < 0.0 {
                return Err(SolverError::InvalidCapacity {
                    vehicle: vehicle.id.clone(),
                    capacity: vehicle.capacity,
                });
            }
            if !vehicle.speed.is_finite() || vehicle.speed <= 0.0 {
                return Err(SolverError::InvalidSpeed {
                    vehicle: vehicle.id.clone(),
                    speed: vehicle.speed,
                });
            }
        }

        if self.depots.is_empty() && !self.points.is_empty() {
            return Err(SolverError::NoDepots);
        }

        let locations: Vec<(&str, Location)> = self
            .depots
            .iter()
            .map(|d| (d.id.as_str(), d.location))
            .chain(self.points.iter().map(|p| (p.id.as_str(), p.location)))
            .collect();
        self.distances = DistanceMatrix::new(&locations)?;

        let mut vehicle_depots = Vec::with_capacity(self.vehicles.len());
        for vehicle in &self.vehicles {
            let depot = self
                .depots
                .iter()
                .position(|d| d.id == vehicle.depot_id)
                .ok_or_else(|| SolverError::UnknownDepot {
                    vehicle: vehicle.id.clone(),
                    depot: vehicle.depot_id.clone(),
                })?;
            vehicle_depots.push(depot);
        }
        self.vehicle_depots = vehicle_depots;

        Ok(())
    }

    pub fn depots(&self) -> &[Depot] {
        &self.depots
    }

    pub fn points(&self) -> &[DemandPoint] {
        &self.points
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    /// The distance model over all depots and demand points.
    pub fn distances(&self) -> &DistanceMatrix {
        &self.distances
    }

    /// Matrix node of a depot.
    #[inline]
    pub fn depot_node(&self, depot: usize) -> usize {
        depot
    }

    /// Matrix node of a demand point.
    #[inline]
    pub fn point_node(&self, point: usize) -> usize {
        self.depots.len() + point
    }

    /// Distance between a depot and a demand point.
    #[inline]
    pub fn depot_to_point(&self, depot: usize, point: usize) -> f64 {
        self.distances.get(self.depot_node(depot), self.point_node(point))
    }

    /// Distance between two demand points.
    #[inline]
    pub fn point_to_point(&self, a: usize, b: usize) -> f64 {
        self.distances.get(self.point_node(a), self.point_node(b))
    }

    /// Home depot index of a vehicle.
    pub fn vehicle_depot(&self, vehicle: usize) -> usize {
        self.vehicle_depots[vehicle]
    }

    /// Vehicles based at `depot`, in input order.
    pub fn vehicles_for_depot(&self, depot: usize) -> Vec<usize> {
        (0..self.vehicles.len())
            .filter(|&v| self.vehicle_depots[v] == depot)
            .collect()
    }

    /// Length of the closed tour from `depot` through `stops` (point indices).
    pub fn tour_length(&self, depot: usize, stops: &[usize]) -> f64 {
        let (first, last) = match (stops.first(), stops.last()) {
            (Some(&first), Some(&last)) => (first, last),
            _ => return 0.0,
        };

        let mut length = self.depot_to_point(depot, first);
        for pair in stops.windows(2) {
            length += self.point_to_point(pair[0], pair[1]);
        }
        length + self.depot_to_point(depot, last)
    }

    /// Summed demand of a set of points.
    pub fn total_demand(&self, stops: &[usize]) -> f64 {
        stops.iter().map(|&p| self.points[p].demand).sum()
    }

    /// Get statistics about the instance
    pub fn statistics(&self) -> InstanceStatistics {
        let total_demand: f64 = self.points.iter().map(|p| p.demand).sum();
        let total_capacity: f64 = self.vehicles.iter().map(|v| v.capacity).sum();

        let n = self.distances.len();
        let mut max_distance: f64 = 0.0;
        for i in 0..n {
            for j in i + 1..n {
                max_distance = max_distance.max(self.distances.get(i, j));
            }
        }

        InstanceStatistics {
            num_depots: self.depots.len(),
            num_points: self.points.len(),
            num_vehicles: self.vehicles.len(),
            total_demand,
            total_capacity,
            max_distance,
        }
    }
}

/// Statistics about an MDVRP instance
#[derive(Debug, Clone)]
pub struct InstanceStatistics {
    pub num_depots: usize,
    pub num_points: usize,
    pub num_vehicles: usize,
    pub total_demand: f64,
    pub total_capacity: f64,
    pub max_distance: f64,
}

impl std::fmt::Display for InstanceStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Instance")?;
        writeln!(f, "  Depots: {}", self.num_depots)?;
        writeln!(f, "  Demand points: {}", self.num_points)?;
        writeln!(f, "  Vehicles: {}", self.num_vehicles)?;
        writeln!(f, "  Total demand: {:.2}", self.total_demand)?;
        writeln!(f, "  Total capacity: {:.2}", self.total_capacity)?;
        writeln!(f, "  Max distance: {:.2} km", self.max_distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "warehouses": [{"id": "W1", "location": {"lat": 0.0, "lng": 0.0}}],
        "stores": [
            {"id": "S1", "location": {"lat": 0.0, "lng": 1.0}, "demand": 10},
            {"id": "S2", "location": {"lat": 0.0, "lon": 2.0}, "demand": 5.5}
        ],
        "trucks": [{"id": "T1", "capacity": 100, "warehouseId": "W1", "speed": 50}]
    }"#;

    #[test]
    fn test_parse_original_field_names() {
        let instance = Instance::from_json_str(SAMPLE).unwrap();
        assert_eq!(instance.depots().len(), 1);
        assert_eq!(instance.points().len(), 2);
        assert_eq!(instance.points()[1].location.lng, 2.0);
        assert_eq!(instance.vehicles()[0].depot_id, "W1");
        assert_eq!(instance.distances().len(), 3);
        assert_eq!(instance.vehicles_for_depot(0), vec![0]);
    }

    #[test]
    fn test_parse_aliases() {
        let json = r#"{
            "depots": [{"id": "D", "location": {"lat": 1.0, "lng": 1.0}}],
            "points": [],
            "vehicles": [{"id": "V", "capacity": 1, "depotId": "D", "speed": 10}]
        }"#;
        let instance = Instance::from_json_str(json).unwrap();
        assert_eq!(instance.vehicle_depot(0), 0);
    }

    #[test]
    fn test_missing_field_is_parse_error() {
        let json = r#"{"stores": [{"id": "S1", "location": {"lat": 0.0, "lng": 1.0}}]}"#;
        assert!(matches!(Instance::from_json_str(json), Err(SolverError::Parse(_))));
    }

    #[test]
    fn test_non_positive_speed_rejected() {
        let result = Instance::new(
            vec![Depot::new("W1", 0.0, 0.0)],
            vec![],
            vec![Vehicle::new("T1", 10.0, "W1", 0.0)],
        );
        assert!(matches!(result, Err(SolverError::InvalidSpeed { .. })));
    }

    #[test]
    fn test_unknown_depot_rejected() {
        let result = Instance::new(
            vec![Depot::new("W1", 0.0, 0.0)],
            vec![],
            vec![Vehicle::new("T1", 10.0, "W2", 40.0)],
        );
        assert!(matches!(result, Err(SolverError::UnknownDepot { .. })));
    }

    #[test]
    fn test_negative_demand_rejected() {
        let result = Instance::new(
            vec![Depot::new("W1", 0.0, 0.0)],
            vec![DemandPoint::new("S1", 0.0, 1.0, -1.0)],
            vec![],
        );
        assert!(matches!(result, Err(SolverError::InvalidDemand { .. })));
    }

    #[test]
    fn test_out_of_range_latitude_rejected() {
        let result = Instance::new(
            vec![Depot::new("W1", 91.0, 0.0)],
            vec![],
            vec![],
        );
        assert!(matches!(result, Err(SolverError::InvalidLocation { .. })));
    }

    #[test]
    fn test_points_without_depots_rejected() {
        let result = Instance::new(vec![], vec![DemandPoint::new("S1", 0.0, 1.0, 1.0)], vec![]);
        assert!(matches!(result, Err(SolverError::NoDepots)));
    }

    #[test]
    fn test_id_shared_by_depot_and_point_rejected() {
        let result = Instance::new(
            vec![Depot::new("X", 0.0, 0.0)],
            vec![DemandPoint::new("X", 0.0, 1.0, 1.0)],
            vec![],
        );
        assert!(matches!(result, Err(SolverError::DuplicateId(_))));
    }

    #[test]
    fn test_records_match_derived_indices() {
        let instance = Instance::new(
            vec![Depot::new("W1", 0.0, 0.0), Depot::new("W2", 1.0, 1.0)],
            vec![
                DemandPoint::new("S1", 0.0, 1.0, 1.0),
                DemandPoint::new("S2", 1.0, 2.0, 1.0),
            ],
            vec![Vehicle::new("T1", 5.0, "W2", 40.0), Vehicle::new("T2", 5.0, "W1", 40.0)],
        )
        .unwrap();

        let depots = instance.depots();
        let points = instance.points();
        assert_eq!(instance.distances().len(), depots.len() + points.len());
        for (p, point) in points.iter().enumerate() {
            assert_eq!(instance.distances().node(&point.id), Some(instance.point_node(p)));
        }
        for (v, vehicle) in instance.vehicles().iter().enumerate() {
            assert_eq!(depots[instance.vehicle_depot(v)].id, vehicle.depot_id);
        }
    }

    #[test]
    fn test_statistics() {
        let instance = Instance::from_json_str(SAMPLE).unwrap();
        let stats = instance.statistics();
        assert_eq!(stats.num_points, 2);
        assert!((stats.total_demand - 15.5).abs() < 1e-12);
        assert!((stats.total_capacity - 100.0).abs() < 1e-12);
        assert!(stats.max_distance > 200.0);
    }
}
