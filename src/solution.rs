//! Solution representation for the MDVRP.
//!
//! A [`Route`] is the closed tour of one vehicle out of its home depot. Its
//! visit sequence and metrics are only ever replaced together, through
//! [`Route::new`] or [`Route::set_stops`]. [`SolutionOutput`] is the
//! serialized form written by the command-line tool.

use crate::error::SolverError;
use crate::instance::{Instance, Vehicle};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Hours needed by `vehicle` to drive `distance` km.
pub fn travel_time(vehicle: &Vehicle, distance: f64) -> Result<f64, SolverError> {
    if !vehicle.speed.is_finite() || vehicle.speed <= 0.0 {
        return Err(SolverError::InvalidSpeed {
            vehicle: vehicle.id.clone(),
            speed: vehicle.speed,
        });
    }
    Ok(distance / vehicle.speed)
}

/// Total distance (km) and travel time (h) of the closed tour
/// `depot -> stops... -> depot` driven by `vehicle`.
pub fn route_metrics(
    instance: &Instance,
    depot: usize,
    vehicle: usize,
    stops: &[usize],
) -> Result<(f64, f64), SolverError> {
    let distance = instance.tour_length(depot, stops);
    let time = travel_time(&instance.vehicles()[vehicle], distance)?;
    Ok((distance, time))
}

/// One vehicle's delivery tour.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub id: String,
    /// Depot index
    pub depot: usize,
    /// Vehicle index
    pub vehicle: usize,
    /// Visit order as demand point indices
    pub stops: Vec<usize>,
    /// Closed tour length in km
    pub distance: f64,
    /// Travel time in hours
    pub estimated_time: f64,
    pub created: DateTime<Utc>,
}

impl Route {
    pub fn new(
        instance: &Instance,
        id: String,
        vehicle: usize,
        stops: Vec<usize>,
        created: DateTime<Utc>,
    ) -> Result<Self, SolverError> {
        let depot = instance.vehicle_depot(vehicle);
        let (distance, estimated_time) = route_metrics(instance, depot, vehicle, &stops)?;
        Ok(Route { id, depot, vehicle, stops, distance, estimated_time, created })
    }

    /// Replace the visit sequence and recompute distance and time.
    pub fn set_stops(&mut self, instance: &Instance, stops: Vec<usize>) -> Result<(), SolverError> {
        let (distance, estimated_time) = route_metrics(instance, self.depot, self.vehicle, &stops)?;
        self.stops = stops;
        self.distance = distance;
        self.estimated_time = estimated_time;
        Ok(())
    }

    /// Summed demand of the visited points.
    pub fn load(&self, instance: &Instance) -> f64 {
        instance.total_demand(&self.stops)
    }

    /// Whether the load exceeds the vehicle's capacity (forced leftovers).
    pub fn is_over_capacity(&self, instance: &Instance) -> bool {
        self.load(instance) > instance.vehicles()[self.vehicle].capacity
    }

    pub fn to_record(&self, instance: &Instance) -> RouteRecord {
        let load = self.load(instance);
        let capacity = instance.vehicles()[self.vehicle].capacity;
        RouteRecord {
            id: self.id.clone(),
            depot_id: instance.depots()[self.depot].id.clone(),
            vehicle_id: instance.vehicles()[self.vehicle].id.clone(),
            stops: self.stops.iter().map(|&p| instance.points()[p].id.clone()).collect(),
            distance: self.distance,
            estimated_time: self.estimated_time,
            created: self.created,
            load,
            capacity,
            over_capacity: load > capacity,
        }
    }
}

/// Represents a solution to the MDVRP
#[derive(Debug, Clone, Default)]
pub struct Solution {
    pub routes: Vec<Route>,
    /// Points whose nearest depot has no vehicle
    pub unserved: Vec<usize>,
    /// Algorithm that generated this solution
    pub algorithm: String,
    /// Computation time in seconds
    pub computation_time: f64,
    /// Improvement rounds actually run
    pub iterations: usize,
}

impl Solution {
    pub fn total_distance(&self) -> f64 {
        self.routes.iter().map(|r| r.distance).sum()
    }

    pub fn total_time(&self) -> f64 {
        self.routes.iter().map(|r| r.estimated_time).sum()
    }

    /// Routes loaded beyond their vehicle's capacity.
    pub fn over_capacity_routes<'a>(&'a self, instance: &Instance) -> Vec<&'a Route> {
        self.routes.iter().filter(|r| r.is_over_capacity(instance)).collect()
    }

    /// Check that every demand point appears exactly once across routes and
    /// the unserved list.
    pub fn is_complete(&self, instance: &Instance) -> bool {
        let mut seen = HashSet::new();
        let all = self
            .routes
            .iter()
            .flat_map(|r| r.stops.iter())
            .chain(self.unserved.iter());
        for &point in all {
            if point >= instance.points().len() || !seen.insert(point) {
                return false;
            }
        }
        seen.len() == instance.points().len()
    }

    pub fn to_output(&self, instance: &Instance) -> SolutionOutput {
        SolutionOutput {
            routes: self.routes.iter().map(|r| r.to_record(instance)).collect(),
            unserved: self.unserved.iter().map(|&p| instance.points()[p].id.clone()).collect(),
        }
    }

    /// Write the solution as pretty-printed JSON.
    pub fn save_json<P: AsRef<Path>>(&self, instance: &Instance, path: P) -> Result<(), SolverError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(&self.to_output(instance))?;
        fs::write(path, json).map_err(|source| SolverError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}

impl std::fmt::Display for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Solution ({})", self.algorithm)?;
        writeln!(f, "  Routes: {}", self.routes.len())?;
        writeln!(f, "  Distance: {:.2} km", self.total_distance())?;
        writeln!(f, "  Travel time: {:.2} h", self.total_time())?;
        writeln!(f, "  Unserved points: {}", self.unserved.len())?;
        writeln!(f, "  Rounds: {}", self.iterations)?;
        writeln!(f, "  Time: {:.4}s", self.computation_time)
    }
}

/// Serialized route, as written to the output document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRecord {
    pub id: String,
    #[serde(rename = "warehouseId")]
    pub depot_id: String,
    #[serde(rename = "truckId")]
    pub vehicle_id: String,
    #[serde(rename = "stores")]
    pub stops: Vec<String>,
    pub distance: f64,
    pub estimated_time: f64,
    pub created: DateTime<Utc>,
    pub load: f64,
    pub capacity: f64,
    pub over_capacity: bool,
}

/// Output document: `{"routes": [...], "unserved": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionOutput {
    pub routes: Vec<RouteRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unserved: Vec<String>,
}
