//! Summary statistics and CSV export for solved instances.

use crate::error::SolverError;
use crate::instance::Instance;
use crate::solution::Solution;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// One CSV row per route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteSummary {
    pub route: String,
    pub depot: String,
    pub vehicle: String,
    pub num_stops: usize,
    /// Stop identifiers joined with `;`
    pub sequence: String,
    pub distance_km: f64,
    pub time_h: f64,
    pub load: f64,
    pub capacity: f64,
    pub over_capacity: bool,
}

/// Aggregated statistics for a solution
#[derive(Debug, Clone)]
pub struct SolutionStatistics {
    pub algorithm: String,
    pub num_routes: usize,
    pub num_stops: usize,
    pub num_unserved: usize,
    pub num_over_capacity: usize,
    pub total_distance: f64,
    pub total_time: f64,
    pub avg_distance: f64,
    pub max_distance: f64,
    /// Load / capacity over all routes, capped routes included
    pub utilization: f64,
    pub computation_time: f64,
}

impl SolutionStatistics {
    pub fn new(instance: &Instance, solution: &Solution) -> Self {
        let num_routes = solution.routes.len();
        let total_distance = solution.total_distance();
        let max_distance = solution.routes.iter().map(|r| r.distance).fold(0.0, f64::max);

        let total_load: f64 = solution.routes.iter().map(|r| r.load(instance)).sum();
        let total_capacity: f64 = solution
            .routes
            .iter()
            .map(|r| instance.vehicles()[r.vehicle].capacity)
            .sum();

        SolutionStatistics {
            algorithm: solution.algorithm.clone(),
            num_routes,
            num_stops: solution.routes.iter().map(|r| r.stops.len()).sum(),
            num_unserved: solution.unserved.len(),
            num_over_capacity: solution.over_capacity_routes(instance).len(),
            total_distance,
            total_time: solution.total_time(),
            avg_distance: if num_routes > 0 { total_distance / num_routes as f64 } else { 0.0 },
            max_distance,
            utilization: if total_capacity > 0.0 { total_load / total_capacity } else { 0.0 },
            computation_time: solution.computation_time,
        }
    }
}

impl std::fmt::Display for SolutionStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Algorithm: {}", self.algorithm)?;
        writeln!(f, "  Routes: {} ({} stops)", self.num_routes, self.num_stops)?;
        writeln!(f, "  Total distance: {:.2} km", self.total_distance)?;
        writeln!(f, "  Total travel time: {:.2} h", self.total_time)?;
        writeln!(f, "  Avg / max route: {:.2} / {:.2} km", self.avg_distance, self.max_distance)?;
        writeln!(f, "  Capacity utilization: {:.1}%", self.utilization * 100.0)?;
        writeln!(f, "  Over-capacity routes: {}", self.num_over_capacity)?;
        writeln!(f, "  Unserved points: {}", self.num_unserved)?;
        writeln!(f, "  Time: {:.4}s", self.computation_time)
    }
}

/// Per-route summaries in route order.
pub fn route_summaries(instance: &Instance, solution: &Solution) -> Vec<RouteSummary> {
    solution
        .routes
        .iter()
        .map(|route| {
            let record = route.to_record(instance);
            RouteSummary {
                route: record.id,
                depot: record.depot_id,
                vehicle: record.vehicle_id,
                num_stops: record.stops.len(),
                sequence: record.stops.join(";"),
                distance_km: record.distance,
                time_h: record.estimated_time,
                load: record.load,
                capacity: record.capacity,
                over_capacity: record.over_capacity,
            }
        })
        .collect()
}

/// Export per-route summaries to CSV
pub fn export_routes_csv<P: AsRef<Path>>(
    instance: &Instance,
    solution: &Solution,
    path: P,
) -> Result<(), SolverError> {
    let path = path.as_ref();
    let io_err = |source: std::io::Error| SolverError::Io {
        path: path.display().to_string(),
        source,
    };

    let file = File::create(path).map_err(io_err)?;
    let mut writer = csv::Writer::from_writer(file);
    for row in route_summaries(instance, solution) {
        writer.serialize(row).map_err(|e| io_err(e.into()))?;
    }
    writer.flush().map_err(io_err)?;
    Ok(())
}
