//! Local search improvement of constructed routes.
//!
//! Routes are closed tours through their depot; the only move used is the
//! 2-opt segment reversal.

use crate::error::SolverError;
use crate::instance::Instance;
use crate::solution::Route;

/// Trait for local search improvement methods
pub trait LocalSearch {
    /// Improve `route` in place. Returns whether its sequence changed.
    fn improve(&self, instance: &Instance, route: &mut Route) -> Result<bool, SolverError>;
    fn name(&self) -> &str;
}

/// 2-Opt Local Search
///
/// Each pass tries every segment `[i, j]` of the current best sequence and
/// keeps a reversal as soon as it shortens the tour, so later candidates in
/// the same pass are compared against the updated sequence. Passes repeat
/// until one makes no improvement.
pub struct TwoOptSearch {
    /// Routes with fewer stops are left untouched. Values below 2 act as 2.
    pub min_stops: usize,
}

impl TwoOptSearch {
    pub fn new() -> Self {
        TwoOptSearch { min_stops: 4 }
    }

    /// Run 2-opt to a local optimum and return the resulting sequence.
    pub fn optimize_sequence(&self, instance: &Instance, depot: usize, stops: &[usize]) -> Vec<usize> {
        let n = stops.len();
        let mut best = stops.to_vec();
        if n < self.min_stops.max(2) {
            return best;
        }

        let mut improved = true;
        let mut passes = 0;
        while improved {
            improved = false;
            passes += 1;
            let mut best_distance = instance.tour_length(depot, &best);

            for i in 0..n - 1 {
                for j in i + 1..n {
                    let mut candidate = best.clone();
                    candidate[i..=j].reverse();

                    let distance = instance.tour_length(depot, &candidate);
                    if distance < best_distance {
                        best_distance = distance;
                        best = candidate;
                        improved = true;
                    }
                }
            }
        }

        log::trace!("2-opt converged after {} passes on {} stops", passes, n);
        best
    }
}

impl Default for TwoOptSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalSearch for TwoOptSearch {
    fn improve(&self, instance: &Instance, route: &mut Route) -> Result<bool, SolverError> {
        if route.stops.len() < self.min_stops {
            return Ok(false);
        }

        let sequence = self.optimize_sequence(instance, route.depot, &route.stops);
        if sequence == route.stops {
            return Ok(false);
        }

        let before = route.distance;
        route.set_stops(instance, sequence)?;
        log::debug!("{}: {:.3} km -> {:.3} km", route.id, before, route.distance);
        Ok(true)
    }

    fn name(&self) -> &str {
        "2-Opt"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::{DemandPoint, Depot, Vehicle};
    use chrono::{TimeZone, Utc};

    fn create_test_instance() -> Instance {
        Instance::new(
            vec![Depot::new("W1", 0.0, 0.0)],
            vec![
                DemandPoint::new("A", 0.0, 1.0, 1.0),
                DemandPoint::new("B", 1.0, 1.0, 1.0),
                DemandPoint::new("C", 1.0, 2.0, 1.0),
                DemandPoint::new("D", 0.0, 2.0, 1.0),
                DemandPoint::new("E", 0.5, 3.0, 1.0),
            ],
            vec![Vehicle::new("T1", 100.0, "W1", 40.0)],
        )
        .unwrap()
    }

    fn route(instance: &Instance, stops: Vec<usize>) -> Route {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Route::new(instance, "route_1".to_string(), 0, stops, created).unwrap()
    }

    #[test]
    fn test_removes_crossing() {
        let instance = create_test_instance();
        let mut r = route(&instance, vec![0, 2, 1, 3]);
        let before = r.distance;

        let changed = TwoOptSearch::new().improve(&instance, &mut r).unwrap();

        assert!(changed);
        assert!(r.distance < before);
        let mut stops = r.stops.clone();
        stops.sort_unstable();
        assert_eq!(stops, vec![0, 1, 2, 3]);
        assert!((r.distance - instance.tour_length(0, &r.stops)).abs() < 1e-9);
        assert!((r.estimated_time - r.distance / 40.0).abs() < 1e-12);
    }

    #[test]
    fn test_never_worsens() {
        let instance = create_test_instance();
        let orders = vec![
            vec![0, 1, 2, 3, 4],
            vec![4, 3, 2, 1, 0],
            vec![2, 0, 4, 1, 3],
            vec![1, 4, 0, 3, 2],
        ];
        for order in orders {
            let mut r = route(&instance, order);
            let before = r.distance;
            TwoOptSearch::new().improve(&instance, &mut r).unwrap();
            assert!(r.distance <= before);
        }
    }

    #[test]
    fn test_short_routes_unchanged() {
        let instance = create_test_instance();
        let mut r = route(&instance, vec![2, 0, 1]);
        let original = r.clone();

        let changed = TwoOptSearch::new().improve(&instance, &mut r).unwrap();

        assert!(!changed);
        assert_eq!(r, original);
    }

    #[test]
    fn test_low_min_stops_on_tiny_routes() {
        let instance = create_test_instance();
        let search = TwoOptSearch { min_stops: 0 };
        assert!(search.optimize_sequence(&instance, 0, &[]).is_empty());
        assert_eq!(search.optimize_sequence(&instance, 0, &[3]), vec![3]);

        let mut r = route(&instance, vec![]);
        assert!(!search.improve(&instance, &mut r).unwrap());
    }

    #[test]
    fn test_idempotent() {
        let instance = create_test_instance();
        let mut r = route(&instance, vec![2, 0, 4, 1, 3]);
        let search = TwoOptSearch::new();

        search.improve(&instance, &mut r).unwrap();
        let first = r.clone();
        let changed = search.improve(&instance, &mut r).unwrap();

        assert!(!changed);
        assert_eq!(r, first);
    }
}
