//! End-to-end MDVRP solve: assignment, construction, then 2-opt rounds.

use crate::error::SolverError;
use crate::heuristics::assignment::assign_to_nearest_depot;
use crate::heuristics::construction::{ConstructionHeuristic, GreedyPackingConstruction};
use crate::heuristics::local_search::{LocalSearch, TwoOptSearch};
use crate::instance::{DemandPoint, Depot, Instance, Vehicle};
use crate::solution::{Route, Solution, SolutionOutput};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use std::time::Instant;

/// Source of route creation timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Solver configuration
#[derive(Debug, Clone)]
pub struct SolveOptions {
    /// Maximum number of improvement rounds over all routes
    pub iterations: usize,
    /// Optimize routes on the rayon thread pool
    pub parallel: bool,
    /// Stop as soon as a round leaves every route unchanged
    pub early_exit: bool,
}

impl Default for SolveOptions {
    fn default() -> Self {
        SolveOptions {
            iterations: 100,
            parallel: true,
            early_exit: true,
        }
    }
}

/// Greedy construction followed by 2-opt improvement.
pub struct MdvrpSolver {
    pub options: SolveOptions,
    construction: GreedyPackingConstruction,
    search: TwoOptSearch,
}

impl MdvrpSolver {
    pub fn new(options: SolveOptions) -> Self {
        MdvrpSolver {
            options,
            construction: GreedyPackingConstruction::new(),
            search: TwoOptSearch::new(),
        }
    }

    pub fn name(&self) -> String {
        format!("{}+{}", self.construction.name(), self.search.name())
    }

    /// Solve a validated instance. Every route is stamped with one instant
    /// taken from `clock` when the solve starts.
    pub fn solve(&self, instance: &Instance, clock: &dyn Clock) -> Result<Solution, SolverError> {
        let start = Instant::now();
        let created = clock.now();

        let assignments = assign_to_nearest_depot(instance);

        let mut routes: Vec<Route> = Vec::new();
        let mut unserved = Vec::new();
        for (depot, assigned) in assignments.iter().enumerate() {
            if assigned.is_empty() {
                continue;
            }
            let vehicles = instance.vehicles_for_depot(depot);
            if vehicles.is_empty() {
                log::warn!(
                    "Depot {} has {} assigned points but no vehicles",
                    instance.depots()[depot].id,
                    assigned.len()
                );
                unserved.extend_from_slice(assigned);
                continue;
            }

            let built = self.construction.construct(
                instance,
                depot,
                assigned,
                &vehicles,
                routes.len(),
                created,
            )?;
            routes.extend(built);
        }

        log::info!(
            "Constructed {} routes, {:.2} km",
            routes.len(),
            routes.iter().map(|r| r.distance).sum::<f64>()
        );

        let mut rounds = 0;
        for _ in 0..self.options.iterations {
            rounds += 1;
            let changed = self.improve_round(instance, &mut routes)?;
            if !changed && self.options.early_exit {
                break;
            }
        }

        let solution = Solution {
            routes,
            unserved,
            algorithm: self.name(),
            computation_time: start.elapsed().as_secs_f64(),
            iterations: rounds,
        };

        log::info!(
            "Optimized {} routes in {} rounds, {:.2} km",
            solution.routes.len(),
            rounds,
            solution.total_distance()
        );

        Ok(solution)
    }

    /// Apply the local search once to every route. Returns whether any
    /// route changed.
    fn improve_round(&self, instance: &Instance, routes: &mut [Route]) -> Result<bool, SolverError> {
        let changed: Vec<bool> = if self.options.parallel {
            routes
                .par_iter_mut()
                .map(|route| self.search.improve(instance, route))
                .collect::<Result<_, _>>()?
        } else {
            routes
                .iter_mut()
                .map(|route| self.search.improve(instance, route))
                .collect::<Result<_, _>>()?
        };
        Ok(changed.into_iter().any(|c| c))
    }
}

impl Default for MdvrpSolver {
    fn default() -> Self {
        Self::new(SolveOptions::default())
    }
}

/// Solve from typed input records and return the typed output records.
pub fn solve(
    depots: Vec<Depot>,
    points: Vec<DemandPoint>,
    vehicles: Vec<Vehicle>,
    iterations: usize,
) -> Result<SolutionOutput, SolverError> {
    let instance = Instance::new(depots, points, vehicles)?;
    let options = SolveOptions { iterations, ..Default::default() };
    let solution = MdvrpSolver::new(options).solve(&instance, &SystemClock)?;
    Ok(solution.to_output(&instance))
}
