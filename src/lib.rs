//! MDVRP Solver Library
//!
//! A solver for the Multi-Depot Vehicle Routing Problem: demand points are
//! served by capacity-limited vehicles anchored to depots, minimizing the
//! total great-circle travel distance.
//!
//! # Pipeline
//!
//! - Haversine distance matrix over all depots and demand points
//! - Nearest-depot assignment of demand points
//! - Per-depot capacity packing (largest demand first) with nearest neighbor sequencing
//! - 2-opt improvement of every route
//!
//! # Example
//!
//! ```no_run
//! use mdvrp_solver::instance::Instance;
//! use mdvrp_solver::solver::{MdvrpSolver, SolveOptions, SystemClock};
//!
//! let instance = Instance::from_file("input.json").unwrap();
//! let solver = MdvrpSolver::new(SolveOptions::default());
//! let solution = solver.solve(&instance, &SystemClock).unwrap();
//!
//! println!("Total distance: {:.2} km", solution.total_distance());
//! solution.save_json(&instance, "output.json").unwrap();
//! ```

pub mod error;
pub mod distance;
pub mod instance;
pub mod solution;
pub mod heuristics;
pub mod solver;
pub mod report;
pub mod visualization;

pub use error::SolverError;
pub use instance::Instance;
pub use solution::Solution;
pub use solver::{solve, MdvrpSolver, SolveOptions};
