//! Heuristics module for the MDVRP.
//! 
//! This module exports the assignment, construction and improvement heuristics.

pub mod assignment;
pub mod construction;
pub mod local_search;

pub use assignment::*;
pub use construction::*;
pub use local_search::*;
