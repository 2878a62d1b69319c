//! Route construction for a single depot.
//!
//! Points assigned to a depot are packed onto its vehicles by descending
//! demand, then each vehicle's points are sequenced with the nearest
//! neighbor rule starting from the depot.

use crate::error::SolverError;
use crate::instance::Instance;
use crate::solution::Route;
use chrono::{DateTime, Utc};
use ordered_float::OrderedFloat;
use std::cmp::Reverse;

pub trait ConstructionHeuristic {
    /// Build routes for `depot` from its `assigned` points and its
    /// `vehicles` (both as indices, in input order). Routes are numbered
    /// `route_<route_offset + 1>` onwards.
    fn construct(
        &self,
        instance: &Instance,
        depot: usize,
        assigned: &[usize],
        vehicles: &[usize],
        route_offset: usize,
        created: DateTime<Utc>,
    ) -> Result<Vec<Route>, SolverError>;

    fn name(&self) -> &str;
}

/// Order `pool` by repeatedly moving to the nearest unvisited point,
/// starting from matrix node `from`. Ties go to the earliest point in `pool`.
pub fn nearest_neighbor_order(instance: &Instance, from: usize, pool: &[usize]) -> Vec<usize> {
    let distances = instance.distances();
    let mut unvisited = pool.to_vec();
    let mut tour = Vec::with_capacity(pool.len());
    let mut current = from;

    while let Some(pos) = unvisited
        .iter()
        .enumerate()
        .min_by_key(|&(_, &p)| OrderedFloat(distances.get(current, instance.point_node(p))))
        .map(|(pos, _)| pos)
    {
        let next = unvisited.remove(pos);
        tour.push(next);
        current = instance.point_node(next);
    }

    tour
}

/// Greedy capacity packing followed by nearest neighbor sequencing.
///
/// Vehicles are filled in order, each scanning the remaining points (sorted
/// by demand, largest first) once and claiming every point that still fits.
/// Points no vehicle has room for are sequenced from the depot on their own
/// and appended to the first vehicle's route, which then exceeds that
/// vehicle's capacity. If the first vehicle claimed nothing, that tail becomes
/// its route, numbered after the others.
pub struct GreedyPackingConstruction;

impl GreedyPackingConstruction {
    pub fn new() -> Self {
        GreedyPackingConstruction
    }

    /// Split the sorted pool into per-vehicle claims plus the leftovers.
    fn pack(
        &self,
        instance: &Instance,
        sorted: &[usize],
        vehicles: &[usize],
    ) -> (Vec<(usize, Vec<usize>)>, Vec<usize>) {
        let mut claimed = vec![false; sorted.len()];
        let mut loads = Vec::new();

        for &vehicle in vehicles {
            let capacity = instance.vehicles()[vehicle].capacity;
            let mut load = 0.0;
            let mut picked = Vec::new();

            for (k, &point) in sorted.iter().enumerate() {
                if claimed[k] {
                    continue;
                }
                let demand = instance.points()[point].demand;
                if load + demand <= capacity {
                    load += demand;
                    picked.push(point);
                    claimed[k] = true;
                }
            }

            if !picked.is_empty() {
                loads.push((vehicle, picked));
            }
        }

        let leftovers = sorted
            .iter()
            .zip(&claimed)
            .filter(|&(_, &taken)| !taken)
            .map(|(&point, _)| point)
            .collect();

        (loads, leftovers)
    }
}

impl Default for GreedyPackingConstruction {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstructionHeuristic for GreedyPackingConstruction {
    fn construct(
        &self,
        instance: &Instance,
        depot: usize,
        assigned: &[usize],
        vehicles: &[usize],
        route_offset: usize,
        created: DateTime<Utc>,
    ) -> Result<Vec<Route>, SolverError> {
        if assigned.is_empty() || vehicles.is_empty() {
            return Ok(Vec::new());
        }

        let mut sorted = assigned.to_vec();
        // Stable: equal demands keep their input order
        sorted.sort_by_key(|&p| Reverse(OrderedFloat(instance.points()[p].demand)));

        let (loads, leftovers) = self.pack(instance, &sorted, vehicles);
        let depot_node = instance.depot_node(depot);

        let mut sequences: Vec<(usize, Vec<usize>)> = loads
            .into_iter()
            .map(|(vehicle, picked)| (vehicle, nearest_neighbor_order(instance, depot_node, &picked)))
            .collect();

        if !leftovers.is_empty() {
            let first = vehicles[0];
            log::warn!(
                "Depot {}: {} points exceed fleet capacity, appending to vehicle {}",
                instance.depots()[depot].id,
                leftovers.len(),
                instance.vehicles()[first].id
            );

            let tail = nearest_neighbor_order(instance, depot_node, &leftovers);
            match sequences.iter_mut().find(|(vehicle, _)| *vehicle == first) {
                Some((_, stops)) => stops.extend(tail),
                None => sequences.push((first, tail)),
            }
        }

        sequences
            .into_iter()
            .enumerate()
            .map(|(k, (vehicle, stops))| {
                let id = format!("route_{}", route_offset + k + 1);
                Route::new(instance, id, vehicle, stops, created)
            })
            .collect()
    }

    fn name(&self) -> &str {
        "GreedyPacking"
    }
}
