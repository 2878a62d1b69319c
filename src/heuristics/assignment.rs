//! Nearest-depot assignment of demand points.

use crate::instance::Instance;
use ordered_float::OrderedFloat;

/// Assigns every demand point to its nearest depot.
///
/// Returns one list per depot (indexed like `instance.depots()`) holding point
/// indices in input order. When several depots are equally near, the first
/// one in depot order wins.
pub fn assign_to_nearest_depot(instance: &Instance) -> Vec<Vec<usize>> {
    let mut assignments = vec![Vec::new(); instance.depots().len()];

    for point in 0..instance.points().len() {
        // min_by_key keeps the first of equal minima
        let nearest = (0..instance.depots().len())
            .min_by_key(|&depot| OrderedFloat(instance.depot_to_point(depot, point)));

        if let Some(depot) = nearest {
            assignments[depot].push(point);
        }
    }

    for (depot, points) in assignments.iter().enumerate() {
        log::debug!("Depot {} assigned {} points", instance.depots()[depot].id, points.len());
    }

    assignments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::{DemandPoint, Depot};

    #[test]
    fn test_points_go_to_nearest_depot() {
        let instance = Instance::new(
            vec![Depot::new("W", 0.0, 0.0), Depot::new("E", 0.0, 10.0)],
            vec![
                DemandPoint::new("A", 0.0, 1.0, 1.0),
                DemandPoint::new("B", 0.0, 9.0, 1.0),
                DemandPoint::new("C", 0.5, 2.0, 1.0),
            ],
            vec![],
        )
        .unwrap();

        let assignments = assign_to_nearest_depot(&instance);
        assert_eq!(assignments, vec![vec![0, 2], vec![1]]);
    }

    #[test]
    fn test_tie_goes_to_first_depot() {
        let instance = Instance::new(
            vec![Depot::new("W", 0.0, -1.0), Depot::new("E", 0.0, 1.0)],
            vec![DemandPoint::new("M", 0.0, 0.0, 1.0)],
            vec![],
        )
        .unwrap();
        assert_eq!(assign_to_nearest_depot(&instance), vec![vec![0], vec![]]);

        let swapped = Instance::new(
            vec![Depot::new("E", 0.0, 1.0), Depot::new("W", 0.0, -1.0)],
            vec![DemandPoint::new("M", 0.0, 0.0, 1.0)],
            vec![],
        )
        .unwrap();
        assert_eq!(assign_to_nearest_depot(&swapped), vec![vec![0], vec![]]);
    }

    #[test]
    fn test_every_point_assigned_once() {
        let depots = vec![
            Depot::new("D1", 10.0, 10.0),
            Depot::new("D2", -10.0, 20.0),
            Depot::new("D3", 30.0, -5.0),
        ];
        let points: Vec<DemandPoint> = (0..40)
            .map(|i| {
                let f = i as f64;
                DemandPoint::new(&format!("P{}", i), (f * 7.3) % 60.0 - 30.0, (f * 11.9) % 80.0 - 40.0, 1.0)
            })
            .collect();
        let instance = Instance::new(depots, points, vec![]).unwrap();

        let assignments = assign_to_nearest_depot(&instance);
        let mut all: Vec<usize> = assignments.into_iter().flatten().collect();
        all.sort_unstable();
        assert_eq!(all, (0..40).collect::<Vec<_>>());
    }
}
