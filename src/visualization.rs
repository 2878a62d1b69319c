//! Visualization utilities for MDVRP solutions.
//!
//! Generates an SVG map of depots, demand points and routes using an
//! equirectangular projection (longitude on x, latitude on y).

use crate::error::SolverError;
use crate::instance::{Instance, Location};
use crate::solution::Solution;
use std::fs::File;
use std::io::Write;
use std::path::Path;

const ROUTE_COLORS: [&str; 8] = [
    "#e74c3c", "#3498db", "#2ecc71", "#9b59b6", "#f39c12", "#1abc9c", "#d35400", "#34495e",
];

/// SVG visualization generator
pub struct Visualizer {
    /// Canvas width
    pub width: f64,
    /// Canvas height
    pub height: f64,
    /// Margin
    pub margin: f64,
    /// Node radius
    pub node_radius: f64,
}

impl Default for Visualizer {
    fn default() -> Self {
        Visualizer {
            width: 800.0,
            height: 800.0,
            margin: 50.0,
            node_radius: 5.0,
        }
    }
}

impl Visualizer {
    pub fn new() -> Self {
        Self::default()
    }

    fn locations<'a>(&self, instance: &'a Instance) -> impl Iterator<Item = Location> + 'a {
        instance
            .depots()
            .iter()
            .map(|d| d.location)
            .chain(instance.points().iter().map(|p| p.location))
    }

    /// (min_lng, max_lng, min_lat, max_lat)
    fn get_bounds(&self, instance: &Instance) -> (f64, f64, f64, f64) {
        let mut bounds = (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY);
        for loc in self.locations(instance) {
            bounds.0 = bounds.0.min(loc.lng);
            bounds.1 = bounds.1.max(loc.lng);
            bounds.2 = bounds.2.min(loc.lat);
            bounds.3 = bounds.3.max(loc.lat);
        }
        if !bounds.0.is_finite() {
            return (0.0, 1.0, 0.0, 1.0);
        }
        bounds
    }

    /// Generate SVG visualization of a solution
    pub fn generate_svg(&self, instance: &Instance, solution: &Solution) -> String {
        let mut svg = String::new();

        let (min_x, max_x, min_y, max_y) = self.get_bounds(instance);
        let span_x = (max_x - min_x).max(1e-6);
        let span_y = (max_y - min_y).max(1e-6);
        let scale = ((self.width - 2.0 * self.margin) / span_x).min((self.height - 2.0 * self.margin) / span_y);

        let transform = |loc: Location| -> (f64, f64) {
            let tx = self.margin + (loc.lng - min_x) * scale;
            let ty = self.height - self.margin - (loc.lat - min_y) * scale;
            (tx, ty)
        };

        svg.push_str(&format!(
            r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">
<style>
    .point {{ fill: #ffffff; stroke: #2c3e50; stroke-width: 1.5; }}
    .unserved {{ fill: #7f8c8d; stroke: #2c3e50; stroke-width: 1.5; }}
    .depot {{ fill: #2c3e50; stroke: #000000; stroke-width: 2; }}
    .route {{ stroke-width: 2; fill: none; }}
    .overloaded {{ stroke-dasharray: 6 3; }}
    .label {{ font-family: Arial; font-size: 10px; fill: #2c3e50; }}
    .title {{ font-family: Arial; font-size: 14px; fill: #2c3e50; font-weight: bold; }}
</style>
<rect width="100%" height="100%" fill="#ecf0f1"/>
"##,
            self.width, self.height, self.width, self.height
        ));

        svg.push_str(&format!(
            r##"<text x="{}" y="25" class="title">Routes: {} | Distance: {:.2} km | Unserved: {}</text>
"##,
            self.margin,
            solution.routes.len(),
            solution.total_distance(),
            solution.unserved.len()
        ));

        for (k, route) in solution.routes.iter().enumerate() {
            let color = ROUTE_COLORS[k % ROUTE_COLORS.len()];
            let class = if route.is_over_capacity(instance) { "route overloaded" } else { "route" };

            let depot = instance.depots()[route.depot].location;
            let points: Vec<String> = std::iter::once(depot)
                .chain(route.stops.iter().map(|&p| instance.points()[p].location))
                .chain(std::iter::once(depot))
                .map(|loc| {
                    let (x, y) = transform(loc);
                    format!("{:.2},{:.2}", x, y)
                })
                .collect();

            svg.push_str(&format!(
                r#"<polyline points="{}" class="{}" stroke="{}"><title>{}</title></polyline>
"#,
                points.join(" "),
                class,
                color,
                route.id
            ));
        }

        for (p, point) in instance.points().iter().enumerate() {
            let (x, y) = transform(point.location);
            let class = if solution.unserved.contains(&p) { "unserved" } else { "point" };
            svg.push_str(&format!(
                r#"<circle cx="{:.2}" cy="{:.2}" r="{}" class="{}"/>
"#,
                x, y, self.node_radius, class
            ));
        }

        for depot in instance.depots() {
            let (x, y) = transform(depot.location);
            let half = self.node_radius * 1.5;
            svg.push_str(&format!(
                r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" class="depot"/>
<text x="{:.2}" y="{:.2}" class="label">{}</text>
"#,
                x - half,
                y - half,
                2.0 * half,
                2.0 * half,
                x + half + 2.0,
                y - half,
                escape(&depot.id)
            ));
        }

        svg.push_str("</svg>");

        svg
    }

    /// Save SVG to file
    pub fn save_svg<P: AsRef<Path>>(&self, svg: &str, path: P) -> Result<(), SolverError> {
        let path = path.as_ref();
        let io_err = |source| SolverError::Io { path: path.display().to_string(), source };
        let mut file = File::create(path).map_err(io_err)?;
        file.write_all(svg.as_bytes()).map_err(io_err)?;
        Ok(())
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::{DemandPoint, Depot, Vehicle};
    use crate::solver::{FixedClock, MdvrpSolver};
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_svg_contains_every_route_and_point() {
        let instance = Instance::new(
            vec![Depot::new("W<1>", 48.85, 2.35)],
            vec![
                DemandPoint::new("S1", 48.80, 2.30, 3.0),
                DemandPoint::new("S2", 48.90, 2.40, 3.0),
            ],
            vec![Vehicle::new("T1", 10.0, "W<1>", 30.0)],
        )
        .unwrap();
        let clock = FixedClock(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let solution = MdvrpSolver::default().solve(&instance, &clock).unwrap();

        let svg = Visualizer::new().generate_svg(&instance, &solution);

        assert!(svg.starts_with("<?xml"));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches("<polyline").count(), 1);
        assert_eq!(svg.matches("<circle").count(), 2);
        assert!(svg.contains("W&lt;1&gt;"));
    }

    #[test]
    fn test_empty_instance_renders() {
        let instance = Instance::new(vec![], vec![], vec![]).unwrap();
        let svg = Visualizer::new().generate_svg(&instance, &Solution::default());
        assert!(svg.contains("Routes: 0"));
    }
}
