//! MDVRP Solver - Command Line Interface
//!
//! Reads an instance JSON file, solves it and writes the routes as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use mdvrp_solver::instance::Instance;
use mdvrp_solver::report::{export_routes_csv, SolutionStatistics};
use mdvrp_solver::solver::{MdvrpSolver, SolveOptions, SystemClock};
use mdvrp_solver::visualization::Visualizer;

use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mdvrp-solver")]
#[command(version = "1.0")]
#[command(about = "Multi-Depot Vehicle Routing Problem solver")]
struct Cli {
    /// Input instance (JSON with warehouses, stores and trucks)
    input: PathBuf,

    /// Output file for the routes (JSON)
    output: PathBuf,

    /// Maximum number of 2-opt improvement rounds
    #[arg(short, long, default_value = "100")]
    iterations: usize,

    /// Optimize routes on a single thread
    #[arg(long)]
    sequential: bool,

    /// Also write a per-route CSV summary
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Also write an SVG map of the routes
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    log::info!("Loading instance from {:?}", cli.input);
    let instance = Instance::from_file(&cli.input)
        .with_context(|| format!("failed to load instance {:?}", cli.input))?;

    if cli.verbose {
        println!("{}", instance.statistics());
    }

    let options = SolveOptions {
        iterations: cli.iterations,
        parallel: !cli.sequential,
        ..Default::default()
    };
    let solver = MdvrpSolver::new(options);
    let solution = solver.solve(&instance, &SystemClock).context("solver failed")?;

    solution
        .save_json(&instance, &cli.output)
        .with_context(|| format!("failed to write solution {:?}", cli.output))?;

    println!("\n========== Results ==========");
    print!("{}", SolutionStatistics::new(&instance, &solution));

    if cli.verbose {
        for route in &solution.routes {
            let record = route.to_record(&instance);
            println!(
                "{} [{} / {}] {:.2} km, {:.2} h, load {:.1}/{:.1}: {}",
                record.id,
                record.depot_id,
                record.vehicle_id,
                record.distance,
                record.estimated_time,
                record.load,
                record.capacity,
                record.stops.join(" -> ")
            );
        }
    }

    if let Some(path) = &cli.summary {
        export_routes_csv(&instance, &solution, path)
            .with_context(|| format!("failed to write summary {:?}", path))?;
        println!("Summary saved to {:?}", path);
    }

    if let Some(path) = &cli.svg {
        let viz = Visualizer::new();
        let svg = viz.generate_svg(&instance, &solution);
        viz.save_svg(&svg, path)
            .with_context(|| format!("failed to write map {:?}", path))?;
        println!("Map saved to {:?}", path);
    }

    println!("\nSolution saved to {:?}", cli.output);
    Ok(())
}
