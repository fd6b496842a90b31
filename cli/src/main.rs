use clap::Parser;
use laptimesim::core::solver::QssSolver;
use laptimesim::post::telemetry::{write_ggv_csv, write_telemetry_csv, write_telemetry_json};
use laptimesim::pre::check_sim_opts_pars::check_sim_opts_pars;
use laptimesim::pre::read_track::read_track;
use laptimesim::pre::read_vehicle::read_vehicle;
use laptimesim::pre::sim_opts::SimOpts;
use std::time::Instant;

fn main() -> anyhow::Result<()> {
    // PRE-PROCESSING ------------------------------------------------------------------------------
    // get simulation options from the command line arguments and read the input files
    let sim_opts: SimOpts = SimOpts::parse();
    check_sim_opts_pars(&sim_opts)?;

    let track = read_track(sim_opts.track_path.as_path())?;
    let vehicle = read_vehicle(sim_opts.vehicle_path.as_path())?;

    println!(
        "INFO: Simulating {} on {} with a maximum of {} iterations and a tolerance of {}s",
        vehicle.name,
        track.name(),
        sim_opts.iterations,
        sim_opts.tolerance
    );

    // EXECUTION -----------------------------------------------------------------------------------
    let t_start = Instant::now();

    let mut solver = QssSolver::new(&track, &vehicle)?;
    solver.solve(sim_opts.iterations, sim_opts.tolerance)?;

    println!(
        "INFO: Execution time (total): {}ms",
        t_start.elapsed().as_millis()
    );

    // POST-PROCESSING -----------------------------------------------------------------------------
    // reconstruct the telemetry, print the summary, and write the requested output files
    let result = solver.get_lap_result()?;
    result.print_summary(&track, &vehicle);

    if let Some(csv_path) = sim_opts.csv.as_deref() {
        write_telemetry_csv(&result, csv_path)?;
    }

    if let Some(json_path) = sim_opts.json.as_deref() {
        write_telemetry_json(&result, json_path)?;
    }

    if let Some(ggv_path) = sim_opts.ggv.as_deref() {
        write_ggv_csv(solver.ggv(), ggv_path)?;
    }

    Ok(())
}
