use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser, Clone)]
#[clap(
    version = "0.1.0",
    name = "LTS-QSS",
    about = "A quasi-steady-state lap time simulator written in Rust"
)]
pub struct SimOpts {
    // ARGUMENTS -----------------------------------------------------------------------------------
    /// Set path to the track file (JSON, or TUMFTM CSV if the extension is .csv)
    #[clap(parse(from_os_str))]
    pub track_path: PathBuf,

    /// Set path to the vehicle parameter file (JSON)
    #[clap(parse(from_os_str))]
    pub vehicle_path: PathBuf,

    // OPTIONS -------------------------------------------------------------------------------------
    /// Export the telemetry to the inserted CSV file
    #[clap(long, parse(from_os_str))]
    pub csv: Option<PathBuf>,

    /// Export the telemetry to the inserted JSON file
    #[clap(long, parse(from_os_str))]
    pub json: Option<PathBuf>,

    /// Export the GGV diagram to the inserted CSV file
    #[clap(long, parse(from_os_str))]
    pub ggv: Option<PathBuf>,

    /// Set maximum number of solver iterations
    #[clap(short, long, default_value = "10")]
    pub iterations: u32,

    /// Set convergence tolerance on the lap time in seconds
    #[clap(short, long, default_value = "0.001")]
    pub tolerance: f64,
}
