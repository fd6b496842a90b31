pub mod check_sim_opts_pars;
pub mod read_track;
pub mod read_vehicle;
pub mod sim_opts;
