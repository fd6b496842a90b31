use crate::pre::sim_opts::SimOpts;
use anyhow::Context;
use helpers::general::OptionValueError;

/// check_sim_opts_pars assures that the inserted options are within reasonable limits and raises
/// an error if not. The vehicle parameters are validated separately when they are read.
pub fn check_sim_opts_pars(sim_opts: &SimOpts) -> anyhow::Result<()> {
    if sim_opts.iterations < 1 {
        return Err(OptionValueError).context(format!(
            "iterations must be at least equal to one, but is {}!",
            sim_opts.iterations
        ));
    }

    if !(sim_opts.tolerance > 0.0) {
        return Err(OptionValueError).context(format!(
            "tolerance must be positive, but is {}!",
            sim_opts.tolerance
        ));
    }

    Ok(())
}
