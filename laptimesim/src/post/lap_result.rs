use crate::core::state::SimulationState;
use crate::core::track::Track;
use crate::core::vehicle::VehiclePars;

/// LapResult contains the solved lap: one simulation state per track point plus the lap time,
/// and provides the aggregate statistics for post-processing.
#[derive(Debug)]
pub struct LapResult {
    states: Vec<SimulationState>,
    lap_time: f64,
}

impl LapResult {
    pub fn new(lap_time: f64) -> LapResult {
        LapResult {
            states: Vec::new(),
            lap_time,
        }
    }

    pub fn add_state(&mut self, state: SimulationState) {
        self.states.push(state);
    }

    pub fn states(&self) -> &[SimulationState] {
        &self.states
    }

    pub fn lap_time(&self) -> f64 {
        self.lap_time
    }

    /// The method returns the maximum velocity over the lap.
    pub fn max_speed(&self) -> f64 {
        self.states.iter().map(|state| state.v).fold(0.0, f64::max)
    }

    /// The method returns the average velocity based on the arc length of the last state. On a
    /// closed track this slightly underestimates the true average since the wrap segment back
    /// to the start line is not part of the last state's arc length.
    pub fn average_speed(&self) -> f64 {
        if self.states.is_empty() || self.lap_time <= 0.0 {
            return 0.0;
        }

        let total_distance = self.states[self.states.len() - 1].s;
        total_distance / self.lap_time
    }

    /// The method returns the maximum absolute longitudinal, lateral, and total g-forces.
    pub fn max_g_forces(&self) -> (f64, f64, f64) {
        let mut max_gx = 0.0_f64;
        let mut max_gy = 0.0_f64;
        let mut max_g_total = 0.0_f64;

        for state in self.states.iter() {
            max_gx = max_gx.max(state.gx.abs());
            max_gy = max_gy.max(state.gy.abs());
            max_g_total = max_g_total.max(state.g_total);
        }

        (max_gx, max_gy, max_g_total)
    }

    /// print_summary prints the lap time and the performance statistics to the console output.
    pub fn print_summary(&self, track: &Track, vehicle: &VehiclePars) {
        let (max_gx, max_gy, max_g_total) = self.max_g_forces();

        println!(
            "INFO: Track {} with {} points and a length of {:.1}m",
            track.name(),
            track.num_points(),
            track.total_length()
        );
        println!(
            "INFO: Vehicle {} with a mass of {:.1}kg and a power-to-weight ratio of {:.2}hp/kg",
            vehicle.name,
            vehicle.mass.mass,
            vehicle.power_to_weight_ratio()
        );

        println!("RESULT: Optimal lap time: {:.3}s", self.lap_time);
        println!(
            "RESULT: Maximum speed: {:.1}km/h ({:.1}m/s)",
            self.max_speed() * 3.6,
            self.max_speed()
        );
        println!(
            "RESULT: Average speed: {:.1}km/h ({:.1}m/s)",
            self.average_speed() * 3.6,
            self.average_speed()
        );
        println!(
            "RESULT: Maximum g-forces: {:.2}g longitudinal, {:.2}g lateral, {:.2}g total",
            max_gx, max_gy, max_g_total
        );
    }
}
