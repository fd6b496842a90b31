/// SimulationState holds all derived quantities of a single track sample in the solved lap:
/// position, velocity, accelerations, g-forces, control estimates, powertrain state, forces, and
/// local track properties.
#[derive(Debug, Clone)]
pub struct SimulationState {
    // position
    pub s: f64,
    pub n: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    // velocity
    pub v: f64,
    pub v_kmh: f64,
    // accelerations
    pub ax: f64,
    pub ay: f64,
    pub az: f64,
    // g-forces
    pub gx: f64,
    pub gy: f64,
    pub gz: f64,
    pub g_total: f64,
    // control estimates
    pub throttle: f64,
    pub brake: f64,
    pub steering_angle: f64,
    // powertrain
    pub gear: usize,
    pub rpm: f64,
    pub engine_torque: f64,
    pub wheel_force: f64,
    // forces
    pub drag_force: f64,
    pub downforce: f64,
    pub tire_force_x: f64,
    pub tire_force_y: f64,
    pub vertical_load: f64,
    // track properties
    pub curvature: f64,
    pub radius: f64,
    pub banking_angle: f64,
    // time since lap start
    pub timestamp: f64,
}

impl Default for SimulationState {
    fn default() -> Self {
        SimulationState {
            s: 0.0,
            n: 0.0,
            x: 0.0,
            y: 0.0,
            z: 0.0,
            v: 0.0,
            v_kmh: 0.0,
            ax: 0.0,
            ay: 0.0,
            az: 0.0,
            gx: 0.0,
            gy: 0.0,
            gz: 0.0,
            g_total: 0.0,
            throttle: 0.0,
            brake: 0.0,
            steering_angle: 0.0,
            gear: 1,
            rpm: 0.0,
            engine_torque: 0.0,
            wheel_force: 0.0,
            drag_force: 0.0,
            downforce: 0.0,
            tire_force_x: 0.0,
            tire_force_y: 0.0,
            vertical_load: 0.0,
            curvature: 0.0,
            radius: 1e9,
            banking_angle: 0.0,
            timestamp: 0.0,
        }
    }
}

impl SimulationState {
    /// The method derives the g-forces from the stored accelerations.
    pub fn update_g_forces(&mut self, gravity: f64) {
        let gravity = if gravity <= 0.0 { 9.81 } else { gravity };

        self.gx = self.ax / gravity;
        self.gy = self.ay / gravity;
        self.gz = self.az / gravity;
        self.g_total = (self.gx.powi(2) + self.gy.powi(2) + self.gz.powi(2)).sqrt();
    }
}
