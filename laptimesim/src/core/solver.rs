use crate::core::aero::AeroModel;
use crate::core::error::SimError;
use crate::core::ggv::{Ggv, AX_ACCEL_CAP, AX_BRAKE_CAP};
use crate::core::powertrain::PowertrainModel;
use crate::core::state::SimulationState;
use crate::core::tire::TireModel;
use crate::core::track::Track;
use crate::core::vehicle::{VehiclePars, GRAVITY};
use crate::post::lap_result::LapResult;

// GGV grid used by the solver
const GGV_V_MAX: f64 = 120.0;
const GGV_V_STEP: f64 = 0.5;
const GGV_AY_MAX: f64 = 50.0;
const GGV_AY_STEP: f64 = 1.0;

/// (rad/m) Below this curvature a section is treated as straight (radius above 500 m).
pub const KAPPA_STRAIGHT: f64 = 0.002;
/// (m/s) Cornering velocity assigned to straight sections.
pub const V_STRAIGHT: f64 = 110.0;
/// (m/s) Cornering velocity assigned where the downforce term dominates the force balance, i.e.
/// where the quasi-steady balance has no finite solution.
pub const V_DOWNFORCE_LIMITED: f64 = 100.0;

/// (m/s) Initial velocity of the forward/backward passes (the closed loop has no standstill
/// start).
const V_INIT: f64 = 50.0;
/// (m/s) Lower velocity bound within the passes.
const V_FLOOR: f64 = 1.0;
/// (m) Radius reported for straight sections in the telemetry.
const RADIUS_CAP: f64 = 1e9;

/// QssSolver computes the quasi-steady-state velocity profile of a vehicle on a closed track.
/// It borrows the preprocessed track and the vehicle parameters (both read-only) and exclusively
/// owns the velocity arrays and the force models it instantiates.
///
/// The profile is the pointwise minimum of three limits:
/// * cornering limit (lateral friction balance, fixed per track point)
/// * forward pass (acceleration limited by the GGV envelope)
/// * backward pass (braking limited by the GGV envelope)
///
/// The forward and backward passes apply one wrap-closure step at the start/finish boundary per
/// iteration, the outer loop iterates until the lap time is converged.
#[derive(Debug)]
pub struct QssSolver<'a> {
    track: &'a Track,
    vehicle: &'a VehiclePars,
    n_points: usize,
    v_corner: Vec<f64>,
    v_accel: Vec<f64>,
    v_brake: Vec<f64>,
    v_optimal: Vec<f64>,
    lap_time: f64,
    converged: bool,
    iterations_used: u32,
    ggv: Ggv,
    aero: AeroModel,
    #[allow(dead_code)]
    tire: TireModel,
    powertrain: PowertrainModel,
}

impl<'a> QssSolver<'a> {
    pub fn new(track: &'a Track, vehicle: &'a VehiclePars) -> Result<QssSolver<'a>, SimError> {
        if !track.is_preprocessed() {
            return Err(SimError::InvalidTrack(
                "track must be preprocessed before solving".to_owned(),
            ));
        }

        vehicle.validate()?;

        let n_points = track.num_points();

        Ok(QssSolver {
            track,
            vehicle,
            n_points,
            v_corner: vec![0.0; n_points],
            v_accel: vec![0.0; n_points],
            v_brake: vec![0.0; n_points],
            v_optimal: vec![0.0; n_points],
            lap_time: 0.0,
            converged: false,
            iterations_used: 0,
            ggv: Ggv::new(vehicle)?,
            aero: AeroModel::new(&vehicle.aero),
            tire: TireModel::new(&vehicle.tire),
            powertrain: PowertrainModel::new(&vehicle.powertrain, vehicle.tire.tire_radius)?,
        })
    }

    /// The method generates the GGV envelope of the vehicle on the solver grid.
    fn initialize(&mut self) {
        println!("INFO: Generating GGV diagram...");

        self.ggv
            .generate(0.0, GGV_V_MAX, GGV_V_STEP, GGV_AY_MAX, GGV_AY_STEP);

        println!(
            "INFO: GGV diagram generated with v_max = {:.1} m/s ({:.0} km/h)",
            GGV_V_MAX,
            GGV_V_MAX * 3.6
        );
    }

    /// The method runs the three-pass solver until the lap time is converged or the maximum
    /// number of iterations is reached, and returns the final lap time.
    pub fn solve(&mut self, max_iterations: u32, tolerance: f64) -> Result<f64, SimError> {
        self.initialize();

        println!(
            "INFO: Starting quasi-steady-state solver, track has {} points and a length of \
            {:.1}m",
            self.n_points,
            self.track.total_length()
        );

        // the cornering limit is fixed, calculate it once
        self.calc_cornering_limit()?;

        // start the passes from a moderate rolling speed, not from the cornering limit
        for i in 0..self.n_points {
            self.v_accel[i] = V_INIT.min(self.v_corner[i]);
            self.v_brake[i] = V_INIT.min(self.v_corner[i]);
        }

        let mut prev_lap_time = 1e9;
        self.converged = false;

        for iter in 0..max_iterations {
            self.iterations_used = iter + 1;

            self.forward_integration()?;
            self.backward_integration()?;
            self.combine_profiles();
            self.lap_time = self.calc_lap_time()?;

            println!(
                "INFO: Iteration {}: lap time = {:.3}s",
                iter + 1,
                self.lap_time
            );

            if (self.lap_time - prev_lap_time).abs() < tolerance {
                self.converged = true;
                break;
            }

            prev_lap_time = self.lap_time;
        }

        if !self.converged {
            println!(
                "WARNING: Solver did not converge within {} iterations!",
                max_iterations
            );
        }

        Ok(self.lap_time)
    }

    /// Pass 1: pure cornering limit per track point (no dependency between the points).
    fn calc_cornering_limit(&mut self) -> Result<(), SimError> {
        let mut v_corner_min = f64::INFINITY;
        let mut v_corner_max = 0.0_f64;

        for i in 0..self.n_points {
            let kappa = self.track.point(i)?.kappa;
            self.v_corner[i] = self.solve_cornering_velocity(kappa);

            v_corner_min = v_corner_min.min(self.v_corner[i]);
            v_corner_max = v_corner_max.max(self.v_corner[i]);
        }

        println!(
            "INFO: Cornering limits calculated, v_corner range is {:.1} to {:.1} km/h",
            v_corner_min * 3.6,
            v_corner_max * 3.6
        );

        Ok(())
    }

    /// Quasi-steady lateral balance: m * v^2 * |kappa| = mu_y * (m * g + F_downforce(v)), solved
    /// for v. Straight sections and sections where the downforce term exceeds the mechanical
    /// term receive fixed high velocities (pragmatic caps, tunable via the module constants).
    fn solve_cornering_velocity(&self, kappa: f64) -> f64 {
        if kappa.abs() < KAPPA_STRAIGHT {
            return V_STRAIGHT;
        }

        let m = self.vehicle.mass.mass;
        let mu = self.vehicle.tire.mu_y;
        let rho = self.vehicle.aero.air_density;
        let cl = self.vehicle.aero.cl;
        let area = self.vehicle.aero.frontal_area;

        let aero_factor = 0.5 * mu * rho * (-cl) * area;
        let denominator = m * kappa.abs() - aero_factor;
        let numerator = mu * m * GRAVITY;

        if denominator <= 0.0 {
            return V_DOWNFORCE_LIMITED;
        }

        let v_squared = numerator / denominator;

        if v_squared < 0.0 {
            return 0.0;
        }

        v_squared.sqrt()
    }

    /// Pass 2: integrate forward along the track using the maximum acceleration the GGV envelope
    /// allows, constrained by the cornering limit of the next point.
    fn forward_integration(&mut self) -> Result<(), SimError> {
        for i in 0..self.n_points - 1 {
            let v_start = self.v_accel[i].max(V_FLOOR);
            let point = self.track.point(i)?;

            let ay = v_start.powi(2) * point.kappa.abs();
            let ax_max = self.ggv.max_acceleration(v_start, ay)?.min(AX_ACCEL_CAP);

            // v_end^2 = v_start^2 + 2 * a * ds
            let v_squared_end = v_start.powi(2) + 2.0 * ax_max * point.ds;
            let v_end = if v_squared_end > 0.0 {
                v_squared_end.sqrt()
            } else {
                v_start
            };

            self.v_accel[i + 1] = v_end.min(self.v_corner[i + 1]).max(V_FLOOR);
        }

        // one wrap-closure step (last point to first), full consistency across the boundary is
        // reached over the outer iterations
        let last = self.n_points - 1;
        let v_start = self.v_accel[last];
        let point = self.track.point(last)?;

        let ay = v_start.powi(2) * point.kappa.abs();
        let ax_max = self.ggv.max_acceleration(v_start, ay)?;
        let v_squared_end = v_start.powi(2) + 2.0 * ax_max * point.ds;
        let v_end = if v_squared_end > 0.0 {
            v_squared_end.sqrt()
        } else {
            0.0
        };

        self.v_accel[0] = self.v_accel[0].min(v_end.min(self.v_corner[0]));

        Ok(())
    }

    /// Pass 3: integrate backward along the track using the maximum deceleration the GGV
    /// envelope allows, constrained by the cornering limit of the previous point.
    fn backward_integration(&mut self) -> Result<(), SimError> {
        for i in (1..self.n_points).rev() {
            let v_start = self.v_brake[i].max(V_FLOOR);
            let point_prev = self.track.point(i - 1)?;

            let ay = v_start.powi(2) * self.track.point(i)?.kappa.abs();
            let ax_min = self.ggv.max_braking(v_start, ay)?.max(AX_BRAKE_CAP);

            // v_prev^2 = v^2 - 2 * a * ds, ax_min is negative and therefore raises v_prev
            let v_squared_prev = v_start.powi(2) - 2.0 * ax_min * point_prev.ds;
            let v_prev = if v_squared_prev > 0.0 {
                v_squared_prev.sqrt()
            } else {
                v_start
            };

            self.v_brake[i - 1] = v_prev.min(self.v_corner[i - 1]).max(V_FLOOR);
        }

        // one wrap-closure step (first point to last)
        let last = self.n_points - 1;
        let v_start = self.v_brake[0];
        let last_point = self.track.point(last)?;

        let ay = v_start.powi(2) * self.track.point(0)?.kappa.abs();
        let ax_min = self.ggv.max_braking(v_start, ay)?;
        let v_squared_prev = v_start.powi(2) - 2.0 * ax_min * last_point.ds;
        let v_prev = if v_squared_prev > 0.0 {
            v_squared_prev.sqrt()
        } else {
            0.0
        };

        self.v_brake[last] = self.v_brake[last].min(v_prev.min(self.v_corner[last]));

        Ok(())
    }

    /// The velocity profile is the pointwise minimum of the three limits.
    fn combine_profiles(&mut self) {
        for i in 0..self.n_points {
            self.v_optimal[i] = self.v_corner[i].min(self.v_accel[i]).min(self.v_brake[i]);
        }
    }

    fn calc_lap_time(&self) -> Result<f64, SimError> {
        let mut total_time = 0.0;

        for i in 0..self.n_points {
            let point = self.track.point(i)?;

            if self.v_optimal[i] > 0.0 {
                total_time += point.ds / self.v_optimal[i];
            }
        }

        Ok(total_time)
    }

    /// The method reconstructs the full telemetry from the solved velocity profile and returns
    /// it together with the lap time.
    pub fn get_lap_result(&self) -> Result<LapResult, SimError> {
        let mut result = LapResult::new(self.lap_time);
        let mut cumulative_time = 0.0;

        for i in 0..self.n_points {
            result.add_state(self.create_state(i, cumulative_time)?);

            let point = self.track.point(i)?;
            if self.v_optimal[i] > 0.0 {
                cumulative_time += point.ds / self.v_optimal[i];
            }
        }

        Ok(result)
    }

    /// The method derives the simulation state of a single track sample from the solved profile.
    /// The longitudinal acceleration is estimated from the velocity change to the next point,
    /// the control inputs are coarse display estimates, and the lateral tire forces are not
    /// reconstructed.
    fn create_state(&self, index: usize, time: f64) -> Result<SimulationState, SimError> {
        let point = self.track.point(index)?;
        let v = self.v_optimal[index];

        let mut state = SimulationState {
            s: point.s,
            n: 0.0, // the driven line is the centerline
            x: point.x,
            y: point.y,
            z: point.z,
            v,
            v_kmh: v * 3.6,
            ay: v.powi(2) * point.kappa,
            az: GRAVITY,
            curvature: point.kappa,
            banking_angle: point.banking,
            timestamp: time,
            ..SimulationState::default()
        };

        // longitudinal acceleration approximated from the velocity change to the next point
        if index < self.n_points - 1 {
            let dv = self.v_optimal[index + 1] - v;
            let dt = if v > 0.0 { point.ds / v } else { 0.0 };
            state.ax = if dt > 0.0 { dv / dt } else { 0.0 };
        }

        state.update_g_forces(GRAVITY);

        state.radius = if point.kappa.abs() > 1e-6 {
            1.0 / point.kappa.abs()
        } else {
            RADIUS_CAP
        };

        state.drag_force = self.aero.drag_force(v);
        state.downforce = self.aero.downforce(v);
        state.vertical_load = self.aero.total_vertical_load(v, self.vehicle.mass.mass, GRAVITY);

        // coarse control estimates for display purposes
        if state.ax > 0.1 {
            state.throttle = (state.ax / 20.0).min(1.0);
        } else if state.ax < -0.1 {
            state.brake = (-state.ax / 30.0).min(1.0);
        }

        // kinematic bicycle model steering
        state.steering_angle = (self.vehicle.mass.wheelbase * point.kappa).atan();

        state.gear = self.powertrain.optimal_gear(v);
        state.rpm = self.powertrain.rpm(v, state.gear);
        state.engine_torque = self.powertrain.engine_torque(state.rpm);
        state.wheel_force = self.powertrain.wheel_force(v, state.gear);

        Ok(state)
    }

    pub fn lap_time(&self) -> f64 {
        self.lap_time
    }

    pub fn converged(&self) -> bool {
        self.converged
    }

    pub fn iterations_used(&self) -> u32 {
        self.iterations_used
    }

    pub fn v_corner(&self) -> &[f64] {
        &self.v_corner
    }

    pub fn v_accel(&self) -> &[f64] {
        &self.v_accel
    }

    pub fn v_brake(&self) -> &[f64] {
        &self.v_brake
    }

    pub fn v_optimal(&self) -> &[f64] {
        &self.v_optimal
    }

    pub fn ggv(&self) -> &Ggv {
        &self.ggv
    }
}
