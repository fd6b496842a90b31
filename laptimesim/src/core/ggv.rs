use crate::core::aero::AeroModel;
use crate::core::error::SimError;
use crate::core::powertrain::PowertrainModel;
use crate::core::tire::TireModel;
use crate::core::vehicle::{VehiclePars, GRAVITY};
use rayon::prelude::*;

/// (m/s^2) Physical safety rail on the forward acceleration (about 5 g).
pub const AX_ACCEL_CAP: f64 = 50.0;
/// (m/s^2) Physical safety rail on the deceleration (about 6 g, negative).
pub const AX_BRAKE_CAP: f64 = -60.0;
/// (m/s) Velocity floor used within the grid node evaluation.
const V_CALC_FLOOR: f64 = 0.1;

/// * `velocity` - (m/s) Grid node velocity
/// * `ay` - (m/s^2) Grid node lateral acceleration (absolute value)
/// * `ax_max_accel` - (m/s^2) Maximum forward acceleration at this node (>= 0)
/// * `ax_max_brake` - (m/s^2) Maximum deceleration at this node (<= 0)
#[derive(Debug, Clone)]
pub struct GgvPoint {
    pub velocity: f64,
    pub ay: f64,
    pub ax_max_accel: f64,
    pub ax_max_brake: f64,
}

/// Ggv holds the g-g-velocity performance envelope of a vehicle: the maximum longitudinal
/// acceleration and deceleration on a regular (velocity, lateral acceleration) grid, stored
/// row-major with the velocity as the row index. It is generated once and queried by bilinear
/// interpolation afterwards.
#[derive(Debug)]
pub struct Ggv {
    aero: AeroModel,
    tire: TireModel,
    powertrain: PowertrainModel,
    mass: f64,
    max_brake_force: f64,
    points: Vec<GgvPoint>,
    generated: bool,
    v_min: f64,
    v_max: f64,
    v_step: f64,
    ay_max: f64,
    ay_step: f64,
    n_v: usize,
    n_ay: usize,
}

impl Ggv {
    pub fn new(vehicle: &VehiclePars) -> Result<Ggv, SimError> {
        Ok(Ggv {
            aero: AeroModel::new(&vehicle.aero),
            tire: TireModel::new(&vehicle.tire),
            powertrain: PowertrainModel::new(&vehicle.powertrain, vehicle.tire.tire_radius)?,
            mass: vehicle.mass.mass,
            max_brake_force: vehicle.brake.max_brake_force,
            points: Vec::new(),
            generated: false,
            v_min: 0.0,
            v_max: 0.0,
            v_step: 1.0,
            ay_max: 0.0,
            ay_step: 1.0,
            n_v: 0,
            n_ay: 0,
        })
    }

    /// The method evaluates the envelope on the inserted grid. Every node is independent, the
    /// rows are therefore computed in parallel.
    pub fn generate(&mut self, v_min: f64, v_max: f64, v_step: f64, ay_max: f64, ay_step: f64) {
        self.v_min = v_min;
        self.v_max = v_max;
        self.v_step = v_step;
        self.ay_max = ay_max;
        self.ay_step = ay_step;
        self.n_v = ((v_max - v_min) / v_step).ceil() as usize + 1;
        self.n_ay = (ay_max / ay_step).ceil() as usize + 1;

        let this = &*self;
        let n_ay = this.n_ay;

        let points: Vec<GgvPoint> = (0..this.n_v)
            .into_par_iter()
            .flat_map_iter(move |i| {
                let v = v_min + i as f64 * v_step;
                (0..n_ay).map(move |j| {
                    let ay = j as f64 * ay_step;
                    GgvPoint {
                        velocity: v,
                        ay,
                        ax_max_accel: this.calculate_max_acceleration(v, ay),
                        ax_max_brake: this.calculate_max_braking(v, ay),
                    }
                })
            })
            .collect();

        self.points = points;
        self.generated = true;
    }

    /// Maximum forward acceleration at a grid node: the available force is the minimum of engine
    /// force and remaining friction-circle capacity, reduced by the aerodynamic drag.
    fn calculate_max_acceleration(&self, v: f64, ay: f64) -> f64 {
        let v = v.max(V_CALC_FLOOR);

        let fz_total = self.aero.total_vertical_load(v, self.mass, GRAVITY);
        let fy_required = self.mass * ay;

        let fx_tire_max = self.tire.available_longitudinal_force(fz_total, fy_required);
        let fx_engine = self.powertrain.max_wheel_force(v);
        let f_drag = self.aero.drag_force(v);

        let fx_net = fx_engine.min(fx_tire_max) - f_drag;

        (fx_net / self.mass).clamp(0.0, AX_ACCEL_CAP)
    }

    /// Maximum deceleration at a grid node: braking force is limited by the friction circle and
    /// the brake system, the drag assists.
    fn calculate_max_braking(&self, v: f64, ay: f64) -> f64 {
        let v = v.max(V_CALC_FLOOR);

        let fz_total = self.aero.total_vertical_load(v, self.mass, GRAVITY);
        let fy_required = self.mass * ay;

        let fx_tire_max = self.tire.available_longitudinal_force(fz_total, fy_required);
        let fx_brake = fx_tire_max.min(self.max_brake_force);
        let f_drag = self.aero.drag_force(v);

        let fx_net = -(fx_brake + f_drag);

        (fx_net / self.mass).max(AX_BRAKE_CAP)
    }

    /// The method returns the interpolated maximum forward acceleration at the inserted state.
    pub fn max_acceleration(&self, v: f64, ay: f64) -> Result<f64, SimError> {
        if !self.generated {
            return Err(SimError::GgvNotGenerated);
        }
        Ok(self.interpolate(v, ay.abs(), |p| p.ax_max_accel))
    }

    /// The method returns the interpolated maximum deceleration (negative) at the inserted state.
    pub fn max_braking(&self, v: f64, ay: f64) -> Result<f64, SimError> {
        if !self.generated {
            return Err(SimError::GgvNotGenerated);
        }
        Ok(self.interpolate(v, ay.abs(), |p| p.ax_max_brake))
    }

    /// Bilinear interpolation over the four surrounding grid nodes, with the query point clamped
    /// to the grid range.
    fn interpolate(&self, v: f64, ay: f64, value: impl Fn(&GgvPoint) -> f64) -> f64 {
        let v = v.clamp(self.v_min, self.v_max);
        let ay = ay.clamp(0.0, self.ay_max);

        let v_idx_f = (v - self.v_min) / self.v_step;
        let ay_idx_f = ay / self.ay_step;

        let v_idx = v_idx_f as usize;
        let ay_idx = ay_idx_f as usize;

        let v_t = v_idx_f - v_idx as f64;
        let ay_t = ay_idx_f - ay_idx as f64;

        let get = |vi: usize, ayi: usize| -> f64 {
            if vi < self.n_v && ayi < self.n_ay {
                value(&self.points[vi * self.n_ay + ayi])
            } else {
                0.0
            }
        };

        let v00 = get(v_idx, ay_idx);
        let v10 = get(v_idx + 1, ay_idx);
        let v01 = get(v_idx, ay_idx + 1);
        let v11 = get(v_idx + 1, ay_idx + 1);

        let v0 = v00 * (1.0 - v_t) + v10 * v_t;
        let v1 = v01 * (1.0 - v_t) + v11 * v_t;

        v0 * (1.0 - ay_t) + v1 * ay_t
    }

    pub fn is_generated(&self) -> bool {
        self.generated
    }

    pub fn points(&self) -> &[GgvPoint] {
        &self.points
    }

    pub fn num_velocity_rows(&self) -> usize {
        self.n_v
    }

    pub fn num_ay_columns(&self) -> usize {
        self.n_ay
    }
}
