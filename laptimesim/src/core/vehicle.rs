use crate::core::error::SimError;
use helpers::general::interp_clamped;

/// (m/s^2) Gravitational acceleration used throughout the simulation.
pub const GRAVITY: f64 = 9.81;

/// * `mass` - (kg) Total vehicle mass
/// * `cog_height` - (m) Height of the center of gravity
/// * `wheelbase` - (m) Distance between front and rear axle
/// * `weight_distribution` - (-) Front axle share of the static weight, range [0, 1]
#[derive(Debug, Clone)]
pub struct MassPars {
    pub mass: f64,
    pub cog_height: f64,
    pub wheelbase: f64,
    pub weight_distribution: f64,
}

/// * `cl` - (-) Lift coefficient, negative for net downforce
/// * `cd` - (-) Drag coefficient
/// * `frontal_area` - (m^2) Aerodynamic reference area
/// * `air_density` - (kg/m^3) Air density
#[derive(Debug, Clone)]
pub struct AeroPars {
    pub cl: f64,
    pub cd: f64,
    pub frontal_area: f64,
    pub air_density: f64,
}

/// * `mu_x` - (-) Peak longitudinal friction coefficient
/// * `mu_y` - (-) Peak lateral friction coefficient
/// * `load_sensitivity` - (-) Grip reduction with load, range [0, 1] (1 = no sensitivity)
/// * `tire_radius` - (m) Rolling radius
#[derive(Debug, Clone)]
pub struct TirePars {
    pub mu_x: f64,
    pub mu_y: f64,
    pub load_sensitivity: f64,
    pub tire_radius: f64,
}

/// * `curve_rpm` / `curve_torque` - (rpm)/(Nm) Engine torque curve as two parallel arrays with
/// strictly increasing rpm values
/// * `gear_ratios` - (-) Gear ratios, low gear first
/// * `final_drive_ratio` - (-) Final drive ratio
/// * `drivetrain_efficiency` - (-) Drivetrain efficiency, range (0, 1]
/// * `min_rpm` / `max_rpm` - (rpm) Engine operating band
/// * `shift_time` - (s) Gear shift duration
#[derive(Debug, Clone)]
pub struct PowertrainPars {
    pub curve_rpm: Vec<f64>,
    pub curve_torque: Vec<f64>,
    pub gear_ratios: Vec<f64>,
    pub final_drive_ratio: f64,
    pub drivetrain_efficiency: f64,
    pub min_rpm: f64,
    pub max_rpm: f64,
    pub shift_time: f64,
}

impl PowertrainPars {
    /// The method returns the engine torque at the inserted rpm by linear interpolation on the
    /// torque curve. Values outside the curve are clamped to the first/last entry, an empty
    /// curve yields zero torque.
    pub fn torque_at(&self, rpm: f64) -> f64 {
        if self.curve_rpm.is_empty() {
            return 0.0;
        }
        interp_clamped(rpm.max(0.0), &self.curve_rpm, &self.curve_torque)
    }
}

/// * `max_brake_force` - (N) Maximum total braking force of the brake system
/// * `brake_bias` - (-) Front axle share of the braking force, range [0, 1]
#[derive(Debug, Clone)]
pub struct BrakePars {
    pub max_brake_force: f64,
    pub brake_bias: f64,
}

/// VehiclePars bundles all parameter groups of a vehicle. It is built once by the input parsing
/// and read-only afterwards.
#[derive(Debug, Clone)]
pub struct VehiclePars {
    pub name: String,
    pub mass: MassPars,
    pub aero: AeroPars,
    pub tire: TirePars,
    pub powertrain: PowertrainPars,
    pub brake: BrakePars,
}

impl VehiclePars {
    /// The method assures that all parameters are within their valid ranges and raises an error
    /// describing the first violated requirement otherwise.
    pub fn validate(&self) -> Result<(), SimError> {
        // mass parameters
        if self.mass.mass <= 0.0 {
            return Err(SimError::InvalidVehicle("mass must be positive".to_owned()));
        }
        if self.mass.cog_height < 0.0 {
            return Err(SimError::InvalidVehicle(
                "cog_height must not be negative".to_owned(),
            ));
        }
        if self.mass.wheelbase <= 0.0 {
            return Err(SimError::InvalidVehicle(
                "wheelbase must be positive".to_owned(),
            ));
        }
        if !(0.0..=1.0).contains(&self.mass.weight_distribution) {
            return Err(SimError::InvalidVehicle(
                "weight_distribution must be within [0, 1]".to_owned(),
            ));
        }

        // aero parameters
        if self.aero.frontal_area <= 0.0 {
            return Err(SimError::InvalidVehicle(
                "frontal_area must be positive".to_owned(),
            ));
        }
        if self.aero.air_density <= 0.0 {
            return Err(SimError::InvalidVehicle(
                "air_density must be positive".to_owned(),
            ));
        }

        // tire parameters
        if self.tire.mu_x <= 0.0 || self.tire.mu_y <= 0.0 {
            return Err(SimError::InvalidVehicle(
                "friction coefficients must be positive".to_owned(),
            ));
        }
        if self.tire.tire_radius <= 0.0 {
            return Err(SimError::InvalidVehicle(
                "tire_radius must be positive".to_owned(),
            ));
        }
        if !(0.0..=1.0).contains(&self.tire.load_sensitivity) {
            return Err(SimError::InvalidVehicle(
                "load_sensitivity must be within [0, 1]".to_owned(),
            ));
        }

        // powertrain parameters
        if self.powertrain.curve_rpm.is_empty() {
            return Err(SimError::InvalidVehicle(
                "engine torque curve must contain at least one entry".to_owned(),
            ));
        }
        if self
            .powertrain
            .curve_rpm
            .windows(2)
            .any(|pair| pair[1] <= pair[0])
        {
            return Err(SimError::InvalidVehicle(
                "engine torque curve rpm values must be strictly increasing".to_owned(),
            ));
        }
        if self.powertrain.gear_ratios.is_empty() {
            return Err(SimError::InvalidVehicle(
                "gear ratio list must not be empty".to_owned(),
            ));
        }
        if self.powertrain.final_drive_ratio <= 0.0 {
            return Err(SimError::InvalidVehicle(
                "final_drive_ratio must be positive".to_owned(),
            ));
        }
        if self.powertrain.drivetrain_efficiency <= 0.0
            || self.powertrain.drivetrain_efficiency > 1.0
        {
            return Err(SimError::InvalidVehicle(
                "drivetrain_efficiency must be within (0, 1]".to_owned(),
            ));
        }
        if self.powertrain.min_rpm >= self.powertrain.max_rpm {
            return Err(SimError::InvalidVehicle(
                "min_rpm must be below max_rpm".to_owned(),
            ));
        }
        if self.powertrain.shift_time < 0.0 {
            return Err(SimError::InvalidVehicle(
                "shift_time must not be negative".to_owned(),
            ));
        }

        // brake parameters
        if self.brake.max_brake_force <= 0.0 {
            return Err(SimError::InvalidVehicle(
                "max_brake_force must be positive".to_owned(),
            ));
        }
        if !(0.0..=1.0).contains(&self.brake.brake_bias) {
            return Err(SimError::InvalidVehicle(
                "brake_bias must be within [0, 1]".to_owned(),
            ));
        }

        Ok(())
    }

    /// The method returns the peak engine power over the torque curve in W (without drivetrain
    /// losses).
    fn peak_engine_power(&self) -> f64 {
        self.powertrain
            .curve_rpm
            .iter()
            .zip(self.powertrain.curve_torque.iter())
            .map(|(&rpm, &torque)| torque * rpm * 2.0 * std::f64::consts::PI / 60.0)
            .fold(0.0, f64::max)
    }

    /// The method returns the power-to-weight ratio in hp/kg based on the peak power of the
    /// torque curve.
    pub fn power_to_weight_ratio(&self) -> f64 {
        let max_hp = self.peak_engine_power() / 745.7;
        max_hp / self.mass.mass
    }

    /// The method returns the drag-limited top speed, i.e. the velocity at which the entire
    /// efficiency-scaled peak power is spent against aerodynamic drag.
    pub fn max_theoretical_speed(&self) -> f64 {
        let max_power = self.peak_engine_power() * self.powertrain.drivetrain_efficiency;
        let v_cubed =
            (2.0 * max_power) / (self.aero.air_density * self.aero.cd * self.aero.frontal_area);
        v_cubed.powf(1.0 / 3.0)
    }
}

/// sample_vehicle returns the reference vehicle used by the unit tests of the core modules.
#[cfg(test)]
pub(crate) fn sample_vehicle() -> VehiclePars {
    VehiclePars {
        name: "Test Car".to_owned(),
        mass: MassPars {
            mass: 800.0,
            cog_height: 0.3,
            wheelbase: 2.5,
            weight_distribution: 0.45,
        },
        aero: AeroPars {
            cl: -3.0,
            cd: 0.8,
            frontal_area: 1.5,
            air_density: 1.225,
        },
        tire: TirePars {
            mu_x: 1.6,
            mu_y: 1.6,
            load_sensitivity: 0.9,
            tire_radius: 0.3,
        },
        powertrain: PowertrainPars {
            curve_rpm: vec![5000.0, 10000.0, 15000.0],
            curve_torque: vec![250.0, 350.0, 300.0],
            gear_ratios: vec![3.0, 2.2, 1.7, 1.3, 1.0],
            final_drive_ratio: 3.5,
            drivetrain_efficiency: 0.95,
            min_rpm: 4000.0,
            max_rpm: 15000.0,
            shift_time: 0.05,
        },
        brake: BrakePars {
            max_brake_force: 20000.0,
            brake_bias: 0.6,
        },
    }
}
