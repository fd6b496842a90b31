use crate::core::error::SimError;
use crate::core::vehicle::{
    AeroPars, BrakePars, MassPars, PowertrainPars, TirePars, VehiclePars,
};
use anyhow::Context;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

fn default_vehicle_name() -> String {
    "Unnamed Vehicle".to_owned()
}

/// The group structs below mirror the JSON shape of a vehicle file. Missing fields (or whole
/// missing groups) fall back to the documented defaults via the Default implementations.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MassGroupPars {
    pub mass: f64,
    pub cog_height: f64,
    pub wheelbase: f64,
    pub weight_distribution: f64,
}

impl Default for MassGroupPars {
    fn default() -> Self {
        MassGroupPars {
            mass: 800.0,
            cog_height: 0.3,
            wheelbase: 2.5,
            weight_distribution: 0.45,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AeroGroupPars {
    #[serde(rename = "Cl")]
    pub cl: f64,
    #[serde(rename = "Cd")]
    pub cd: f64,
    pub frontal_area: f64,
    pub air_density: f64,
}

impl Default for AeroGroupPars {
    fn default() -> Self {
        AeroGroupPars {
            cl: -3.0,
            cd: 0.8,
            frontal_area: 1.5,
            air_density: 1.225,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TireGroupPars {
    pub mu_x: f64,
    pub mu_y: f64,
    pub load_sensitivity: f64,
    pub tire_radius: f64,
}

impl Default for TireGroupPars {
    fn default() -> Self {
        TireGroupPars {
            mu_x: 1.6,
            mu_y: 1.8,
            load_sensitivity: 0.9,
            tire_radius: 0.3,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PowertrainGroupPars {
    pub engine_torque_curve: HashMap<String, f64>,
    pub gear_ratios: Vec<f64>,
    pub final_drive: f64,
    pub efficiency: f64,
    pub max_rpm: f64,
    pub min_rpm: f64,
    pub shift_time: f64,
}

impl Default for PowertrainGroupPars {
    fn default() -> Self {
        PowertrainGroupPars {
            engine_torque_curve: HashMap::new(),
            gear_ratios: Vec::new(),
            final_drive: 3.5,
            efficiency: 0.95,
            max_rpm: 15000.0,
            min_rpm: 4000.0,
            shift_time: 0.05,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BrakeGroupPars {
    pub max_brake_force: f64,
    pub brake_bias: f64,
}

impl Default for BrakeGroupPars {
    fn default() -> Self {
        BrakeGroupPars {
            max_brake_force: 20000.0,
            brake_bias: 0.6,
        }
    }
}

/// VehicleFilePars is the JSON shape of a vehicle file.
#[derive(Debug, Deserialize, Clone)]
pub struct VehicleFilePars {
    #[serde(default = "default_vehicle_name")]
    pub name: String,
    #[serde(default)]
    pub mass: MassGroupPars,
    #[serde(default)]
    pub aerodynamics: AeroGroupPars,
    #[serde(default)]
    pub tire: TireGroupPars,
    #[serde(default)]
    pub powertrain: PowertrainGroupPars,
    #[serde(default)]
    pub brake: BrakeGroupPars,
}

/// vehicle_from_json_str decodes and validates the vehicle parameters from their JSON
/// representation. The torque curve arrives as an object with the rpm values as string keys and
/// is sorted by rpm.
pub fn vehicle_from_json_str(json: &str) -> anyhow::Result<VehiclePars> {
    let pars: VehicleFilePars =
        serde_json::from_str(json).context("Failed to parse vehicle JSON!")?;

    let mut curve: Vec<(f64, f64)> = Vec::with_capacity(pars.powertrain.engine_torque_curve.len());

    for (rpm_string, &torque) in pars.powertrain.engine_torque_curve.iter() {
        let rpm: f64 = rpm_string.trim().parse().context(format!(
            "Failed to parse torque curve rpm key {}!",
            rpm_string
        ))?;

        // f64 parsing accepts "NaN" and "inf", both would poison the sort below
        if !rpm.is_finite() {
            return Err(SimError::InvalidVehicle(format!(
                "torque curve rpm key {} is not a finite number",
                rpm_string
            ))
            .into());
        }

        curve.push((rpm, torque));
    }

    curve.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));

    let vehicle = VehiclePars {
        name: pars.name,
        mass: MassPars {
            mass: pars.mass.mass,
            cog_height: pars.mass.cog_height,
            wheelbase: pars.mass.wheelbase,
            weight_distribution: pars.mass.weight_distribution,
        },
        aero: AeroPars {
            cl: pars.aerodynamics.cl,
            cd: pars.aerodynamics.cd,
            frontal_area: pars.aerodynamics.frontal_area,
            air_density: pars.aerodynamics.air_density,
        },
        tire: TirePars {
            mu_x: pars.tire.mu_x,
            mu_y: pars.tire.mu_y,
            load_sensitivity: pars.tire.load_sensitivity,
            tire_radius: pars.tire.tire_radius,
        },
        powertrain: PowertrainPars {
            curve_rpm: curve.iter().map(|entry| entry.0).collect(),
            curve_torque: curve.iter().map(|entry| entry.1).collect(),
            gear_ratios: pars.powertrain.gear_ratios,
            final_drive_ratio: pars.powertrain.final_drive,
            drivetrain_efficiency: pars.powertrain.efficiency,
            min_rpm: pars.powertrain.min_rpm,
            max_rpm: pars.powertrain.max_rpm,
            shift_time: pars.powertrain.shift_time,
        },
        brake: BrakePars {
            max_brake_force: pars.brake.max_brake_force,
            brake_bias: pars.brake.brake_bias,
        },
    };

    vehicle.validate()?;
    Ok(vehicle)
}

/// read_vehicle reads a vehicle parameter file, decodes the JSON content, and validates it.
pub fn read_vehicle(filepath: &Path) -> anyhow::Result<VehiclePars> {
    let content = fs::read_to_string(filepath).context(format!(
        "Failed to open vehicle file {}!",
        filepath.display()
    ))?;

    let vehicle = vehicle_from_json_str(&content)?;

    println!(
        "INFO: Vehicle {} parsed with a mass of {:.1}kg and a power-to-weight ratio of \
        {:.2}hp/kg",
        vehicle.name,
        vehicle.mass.mass,
        vehicle.power_to_weight_ratio()
    );

    Ok(vehicle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::SimError;
    use approx::assert_ulps_eq;

    fn sample_vehicle_json() -> &'static str {
        r#"{
            "name": "F1 Generic",
            "mass": {"mass": 798.0, "cog_height": 0.28, "wheelbase": 3.6, "weight_distribution": 0.46},
            "aerodynamics": {"Cl": -3.2, "Cd": 0.9, "frontal_area": 1.5, "air_density": 1.225},
            "tire": {"mu_x": 1.7, "mu_y": 1.9, "load_sensitivity": 0.9, "tire_radius": 0.33},
            "powertrain": {
                "engine_torque_curve": {"5000": 250.0, "10000": 350.0, "15000": 300.0},
                "gear_ratios": [3.0, 2.2, 1.7, 1.3, 1.0],
                "final_drive": 3.5,
                "efficiency": 0.95,
                "max_rpm": 15000,
                "min_rpm": 4000,
                "shift_time": 0.05
            },
            "brake": {"max_brake_force": 22000.0, "brake_bias": 0.58}
        }"#
    }

    #[test]
    fn test_full_vehicle_json() {
        let vehicle = vehicle_from_json_str(sample_vehicle_json()).unwrap();

        assert_eq!(vehicle.name, "F1 Generic");
        assert_ulps_eq!(vehicle.mass.mass, 798.0);
        assert_ulps_eq!(vehicle.aero.cl, -3.2);
        assert_ulps_eq!(vehicle.tire.mu_y, 1.9);
        assert_ulps_eq!(vehicle.brake.max_brake_force, 22000.0);

        // the torque curve is sorted by rpm regardless of the JSON object order
        assert_eq!(vehicle.powertrain.curve_rpm, vec![5000.0, 10000.0, 15000.0]);
        assert_eq!(
            vehicle.powertrain.curve_torque,
            vec![250.0, 350.0, 300.0]
        );
        assert_eq!(vehicle.powertrain.gear_ratios.len(), 5);
    }

    #[test]
    fn test_missing_groups_fall_back_to_defaults() {
        let json = r#"{
            "name": "Defaults Only",
            "powertrain": {
                "engine_torque_curve": {"6000": 200.0},
                "gear_ratios": [3.0, 2.0, 1.0]
            }
        }"#;

        let vehicle = vehicle_from_json_str(json).unwrap();

        assert_ulps_eq!(vehicle.mass.mass, 800.0);
        assert_ulps_eq!(vehicle.aero.cd, 0.8);
        assert_ulps_eq!(vehicle.tire.mu_x, 1.6);
        assert_ulps_eq!(vehicle.powertrain.final_drive_ratio, 3.5);
        assert_ulps_eq!(vehicle.powertrain.min_rpm, 4000.0);
        assert_ulps_eq!(vehicle.brake.max_brake_force, 20000.0);
    }

    #[test]
    fn test_empty_torque_curve_is_rejected() {
        let json = r#"{
            "name": "No Engine",
            "powertrain": {"gear_ratios": [3.0, 2.0, 1.0]}
        }"#;

        let result = vehicle_from_json_str(json);
        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err().downcast_ref::<SimError>(),
            Some(SimError::InvalidVehicle(_))
        ));
    }

    #[test]
    fn test_non_finite_rpm_key_is_rejected() {
        // "NaN" and "inf" are valid f64 literals for the parser but not valid curve keys
        let json = r#"{
            "powertrain": {
                "engine_torque_curve": {"NaN": 100.0, "5000": 200.0},
                "gear_ratios": [1.0]
            }
        }"#;

        let result = vehicle_from_json_str(json);
        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err().downcast_ref::<SimError>(),
            Some(SimError::InvalidVehicle(_))
        ));
    }

    #[test]
    fn test_invalid_rpm_key_is_rejected() {
        let json = r#"{
            "powertrain": {
                "engine_torque_curve": {"not_a_number": 200.0},
                "gear_ratios": [3.0]
            }
        }"#;

        assert!(vehicle_from_json_str(json).is_err());
    }

    #[test]
    fn test_negative_mass_is_rejected() {
        let json = r#"{
            "mass": {"mass": -5.0},
            "powertrain": {
                "engine_torque_curve": {"6000": 200.0},
                "gear_ratios": [3.0]
            }
        }"#;

        let result = vehicle_from_json_str(json);
        assert!(matches!(
            result.unwrap_err().downcast_ref::<SimError>(),
            Some(SimError::InvalidVehicle(_))
        ));
    }
}
