use crate::core::error::SimError;
use crate::core::vehicle::PowertrainPars;
use helpers::general::argmax;

/// PowertrainModel converts engine torque through the gearing into a driving force at the
/// contact patch. Gears are 1-indexed with gear 1 being the shortest (highest) ratio.
#[derive(Debug)]
pub struct PowertrainModel {
    pars: PowertrainPars,
    tire_radius: f64,
}

impl PowertrainModel {
    pub fn new(pars: &PowertrainPars, tire_radius: f64) -> Result<PowertrainModel, SimError> {
        if tire_radius <= 0.0 {
            return Err(SimError::InvalidVehicle(
                "tire_radius must be positive".to_owned(),
            ));
        }

        Ok(PowertrainModel {
            pars: pars.to_owned(),
            tire_radius,
        })
    }

    pub fn is_valid_gear(&self, gear: usize) -> bool {
        gear >= 1 && gear <= self.pars.gear_ratios.len()
    }

    /// Combined ratio of the inserted gear and the final drive (zero for an invalid gear).
    pub fn total_gear_ratio(&self, gear: usize) -> f64 {
        if !self.is_valid_gear(gear) {
            return 0.0;
        }
        self.pars.gear_ratios[gear - 1] * self.pars.final_drive_ratio
    }

    /// The method returns the engine speed in rpm for the inserted velocity and gear.
    pub fn rpm(&self, v: f64, gear: usize) -> f64 {
        if !self.is_valid_gear(gear) {
            return 0.0;
        }

        let wheel_angular_velocity = v / self.tire_radius;
        let engine_angular_velocity = wheel_angular_velocity * self.total_gear_ratio(gear);

        engine_angular_velocity * 60.0 / (2.0 * std::f64::consts::PI)
    }

    /// The method returns the engine torque at the inserted engine speed.
    pub fn engine_torque(&self, rpm: f64) -> f64 {
        self.pars.torque_at(rpm)
    }

    /// The method returns the driving force at the contact patch for the inserted velocity and
    /// gear. Outside the engine operating band the force is zero.
    pub fn wheel_force(&self, v: f64, gear: usize) -> f64 {
        if !self.is_valid_gear(gear) || v <= 0.0 {
            return 0.0;
        }

        let rpm = self.rpm(v, gear);

        if rpm < self.pars.min_rpm || rpm > self.pars.max_rpm {
            return 0.0;
        }

        let wheel_torque =
            self.engine_torque(rpm) * self.total_gear_ratio(gear) * self.pars.drivetrain_efficiency;

        wheel_torque / self.tire_radius
    }

    /// The method returns the best driving force over all gears at the inserted velocity.
    pub fn max_wheel_force(&self, v: f64) -> f64 {
        if v <= 0.0 {
            // at standstill use first gear just above zero velocity
            return self.wheel_force(0.01, 1);
        }

        (1..=self.pars.gear_ratios.len())
            .map(|gear| self.wheel_force(v, gear))
            .fold(0.0, f64::max)
    }

    /// The method returns the engine speed at which the engine power T * omega is maximal over
    /// the torque curve entries.
    pub fn peak_power_rpm(&self) -> f64 {
        if self.pars.curve_rpm.is_empty() {
            return 0.0;
        }

        let powers: Vec<f64> = self
            .pars
            .curve_rpm
            .iter()
            .zip(self.pars.curve_torque.iter())
            .map(|(&rpm, &torque)| torque * rpm * 2.0 * std::f64::consts::PI / 60.0)
            .collect();

        self.pars.curve_rpm[argmax(&powers)]
    }

    /// The method returns the efficiency-scaled peak engine power in W.
    pub fn max_power(&self) -> f64 {
        self.pars
            .curve_rpm
            .iter()
            .zip(self.pars.curve_torque.iter())
            .map(|(&rpm, &torque)| torque * rpm * 2.0 * std::f64::consts::PI / 60.0)
            .fold(0.0, f64::max)
            * self.pars.drivetrain_efficiency
    }

    /// Power delivered at the contact patch for the inserted velocity and gear.
    pub fn wheel_power(&self, v: f64, gear: usize) -> f64 {
        self.wheel_force(v, gear) * v
    }

    /// The method selects the gear for the inserted velocity. It scans from the highest to the
    /// lowest gear and picks the first one that keeps the engine in the upper power band (70 %
    /// of max_rpm and above). If no gear reaches the power band, any gear within the operating
    /// band is accepted, with first gear as the last resort.
    pub fn optimal_gear(&self, v: f64) -> usize {
        if v <= 0.1 || self.pars.gear_ratios.is_empty() {
            return 1;
        }

        let optimal_rpm_low = self.pars.max_rpm * 0.70;

        for gear in (1..=self.pars.gear_ratios.len()).rev() {
            let rpm = self.rpm(v, gear);
            if rpm >= self.pars.min_rpm && rpm <= self.pars.max_rpm && rpm >= optimal_rpm_low {
                return gear;
            }
        }

        for gear in 1..=self.pars.gear_ratios.len() {
            let rpm = self.rpm(v, gear);
            if rpm >= self.pars.min_rpm && rpm <= self.pars.max_rpm {
                return gear;
            }
        }

        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vehicle::sample_vehicle;
    use approx::assert_ulps_eq;

    fn powertrain_model() -> PowertrainModel {
        let vehicle = sample_vehicle();
        PowertrainModel::new(&vehicle.powertrain, vehicle.tire.tire_radius).unwrap()
    }

    #[test]
    fn test_new_rejects_nonpositive_tire_radius() {
        let vehicle = sample_vehicle();
        assert!(matches!(
            PowertrainModel::new(&vehicle.powertrain, 0.0),
            Err(SimError::InvalidVehicle(_))
        ));
    }

    #[test]
    fn test_rpm_round_trip_for_every_gear() {
        let model = powertrain_model();
        let vehicle = sample_vehicle();

        for gear in 1..=vehicle.powertrain.gear_ratios.len() {
            let ratio = vehicle.powertrain.gear_ratios[gear - 1] * 3.5;
            // velocity that corresponds to 8000 rpm in this gear
            let v = 8000.0 * 2.0 * std::f64::consts::PI / 60.0 / ratio * 0.3;
            assert_ulps_eq!(model.rpm(v, gear), 8000.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_rpm_invalid_gear() {
        let model = powertrain_model();
        assert_ulps_eq!(model.rpm(50.0, 0), 0.0);
        assert_ulps_eq!(model.rpm(50.0, 6), 0.0);
    }

    #[test]
    fn test_wheel_force_outside_operating_band_is_zero() {
        let model = powertrain_model();
        // 10 m/s in the tallest gear is far below min_rpm
        assert_ulps_eq!(model.wheel_force(10.0, 5), 0.0);
        // 60 m/s in first gear exceeds max_rpm
        assert_ulps_eq!(model.wheel_force(60.0, 1), 0.0);
        assert_ulps_eq!(model.wheel_force(0.0, 1), 0.0);
    }

    #[test]
    fn test_wheel_force_follows_torque_and_gearing() {
        let model = powertrain_model();
        let v = 50.0;

        for gear in 1..=5 {
            let force = model.wheel_force(v, gear);
            let rpm = model.rpm(v, gear);

            if rpm < 4000.0 || rpm > 15000.0 {
                assert_ulps_eq!(force, 0.0);
            } else {
                let expected =
                    model.engine_torque(rpm) * model.total_gear_ratio(gear) * 0.95 / 0.3;
                assert_ulps_eq!(force, expected, epsilon = 1e-9);
                assert!(force > 0.0);
            }
        }
    }

    #[test]
    fn test_max_wheel_force_dominates_all_gears() {
        let model = powertrain_model();
        let v = 50.0;
        let f_max = model.max_wheel_force(v);

        assert!(f_max > 0.0);
        for gear in 1..=5 {
            assert!(f_max >= model.wheel_force(v, gear));
        }
    }

    #[test]
    fn test_peak_power_rpm() {
        let model = powertrain_model();
        // the sample curve delivers its peak power at the topmost entry
        assert_ulps_eq!(model.peak_power_rpm(), 15000.0);
    }

    #[test]
    fn test_max_power() {
        let model = powertrain_model();
        let expected = 300.0 * 15000.0 * 2.0 * std::f64::consts::PI / 60.0 * 0.95;
        assert_ulps_eq!(model.max_power(), expected, epsilon = 1e-9);
    }

    #[test]
    fn test_optimal_gear_prefers_the_power_band() {
        let model = powertrain_model();
        // at 80 m/s the 4th gear is the highest one that stays above 70 % of max_rpm
        assert_eq!(model.optimal_gear(80.0), 4);
        // at walking pace no gear is in the operating band, fall back to first gear
        assert_eq!(model.optimal_gear(2.0), 1);
        assert_eq!(model.optimal_gear(0.0), 1);
    }

    #[test]
    fn test_wheel_power() {
        let model = powertrain_model();
        let v = 50.0;
        assert_ulps_eq!(
            model.wheel_power(v, 3),
            model.wheel_force(v, 3) * v,
            epsilon = 1e-9
        );
    }
}
