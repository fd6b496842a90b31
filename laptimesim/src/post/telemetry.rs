use crate::core::ggv::Ggv;
use crate::post::lap_result::LapResult;
use anyhow::Context;
use serde_json::json;
use std::fmt::Write;
use std::fs;
use std::path::Path;

/// write_telemetry_csv writes one row per simulation state to a CSV file (30 columns, fixed
/// order).
pub fn write_telemetry_csv(result: &LapResult, filepath: &Path) -> anyhow::Result<()> {
    let mut csv = String::new();

    csv.push_str(
        "timestamp_s,arc_length_m,pos_x_m,pos_y_m,pos_z_m,lateral_offset_m,\
        speed_ms,speed_kmh,accel_long_ms2,accel_lat_ms2,accel_vert_ms2,\
        g_long,g_lat,g_vert,g_total,\
        throttle_pct,brake_pct,steering_angle_rad,\
        gear,rpm,engine_torque_nm,wheel_force_n,\
        drag_force_n,downforce_n,tire_force_long_n,tire_force_lat_n,vertical_load_n,\
        curvature_inv_m,radius_m,banking_rad\n",
    );

    for state in result.states().iter() {
        writeln!(
            &mut csv,
            "{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},\
            {:.6},{:.6},{:.6},{:.6},{:.6},{},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},\
            {:.6},{:.6},{:.6}",
            state.timestamp,
            state.s,
            state.x,
            state.y,
            state.z,
            state.n,
            state.v,
            state.v_kmh,
            state.ax,
            state.ay,
            state.az,
            state.gx,
            state.gy,
            state.gz,
            state.g_total,
            state.throttle * 100.0,
            state.brake * 100.0,
            state.steering_angle,
            state.gear,
            state.rpm,
            state.engine_torque,
            state.wheel_force,
            state.drag_force,
            state.downforce,
            state.tire_force_x,
            state.tire_force_y,
            state.vertical_load,
            state.curvature,
            state.radius,
            state.banking_angle,
        )
        .unwrap();
    }

    fs::write(filepath, csv).context(format!(
        "Failed to write telemetry CSV file {}!",
        filepath.display()
    ))?;

    println!("INFO: Telemetry exported to CSV file {}", filepath.display());
    Ok(())
}

/// write_telemetry_json writes the lap time and the full telemetry to a JSON file.
pub fn write_telemetry_json(result: &LapResult, filepath: &Path) -> anyhow::Result<()> {
    let telemetry: Vec<serde_json::Value> = result
        .states()
        .iter()
        .map(|state| {
            json!({
                "timestamp": state.timestamp,
                "position": {"x": state.x, "y": state.y, "z": state.z, "s": state.s},
                "velocity": {"ms": state.v, "kmh": state.v_kmh},
                "acceleration": {
                    "longitudinal": state.ax,
                    "lateral": state.ay,
                    "vertical": state.az,
                },
                "g_forces": {
                    "gx": state.gx,
                    "gy": state.gy,
                    "gz": state.gz,
                    "total": state.g_total,
                },
                "controls": {
                    "throttle_pct": state.throttle * 100.0,
                    "brake_pct": state.brake * 100.0,
                    "steering_rad": state.steering_angle,
                },
                "powertrain": {"gear": state.gear, "rpm": state.rpm},
                "forces": {
                    "drag": state.drag_force,
                    "downforce": state.downforce,
                    "vertical_load": state.vertical_load,
                },
                "track": {
                    "curvature": state.curvature,
                    "radius": state.radius,
                    "banking": state.banking_angle,
                },
            })
        })
        .collect();

    let doc = json!({
        "lap_time_seconds": result.lap_time(),
        "telemetry": telemetry,
    });

    let json_string = serde_json::to_string_pretty(&doc).context("Failed to encode telemetry!")?;

    fs::write(filepath, json_string).context(format!(
        "Failed to write telemetry JSON file {}!",
        filepath.display()
    ))?;

    println!(
        "INFO: Telemetry exported to JSON file {}",
        filepath.display()
    );
    Ok(())
}

/// write_ggv_csv writes the GGV envelope grid to a CSV file (one row per grid node).
pub fn write_ggv_csv(ggv: &Ggv, filepath: &Path) -> anyhow::Result<()> {
    let mut csv = String::new();

    csv.push_str("velocity_ms,lateral_accel_ms2,max_accel_ms2,max_brake_ms2\n");

    for point in ggv.points().iter() {
        writeln!(
            &mut csv,
            "{},{},{},{}",
            point.velocity, point.ay, point.ax_max_accel, point.ax_max_brake
        )
        .unwrap();
    }

    fs::write(filepath, csv).context(format!(
        "Failed to write GGV CSV file {}!",
        filepath.display()
    ))?;

    println!("INFO: GGV diagram exported to CSV file {}", filepath.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::SimulationState;
    use approx::assert_ulps_eq;

    fn sample_result() -> LapResult {
        let mut result = LapResult::new(12.345);

        for i in 0..3 {
            let mut state = SimulationState {
                s: i as f64 * 10.0,
                v: 50.0 + i as f64,
                timestamp: i as f64 * 0.2,
                gear: 4,
                ..SimulationState::default()
            };
            state.v_kmh = state.v * 3.6;
            result.add_state(state);
        }

        result
    }

    #[test]
    fn test_telemetry_csv_layout() {
        let filepath = std::env::temp_dir().join("laptimesim_telemetry_test.csv");
        write_telemetry_csv(&sample_result(), &filepath).unwrap();

        let content = fs::read_to_string(&filepath).unwrap();
        let lines: Vec<&str> = content.lines().collect();

        // header plus one row per state
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("timestamp_s,arc_length_m,pos_x_m"));
        assert!(lines[0].ends_with("curvature_inv_m,radius_m,banking_rad"));
        assert_eq!(lines[0].split(',').count(), 30);
        for line in lines.iter().skip(1) {
            assert_eq!(line.split(',').count(), 30);
        }

        fs::remove_file(&filepath).unwrap();
    }

    #[test]
    fn test_telemetry_json_round_trip() {
        let filepath = std::env::temp_dir().join("laptimesim_telemetry_test.json");
        write_telemetry_json(&sample_result(), &filepath).unwrap();

        let content = fs::read_to_string(&filepath).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&content).unwrap();

        assert_ulps_eq!(doc["lap_time_seconds"].as_f64().unwrap(), 12.345);
        let telemetry = doc["telemetry"].as_array().unwrap();
        assert_eq!(telemetry.len(), 3);
        assert_ulps_eq!(telemetry[1]["velocity"]["ms"].as_f64().unwrap(), 51.0);
        assert_eq!(telemetry[1]["powertrain"]["gear"].as_u64().unwrap(), 4);

        fs::remove_file(&filepath).unwrap();
    }

    #[test]
    fn test_ggv_csv_layout() {
        let vehicle = crate::core::vehicle::sample_vehicle();
        let mut ggv = Ggv::new(&vehicle).unwrap();
        ggv.generate(0.0, 10.0, 1.0, 5.0, 1.0);

        let filepath = std::env::temp_dir().join("laptimesim_ggv_test.csv");
        write_ggv_csv(&ggv, &filepath).unwrap();

        let content = fs::read_to_string(&filepath).unwrap();
        let lines: Vec<&str> = content.lines().collect();

        assert_eq!(
            lines[0],
            "velocity_ms,lateral_accel_ms2,max_accel_ms2,max_brake_ms2"
        );
        assert_eq!(lines.len(), 1 + 11 * 6);

        fs::remove_file(&filepath).unwrap();
    }
}
