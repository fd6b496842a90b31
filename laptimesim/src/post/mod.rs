pub mod lap_result;
pub mod telemetry;
