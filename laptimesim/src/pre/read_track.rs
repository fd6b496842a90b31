use crate::core::error::SimError;
use crate::core::track::Track;
use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::Path;

fn default_track_name() -> String {
    "Unnamed Track".to_owned()
}

fn default_track_width() -> f64 {
    5.0
}

/// * `x` / `y` - (m) Planar coordinates of the centerline point
/// * `elevation` - (m) Elevation, defaults to 0
/// * `w_tr_left` / `w_tr_right` - (m) Track widths, default to 5
/// * `banking` - (rad) Banking angle, defaults to 0
#[derive(Debug, Deserialize, Clone)]
pub struct TrackPointPars {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub elevation: f64,
    #[serde(default = "default_track_width")]
    pub w_tr_left: f64,
    #[serde(default = "default_track_width")]
    pub w_tr_right: f64,
    #[serde(default)]
    pub banking: f64,
}

/// TrackPars is the JSON shape of a track file.
#[derive(Debug, Deserialize, Clone)]
pub struct TrackPars {
    #[serde(default = "default_track_name")]
    pub name: String,
    pub points: Vec<TrackPointPars>,
}

/// track_from_json_str decodes a track from its JSON representation and preprocesses it.
pub fn track_from_json_str(json: &str) -> anyhow::Result<Track> {
    let pars: TrackPars = serde_json::from_str(json).context("Failed to parse track JSON!")?;

    let mut track = Track::new(&pars.name);

    for point in pars.points.iter() {
        track.add_point(
            point.x,
            point.y,
            point.elevation,
            point.w_tr_left,
            point.w_tr_right,
            point.banking,
        );
    }

    track.preprocess()?;
    Ok(track)
}

/// track_from_csv_str decodes a track from the TUMFTM CSV format (x_m, y_m, w_tr_right_m,
/// w_tr_left_m per row, comment lines start with #) and preprocesses it.
pub fn track_from_csv_str(name: &str, content: &str) -> Result<Track, SimError> {
    let mut track = Track::new(name);

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let values: Vec<f64> = line
            .split(',')
            .filter_map(|token| token.trim().parse().ok())
            .collect();

        if values.len() >= 4 {
            // column order of the format: right width before left width
            track.add_point(values[0], values[1], 0.0, values[3], values[2], 0.0);
        }
    }

    if track.num_points() == 0 {
        return Err(SimError::InvalidTrack(
            "no valid track points found in the CSV file".to_owned(),
        ));
    }

    track.preprocess()?;
    Ok(track)
}

/// read_track reads a track file and decodes it based on its extension (.csv is treated as
/// TUMFTM CSV, everything else as JSON).
pub fn read_track(filepath: &Path) -> anyhow::Result<Track> {
    let content = fs::read_to_string(filepath).context(format!(
        "Failed to open track file {}!",
        filepath.display()
    ))?;

    let is_csv = filepath
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("csv"));

    let track = if is_csv {
        let name = filepath
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("Unnamed Track");
        track_from_csv_str(name, &content)?
    } else {
        track_from_json_str(&content)?
    };

    println!(
        "INFO: Track {} preprocessed with {} points and a total length of {:.1}m",
        track.name(),
        track.num_points(),
        track.total_length()
    );

    Ok(track)
}
