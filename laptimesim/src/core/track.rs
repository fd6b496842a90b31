use crate::core::error::SimError;
use helpers::geometry::{Point3d, Vector2d};

/// * `x`, `y`, `z` - (m) Global coordinates of the centerline point (z is the elevation)
/// * `w_tr_left` - (m) Track width left of the centerline
/// * `w_tr_right` - (m) Track width right of the centerline
/// * `banking` - (rad) Banking angle of the track surface
///
/// The remaining fields are derived during preprocessing:
/// * `s` - (m) Arc length from the start line
/// * `psi` - (rad) Heading of the centerline tangent in the x/y plane
/// * `kappa` - (rad/m) Signed curvature (positive = left turn)
/// * `ds` - (m) Segment length to the next point (wrapping at the end)
#[derive(Debug, Clone, Default)]
pub struct TrackPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w_tr_left: f64,
    pub w_tr_right: f64,
    pub banking: f64,
    pub s: f64,
    pub psi: f64,
    pub kappa: f64,
    pub ds: f64,
}

impl TrackPoint {
    pub fn pos(&self) -> Point3d {
        Point3d {
            x: self.x,
            y: self.y,
            z: self.z,
        }
    }
}

/// Track stores the closed centerline polyline of a race track. It is built once (add_point for
/// every raw point, then preprocess) and read-only afterwards.
#[derive(Debug)]
pub struct Track {
    name: String,
    points: Vec<TrackPoint>,
    total_length: f64,
    preprocessed: bool,
}

/// normalize_angle maps an angle to the range (-pi, pi].
fn normalize_angle(angle: f64) -> f64 {
    let mut angle = angle;
    while angle > std::f64::consts::PI {
        angle -= 2.0 * std::f64::consts::PI;
    }
    while angle < -std::f64::consts::PI {
        angle += 2.0 * std::f64::consts::PI;
    }
    angle
}

impl Track {
    pub fn new(name: &str) -> Track {
        Track {
            name: name.to_owned(),
            points: Vec::new(),
            total_length: 0.0,
            preprocessed: false,
        }
    }

    /// The method appends a raw centerline point. Adding a point invalidates a previous
    /// preprocessing run.
    pub fn add_point(&mut self, x: f64, y: f64, z: f64, w_left: f64, w_right: f64, banking: f64) {
        self.points.push(TrackPoint {
            x,
            y,
            z,
            w_tr_left: w_left,
            w_tr_right: w_right,
            banking,
            ..TrackPoint::default()
        });
        self.preprocessed = false;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    pub fn total_length(&self) -> f64 {
        self.total_length
    }

    pub fn is_preprocessed(&self) -> bool {
        self.preprocessed
    }

    /// The method returns the track point with the given index.
    pub fn point(&self, idx: usize) -> Result<&TrackPoint, SimError> {
        self.points.get(idx).ok_or_else(|| {
            SimError::OutOfRange(format!(
                "track point index {} exceeds the number of points {}",
                idx,
                self.points.len()
            ))
        })
    }

    /// The method derives arc length, heading, and curvature for the closed centerline. It must
    /// be called once after all raw points were added and before any interpolation query.
    pub fn preprocess(&mut self) -> Result<(), SimError> {
        if self.points.len() < 3 {
            return Err(SimError::InvalidTrack(
                "track must have at least 3 points for preprocessing".to_owned(),
            ));
        }

        self.calc_arc_length();
        self.calc_heading();
        self.calc_curvature();

        self.preprocessed = true;
        Ok(())
    }

    /// Cumulative 3D arc length (elevation included). The wrap segment connects the last point
    /// back to the first one such that sum(ds) equals the total track length.
    fn calc_arc_length(&mut self) {
        self.points[0].s = 0.0;

        for i in 1..self.points.len() {
            let segment_length = self.points[i].pos().dist_to(&self.points[i - 1].pos());
            self.points[i - 1].ds = segment_length;
            self.points[i].s = self.points[i - 1].s + segment_length;
        }

        // close the loop: last point connects to the first one
        let last = self.points.len() - 1;
        self.points[last].ds = self.points[last].pos().dist_to(&self.points[0].pos());
        self.total_length = self.points[last].s + self.points[last].ds;
    }

    /// Heading via central difference of the planar coordinates with cyclic wrap.
    fn calc_heading(&mut self) {
        let n = self.points.len();

        for i in 0..n {
            let i_prev = if i == 0 { n - 1 } else { i - 1 };
            let i_next = if i == n - 1 { 0 } else { i + 1 };

            let chord = Vector2d {
                dx: self.points[i_next].x - self.points[i_prev].x,
                dy: self.points[i_next].y - self.points[i_prev].y,
            };
            self.points[i].psi = chord.angle();
        }
    }

    /// Curvature kappa = dpsi/ds via central difference, with wrap correction of the arc length
    /// at the start/finish boundary.
    fn calc_curvature(&mut self) {
        let n = self.points.len();

        for i in 0..n {
            let i_prev = if i == 0 { n - 1 } else { i - 1 };
            let i_next = if i == n - 1 { 0 } else { i + 1 };

            let dpsi = normalize_angle(self.points[i_next].psi - self.points[i_prev].psi);

            let mut ds = self.points[i_next].s - self.points[i_prev].s;
            if ds < 0.0 {
                ds += self.total_length;
            }

            self.points[i].kappa = if ds > 1e-6 { dpsi / ds } else { 0.0 };
        }
    }

    fn check_preprocessed(&self) -> Result<(), SimError> {
        if !self.preprocessed {
            return Err(SimError::InvalidTrack(
                "track must be preprocessed before querying".to_owned(),
            ));
        }
        Ok(())
    }

    /// find_index_at returns the index of the point at or just before the inserted arc length
    /// (binary search, s must already be normalized to [0, total_length)).
    fn find_index_at(&self, s: f64) -> usize {
        let idx = self.points.partition_point(|p| p.s <= s);
        idx.saturating_sub(1)
    }

    /// The method returns the track state at an arbitrary arc length by linear interpolation
    /// between the two neighboring points. The heading is interpolated with wraparound handling.
    pub fn interpolate_at(&self, s: f64) -> Result<TrackPoint, SimError> {
        self.check_preprocessed()?;

        let s = s.rem_euclid(self.total_length);

        let i = self.find_index_at(s);
        let i_next = (i + 1) % self.points.len();

        let p1 = &self.points[i];
        let p2 = &self.points[i_next];

        let t = if p1.ds > 1e-6 { (s - p1.s) / p1.ds } else { 0.0 };
        let t = t.clamp(0.0, 1.0);

        let dpsi = normalize_angle(p2.psi - p1.psi);

        Ok(TrackPoint {
            x: p1.x + t * (p2.x - p1.x),
            y: p1.y + t * (p2.y - p1.y),
            z: p1.z + t * (p2.z - p1.z),
            w_tr_left: p1.w_tr_left + t * (p2.w_tr_left - p1.w_tr_left),
            w_tr_right: p1.w_tr_right + t * (p2.w_tr_right - p1.w_tr_right),
            banking: p1.banking + t * (p2.banking - p1.banking),
            s,
            psi: normalize_angle(p1.psi + t * dpsi),
            kappa: p1.kappa + t * (p2.kappa - p1.kappa),
            ds: p1.ds,
        })
    }

    /// The method returns the interpolated curvature at an arbitrary arc length.
    pub fn curvature_at(&self, s: f64) -> Result<f64, SimError> {
        self.check_preprocessed()?;

        let s = s.rem_euclid(self.total_length);

        let i = self.find_index_at(s);
        let i_next = (i + 1) % self.points.len();

        let p1 = &self.points[i];
        let p2 = &self.points[i_next];

        let t = if p1.ds > 1e-6 { (s - p1.s) / p1.ds } else { 0.0 };
        let t = t.clamp(0.0, 1.0);

        Ok(p1.kappa + t * (p2.kappa - p1.kappa))
    }

    /// The method checks whether a lateral offset n is within the track boundaries at the given
    /// arc length (n > 0 is left of the centerline).
    pub fn is_within_bounds(&self, s: f64, n: f64) -> Result<bool, SimError> {
        let point = self.interpolate_at(s)?;
        Ok(-point.w_tr_right <= n && n <= point.w_tr_left)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_ulps_eq;

    fn straight_track(n: usize, spacing: f64) -> Track {
        let mut track = Track::new("straight");
        for i in 0..n {
            track.add_point(i as f64 * spacing, 0.0, 0.0, 5.0, 5.0, 0.0);
        }
        track
    }

    fn circle_track(radius: f64, n: usize) -> Track {
        let mut track = Track::new("circle");
        for i in 0..n {
            let theta = 2.0 * std::f64::consts::PI * i as f64 / n as f64;
            track.add_point(
                radius * theta.cos(),
                radius * theta.sin(),
                0.0,
                5.0,
                5.0,
                0.0,
            );
        }
        track
    }

    #[test]
    fn test_preprocess_requires_three_points() {
        let mut track = Track::new("degenerate");
        track.add_point(0.0, 0.0, 0.0, 5.0, 5.0, 0.0);
        track.add_point(10.0, 0.0, 0.0, 5.0, 5.0, 0.0);
        assert!(matches!(
            track.preprocess(),
            Err(SimError::InvalidTrack(_))
        ));
    }

    #[test]
    fn test_queries_require_preprocessing() {
        let track = straight_track(5, 10.0);
        assert!(matches!(
            track.interpolate_at(5.0),
            Err(SimError::InvalidTrack(_))
        ));
        assert!(matches!(
            track.curvature_at(5.0),
            Err(SimError::InvalidTrack(_))
        ));
        assert!(matches!(
            track.is_within_bounds(5.0, 0.0),
            Err(SimError::InvalidTrack(_))
        ));
    }

    #[test]
    fn test_point_out_of_range() {
        let mut track = straight_track(5, 10.0);
        track.preprocess().unwrap();
        assert!(track.point(4).is_ok());
        assert!(matches!(track.point(5), Err(SimError::OutOfRange(_))));
    }

    #[test]
    fn test_arc_length_monotonic_and_closed() {
        let mut track = circle_track(100.0, 90);
        track.preprocess().unwrap();

        let mut ds_sum = 0.0;
        for i in 0..track.num_points() {
            let p = track.point(i).unwrap();
            if i + 1 < track.num_points() {
                assert!(p.s < track.point(i + 1).unwrap().s);
            }
            ds_sum += p.ds;
        }

        let last = track.point(track.num_points() - 1).unwrap().clone();
        assert_ulps_eq!(last.s + last.ds, track.total_length(), max_ulps = 10);
        assert_ulps_eq!(ds_sum, track.total_length(), epsilon = 1e-9);
    }

    #[test]
    fn test_closed_loop_wrap_segment() {
        let mut track = circle_track(100.0, 64);
        track.preprocess().unwrap();

        let first = track.point(0).unwrap().pos();
        let last = track.point(63).unwrap().clone();
        assert!((last.pos().dist_to(&first) - last.ds).abs() < 1e-9);
    }

    #[test]
    fn test_straight_line_curvature_is_zero_in_the_interior() {
        let mut track = straight_track(21, 10.0);
        track.preprocess().unwrap();

        // points adjacent to the seam see the heading flip of the closing segment, the inner
        // points must be perfectly straight
        for i in 2..track.num_points() - 2 {
            assert!(track.point(i).unwrap().kappa.abs() < 1e-9);
        }
    }

    #[test]
    fn test_circle_curvature_matches_radius() {
        let radius = 100.0;
        let mut track = circle_track(radius, 64);
        track.preprocess().unwrap();

        let kappa_ref = 1.0 / radius;
        for i in 0..track.num_points() {
            let kappa = track.point(i).unwrap().kappa;
            // counterclockwise sampling means a left turn, i.e. positive curvature
            assert!(kappa > 0.0);
            assert!((kappa - kappa_ref).abs() / kappa_ref < 1e-2);
        }
    }

    #[test]
    fn test_interpolation_between_points() {
        let mut track = straight_track(11, 10.0);
        track.preprocess().unwrap();

        let p = track.interpolate_at(25.0).unwrap();
        assert_ulps_eq!(p.x, 25.0, epsilon = 1e-9);
        assert_ulps_eq!(p.y, 0.0);
        assert_ulps_eq!(p.s, 25.0);
    }

    #[test]
    fn test_interpolation_wraps_arc_length() {
        let mut track = circle_track(100.0, 90);
        track.preprocess().unwrap();

        let length = track.total_length();
        let p1 = track.interpolate_at(-1.0).unwrap();
        let p2 = track.interpolate_at(length - 1.0).unwrap();
        assert_ulps_eq!(p1.x, p2.x, epsilon = 1e-9);
        assert_ulps_eq!(p1.y, p2.y, epsilon = 1e-9);
    }

    #[test]
    fn test_curvature_at_matches_point_values() {
        let mut track = circle_track(100.0, 90);
        track.preprocess().unwrap();

        let p3 = track.point(3).unwrap().clone();
        assert_ulps_eq!(track.curvature_at(p3.s).unwrap(), p3.kappa, epsilon = 1e-12);
    }

    #[test]
    fn test_within_bounds() {
        let mut track = straight_track(11, 10.0);
        track.preprocess().unwrap();

        assert!(track.is_within_bounds(50.0, 0.0).unwrap());
        assert!(track.is_within_bounds(50.0, 4.9).unwrap());
        assert!(track.is_within_bounds(50.0, -4.9).unwrap());
        assert!(!track.is_within_bounds(50.0, 5.1).unwrap());
        assert!(!track.is_within_bounds(50.0, -5.1).unwrap());
    }
}
