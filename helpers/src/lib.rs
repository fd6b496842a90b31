pub mod general;
pub mod geometry;

#[cfg(test)]
mod general_tests {
    use crate::general::{argmax, interp_clamped};
    use approx::assert_ulps_eq;

    #[test]
    fn test_argmax_1() {
        let x: Vec<i32> = vec![3, -1, 5, 8, -2];
        assert_eq!(argmax(&x), 3);
    }
    #[test]
    fn test_argmax_2() {
        let x: Vec<f64> = vec![3.0, -1.0, 5.0, 8.0, -2.0];
        assert_eq!(argmax(&x), 3);
    }
    #[test]
    fn test_argmax_takes_the_first_maximum() {
        let x: Vec<i32> = vec![1, 5, 5, 2];
        assert_eq!(argmax(&x), 1);
    }

    #[test]
    fn test_interp_clamped_1() {
        let xp: Vec<f64> = vec![-5.0, 0.0, 5.0, 10.0];
        let fp: Vec<f64> = vec![1.0, 2.0, 1.0, 0.0];
        assert_ulps_eq!(interp_clamped(-2.5, &xp, &fp), 1.5);
    }
    #[test]
    fn test_interp_clamped_2() {
        let xp: Vec<f64> = vec![-5.0, 0.0, 5.0, 10.0];
        let fp: Vec<f64> = vec![1.0, 2.0, 1.0, 0.0];
        assert_ulps_eq!(interp_clamped(7.5, &xp, &fp), 0.5);
    }
    #[test]
    fn test_interp_clamped_3() {
        let xp: Vec<f64> = vec![-5.0, 0.0, 5.0, 10.0];
        let fp: Vec<f64> = vec![-1.0, -2.0, -1.0, 0.0];
        assert_ulps_eq!(interp_clamped(7.5, &xp, &fp), -0.5);
    }
    #[test]
    fn test_interp_clamped_at_sample_points() {
        let xp: Vec<f64> = vec![-5.0, 0.0, 5.0, 10.0];
        let fp: Vec<f64> = vec![1.0, 2.0, 1.0, 0.0];
        assert_ulps_eq!(interp_clamped(-5.0, &xp, &fp), 1.0);
        assert_ulps_eq!(interp_clamped(5.0, &xp, &fp), 1.0);
    }
    #[test]
    fn test_interp_clamped_outside_the_range() {
        let xp: Vec<f64> = vec![1000.0, 2000.0, 3000.0];
        let fp: Vec<f64> = vec![100.0, 200.0, 150.0];
        assert_ulps_eq!(interp_clamped(500.0, &xp, &fp), 100.0);
        assert_ulps_eq!(interp_clamped(5000.0, &xp, &fp), 150.0);
    }
}
