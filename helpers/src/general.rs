use std::error::Error;
use std::fmt;

/// OptionValueError marks a command line option whose value lies outside the permitted range.
/// The surrounding error context names the offending option and value.
#[derive(Debug, Clone, Default)]
pub struct OptionValueError;

impl fmt::Display for OptionValueError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("option value outside the permitted range")
    }
}

impl Error for OptionValueError {}

/// argmax returns the index of the largest value in x (the first one if the maximum occurs more
/// than once). x must not be empty.
pub fn argmax<T: PartialOrd>(x: &[T]) -> usize {
    let mut idx_max = 0;

    for (idx, val) in x.iter().enumerate().skip(1) {
        if *val > x[idx_max] {
            idx_max = idx;
        }
    }

    idx_max
}

/// interp_clamped returns the linearly interpolated value at x for the sampled curve (xp, fp),
/// with xp increasing. Outside the sampled range the nearest endpoint value is returned instead
/// of extrapolating.
pub fn interp_clamped(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    assert_eq!(
        xp.len(),
        fp.len(),
        "xp and fp must have the same number of samples"
    );

    let idx = xp.partition_point(|&sample| sample < x);

    if idx == 0 {
        return fp[0];
    }
    if idx == xp.len() {
        return fp[xp.len() - 1];
    }

    let t = (x - xp[idx - 1]) / (xp[idx] - xp[idx - 1]);
    fp[idx - 1] + t * (fp[idx] - fp[idx - 1])
}
