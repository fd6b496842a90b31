use std::error::Error;
use std::fmt;

/// SimError distinguishes the failure kinds of the simulation core. Constructors and
/// preprocessing fail fast with one of these; the hot-path query methods clamp their inputs
/// numerically instead of raising.
#[derive(Debug, Clone)]
pub enum SimError {
    /// Track has fewer than 3 points or an operation was called before preprocessing.
    InvalidTrack(String),
    /// Vehicle parameters do not fulfill the posed requirements.
    InvalidVehicle(String),
    /// Indexed access beyond bounds.
    OutOfRange(String),
    /// GGV diagram was queried before it was generated.
    GgvNotGenerated,
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SimError::InvalidTrack(msg) => write!(f, "Invalid track: {}", msg),
            SimError::InvalidVehicle(msg) => write!(f, "Invalid vehicle: {}", msg),
            SimError::OutOfRange(msg) => write!(f, "Index out of range: {}", msg),
            SimError::GgvNotGenerated => write!(f, "GGV diagram has not been generated"),
        }
    }
}

impl Error for SimError {}
