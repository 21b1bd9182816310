// Default game configuration
pub const DEFAULT_DEFENDER_SPEED: f64 = 1.0;
pub const DEFAULT_INTRUDER_SPEED: f64 = 1.5;
pub const DEFAULT_CAPTURE_RANGE: f64 = 1.0;

// Numerics
/// Margin below which the curved-phase envelope governs the whole geometry.
pub const BOUNDARY_EPSILON: f64 = 1e-6;
/// Fixed RK4 step along the curve parameter.
pub const INTEGRATION_STEP: f64 = 0.02;

// Sampling
pub const DEFAULT_SAMPLE_COUNT: usize = 50;
/// Time after leaving the curve at which the first straight-phase sample is taken.
pub const STRAIGHT_PHASE_OFFSET: f64 = 0.1;
/// Minimum number of samples needed to finite-difference a heading.
pub const MIN_POLICY_SAMPLES: usize = 2;
