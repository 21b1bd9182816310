use thiserror::Error;

/// Engagement or game parameters fall outside the closed-form domain.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("delta {delta} exceeds the closed-form margin gmm - acos(1/w) = {margin}")]
    DeltaExceedsMargin { delta: f64, margin: f64 },
    #[error("Q(s) radicand is negative at s = {s}: {radicand}")]
    NegativeRadicand { s: f64, radicand: f64 },
    #[error("curve parameter {s} lies before the tangency point {tangency}")]
    BeforeTangency { s: f64, tangency: f64 },
    #[error("curve parameter must be finite, got {0}")]
    NonFiniteParameter(f64),
    #[error("{name} must be finite and positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },
    #[error("integration step must be finite and non-zero, got {0}")]
    InvalidStep(f64),
    #[error("boundary epsilon must be finite and non-negative, got {0}")]
    InvalidEpsilon(f64),
    #[error("straight-phase duration must be finite and non-negative, got {0}")]
    InvalidDuration(f64),
    #[error("need at least {min} samples, got {got}")]
    TooFewSamples { got: usize, min: usize },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnvelopeError {
    #[error("invalid configuration: {0}")]
    Configuration(#[from] ConfigurationError),
    /// The curved-phase envelope only exists when the defender is strictly slower.
    #[error("defender is not slower than the intruder (w = {w}, need w > 1)")]
    DomainDegeneracy { w: f64 },
}

impl EnvelopeError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, EnvelopeError::Configuration(_))
    }
}
