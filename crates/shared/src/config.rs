use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{ConfigurationError, EnvelopeError};

/// Speed and capture-range configuration for one game.
///
/// This is the mutable, user-facing side. The engine never reads it directly:
/// call [`GameConfig::derive`] to obtain validated [`EnvelopeParams`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub defender_speed: f64,
    pub intruder_speed: f64,
    pub capture_range: f64,
    pub boundary_epsilon: f64,
    pub integration_step: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            defender_speed: DEFAULT_DEFENDER_SPEED,
            intruder_speed: DEFAULT_INTRUDER_SPEED,
            capture_range: DEFAULT_CAPTURE_RANGE,
            boundary_epsilon: BOUNDARY_EPSILON,
            integration_step: INTEGRATION_STEP,
        }
    }
}

impl GameConfig {
    /// Validate the configuration and derive the engine constants.
    ///
    /// Fails with [`EnvelopeError::DomainDegeneracy`] when the defender is not
    /// strictly slower than the intruder, since no curved-phase envelope exists.
    pub fn derive(&self) -> Result<EnvelopeParams, EnvelopeError> {
        positive("defender_speed", self.defender_speed)?;
        positive("intruder_speed", self.intruder_speed)?;
        positive("capture_range", self.capture_range)?;
        if !self.integration_step.is_finite() || self.integration_step == 0.0 {
            return Err(ConfigurationError::InvalidStep(self.integration_step).into());
        }
        if !self.boundary_epsilon.is_finite() || self.boundary_epsilon < 0.0 {
            return Err(ConfigurationError::InvalidEpsilon(self.boundary_epsilon).into());
        }

        let a = self.defender_speed / self.intruder_speed;
        let w = 1.0 / a;
        if w <= 1.0 {
            return Err(EnvelopeError::DomainDegeneracy { w });
        }

        Ok(EnvelopeParams {
            vd: self.defender_speed,
            vi: self.intruder_speed,
            a,
            w,
            r: self.capture_range,
            boundary_epsilon: self.boundary_epsilon,
            integration_step: self.integration_step.abs(),
        })
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigurationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigurationError::NonPositive { name, value })
    }
}

/// Immutable constants derived from a [`GameConfig`].
///
/// Only constructible through [`GameConfig::derive`], so `w > 1` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnvelopeParams {
    vd: f64,
    vi: f64,
    a: f64,
    w: f64,
    r: f64,
    boundary_epsilon: f64,
    integration_step: f64,
}

impl EnvelopeParams {
    /// Defender speed.
    pub fn vd(&self) -> f64 {
        self.vd
    }

    /// Intruder speed.
    pub fn vi(&self) -> f64 {
        self.vi
    }

    /// Defender/intruder speed ratio.
    pub fn a(&self) -> f64 {
        self.a
    }

    /// Inverse speed ratio, always > 1.
    pub fn w(&self) -> f64 {
        self.w
    }

    /// Capture range.
    pub fn r(&self) -> f64 {
        self.r
    }

    pub fn boundary_epsilon(&self) -> f64 {
        self.boundary_epsilon
    }

    pub fn integration_step(&self) -> f64 {
        self.integration_step
    }

    /// Tangency point `s0 = -asin(1/w)` where curved and straight phases meet.
    pub fn tangency(&self) -> f64 {
        -(1.0 / self.w).asin()
    }

    /// `acos(1/w)`, the smallest approach half-angle with a closed-form solution.
    pub fn critical_angle(&self) -> f64 {
        (1.0 / self.w).acos()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_derives() {
        let params = GameConfig::default().derive().unwrap();
        assert!((params.w() - 1.5).abs() < 1e-12);
        assert!((params.a() * params.w() - 1.0).abs() < 1e-12);
        assert_eq!(params.r(), DEFAULT_CAPTURE_RANGE);
        assert_eq!(params.boundary_epsilon(), BOUNDARY_EPSILON);
    }

    #[test]
    fn test_fast_defender_is_degenerate() {
        let config = GameConfig {
            defender_speed: 2.0,
            intruder_speed: 1.0,
            ..Default::default()
        };
        assert_eq!(
            config.derive(),
            Err(EnvelopeError::DomainDegeneracy { w: 0.5 })
        );
    }

    #[test]
    fn test_equal_speeds_are_degenerate() {
        let config = GameConfig {
            defender_speed: 1.0,
            intruder_speed: 1.0,
            ..Default::default()
        };
        assert!(matches!(
            config.derive(),
            Err(EnvelopeError::DomainDegeneracy { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_inputs() {
        let bad_range = GameConfig {
            capture_range: 0.0,
            ..Default::default()
        };
        assert!(bad_range.derive().unwrap_err().is_configuration());

        let bad_step = GameConfig {
            integration_step: 0.0,
            ..Default::default()
        };
        assert_eq!(
            bad_step.derive(),
            Err(EnvelopeError::Configuration(ConfigurationError::InvalidStep(0.0)))
        );

        let bad_speed = GameConfig {
            intruder_speed: f64::NAN,
            ..Default::default()
        };
        assert!(bad_speed.derive().unwrap_err().is_configuration());
    }

    #[test]
    fn test_rederive_without_restart() {
        let slow = GameConfig::default().derive().unwrap();
        let slower = GameConfig {
            defender_speed: 0.5,
            ..Default::default()
        }
        .derive()
        .unwrap();
        assert!((slower.w() - 3.0).abs() < 1e-12);
        assert!((slow.w() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_tangency_and_critical_angle() {
        let params = GameConfig::default().derive().unwrap();
        let s0 = params.tangency();
        assert!((s0.sin() + 1.0 / 1.5).abs() < 1e-12);
        assert!((params.critical_angle().cos() - 1.0 / 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: GameConfig = serde_json::from_str(r#"{"defender_speed": 0.8}"#).unwrap();
        assert_eq!(config.defender_speed, 0.8);
        assert_eq!(config.intruder_speed, DEFAULT_INTRUDER_SPEED);
    }
}
