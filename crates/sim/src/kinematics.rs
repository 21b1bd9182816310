use envelope_shared::{ConfigurationError, EnvelopeParams};
use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::integrator;

/// Defender and intruder positions (or velocities) on the canonical curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvelopePoint {
    pub defender: DVec2,
    pub intruder: DVec2,
}

impl EnvelopePoint {
    pub fn new(defender: DVec2, intruder: DVec2) -> Self {
        Self { defender, intruder }
    }

    pub fn map(&self, f: impl Fn(DVec2) -> DVec2) -> Self {
        Self {
            defender: f(self.defender),
            intruder: f(self.intruder),
        }
    }

    pub fn separation(&self) -> f64 {
        self.defender.distance(self.intruder)
    }
}

/// Closed-form kinematics of the curved-pursuit barrier in its canonical frame.
///
/// Parameterised by the curve parameter `s`; `s` grows backward in time, with
/// the tangency point `s0 = -asin(1/w)` as the terminal event.
#[derive(Debug, Clone, Copy)]
pub struct EnvelopeKinematics<'a> {
    params: &'a EnvelopeParams,
}

impl<'a> EnvelopeKinematics<'a> {
    pub fn new(params: &'a EnvelopeParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &'a EnvelopeParams {
        self.params
    }

    /// `Q(s) = sqrt(1 + w^2 + 2w sin(s))`.
    pub fn q(&self, s: f64) -> Result<f64, ConfigurationError> {
        if !s.is_finite() {
            return Err(ConfigurationError::NonFiniteParameter(s));
        }
        let w = self.params.w();
        let radicand = 1.0 + w * w + 2.0 * w * s.sin();
        if radicand < 0.0 {
            return Err(ConfigurationError::NegativeRadicand { s, radicand });
        }
        Ok(radicand.sqrt())
    }

    /// Optimal defender heading at `s`.
    pub fn phi(&self, s: f64) -> Result<f64, ConfigurationError> {
        let w = self.params.w();
        let q = self.q(s)?;
        let cphi = w * s.cos() / q;
        let sphi = -(1.0 + w * s.sin()) / q;
        Ok(sphi.atan2(cphi))
    }

    /// Optimal intruder heading at `s`.
    pub fn psi(&self, s: f64) -> Result<f64, ConfigurationError> {
        let w = self.params.w();
        let q = self.q(s)?;
        let cpsi = s.cos() / q;
        let spsi = -(w + s.sin()) / q;
        Ok(spsi.atan2(cpsi))
    }

    /// Time-of-flight rate along the curve.
    pub fn dt_ds(&self, s: f64) -> Result<f64, ConfigurationError> {
        let w = self.params.w();
        Ok(self.params.r() * self.q(s)? / ((w * w - 1.0) * self.params.vd()))
    }

    /// Time spent on the curve between the tangency point and `s`.
    ///
    /// The curve starts at the tangency point, so `s` below it is rejected.
    pub fn time_of_flight(&self, s: f64) -> Result<f64, ConfigurationError> {
        let tangency = self.params.tangency();
        if s < tangency {
            return Err(ConfigurationError::BeforeTangency { s, tangency });
        }
        integrator::try_integrate(
            |s, _t| self.dt_ds(s),
            tangency,
            0.0,
            s,
            self.params.integration_step(),
        )
    }

    /// Unanchored position on the canonical curve.
    pub fn core(&self, s: f64) -> EnvelopePoint {
        let w = self.params.w();
        let a = self.params.r() * w / (w * w - 1.0);
        let (sin, cos) = s.sin_cos();
        EnvelopePoint::new(
            DVec2::new(a * sin / w, -a * cos / w + a * s),
            DVec2::new(a * sin * w, -a * cos * w + a * s),
        )
    }

    /// Forward-in-time velocity at `s`.
    pub fn velocity(&self, s: f64) -> Result<EnvelopePoint, ConfigurationError> {
        let w = self.params.w();
        let q = self.q(s)?;
        let (sin, cos) = s.sin_cos();
        let vd = self.params.vd();
        let vi = self.params.vi();
        Ok(EnvelopePoint::new(
            DVec2::new(-vd * cos / q, -vd * (w + sin) / q),
            DVec2::new(-vi * w * cos / q, -vi * (1.0 + w * sin) / q),
        ))
    }

    /// Position anchored so the intruder sits at the origin at the tangency
    /// point, continued in a straight line for `t > 0` after leaving the curve at `s`.
    pub fn analytic(&self, s: f64, t: f64) -> Result<EnvelopePoint, ConfigurationError> {
        self.analytic_from(s, t, self.params.tangency())
    }

    /// [`Self::analytic`] with an explicit anchor parameter `s0`.
    pub fn analytic_from(&self, s: f64, t: f64, s0: f64) -> Result<EnvelopePoint, ConfigurationError> {
        if !s.is_finite() || !s0.is_finite() {
            return Err(ConfigurationError::NonFiniteParameter(if s.is_finite() { s0 } else { s }));
        }
        let r = self.params.r();
        let anchor = self.core(s0);
        let current = self.core(s);

        let mut point = EnvelopePoint::new(
            current.defender - anchor.defender + DVec2::new(-r * s0.sin(), r * s0.cos()),
            current.intruder - anchor.intruder,
        );

        if t > 0.0 {
            let v = self.velocity(s)?;
            point.defender -= v.defender * t;
            point.intruder -= v.intruder * t;
        }
        Ok(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use envelope_shared::GameConfig;

    fn params() -> EnvelopeParams {
        GameConfig::default().derive().unwrap()
    }

    #[test]
    fn test_q_nonnegative_on_valid_interval() {
        let params = params();
        let kin = EnvelopeKinematics::new(&params);
        let bound = (1.0 / params.w()).asin();
        for i in 0..=100 {
            let s = -bound + 2.0 * bound * i as f64 / 100.0;
            assert!(kin.q(s).unwrap() >= 0.0);
        }
        // Radicand minimum is (w - 1)^2.
        let q_min = kin.q(-std::f64::consts::FRAC_PI_2).unwrap();
        assert!((q_min - (params.w() - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_q_rejects_non_finite() {
        let params = params();
        let kin = EnvelopeKinematics::new(&params);
        assert!(matches!(
            kin.q(f64::NAN),
            Err(ConfigurationError::NonFiniteParameter(_))
        ));
        assert!(kin.time_of_flight(f64::INFINITY).is_err());
        assert!(kin.time_of_flight(f64::NAN).is_err());
    }

    #[test]
    fn test_velocity_has_player_speeds() {
        let params = params();
        let kin = EnvelopeKinematics::new(&params);
        for &s in &[-0.7, -0.3, 0.0, 0.3, 0.7] {
            let v = kin.velocity(s).unwrap();
            assert!((v.defender.length() - params.vd()).abs() < 1e-12);
            assert!((v.intruder.length() - params.vi()).abs() < 1e-12);
        }
    }

    #[test]
    fn test_headings_are_unit_directions() {
        let params = params();
        let kin = EnvelopeKinematics::new(&params);
        let s = 0.2;
        let q = kin.q(s).unwrap();
        let w = params.w();
        let phi = kin.phi(s).unwrap();
        assert!((phi.cos() - w * s.cos() / q).abs() < 1e-12);
        let psi = kin.psi(s).unwrap();
        assert!((psi.sin() + (w + s.sin()) / q).abs() < 1e-12);
    }

    #[test]
    fn test_curve_derivative_matches_velocity() {
        // Moving up the curve parameter goes back in time.
        let params = params();
        let kin = EnvelopeKinematics::new(&params);
        let s = 0.1;
        let h = 1e-5;
        let ahead = kin.core(s + h);
        let behind = kin.core(s - h);
        let rate = kin.dt_ds(s).unwrap();
        let v = kin.velocity(s).unwrap();

        let vd = (ahead.defender - behind.defender) / (2.0 * h) / rate;
        let vi = (ahead.intruder - behind.intruder) / (2.0 * h) / rate;
        assert!((vd + v.defender).length() < 1e-6);
        assert!((vi + v.intruder).length() < 1e-6);
    }

    #[test]
    fn test_capture_at_tangency() {
        let params = params();
        let kin = EnvelopeKinematics::new(&params);
        let p = kin.analytic(params.tangency(), 0.0).unwrap();
        assert!(p.intruder.length() < 1e-12);
        assert!((p.separation() - params.r()).abs() < 1e-12);
    }

    #[test]
    fn test_analytic_continuous_in_t() {
        let params = params();
        let kin = EnvelopeKinematics::new(&params);
        for &s in &[-0.5, 0.0, 0.3] {
            let at = kin.analytic(s, 0.0).unwrap();
            let after = kin.analytic(s, 1e-9).unwrap();
            assert!((at.defender - after.defender).length() < 1e-8);
            assert!((at.intruder - after.intruder).length() < 1e-8);
        }
    }

    #[test]
    fn test_analytic_continuous_in_s() {
        let params = params();
        let kin = EnvelopeKinematics::new(&params);
        let s0 = params.tangency();
        let eps = 1e-9;
        for &t in &[0.0, 0.5, 2.0] {
            let below = kin.analytic(s0 - eps, t).unwrap();
            let above = kin.analytic(s0 + eps, t).unwrap();
            assert!((below.defender - above.defender).length() < 1e-6);
            assert!((below.intruder - above.intruder).length() < 1e-6);
        }
    }

    #[test]
    fn test_time_of_flight() {
        let params = params();
        let kin = EnvelopeKinematics::new(&params);
        assert_eq!(kin.time_of_flight(params.tangency()).unwrap(), 0.0);

        assert!(matches!(
            kin.time_of_flight(params.tangency() - 0.01),
            Err(ConfigurationError::BeforeTangency { .. })
        ));

        let t1 = kin.time_of_flight(0.0).unwrap();
        let t2 = kin.time_of_flight(0.3).unwrap();
        assert!(t1 > 0.0);
        assert!(t2 > t1);

        // Intruder arc length over its speed matches the time of flight.
        let s = 0.3;
        let n = 2000;
        let s0 = params.tangency();
        let mut length = 0.0;
        let mut prev = kin.core(s0).intruder;
        for i in 1..=n {
            let p = kin.core(s0 + (s - s0) * i as f64 / n as f64).intruder;
            length += prev.distance(p);
            prev = p;
        }
        assert!((length / params.vi() - t2).abs() < 1e-5);
    }
}
