use std::f64::consts::FRAC_PI_2;

use envelope_shared::ConfigurationError;
use glam::{DMat2, DVec2};

use crate::kinematics::{EnvelopeKinematics, EnvelopePoint};

/// Reflect `point` across the line through the origin with slope `k`.
///
/// An infinite slope reflects across the vertical axis.
pub fn mirror(point: DVec2, k: f64) -> DVec2 {
    mirror_across(point, k.atan())
}

/// Reflect `point` across the line through the origin at angle `theta`.
pub fn mirror_across(point: DVec2, theta: f64) -> DVec2 {
    // Householder: p - 2 (p . n) n with n the unit normal of the line.
    let normal = DVec2::new(-theta.sin(), theta.cos());
    point - 2.0 * point.dot(normal) * normal
}

/// Rotate `point` about the origin by `angle`.
pub fn rotate_point(point: DVec2, angle: f64) -> DVec2 {
    DMat2::from_angle(angle) * point
}

/// Place the canonical solution at `(s, t)` into the engagement frame by a
/// rotation of `pi/2 + delta`.
pub fn rotate(
    kinematics: &EnvelopeKinematics<'_>,
    s: f64,
    t: f64,
    delta: f64,
) -> Result<EnvelopePoint, ConfigurationError> {
    let angle = FRAC_PI_2 + delta;
    Ok(kinematics.analytic(s, t)?.map(|p| rotate_point(p, angle)))
}
