use std::f64::consts::FRAC_PI_2;

use envelope_shared::*;
use glam::DVec2;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::frame;
use crate::kinematics::{EnvelopeKinematics, EnvelopePoint};

/// Where along the optimal trajectory an elapsed time falls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Phase {
    /// Still on the barrier curve.
    Curved,
    /// Left the curve `ts` ago and moving in straight lines.
    Straight { ts: f64 },
}

impl Phase {
    /// Classify total elapsed time `t` against the curved time of flight `tc`.
    pub fn classify(t: f64, tc: f64) -> Self {
        let ts = t - tc;
        if ts > 0.0 {
            Phase::Straight { ts }
        } else {
            Phase::Curved
        }
    }

    pub fn straight_time(&self) -> f64 {
        match *self {
            Phase::Curved => 0.0,
            Phase::Straight { ts } => ts,
        }
    }
}

/// Which closed form governs defender-1 and the intruder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Solution {
    /// `delta` sits on its bound: the rotated barrier curve.
    Envelope,
    /// Slack left in `delta`: straight-line projection from the origin.
    Ballistic,
}

impl Solution {
    pub fn select(slack: f64, epsilon: f64) -> Self {
        if slack < epsilon {
            Solution::Envelope
        } else {
            Solution::Ballistic
        }
    }
}

/// Result of composing one engagement at one elapsed time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Composition {
    pub positions: PlayerPositions,
    pub phase: Phase,
    pub solution: Solution,
    /// Time of flight from the tangency point to `s`.
    pub curved_time: f64,
    /// Elapsed time actually used, never less than `curved_time`.
    pub elapsed: f64,
}

/// Places the three players for one engagement and one elapsed time.
#[derive(Debug, Clone, Copy)]
pub struct EngagementComposer<'a> {
    kinematics: EnvelopeKinematics<'a>,
}

impl<'a> EngagementComposer<'a> {
    pub fn new(params: &'a EnvelopeParams) -> Self {
        Self {
            kinematics: EnvelopeKinematics::new(params),
        }
    }

    pub fn kinematics(&self) -> &EnvelopeKinematics<'a> {
        &self.kinematics
    }

    pub fn params(&self) -> &'a EnvelopeParams {
        self.kinematics.params()
    }

    /// Positions at curve parameter `s` and total elapsed time `t`.
    ///
    /// A `t` shorter than the time of flight to `s` is clamped to it.
    pub fn compose(
        &self,
        s: f64,
        t: f64,
        config: &EngagementConfig,
    ) -> Result<Composition, EnvelopeError> {
        let slack = config.validate(self.params())?;
        let tc = self.kinematics.time_of_flight(s)?;
        self.compose_at(s, t, tc, slack, config)
    }

    /// [`Self::compose`] with a precomputed time of flight and validated slack.
    pub(crate) fn compose_at(
        &self,
        s: f64,
        t: f64,
        tc: f64,
        slack: f64,
        config: &EngagementConfig,
    ) -> Result<Composition, EnvelopeError> {
        let phase = Phase::classify(t, tc);
        let elapsed = match phase {
            Phase::Curved => tc,
            Phase::Straight { .. } => t,
        };
        let solution = Solution::select(slack, self.params().boundary_epsilon());

        let pair = match solution {
            Solution::Envelope => frame::rotate(
                &self.kinematics,
                s,
                phase.straight_time(),
                config.delta + config.d,
            )?,
            Solution::Ballistic => self.ballistic(elapsed, config),
        };

        let positions = PlayerPositions {
            defender1: pair.defender,
            intruder: pair.intruder,
            defender2: self.far_defender(elapsed, config),
        };
        trace!(s, t, elapsed, ?phase, ?solution, "composed engagement");

        Ok(Composition {
            positions,
            phase,
            solution,
            curved_time: tc,
            elapsed,
        })
    }

    /// Straight-line projection of defender-1 and the intruder from the origin.
    pub fn ballistic(&self, t: f64, config: &EngagementConfig) -> EnvelopePoint {
        let params = self.params();
        let alpha = FRAC_PI_2 + config.delta + config.d;
        let beta = FRAC_PI_2 + config.d + config.gmm;
        EnvelopePoint::new(
            polar(params.vd() * t + params.r(), beta),
            polar(params.vi() * t, alpha),
        )
    }

    /// Defender-2 never follows the curve; it sits on the mirror ray of the half-angle.
    pub fn far_defender(&self, t: f64, config: &EngagementConfig) -> DVec2 {
        let params = self.params();
        polar(params.vd() * t + params.r(), FRAC_PI_2 + config.d - config.gmm)
    }
}

fn polar(radius: f64, angle: f64) -> DVec2 {
    radius * DVec2::from_angle(angle)
}
