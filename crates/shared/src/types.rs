use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::config::EnvelopeParams;
use crate::error::ConfigurationError;

/// Geometry of one engagement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngagementConfig {
    /// Terminal approach half-angle.
    pub gmm: f64,
    /// Rotation offset of the whole engagement.
    pub d: f64,
    /// Symmetry-breaking offset, bounded by `gmm - acos(1/w)`.
    pub delta: f64,
}

impl EngagementConfig {
    pub fn new(gmm: f64, d: f64, delta: f64) -> Self {
        Self { gmm, d, delta }
    }

    /// Symmetric engagement at the critical half-angle.
    pub fn critical(params: &EnvelopeParams) -> Self {
        Self::new(params.critical_angle(), 0.0, 0.0)
    }

    /// Upper bound on `delta`: `gmm - acos(1/w)`.
    pub fn margin(&self, params: &EnvelopeParams) -> f64 {
        self.gmm - params.critical_angle()
    }

    /// How far `delta` sits below its upper bound.
    pub fn slack(&self, params: &EnvelopeParams) -> f64 {
        self.margin(params) - self.delta
    }

    /// Reject configurations where `delta` exceeds the margin by more than the
    /// boundary epsilon. Returns the slack on success.
    pub fn validate(&self, params: &EnvelopeParams) -> Result<f64, ConfigurationError> {
        let margin = self.margin(params);
        let slack = margin - self.delta;
        if !slack.is_finite() || slack < -params.boundary_epsilon() {
            return Err(ConfigurationError::DeltaExceedsMargin {
                delta: self.delta,
                margin,
            });
        }
        Ok(slack)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Defender1,
    Intruder,
    Defender2,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Defender1, Role::Intruder, Role::Defender2];

    pub fn label(&self) -> &'static str {
        match self {
            Role::Defender1 => "D0",
            Role::Intruder => "I0",
            Role::Defender2 => "D1",
        }
    }
}

/// Positions of the three players in a shared frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerPositions {
    pub defender1: DVec2,
    pub intruder: DVec2,
    pub defender2: DVec2,
}

impl PlayerPositions {
    pub fn get(&self, role: Role) -> DVec2 {
        match role {
            Role::Defender1 => self.defender1,
            Role::Intruder => self.intruder,
            Role::Defender2 => self.defender2,
        }
    }

    /// Apply `f` to every position and swap the two defenders, giving the
    /// view from the opposite-side defender.
    pub fn map_swapped(&self, f: impl Fn(DVec2) -> DVec2) -> Self {
        Self {
            defender1: f(self.defender2),
            intruder: f(self.intruder),
            defender2: f(self.defender1),
        }
    }

    /// Flatten to `[xd1, yd1, xi, yi, xd2, yd2]`.
    pub fn to_raw(&self) -> [f64; 6] {
        [
            self.defender1.x,
            self.defender1.y,
            self.intruder.x,
            self.intruder.y,
            self.defender2.x,
            self.defender2.y,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectorySample {
    /// Time remaining until the terminal tangency event.
    pub time_to_go: f64,
    pub positions: PlayerPositions,
}

/// Time-ordered samples, earliest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub samples: Vec<TrajectorySample>,
}

impl Trajectory {
    pub fn new(samples: Vec<TrajectorySample>) -> Self {
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrajectorySample> {
        self.samples.iter()
    }

    /// Earliest sample, used to seed a closed-loop game.
    pub fn initial(&self) -> Option<&TrajectorySample> {
        self.samples.first()
    }

    pub fn terminal(&self) -> Option<&TrajectorySample> {
        self.samples.last()
    }

    /// One player's positions in time order.
    pub fn track(&self, role: Role) -> Vec<DVec2> {
        self.samples.iter().map(|s| s.positions.get(role)).collect()
    }
}

/// Output of the trajectory sampler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampledEngagement {
    pub primary: Trajectory,
    /// Mirrored view from the opposite-side defender, absent for symmetric engagements.
    pub twin: Option<Trajectory>,
    /// Time of flight along the curved phase.
    pub curved_time: f64,
    pub curved_samples: usize,
    pub straight_samples: usize,
}

/// Heading of each player at one sample, radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Headings {
    pub defender1: f64,
    pub intruder: f64,
    pub defender2: f64,
}

impl Headings {
    pub fn get(&self, role: Role) -> f64 {
        match role {
            Role::Defender1 => self.defender1,
            Role::Intruder => self.intruder,
            Role::Defender2 => self.defender2,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.defender1.is_nan() || self.intruder.is_nan() || self.defender2.is_nan()
    }
}

/// Open-loop heading schedule aligned 1:1 with a [`Trajectory`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicySchedule {
    pub headings: Vec<Headings>,
}

impl PolicySchedule {
    pub fn len(&self) -> usize {
        self.headings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headings.is_empty()
    }

    pub fn at(&self, index: usize) -> Option<&Headings> {
        self.headings.get(index)
    }
}
