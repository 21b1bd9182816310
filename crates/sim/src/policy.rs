use envelope_shared::*;
use glam::DVec2;
use tracing::warn;

/// Source of per-step headings for an external game loop.
pub trait HeadingPolicy: Send {
    fn name(&self) -> &str;
    fn headings(&mut self, step: usize) -> Option<Headings>;
}

/// Replays a precomputed heading schedule, holding the last entry once exhausted.
pub struct OpenLoopPolicy {
    name: String,
    schedule: PolicySchedule,
}

impl OpenLoopPolicy {
    pub fn new(name: impl Into<String>, schedule: PolicySchedule) -> Self {
        Self {
            name: name.into(),
            schedule,
        }
    }

    pub fn schedule(&self) -> &PolicySchedule {
        &self.schedule
    }
}

impl HeadingPolicy for OpenLoopPolicy {
    fn name(&self) -> &str {
        &self.name
    }

    fn headings(&mut self, step: usize) -> Option<Headings> {
        self.schedule
            .at(step)
            .or_else(|| self.schedule.headings.last())
            .copied()
    }
}

/// Estimate headings by finite differences between consecutive samples.
///
/// The output is aligned 1:1 with `trajectory`; the last entry repeats the one
/// before it. A player that does not move between two samples gets a NaN heading.
pub fn estimate_policy(trajectory: &Trajectory) -> Result<PolicySchedule, EnvelopeError> {
    if trajectory.len() < MIN_POLICY_SAMPLES {
        return Err(ConfigurationError::TooFewSamples {
            got: trajectory.len(),
            min: MIN_POLICY_SAMPLES,
        }
        .into());
    }

    let mut headings: Vec<Headings> = trajectory
        .samples
        .windows(2)
        .map(|pair| {
            let (from, to) = (&pair[0].positions, &pair[1].positions);
            Headings {
                defender1: heading(from.defender1, to.defender1),
                intruder: heading(from.intruder, to.intruder),
                defender2: heading(from.defender2, to.defender2),
            }
        })
        .collect();

    let degenerate = headings.iter().filter(|h| h.is_degenerate()).count();
    if degenerate > 0 {
        warn!(degenerate, "zero-length displacement between samples");
    }

    if let Some(&last) = headings.last() {
        headings.push(last);
    }
    Ok(PolicySchedule { headings })
}

fn heading(from: DVec2, to: DVec2) -> f64 {
    let d = to - from;
    if d == DVec2::ZERO {
        f64::NAN
    } else {
        d.y.atan2(d.x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn straight_line(n: usize) -> Trajectory {
        let samples = (0..n)
            .map(|i| {
                let x = i as f64;
                TrajectorySample {
                    time_to_go: (n - i) as f64,
                    positions: PlayerPositions {
                        defender1: DVec2::new(x, 0.0),
                        intruder: DVec2::new(0.0, x),
                        defender2: DVec2::new(-x, 0.0),
                    },
                }
            })
            .collect();
        Trajectory::new(samples)
    }

    #[test]
    fn test_headings_from_displacement() {
        let schedule = estimate_policy(&straight_line(5)).unwrap();
        assert_eq!(schedule.len(), 5);
        for h in &schedule.headings {
            assert!(h.defender1.abs() < 1e-12);
            assert!((h.intruder - FRAC_PI_2).abs() < 1e-12);
            assert!((h.defender2 - PI).abs() < 1e-12);
        }
    }

    #[test]
    fn test_last_entry_repeats() {
        let schedule = estimate_policy(&straight_line(4)).unwrap();
        assert_eq!(schedule.headings[3], schedule.headings[2]);
    }

    #[test]
    fn test_coincident_samples_give_nan() {
        let mut traj = straight_line(3);
        traj.samples[1].positions.intruder = traj.samples[0].positions.intruder;
        let schedule = estimate_policy(&traj).unwrap();
        assert!(schedule.headings[0].intruder.is_nan());
        assert!(schedule.headings[0].is_degenerate());
        assert!(!schedule.headings[0].defender1.is_nan());
        assert!(!schedule.headings[1].is_degenerate());
    }

    #[test]
    fn test_too_short_rejected() {
        let err = estimate_policy(&straight_line(1)).unwrap_err();
        assert!(err.is_configuration());
        assert!(estimate_policy(&Trajectory::default()).is_err());
    }

    #[test]
    fn test_open_loop_holds_last() {
        let schedule = estimate_policy(&straight_line(3)).unwrap();
        let last = *schedule.headings.last().unwrap();
        let mut policy = OpenLoopPolicy::new("envelope", schedule);
        assert_eq!(policy.name(), "envelope");
        assert_eq!(policy.headings(0), policy.schedule().at(0).copied());
        assert_eq!(policy.headings(100), Some(last));

        let mut empty = OpenLoopPolicy::new("empty", PolicySchedule::default());
        assert_eq!(empty.headings(0), None);
    }
}
