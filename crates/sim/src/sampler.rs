use std::f64::consts::FRAC_PI_2;

use envelope_shared::*;
use tracing::debug;

use crate::composer::EngagementComposer;
use crate::frame;

/// Discretizes an engagement into a forward-in-time trajectory.
#[derive(Debug, Clone, Copy)]
pub struct TrajectorySampler<'a> {
    composer: EngagementComposer<'a>,
}

impl<'a> TrajectorySampler<'a> {
    pub fn new(params: &'a EnvelopeParams) -> Self {
        Self {
            composer: EngagementComposer::new(params),
        }
    }

    pub fn composer(&self) -> &EngagementComposer<'a> {
        &self.composer
    }

    /// Sample `n` points: the curve from the tangency point out to `target`,
    /// then `duration` of straight-line motion beyond it.
    ///
    /// Samples are split between the phases in proportion to their durations,
    /// with at least one on the curve. Asymmetric engagements (`delta > 0` or
    /// `target` past the tangency point) also get a mirrored twin seen from the
    /// opposite-side defender.
    pub fn sample(
        &self,
        target: f64,
        duration: f64,
        config: &EngagementConfig,
        n: usize,
    ) -> Result<SampledEngagement, EnvelopeError> {
        if n == 0 {
            return Err(ConfigurationError::TooFewSamples { got: n, min: 1 }.into());
        }
        if !duration.is_finite() || duration < 0.0 {
            return Err(ConfigurationError::InvalidDuration(duration).into());
        }
        let params = self.composer.params();
        let kinematics = self.composer.kinematics();
        let slack = config.validate(params)?;
        let s0 = params.tangency();
        let tc = kinematics.time_of_flight(target)?;

        let total = duration + tc;
        let curved_share = if total > 0.0 { tc / total } else { 1.0 };
        let nc = ((n as f64 * curved_share).round() as usize).clamp(1, n);
        let ns = n - nc;

        let with_twin = is_asymmetric(config, target, s0);
        debug!(target, duration, tc, nc, ns, with_twin, "allocated trajectory samples");

        let mut primary = Vec::with_capacity(n);
        for s in linspace(s0, target, nc) {
            let t = kinematics.time_of_flight(s)?;
            let c = self.composer.compose_at(s, t, t, slack, config)?;
            primary.push(TrajectorySample {
                time_to_go: c.elapsed,
                positions: c.positions,
            });
        }
        // Durations shorter than the offset are split evenly from zero instead.
        let first = if duration >= STRAIGHT_PHASE_OFFSET {
            STRAIGHT_PHASE_OFFSET
        } else {
            duration / ns.max(1) as f64
        };
        for t in linspace(first, duration, ns) {
            let c = self.composer.compose_at(target, tc + t, tc, slack, config)?;
            primary.push(TrajectorySample {
                time_to_go: c.elapsed,
                positions: c.positions,
            });
        }

        let twin = with_twin.then(|| {
            let axis = config.d + FRAC_PI_2;
            primary
                .iter()
                .rev()
                .map(|sample| TrajectorySample {
                    time_to_go: sample.time_to_go,
                    positions: sample
                        .positions
                        .map_swapped(|p| frame::mirror_across(p, axis)),
                })
                .collect::<Vec<_>>()
        });

        // Built backward from the terminal event; callers want earliest first.
        primary.reverse();

        Ok(SampledEngagement {
            primary: Trajectory::new(primary),
            twin: twin.map(Trajectory::new),
            curved_time: tc,
            curved_samples: nc,
            straight_samples: ns,
        })
    }
}

/// Whether an engagement needs the opposite-side defender's view.
pub fn is_asymmetric(config: &EngagementConfig, target: f64, tangency: f64) -> bool {
    config.delta > 0.0 || target > tangency
}

/// `n` evenly spaced values from `start` to `end` inclusive; `start` alone when `n == 1`.
fn linspace(start: f64, end: f64, n: usize) -> impl Iterator<Item = f64> {
    let step = if n > 1 {
        (end - start) / (n - 1) as f64
    } else {
        0.0
    };
    (0..n).map(move |i| if i + 1 == n && n > 1 { end } else { start + step * i as f64 })
}
