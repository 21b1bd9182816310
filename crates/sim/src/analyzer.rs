use envelope_shared::*;
use serde::Serialize;

/// Summary metrics of a sampled trajectory.
#[derive(Debug, Clone, Serialize)]
pub struct TrajectoryMetrics {
    pub sample_count: usize,
    /// Time spanned from the first to the last sample.
    pub duration: f64,
    /// Polyline length for defender-1, intruder and defender-2.
    pub path_length: [f64; 3],
    /// Defender-1/intruder distance at the last sample, minus the capture range.
    pub terminal_gap: f64,
    /// Smallest defender-1/intruder distance over all samples.
    pub min_separation: f64,
}

/// Analyze a trajectory against the capture range in `params`.
pub fn analyze(params: &EnvelopeParams, trajectory: &Trajectory) -> TrajectoryMetrics {
    let samples = &trajectory.samples;
    let (Some(first), Some(last)) = (samples.first(), samples.last()) else {
        return TrajectoryMetrics {
            sample_count: 0,
            duration: 0.0,
            path_length: [0.0; 3],
            terminal_gap: 0.0,
            min_separation: 0.0,
        };
    };

    let mut path_length = [0.0; 3];
    for pair in samples.windows(2) {
        for (i, role) in Role::ALL.iter().enumerate() {
            path_length[i] += pair[0].positions.get(*role).distance(pair[1].positions.get(*role));
        }
    }

    let separation = |s: &TrajectorySample| s.positions.defender1.distance(s.positions.intruder);
    let min_separation = samples.iter().map(separation).fold(f64::INFINITY, f64::min);

    TrajectoryMetrics {
        sample_count: samples.len(),
        duration: first.time_to_go - last.time_to_go,
        path_length,
        terminal_gap: separation(last) - params.r(),
        min_separation,
    }
}
