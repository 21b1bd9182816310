use anyhow::{bail, Result};
use rayon::prelude::*;

use envelope_shared::*;
use envelope_sim::analyzer;
use envelope_sim::TrajectorySampler;

use crate::EngagementArgs;

/// A sweepable engagement parameter and how to apply it.
struct SweepParam {
    name: &'static str,
    apply: fn(&mut EngagementArgs, f64),
}

const SWEEP_PARAMS: &[SweepParam] = &[
    SweepParam {
        name: "delta",
        apply: |a, v| a.delta = v,
    },
    SweepParam {
        name: "s",
        apply: |a, v| a.target = v,
    },
    SweepParam {
        name: "t",
        apply: |a, v| a.duration = v,
    },
    SweepParam {
        name: "d",
        apply: |a, v| a.d = v,
    },
];

/// Outcome of one grid point.
struct PointResult {
    value: f64,
    outcome: Result<PointMetrics, EnvelopeError>,
}

#[derive(Debug)]
struct PointMetrics {
    curved_time: f64,
    duration: f64,
    terminal_gap: f64,
    min_separation: f64,
    has_twin: bool,
}

fn run_point(params: &EnvelopeParams, args: &EngagementArgs) -> Result<PointMetrics, EnvelopeError> {
    let config = args.config(params);
    let sampled = TrajectorySampler::new(params).sample(args.target, args.duration, &config, args.samples)?;
    let metrics = analyzer::analyze(params, &sampled.primary);
    Ok(PointMetrics {
        curved_time: sampled.curved_time,
        duration: metrics.duration,
        terminal_gap: metrics.terminal_gap,
        min_separation: metrics.min_separation,
        has_twin: sampled.twin.is_some(),
    })
}

fn grid(min: f64, max: f64, steps: usize) -> Vec<f64> {
    if steps == 1 {
        vec![min]
    } else {
        (0..steps)
            .map(|i| min + (max - min) * i as f64 / (steps - 1) as f64)
            .collect()
    }
}

pub fn cmd_sweep(
    params: &EnvelopeParams,
    base: &EngagementArgs,
    param_name: &str,
    min: f64,
    max: f64,
    steps: usize,
) -> Result<()> {
    if steps == 0 {
        bail!("sweep needs at least one step");
    }
    let Some(param) = SWEEP_PARAMS.iter().find(|p| p.name == param_name) else {
        bail!(
            "unknown parameter '{}'. Available: {}",
            param_name,
            SWEEP_PARAMS.iter().map(|p| p.name).collect::<Vec<_>>().join(", ")
        );
    };

    println!(
        "=== Envelope Sweep ===\nParam: {} | Range: [{}, {}] | Steps: {} | Samples: {}",
        param.name, min, max, steps, base.samples
    );

    let start = std::time::Instant::now();
    let results: Vec<PointResult> = grid(min, max, steps)
        .into_par_iter()
        .map(|value| {
            let mut args = *base;
            (param.apply)(&mut args, value);
            PointResult {
                value,
                outcome: run_point(params, &args),
            }
        })
        .collect();

    println!(
        "\n{:>10} {:>10} {:>10} {:>12} {:>10} {:>5}",
        "value", "curved_t", "duration", "term_gap", "min_sep", "twin"
    );
    println!("{:-<62}", "");
    let mut failures = 0usize;
    for r in &results {
        match &r.outcome {
            Ok(m) => println!(
                "{:>10.4} {:>10.4} {:>10.4} {:>12.6} {:>10.4} {:>5}",
                r.value,
                m.curved_time,
                m.duration,
                m.terminal_gap,
                m.min_separation,
                if m.has_twin { "yes" } else { "no" },
            ),
            Err(e) => {
                failures += 1;
                println!("{:>10.4} failed: {}", r.value, e);
            }
        }
    }

    println!(
        "\n{} points, {} failed ({:.2}s)",
        results.len(),
        failures,
        start.elapsed().as_secs_f32()
    );
    Ok(())
}
