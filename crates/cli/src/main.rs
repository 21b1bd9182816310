mod sweep;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use envelope_shared::*;
use envelope_sim::analyzer::{self, TrajectoryMetrics};
use envelope_sim::{estimate_policy, HeadingPolicy, OpenLoopPolicy, TrajectorySampler};

#[derive(Parser)]
#[command(name = "envelope", about = "Closed-form barrier trajectories for the two-defender game")]
struct Cli {
    #[command(flatten)]
    game: GameArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Speed and capture-range configuration, shared by every command.
#[derive(Args)]
struct GameArgs {
    /// JSON file with a GameConfig; missing fields use defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Defender speed override
    #[arg(long, global = true)]
    vd: Option<f64>,

    /// Intruder speed override
    #[arg(long, global = true)]
    vi: Option<f64>,

    /// Capture range override
    #[arg(long, global = true)]
    capture_range: Option<f64>,
}

/// One engagement geometry.
#[derive(Args, Clone, Copy)]
struct EngagementArgs {
    /// Curve parameter where the straight phase begins
    #[arg(long, default_value_t = 0.3)]
    target: f64,

    /// Straight-phase duration
    #[arg(long, default_value_t = 4.0)]
    duration: f64,

    /// Extra approach half-angle beyond acos(1/w)
    #[arg(long, default_value_t = 0.2)]
    gmm_extra: f64,

    /// Rotation offset D of the engagement
    #[arg(long = "rotation", default_value_t = 0.0)]
    d: f64,

    /// Symmetry-breaking offset
    #[arg(long, default_value_t = 0.2)]
    delta: f64,

    /// Number of samples
    #[arg(long, default_value_t = DEFAULT_SAMPLE_COUNT)]
    samples: usize,
}

impl EngagementArgs {
    fn config(&self, params: &EnvelopeParams) -> EngagementConfig {
        EngagementConfig::new(params.critical_angle() + self.gmm_extra, self.d, self.delta)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Sample one engagement and estimate its open-loop policy
    Trajectory {
        #[command(flatten)]
        engagement: EngagementArgs,

        /// Output path for trajectory JSON
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Evaluate a grid of one engagement parameter in parallel
    Sweep {
        #[command(flatten)]
        engagement: EngagementArgs,

        /// Parameter to sweep: delta, s (curve target), t (straight duration) or d
        #[arg(long)]
        param: String,

        /// Lower end of the grid
        #[arg(long)]
        min: f64,

        /// Upper end of the grid
        #[arg(long)]
        max: f64,

        /// Number of grid points
        #[arg(long, default_value_t = 11)]
        steps: usize,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let game = load_game_config(&cli.game)?;
    let params = game.derive().context("deriving envelope constants")?;
    tracing::info!(w = params.w(), r = params.r(), "derived envelope constants");

    match cli.command {
        Commands::Trajectory { engagement, output } => {
            cmd_trajectory(&params, &engagement, output.as_deref())
        }
        Commands::Sweep {
            engagement,
            param,
            min,
            max,
            steps,
        } => sweep::cmd_sweep(&params, &engagement, &param, min, max, steps),
    }
}

fn load_game_config(args: &GameArgs) -> Result<GameConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => GameConfig::default(),
    };
    if let Some(vd) = args.vd {
        config.defender_speed = vd;
    }
    if let Some(vi) = args.vi {
        config.intruder_speed = vi;
    }
    if let Some(r) = args.capture_range {
        config.capture_range = r;
    }
    Ok(config)
}

#[derive(Serialize)]
struct TrajectoryReport<'a> {
    params: &'a EnvelopeParams,
    engagement: EngagementConfig,
    sampled: &'a SampledEngagement,
    primary_policy: PolicySchedule,
    twin_policy: Option<PolicySchedule>,
    metrics: TrajectoryMetrics,
}

fn cmd_trajectory(
    params: &EnvelopeParams,
    args: &EngagementArgs,
    output: Option<&Path>,
) -> Result<()> {
    let config = args.config(params);
    let sampler = TrajectorySampler::new(params);
    let sampled = sampler
        .sample(args.target, args.duration, &config, args.samples)
        .context("sampling engagement")?;

    let primary_policy = estimate_policy(&sampled.primary)?;
    let twin_policy = sampled.twin.as_ref().map(estimate_policy).transpose()?;
    let metrics = analyzer::analyze(params, &sampled.primary);

    println!(
        "Engagement: w={:.3} r={:.3} gmm={:.4} D={:.4} delta={:.4}",
        params.w(),
        params.r(),
        config.gmm,
        config.d,
        config.delta
    );
    println!();
    println!("=== Trajectory ===");
    println!("Curved time:   {:.4}", sampled.curved_time);
    println!(
        "Samples:       {} ({} curved, {} straight)",
        sampled.primary.len(),
        sampled.curved_samples,
        sampled.straight_samples
    );
    println!("Twin:          {}", if sampled.twin.is_some() { "yes" } else { "no" });
    println!("Duration:      {:.4}", metrics.duration);
    println!("Terminal gap:  {:.6}", metrics.terminal_gap);
    println!("Min sep:       {:.4}", metrics.min_separation);
    for (role, length) in Role::ALL.iter().zip(metrics.path_length) {
        println!("  {} path length: {:.4}", role.label(), length);
    }
    if let Some(first) = sampled.primary.initial() {
        let p = &first.positions;
        println!();
        println!("--- Initial positions ---");
        for role in Role::ALL {
            let v = p.get(role);
            println!("  {}: ({:.4}, {:.4})", role.label(), v.x, v.y);
        }
    }

    let mut replays = vec![OpenLoopPolicy::new("primary", primary_policy.clone())];
    if let Some(twin) = &twin_policy {
        replays.push(OpenLoopPolicy::new("twin", twin.clone()));
    }
    let last_step = sampled.primary.len().saturating_sub(1);
    for replay in &mut replays {
        println!();
        println!("--- {} headings ---", replay.name());
        for (step, headings) in replay_headings(replay, &[0, last_step]) {
            if let Some(h) = headings {
                println!(
                    "  step {:>3}: D0={:+.4} I0={:+.4} D1={:+.4}",
                    step, h.defender1, h.intruder, h.defender2
                );
            }
        }
    }

    if let Some(path) = output {
        let report = TrajectoryReport {
            params,
            engagement: config,
            sampled: &sampled,
            primary_policy,
            twin_policy,
            metrics,
        };
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        println!("\nTrajectory written to {}", path.display());
    }
    Ok(())
}

/// Query `policy` at each of `steps`, as a closed-loop game would.
fn replay_headings(policy: &mut dyn HeadingPolicy, steps: &[usize]) -> Vec<(usize, Option<Headings>)> {
    steps.iter().map(|&step| (step, policy.headings(step))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replay_headings_follow_schedule() {
        let params = GameConfig::default().derive().unwrap();
        let config = EngagementConfig::new(params.critical_angle() + 0.2, 0.0, 0.2);
        let sampled = TrajectorySampler::new(&params)
            .sample(0.3, 4.0, &config, 20)
            .unwrap();
        let schedule = estimate_policy(&sampled.primary).unwrap();
        let mut policy = OpenLoopPolicy::new("primary", schedule.clone());

        let replayed = replay_headings(&mut policy, &[0, 19, 40]);
        assert_eq!(replayed[0], (0, schedule.at(0).copied()));
        assert_eq!(replayed[1], (19, schedule.at(19).copied()));
        // Past the end the last heading is held.
        assert_eq!(replayed[2], (40, schedule.at(19).copied()));
    }
}
