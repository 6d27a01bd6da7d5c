//! formcount - count reps from pose keypoints

use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::warn;

use formcount::config::Config;
use formcount::db::{Database, HistoryStore};
use formcount::engine::Workout;
use formcount::exercises::{CATALOG, ExerciseKind, WorkoutPlan};
use formcount::replay::{RecordedFrame, ReplayEstimator, SyntheticEstimator, SyntheticOptions};
use formcount::runtime::{Control, Estimate, PoseEstimator, RunOptions, run_workout_with_controls};
use formcount::session::WorkoutSummary;
use formcount::stats::HistoryStats;

#[derive(Parser)]
#[command(name = "formcount")]
#[command(author, version, about = "Count workout reps from pose keypoints")]
struct Cli {
    /// SQLite database for workout history
    #[arg(long, global = true, env = "FORMCOUNT_DB")]
    db: Option<String>,

    /// JSON config file
    #[arg(long, global = true, env = "FORMCOUNT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a workout from a recorded pose file (one JSON frame per line)
    Run {
        /// Recorded frames
        frames: PathBuf,

        /// Plan, e.g. "pushups:5,squats:10" (default: every exercise)
        #[arg(short, long)]
        plan: Option<String>,

        /// Advance with Enter instead of on reaching the target ("q" quits)
        #[arg(long)]
        manual: bool,
    },

    /// Run a workout against a synthetic athlete
    Simulate {
        #[arg(short, long)]
        plan: Option<String>,

        #[arg(long, default_value = "42")]
        seed: u64,

        /// Keypoint noise in pixels
        #[arg(long, default_value = "1.5")]
        jitter: f32,

        #[arg(long, default_value = "30")]
        frames_per_rep: usize,

        /// Share of frames with nobody in view
        #[arg(long, default_value = "0.0")]
        dropout: f64,
    },

    /// Write a synthetic workout as a pose recording for `run`
    Record {
        output: PathBuf,

        #[arg(short, long)]
        plan: Option<String>,

        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// List completed workouts
    History {
        /// Number of records to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Show workout statistics
    Stats,

    /// Describe the tracked exercises
    Exercises,
}

fn parse_plan(plan: Option<&str>) -> Result<WorkoutPlan> {
    match plan {
        Some(p) => WorkoutPlan::parse(p),
        None => Ok(WorkoutPlan::default()),
    }
}

fn print_summary(summary: &WorkoutSummary) {
    println!("Workout complete");
    println!("{:-<40}", "");
    for tally in &summary.exercises {
        println!("{:20} {:>4} reps", tally.exercise.name(), tally.count);
    }
    println!("{:-<40}", "");
    println!("Calories: {:.1} kcal", summary.total_calories);
    println!("Duration: {}m {}s", summary.total_duration_secs / 60, summary.total_duration_secs % 60);
}

/// Enter advances, "q" abandons. Reads on its own thread so a pending line
/// never holds up runtime shutdown.
fn keyboard_controls() -> mpsc::Receiver<Control> {
    let (tx, rx) = mpsc::channel(4);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            let control = if line.trim().eq_ignore_ascii_case("q") {
                Control::Abandon
            } else {
                Control::Advance
            };
            if tx.blocking_send(control).is_err() {
                break;
            }
        }
    });
    rx
}

/// Write every frame the generator produces as one JSON line.
/// Returns (frames written, failed inferences).
fn record_frames<W: Write>(estimator: &mut SyntheticEstimator, out: &mut W) -> Result<(usize, usize)> {
    let mut frames = 0usize;
    let mut failures = 0usize;
    loop {
        match estimator.next_frame() {
            Ok(Estimate::Poses(poses)) => {
                serde_json::to_writer(&mut *out, &RecordedFrame::People(poses))?;
                writeln!(out)?;
                frames += 1;
            }
            Ok(Estimate::Closed) => break,
            Err(e) => {
                failures += 1;
                warn!("Skipping frame: {:#}", e);
            }
        }
    }
    out.flush()?;
    Ok((frames, failures))
}

async fn drive<E: PoseEstimator>(
    estimator: E,
    plan: WorkoutPlan,
    config: &Config,
    db: &Database,
    auto_advance: bool,
) -> Result<()> {
    let mut workout = Workout::new(plan, config.clone(), Instant::now().into_std());
    let options = RunOptions { auto_advance, tick: config.tick() };
    let controls = if auto_advance {
        None
    } else {
        println!("Press Enter to move to the next exercise, q to quit");
        Some(keyboard_controls())
    };

    match run_workout_with_controls(estimator, &mut workout, db, options, controls).await? {
        Some(summary) => {
            print_summary(&summary);
            let risk = workout.risk();
            for message in [&risk.cramps.message, &risk.heart_attack.message] {
                if !message.is_empty() {
                    println!("! {}", message);
                }
            }
        }
        None => println!("Workout not completed; nothing saved"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let db_path = cli.db.clone().unwrap_or_else(|| config.db_path.clone());

    match cli.command {
        Commands::Run { frames, plan, manual } => {
            let plan = parse_plan(plan.as_deref())?;
            let estimator = ReplayEstimator::open(&frames, config.frame_interval())?;
            let db = Database::open(&db_path)?;
            drive(estimator, plan, &config, &db, config.auto_advance && !manual).await?;
        }

        Commands::Simulate { plan, seed, jitter, frames_per_rep, dropout } => {
            let plan = parse_plan(plan.as_deref())?;
            let options = SyntheticOptions {
                frames_per_rep,
                jitter,
                dropout_rate: dropout,
                frame_interval: config.frame_interval(),
                seed,
                ..SyntheticOptions::default()
            };
            let estimator = SyntheticEstimator::new(&plan, options);
            let db = Database::open(&db_path)?;
            drive(estimator, plan, &config, &db, true).await?;
        }

        Commands::Record { output, plan, seed } => {
            let plan = parse_plan(plan.as_deref())?;
            let options = SyntheticOptions { seed, ..SyntheticOptions::default() };
            let mut estimator = SyntheticEstimator::new(&plan, options);

            let file = File::create(&output).with_context(|| format!("creating {}", output.display()))?;
            let (frames, failures) = record_frames(&mut estimator, &mut BufWriter::new(file))?;
            println!("Recorded {} frames to {} ({} skipped)", frames, output.display(), failures);
        }

        Commands::History { limit } => {
            let db = Database::open(&db_path)?;
            let history = db.load_workout_history()?;
            println!("Recent workouts:");
            println!("{:-<60}", "");
            for w in history.iter().rev().take(limit) {
                let reps: Vec<String> = w
                    .exercises
                    .iter()
                    .map(|t| format!("{} {}", t.exercise.name(), t.count))
                    .collect();
                println!(
                    "{} | {:6.1} kcal | {:4}s | {}",
                    w.date.format("%Y-%m-%d %H:%M"),
                    w.total_calories,
                    w.total_duration_secs,
                    reps.join(", ")
                );
            }
        }

        Commands::Stats => {
            let db = Database::open(&db_path)?;
            let stats = HistoryStats::new(db.load_workout_history()?);

            println!("Workout Statistics");
            println!("{:-<40}", "");
            println!("Workouts: {}", stats.workouts());
            println!("Weekly frequency: {:.1} workouts/week", stats.weekly_frequency());
            println!("Total calories: {:.1} kcal", stats.total_calories());
            println!("Average duration: {:.0}s", stats.average_duration_secs());
            for kind in ExerciseKind::all() {
                println!("{:20} {:>6} reps", kind.name(), stats.total_reps(*kind));
            }
            if let Some(best) = stats.best_workout() {
                println!(
                    "Best workout: {} ({:.1} kcal)",
                    best.date.format("%Y-%m-%d"),
                    best.total_calories
                );
            }
        }

        Commands::Exercises => {
            for def in CATALOG {
                println!("{} ({:.1} kcal/rep, default {} reps)", def.name, def.calories_per_rep, def.default_target);
                println!("  {}", def.description);
                for (i, step) in def.instructions.iter().enumerate() {
                    println!("  {}. {}", i + 1, step);
                }
                println!();
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_simulate() {
        let cli = Cli::try_parse_from(["formcount", "--db", "x.db", "simulate", "--plan", "squats:2", "--seed", "3"]).unwrap();
        assert_eq!(cli.db.as_deref(), Some("x.db"));
        assert!(matches!(cli.command, Commands::Simulate { seed: 3, .. }));
    }

    #[test]
    fn test_default_plan_when_none_given() {
        assert_eq!(parse_plan(None).unwrap(), WorkoutPlan::default());
        assert_eq!(parse_plan(Some("dumbbell curls:2")).unwrap().len(), 1);
        assert!(parse_plan(Some("burpees")).is_err());
    }

    #[test]
    fn test_cli_parses_manual_run() {
        let cli = Cli::try_parse_from(["formcount", "run", "frames.jsonl", "--manual"]).unwrap();
        assert!(matches!(cli.command, Commands::Run { manual: true, .. }));
    }

    #[test]
    fn test_record_skips_failed_frames() {
        let plan = WorkoutPlan::parse("squats:2").unwrap();
        let options = SyntheticOptions { failure_rate: 0.3, seed: 5, ..SyntheticOptions::default() };
        let mut estimator = SyntheticEstimator::new(&plan, options);
        let scripted = estimator.remaining();

        let mut out = Vec::new();
        let (frames, failures) = record_frames(&mut estimator, &mut out).unwrap();

        assert!(failures > 0);
        assert_eq!(frames + failures, scripted);
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), frames);
        for line in text.lines() {
            serde_json::from_str::<RecordedFrame>(line).unwrap();
        }
    }
}
