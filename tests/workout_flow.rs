use std::io::Write;
use std::time::Duration;

use tokio::time::Instant;

use formcount::config::Config;
use formcount::db::{Database, HistoryStore};
use formcount::engine::Workout;
use formcount::exercises::{ExerciseKind, WorkoutPlan};
use formcount::replay::{RecordedFrame, ReplayEstimator, SyntheticEstimator, SyntheticOptions};
use formcount::runtime::{Estimate, RunOptions, run_workout};
use formcount::session::Phase;

fn workout(plan: &WorkoutPlan) -> Workout {
    Workout::new(plan.clone(), Config::default(), Instant::now().into_std())
}

#[tokio::test(start_paused = true)]
async fn test_default_plan_completes_with_target_counts() {
    let plan = WorkoutPlan::default();
    let db = Database::open(":memory:").unwrap();
    let mut w = workout(&plan);

    let estimator = SyntheticEstimator::new(&plan, SyntheticOptions::default());
    let summary = run_workout(estimator, &mut w, &db, RunOptions::default())
        .await
        .unwrap()
        .expect("synthetic athlete finishes the plan");

    for entry in plan.entries() {
        assert_eq!(summary.count(entry.exercise), entry.target_reps, "{:?}", entry.exercise);
    }
    // 5 × 0.5 + 5 × 0.3 + 3 × 1.0 + 4 × 0.4 + 5 × 0.2
    assert!((summary.total_calories - 9.6).abs() < 1e-9);
    // 710 frames at 33 ms
    assert!(summary.total_duration_secs >= 18 && summary.total_duration_secs <= 24);

    assert_eq!(w.phase(), Phase::Completed);
    assert!(!w.detection_active());
    assert_eq!(db.load_workout_history().unwrap(), vec![summary]);
}

#[tokio::test(start_paused = true)]
async fn test_noisy_source_still_completes() {
    let plan = WorkoutPlan::parse("jumping jacks:4, overhead press:3, pushups:2").unwrap();
    let db = Database::open(":memory:").unwrap();
    let mut w = workout(&plan);

    let options = SyntheticOptions {
        dropout_rate: 0.1,
        failure_rate: 0.05,
        seed: 9,
        ..SyntheticOptions::default()
    };
    let summary = run_workout(SyntheticEstimator::new(&plan, options), &mut w, &db, RunOptions::default())
        .await
        .unwrap()
        .expect("dropouts and failures are tolerated");

    assert_eq!(summary.count(ExerciseKind::JumpingJack), 4);
    assert_eq!(summary.count(ExerciseKind::OverheadPress), 3);
    assert_eq!(summary.count(ExerciseKind::Pushup), 2);
}

#[tokio::test(start_paused = true)]
async fn test_recorded_session_replays_into_history() {
    let plan = WorkoutPlan::parse("squats:3, dumbbell curls:2").unwrap();
    let dir = tempfile::tempdir().unwrap();

    let recording = dir.path().join("session.jsonl");
    {
        let mut file = std::fs::File::create(&recording).unwrap();
        let mut synthetic = SyntheticEstimator::new(&plan, SyntheticOptions::default());
        while let Estimate::Poses(poses) = synthetic.next_frame().unwrap() {
            let line = serde_json::to_string(&RecordedFrame::People(poses)).unwrap();
            writeln!(file, "{}", line).unwrap();
        }
    }

    let db_path = dir.path().join("history.db");
    let db = Database::open(db_path.to_str().unwrap()).unwrap();
    let mut w = workout(&plan);
    let replay = ReplayEstimator::open(&recording, Duration::from_millis(33)).unwrap();

    let summary = run_workout(replay, &mut w, &db, RunOptions::default())
        .await
        .unwrap()
        .expect("recording covers the plan");
    assert_eq!(summary.count(ExerciseKind::Squat), 3);
    assert_eq!(summary.count(ExerciseKind::DumbbellCurl), 2);

    drop(db);
    let reopened = Database::open(db_path.to_str().unwrap()).unwrap();
    let history = reopened.load_workout_history().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].total_reps(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_short_recording_saves_nothing() {
    let plan = WorkoutPlan::parse("pushups:10").unwrap();
    let short = WorkoutPlan::parse("pushups:2").unwrap();
    let db = Database::open(":memory:").unwrap();
    let mut w = workout(&plan);

    let summary = run_workout(SyntheticEstimator::new(&short, SyntheticOptions::default()), &mut w, &db, RunOptions::default())
        .await
        .unwrap();

    assert!(summary.is_none());
    assert_eq!(w.session().counts().get(ExerciseKind::Pushup), 0, "abandoned session is cleared");
    assert!(db.load_workout_history().unwrap().is_empty());
}
