//! formcount - webcam workout coach core
//!
//! Pose keypoints in, counted reps out: per-exercise classifiers, a plan-driven
//! session with per-exercise timers, calorie totals, coarse risk warnings and
//! breathing cues.

pub mod breathing;
pub mod classifier;
pub mod config;
pub mod counter;
pub mod db;
pub mod engine;
pub mod exercises;
pub mod geometry;
pub mod pose;
pub mod replay;
pub mod risk;
pub mod runtime;
pub mod scheduler;
pub mod session;
pub mod stats;

pub use config::Config;
pub use db::{Database, HistoryStore};
pub use engine::Workout;
pub use exercises::{ExerciseKind, WorkoutPlan};
pub use pose::{Keypoint, Landmark, PoseSnapshot};
pub use session::{Session, WorkoutSummary};
