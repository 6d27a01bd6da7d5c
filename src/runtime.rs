//! Async driver - pose feed task plus the single-writer workout loop

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{error, info, trace, warn};

use crate::db::HistoryStore;
use crate::engine::Workout;
use crate::pose::PoseSnapshot;
use crate::session::{Advance, WorkoutSummary};

/// Frames buffered between the estimator and the workout loop
const FRAME_BUFFER: usize = 8;

/// Pause before re-issuing a failed inference
const RETRY_DELAY: Duration = Duration::from_millis(50);

/// Result of one inference call
#[derive(Debug, Clone)]
pub enum Estimate {
    /// Zero or more detected people; only the first is used
    Poses(Vec<PoseSnapshot>),
    /// The source has no more frames
    Closed,
}

/// The external pose-estimation model
pub trait PoseEstimator: Send + 'static {
    fn estimate(&mut self) -> impl Future<Output = Result<Estimate>> + Send;
}

#[derive(Debug, Clone)]
pub enum FrameEvent {
    Pose(PoseSnapshot),
    NoPerson,
}

/// Pull estimates forever, forwarding them to the workout loop. Failures are
/// logged and the next inference is issued; the feed ends only when the
/// source closes or the loop hangs up.
pub async fn pose_feed<E: PoseEstimator>(mut estimator: E, frames: mpsc::Sender<FrameEvent>) {
    let mut failures = 0u64;
    loop {
        let event = match estimator.estimate().await {
            Ok(Estimate::Poses(poses)) => match poses.into_iter().next() {
                Some(pose) => FrameEvent::Pose(pose),
                None => FrameEvent::NoPerson,
            },
            Ok(Estimate::Closed) => {
                info!("Pose source closed ({} failed inferences)", failures);
                return;
            }
            Err(e) => {
                failures += 1;
                warn!("Pose estimation failed: {:#}", e);
                tokio::time::sleep(RETRY_DELAY).await;
                continue;
            }
        };

        if frames.send(event).await.is_err() {
            return;
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub auto_advance: bool,
    pub tick: Duration,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            auto_advance: true,
            tick: Duration::from_millis(100),
        }
    }
}

/// Commands from whoever is watching the workout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Move on to the next plan entry, finishing the workout after the last
    Advance,
    /// Stop without saving
    Abandon,
}

/// Start `workout` and drive it until it completes or the pose source closes.
///
/// The completed summary is handed to `store`; a storage failure is logged
/// and does not fail the run.
pub async fn run_workout<E: PoseEstimator>(
    estimator: E,
    workout: &mut Workout,
    store: &dyn HistoryStore,
    options: RunOptions,
) -> Result<Option<WorkoutSummary>> {
    run_workout_with_controls(estimator, workout, store, options, None).await
}

/// Like [`run_workout`], also taking advance/abandon commands from `controls`.
/// A closed control channel is ignored from then on.
pub async fn run_workout_with_controls<E: PoseEstimator>(
    estimator: E,
    workout: &mut Workout,
    store: &dyn HistoryStore,
    options: RunOptions,
    mut controls: Option<mpsc::Receiver<Control>>,
) -> Result<Option<WorkoutSummary>> {
    workout.start(Instant::now().into_std())?;

    let (tx, mut rx) = mpsc::channel(FRAME_BUFFER);
    let feed = tokio::spawn(pose_feed(estimator, tx));

    let mut clock = tokio::time::interval(options.tick);
    clock.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let summary = loop {
        let mut requested = false;

        tokio::select! {
            event = rx.recv() => match event {
                Some(FrameEvent::Pose(pose)) => {
                    workout.on_frame(pose);
                }
                Some(FrameEvent::NoPerson) => trace!("No person in frame"),
                None => {
                    warn!("Pose source ended before the workout was completed");
                    workout.abandon();
                    break None;
                }
            },
            _ = clock.tick() => {
                workout.poll(Instant::now().into_std());
            }
            control = next_control(&mut controls) => match control {
                Some(Control::Advance) => requested = true,
                Some(Control::Abandon) => {
                    info!("Workout abandoned on request");
                    workout.abandon();
                    break None;
                }
                None => controls = None,
            },
        }

        if requested || (options.auto_advance && workout.advance_available()) {
            match workout.advance(Instant::now().into_std()) {
                Ok(Advance::Completed(summary)) => break Some(summary),
                Ok(Advance::Next(_)) => {}
                Err(e) => warn!("Advance ignored: {}", e),
            }
        }
    };

    feed.abort();

    if let Some(summary) = &summary {
        match store.append_workout_summary(summary) {
            Ok(id) => info!("Workout saved (id: {})", id),
            Err(e) => error!("Failed to save workout: {:#}", e),
        }
    }
    Ok(summary)
}

async fn next_control(controls: &mut Option<mpsc::Receiver<Control>>) -> Option<Control> {
    match controls {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
