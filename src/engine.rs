//! Workout engine - single owner of all session-scoped state
//!
//! Frames, the exercise timer, the risk monitor and the breathing coach all
//! mutate state here, one call at a time. The active exercise is looked up on
//! every frame, so a frame arriving right after `advance()` goes to the new
//! exercise.

use std::time::Instant;

use serde::Serialize;
use tracing::{info, trace};

use crate::breathing::{BreathingCoach, BreathingPhase};
use crate::config::Config;
use crate::exercises::WorkoutPlan;
use crate::pose::{Keypoint, PoseSnapshot};
use crate::risk::{RiskMonitor, RiskStatus};
use crate::scheduler::{Scheduler, Task, TaskHandle};
use crate::session::{Advance, FrameOutcome, Phase, Session, SessionError, SessionSnapshot};

/// Everything the renderer needs for one refresh
#[derive(Debug, Clone, Serialize)]
pub struct WorkoutView {
    pub session: SessionSnapshot,
    pub risk: RiskStatus,
    pub breathing: BreathingPhase,
    pub keypoints: Vec<Keypoint>,
    pub bones: Vec<(Keypoint, Keypoint)>,
}

#[derive(Debug, Default)]
struct Handles {
    timer: Option<TaskHandle>,
    risk: Option<TaskHandle>,
    breathing: Option<TaskHandle>,
}

pub struct Workout {
    session: Session,
    risk: RiskMonitor,
    breathing: BreathingCoach,
    scheduler: Scheduler,
    handles: Handles,
    config: Config,
    epoch: Instant,
    detection_active: bool,
    skeleton: Option<PoseSnapshot>,
    target_announced: bool,
}

impl Workout {
    pub fn new(plan: WorkoutPlan, config: Config, epoch: Instant) -> Self {
        Self {
            session: Session::new(plan),
            risk: RiskMonitor::new(config.risk.clone()),
            breathing: BreathingCoach::default(),
            scheduler: Scheduler::new(),
            handles: Handles::default(),
            config,
            epoch,
            detection_active: false,
            skeleton: None,
            target_announced: false,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn risk(&self) -> &RiskStatus {
        self.risk.status()
    }

    pub fn breathing(&self) -> BreathingPhase {
        self.breathing.phase()
    }

    pub fn detection_active(&self) -> bool {
        self.detection_active
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn advance_available(&self) -> bool {
        self.session.advance_available()
    }

    pub fn start(&mut self, now: Instant) -> Result<(), SessionError> {
        self.session.start()?;
        self.risk.start(now);
        self.target_announced = false;

        let at = self.logical(now);
        self.handles.timer = Some(self.scheduler.schedule(Task::ExerciseTimer, self.config.exercise_timer(), at));
        self.handles.risk = Some(self.scheduler.schedule(Task::RiskMonitor, self.config.risk_sample(), at));
        self.handles.breathing = Some(self.scheduler.schedule(Task::Breathing, self.config.breathing_sample(), at));
        self.detection_active = true;
        Ok(())
    }

    /// Feed one estimated pose. Discarded while detection is stopped.
    pub fn on_frame(&mut self, pose: PoseSnapshot) -> Option<FrameOutcome> {
        if !self.detection_active {
            trace!("Frame discarded: detection stopped");
            return None;
        }

        let outcome = self.session.on_frame(&pose);
        self.skeleton = Some(pose);

        if self.session.advance_available() && !self.target_announced {
            if let Some(entry) = self.session.current_entry() {
                info!("{}: target of {} reached", entry.exercise.name(), entry.target_reps);
            }
            self.target_announced = true;
        }
        outcome
    }

    /// Run every periodic task due at `now`
    pub fn poll(&mut self, now: Instant) -> Vec<Task> {
        let due = self.scheduler.due(self.logical(now));
        for task in &due {
            self.run_task(*task, now);
        }
        due
    }

    pub fn run_task(&mut self, task: Task, now: Instant) {
        match task {
            Task::ExerciseTimer => self.session.tick(),
            Task::RiskMonitor => {
                self.risk.sample(now, self.session.counts().total());
            }
            Task::Breathing => {
                let active = self
                    .session
                    .current_exercise()
                    .zip(self.session.current_position());
                self.breathing.sample(active);
            }
        }
    }

    pub fn advance(&mut self, now: Instant) -> Result<Advance, SessionError> {
        let advance = self.session.advance()?;
        self.target_announced = false;

        match &advance {
            Advance::Next(_) => {
                // Timer restarts its 1 s phase on entry
                if let Some(handle) = self.handles.timer.take() {
                    self.scheduler.cancel(handle);
                }
                let at = self.logical(now);
                self.handles.timer = Some(self.scheduler.schedule(Task::ExerciseTimer, self.config.exercise_timer(), at));
            }
            Advance::Completed(_) => self.stop(),
        }
        Ok(advance)
    }

    /// Stop detection and drop the session without a summary
    pub fn abandon(&mut self) {
        self.stop();
        self.session.abandon();
    }

    /// Completed back to Idle
    pub fn reset(&mut self) -> Result<(), SessionError> {
        self.session.reset()
    }

    pub fn view(&self) -> WorkoutView {
        let (keypoints, bones) = match &self.skeleton {
            Some(pose) => (pose.visible_points(), pose.skeleton_segments()),
            None => (Vec::new(), Vec::new()),
        };
        WorkoutView {
            session: self.session.snapshot(),
            risk: self.risk.status().clone(),
            breathing: self.breathing.phase(),
            keypoints,
            bones,
        }
    }

    pub fn phase(&self) -> Phase {
        self.session.phase()
    }

    fn stop(&mut self) {
        self.detection_active = false;
        self.scheduler.cancel_all();
        self.handles = Handles::default();
        self.risk.stop();
        self.skeleton = None;
    }

    fn logical(&self, now: Instant) -> std::time::Duration {
        now.saturating_duration_since(self.epoch)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::classifier::testing::{pushup_frame, squat_frame};
    use crate::counter::Position;
    use crate::exercises::{ExerciseKind, PlanEntry};
    use crate::risk::RiskLevel;

    fn workout(entries: &[(ExerciseKind, u32)]) -> (Workout, Instant) {
        let plan = WorkoutPlan::new(
            entries
                .iter()
                .map(|(exercise, target_reps)| PlanEntry { exercise: *exercise, target_reps: *target_reps })
                .collect(),
        );
        let t0 = Instant::now();
        (Workout::new(plan, Config::default(), t0), t0)
    }

    fn secs(v: f64) -> Duration {
        Duration::from_secs_f64(v)
    }

    #[test]
    fn test_frames_discarded_before_start() {
        let (mut w, _) = workout(&[(ExerciseKind::Pushup, 1)]);
        assert!(w.on_frame(pushup_frame(90.0, true, 0.9)).is_none());
        assert!(w.view().keypoints.is_empty());
    }

    #[test]
    fn test_timer_ticks_once_per_second() {
        let (mut w, t0) = workout(&[(ExerciseKind::Pushup, 1)]);
        w.start(t0).unwrap();
        let mut t = t0;
        for _ in 0..35 {
            t += Duration::from_millis(100);
            w.poll(t);
        }
        assert_eq!(w.session().timer_secs(), 3);
    }

    #[test]
    fn test_advance_restarts_timer_phase() {
        let (mut w, t0) = workout(&[(ExerciseKind::Pushup, 1), (ExerciseKind::Squat, 1)]);
        w.start(t0).unwrap();
        w.poll(t0 + secs(1.5));
        assert_eq!(w.session().timer_secs(), 1);

        w.advance(t0 + secs(1.5)).unwrap();
        w.poll(t0 + secs(2.0));
        assert_eq!(w.session().timer_secs(), 0, "old phase must not tick");
        w.poll(t0 + secs(2.5));
        assert_eq!(w.session().timer_secs(), 1);
        assert_eq!(w.session().snapshot().exercise_secs, vec![1, 0]);
    }

    #[test]
    fn test_breathing_follows_position_on_its_cadence() {
        let (mut w, t0) = workout(&[(ExerciseKind::Pushup, 2)]);
        w.start(t0).unwrap();
        w.on_frame(pushup_frame(90.0, true, 0.9));
        // Not re-evaluated until the next breathing sample
        assert_eq!(w.breathing(), BreathingPhase::Inhale);
        w.poll(t0 + secs(0.1));
        assert_eq!(w.breathing(), BreathingPhase::Exhale);
    }

    #[test]
    fn test_risk_escalates_through_poll() {
        let (mut w, t0) = workout(&[(ExerciseKind::Squat, 100)]);
        w.start(t0).unwrap();
        for _ in 0..20 {
            w.on_frame(squat_frame(-20.0, -20.0, 0.9));
            w.on_frame(squat_frame(80.0, 80.0, 0.9));
        }
        assert_eq!(w.session().counts().get(ExerciseKind::Squat), 20);
        w.poll(t0 + secs(60.0));
        assert_eq!(w.risk().heart_attack.level, RiskLevel::High);
    }

    #[test]
    fn test_completion_stops_detection_and_tasks() {
        let (mut w, t0) = workout(&[(ExerciseKind::Pushup, 1)]);
        w.start(t0).unwrap();
        w.on_frame(pushup_frame(90.0, true, 0.9));
        w.on_frame(pushup_frame(170.0, true, 0.9));
        assert!(w.advance_available());

        let advance = w.advance(t0 + secs(1.0)).unwrap();
        assert!(matches!(advance, Advance::Completed(_)));
        assert!(!w.detection_active());
        assert_eq!(w.scheduler().next_deadline(), None);
        assert!(w.on_frame(pushup_frame(90.0, true, 0.9)).is_none());
        assert!(w.poll(t0 + secs(10.0)).is_empty());
    }

    #[test]
    fn test_frame_after_advance_goes_to_new_exercise() {
        let (mut w, t0) = workout(&[(ExerciseKind::Pushup, 1), (ExerciseKind::Squat, 1)]);
        w.start(t0).unwrap();
        w.on_frame(pushup_frame(90.0, true, 0.9));
        w.on_frame(pushup_frame(170.0, true, 0.9));
        w.advance(t0).unwrap();

        let outcome = w.on_frame(squat_frame(-20.0, -20.0, 0.9)).unwrap();
        assert_eq!(outcome.exercise, ExerciseKind::Squat);
        assert_eq!(w.session().current_position(), Some(Position::Down));
    }

    #[test]
    fn test_view_exposes_skeleton_and_state() {
        let (mut w, t0) = workout(&[(ExerciseKind::Pushup, 1)]);
        w.start(t0).unwrap();
        w.on_frame(pushup_frame(90.0, true, 0.9));
        let view = w.view();
        assert_eq!(view.session.exercise, Some(ExerciseKind::Pushup));
        assert_eq!(view.session.position, Some(Position::Down));
        assert!(!view.keypoints.is_empty());
        assert!(!view.bones.is_empty());
        assert!(serde_json::to_string(&view).is_ok());
    }

    #[test]
    fn test_abandon_stops_everything() {
        let (mut w, t0) = workout(&[(ExerciseKind::Pushup, 1)]);
        w.start(t0).unwrap();
        w.abandon();
        assert_eq!(w.phase(), Phase::Idle);
        assert!(!w.detection_active());
        assert_eq!(w.scheduler().next_deadline(), None);
        assert!(w.advance(t0).is_err());
    }

    #[test]
    fn test_restart_after_completion() {
        let (mut w, t0) = workout(&[(ExerciseKind::Pushup, 0)]);
        w.start(t0).unwrap();
        w.advance(t0).unwrap();
        assert!(w.start(t0).is_err());
        w.reset().unwrap();
        w.start(t0 + secs(5.0)).unwrap();
        assert!(w.detection_active());
        assert_eq!(w.phase(), Phase::InExercise(0));
    }

    #[test]
    fn test_repeated_sessions_keep_three_tasks() {
        let entries: Vec<(ExerciseKind, u32)> = (0..20).map(|_| (ExerciseKind::Squat, 0)).collect();
        let (mut w, t0) = workout(&entries);
        let mut t = t0;
        for _ in 0..10 {
            w.start(t).unwrap();
            assert_eq!(w.scheduler().len(), 3);
            loop {
                t += secs(0.5);
                if let Advance::Completed(_) = w.advance(t).unwrap() {
                    break;
                }
                assert_eq!(w.scheduler().len(), 3);
            }
            assert!(w.scheduler().is_empty());
            w.reset().unwrap();
        }
    }
}
