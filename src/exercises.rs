//! Exercise definitions - catalog of tracked exercises

use serde::{Deserialize, Serialize};

/// Exercises the classifiers know how to count
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseKind {
    Pushup,
    Squat,
    OverheadPress,
    DumbbellCurl,
    JumpingJack,
}

impl ExerciseKind {
    pub const COUNT: usize = 5;

    /// All exercise kinds for iteration
    pub fn all() -> &'static [ExerciseKind] {
        &[
            ExerciseKind::Pushup,
            ExerciseKind::Squat,
            ExerciseKind::OverheadPress,
            ExerciseKind::DumbbellCurl,
            ExerciseKind::JumpingJack,
        ]
    }

    /// Dense index for fixed-size per-kind tables
    pub fn index(self) -> usize {
        match self {
            ExerciseKind::Pushup => 0,
            ExerciseKind::Squat => 1,
            ExerciseKind::OverheadPress => 2,
            ExerciseKind::DumbbellCurl => 3,
            ExerciseKind::JumpingJack => 4,
        }
    }

    pub fn definition(self) -> &'static ExerciseDefinition {
        &CATALOG[self.index()]
    }

    pub fn name(self) -> &'static str {
        self.definition().name
    }
}

#[derive(Debug, Clone)]
pub struct ExerciseDefinition {
    pub kind: ExerciseKind,
    pub name: &'static str,
    pub calories_per_rep: f64,
    pub default_target: u32,
    pub description: &'static str,
    pub instructions: &'static [&'static str],
}

/// Catalog, ordered by `ExerciseKind::index`
pub const CATALOG: &[ExerciseDefinition] = &[
    ExerciseDefinition {
        kind: ExerciseKind::Pushup,
        name: "Pushups",
        calories_per_rep: 0.5,
        default_target: 5,
        description: "A classic upper body exercise that targets chest, shoulders, and triceps.",
        instructions: &[
            "Start in plank position",
            "Lower body until chest nearly touches ground",
            "Push back up to starting position",
            "Keep body straight throughout",
        ],
    },
    ExerciseDefinition {
        kind: ExerciseKind::Squat,
        name: "Squats",
        calories_per_rep: 0.3,
        default_target: 5,
        description: "A fundamental lower body exercise targeting quads, hamstrings, and glutes.",
        instructions: &[
            "Stand with feet shoulder-width apart",
            "Lower body as if sitting back into a chair",
            "Keep chest up and back straight",
            "Return to standing position",
        ],
    },
    ExerciseDefinition {
        kind: ExerciseKind::OverheadPress,
        name: "Overhead Press",
        calories_per_rep: 1.0,
        default_target: 3,
        description: "An advanced upper body exercise targeting shoulders and triceps.",
        instructions: &[
            "Stand with feet shoulder-width apart",
            "Hold barbell at shoulder level with an overhand grip",
            "Press barbell overhead until arms are fully extended",
            "Lower barbell back to shoulder level with control",
            "Keep core engaged and maintain proper posture throughout",
        ],
    },
    ExerciseDefinition {
        kind: ExerciseKind::DumbbellCurl,
        name: "Dumbbell Curls",
        calories_per_rep: 0.4,
        default_target: 4,
        description: "An isolation exercise targeting the biceps muscles.",
        instructions: &[
            "Stand with dumbbells at sides",
            "Curl weights toward shoulders",
            "Lower with control",
            "Keep elbows close to body",
        ],
    },
    ExerciseDefinition {
        kind: ExerciseKind::JumpingJack,
        name: "Jumping Jacks",
        calories_per_rep: 0.2,
        default_target: 5,
        description: "A full-body cardio exercise that raises heart rate and improves coordination.",
        instructions: &[
            "Start with feet together, arms at sides",
            "Jump feet apart while raising arms",
            "Jump back to starting position",
            "Maintain rhythm",
        ],
    },
];

/// Find exercise by display name or snake_case id, ignoring case
pub fn find_exercise_by_name(name: &str) -> Option<&'static ExerciseDefinition> {
    let wanted = name.trim().to_lowercase();
    CATALOG.iter().find(|e| {
        e.name.to_lowercase() == wanted
            || serde_json::to_value(e.kind)
                .ok()
                .and_then(|v| v.as_str().map(|s| s == wanted))
                .unwrap_or(false)
    })
}

/// One step of a workout plan
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlanEntry {
    pub exercise: ExerciseKind,
    pub target_reps: u32,
}

/// Ordered exercises with rep targets, fixed once a session starts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkoutPlan {
    entries: Vec<PlanEntry>,
}

impl WorkoutPlan {
    pub fn new(entries: Vec<PlanEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[PlanEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&PlanEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse "pushups:5,squats:10"; a missing target uses the catalog default
    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let mut entries = Vec::new();
        for part in text.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (name, reps) = match part.split_once(':') {
                Some((name, reps)) => (name, Some(reps.trim())),
                None => (part, None),
            };
            let def = find_exercise_by_name(name)
                .ok_or_else(|| anyhow::anyhow!("unknown exercise: {}", name))?;
            let target_reps = match reps {
                Some(r) => r.parse().map_err(|_| anyhow::anyhow!("bad rep target '{}' for {}", r, def.name))?,
                None => def.default_target,
            };
            entries.push(PlanEntry { exercise: def.kind, target_reps });
        }
        if entries.is_empty() {
            anyhow::bail!("workout plan is empty");
        }
        Ok(Self::new(entries))
    }
}

/// Every catalog exercise once, at its default target
pub fn default_plan() -> WorkoutPlan {
    WorkoutPlan::new(
        CATALOG
            .iter()
            .map(|e| PlanEntry { exercise: e.kind, target_reps: e.default_target })
            .collect(),
    )
}

impl Default for WorkoutPlan {
    fn default() -> Self {
        default_plan()
    }
}
