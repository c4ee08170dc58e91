use strum::{Display, EnumString};

use crate::{Exercise, Handedness, PracticeError, PracticeSegment, PracticeSettings, Side};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ActivityKind {
    FunctionalStrength,
    Hiit,
    Traditional,
    Flexibility,
}

/// A guided protocol: ordered segments plus the activity classification
/// recorded on the finished session.
#[derive(Debug, Clone, PartialEq)]
pub struct Practice {
    /// Stable tag stored on sessions, never shown.
    pub name: String,
    pub display_name: String,
    pub kind: ActivityKind,
    /// Protocols with configurable loads stop for a settings step before
    /// the countdown.
    pub requires_settings: bool,
    pub segments: Vec<PracticeSegment>,
}

impl Practice {
    pub const SIMPLE_AND_SINISTER: &'static str = "Simple and Sinister";
    pub const STRETCHES: &'static str = "S&S Stretches";

    pub fn simple_and_sinister(settings: &PracticeSettings) -> Self {
        Self {
            name: Self::SIMPLE_AND_SINISTER.to_string(),
            display_name: "Simple and Sinister+".to_string(),
            kind: ActivityKind::FunctionalStrength,
            requires_settings: true,
            segments: vec![
                warm_up(settings),
                swings(settings),
                get_ups(settings),
                push(),
                pull(),
            ],
        }
    }

    pub fn stretches() -> Self {
        Self {
            name: Self::STRETCHES.to_string(),
            display_name: "Stretches".to_string(),
            kind: ActivityKind::Flexibility,
            requires_settings: false,
            segments: vec![stretch_segment()],
        }
    }

    pub fn catalog(settings: &PracticeSettings) -> Vec<Self> {
        vec![Self::simple_and_sinister(settings), Self::stretches()]
    }

    pub fn by_name(name: &str, settings: &PracticeSettings) -> Result<Self, PracticeError> {
        match name {
            Self::SIMPLE_AND_SINISTER => Ok(Self::simple_and_sinister(settings)),
            Self::STRETCHES => Ok(Self::stretches()),
            other => Err(PracticeError::UnknownPractice(other.to_string())),
        }
    }

    pub fn exercise_count(&self) -> usize {
        self.segments.iter().map(PracticeSegment::len).sum()
    }
}

fn warm_up(settings: &PracticeSettings) -> PracticeSegment {
    let mut exercises = Vec::new();
    for _ in 0..3 {
        exercises.extend([
            Exercise::Squat {
                reps: 5,
                weight: settings.squat_weight,
            },
            Exercise::HipRaise { reps: 5 },
            Exercise::Halo {
                reps: 10,
                weight: settings.halo_weight,
            },
            Exercise::Rest,
        ]);
    }
    PracticeSegment::new("Warm Up", 0, exercises)
}

fn swings(settings: &PracticeSettings) -> PracticeSegment {
    let (first, second) = if settings.two_handed_swings {
        (Handedness::TwoHanded, Handedness::TwoHanded)
    } else {
        (Handedness::Left, Handedness::Right)
    };

    let mut exercises = Vec::new();
    for _ in 0..5 {
        exercises.extend([
            Exercise::Swing {
                reps: 10,
                weight: settings.swing_weight,
                hand: first,
            },
            Exercise::Rest,
            Exercise::Swing {
                reps: 10,
                weight: settings.swing_weight,
                hand: second,
            },
            Exercise::Rest,
        ]);
    }
    PracticeSegment::new("Swings", 1, exercises)
}

fn get_ups(settings: &PracticeSettings) -> PracticeSegment {
    let mut exercises = Vec::new();
    for _ in 0..5 {
        exercises.extend([
            Exercise::GetUp {
                reps: 1,
                weight: settings.get_up_weight,
                hand: Handedness::Left,
            },
            Exercise::Rest,
            Exercise::GetUp {
                reps: 1,
                weight: settings.get_up_weight,
                hand: Handedness::Right,
            },
            Exercise::Rest,
        ]);
    }
    PracticeSegment::new("Get Ups", 2, exercises)
}

// TODO: pull push/pull reps from PracticeSettings like the weights.
fn push() -> PracticeSegment {
    let mut exercises = Vec::new();
    for _ in 0..3 {
        exercises.extend([Exercise::ElevatedPushUp { reps: 10 }, Exercise::Rest]);
    }
    PracticeSegment::new("Push", 3, exercises)
}

fn pull() -> PracticeSegment {
    let mut exercises = Vec::new();
    for _ in 0..3 {
        exercises.extend([Exercise::PullUp { reps: 5 }, Exercise::Rest]);
    }
    // No rest after the final set, the session ends there.
    exercises.pop();
    PracticeSegment::new("Pull", 4, exercises)
}

fn stretch_segment() -> PracticeSegment {
    PracticeSegment::new(
        "Stretches",
        1,
        vec![
            Exercise::DeepSquatHold { duration: 120 },
            Exercise::NinetyNinety {
                duration: 60,
                side: Side::Left,
            },
            Exercise::NinetyNinety {
                duration: 60,
                side: Side::Right,
            },
            Exercise::QlStraddle {
                duration: 60,
                side: Side::Left,
            },
            Exercise::QlStraddle {
                duration: 60,
                side: Side::Right,
            },
            Exercise::HipFlexorStretch {
                duration: 60,
                side: Side::Left,
            },
            Exercise::HipFlexorStretch {
                duration: 60,
                side: Side::Right,
            },
            Exercise::HamstringStretch {
                duration: 60,
                side: Side::Left,
            },
            Exercise::HamstringStretch {
                duration: 60,
                side: Side::Right,
            },
            Exercise::Splits { duration: 120 },
            Exercise::Bridge { duration: 30 },
            Exercise::Hang { duration: 30 },
            Exercise::Rest,
            Exercise::Hang { duration: 30 },
        ],
    )
}
