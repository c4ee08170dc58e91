use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use strum::Display;

use crate::PracticeError;
use crate::keys;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Handedness {
    Left,
    Right,
    TwoHanded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Side {
    Left,
    Right,
}

/// One prescribed unit of work inside a segment. Weights are kilograms,
/// durations are seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Exercise {
    Squat { reps: u32, weight: u32 },
    HipRaise { reps: u32 },
    Halo { reps: u32, weight: u32 },
    Swing { reps: u32, weight: u32, hand: Handedness },
    GetUp { reps: u32, weight: u32, hand: Handedness },
    Rest,
    NinetyNinety { duration: u32, side: Side },
    QlStraddle { duration: u32, side: Side },
    ElevatedPushUp { reps: u32 },
    PullUp { reps: u32 },
    DeepSquatHold { duration: u32 },
    HipFlexorStretch { duration: u32, side: Side },
    HamstringStretch { duration: u32, side: Side },
    Splits { duration: u32 },
    Bridge { duration: u32 },
    Hang { duration: u32 },
}

impl Exercise {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Squat { .. } => "Prying Goblet Squat",
            Self::HipRaise { .. } => "Hip Raise",
            Self::Halo { .. } => "Halo",
            Self::Swing { .. } => "Swing",
            Self::GetUp { .. } => "Get Up",
            Self::Rest => "Rest",
            Self::NinetyNinety { .. } => "90 90 Stretch",
            Self::QlStraddle { .. } => "QL Straddle",
            Self::ElevatedPushUp { .. } => "Decline Pushup",
            Self::PullUp { .. } => "Pull up",
            Self::DeepSquatHold { .. } => "Squat Hold",
            Self::HipFlexorStretch { .. } => "Hip Flexor Stretch",
            Self::HamstringStretch { .. } => "Hamstring Stretch",
            Self::Splits { .. } => "Splits",
            Self::Bridge { .. } => "Bridge",
            Self::Hang { .. } => "Bar Hang",
        }
    }

    /// Short line for timers and history rows, e.g. `10x Swing - left`.
    pub fn description(&self) -> String {
        match self {
            Self::Squat { reps, .. }
            | Self::HipRaise { reps }
            | Self::Halo { reps, .. }
            | Self::ElevatedPushUp { reps }
            | Self::PullUp { reps } => format!("{reps}x {}", self.name()),
            Self::Swing { reps, hand, .. } | Self::GetUp { reps, hand, .. } => {
                format!("{reps}x {} - {hand}", self.name())
            }
            Self::HipFlexorStretch { side, .. } | Self::HamstringStretch { side, .. } => {
                format!("{} - {side}", self.name())
            }
            _ => self.name().to_string(),
        }
    }

    pub fn reps(&self) -> Option<u32> {
        match self {
            Self::Squat { reps, .. }
            | Self::HipRaise { reps }
            | Self::Halo { reps, .. }
            | Self::Swing { reps, .. }
            | Self::GetUp { reps, .. }
            | Self::ElevatedPushUp { reps }
            | Self::PullUp { reps } => Some(*reps),
            _ => None,
        }
    }

    pub fn weight(&self) -> Option<u32> {
        match self {
            Self::Squat { weight, .. }
            | Self::Halo { weight, .. }
            | Self::Swing { weight, .. }
            | Self::GetUp { weight, .. } => Some(*weight),
            _ => None,
        }
    }

    /// Hold duration in seconds for timed stretches.
    pub fn duration(&self) -> Option<u32> {
        match self {
            Self::NinetyNinety { duration, .. }
            | Self::QlStraddle { duration, .. }
            | Self::DeepSquatHold { duration }
            | Self::HipFlexorStretch { duration, .. }
            | Self::HamstringStretch { duration, .. }
            | Self::Splits { duration }
            | Self::Bridge { duration }
            | Self::Hang { duration } => Some(*duration),
            _ => None,
        }
    }

    pub fn is_rest(&self) -> bool {
        matches!(self, Self::Rest)
    }

    /// Settings-store key of the weight this exercise is loaded from.
    pub fn settings_key(&self) -> Option<&'static str> {
        match self {
            Self::Squat { .. } => Some(keys::SQUAT_WEIGHT),
            Self::Halo { .. } => Some(keys::HALO_WEIGHT),
            Self::Swing { .. } => Some(keys::SWING_WEIGHT),
            Self::GetUp { .. } => Some(keys::GET_UP_WEIGHT),
            _ => None,
        }
    }

    /// Encodes into the metadata string attached to activity boundaries.
    pub fn to_metadata(&self) -> Result<String, PracticeError> {
        let json = serde_json::to_vec(self).map_err(|_| PracticeError::InvalidJson)?;
        Ok(BASE64.encode(json))
    }

    pub fn from_metadata(meta: &str) -> Result<Self, PracticeError> {
        let raw = BASE64
            .decode(meta)
            .map_err(|_| PracticeError::InvalidBase64)?;
        serde_json::from_slice(&raw).map_err(|_| PracticeError::InvalidJson)
    }
}

impl fmt::Display for Exercise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_variants() -> Vec<Exercise> {
        let mut all = vec![Exercise::Rest];
        for hand in [Handedness::Left, Handedness::Right, Handedness::TwoHanded] {
            all.push(Exercise::Swing {
                reps: 10,
                weight: 24,
                hand,
            });
            all.push(Exercise::GetUp {
                reps: 1,
                weight: 24,
                hand,
            });
        }
        for side in [Side::Left, Side::Right] {
            all.push(Exercise::NinetyNinety { duration: 60, side });
            all.push(Exercise::QlStraddle { duration: 60, side });
            all.push(Exercise::HipFlexorStretch { duration: 60, side });
            all.push(Exercise::HamstringStretch { duration: 60, side });
        }
        all.extend([
            Exercise::Squat { reps: 5, weight: 16 },
            Exercise::HipRaise { reps: 5 },
            Exercise::Halo { reps: 10, weight: 16 },
            Exercise::ElevatedPushUp { reps: 10 },
            Exercise::PullUp { reps: 5 },
            Exercise::DeepSquatHold { duration: 120 },
            Exercise::Splits { duration: 120 },
            Exercise::Bridge { duration: 30 },
            Exercise::Hang { duration: 30 },
        ]);
        all
    }

    #[test]
    fn metadata_round_trips_every_variant() {
        for exercise in all_variants() {
            let meta = exercise.to_metadata().unwrap();
            let decoded = Exercise::from_metadata(&meta).unwrap();
            assert_eq!(decoded, exercise, "round trip changed {exercise:?}");
        }
    }

    #[test]
    fn variant_names_use_original_keys() {
        let json = serde_json::to_string(&Exercise::GetUp {
            reps: 1,
            weight: 24,
            hand: Handedness::TwoHanded,
        })
        .unwrap();
        assert!(json.contains("\"getUp\""), "bad tag in {json}");
        assert!(json.contains("\"twoHanded\""), "bad hand in {json}");

        let json = serde_json::to_string(&Exercise::NinetyNinety {
            duration: 60,
            side: Side::Left,
        })
        .unwrap();
        assert!(json.contains("\"ninetyNinety\""), "bad tag in {json}");
    }

    #[test]
    fn rejects_garbage_metadata() {
        assert!(matches!(
            Exercise::from_metadata("not base64!!!"),
            Err(PracticeError::InvalidBase64)
        ));
        let not_json = BASE64.encode(b"{\"bogus\":1}");
        assert!(matches!(
            Exercise::from_metadata(&not_json),
            Err(PracticeError::InvalidJson)
        ));
    }

    #[test]
    fn descriptions() {
        let swing = Exercise::Swing {
            reps: 10,
            weight: 24,
            hand: Handedness::Left,
        };
        assert_eq!(swing.description(), "10x Swing - left");

        let squat = Exercise::Squat { reps: 5, weight: 16 };
        assert_eq!(squat.description(), "5x Prying Goblet Squat");

        let stretch = Exercise::HamstringStretch {
            duration: 60,
            side: Side::Right,
        };
        assert_eq!(stretch.description(), "Hamstring Stretch - right");

        assert_eq!(Exercise::Rest.description(), "Rest");
        assert_eq!(
            Exercise::DeepSquatHold { duration: 120 }.description(),
            "Squat Hold"
        );
    }

    #[test]
    fn weight_only_on_loaded_exercises() {
        assert_eq!(Exercise::Squat { reps: 5, weight: 16 }.weight(), Some(16));
        assert_eq!(Exercise::HipRaise { reps: 5 }.weight(), None);
        assert_eq!(Exercise::Rest.weight(), None);
        assert_eq!(
            Exercise::Swing {
                reps: 10,
                weight: 24,
                hand: Handedness::TwoHanded
            }
            .settings_key(),
            Some("swing")
        );
    }
}
