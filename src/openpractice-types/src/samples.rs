use chrono::NaiveDateTime;
use strum::{Display, EnumString};

/// Sleep staging categories as recorded by the wearable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum SleepStageKind {
    Awake,
    InBed,
    Core,
    Deep,
    Rem,
    Unspecified,
}

impl SleepStageKind {
    pub fn is_asleep(&self) -> bool {
        matches!(self, Self::Core | Self::Deep | Self::Rem | Self::Unspecified)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HrSample {
    pub time: NaiveDateTime,
    pub bpm: i16,
}

/// One SDNN reading in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HrvSample {
    pub time: NaiveDateTime,
    pub sdnn_ms: f64,
}

/// Daily resting heart rate as reported by the device, distinct from the
/// continuous `HrSample` stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RestingRateSample {
    pub time: NaiveDateTime,
    pub bpm: i16,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageSample {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub kind: SleepStageKind,
}

/// VO2max estimate in ml/kg/min.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vo2Sample {
    pub time: NaiveDateTime,
    pub value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn stage_kind_parses_camel_case() {
        assert_eq!(
            SleepStageKind::from_str("inBed").unwrap(),
            SleepStageKind::InBed
        );
        assert_eq!(SleepStageKind::from_str("rem").unwrap(), SleepStageKind::Rem);
        assert_eq!(SleepStageKind::Deep.to_string(), "deep");
        assert!(SleepStageKind::from_str("napping").is_err());
    }

    #[test]
    fn awake_and_in_bed_are_not_sleep() {
        assert!(!SleepStageKind::Awake.is_asleep());
        assert!(!SleepStageKind::InBed.is_asleep());
        assert!(SleepStageKind::Core.is_asleep());
        assert!(SleepStageKind::Unspecified.is_asleep());
    }
}
