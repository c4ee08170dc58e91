#[macro_use]
extern crate serde;

mod error;
pub use error::PracticeError;

mod exercise;
pub use exercise::{Exercise, Handedness, Side};

mod samples;
pub use samples::{
    HrSample, HrvSample, RestingRateSample, SleepStageKind, StageSample, Vo2Sample,
};

mod segment;
pub use segment::PracticeSegment;

mod practice;
pub use practice::{ActivityKind, Practice};

mod settings;
pub use settings::{AVAILABLE_WEIGHTS, PracticeSettings};

mod bridge;
pub use bridge::BridgeMessage;

pub mod keys;
