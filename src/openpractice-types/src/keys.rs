//! Keys of the shared key-value store. Spelling is load-bearing: scores
//! written under these names are read back by the widget snapshot and the
//! paired device.

pub const SLEEP_RHR_BASELINE: &str = "sleepRHRBaseline";
pub const READINESS_SCORE: &str = "readinessScore";
pub const READINESS_DATE: &str = "readinessDate";
pub const USER_AGE: &str = "userAge";

pub const SQUAT_WEIGHT: &str = "squat";
pub const HALO_WEIGHT: &str = "halo";
pub const SWING_WEIGHT: &str = "swing";
pub const GET_UP_WEIGHT: &str = "getUp";
pub const TWO_HANDED_SWINGS: &str = "twoHandedSwings";

/// `type` discriminator of cross-device messages.
pub const READINESS_UPDATE: &str = "readinessUpdate";
