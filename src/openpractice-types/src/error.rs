use thiserror::Error;

#[derive(Debug, Error)]
#[error("{self:?}")]
pub enum PracticeError {
    InvalidBase64,
    InvalidJson,
    InvalidWeight(u32),
    UnknownSettingsKey(String),
    UnknownPractice(String),
}
