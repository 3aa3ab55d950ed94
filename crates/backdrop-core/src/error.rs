use crate::session::ListenerKind;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BackdropError {
    #[error("failed to (de)register {kind:?} listener: {reason}")]
    Listener { kind: ListenerKind, reason: String },

    #[error("frame scheduling failed: {0}")]
    Schedule(String),

    #[error("gpu error: {0}")]
    Gpu(String),

    #[error("surface error: {0}")]
    Surface(String),

    #[error("teardown step `{step}` failed: {reason}")]
    Dispose { step: &'static str, reason: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("unknown geometry generator `{0}`")]
    UnknownGenerator(String),
}

pub type Result<T> = std::result::Result<T, BackdropError>;
