use thiserror::Error;

use crate::characteristics::Characteristic;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Malformed input to a pure function: a bad dice count, formula or phase mask.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// A combat field needed a characteristic the hero does not have.
    #[error("missing characteristic: {0}")]
    MissingCharacteristic(Characteristic),
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;

pub(crate) fn invalid(msg: impl Into<String>) -> EngineError {
    EngineError::InvalidArgument(msg.into())
}
