//! Error types shared by the engine crates.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid entity config: `{field}` {reason}")]
    InvalidConfig { field: &'static str, reason: String },
}

pub type CoreResult<T> = Result<T, CoreError>;
