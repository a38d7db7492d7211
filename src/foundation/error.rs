pub type LiveryResult<T> = Result<T, LiveryError>;

#[derive(thiserror::Error, Debug)]
pub enum LiveryError {
    #[error("unknown region '{name}'; available regions:\n{available}")]
    UnknownRegion { name: String, available: String },

    #[error("selection is empty: '{0}'")]
    EmptySelection(String),

    #[error("selection covers the whole canvas: '{0}' (omit the selector instead)")]
    FullSelection(String),

    #[error("invalid expression at byte {offset}: {message}")]
    InvalidExpression { offset: usize, message: String },

    #[error("size mismatch: {0}")]
    SizeMismatch(String),

    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("corrupt cache entry: {0}")]
    CorruptCache(String),

    #[error("missing output target: {0}")]
    MissingOutputTarget(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("image error: {0}")]
    Image(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LiveryError {
    pub fn unknown_region(name: impl Into<String>, available: impl Into<String>) -> Self {
        Self::UnknownRegion {
            name: name.into(),
            available: available.into(),
        }
    }

    pub fn invalid_expression(offset: usize, message: impl Into<String>) -> Self {
        Self::InvalidExpression {
            offset,
            message: message.into(),
        }
    }

    pub fn size_mismatch(msg: impl Into<String>) -> Self {
        Self::SizeMismatch(msg.into())
    }

    pub fn degenerate(msg: impl Into<String>) -> Self {
        Self::DegenerateGeometry(msg.into())
    }

    pub fn corrupt_cache(msg: impl Into<String>) -> Self {
        Self::CorruptCache(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    pub fn image(msg: impl Into<String>) -> Self {
        Self::Image(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
