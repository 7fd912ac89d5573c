use thiserror::Error;

// -----------------------------------------------------------------------------
// Error

/// Failure of a binary read.
///
/// The first failure stops the whole walk; the value being read may be left
/// partially overwritten.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ReadError {
    #[error("declared length needs {needed} bytes but only {remaining} remain")]
    BufferExhausted { needed: usize, remaining: usize },

    #[error("type id {type_id} is zero, unregistered or not constructible")]
    UnknownType { type_id: u16 },

    #[error("type id {found} is not a descendant of type id {expected}")]
    TypeMismatch { expected: u16, found: u16 },

    #[error("malformed scalar encoding")]
    MalformedScalar,

    #[error("back-reference {index} exceeds the {defined} objects defined so far")]
    InvalidReference { index: u32, defined: u32 },

    #[error("string payload is not valid UTF-8")]
    InvalidUtf8,
}

impl ReadError {
    /// A distinct nonzero status code per error kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use og_object::ReadError;
    ///
    /// assert_eq!(ReadError::MalformedScalar.code(), 4);
    /// ```
    pub const fn code(&self) -> i32 {
        match self {
            Self::BufferExhausted { .. } => 1,
            Self::UnknownType { .. } => 2,
            Self::TypeMismatch { .. } => 3,
            Self::MalformedScalar => 4,
            Self::InvalidReference { .. } => 5,
            Self::InvalidUtf8 => 6,
        }
    }
}
