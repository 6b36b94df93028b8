//! Structured error types for the codec.
//!
//! Every failure is local to one encode or decode call. Errors raised
//! below a struct field, list element or enum variant are wrapped in
//! [`CodecError::AtPath`] so the caller can see where decoding stopped.

use thiserror::Error;

use crate::discriminator::Discriminator;

/// Result type alias for codec operations.
pub type Result<T, E = CodecError> = std::result::Result<T, E>;

/// Coarse classification of a [`CodecError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The buffer ran out before a read completed.
    Truncation,
    /// A bool, option tag or enum index held a value outside its domain.
    MalformedTag,
    /// A type name or descriptor kind could not be resolved.
    UnknownType,
    /// The payload prefix did not match the expected discriminator.
    DiscriminatorMismatch,
    /// A value handed to the encoder does not fit its descriptor.
    InvalidValue,
    /// The IDL itself is inconsistent.
    InvalidIdl,
}

/// Structured error type for the codec.
#[derive(Error, Debug)]
pub enum CodecError {
    /// Buffer exhausted before a read completed
    #[error("unexpected end of data at offset {offset}: needed {needed} bytes, {remaining} remaining")]
    Truncated {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    #[error("invalid bool byte {byte:#04x} at offset {offset}")]
    InvalidBool { offset: usize, byte: u8 },

    #[error("invalid option tag {tag:#04x} at offset {offset}")]
    InvalidOptionTag { offset: usize, tag: u8 },

    #[error("invalid variant index {index} for enum `{type_name}` ({variant_count} variants) at offset {offset}")]
    InvalidEnumVariant {
        type_name: String,
        index: u8,
        variant_count: usize,
        offset: usize,
    },

    #[error("invalid UTF-8 string at offset {offset}")]
    InvalidUtf8 { offset: usize },

    /// `Defined` reference absent from the registry
    #[error("unknown type `{name}`")]
    UnknownType { name: String },

    /// Descriptor kind the codec does not implement
    #[error("unsupported type: {kind}")]
    UnsupportedType { kind: String },

    #[error("discriminator mismatch for `{name}`: expected {expected}, found {actual}")]
    DiscriminatorMismatch {
        name: String,
        expected: Discriminator,
        actual: Discriminator,
    },

    #[error("no item matches discriminator {discriminator}")]
    UnknownDiscriminator { discriminator: Discriminator },

    #[error("unknown account `{name}`")]
    UnknownAccount { name: String },

    #[error("unknown instruction `{name}`")]
    UnknownInstruction { name: String },

    #[error("unknown event `{name}`")]
    UnknownEvent { name: String },

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("array length mismatch: expected {expected} elements, got {actual}")]
    ArrayLength { expected: usize, actual: usize },

    #[error("missing field `{name}`")]
    MissingField { name: String },

    #[error("enum `{type_name}` has no variant `{variant}`")]
    UnknownVariant { type_name: String, variant: String },

    #[error("invalid value: {message}")]
    InvalidValue { message: String },

    #[error("length {len} does not fit a u32 prefix")]
    LengthOverflow { len: usize },

    #[error("type nesting exceeds the depth limit of {limit}")]
    DepthLimit { limit: usize },

    #[error("invalid IDL: {message}")]
    InvalidIdl { message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("borsh deserialization failed: {message}")]
    Borsh { message: String },

    /// An error raised while processing a nested field
    #[error("at `{path}`: {source}")]
    AtPath {
        path: String,
        #[source]
        source: Box<CodecError>,
    },
}

impl CodecError {
    pub fn invalid_value(message: impl Into<String>) -> Self {
        CodecError::InvalidValue {
            message: message.into(),
        }
    }

    pub fn invalid_idl(message: impl Into<String>) -> Self {
        CodecError::InvalidIdl {
            message: message.into(),
        }
    }

    pub fn mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        CodecError::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Classify this error, looking through any path context.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CodecError::Truncated { .. } => ErrorKind::Truncation,
            CodecError::InvalidBool { .. }
            | CodecError::InvalidOptionTag { .. }
            | CodecError::InvalidEnumVariant { .. }
            | CodecError::InvalidUtf8 { .. } => ErrorKind::MalformedTag,
            CodecError::UnknownType { .. }
            | CodecError::UnsupportedType { .. }
            | CodecError::UnknownAccount { .. }
            | CodecError::UnknownInstruction { .. }
            | CodecError::UnknownEvent { .. } => ErrorKind::UnknownType,
            CodecError::DiscriminatorMismatch { .. } | CodecError::UnknownDiscriminator { .. } => {
                ErrorKind::DiscriminatorMismatch
            }
            CodecError::TypeMismatch { .. }
            | CodecError::ArrayLength { .. }
            | CodecError::MissingField { .. }
            | CodecError::UnknownVariant { .. }
            | CodecError::InvalidValue { .. }
            | CodecError::LengthOverflow { .. }
            | CodecError::Borsh { .. } => ErrorKind::InvalidValue,
            CodecError::InvalidIdl { .. } | CodecError::Json(_) | CodecError::DepthLimit { .. } => {
                ErrorKind::InvalidIdl
            }
            CodecError::AtPath { source, .. } => source.kind(),
        }
    }

    /// The innermost error, without path context.
    pub fn root(&self) -> &CodecError {
        match self {
            CodecError::AtPath { source, .. } => source.root(),
            other => other,
        }
    }

    /// The field path recorded for this error, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            CodecError::AtPath { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Prefix the error path with a struct field or variant name.
    pub(crate) fn in_field(self, name: &str) -> Self {
        self.prefixed(name)
    }

    /// Prefix the error path with a list index.
    pub(crate) fn at_index(self, index: usize) -> Self {
        self.prefixed(&format!("[{index}]"))
    }

    fn prefixed(self, segment: &str) -> Self {
        match self {
            CodecError::AtPath { path, source } => {
                let path = if path.starts_with('[') {
                    format!("{segment}{path}")
                } else {
                    format!("{segment}.{path}")
                };
                CodecError::AtPath { path, source }
            }
            other => CodecError::AtPath {
                path: segment.to_string(),
                source: Box::new(other),
            },
        }
    }
}
